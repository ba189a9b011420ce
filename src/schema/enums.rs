use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed set of wire codes stored as text columns.
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn code(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Comma separated list of accepted codes, for error messages.
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|c| c.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuantityUnit {
    #[serde(rename = "KG")]
    Kilogram,
    #[default]
    #[serde(rename = "UNIT")]
    Unit,
    #[serde(rename = "G")]
    Gram,
}

impl Choice for QuantityUnit {
    const ALL: &'static [Self] = &[Self::Kilogram, Self::Unit, Self::Gram];

    fn code(self) -> &'static str {
        match self {
            Self::Kilogram => "KG",
            Self::Unit => "UNIT",
            Self::Gram => "G",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputMethod {
    #[serde(rename = "BAR")]
    Barcode,
    #[serde(rename = "IMG")]
    Image,
    #[default]
    #[serde(rename = "MAN")]
    Manual,
    #[serde(rename = "SCA")]
    Scan,
}

impl Choice for InputMethod {
    const ALL: &'static [Self] = &[Self::Barcode, Self::Image, Self::Manual, Self::Scan];

    fn code(self) -> &'static str {
        match self {
            Self::Barcode => "BAR",
            Self::Image => "IMG",
            Self::Manual => "MAN",
            Self::Scan => "SCA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "EXP")]
    Expiry,
    #[serde(rename = "REC")]
    Recipe,
    #[default]
    #[serde(rename = "SYS")]
    System,
}

impl Choice for NotificationType {
    const ALL: &'static [Self] = &[Self::Expiry, Self::Recipe, Self::System];

    fn code(self) -> &'static str {
        match self {
            Self::Expiry => "EXP",
            Self::Recipe => "REC",
            Self::System => "SYS",
        }
    }
}

macro_rules! display_as_code {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.code())
                }
            }
        )*
    };
}

display_as_code!(QuantityUnit, InputMethod, NotificationType);
