use serde::Deserialize;

use crate::schema::EXPIRY_DAYS_MAX;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Shelf life assumed for food items created without categories.
    pub default_expiry_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 10,
            host: "0.0.0.0".into(),
            port: 8080,
            default_expiry_days: 30,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, v, e)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            host: std::env::var("APP_HOST").unwrap_or(defaults.host),
            port: parsed("APP_PORT", defaults.port)?,
            default_expiry_days: parsed("DEFAULT_EXPIRY_DAYS", defaults.default_expiry_days)?,
        };
        config.check_expiry_days()?;
        Ok(config)
    }

    fn check_expiry_days(&self) -> anyhow::Result<()> {
        if !(0..=i64::from(EXPIRY_DAYS_MAX)).contains(&self.default_expiry_days) {
            anyhow::bail!(
                "DEFAULT_EXPIRY_DAYS must be between 0 and {}, got {}",
                EXPIRY_DAYS_MAX,
                self.default_expiry_days
            );
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AppConfig::default();
        assert_eq!(c.addr(), "0.0.0.0:8080");
        assert_eq!(c.default_expiry_days, 30);
        assert!(c.database_url.is_none());
        assert!(c.check_expiry_days().is_ok());
    }

    #[test]
    fn expiry_days_out_of_range_rejected() {
        let c = AppConfig {
            default_expiry_days: i64::from(EXPIRY_DAYS_MAX) + 1,
            ..AppConfig::default()
        };
        assert!(c.check_expiry_days().is_err());
        let c = AppConfig {
            default_expiry_days: -1,
            ..AppConfig::default()
        };
        assert!(c.check_expiry_days().is_err());
    }
}
