//! Household food inventory: users, their food items with categories,
//! recipes, notifications and dietary preferences, behind a JSON API.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod food_items;
pub mod notifications;
pub mod recipes;
pub mod schema;
pub mod seed;
pub mod serialization;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod users;
