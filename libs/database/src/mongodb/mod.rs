//! MongoDB connector and utilities

pub mod bson_datetime;
mod config;
mod connector;
mod errors;
mod health;

pub use config::{DEFAULT_DATABASE, DEFAULT_URL, MongoConfig};
pub use connector::{MongoError, connect, connect_from_config, connect_from_config_with_retry};
pub use errors::{DUPLICATE_KEY_CODE, is_duplicate_key_error};
pub use health::{HealthStatus, check_health_detailed, ping};

pub use mongodb::{Client, Collection, Database};
