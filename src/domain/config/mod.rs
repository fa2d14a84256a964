//! Configuration value objects

pub mod app_config;

pub use app_config::{AppConfig, DEFAULT_BASE_URL, DEFAULT_NUM_SPEAKERS};
