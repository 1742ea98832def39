use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub booking: BookingRules,
    pub palette: PaletteConfig,
}

/// Tunables the managers adjust per season.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_max_passengers")]
    pub max_passengers_per_order: usize,
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_seconds: u64,
    #[serde(default = "default_reconcile_horizon")]
    pub reconcile_horizon_days: i64,
    pub sale_start: Option<String>, // ISO 8601
    pub sale_end: Option<String>,   // ISO 8601
}

fn default_max_passengers() -> usize {
    40
}
fn default_reconcile_interval() -> u64 {
    60
}
fn default_reconcile_horizon() -> i64 {
    120
}

/// Color tokens handed to passenger groups, in hand-out order.
#[derive(Debug, Deserialize, Clone)]
pub struct PaletteConfig {
    #[serde(default = "default_group_colors")]
    pub colors: Vec<String>,
}

fn default_group_colors() -> Vec<String> {
    voyra_passenger::palette::DEFAULT_GROUP_COLORS
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of VOYRA)
            // Eg.. `VOYRA__SERVER__PORT=9090` would set the server port
            .add_source(config::Environment::with_prefix("VOYRA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
