use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Matching engine knobs.
    pub matching: MatchingConfig,
    /// Background job configuration.
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Minimum score a (user, event) pair must reach; 10 means at least one
    /// shared interest.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: i32,

    /// Per-event cap on matches created in one run.
    #[serde(default = "default_limit_per_event")]
    pub limit_per_event: usize,

    /// Radius applied to profiles that carry coordinates but no preferred
    /// radius of their own.
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Whether the periodic bulk matching job runs.
    #[serde(default = "default_auto_matching_enabled")]
    pub auto_matching_enabled: bool,

    /// Minutes between bulk matching runs.
    #[serde(default = "default_auto_matching_interval")]
    pub auto_matching_interval_minutes: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            auto_matching_enabled: default_auto_matching_enabled(),
            auto_matching_interval_minutes: default_auto_matching_interval(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_score_threshold() -> i32 {
    10
}
fn default_limit_per_event() -> usize {
    5
}
fn default_radius_km() -> f64 {
    25.0
}
fn default_auto_matching_enabled() -> bool {
    true
}
fn default_auto_matching_interval() -> u64 {
    30
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with PINIT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PINIT").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// The socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid server host/port configuration")
    }

    /// Database config in the shape the persistence crate expects.
    pub fn database_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            connect_timeout_secs: self.database.connect_timeout_secs,
            idle_timeout_secs: self.database.idle_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_defaults() {
        assert_eq!(default_score_threshold(), 10);
        assert_eq!(default_limit_per_event(), 5);
        assert!(default_radius_km() > 0.0);
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 9000,
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: "".into(),
                max_connections: 5,
                min_connections: 1,
                connect_timeout_secs: 10,
                idle_timeout_secs: 600,
            },
            logging: LoggingConfig {
                level: "info".into(),
                format: "pretty".into(),
            },
            security: SecurityConfig {
                cors_origins: vec![],
            },
            matching: MatchingConfig {
                score_threshold: 10,
                limit_per_event: 5,
                default_radius_km: 25.0,
            },
            jobs: JobsConfig::default(),
        };
        assert_eq!(config.socket_addr().port(), 9000);
    }
}
