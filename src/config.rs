use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tmdb: TmdbConfig,
    pub sync: SyncConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// Optional: search degrades to empty results without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_base_url: String,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub api_per_second: u64,
    pub api_burst: u32,
    pub webhook_per_second: u64,
    pub webhook_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a port number".to_string())
            })?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL".to_string()))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .unwrap_or(5);

        let tmdb_api_key = env::var("TMDB_API_KEY").ok().filter(|k| !k.is_empty());
        let tmdb_base_url = env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = env::var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|_| "https://image.tmdb.org/t/p/w500".to_string());

        let sync_enabled = matches!(
            env::var("SYNC_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .as_str(),
            "1" | "true" | "yes"
        );
        let sync_interval_seconds = env::var("SYNC_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse::<u64>()
            .unwrap_or(1800);

        let api_per_second = env::var("RATE_LIMIT_API_PER_SECOND")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()
            .unwrap_or(5);
        let api_burst = env::var("RATE_LIMIT_API_BURST")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u32>()
            .unwrap_or(20);
        let webhook_per_second = env::var("RATE_LIMIT_WEBHOOKS_PER_SECOND")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .unwrap_or(10);
        let webhook_burst = env::var("RATE_LIMIT_WEBHOOKS_BURST")
            .unwrap_or_else(|_| "50".to_string())
            .parse::<u32>()
            .unwrap_or(50);

        Ok(Config {
            server: ServerConfig {
                host,
                port,
                frontend_url,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            tmdb: TmdbConfig {
                api_key: tmdb_api_key,
                base_url: tmdb_base_url,
                image_base_url: tmdb_image_base_url,
            },
            sync: SyncConfig {
                enabled: sync_enabled,
                interval_seconds: sync_interval_seconds,
            },
            rate_limit: RateLimitConfig {
                api_per_second,
                api_burst,
                webhook_per_second,
                webhook_burst,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                frontend_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://data/cinema.db".to_string(),
                max_connections: 5,
            },
            tmdb: TmdbConfig {
                api_key: None,
                base_url: "https://api.themoviedb.org/3".to_string(),
                image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            },
            sync: SyncConfig {
                enabled: true,
                interval_seconds: 1800,
            },
            rate_limit: RateLimitConfig {
                api_per_second: 5,
                api_burst: 20,
                webhook_per_second: 10,
                webhook_burst: 50,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sync_enabled() {
        let config = Config::default();
        assert!(config.sync.enabled);
        assert_eq!(config.sync.interval_seconds, 1800);
    }

    #[test]
    fn default_config_has_no_tmdb_key() {
        let config = Config::default();
        assert!(config.tmdb.api_key.is_none());
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
    }
}
