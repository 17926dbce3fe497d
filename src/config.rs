use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub geocoding: GeocodingConfig,
    pub id_node: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub reset_token_ttl_secs: u64,
    pub verification_code_ttl_secs: u64,
    pub verification_max_attempts: u32,
    pub password_min_length: usize,
    /// Argon2 memory cost in KiB.
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 7 * 24 * 3600,
            reset_token_ttl_secs: 15 * 60,
            verification_code_ttl_secs: 10 * 60,
            verification_max_attempts: 3,
            password_min_length: 8,
            argon2_memory_kib: 19 * 1024,
            argon2_iterations: 2,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            timeout_ms: 5000,
            user_agent: "TribeServer/0.1 (contact@tribe.example)".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/tribe.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            auth: AuthConfig::default(),
            geocoding: GeocodingConfig::default(),
            id_node: 1,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparsable value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenv::dotenv();

        let defaults = Config::default();
        let config = Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env_or("SERVER_PORT", defaults.server.port),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.auth.jwt_secret),
                access_token_ttl_secs: env_or("ACCESS_TOKEN_TTL_SECS", defaults.auth.access_token_ttl_secs),
                refresh_token_ttl_secs: env_or("REFRESH_TOKEN_TTL_SECS", defaults.auth.refresh_token_ttl_secs),
                reset_token_ttl_secs: env_or("RESET_TOKEN_TTL_SECS", defaults.auth.reset_token_ttl_secs),
                verification_code_ttl_secs: env_or(
                    "VERIFICATION_CODE_TTL_SECS",
                    defaults.auth.verification_code_ttl_secs,
                ),
                verification_max_attempts: env_or(
                    "VERIFICATION_MAX_ATTEMPTS",
                    defaults.auth.verification_max_attempts,
                ),
                password_min_length: env_or("PASSWORD_MIN_LENGTH", defaults.auth.password_min_length),
                argon2_memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.auth.argon2_memory_kib),
                argon2_iterations: env_or("ARGON2_ITERATIONS", defaults.auth.argon2_iterations),
            },
            geocoding: GeocodingConfig {
                enabled: env_or("GEOCODING_ENABLED", defaults.geocoding.enabled),
                base_url: env::var("GEOCODING_BASE_URL").unwrap_or(defaults.geocoding.base_url),
                timeout_ms: env_or("GEOCODING_TIMEOUT_MS", defaults.geocoding.timeout_ms),
                user_agent: env::var("GEOCODING_USER_AGENT").unwrap_or(defaults.geocoding.user_agent),
            },
            id_node: env_or("ID_NODE", defaults.id_node),
        };

        if config.id_node >= 1024 {
            anyhow::bail!("ID_NODE must be less than 1024, got {}", config.id_node);
        }

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
