/// Runtime settings derived from the environment.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub cors_origin: Option<String>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("JWT_SECRET must be at least 32 characters long")]
    WeakSecret,
}

pub const MIN_SECRET_LEN: usize = 32;

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
            std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
        }

        let secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 5),
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn rejects_short_secret_and_applies_defaults() {
        std::env::set_var("JWT_SECRET", "short");
        assert_eq!(Settings::from_env().unwrap_err(), ConfigError::WeakSecret);

        std::env::set_var("JWT_SECRET", "test-secret-must-be-32-bytes-long!!");
        std::env::remove_var("BIND_ADDR");
        std::env::set_var("DB_MAX_CONNECTIONS", "not-a-number");
        let s = Settings::from_env().unwrap();
        assert_eq!(s.bind_addr, "0.0.0.0:8080");
        assert_eq!(s.db_max_connections, 5);
        std::env::remove_var("DB_MAX_CONNECTIONS");
    }
}
