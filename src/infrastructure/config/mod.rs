use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "casegen.toml";
pub const ENV_PREFIX: &str = "CASEGEN_";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://casegen.db".to_string(),
            max_connections: 4,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gemini: LLMConfig,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            gemini: LLMConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Defaults, then `casegen.toml`, then `CASEGEN_*` variables, then the
    /// bare `GEMINI_API_KEY`.
    pub fn load() -> Result<AppConfig> {
        let _ = dotenvy::dotenv();
        Self::extract(
            Self::base()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__"))
                .merge(
                    Env::raw()
                        .only(&["GEMINI_API_KEY"])
                        .map(|_| "gemini.api_key".into()),
                ),
        )
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        figment
            .extract()
            .map_err(|e| AppError::ConfigurationError(format!("Failed to load config: {}", e)))
    }
}
