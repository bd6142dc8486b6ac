//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables (a `.env` file is
//! honoured when present). Provider-specific requirements, such as an API key
//! being mandatory only for the `openai` provider, are enforced by the
//! factories that consume this struct.

use anyhow::Result;
use std::collections::HashMap;
use std::env;

const DEFAULT_PORT: u16 = 8000;

#[derive(Clone)]
pub struct Config {
    /// Completion provider (`openai`, `mock`)
    pub llm_provider: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,

    /// Store provider (`supabase`, `postgres`, `memory`)
    pub store_provider: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub database_url: Option<String>,
    pub run_migrations: bool,

    /// Identity provider (`jwt`, `static`)
    pub auth_provider: String,
    pub jwt_secret: Option<String>,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub dev_user_id: Option<String>,
    pub dev_user_email: Option<String>,
    pub dev_user_name: Option<String>,

    /// Runtime configuration
    pub cors_allowed_origins: Option<String>,
    pub log_format: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit key/value map
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values are treated as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("RUN_MIGRATIONS must be true or false"))?,
            None => false,
        };

        Ok(Self {
            llm_provider: get("LLM_PROVIDER").unwrap_or_else(|| "openai".to_string()),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),

            store_provider: get("STORE_PROVIDER").unwrap_or_else(|| "supabase".to_string()),
            supabase_url: get("SUPABASE_URL"),
            supabase_key: get("SUPABASE_KEY"),
            database_url: get("DATABASE_URL"),
            run_migrations,

            auth_provider: get("AUTH_PROVIDER").unwrap_or_else(|| "jwt".to_string()),
            jwt_secret: get("JWT_SECRET"),
            jwt_issuer: get("JWT_ISSUER"),
            jwt_audience: get("JWT_AUDIENCE"),
            dev_user_id: get("DEV_USER_ID"),
            dev_user_email: get("DEV_USER_EMAIL"),
            dev_user_name: get("DEV_USER_NAME"),

            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
            log_format: get("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            port,
        })
    }
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[REDACTED]")
}

impl std::fmt::Debug for Config {
    #[mutants::skip] // Formatting only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("llm_provider", &self.llm_provider)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("store_provider", &self.store_provider)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("database_url", &redact(&self.database_url))
            .field("run_migrations", &self.run_migrations)
            .field("auth_provider", &self.auth_provider)
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("dev_user_id", &self.dev_user_id)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("log_format", &self.log_format)
            .field("port", &self.port)
            .finish()
    }
}
