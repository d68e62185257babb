use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while assembling configuration. Every variant is fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub site: SiteConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Connection settings for the hosted backend (data API + auth API).
#[derive(Clone)]
pub struct StoreConfig {
    /// Serve from the in-process mock store instead of the hosted backend.
    pub use_mock_data: bool,
    /// JSON fixture loaded into the mock store at startup.
    pub mock_data_path: Option<String>,
    pub url: String,
    pub service_key: String,
    pub anon_key: String,
    /// When set, access tokens are verified locally instead of via the auth API.
    pub jwt_secret: Option<String>,
    pub request_timeout_secs: u64,
}

// Keys stay out of logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("use_mock_data", &self.use_mock_data)
            .field("mock_data_path", &self.mock_data_path)
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("anon_key", &"<redacted>")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Public origin of the site, used for robots.txt and the sitemap reference.
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub max_limit: Option<u32>,
    pub debug_logging: bool,
    /// Upper bound on identity/profile resolution for one request.
    pub auth_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub session_cookie: String,
    pub secure_cookies: bool,
}

pub const DEFAULT_SITE_URL: &str = "https://rgfamily.com";

impl ApiConfig {
    /// Log directives used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug_logging {
            "rg_family_api=debug,tower_http=debug"
        } else {
            "rg_family_api=info,tower_http=info"
        }
    }
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_env_overrides(&lookup).with_store(&lookup)
    }

    fn with_env_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PORT").or_else(|| lookup("RG_API_PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_MAX_LIMIT") {
            self.api.max_limit = v.parse().ok().or(self.api.max_limit);
        }
        if let Some(v) = lookup("API_DEBUG_LOGGING") {
            self.api.debug_logging = v.parse().unwrap_or(self.api.debug_logging);
        }
        if let Some(v) = lookup("API_AUTH_TIMEOUT_MS") {
            self.api.auth_timeout_ms = v.parse().unwrap_or(self.api.auth_timeout_ms);
        }
        if let Some(v) = lookup("API_REQUEST_TIMEOUT_SECS") {
            self.store.request_timeout_secs = v.parse().unwrap_or(self.store.request_timeout_secs);
        }

        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SECURITY_SESSION_COOKIE") {
            if !v.trim().is_empty() {
                self.security.session_cookie = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }

        if let Some(v) = lookup("SITE_URL").or_else(|| lookup("NEXT_PUBLIC_SITE_URL")) {
            if !v.trim().is_empty() {
                self.site.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }

        self
    }

    fn with_store<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        self.store.use_mock_data = non_empty("USE_MOCK_DATA")
            .or_else(|| non_empty("NEXT_PUBLIC_USE_MOCK_DATA"))
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        self.store.mock_data_path = non_empty("MOCK_DATA_PATH");
        self.store.jwt_secret = non_empty("SUPABASE_JWT_SECRET");

        if self.store.use_mock_data {
            return Ok(self);
        }

        let url = non_empty("SUPABASE_URL")
            .or_else(|| non_empty("NEXT_PUBLIC_SUPABASE_URL"))
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        if url::Url::parse(&url).is_err() {
            return Err(ConfigError::Invalid { name: "SUPABASE_URL", value: url });
        }
        let service_key = non_empty("SUPABASE_SERVICE_ROLE_KEY")
            .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;
        let anon_key = non_empty("SUPABASE_ANON_KEY")
            .or_else(|| non_empty("NEXT_PUBLIC_SUPABASE_ANON_KEY"))
            .unwrap_or_else(|| service_key.clone());

        self.store.url = url.trim_end_matches('/').to_string();
        self.store.service_key = service_key;
        self.store.anon_key = anon_key;
        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig::unset(30),
            site: SiteConfig { base_url: DEFAULT_SITE_URL.to_string() },
            api: ApiConfig {
                port: 3000,
                max_limit: Some(1000),
                debug_logging: true,
                auth_timeout_ms: 5_000,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string()],
                session_cookie: "rg-session".to_string(),
                secure_cookies: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            store: StoreConfig::unset(10),
            site: SiteConfig { base_url: DEFAULT_SITE_URL.to_string() },
            api: ApiConfig {
                port: 3000,
                max_limit: Some(500),
                debug_logging: false,
                auth_timeout_ms: 3_000,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.rgfamily.com".to_string()],
                session_cookie: "rg-session".to_string(),
                secure_cookies: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            store: StoreConfig::unset(5),
            site: SiteConfig { base_url: DEFAULT_SITE_URL.to_string() },
            api: ApiConfig {
                port: 3000,
                max_limit: Some(100),
                debug_logging: false,
                auth_timeout_ms: 2_000,
            },
            security: SecurityConfig {
                cors_origins: vec![DEFAULT_SITE_URL.to_string()],
                session_cookie: "rg-session".to_string(),
                secure_cookies: true,
            },
        }
    }
}

impl StoreConfig {
    fn unset(request_timeout_secs: u64) -> Self {
        Self {
            use_mock_data: false,
            mock_data_path: None,
            url: String::new(),
            service_key: String::new(),
            anon_key: String::new(),
            jwt_secret: None,
            request_timeout_secs,
        }
    }
}
