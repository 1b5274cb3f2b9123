use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub gate: GateConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Front-end build served behind the gate
    pub static_dir: String,
    pub enable_request_logging: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub credential_cookie: String,
    pub role_cookie: String,
    pub login_path: String,
    pub landing_path: String,
    /// Every path under this prefix is part of the sign-in flow
    pub auth_prefix: String,
    /// Backend API routes never reach the gate
    pub api_prefix: String,
    /// When set, credentials must carry a valid HMAC signature
    pub jwt_secret: Option<String>,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub hide_delay_ms: u64,
    pub redirect_delay_ms: u64,
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            credential_cookie: "token".to_string(),
            role_cookie: "role".to_string(),
            login_path: "/auth/login".to_string(),
            landing_path: "/mural".to_string(),
            auth_prefix: "/auth".to_string(),
            api_prefix: "/api".to_string(),
            jwt_secret: None,
            secure_cookies: false,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_ms: 30_000,
            hide_delay_ms: 800,
            redirect_delay_ms: 1_500,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_STATIC_DIR") {
            self.server.static_dir = v;
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }
        if let Ok(v) = env::var("SERVER_CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Gate overrides
        if let Ok(v) = env::var("GATE_CREDENTIAL_COOKIE") {
            self.gate.credential_cookie = v;
        }
        if let Ok(v) = env::var("GATE_ROLE_COOKIE") {
            self.gate.role_cookie = v;
        }
        if let Ok(v) = env::var("GATE_LOGIN_PATH") {
            self.gate.login_path = v;
        }
        if let Ok(v) = env::var("GATE_LANDING_PATH") {
            self.gate.landing_path = v;
        }
        if let Ok(v) = env::var("GATE_JWT_SECRET") {
            self.gate.jwt_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("GATE_SECURE_COOKIES") {
            self.gate.secure_cookies = v.parse().unwrap_or(self.gate.secure_cookies);
        }

        // Client overrides
        if let Ok(v) = env::var("UPC_API_BASE_URL") {
            self.client.api_base_url = v;
        }
        if let Ok(v) = env::var("CLIENT_REQUEST_TIMEOUT_MS") {
            self.client.request_timeout_ms = v.parse().unwrap_or(self.client.request_timeout_ms);
        }
        if let Ok(v) = env::var("CLIENT_HIDE_DELAY_MS") {
            self.client.hide_delay_ms = v.parse().unwrap_or(self.client.hide_delay_ms);
        }
        if let Ok(v) = env::var("CLIENT_REDIRECT_DELAY_MS") {
            self.client.redirect_delay_ms = v.parse().unwrap_or(self.client.redirect_delay_ms);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                static_dir: "public".to_string(),
                enable_request_logging: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            gate: GateConfig::default(),
            client: ClientConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                static_dir: "public".to_string(),
                enable_request_logging: true,
                cors_origins: vec!["https://staging.upconnection.com.br".to_string()],
            },
            gate: GateConfig {
                secure_cookies: true,
                ..GateConfig::default()
            },
            client: ClientConfig {
                api_base_url: "https://api.staging.upconnection.com.br".to_string(),
                ..ClientConfig::default()
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                static_dir: "public".to_string(),
                enable_request_logging: false,
                cors_origins: vec!["https://upconnection.com.br".to_string()],
            },
            gate: GateConfig {
                secure_cookies: true,
                ..GateConfig::default()
            },
            client: ClientConfig {
                api_base_url: "https://api.upconnection.com.br".to_string(),
                request_timeout_ms: 15_000,
                ..ClientConfig::default()
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
