/*
 * Responsibility
 * - environment / configuration loading (MONGODB_URI, JWT_SECRET, auth scheme, ...)
 * - validation of configured values (fail startup if missing)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which bearer scheme guards the protected routes.
///
/// - `Firebase`: ID tokens verified against the identity provider's JWKS
/// - `Signed`: self-issued HS256 tokens (the same secret `/getToken` signs with)
#[derive(Debug, Clone)]
pub enum AuthScheme {
    Firebase { project_id: String },
    Signed,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub mongodb_uri: String,
    pub db_name: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    pub signed_token_ttl_seconds: i64,
    pub auth_scheme: AuthScheme,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let mongodb_uri =
            std::env::var("MONGODB_URI").map_err(|_| ConfigError::Missing("MONGODB_URI"))?;

        let db_name = std::env::var("DB_NAME").unwrap_or_else(|_| "smart_deals_db".to_string());

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let signed_token_ttl_seconds = std::env::var("SIGNED_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(3600);

        let auth_scheme = match std::env::var("AUTH_SCHEME")
            .unwrap_or_else(|_| "firebase".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "firebase" => {
                let project_id = std::env::var("FIREBASE_PROJECT_ID")
                    .map_err(|_| ConfigError::Missing("FIREBASE_PROJECT_ID"))?;
                AuthScheme::Firebase { project_id }
            }
            "signed" => AuthScheme::Signed,
            _ => return Err(ConfigError::Invalid("AUTH_SCHEME")),
        };

        Ok(Self {
            addr,
            mongodb_uri,
            db_name,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            signed_token_ttl_seconds,
            auth_scheme,
        })
    }
}
