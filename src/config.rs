use anyhow::{Context, Result};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_PATH: &str = "trapdb";
const DEFAULT_STORAGE_DIR: &str = "static/profile_pics";
const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub db_path: String,
    pub storage_dir: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    /// Created as an admin with the default password on first start.
    pub admin_email: Option<String>,
}

impl Config {
    /// Reads settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = dotenvy::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let token_ttl_secs = match dotenvy::var("TRAPWATCH_TOKEN_TTL_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid TRAPWATCH_TOKEN_TTL_SECS: {raw}"))?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Self {
            addr: dotenvy::var("TRAPWATCH_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string()),
            db_path: dotenvy::var("TRAPWATCH_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            storage_dir: dotenvy::var("TRAPWATCH_STORAGE")
                .unwrap_or_else(|_| DEFAULT_STORAGE_DIR.to_string()),
            jwt_secret,
            token_ttl_secs,
            admin_email: dotenvy::var("TRAPWATCH_ADMIN_EMAIL")
                .ok()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
        })
    }
}
