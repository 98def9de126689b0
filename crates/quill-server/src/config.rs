use std::path::PathBuf;

use anyhow::Result;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub secret_key: String,
}

impl Config {
    /// Read configuration from the environment, with dev defaults.
    pub fn from_env() -> Result<Self> {
        let secret_key =
            std::env::var("QUILL_SECRET_KEY").unwrap_or_else(|_| "dev-secret-change-me".into());
        let db_path = std::env::var("QUILL_DB_PATH").unwrap_or_else(|_| "quill.db".into());
        let host = std::env::var("QUILL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("QUILL_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()?;

        Ok(Self {
            host,
            port,
            db_path: PathBuf::from(db_path),
            secret_key,
        })
    }
}
