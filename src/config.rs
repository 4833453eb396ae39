use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::api::AppState;
use crate::storage::{LocalFileStore, Repository};

/// Settings shared by every command. Each flag falls back to an
/// environment variable, then to its default.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// SQLite connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:pmbackend.db",
        global = true
    )]
    pub database_url: String,

    /// Maximum pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    pub max_connections: u32,

    /// Directory holding uploaded document files
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads", global = true)]
    pub upload_dir: PathBuf,
}

/// Settings for the HTTP server only.
#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Largest accepted request body, in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = 16)]
    pub max_upload_mb: usize,
}

impl Config {
    /// Connect to the record store and create any missing tables.
    pub async fn repository(&self) -> Result<Repository> {
        Repository::init(&self.database_url, self.max_connections).await
    }

    pub fn file_store(&self) -> LocalFileStore {
        LocalFileStore::new(&self.upload_dir)
    }

    pub async fn app_state(&self) -> Result<AppState> {
        Ok(AppState::new(self.repository().await?, self.file_store()))
    }
}

impl ServeConfig {
    pub fn max_body_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
