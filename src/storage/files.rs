use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// Physical storage for uploaded document bytes, addressed by relative keys.
pub trait FileStore: Send + Sync {
    fn save(&self, key: &str, bytes: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    fn exists(&self, key: &str) -> impl Future<Output = io::Result<bool>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = io::Result<()>> + Send;
}

/// Stores files under a root directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a path under the root. Keys that are absolute or climb
    /// out of the root are refused.
    pub fn resolve(&self, key: &str) -> io::Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

        if key.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {}", key),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStore for LocalFileStore {
    async fn save(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(key)?;
        let Some(parent) = path.parent() else {
            return tokio::fs::write(&path, bytes).await;
        };

        tokio::fs::create_dir_all(parent).await?;
        match tokio::fs::write(&path, bytes).await {
            // A concurrent remove may have pruned the directory in between
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tokio::fs::create_dir_all(parent).await?;
                tokio::fs::write(&path, bytes).await
            }
            result => result,
        }
    }

    async fn exists(&self, key: &str) -> io::Result<bool> {
        let path = self.resolve(key)?;
        tokio::fs::try_exists(&path).await
    }

    /// Remove the file, then its directory if nothing else is left in it.
    /// The root itself is never removed.
    async fn remove(&self, key: &str) -> io::Result<()> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path).await?;

        if let Some(parent) = path.parent().filter(|parent| *parent != self.root.as_path()) {
            // Left in place while other files remain
            if tokio::fs::remove_dir(parent).await.is_ok() {
                debug!(dir = %parent.display(), "removed empty upload directory");
            }
        }
        Ok(())
    }
}
