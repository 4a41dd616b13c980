use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use autoclaim_domain::checkin::CachePurge;

use super::sanitize;

/// Per-username GitHub profile directory. The directory holds whatever the
/// login flow persisted; this code only reads the session state file and
/// deletes the directory wholesale on purge.
#[derive(Debug, Clone)]
pub struct ProfileDir {
    root: PathBuf,
}

const STATE_FILE: &str = "state.json";

impl ProfileDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn default_location() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("autoclaim")
            .join("profiles");
        Self::new(root)
    }

    pub fn dir_for(&self, username: &str) -> PathBuf {
        self.root.join(sanitize(username))
    }

    pub async fn load_state(&self, username: &str) -> Option<HashMap<String, String>> {
        let path = self.dir_for(username).join(STATE_FILE);
        let raw = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Discarding unreadable profile state {}: {}", path.display(), e);
                None
            }
        }
    }

    pub async fn save_state(
        &self,
        username: &str,
        state: &HashMap<String, String>,
    ) -> std::io::Result<()> {
        let dir = self.dir_for(username);
        tokio::fs::create_dir_all(&dir).await?;
        let body = serde_json::to_string(state)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(dir.join(STATE_FILE), body).await
    }

    pub async fn delete(&self, username: &str) -> std::io::Result<()> {
        let dir = self.dir_for(username);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Purge capability backed by [`ProfileDir`].
pub struct GithubCachePurge {
    profiles: ProfileDir,
}

impl GithubCachePurge {
    pub fn new(profiles: ProfileDir) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl CachePurge for GithubCachePurge {
    async fn purge(&self, username: &str) {
        match self.profiles.delete(username).await {
            Ok(()) => info!("[{}] Deleted GitHub profile directory", username),
            Err(e) => warn!("[{}] Failed to delete GitHub profile directory: {}", username, e),
        }
    }
}
