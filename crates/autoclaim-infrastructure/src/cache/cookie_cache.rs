use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use autoclaim_domain::checkin::CachePurge;

use super::sanitize;

/// Per-username LinuxDo cookie jar, one JSON file per user.
#[derive(Debug, Clone)]
pub struct CookieCache {
    root: PathBuf,
}

impl CookieCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default location under the OS cache directory.
    pub fn default_location() -> Self {
        let root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("autoclaim")
            .join("linuxdo");
        Self::new(root)
    }

    fn path_for(&self, username: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(username)))
    }

    /// Load cached cookies; `None` when absent or unreadable (a stale or
    /// corrupt cache is equivalent to no cache).
    pub async fn load(&self, username: &str) -> Option<HashMap<String, String>> {
        let path = self.path_for(username);
        let raw = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&raw) {
            Ok(cookies) => Some(cookies),
            Err(e) => {
                warn!("Discarding unreadable cookie cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub async fn save(
        &self,
        username: &str,
        cookies: &HashMap<String, String>,
    ) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let body = serde_json::to_string(cookies)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(self.path_for(username), body).await
    }

    pub async fn clear(&self, username: &str) -> std::io::Result<()> {
        let path = self.path_for(username);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Purge capability backed by [`CookieCache`].
pub struct LinuxDoCachePurge {
    cache: CookieCache,
}

impl LinuxDoCachePurge {
    pub fn new(cache: CookieCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl CachePurge for LinuxDoCachePurge {
    async fn purge(&self, username: &str) {
        match self.cache.clear(username).await {
            Ok(()) => info!("[{}] Cleared cached LinuxDo cookies", username),
            Err(e) => warn!("[{}] Failed to clear LinuxDo cookie cache: {}", username, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_clear_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CookieCache::new(dir.path().to_path_buf());

        let mut cookies = HashMap::new();
        cookies.insert("session".to_string(), "abc".to_string());

        cache.save("alice", &cookies).await.unwrap();
        let loaded = cache.load("alice").await.unwrap();
        assert_eq!(loaded.get("session").map(String::as_str), Some("abc"));

        cache.clear("alice").await.unwrap();
        assert!(cache.load("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CookieCache::new(dir.path().to_path_buf());
        assert!(cache.clear("nobody").await.is_ok());
    }

    #[tokio::test]
    async fn test_purge_swallows_everything() {
        let dir = tempfile::tempdir().unwrap();
        let purge = LinuxDoCachePurge::new(CookieCache::new(dir.path().to_path_buf()));
        // No cache present; must not panic or error.
        purge.purge("nobody").await;
    }
}
