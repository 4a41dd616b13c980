use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::account::{Account, Platform};
use crate::shared::DomainError;

/// User info reported by a platform after login, in raw provider units
/// (500000 quota units per dollar).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderUserInfo {
    pub quota: f64,
    #[serde(default)]
    pub used_quota: Option<f64>,
    #[serde(default)]
    pub aff_code: Option<String>,
    /// Rotated token blob, if the platform re-issued tokens on login.
    /// Persisted through the session field and stripped from any echoed
    /// user info so it is never stored twice.
    #[serde(default)]
    pub tokens: Option<serde_json::Value>,
}

/// What a login attempt hands back on success.
#[derive(Debug, Clone, Default)]
pub struct LoginPayload {
    pub session: Option<String>,
    pub api_user: Option<String>,
    pub user_info: Option<ProviderUserInfo>,
}

/// Uniform login contract, one implementation per authentication strategy.
///
/// `platform` is only meaningful for third-party adapters; the password and
/// session adapters always target the primary platform.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait AuthAdapter: Send + Sync {
    async fn login(
        &self,
        account: &Account,
        platform: Platform,
    ) -> Result<LoginPayload, DomainError>;
}

/// Standalone cache-clearing capability, decoupled from login so the
/// orchestrator can purge stale artifacts without constructing an adapter.
///
/// Implementations are fire-and-forget: they log their own failures and
/// never propagate them.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait CachePurge: Send + Sync {
    async fn purge(&self, username: &str);
}
