use async_trait::async_trait;

use crate::account::{Account, AccountUpdate};
use crate::shared::{AccountId, DomainError};

/// One page of accounts due for check-in, as returned by the registry.
#[derive(Debug, Clone)]
pub struct CheckinableBatch {
    pub total: usize,
    pub accounts: Vec<Account>,
    /// Reference date the registry computed the due-list against.
    pub date: String,
}

/// Remote account store. Fetches the due-list and receives sparse per-account
/// updates; it never participates in check-in decisions.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    async fn get_checkinable_accounts(&self) -> Result<CheckinableBatch, DomainError>;

    async fn update_account_info(
        &self,
        id: &AccountId,
        update: &AccountUpdate,
    ) -> Result<(), DomainError>;
}
