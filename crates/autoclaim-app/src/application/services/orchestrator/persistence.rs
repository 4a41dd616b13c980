use log::{debug, warn};
use std::sync::Arc;

use autoclaim_domain::account::{Account, AccountUpdate};
use autoclaim_domain::registry::AccountRegistry;

/// Flush one account's accumulated update to the registry.
///
/// Skipping is expected, not an error: no registry configured or no usable
/// id just means this deployment keeps state locally. A registry rejection
/// is logged and swallowed; persistence never flips the check-in outcome.
pub(super) async fn persist_update(
    registry: &Option<Arc<dyn AccountRegistry>>,
    account: &Account,
    update: &AccountUpdate,
) {
    if update.is_empty() {
        return;
    }

    let Some(registry) = registry else {
        debug!(
            "[{}] No registry configured, skipping account update",
            account.display_name()
        );
        return;
    };

    if account.id().is_empty() {
        debug!(
            "[{}] Account has no id, skipping account update",
            account.display_name()
        );
        return;
    }

    match registry.update_account_info(account.id(), update).await {
        Ok(()) => debug!("[{}] Account update persisted", account.display_name()),
        Err(e) => warn!(
            "[{}] Failed to persist account update: {}",
            account.display_name(),
            e
        ),
    }
}
