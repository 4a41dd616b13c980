use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use autoclaim_domain::account::{Account, AccountUpdate, CheckinMode, Platform};
use autoclaim_domain::checkin::{AuthAdapter, CachePurge, CheckinOutcome, PlatformOutcome};

use super::balance::{balance_line, derive_balance};
use super::{persistence, take_rotated_session, CheckinOrchestrator};

/// Consecutive full failures tolerated before cached login artifacts are
/// considered stale and purged.
const PURGE_THRESHOLD: u32 = 2;

impl CheckinOrchestrator {
    /// Shared algorithm for both identity-provider methods.
    ///
    /// Targets the platform list derived from `checkin_mode`, in order. The
    /// primary platform (AnyRouter) owns the session/account-id/balance
    /// fields; the secondary only contributes its own balance. In Both mode
    /// a primary failure skips the secondary: its login piggybacks on
    /// identity state the primary attempt establishes.
    pub(super) async fn third_party_check_in(
        &self,
        account: &mut Account,
        adapter: &Arc<dyn AuthAdapter>,
        purge: &Arc<dyn CachePurge>,
        label: &str,
    ) -> Result<CheckinOutcome> {
        let mode = account.checkin_mode();
        let platforms = mode.platforms();
        let mut update = AccountUpdate::default();

        if account.checkin_error_count() > PURGE_THRESHOLD {
            self.purge_stale_cache(account, purge, label, &mut update)
                .await;
        }

        let mut results: Vec<PlatformOutcome> = Vec::new();
        let mut summaries: Vec<String> = Vec::new();

        for &platform in platforms {
            match adapter.login(account, platform).await {
                Ok(mut payload) => {
                    let rotated_session = take_rotated_session(&mut payload);

                    if platform.is_primary() {
                        update.session = payload.session.clone().or(rotated_session);
                        update.account_id = payload.api_user.clone();
                    }

                    let message = match payload.user_info.as_ref() {
                        Some(info) => {
                            if platform.is_primary() {
                                update.balance = Some(derive_balance(info.quota));
                                update.used =
                                    Some(derive_balance(info.used_quota.unwrap_or(0.0)));
                                update.aff_code = info.aff_code.clone();
                            } else {
                                update.agent_balance = Some(derive_balance(info.quota));
                            }
                            balance_line(info)
                        }
                        None => "Check-in successful".to_string(),
                    };

                    summaries.push(format!("{}: {}", platform, message));
                    results.push(PlatformOutcome::succeeded(platform, message));
                }
                Err(e) => {
                    warn!(
                        "[{}] {} login failed on {}: {}",
                        account.display_name(),
                        label,
                        platform,
                        e
                    );
                    results.push(PlatformOutcome::failed(platform, e.to_string()));

                    if mode == CheckinMode::Both && platform.is_primary() {
                        info!(
                            "[{}] Skipping {} after primary platform failure",
                            account.display_name(),
                            Platform::AgentRouter
                        );
                        break;
                    }
                }
            }
        }

        // Skipped platforms were never pushed, so "all" ranges over the
        // attempted ones only.
        let overall_success = results.iter().all(|r| r.success);
        let any_success = results.iter().any(|r| r.success);

        if any_success {
            update.checkin_date = Some(Utc::now());
        }
        update.checkin_error_count = if overall_success {
            Some(0)
        } else {
            Some(account.checkin_error_count() + 1)
        };

        persistence::persist_update(&self.registry, account, &update).await;
        account.apply_update(&update);

        let summary = if summaries.is_empty() {
            None
        } else {
            Some(summaries.join("\n"))
        };
        let error = results
            .iter()
            .find(|r| !r.success)
            .map(|r| format!("{}: {}", r.platform, r.message));

        Ok(CheckinOutcome {
            success: overall_success,
            method: label.to_string(),
            summary,
            error,
            platform_results: results,
        })
    }

    /// Clear cached login artifacts and reset the error counter before the
    /// attempt. Once a purge has reset the counter, re-running never purges
    /// again until failures re-accumulate past the threshold.
    async fn purge_stale_cache(
        &self,
        account: &mut Account,
        purge: &Arc<dyn CachePurge>,
        label: &str,
        update: &mut AccountUpdate,
    ) {
        info!(
            "[{}] {} consecutive failures, purging cached {} artifacts",
            account.display_name(),
            account.checkin_error_count(),
            label
        );

        if let Some(username) = account.username() {
            purge.purge(username).await;
        }

        update.checkin_error_count = Some(0);
        account.apply_update(&AccountUpdate {
            checkin_error_count: Some(0),
            ..Default::default()
        });
    }
}
