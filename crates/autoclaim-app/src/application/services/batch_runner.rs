use log::{error, info};
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

use autoclaim_domain::account::Account;
use autoclaim_domain::checkin::CheckinOutcome;

use super::orchestrator::{AccountCheckinResult, CheckinOrchestrator};

/// Recipient used for results with no notification email configured.
pub const DEFAULT_RECIPIENT: &str = "default";

/// Delay policy for a batch run. Passed in at construction; nothing global.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub first_delay_enabled: bool,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            first_delay_enabled: false,
            min_delay_secs: 5,
            max_delay_secs: 60,
        }
    }
}

/// Per-recipient success statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub success_count: usize,
    pub total: usize,
}

/// Aggregate outcome of one batch run. `success` means at least one account
/// succeeded, not all of them.
#[derive(Debug)]
pub struct BatchSummary {
    pub success: bool,
    pub success_count: usize,
    pub total: usize,
    pub results: Vec<AccountCheckinResult>,
    pub groups: HashMap<String, GroupStats>,
}

impl BatchSummary {
    pub fn empty() -> Self {
        Self {
            success: false,
            success_count: 0,
            total: 0,
            results: Vec::new(),
            groups: HashMap::new(),
        }
    }
}

/// Sequentially drives the account list through the orchestrator.
///
/// Sequential on purpose: the randomized inter-account delay is the
/// backpressure mechanism that keeps the target platforms from
/// rate-limiting the whole batch.
pub struct BatchRunner {
    orchestrator: CheckinOrchestrator,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(orchestrator: CheckinOrchestrator, config: BatchConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    #[instrument(skip(self, accounts), fields(batch_size = accounts.len()))]
    pub async fn run(&self, accounts: Vec<Account>) -> BatchSummary {
        let total = accounts.len();
        let mut results = Vec::with_capacity(total);

        for (index, mut account) in accounts.into_iter().enumerate() {
            if index > 0 || self.config.first_delay_enabled {
                let delay = pick_delay(&self.config, &mut rand::thread_rng());
                info!(
                    "Waiting {}s before account {}/{}",
                    delay.as_secs(),
                    index + 1,
                    total
                );
                tokio::time::sleep(delay).await;
            }

            let outcome = match self.orchestrator.execute_check_in(&mut account).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Contained at the account boundary; the batch goes on.
                    error!(
                        "[{}] Unexpected error during check-in: {}",
                        account.display_name(),
                        e
                    );
                    CheckinOutcome::failed(
                        account.auth_method().label(),
                        format!("Unexpected error: {}", e),
                    )
                }
            };

            if outcome.success {
                info!("[{}] Check-in succeeded", account.display_name());
            } else {
                info!(
                    "[{}] Check-in failed: {}",
                    account.display_name(),
                    outcome.error.as_deref().unwrap_or("unknown")
                );
            }

            results.push(AccountCheckinResult {
                account_id: account.id().as_str().to_string(),
                username: account.username().map(str::to_string),
                notify_email: account.notify_email().map(str::to_string),
                outcome,
            });
        }

        summarize(results)
    }
}

/// Uniform random delay within the configured bounds.
fn pick_delay(config: &BatchConfig, rng: &mut impl Rng) -> Duration {
    let min = config.min_delay_secs.min(config.max_delay_secs);
    let max = config.max_delay_secs.max(config.min_delay_secs);
    Duration::from_secs(rng.gen_range(min..=max))
}

/// Group results by notification recipient and compute aggregate counts.
fn summarize(results: Vec<AccountCheckinResult>) -> BatchSummary {
    let total = results.len();
    let success_count = results.iter().filter(|r| r.success()).count();

    let mut groups: HashMap<String, GroupStats> = HashMap::new();
    for result in &results {
        let recipient = result
            .notify_email
            .as_deref()
            .unwrap_or(DEFAULT_RECIPIENT)
            .to_string();
        let stats = groups.entry(recipient).or_default();
        stats.total += 1;
        if result.success() {
            stats.success_count += 1;
        }
    }

    BatchSummary {
        success: success_count > 0,
        success_count,
        total,
        results,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoclaim_domain::checkin::CheckinOutcome;

    fn result(id: &str, email: Option<&str>, success: bool) -> AccountCheckinResult {
        let outcome = if success {
            CheckinOutcome::succeeded("password", None)
        } else {
            CheckinOutcome::failed("password", "login failed")
        };
        AccountCheckinResult {
            account_id: id.to_string(),
            username: None,
            notify_email: email.map(str::to_string),
            outcome,
        }
    }

    #[test]
    fn test_batch_success_means_at_least_one() {
        let summary = summarize(vec![
            result("1", None, true),
            result("2", None, true),
            result("3", None, false),
        ]);
        assert!(summary.success);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn test_batch_all_failed_is_failure() {
        let summary = summarize(vec![result("1", None, false), result("2", None, false)]);
        assert!(!summary.success);
        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn test_grouping_falls_back_to_default_recipient() {
        let summary = summarize(vec![
            result("1", Some("a@example.com"), true),
            result("2", Some("a@example.com"), false),
            result("3", None, true),
        ]);

        assert_eq!(
            summary.groups.get("a@example.com"),
            Some(&GroupStats {
                success_count: 1,
                total: 2
            })
        );
        assert_eq!(
            summary.groups.get(DEFAULT_RECIPIENT),
            Some(&GroupStats {
                success_count: 1,
                total: 1
            })
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::empty();
        assert!(!summary.success);
        assert!(summary.results.is_empty());
    }

    #[test]
    fn test_pick_delay_stays_in_bounds() {
        let config = BatchConfig {
            first_delay_enabled: false,
            min_delay_secs: 5,
            max_delay_secs: 10,
        };
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let delay = pick_delay(&config, &mut rng);
            assert!(delay.as_secs() >= 5 && delay.as_secs() <= 10);
        }
    }

    #[test]
    fn test_pick_delay_handles_inverted_bounds() {
        let config = BatchConfig {
            first_delay_enabled: false,
            min_delay_secs: 20,
            max_delay_secs: 10,
        };
        let delay = pick_delay(&config, &mut rand::thread_rng());
        assert!(delay.as_secs() >= 10 && delay.as_secs() <= 20);
    }
}
