//! Environment-driven run configuration.
//!
//! All knobs come from `AUTOCLAIM_*` environment variables; nothing here is
//! global or mutable after load. Delay bounds are clamped at load time so
//! the batch runner can trust them.

use std::env;

use autoclaim_domain::account::Account;
use log::warn;

/// Minimum allowed inter-account delay, in seconds.
pub const MIN_DELAY_FLOOR_SECS: u64 = 5;
/// Margin enforced between the minimum and maximum delay.
pub const DELAY_MARGIN_SECS: u64 = 5;

const DEFAULT_MAX_DELAY_SECS: u64 = 60;

/// Where the account list comes from for this run.
#[derive(Debug, Clone)]
pub enum AccountSource {
    /// Parsed from the `AUTOCLAIM_ACCOUNTS` JSON array.
    Inline(Vec<Account>),
    /// `AUTOCLAIM_ACCOUNTS` was present but empty or unparsable.
    Invalid,
    /// No inline accounts; fetch the due-list from the registry.
    Remote,
    /// Neither inline accounts nor a registry endpoint configured.
    Unconfigured,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub base_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub accounts: AccountSource,
    pub registry: Option<RegistryConfig>,
    pub first_delay_enabled: bool,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl RunConfig {
    pub fn from_env() -> Self {
        let registry = env::var("AUTOCLAIM_REGISTRY_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|base_url| RegistryConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                token: env::var("AUTOCLAIM_REGISTRY_TOKEN").ok(),
            });

        let accounts = match env::var("AUTOCLAIM_ACCOUNTS") {
            Ok(raw) => match parse_accounts(&raw) {
                Some(accounts) => AccountSource::Inline(accounts),
                None => AccountSource::Invalid,
            },
            Err(_) if registry.is_some() => AccountSource::Remote,
            Err(_) => AccountSource::Unconfigured,
        };

        let first_delay_enabled = env::var("AUTOCLAIM_FIRST_DELAY")
            .map(|v| matches!(v.trim(), "1" | "true" | "on"))
            .unwrap_or(false);

        let max_delay_secs = env::var("AUTOCLAIM_MAX_DELAY")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_DELAY_SECS);

        let (min_delay_secs, max_delay_secs) = clamp_delays(MIN_DELAY_FLOOR_SECS, max_delay_secs);

        Self {
            accounts,
            registry,
            first_delay_enabled,
            min_delay_secs,
            max_delay_secs,
        }
    }
}

/// Parse the inline account list. Returns `None` for anything that is not a
/// non-empty JSON array of accounts; the caller treats that as "nothing
/// runnable" rather than an error.
pub fn parse_accounts(raw: &str) -> Option<Vec<Account>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Vec<Account>>(trimmed) {
        Ok(accounts) if !accounts.is_empty() => Some(accounts),
        Ok(_) => {
            warn!("Account configuration is an empty array");
            None
        }
        Err(e) => {
            warn!("Failed to parse account configuration: {}", e);
            None
        }
    }
}

/// Clamp delay bounds: minimum never below the floor, maximum never below
/// minimum + margin.
pub fn clamp_delays(min_secs: u64, max_secs: u64) -> (u64, u64) {
    let min = min_secs.max(MIN_DELAY_FLOOR_SECS);
    let max = max_secs.max(min + DELAY_MARGIN_SECS);
    (min, max)
}
