use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use tracing::instrument;

use autoclaim_domain::account::{Account, AccountUpdate, AuthMethod, Platform};
use autoclaim_domain::checkin::{AuthAdapter, CachePurge, CheckinOutcome, LoginPayload};
use autoclaim_domain::registry::AccountRegistry;
use autoclaim_domain::shared::DomainError;

mod balance;
mod persistence;
mod third_party;
mod types;

#[cfg(test)]
mod tests;

pub use types::AccountCheckinResult;

use balance::{balance_line, derive_balance};

/// One login adapter per authentication strategy.
pub struct AdapterSet {
    pub session: Arc<dyn AuthAdapter>,
    pub password: Arc<dyn AuthAdapter>,
    pub linuxdo: Arc<dyn AuthAdapter>,
    pub github: Arc<dyn AuthAdapter>,
}

/// Cache-clearing capabilities for the third-party methods.
pub struct PurgeSet {
    pub linuxdo: Arc<dyn CachePurge>,
    pub github: Arc<dyn CachePurge>,
}

/// Drives one account through strategy selection, platform attempts and
/// registry persistence.
pub struct CheckinOrchestrator {
    adapters: AdapterSet,
    purges: PurgeSet,
    registry: Option<Arc<dyn AccountRegistry>>,
}

impl CheckinOrchestrator {
    pub fn new(
        adapters: AdapterSet,
        purges: PurgeSet,
        registry: Option<Arc<dyn AccountRegistry>>,
    ) -> Self {
        Self {
            adapters,
            purges,
            registry,
        }
    }

    /// Execute check-in for a single account.
    ///
    /// Strategy order: a stored session (with its external account id) is
    /// always tried first, regardless of the configured method; only when
    /// that is absent or rejected does the configured credential method run.
    #[instrument(skip(self, account), fields(account = %account.display_name()))]
    pub async fn execute_check_in(&self, account: &mut Account) -> Result<CheckinOutcome> {
        let method = account.auth_method();

        if account.has_session_credentials() {
            if let Some(outcome) = self.try_session_check_in(account).await {
                return Ok(outcome);
            }
            info!(
                "[{}] Stored session rejected, falling back to {} login",
                account.display_name(),
                method.label()
            );
        }

        if !account.has_password_credentials() {
            return Ok(CheckinOutcome::failed(
                method.label(),
                DomainError::MissingCredentials.to_string(),
            ));
        }

        match method {
            AuthMethod::Password => self.password_check_in(account).await,
            AuthMethod::LinuxDo => {
                self.third_party_check_in(account, &self.adapters.linuxdo, &self.purges.linuxdo, "linuxdo")
                    .await
            }
            AuthMethod::Github => {
                self.third_party_check_in(account, &self.adapters.github, &self.purges.github, "github")
                    .await
            }
            AuthMethod::Unknown(code) => Ok(CheckinOutcome::failed(
                method.label(),
                DomainError::UnknownAuthMethod(code).to_string(),
            )),
        }
    }

    /// Session-first attempt. `None` means "try another method": the stored
    /// session was rejected, which is not a check-in failure and never
    /// touches the consecutive-error counter.
    async fn try_session_check_in(&self, account: &mut Account) -> Option<CheckinOutcome> {
        let mut payload = match self
            .adapters
            .session
            .login(account, Platform::AnyRouter)
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                info!(
                    "[{}] Session check-in not usable: {}",
                    account.display_name(),
                    e
                );
                return None;
            }
        };

        let rotated_session = take_rotated_session(&mut payload);

        let mut update = AccountUpdate {
            checkin_date: Some(Utc::now()),
            session: rotated_session,
            ..Default::default()
        };
        let summary = payload.user_info.as_ref().map(|info| {
            update.balance = Some(derive_balance(info.quota));
            update.used = Some(derive_balance(info.used_quota.unwrap_or(0.0)));
            update.aff_code = info.aff_code.clone();
            balance_line(info)
        });

        persistence::persist_update(&self.registry, account, &update).await;
        account.apply_update(&update);

        Some(CheckinOutcome::succeeded("session", summary))
    }

    /// Password login, single platform. Failures here are terminal for the
    /// run but deliberately do not feed the consecutive-error counter; that
    /// counter only tracks staleness of third-party cached artifacts.
    async fn password_check_in(&self, account: &mut Account) -> Result<CheckinOutcome> {
        let mut payload = match self
            .adapters
            .password
            .login(account, Platform::AnyRouter)
            .await
        {
            Ok(payload) => payload,
            Err(e) => return Ok(CheckinOutcome::failed("password", e.to_string())),
        };

        let rotated_session = take_rotated_session(&mut payload);

        let mut update = AccountUpdate {
            checkin_date: Some(Utc::now()),
            session: payload.session.clone().or(rotated_session),
            account_id: payload.api_user.clone(),
            ..Default::default()
        };
        let summary = payload.user_info.as_ref().map(|info| {
            update.balance = Some(derive_balance(info.quota));
            update.used = Some(derive_balance(info.used_quota.unwrap_or(0.0)));
            update.aff_code = info.aff_code.clone();
            balance_line(info)
        });

        persistence::persist_update(&self.registry, account, &update).await;
        account.apply_update(&update);

        Ok(CheckinOutcome::succeeded("password", summary))
    }
}

/// Lift a rotated session out of the payload. The token blob is removed
/// from the user-info echo here so it is never persisted twice.
fn take_rotated_session(payload: &mut LoginPayload) -> Option<String> {
    let from_tokens = payload
        .user_info
        .as_mut()
        .and_then(|info| info.tokens.take())
        .and_then(|tokens| {
            tokens
                .get("session")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });

    payload.session.take().or(from_tokens)
}
