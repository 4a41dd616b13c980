use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{AuthMethod, CheckinMode};
use crate::shared::AccountId;

/// Account record as persisted in the remote registry.
///
/// Read at batch start, mutated in memory while the orchestrator runs, and
/// flushed back as a sparse [`AccountUpdate`] once per account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    session: Option<String>,
    /// External api-user id returned by the platform on login.
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    account_type: AuthMethod,
    #[serde(default)]
    checkin_mode: CheckinMode,
    #[serde(default)]
    checkin_error_count: u32,
    #[serde(default)]
    checkin_date: Option<DateTime<Utc>>,
    #[serde(default)]
    balance: Option<i64>,
    #[serde(default)]
    used: Option<i64>,
    #[serde(default)]
    aff_code: Option<String>,
    #[serde(default)]
    agent_balance: Option<i64>,
    #[serde(default)]
    notify_email: Option<String>,
}

impl Account {
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            username: None,
            password: None,
            session: None,
            account_id: None,
            account_type: AuthMethod::default(),
            checkin_mode: CheckinMode::default(),
            checkin_error_count: 0,
            checkin_date: None,
            balance: None,
            used: None,
            aff_code: None,
            agent_balance: None,
            notify_email: None,
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn external_account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.account_type
    }

    pub fn checkin_mode(&self) -> CheckinMode {
        self.checkin_mode
    }

    pub fn checkin_error_count(&self) -> u32 {
        self.checkin_error_count
    }

    pub fn checkin_date(&self) -> Option<DateTime<Utc>> {
        self.checkin_date
    }

    pub fn notify_email(&self) -> Option<&str> {
        self.notify_email.as_deref()
    }

    /// Display name for logs: username when present, id otherwise.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    /// A stored session is only trusted when the external account id that
    /// goes with it is also present. Expiry is not checked here; the session
    /// adapter's own rejection is authoritative.
    pub fn has_session_credentials(&self) -> bool {
        matches!(&self.session, Some(s) if !s.is_empty())
            && matches!(&self.account_id, Some(a) if !a.is_empty())
    }

    pub fn has_password_credentials(&self) -> bool {
        matches!(&self.username, Some(u) if !u.is_empty())
            && matches!(&self.password, Some(p) if !p.is_empty())
    }

    /// Fold a persisted delta back into the in-memory record so later
    /// strategy decisions in the same run see the refreshed state.
    pub fn apply_update(&mut self, update: &AccountUpdate) {
        if let Some(date) = update.checkin_date {
            self.checkin_date = Some(date);
        }
        if let Some(balance) = update.balance {
            self.balance = Some(balance);
        }
        if let Some(used) = update.used {
            self.used = Some(used);
        }
        if let Some(aff_code) = &update.aff_code {
            self.aff_code = Some(aff_code.clone());
        }
        if let Some(session) = &update.session {
            self.session = Some(session.clone());
        }
        if let Some(account_id) = &update.account_id {
            self.account_id = Some(account_id.clone());
        }
        if let Some(agent_balance) = update.agent_balance {
            self.agent_balance = Some(agent_balance);
        }
        if let Some(count) = update.checkin_error_count {
            self.checkin_error_count = count;
        }
    }

    pub fn builder(id: &str) -> AccountBuilder {
        AccountBuilder::new(id)
    }
}

/// Sparse persisted delta; `None` fields are omitted from the registry call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aff_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_balance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_error_count: Option<u32>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self == &AccountUpdate::default()
    }
}

/// Builder for assembling accounts field by field, used by fixtures and tests.
pub struct AccountBuilder {
    account: Account,
}

impl AccountBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            account: Account::new(AccountId::from_string(id)),
        }
    }

    pub fn username(mut self, username: &str) -> Self {
        self.account.username = Some(username.to_string());
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.account.password = Some(password.to_string());
        self
    }

    pub fn session(mut self, session: &str) -> Self {
        self.account.session = Some(session.to_string());
        self
    }

    pub fn external_account_id(mut self, account_id: &str) -> Self {
        self.account.account_id = Some(account_id.to_string());
        self
    }

    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.account.account_type = method;
        self
    }

    pub fn checkin_mode(mut self, mode: CheckinMode) -> Self {
        self.account.checkin_mode = mode;
        self
    }

    pub fn checkin_error_count(mut self, count: u32) -> Self {
        self.account.checkin_error_count = count;
        self
    }

    pub fn notify_email(mut self, email: &str) -> Self {
        self.account.notify_email = Some(email.to_string());
        self
    }

    pub fn build(self) -> Account {
        self.account
    }
}
