use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

use autoclaim_domain::account::{Account, Platform};
use autoclaim_domain::checkin::{AuthAdapter, LoginPayload};
use autoclaim_domain::shared::DomainError;

use crate::http::client::HttpClient;
use crate::http::endpoints::PlatformEndpoints;

use super::{fetch_user_info, perform_sign_in};

/// Reuses a stored session token instead of re-authenticating. A rejection
/// here is reported as a plain error; the orchestrator treats it as a signal
/// to fall through to the configured credential method.
pub struct SessionAdapter {
    client: Arc<HttpClient>,
}

impl SessionAdapter {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthAdapter for SessionAdapter {
    async fn login(
        &self,
        account: &Account,
        platform: Platform,
    ) -> Result<LoginPayload, DomainError> {
        let session = account
            .session()
            .ok_or(DomainError::MissingCredentials)?;
        let api_user = account
            .external_account_id()
            .ok_or(DomainError::MissingCredentials)?;

        let endpoints = PlatformEndpoints::for_platform(platform);
        let mut cookies = HashMap::new();
        cookies.insert("session".to_string(), session.to_string());

        let message = perform_sign_in(&self.client, &endpoints, &cookies, api_user).await?;
        info!("[{}] Session check-in on {}: {}", account.display_name(), platform, message);

        let user_info = fetch_user_info(&self.client, &endpoints, &cookies, api_user).await?;

        // Rotated tokens, when present, arrive inside the user info blob;
        // the orchestrator lifts them into the persisted session field.
        Ok(LoginPayload {
            session: None,
            api_user: None,
            user_info: Some(user_info),
        })
    }
}
