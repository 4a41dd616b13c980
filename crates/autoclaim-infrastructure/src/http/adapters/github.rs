use async_trait::async_trait;
use log::{info, warn};
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;

use autoclaim_domain::account::{Account, Platform};
use autoclaim_domain::checkin::{AuthAdapter, LoginPayload};
use autoclaim_domain::shared::DomainError;

use crate::cache::ProfileDir;
use crate::http::client::HttpClient;
use crate::http::endpoints::PlatformEndpoints;

use super::{extract_api_user, fetch_user_info, perform_sign_in};

/// GitHub OAuth login. Session state lives in a per-user profile directory
/// captured by an interactive login; a missing or stale profile means this
/// run cannot authenticate.
pub struct GithubAdapter {
    client: Arc<HttpClient>,
    profiles: ProfileDir,
}

impl GithubAdapter {
    pub fn new(client: Arc<HttpClient>, profiles: ProfileDir) -> Self {
        Self { client, profiles }
    }
}

#[async_trait]
impl AuthAdapter for GithubAdapter {
    async fn login(
        &self,
        account: &Account,
        platform: Platform,
    ) -> Result<LoginPayload, DomainError> {
        let username = account.username().ok_or(DomainError::MissingCredentials)?;

        let mut state = self.profiles.load_state(username).await.ok_or_else(|| {
            DomainError::ProviderLogin(format!(
                "No GitHub profile for {}; interactive login required",
                username
            ))
        })?;

        let endpoints = PlatformEndpoints::for_platform(platform);

        let response = self
            .client
            .api_request(
                Method::POST,
                &endpoints.oauth_url("github"),
                &state,
                None,
                None,
            )
            .await
            .map_err(|e| DomainError::Infrastructure(format!("OAuth request failed: {}", e)))?;

        let envelope = response
            .envelope()
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        if !envelope.success {
            return Err(DomainError::ProviderLogin(format!(
                "GitHub login rejected on {}: {}",
                platform, envelope.message
            )));
        }

        let session = response.set_cookies.get("session").cloned().ok_or_else(|| {
            DomainError::ProviderLogin(format!(
                "GitHub login on {} set no session cookie",
                platform
            ))
        })?;
        let api_user = extract_api_user(&envelope.data).ok_or_else(|| {
            DomainError::ProviderLogin("OAuth response carried no account id".to_string())
        })?;

        info!("[{}] GitHub login succeeded on {}", username, platform);

        for (name, value) in &response.set_cookies {
            state.insert(name.clone(), value.clone());
        }
        if let Err(e) = self.profiles.save_state(username, &state).await {
            warn!("[{}] Failed to refresh GitHub profile state: {}", username, e);
        }

        let mut platform_cookies = HashMap::new();
        platform_cookies.insert("session".to_string(), session.clone());

        let message = perform_sign_in(&self.client, &endpoints, &platform_cookies, &api_user).await?;
        info!("[{}] Check-in on {}: {}", username, platform, message);

        let user_info =
            fetch_user_info(&self.client, &endpoints, &platform_cookies, &api_user).await?;

        Ok(LoginPayload {
            session: Some(session),
            api_user: Some(api_user),
            user_info: Some(user_info),
        })
    }
}
