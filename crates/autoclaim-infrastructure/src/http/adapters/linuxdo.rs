use async_trait::async_trait;
use log::{info, warn};
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;

use autoclaim_domain::account::{Account, Platform};
use autoclaim_domain::checkin::{AuthAdapter, LoginPayload};
use autoclaim_domain::shared::DomainError;

use crate::cache::CookieCache;
use crate::http::client::HttpClient;
use crate::http::endpoints::PlatformEndpoints;

use super::{extract_api_user, fetch_user_info, perform_sign_in};

/// LinuxDo OAuth login. Relies on a previously captured LinuxDo cookie jar
/// per username; without one the platform cannot complete the OAuth
/// handshake non-interactively.
pub struct LinuxDoAdapter {
    client: Arc<HttpClient>,
    cache: CookieCache,
}

impl LinuxDoAdapter {
    pub fn new(client: Arc<HttpClient>, cache: CookieCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl AuthAdapter for LinuxDoAdapter {
    async fn login(
        &self,
        account: &Account,
        platform: Platform,
    ) -> Result<LoginPayload, DomainError> {
        let username = account.username().ok_or(DomainError::MissingCredentials)?;

        let mut cookies = self.cache.load(username).await.ok_or_else(|| {
            DomainError::ProviderLogin(format!(
                "No cached LinuxDo session for {}; interactive login required",
                username
            ))
        })?;

        let endpoints = PlatformEndpoints::for_platform(platform);

        // Complete the OAuth handshake against the target platform with the
        // cached identity cookies; a fresh login happens per platform.
        let response = self
            .client
            .api_request(
                Method::POST,
                &endpoints.oauth_url("linuxdo"),
                &cookies,
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
                "LinuxDo login rejected on {}: {}",
                platform, envelope.message
            )));
        }

        let session = response.set_cookies.get("session").cloned().ok_or_else(|| {
            DomainError::ProviderLogin(format!(
                "LinuxDo login on {} set no session cookie",
                platform
            ))
        })?;
        let api_user = extract_api_user(&envelope.data).ok_or_else(|| {
            DomainError::ProviderLogin("OAuth response carried no account id".to_string())
        })?;

        info!("[{}] LinuxDo login succeeded on {}", username, platform);

        // Keep the identity cookies fresh for the next run.
        for (name, value) in &response.set_cookies {
            cookies.insert(name.clone(), value.clone());
        }
        if let Err(e) = self.cache.save(username, &cookies).await {
            warn!("[{}] Failed to refresh LinuxDo cookie cache: {}", username, e);
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
