use async_trait::async_trait;
use log::info;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;

use autoclaim_domain::account::{Account, Platform};
use autoclaim_domain::checkin::{AuthAdapter, LoginPayload};
use autoclaim_domain::shared::DomainError;

use crate::http::client::HttpClient;
use crate::http::endpoints::PlatformEndpoints;

use super::{extract_api_user, fetch_user_info, perform_sign_in};

/// Credential login. Single-platform by construction: password accounts
/// only exist on the primary platform.
pub struct PasswordAdapter {
    client: Arc<HttpClient>,
}

impl PasswordAdapter {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthAdapter for PasswordAdapter {
    async fn login(
        &self,
        account: &Account,
        platform: Platform,
    ) -> Result<LoginPayload, DomainError> {
        let username = account.username().ok_or(DomainError::MissingCredentials)?;
        let password = account.password().ok_or(DomainError::MissingCredentials)?;

        let endpoints = PlatformEndpoints::for_platform(platform);
        let body = serde_json::json!({ "username": username, "password": password });

        let response = self
            .client
            .api_request(
                Method::POST,
                &endpoints.login_url(),
                &HashMap::new(),
                None,
                Some(&body),
            )
            .await
            .map_err(|e| DomainError::Infrastructure(format!("Login request failed: {}", e)))?;

        let envelope = response
            .envelope()
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        if !envelope.success {
            return Err(DomainError::ProviderLogin(format!(
                "Password login rejected: {}",
                envelope.message
            )));
        }

        let session = response.set_cookies.get("session").cloned().ok_or_else(|| {
            DomainError::ProviderLogin("Login succeeded but no session cookie was set".to_string())
        })?;
        let api_user = extract_api_user(&envelope.data).ok_or_else(|| {
            DomainError::ProviderLogin("Login response carried no account id".to_string())
        })?;

        info!("[{}] Password login succeeded on {}", username, platform);

        let mut cookies = HashMap::new();
        cookies.insert("session".to_string(), session.clone());

        let message = perform_sign_in(&self.client, &endpoints, &cookies, &api_user).await?;
        info!("[{}] Check-in on {}: {}", username, platform, message);

        let user_info = fetch_user_info(&self.client, &endpoints, &cookies, &api_user).await?;

        Ok(LoginPayload {
            session: Some(session),
            api_user: Some(api_user),
            user_info: Some(user_info),
        })
    }
}
