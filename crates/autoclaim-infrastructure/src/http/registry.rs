use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use autoclaim_domain::account::{Account, AccountUpdate};
use autoclaim_domain::registry::{AccountRegistry, CheckinableBatch};
use autoclaim_domain::shared::{AccountId, DomainError};

use crate::config::RegistryConfig;
use crate::http::client::USER_AGENT;

/// HTTP client for the remote account registry.
pub struct HttpAccountRegistry {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAccountRegistry {
    pub fn new(config: &RegistryConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create registry HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl AccountRegistry for HttpAccountRegistry {
    async fn get_checkinable_accounts(&self) -> Result<CheckinableBatch, DomainError> {
        let url = format!("{}/api/accounts/checkinable", self.base_url);
        debug!("Fetching checkinable accounts from {}", url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| DomainError::Registry(format!("Fetch failed: {}", e)))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::Registry(format!("Invalid fetch response: {}", e)))?;

        if !status.is_success() || body["success"].as_bool() != Some(true) {
            let error = body["error"].as_str().unwrap_or("unknown error");
            return Err(DomainError::Registry(format!(
                "Fetch rejected ({}): {}",
                status, error
            )));
        }

        let accounts: Vec<Account> = serde_json::from_value(body["data"]["accounts"].clone())
            .map_err(|e| DomainError::Serialization(format!("Bad account list: {}", e)))?;
        let total = body["data"]["total"]
            .as_u64()
            .unwrap_or(accounts.len() as u64) as usize;
        let date = body["data"]["date"].as_str().unwrap_or_default().to_string();

        Ok(CheckinableBatch {
            total,
            accounts,
            date,
        })
    }

    async fn update_account_info(
        &self,
        id: &AccountId,
        update: &AccountUpdate,
    ) -> Result<(), DomainError> {
        let url = format!("{}/api/accounts/{}/checkin", self.base_url, id);
        debug!("Updating account {} via {}", id, url);

        let response = self
            .authorized(self.client.put(&url))
            .json(update)
            .send()
            .await
            .map_err(|e| DomainError::Registry(format!("Update failed: {}", e)))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::Registry(format!("Invalid update response: {}", e)))?;

        if !status.is_success() || body["success"].as_bool() != Some(true) {
            let error = body["error"].as_str().unwrap_or("unknown error");
            return Err(DomainError::Registry(format!(
                "Update rejected ({}): {}",
                status, error
            )));
        }

        Ok(())
    }
}
