//! `AuthAdapter` implementations, one per authentication strategy.
//!
//! All four drive the same platform API surface (login, sign-in, user info);
//! they differ only in how a platform session is established.

mod github;
mod linuxdo;
mod password;
mod session;

pub use github::GithubAdapter;
pub use linuxdo::LinuxDoAdapter;
pub use password::PasswordAdapter;
pub use session::SessionAdapter;

use reqwest::Method;
use std::collections::HashMap;

use autoclaim_domain::checkin::ProviderUserInfo;
use autoclaim_domain::shared::DomainError;

use crate::http::client::HttpClient;
use crate::http::endpoints::PlatformEndpoints;

/// Claim today's check-in. A non-success envelope is a login-level failure;
/// the platforms answer success for an already-claimed day.
pub(crate) async fn perform_sign_in(
    client: &HttpClient,
    endpoints: &PlatformEndpoints,
    cookies: &HashMap<String, String>,
    api_user: &str,
) -> Result<String, DomainError> {
    let response = client
        .api_request(
            Method::POST,
            &endpoints.sign_in_url(),
            cookies,
            Some((endpoints.api_user_key(), api_user)),
            None,
        )
        .await
        .map_err(|e| DomainError::Infrastructure(format!("Sign-in request failed: {}", e)))?;

    let envelope = response
        .envelope()
        .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

    if envelope.success {
        Ok(envelope.message)
    } else {
        Err(DomainError::ProviderLogin(format!(
            "Sign-in rejected: {}",
            envelope.message
        )))
    }
}

/// Fetch the account's user info (quota, usage, affiliate code and any
/// rotated token blob) in raw provider units.
pub(crate) async fn fetch_user_info(
    client: &HttpClient,
    endpoints: &PlatformEndpoints,
    cookies: &HashMap<String, String>,
    api_user: &str,
) -> Result<ProviderUserInfo, DomainError> {
    let response = client
        .api_request(
            Method::GET,
            &endpoints.user_info_url(),
            cookies,
            Some((endpoints.api_user_key(), api_user)),
            None,
        )
        .await
        .map_err(|e| DomainError::Infrastructure(format!("User info request failed: {}", e)))?;

    let envelope = response
        .envelope()
        .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

    if !envelope.success {
        return Err(DomainError::ProviderLogin(format!(
            "User info rejected: {}",
            envelope.message
        )));
    }

    let quota = envelope.data["quota"].as_f64().ok_or_else(|| {
        DomainError::Serialization("Missing or invalid 'quota' field in user info".to_string())
    })?;

    Ok(ProviderUserInfo {
        quota,
        used_quota: envelope.data["used_quota"].as_f64(),
        aff_code: envelope.data["aff_code"].as_str().map(str::to_string),
        tokens: match &envelope.data["tokens"] {
            serde_json::Value::Null => None,
            other => Some(other.clone()),
        },
    })
}

/// Pull the external api-user id out of a login envelope; the platforms
/// return it either as a number or a string.
pub(crate) fn extract_api_user(data: &serde_json::Value) -> Option<String> {
    match &data["id"] {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
