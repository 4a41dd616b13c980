use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{header, Client, Method, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// HTTP retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Raw response handed to the adapters: status, body text and any cookies
/// the platform set (session rotation arrives this way).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
    pub set_cookies: HashMap<String, String>,
}

/// Parsed `{success, message, data}` envelope shared by both platforms.
#[derive(Debug, Clone)]
pub struct ApiEnvelope {
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}

pub struct HttpClient {
    client: Client,
    retry_config: RetryConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_retry_config(RetryConfig::default())
    }

    pub fn with_retry_config(retry_config: RetryConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            retry_config,
        })
    }

    /// Send a JSON API request with manual cookie handling.
    ///
    /// Cookies travel as one `Cookie` header; Referer/Origin are derived
    /// from the target URL. Retries on connect/timeout errors, 5xx and 429.
    pub async fn api_request(
        &self,
        method: Method,
        url: &str,
        cookies: &HashMap<String, String>,
        api_user: Option<(&str, &str)>,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        let mut attempt = 0;
        let mut backoff_ms = self.retry_config.initial_backoff_ms;

        loop {
            attempt += 1;

            match self
                .api_request_once(method.clone(), url, cookies, api_user, body)
                .await
            {
                Ok(response) => {
                    if attempt > 1 {
                        debug!("{} {} succeeded after {} attempts", method, url, attempt);
                    }
                    return Ok(response);
                }
                Err(e) => {
                    let should_retry =
                        attempt <= self.retry_config.max_retries && is_retryable_error(&e);
                    if !should_retry {
                        return Err(e);
                    }

                    warn!(
                        "{} {} failed (attempt {}/{}): {}. Retrying in {}ms...",
                        method, url, attempt, self.retry_config.max_retries, e, backoff_ms
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = ((backoff_ms as f64 * self.retry_config.backoff_multiplier)
                        as u64)
                        .min(self.retry_config.max_backoff_ms);
                }
            }
        }
    }

    async fn api_request_once(
        &self,
        method: Method,
        url: &str,
        cookies: &HashMap<String, String>,
        api_user: Option<(&str, &str)>,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        let origin = extract_domain(url)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(header::REFERER, header::HeaderValue::from_str(&origin)?);
        headers.insert(header::ORIGIN, header::HeaderValue::from_str(&origin)?);

        if let Some((key, value)) = api_user {
            if !value.is_empty() {
                headers.insert(
                    header::HeaderName::from_bytes(key.as_bytes())?,
                    header::HeaderValue::from_str(value)?,
                );
            }
        }

        let mut request = self.client.request(method, url).headers(headers);

        let cookie_string = cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        if !cookie_string.is_empty() {
            request = request.header(header::COOKIE, cookie_string);
        }

        if let Some(json) = body {
            request = request.json(json);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let mut set_cookies = HashMap::new();
        for value in response.headers().get_all(header::SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                if let Some((name, rest)) = raw.split_once('=') {
                    let value = rest.split(';').next().unwrap_or("").to_string();
                    set_cookies.insert(name.trim().to_string(), value);
                }
            }
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(ApiResponse {
            status,
            body,
            set_cookies,
        })
    }
}

/// Check if an error is retryable
fn is_retryable_error(error: &anyhow::Error) -> bool {
    if let Some(reqwest_err) = error.downcast_ref::<reqwest::Error>() {
        if reqwest_err.is_connect() || reqwest_err.is_timeout() || reqwest_err.is_request() {
            return true;
        }
        if let Some(status) = reqwest_err.status() {
            return status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
        }
    }
    false
}

impl ApiResponse {
    /// Parse the body as a platform API envelope. Success indicators vary
    /// across deployments (`ret`, `code`, `success`), so all are honored.
    pub fn envelope(&self) -> Result<ApiEnvelope> {
        let data: serde_json::Value = serde_json::from_str(&self.body).with_context(|| {
            // Bodies can be non-ASCII HTML; truncate on a char boundary.
            let preview: String = self.body.chars().take(200).collect();
            format!("Failed to parse API response: {}", preview)
        })?;

        let success = data["ret"].as_i64() == Some(1)
            || data["code"].as_i64() == Some(0)
            || data["code"].as_i64() == Some(200)
            || data["success"].as_bool() == Some(true);

        let message = data["msg"]
            .as_str()
            .or(data["message"].as_str())
            .or(data["error"].as_str())
            .unwrap_or(if success { "OK" } else { "Request failed" })
            .to_string();

        Ok(ApiEnvelope {
            success,
            message,
            data: data["data"].clone(),
        })
    }
}

/// Extract scheme://host[:port] from a URL, for Referer/Origin headers.
pub fn extract_domain(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    let host = parsed.host_str().unwrap_or("");

    if let Some(port) = parsed.port() {
        Ok(format!("{}://{}:{}", parsed.scheme(), host, port))
    } else {
        Ok(format!("{}://{}", parsed.scheme(), host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://example.com/api/user").unwrap(),
            "https://example.com"
        );
        assert_eq!(
            extract_domain("http://test.org:8080/path").unwrap(),
            "http://test.org:8080"
        );
    }

    #[test]
    fn test_envelope_success_indicators() {
        for body in [
            r#"{"ret":1,"msg":"ok"}"#,
            r#"{"code":0}"#,
            r#"{"code":200}"#,
            r#"{"success":true}"#,
        ] {
            let response = ApiResponse {
                status: StatusCode::OK,
                body: body.to_string(),
                set_cookies: HashMap::new(),
            };
            assert!(response.envelope().unwrap().success, "body: {}", body);
        }

        let failed = ApiResponse {
            status: StatusCode::OK,
            body: r#"{"success":false,"message":"wrong password"}"#.to_string(),
            set_cookies: HashMap::new(),
        };
        let envelope = failed.envelope().unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message, "wrong password");
    }

    #[test]
    fn test_envelope_rejects_non_json() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: "<html>challenge</html>".to_string(),
            set_cookies: HashMap::new(),
        };
        assert!(response.envelope().is_err());
    }

    #[test]
    fn test_envelope_rejects_long_multibyte_body() {
        // A multibyte char straddling the preview cutoff must not panic.
        let body = format!("{}中文安全验证页面, 请稍候", "x".repeat(199));
        let response = ApiResponse {
            status: StatusCode::OK,
            body,
            set_cookies: HashMap::new(),
        };
        assert!(response.envelope().is_err());
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }
}
