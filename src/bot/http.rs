//! HTTP transport for the bot REST API
//!
//! Base URL: `{url}/api/v1`
//! Auth: `Authorization: Bearer {token}`, token obtained from `/bot/login`
//! Bodies: JSON in both directions, empty 2xx bodies read as `null`

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::http_retry::{send_with_retry, RetryPolicy};
use super::{BotError, Method, Transport};
use crate::config::BotConfig;

const API_PREFIX: &str = "/api/v1";

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Deserialize)]
struct BotIdResponse {
    #[serde(rename = "defaultBotId")]
    default_bot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// reqwest-backed [`Transport`]
pub struct HttpTransport {
    client: reqwest::Client,
    api_base: String,
    token: Option<SecretString>,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Build a transport from config. No request is made; the token, if any,
    /// is taken as-is.
    pub fn from_config(config: &BotConfig) -> Result<Self, BotError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .default_headers(default_headers)
            .build()
            .map_err(|e| BotError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base(&config.url),
            token: config.token.clone().filter(|t| !t.is_empty()).map(SecretString::from),
            retry: RetryPolicy::with_max_retries(config.max_retries),
        })
    }

    /// Build a transport and log in with the configured username and
    /// password. Always asks the bot for a fresh token; a configured one is
    /// discarded.
    pub async fn login(config: &BotConfig) -> Result<Self, BotError> {
        let mut transport = Self::from_config(config)?;
        transport.token = None;

        let username = config
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| BotError::InvalidConfig("Username required for login".to_string()))?;

        let bot_id = match config.bot_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let value = transport.request("/botId", Method::Get, None).await?;
                let resp: BotIdResponse = serde_json::from_value(value)?;
                resp.default_bot_id
                    .ok_or_else(|| BotError::ParseError("Missing defaultBotId".to_string()))?
            }
        };

        let body = serde_json::json!({
            "username": username,
            "password": config.password.clone().unwrap_or_default(),
            "botId": bot_id,
        });
        let value = transport.request("/bot/login", Method::Post, Some(body)).await?;
        let resp: LoginResponse = serde_json::from_value(value)?;
        let token = resp.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            BotError::AuthenticationFailed("No token in login response".to_string())
        })?;

        info!("Logged in as {} (bot {})", username, bot_id);
        transport.token = Some(SecretString::from(token));
        Ok(transport)
    }

    /// Current bearer token, for persisting after login
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn auth_header(&self) -> Result<Option<HeaderValue>, BotError> {
        self.token
            .as_ref()
            .map(|t| {
                HeaderValue::from_str(&format!("Bearer {}", t.expose_secret())).map_err(|e| {
                    BotError::AuthenticationFailed(format!("Invalid characters in token: {}", e))
                })
            })
            .transpose()
    }
}

/// Normalise a configured URL into the API base
fn api_base(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PREFIX)
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

fn status_error(status: reqwest::StatusCode, path: &str, body: &str) -> BotError {
    let detail = format!("{} ({}): {}", path, status, truncate_body(body));
    match status.as_u16() {
        401 | 403 => BotError::AuthenticationFailed(detail),
        404 => BotError::NotFound(detail),
        _ => BotError::ServerError(detail),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, BotError> {
        debug!("{} {}", method, path);

        let mut builder = self.client.request(method.into(), self.url(path));
        if let Some(auth) = self.auth_header()? {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        let request = builder.build()?;

        let resp = send_with_retry(&self.client, request, &self.retry).await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(status_error(status, path, &text));
        }
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| BotError::ParseError(format!("{} returned invalid JSON: {}", path, e)))
    }
}
