//! Shared types for the bot file API
//!
//! Error type, HTTP method discriminator and the raw record shape returned by
//! the bot's `/bot/files` listing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// `type` value that marks a record as a container
pub const FOLDER_KIND: &str = "folder";

/// HTTP methods used by the bot file API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One file or folder as listed by the backend, before tree assembly.
///
/// Only `uuid` is required. Keys other than the four known ones (artist,
/// album, duration, ...) are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawRecord {
    /// Parse a listing response (a JSON array of records)
    pub fn list_from_value(value: serde_json::Value) -> Result<Vec<Self>, BotError> {
        serde_json::from_value(value)
            .map_err(|e| BotError::ParseError(format!("Invalid file listing: {}", e)))
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Type discriminator, empty when the record has no `type` key
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    /// Declared parent folder, empty for root
    pub fn parent(&self) -> &str {
        self.parent.as_deref().unwrap_or("")
    }

    pub fn is_folder(&self) -> bool {
        self.kind() == FOLDER_KIND
    }
}

/// Bot API error types
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl BotError {
    /// Check if this error is recoverable (can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BotError::Timeout | BotError::NetworkError(_) | BotError::ConnectionFailed(_)
        )
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BotError::Timeout
        } else if e.is_connect() {
            BotError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            BotError::ParseError(e.to_string())
        } else {
            BotError::NetworkError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::ParseError(e.to_string())
    }
}
