//! Bot API Module
//!
//! Everything that talks to the music bot goes through the [`Transport`]
//! trait. The tree model only ever sees `request(path, method, body)`, so it
//! can be driven by the bundled [`HttpTransport`] or by anything else that
//! answers with JSON.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  tree (FolderNode, Forest)   │
//! └──────────────┬───────────────┘
//!                │ remote::*
//!                ▼
//! ┌──────────────────────────────┐
//! │       Transport trait        │
//! └──────────────┬───────────────┘
//!                ▼
//!   HttpTransport (reqwest + retry)
//! ```

pub mod types;
pub mod http;
pub mod http_retry;
pub mod remote;

pub use types::*;
pub use http::HttpTransport;
pub use http_retry::RetryPolicy;

use async_trait::async_trait;

/// Request/response capability of the bot backend
///
/// Implementations own authentication, timeouts and retries. The returned
/// value is handed back to callers untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request against an API path such as `/bot/files`
    async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, BotError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, BotError> {
        (**self).request(path, method, body).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport for exercising remote operations

    use super::*;
    use std::sync::Mutex;

    /// One captured call: (path, method, body)
    pub type Call = (String, Method, Option<serde_json::Value>);

    /// Records every request and answers with a fixed response
    pub struct RecordingTransport {
        pub calls: Mutex<Vec<Call>>,
        response: serde_json::Value,
    }

    impl RecordingTransport {
        pub fn new(response: serde_json::Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                response,
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn request(
            &self,
            path: &str,
            method: Method,
            body: Option<serde_json::Value>,
        ) -> Result<serde_json::Value, BotError> {
            self.calls.lock().unwrap().push((path.to_string(), method, body));
            Ok(self.response.clone())
        }
    }

    /// Fails every request with a server error
    pub struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn request(
            &self,
            path: &str,
            _method: Method,
            _body: Option<serde_json::Value>,
        ) -> Result<serde_json::Value, BotError> {
            Err(BotError::ServerError(format!("{} unavailable (503)", path)))
        }
    }

    #[tokio::test]
    async fn test_arc_transport_delegates() {
        let inner = std::sync::Arc::new(RecordingTransport::new(serde_json::json!({"ok": true})));
        let shared: std::sync::Arc<dyn Transport> = inner.clone();
        let result = shared.request("/bot/files", Method::Get, None).await.unwrap();
        assert_eq!(result, serde_json::json!({"ok": true}));
        assert_eq!(inner.calls().len(), 1);
    }
}
