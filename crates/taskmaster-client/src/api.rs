//! Typed HTTP access to the task API.
//!
//! Thin `reqwest` wrapper: one method per endpoint, JSON in and out.
//! Failures collapse into [`ClientError`], whose `Display` strings are
//! exactly what the views show the user.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use taskmaster_core::Task;

/// API address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3001";

/// What a failed API call looks like to the views.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status. `message` carries the
    /// body's `error` string when one was present.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// The request never produced a response: refused connection, DNS
    /// failure, timeout.
    #[error("Network error: Unable to connect to server")]
    Network(#[source] reqwest::Error),

    /// A success response carried a body that did not deserialize.
    #[error("invalid response body")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e)
        } else {
            Self::Network(e)
        }
    }
}

/// Handle to one API server. Cheap to clone; the underlying connection
/// pool is shared.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against `base_url` (scheme, host, port). Trailing
    /// slashes are trimmed so path joins stay predictable.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `POST /tasks`. A `None` description is omitted from the body rather
    /// than sent as `null`.
    pub async fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, ClientError> {
        let mut body = json!({ "title": title });
        if let Some(description) = description {
            body["description"] = Value::from(description);
        }
        let resp = self.http.post(self.url("/tasks")).json(&body).send().await?;
        decode(resp).await
    }

    /// `GET /tasks`: newest incomplete tasks.
    pub async fn active_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self.http.get(self.url("/tasks")).send().await?;
        decode(resp).await
    }

    /// `GET /tasks/completed`: newest completed tasks.
    pub async fn completed_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self.http.get(self.url("/tasks/completed")).send().await?;
        decode(resp).await
    }

    /// `PATCH /tasks/{id}/complete`. Returns the updated row; a task that
    /// is missing or already completed comes back as [`ClientError::Api`]
    /// with the server's 404 message.
    pub async fn complete_task(&self, id: i64) -> Result<Task, ClientError> {
        let url = self.url(&format!("/tasks/{id}/complete"));
        let resp = self.http.patch(url).send().await?;
        decode(resp).await
    }

    /// `GET /health`. The server reports 200 even when its database is
    /// down, so this errors only when the server itself is unreachable.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        decode(resp).await
    }
}

/// Turn a response into `T`, or into the error the views will display.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let message = match resp.json::<Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(Value::as_str)
                .map_or_else(|| format!("HTTP error {}", status.as_u16()), str::to_string),
            Err(_) => "Unknown error".to_string(),
        };
        tracing::debug!(status = %status, message, "api request failed");
        return Err(ClientError::Api { status, message });
    }
    Ok(resp.json().await?)
}

// ───── Tests ─────
