//! Client for the remote account submission endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use signup_core::account::NewAccount;

use crate::config::WizardConfig;
use crate::error::SubmissionError;

/// The created record echoed back by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAccount {
    pub id: i64,
    #[serde(flatten)]
    pub account: NewAccount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hands a complete record to whatever stores accounts.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, account: &NewAccount) -> Result<SubmittedAccount, SubmissionError>;
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// HTTP client for `POST {base_url}/submit`.
pub struct HttpSubmissionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSubmissionClient {
    /// * `base_url` - Server root, e.g. `http://localhost:4000`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &WizardConfig) -> Result<Self, SubmissionError> {
        Self::new(config.submit_api_url.clone(), config.submit_timeout)
    }

    fn submit_url(&self) -> String {
        format!("{}/submit", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(&self, account: &NewAccount) -> Result<SubmittedAccount, SubmissionError> {
        let response = self.client.post(self.submit_url()).json(account).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let envelope: DataEnvelope<SubmittedAccount> =
            serde_json::from_str(&body).map_err(|e| SubmissionError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

/// Map a non-success response onto a [`SubmissionError`] category.
pub fn classify_failure(status: u16, body: &str) -> SubmissionError {
    let message = extract_message(body);
    match status {
        400..=499 => SubmissionError::Validation(message),
        500..=599 => SubmissionError::Server(message),
        _ => SubmissionError::Other { status, message },
    }
}

/// Pull the human-readable text out of an error body.
///
/// Looks at `message` (a string, or an array joined with newlines), then
/// `error`, and falls back to the raw body.
pub fn extract_message(body: &str) -> String {
    let Ok(Value::Object(json)) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    match json.get("message") {
        Some(Value::Array(items)) => {
            return items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n");
        }
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        _ => {}
    }

    match json.get("error") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => body.to_string(),
    }
}
