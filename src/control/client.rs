//! Client for the control API, used by `modbotctl`.

use super::{Rule, StatsSnapshot};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure talking to the control API.
///
/// The message of each variant contains `connection`, `unexpected status` or
/// `decode` so callers can branch on the kind from the text alone.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    #[error("connection to {url} failed")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Serialize)]
struct SetRuleBody<'a> {
    name: &'a str,
    key: &'a str,
    value: &'a str,
}

/// HTTP client bound to one control server.
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    stats_url: String,
    rules_url: String,
    set_rule_url: String,
}

impl ControlClient {
    /// Create a client for `base_url`, e.g. `http://127.0.0.1:8089/`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            http,
            stats_url: format!("{base}/stats"),
            rules_url: format!("{base}/rules"),
            set_rule_url: format!("{base}/rules/set"),
        })
    }

    pub fn stats_url(&self) -> &str {
        &self.stats_url
    }

    pub fn rules_url(&self) -> &str {
        &self.rules_url
    }

    pub fn set_rule_url(&self) -> &str {
        &self.set_rule_url
    }

    /// Fetch `GET /stats`.
    pub async fn stats(&self) -> Result<StatsSnapshot, ClientError> {
        let request = self.http.get(&self.stats_url);
        self.send(&self.stats_url, request).await
    }

    /// Fetch `GET /rules`.
    pub async fn rules(&self) -> Result<Vec<Rule>, ClientError> {
        let request = self.http.get(&self.rules_url);
        self.send(&self.rules_url, request).await
    }

    /// Call `POST /rules/set`.
    pub async fn set_rule(&self, name: &str, key: &str, value: &str) -> Result<(), ClientError> {
        let request = self
            .http
            .post(&self.set_rule_url)
            .json(&SetRuleBody { name, key, value });
        let _: serde_json::Value = self.send(&self.set_rule_url, request).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|source| ClientError::Connection {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                url: url.to_string(),
                status,
                body: body.trim().to_string(),
            });
        }

        response.json::<T>().await.map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
