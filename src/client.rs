use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{MondayError, Result};
use crate::template::{self, BaseDate};
use crate::transport::{GraphQLRequest, HttpTransport, Transport, Variables};

pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";
pub const DEFAULT_API_VERSION: &str = "2024-01";

/// Per-request timeout and retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Duration,
    /// Maximum attempts including the first.
    pub retries: u32,
    /// Backoff unit, multiplied by the attempt number.
    pub retry_delay: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            retries: 3,
            retry_delay: Duration::from_millis(1_000),
        }
    }
}

/// Everything needed to construct a [`MondayClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_token: String,
    pub api_url: Url,
    pub api_version: String,
    pub request: RequestOptions,
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            api_version: DEFAULT_API_VERSION.to_string(),
            request: RequestOptions::default(),
        }
    }
}

pub struct MondayClient<T = HttpTransport> {
    transport: T,
    defaults: RequestOptions,
}

impl MondayClient<HttpTransport> {
    /// Build a client over HTTP. Fails if the token is empty or not a valid header value.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_token.trim().is_empty() {
            return Err(MondayError::MissingApiToken);
        }

        let transport = HttpTransport::new(&config)?;
        debug!(endpoint = %transport.endpoint(), "created Monday client");

        Ok(Self {
            transport,
            defaults: config.request,
        })
    }
}

impl<T: Transport> MondayClient<T> {
    pub fn with_transport(transport: T, defaults: RequestOptions) -> Self {
        Self {
            transport,
            defaults,
        }
    }

    pub fn defaults(&self) -> &RequestOptions {
        &self.defaults
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute one query and deserialize its `data` payload.
    pub async fn execute_query<D: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<&Variables>,
        options: Option<&RequestOptions>,
    ) -> Result<D> {
        let data = self.execute_raw(query, variables, options).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Expand `template` against `base_date` plus `variables`, then execute it.
    pub async fn execute_query_with_template<D: DeserializeOwned>(
        &self,
        template: &str,
        base_date: impl Into<BaseDate>,
        variables: Option<&Variables>,
        options: Option<&RequestOptions>,
    ) -> Result<D> {
        let query = template::expand(template, base_date, variables)?;
        self.execute_query(&query, variables, options).await
    }

    /// Send a single request, retrying only when an attempt exceeds its timeout.
    pub(crate) async fn execute_raw(
        &self,
        query: &str,
        variables: Option<&Variables>,
        options: Option<&RequestOptions>,
    ) -> Result<Value> {
        let options = options.unwrap_or(&self.defaults);
        let max_attempts = options.retries.max(1);
        let request = GraphQLRequest { query, variables };

        let mut attempt = 1;
        loop {
            debug!(attempt, "sending GraphQL request");

            match tokio::time::timeout(options.timeout, self.transport.send(&request)).await {
                Ok(response) => return response?.into_data(),
                Err(_) if attempt < max_attempts => {
                    let backoff = backoff(options.retry_delay, attempt);
                    warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "request timed out, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(_) => {
                    return Err(MondayError::Timeout {
                        attempts: attempt,
                        timeout_ms: options.timeout.as_millis() as u64,
                    });
                }
            }
        }
    }
}

/// Linear backoff before the retry that follows `attempt`, saturating at `Duration::MAX`.
fn backoff(retry_delay: Duration, attempt: u32) -> Duration {
    retry_delay.saturating_mul(attempt)
}
