use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::client::ClientConfig;
use crate::error::{MondayError, Result};

/// GraphQL variables sent alongside a query.
pub type Variables = serde_json::Map<String, Value>;

#[derive(Serialize, Debug, Clone, Copy)]
pub struct GraphQLRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<&'a Variables>,
}

#[derive(Deserialize, Debug)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub locations: Option<Vec<SourceLocation>>,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl<T> GraphQLResponse<T> {
    /// The data payload, or an error if the server reported any.
    pub fn into_data(self) -> Result<T> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(MondayError::GraphQL {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }

        self.data.ok_or(MondayError::EmptyResponse)
    }
}

/// Sends one GraphQL request and returns the parsed response body.
///
/// Implementations report non-2xx statuses as [`MondayError::Status`] and
/// leave GraphQL-level `errors` in the returned response.
pub trait Transport {
    fn send(
        &self,
        request: &GraphQLRequest<'_>,
    ) -> impl Future<Output = Result<GraphQLResponse<Value>>> + Send;
}

/// Transport posting JSON to the Monday.com endpoint.
pub struct HttpTransport {
    http: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&config.api_token)
                .map_err(|_| MondayError::InvalidHeader("Authorization"))?,
        );
        headers.insert(
            "API-Version",
            HeaderValue::from_str(&config.api_version)
                .map_err(|_| MondayError::InvalidHeader("API-Version"))?,
        );

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            endpoint: config.api_url.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &GraphQLRequest<'_>) -> Result<GraphQLResponse<Value>> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MondayError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.json().await?)
    }
}
