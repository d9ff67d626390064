use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MondayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP error {status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("GraphQL errors: {}", messages.join(", "))]
    GraphQL { messages: Vec<String> },

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("Request timed out after {attempts} attempt(s) of {timeout_ms} ms")]
    Timeout { attempts: u32, timeout_ms: u64 },

    #[error("Failed to fetch page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: Box<MondayError>,
    },

    #[error("Query must contain items_page for pagination")]
    MissingItemsPage,

    #[error("No items_page found in response")]
    ItemsPageNotFound,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Failed to interpolate template: {0}")]
    Interpolation(String),

    #[error("Missing template variables: {}", names.join(", "))]
    MissingVariables { names: Vec<String> },

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "No API token found. Set MONDAY_API_TOKEN env var or add api_token to ~/.config/monday/config.toml"
    )]
    MissingApiToken,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),
}

impl MondayError {
    /// Whether this failure is a configuration problem raised before any request was sent.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            MondayError::MissingItemsPage
                | MondayError::MissingVariables { .. }
                | MondayError::MissingApiToken
                | MondayError::InvalidUrl(_)
                | MondayError::InvalidHeader(_)
                | MondayError::ConfigRead { .. }
                | MondayError::ConfigParse { .. }
                | MondayError::NoConfigDir
        )
    }
}

pub type Result<T> = std::result::Result<T, MondayError>;
