//! Client for the Monday.com GraphQL API: relative-date query templates,
//! timeout-bounded retries and cursor pagination over `items_page`.

pub mod boards;
pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod template;
pub mod transport;

pub use boards::{Board, Window};
pub use client::{ClientConfig, MondayClient, RequestOptions};
pub use config::Config;
pub use error::{MondayError, Result};
pub use pagination::{Aggregate, PaginationOptions, aggregated_items};
pub use template::{BaseDate, TemplateContext, extract_variables, generate_context, interpolate, validate};
pub use transport::{GraphQLRequest, GraphQLResponse, HttpTransport, Transport, Variables};
