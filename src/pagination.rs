//! Cursor pagination over `items_page` fields.
//!
//! The driver fetches pages strictly in sequence, feeding each page's cursor
//! into the next request, and returns a *single-bucket aggregate*: one
//! `items_page` holding every item in fetch order. The original nesting
//! (several boards, groups) is not reconstructed, so callers that need it
//! should page manually with [`MondayClient::execute_query`].

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::client::{MondayClient, RequestOptions};
use crate::error::{MondayError, Result};
use crate::template::{self, BaseDate};
use crate::transport::{Transport, Variables};

/// Largest `limit` the API accepts for `items_page`.
pub const MAX_PAGE_SIZE: u32 = 500;

const ITEMS_PAGE: &str = "items_page";
const MAX_SEARCH_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Stop after this many pages even if a cursor remains.
    pub max_pages: Option<u32>,
    pub page_size: u32,
    /// Pause inserted between page fetches.
    pub delay_between_pages: Duration,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            max_pages: None,
            page_size: MAX_PAGE_SIZE,
            delay_between_pages: Duration::ZERO,
        }
    }
}

impl PaginationOptions {
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Shape of the synthetic result built from the aggregated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// `{ boards: [ { items_page: ... } ] }`
    Boards,
    /// `{ items_page: ... }`
    Bare,
}

impl Bucket {
    pub fn for_query(query: &str) -> Self {
        if query.contains("boards") {
            Bucket::Boards
        } else {
            Bucket::Bare
        }
    }
}

/// All items collected by one pagination call.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub items: Vec<Value>,
    pub pages: u32,
    pub bucket: Bucket,
}

impl Aggregate {
    pub fn into_value(self) -> Value {
        let items_page = json!({ "cursor": null, "items": self.items });
        match self.bucket {
            Bucket::Boards => json!({ "boards": [{ "items_page": items_page }] }),
            Bucket::Bare => json!({ "items_page": items_page }),
        }
    }
}

struct PaginationState {
    page: u32,
    cursor: Option<String>,
    items: Vec<Value>,
    more: bool,
}

impl PaginationState {
    fn new() -> Self {
        Self {
            page: 0,
            cursor: None,
            items: Vec::new(),
            more: true,
        }
    }

    fn within(&self, max_pages: Option<u32>) -> bool {
        self.more && max_pages.is_none_or(|max| self.page < max)
    }
}

/// Depth-first search for the first `items_page` object.
///
/// An object's own `items_page` key wins over anything nested in its siblings.
pub fn find_items_page(value: &Value) -> Option<&Map<String, Value>> {
    search(value, 0)
}

fn search(value: &Value, depth: usize) -> Option<&Map<String, Value>> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    match value {
        Value::Object(map) => match map.get(ITEMS_PAGE) {
            Some(Value::Object(page)) => Some(page),
            _ => map.values().find_map(|child| search(child, depth + 1)),
        },
        Value::Array(values) => values.iter().find_map(|child| search(child, depth + 1)),
        _ => None,
    }
}

/// Items of either aggregate shape produced by [`Aggregate::into_value`].
pub fn aggregated_items(value: &Value) -> &[Value] {
    find_items_page(value)
        .and_then(|page| page.get("items"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

impl<T: Transport> MondayClient<T> {
    /// Fetch every page of `query` and return the single-bucket aggregate.
    pub async fn execute_paginated_query(
        &self,
        query: &str,
        variables: Option<&Variables>,
        pagination: Option<&PaginationOptions>,
        options: Option<&RequestOptions>,
    ) -> Result<Value> {
        let aggregate = self.paginate(query, variables, pagination, options).await?;
        Ok(aggregate.into_value())
    }

    /// Expand `template`, fail on unresolved variables, then paginate.
    pub async fn execute_paginated_query_with_template(
        &self,
        template: &str,
        base_date: impl Into<BaseDate>,
        variables: Option<&Variables>,
        pagination: Option<&PaginationOptions>,
        options: Option<&RequestOptions>,
    ) -> Result<Value> {
        let query = template::expand(template, base_date, variables)?;
        self.execute_paginated_query(&query, variables, pagination, options)
            .await
    }

    /// Fetch every page of `query`, returning the raw aggregate.
    pub async fn paginate(
        &self,
        query: &str,
        variables: Option<&Variables>,
        pagination: Option<&PaginationOptions>,
        options: Option<&RequestOptions>,
    ) -> Result<Aggregate> {
        if !query.contains(ITEMS_PAGE) {
            return Err(MondayError::MissingItemsPage);
        }

        let pagination = pagination.copied().unwrap_or_default();
        let limit = pagination.effective_page_size();
        let mut state = PaginationState::new();

        while state.within(pagination.max_pages) {
            state.page += 1;

            let mut page_vars = variables.cloned().unwrap_or_default();
            page_vars.insert("limit".to_string(), Value::from(limit));
            if let Some(cursor) = &state.cursor {
                page_vars.insert("cursor".to_string(), Value::from(cursor.as_str()));
            }

            let cursor = self
                .fetch_page(query, &page_vars, options, &mut state.items)
                .await
                .map_err(|source| MondayError::Page {
                    page: state.page,
                    source: Box::new(source),
                })?;

            debug!(
                page = state.page,
                total = state.items.len(),
                more = cursor.is_some(),
                "fetched page"
            );

            state.more = cursor.is_some();
            state.cursor = cursor;

            if state.more && !pagination.delay_between_pages.is_zero() {
                tokio::time::sleep(pagination.delay_between_pages).await;
            }
        }

        Ok(Aggregate {
            items: state.items,
            pages: state.page,
            bucket: Bucket::for_query(query),
        })
    }

    /// Fetch one page, append its items and return the next cursor.
    async fn fetch_page(
        &self,
        query: &str,
        variables: &Variables,
        options: Option<&RequestOptions>,
        items: &mut Vec<Value>,
    ) -> Result<Option<String>> {
        let data = self.execute_raw(query, Some(variables), options).await?;
        let page = find_items_page(&data).ok_or(MondayError::ItemsPageNotFound)?;

        if let Some(Value::Array(found)) = page.get("items") {
            items.extend(found.iter().cloned());
        }

        Ok(page
            .get("cursor")
            .and_then(Value::as_str)
            .map(String::from))
    }
}
