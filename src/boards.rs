//! Common board and item lookups built on the generic query functions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::MondayClient;
use crate::error::Result;
use crate::pagination::PaginationOptions;
use crate::template::{self, BaseDate, TemplateContext};
use crate::transport::{Transport, Variables};

const BOARDS_QUERY: &str = r#"
query Boards($ids: [ID!], $limit: Int!, $page: Int!) {
    boards(ids: $ids, limit: $limit, page: $page) {
        id
        name
        state
    }
}
"#;

const BOARD_ITEMS_QUERY: &str = r#"
query BoardItems($boardIds: [ID!], $limit: Int!, $cursor: String) {
    boards(ids: $boardIds) {
        items_page(limit: $limit, cursor: $cursor) {
            cursor
            items {
                {{fields}}
            }
        }
    }
}
"#;

const ITEMS_UPDATED_SINCE_TEMPLATE: &str = r#"
query ItemsUpdatedSince($boardIds: [ID!], $limit: Int!, $cursor: String) {
    boards(ids: $boardIds) {
        items_page(
            limit: $limit
            cursor: $cursor
            query_params: {
                rules: [{ column_id: "__last_updated__", compare_value: ["EXACT", "{{since}}"], operator: greater_than }]
            }
        ) {
            cursor
            items {
                id
                name
                updated_at
            }
        }
    }
}
"#;

pub const DEFAULT_ITEM_FIELDS: &str = "id name";

/// Boards requested per page by [`MondayClient::boards`].
pub const BOARDS_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
}

#[derive(Deserialize)]
struct BoardsResponse {
    boards: Vec<Board>,
}

/// How far back [`MondayClient::board_items_updated_since`] looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Day,
    Week,
    Month,
    TwoMonths,
    Quarter,
}

impl Window {
    /// Template variable holding the window's start date.
    pub fn variable(self) -> &'static str {
        match self {
            Window::Day => "date_minus_1",
            Window::Week => "date_minus_7",
            Window::Month => "date_minus_30",
            Window::TwoMonths => "date_minus_60",
            Window::Quarter => "date_minus_90",
        }
    }
}

fn board_ids(ids: &[&str]) -> Variables {
    let mut vars = Variables::new();
    vars.insert("boardIds".to_string(), json!(ids));
    vars
}

impl<T: Transport> MondayClient<T> {
    /// Boards with the given ids, or every board visible to the token when `ids` is empty.
    ///
    /// Requests pages of [`BOARDS_PAGE_SIZE`] until a short page comes back.
    pub async fn boards(&self, ids: &[&str]) -> Result<Vec<Board>> {
        let mut vars = Variables::new();
        if !ids.is_empty() {
            vars.insert("ids".to_string(), json!(ids));
        }
        vars.insert("limit".to_string(), json!(BOARDS_PAGE_SIZE));

        let mut boards = Vec::new();
        for page in 1.. {
            vars.insert("page".to_string(), json!(page));
            let response: BoardsResponse =
                self.execute_query(BOARDS_QUERY, Some(&vars), None).await?;

            let count = response.boards.len();
            boards.extend(response.boards);
            tracing::debug!(page, count, total = boards.len(), "fetched boards page");

            if count < BOARDS_PAGE_SIZE {
                break;
            }
        }

        Ok(boards)
    }

    /// All items of one board, selecting `item_fields` (defaults to [`DEFAULT_ITEM_FIELDS`]).
    pub async fn board_items(
        &self,
        board_id: &str,
        item_fields: Option<&str>,
        pagination: Option<&PaginationOptions>,
    ) -> Result<Vec<Value>> {
        let mut context = TemplateContext::default();
        context.insert("fields", item_fields.unwrap_or(DEFAULT_ITEM_FIELDS));
        let query = template::render(BOARD_ITEMS_QUERY, &context)?;
        let vars = board_ids(&[board_id]);

        let aggregate = self.paginate(&query, Some(&vars), pagination, None).await?;
        Ok(aggregate.items)
    }

    /// Items of one board updated after the start of `window`, counted back from `base_date`.
    pub async fn board_items_updated_since(
        &self,
        board_id: &str,
        base_date: impl Into<BaseDate>,
        window: Window,
    ) -> Result<Vec<Value>> {
        let mut context = template::generate_context(base_date)?;
        let since = context.get(window.variable()).unwrap_or_default().to_string();
        context.insert("since", since);
        let query = template::render(ITEMS_UPDATED_SINCE_TEMPLATE, &context)?;
        let vars = board_ids(&[board_id]);

        let result = self
            .execute_paginated_query(&query, Some(&vars), None, None)
            .await?;
        Ok(crate::pagination::aggregated_items(&result).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequestOptions;
    use crate::transport::testing::{ScriptedTransport, Step};

    fn client(steps: Vec<Step>) -> MondayClient<ScriptedTransport> {
        MondayClient::with_transport(ScriptedTransport::new(steps), RequestOptions::default())
    }

    fn items_page(cursor: Option<&str>, items: Value) -> Step {
        Step::Respond(json!({
            "data": { "boards": [{ "items_page": { "cursor": cursor, "items": items } }] }
        }))
    }

    #[tokio::test]
    async fn test_boards_decodes_list() {
        let client = client(vec![Step::Respond(json!({
            "data": { "boards": [
                { "id": "1", "name": "Sales", "state": "active" },
                { "id": "2", "name": "Ops", "state": null }
            ] }
        }))]);

        let boards = client.boards(&["1", "2"]).await.unwrap();

        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0].name, "Sales");
        assert_eq!(boards[1].state, None);
        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        let vars = requests[0].1.as_ref().unwrap();
        assert_eq!(vars.get("ids"), Some(&json!(["1", "2"])));
        assert_eq!(vars.get("page"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_boards_without_ids_pages_until_short_page() {
        let full: Vec<Value> = (0..BOARDS_PAGE_SIZE)
            .map(|i| json!({ "id": i.to_string(), "name": format!("Board {i}"), "state": "active" }))
            .collect();
        let client = client(vec![
            Step::Respond(json!({ "data": { "boards": full } })),
            Step::Respond(json!({ "data": { "boards": [
                { "id": "last", "name": "Archive", "state": "archived" }
            ] } })),
        ]);

        let boards = client.boards(&[]).await.unwrap();

        assert_eq!(boards.len(), BOARDS_PAGE_SIZE + 1);
        assert_eq!(boards.last().unwrap().id, "last");

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].0.contains("boards(ids: $ids, limit: $limit, page: $page)"));
        let first = requests[0].1.as_ref().unwrap();
        assert!(!first.contains_key("ids"));
        assert_eq!(first.get("limit"), Some(&json!(BOARDS_PAGE_SIZE)));
        assert_eq!(first.get("page"), Some(&json!(1)));
        assert_eq!(requests[1].1.as_ref().unwrap().get("page"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_boards_stops_on_empty_page() {
        let full: Vec<Value> = (0..BOARDS_PAGE_SIZE)
            .map(|i| json!({ "id": i.to_string(), "name": "b", "state": null }))
            .collect();
        let client = client(vec![
            Step::Respond(json!({ "data": { "boards": full } })),
            Step::Respond(json!({ "data": { "boards": [] } })),
        ]);

        let boards = client.boards(&[]).await.unwrap();

        assert_eq!(boards.len(), BOARDS_PAGE_SIZE);
        assert_eq!(client.transport().request_count(), 2);
    }

    #[tokio::test]
    async fn test_board_items_uses_field_selection() {
        let client = client(vec![
            items_page(Some("next"), json!([{ "id": "10" }])),
            items_page(None, json!([{ "id": "11" }])),
        ]);

        let items = client
            .board_items("123", Some("id name column_values { id text }"), None)
            .await
            .unwrap();

        assert_eq!(items, vec![json!({ "id": "10" }), json!({ "id": "11" })]);
        let requests = client.transport().requests();
        assert!(requests[0].0.contains("items {\n                id name column_values { id text }\n"));
        assert!(!requests[0].0.contains("{{"));
        assert!(!requests[0].1.as_ref().unwrap().contains_key("fields"));
        assert_eq!(
            requests[1].1.as_ref().unwrap().get("boardIds"),
            Some(&json!(["123"]))
        );
    }

    #[tokio::test]
    async fn test_items_updated_since_window() {
        let client = client(vec![items_page(None, json!([{ "id": "1" }]))]);

        let items = client
            .board_items_updated_since("5", "2024-01-15", Window::Week)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        let requests = client.transport().requests();
        assert!(requests[0].0.contains(r#"["EXACT", "2024-01-08"]"#));
        let vars = requests[0].1.as_ref().unwrap();
        assert_eq!(vars.get("boardIds"), Some(&json!(["5"])));
        assert!(!vars.contains_key("since"));
        assert!(!vars.contains_key("date_minus_7"));
    }

    #[tokio::test]
    async fn test_board_items_default_fields() {
        let client = client(vec![items_page(None, json!([]))]);

        client.board_items("9", None, None).await.unwrap();

        let requests = client.transport().requests();
        assert!(requests[0].0.contains("items {\n                id name\n"));
    }
}
