use colored::Colorize;
use tabled::Tabled;

use monday_client::{Board, MondayClient, Result};

use crate::cli::ItemsArgs;
use crate::output::{self, field_text, truncate};

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&Board> for BoardRow {
    fn from(board: &Board) -> Self {
        let state = board.state.clone().unwrap_or_default();
        Self {
            id: board.id.clone(),
            name: truncate(&board.name, 50),
            state: if state == "active" {
                state.green().to_string()
            } else {
                state.bright_black().to_string()
            },
        }
    }
}

pub async fn list(client: &MondayClient, ids: Vec<String>) -> Result<()> {
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    let boards = client.boards(&ids).await?;

    output::print_table(&boards, |board| BoardRow::from(board));
    Ok(())
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn items(client: &MondayClient, args: ItemsArgs) -> Result<()> {
    let pagination = args.pages.options();
    let items = client
        .board_items(&args.board_id, args.fields.as_deref(), Some(&pagination))
        .await?;

    output::print_table(&items, |item| ItemRow {
        id: field_text(item, "id"),
        name: truncate(&field_text(item, "name"), 60),
    });
    output::print_message(&format!("{} items", items.len().to_string().bold()));
    Ok(())
}
