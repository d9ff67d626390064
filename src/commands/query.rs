use colored::Colorize;
use serde_json::Value;
use tabled::Tabled;

use monday_client::{MondayClient, Result, aggregated_items};

use crate::cli::{PaginateArgs, QueryArgs};
use crate::commands::read_template;
use crate::output::{self, field_text, truncate};

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Value> for ItemRow {
    fn from(item: &Value) -> Self {
        Self {
            id: field_text(item, "id"),
            name: truncate(&field_text(item, "name"), 60),
        }
    }
}

pub async fn run(client: &MondayClient, args: QueryArgs) -> Result<()> {
    let template = read_template(&args.template.file)?;
    let variables = args.template.variables();
    let options = args.request.options(client.defaults());

    let data: Value = client
        .execute_query_with_template(
            &template,
            args.template.base_date(),
            variables.as_ref(),
            Some(&options),
        )
        .await?;

    output::print_json(&data);
    Ok(())
}

pub async fn paginate(client: &MondayClient, args: PaginateArgs) -> Result<()> {
    let template = read_template(&args.template.file)?;
    let variables = args.template.variables();
    let pagination = args.pages.options();
    let options = args.request.options(client.defaults());

    let result = client
        .execute_paginated_query_with_template(
            &template,
            args.template.base_date(),
            variables.as_ref(),
            Some(&pagination),
            Some(&options),
        )
        .await?;

    if output::is_json_output() {
        output::print_json(&result);
        return Ok(());
    }

    let items = aggregated_items(&result);
    output::print_table(items, |item| ItemRow::from(item));
    output::print_message(&format!("{} items", items.len().to_string().bold()));
    Ok(())
}
