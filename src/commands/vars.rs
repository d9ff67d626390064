use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use tabled::Tabled;

use monday_client::template::FIXED_KEYS;
use monday_client::{Result, Variables, generate_context, validate};

use crate::cli::{VarsArgs, resolve_date};
use crate::commands::read_template;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct VarRow {
    #[tabled(rename = "Variable")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn run(args: VarsArgs) -> Result<()> {
    let mut context = generate_context(resolve_date(args.date.as_deref()))?;
    let extras: Variables = args.vars.into_iter().collect();
    context.merge_variables(&extras);

    // fixed keys first, then extras in name order
    let rows: Vec<VarRow> = FIXED_KEYS
        .iter()
        .filter_map(|(key, _)| context.get(key).map(|value| (*key, value)))
        .chain(
            context
                .iter()
                .filter(|(key, _)| !FIXED_KEYS.iter().any(|(fixed, _)| fixed == key)),
        )
        .map(|(name, value)| VarRow {
            name: name.to_string(),
            value: value.to_string(),
        })
        .collect();

    let Some(source) = args.template else {
        output::print_table(&rows, VarRow::clone);
        return Ok(());
    };

    let template = read_template(&source)?;
    let missing = validate(&template, &context);

    if output::is_json_output() {
        output::print_json(&json!({ "variables": rows, "missing": missing }));
        return Ok(());
    }

    output::print_table(&rows, VarRow::clone);
    if missing.is_empty() {
        println!("{}", "All template variables resolved".green());
    } else {
        println!("{} {}", "Missing variables:".red().bold(), missing.join(", "));
    }

    Ok(())
}
