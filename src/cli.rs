use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use serde_json::Value;

use monday_client::{PaginationOptions, RequestOptions, Variables};

#[derive(Parser)]
#[command(name = "monday")]
#[command(about = "A CLI for the Monday.com GraphQL API", version)]
#[command(after_help = "EXAMPLES:
    monday query board.graphql --var board_id=123
    monday paginate items.graphql --date 2024-01-15 --max-pages 5
    monday vars --template items.graphql
    monday items 123 --fields \"id name updated_at\"")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Show debug logs and full error chains
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query template once
    #[command(after_help = "EXAMPLES:
    monday query board.graphql --var board_id=123
    echo '{ me { name } }' | monday query -")]
    Query(QueryArgs),
    /// Run a query template across every items_page
    #[command(after_help = "EXAMPLES:
    monday paginate items.graphql --var board_id=123
    monday paginate items.graphql --max-pages 2 --page-size 100 --delay 250")]
    Paginate(PaginateArgs),
    /// Show the template date variables and check a template against them
    #[command(after_help = "EXAMPLES:
    monday vars
    monday vars --date 2024-01-15 --template items.graphql --var board_id=123")]
    Vars(VarsArgs),
    /// List boards
    #[command(after_help = "EXAMPLES:
    monday boards
    monday boards 123 456")]
    Boards {
        /// Board ids; all visible boards when omitted
        ids: Vec<String>,
    },
    /// List all items of a board
    #[command(after_help = "EXAMPLES:
    monday items 123
    monday items 123 --fields \"id name column_values { id text }\" --json")]
    Items(ItemsArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    Init,
}

#[derive(Args)]
pub struct TemplateArgs {
    /// Query file, or - to read from stdin
    pub file: String,

    /// Variable as key=value; JSON values are parsed, anything else is a string
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, Value)>,

    /// Base date for {{date}} variables (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

impl TemplateArgs {
    pub fn variables(&self) -> Option<Variables> {
        if self.vars.is_empty() {
            return None;
        }
        Some(self.vars.iter().cloned().collect())
    }

    pub fn base_date(&self) -> String {
        resolve_date(self.date.as_deref())
    }
}

#[derive(Args)]
pub struct RequestArgs {
    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum attempts per request, including the first
    #[arg(long)]
    pub retries: Option<u32>,

    /// Backoff unit between timed-out attempts, in milliseconds
    #[arg(long, value_name = "MS")]
    pub retry_delay: Option<u64>,
}

impl RequestArgs {
    pub fn options(&self, defaults: &RequestOptions) -> RequestOptions {
        RequestOptions {
            timeout: self
                .timeout
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            retries: self.retries.unwrap_or(defaults.retries),
            retry_delay: self
                .retry_delay
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        }
    }
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Args)]
pub struct PageArgs {
    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Items per page (at most 500)
    #[arg(long, default_value_t = 500)]
    pub page_size: u32,

    /// Pause between pages in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub delay: u64,
}

impl PageArgs {
    pub fn options(&self) -> PaginationOptions {
        PaginationOptions {
            max_pages: self.max_pages,
            page_size: self.page_size,
            delay_between_pages: Duration::from_millis(self.delay),
        }
    }
}

#[derive(Args)]
pub struct PaginateArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub pages: PageArgs,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Args)]
pub struct VarsArgs {
    /// Base date (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Template file to check for unresolved variables
    #[arg(long)]
    pub template: Option<String>,

    /// Extra variable as key=value
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, Value)>,
}

#[derive(Args)]
pub struct ItemsArgs {
    /// Board id
    pub board_id: String,

    /// Item fields to select
    #[arg(long)]
    pub fields: Option<String>,

    #[command(flatten)]
    pub pages: PageArgs,
}

/// Parse `key=value`, reading the value as JSON when possible.
pub fn parse_var(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{raw}'"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn resolve_date(explicit: Option<&str>) -> String {
    explicit.map(String::from).unwrap_or_else(today)
}

fn today() -> String {
    let date: NaiveDate = Local::now().date_naive();
    date.format("%Y-%m-%d").to_string()
}
