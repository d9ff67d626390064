use std::io::{self, Write};

use monday_client::config::Config;
use monday_client::{MondayError, Result};

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;

        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Monday CLI Configuration");
    println!("========================\n");

    let api_token = prompt("Enter your Monday.com API token (Profile > Developers > My access tokens): ")?;
    if api_token.is_empty() {
        return Err(MondayError::MissingApiToken);
    }

    let api_url = prompt("Enter API URL [https://api.monday.com/v2]: ")?;
    if !api_url.is_empty() {
        url::Url::parse(&api_url).map_err(|_| MondayError::InvalidUrl(api_url.clone()))?;
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MondayError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    let mut config_content = format!("api_token = {}\n", toml_string(&api_token));
    if !api_url.is_empty() {
        config_content.push_str(&format!("api_url = {}\n", toml_string(&api_url)));
    }

    std::fs::write(&config_path, config_content).map_err(|e| MondayError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'monday' commands!");

    Ok(())
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
