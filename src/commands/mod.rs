pub mod boards;
pub mod init;
pub mod query;
pub mod vars;

use std::io::Read;

use monday_client::Result;

/// Read a query template from a file, or from stdin when `source` is `-`.
pub fn read_template(source: &str) -> Result<String> {
    if source == "-" {
        let mut template = String::new();
        std::io::stdin().read_to_string(&mut template)?;
        return Ok(template);
    }

    Ok(std::fs::read_to_string(source)?)
}
