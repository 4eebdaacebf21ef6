use std::path::Path;

use crate::shared::{json_error, open_form};

pub fn run(file: &Path) -> Result<(), i32> {
    let form = open_form(file)?;
    let metadata = form.combined_metadata().map_err(|e| {
        eprintln!("Error: failed to read form metadata: {e}");
        1
    })?;

    let json = serde_json::to_string_pretty(&metadata).map_err(json_error)?;
    println!("{json}");
    Ok(())
}
