use std::path::Path;

use pdfform::{FormData, FormField};

use crate::cli::OutputFormat;
use crate::shared::{json_error, open_form, tsv_escape};

pub fn run(file: &Path, format: &OutputFormat) -> Result<(), i32> {
    let form = open_form(file)?;
    let result = form.classify().map_err(|e| {
        eprintln!("Error: failed to read form fields: {e}");
        1
    })?;

    match format {
        OutputFormat::Text => {
            write_text(&result.value);
            Ok(())
        }
        OutputFormat::Json => write_json(&result.value),
    }
}

fn write_text(data: &FormData) {
    println!("name\ttype\tlabel\trequired\tdate_format\toptions");
    for field in data {
        println!("{}", text_row(field));
    }
}

fn text_row(field: &FormField) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        tsv_escape(&field.name),
        field.kind.as_str(),
        tsv_escape(&field.label),
        field.is_required,
        field.date_format.as_deref().unwrap_or(""),
        tsv_escape(&field.options.join("; ")),
    )
}

fn write_json(data: &FormData) -> Result<(), i32> {
    let json = serde_json::to_string_pretty(data).map_err(json_error)?;
    println!("{json}");
    Ok(())
}
