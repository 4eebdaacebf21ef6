use std::collections::BTreeMap;
use std::path::Path;

use pdfform::FormDocument;

/// Open a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not found
/// or cannot be parsed as a valid PDF.
pub fn open_form(file: &Path) -> Result<FormDocument, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    FormDocument::open_file(file).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Parse a `NAME=VALUE` argument. Only the first `=` splits; the value may be empty.
pub fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, _)) if name.is_empty() => Err(format!("missing field name in '{arg}'")),
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(format!("expected NAME=VALUE, got '{arg}'")),
    }
}

/// Read a JSON object of field name to string value.
pub fn read_values(path: &Path) -> Result<BTreeMap<String, String>, i32> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: cannot read {}: {e}", path.display());
        1
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!(
            "Error: {} must be a JSON object of string values: {e}",
            path.display()
        );
        1
    })
}

/// Print a serialization failure and return the exit code.
pub fn json_error(err: serde_json::Error) -> i32 {
    eprintln!("Error: failed to encode JSON: {err}");
    1
}

/// Escape tabs and newlines so a value stays on one text row.
pub fn tsv_escape(text: &str) -> String {
    text.replace('\t', "\\t").replace('\n', "\\n")
}
