use std::collections::BTreeMap;
use std::path::Path;

use pdfform::plan_fill;
use tracing::warn;

use crate::shared::{json_error, open_form, read_values};

pub struct FillArgs<'a> {
    pub file: &'a Path,
    pub output: Option<&'a Path>,
    pub values: Option<&'a Path>,
    pub assignments: &'a [(String, String)],
    pub dry_run: bool,
}

pub fn run(args: FillArgs<'_>) -> Result<(), i32> {
    let values = collect_values(args.values, args.assignments)?;
    let form = open_form(args.file)?;
    if !form.has_form() {
        warn!(file = %args.file.display(), "document has no interactive form");
    }

    if args.dry_run {
        return print_plan(&values);
    }

    let Some(output) = args.output else {
        eprintln!("Error: --output is required unless --dry-run is given");
        return Err(1);
    };

    let mut flattened = form.fill(&values).map_err(|e| {
        eprintln!("Error: failed to fill form: {e}");
        1
    })?;
    flattened.save(output).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", output.display());
        1
    })?;

    println!(
        "filled {} field(s), wrote {}",
        flattened.report().filled,
        output.display()
    );
    Ok(())
}

/// `--values` first, then each `--set` in order; later entries win.
fn collect_values(
    values_file: Option<&Path>,
    assignments: &[(String, String)],
) -> Result<BTreeMap<String, String>, i32> {
    let mut values = match values_file {
        Some(path) => read_values(path)?,
        None => BTreeMap::new(),
    };
    values.extend(assignments.iter().cloned());
    Ok(values)
}

fn print_plan(values: &BTreeMap<String, String>) -> Result<(), i32> {
    let plan = plan_fill(values);
    let json = serde_json::json!({
        "batch": plan.batch,
        "flattenCandidates": plan.flatten_candidates,
    });
    let json = serde_json::to_string_pretty(&json).map_err(json_error)?;
    println!("{json}");
    Ok(())
}
