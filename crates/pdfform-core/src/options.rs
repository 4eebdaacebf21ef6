//! Option discovery for button and choice fields.
//!
//! Checkboxes and radio buttons expose their states as keys of each widget's
//! `/AP /D` (down) appearance dictionary; choice fields list
//! `[export, display]` pairs in `/Opt`. Both produce an ordered,
//! non-deduplicated list of strings.

use crate::error::{FormWarning, FormWarningCode};
use crate::object::{PdfDict, PdfValue, Resolve};

/// Appearance state every button has besides its "on" states.
pub const OFF_STATE: &str = "Off";

/// Collect the appearance states of a button's widgets, skipping `Off`.
///
/// States are concatenated in widget order; a radio group with three widgets
/// yields one state per widget.
pub fn appearance_states(
    field: &str,
    widgets: &[PdfDict],
    resolver: &dyn Resolve,
    warnings: &mut Vec<FormWarning>,
) -> Vec<String> {
    let mut states = Vec::new();

    for (index, widget) in widgets.iter().enumerate() {
        let Some(ap) = widget.get("AP") else {
            continue;
        };
        let Some(ap) = resolver.deref(ap) else {
            warnings.push(FormWarning::new(
                FormWarningCode::MalformedAppearance,
                field,
                format!("widget {index}: /AP reference cannot be resolved"),
            ));
            continue;
        };
        let Some(ap) = ap.as_dict() else {
            warnings.push(FormWarning::new(
                FormWarningCode::MalformedAppearance,
                field,
                format!("widget {index}: /AP is a {}, expected dictionary", ap.kind()),
            ));
            continue;
        };
        let Some(down) = ap.get("D") else {
            continue;
        };
        match resolver.deref(down) {
            Some(PdfValue::Dictionary(down)) => {
                states.extend(
                    down.keys()
                        .filter(|key| *key != OFF_STATE)
                        .map(str::to_string),
                );
            }
            Some(other) => warnings.push(FormWarning::new(
                FormWarningCode::MalformedAppearance,
                field,
                format!("widget {index}: /AP /D is a {}, expected dictionary", other.kind()),
            )),
            None => warnings.push(FormWarning::new(
                FormWarningCode::MalformedAppearance,
                field,
                format!("widget {index}: /AP /D reference cannot be resolved"),
            )),
        }
    }

    states
}

/// Collect the export values of a choice field's `/Opt` array.
///
/// Only `[export, display]` pairs contribute; the display label is ignored.
/// A pair whose export value is not a string contributes `""`.
pub fn export_values(
    field: &str,
    opt: Option<&PdfValue>,
    resolver: &dyn Resolve,
    warnings: &mut Vec<FormWarning>,
) -> Vec<String> {
    let Some(opt) = opt else {
        return Vec::new();
    };
    let items = match resolver.deref(opt) {
        Some(PdfValue::Array(items)) => items,
        Some(other) => {
            warnings.push(FormWarning::new(
                FormWarningCode::MalformedOption,
                field,
                format!("/Opt is a {}, expected array", other.kind()),
            ));
            return Vec::new();
        }
        None => {
            warnings.push(FormWarning::new(
                FormWarningCode::MalformedOption,
                field,
                "/Opt reference cannot be resolved",
            ));
            return Vec::new();
        }
    };

    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match resolver.deref(item) {
            Some(PdfValue::Array(pair)) => {
                let export = pair
                    .first()
                    .and_then(|first| resolver.deref(first))
                    .and_then(|first| first.as_text())
                    .unwrap_or_default();
                values.push(export);
            }
            Some(other) => warnings.push(FormWarning::new(
                FormWarningCode::MalformedOption,
                field,
                format!("option {index} is a {}, expected [export display] pair", other.kind()),
            )),
            None => warnings.push(FormWarning::new(
                FormWarningCode::MalformedOption,
                field,
                format!("option {index} reference cannot be resolved"),
            )),
        }
    }
    values
}
