//! Field classification.
//!
//! Walks the backend's flattened field list once, in document order, and
//! turns each renderable field into a [`FormField`]. Every name is first
//! routed ([`FieldRoute`]) so overlay and rule fields never reach type
//! dispatch. Problems with auxiliary data (tooltip, date script, options)
//! degrade to defaults and are reported as [`FormWarning`]s.

use std::collections::HashSet;

use crate::date_format::extract_date_format;
use crate::error::{ClassifyOptions, ClassifyResult, FormWarning, FormWarningCode};
use crate::form_field::{ButtonKind, FieldKind, FieldType, FormData, FormField, RawField};
use crate::object::{PdfValue, Resolve};
use crate::options::{appearance_states, export_values};

/// Where a field name belongs, decided before any type-specific work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRoute {
    /// An ordinary form field.
    Renderable,
    /// Signature/date overlay placeholder (`esign_` prefix).
    SignatureOverlay,
    /// Image overlay placeholder (`image_` prefix).
    ImageOverlay,
    /// Carrier of the rendering-rule metadata.
    RenderingRule,
    /// A name already classified earlier in the traversal.
    Ignored,
}

/// Route a field name using the configured prefixes and markers.
///
/// Matching is case-insensitive. `seen` holds names already classified.
pub fn route_field(name: &str, seen: &HashSet<String>, options: &ClassifyOptions) -> FieldRoute {
    if seen.contains(name) {
        return FieldRoute::Ignored;
    }
    let lower = name.to_lowercase();
    if options
        .signature_prefixes
        .iter()
        .any(|p| lower.starts_with(p.as_str()))
    {
        FieldRoute::SignatureOverlay
    } else if options
        .image_prefixes
        .iter()
        .any(|p| lower.starts_with(p.as_str()))
    {
        FieldRoute::ImageOverlay
    } else if lower.contains(options.rendering_rules_marker.as_str()) {
        FieldRoute::RenderingRule
    } else {
        FieldRoute::Renderable
    }
}

/// Classify a document's fields into [`FormData`].
///
/// The first occurrence of a name wins; later fields with the same name are
/// ignored. Push buttons, signature fields, and untyped fields are skipped.
pub fn classify_fields(
    fields: &[RawField],
    resolver: &dyn Resolve,
    options: &ClassifyOptions,
) -> ClassifyResult<FormData> {
    let mut data = FormData::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut warnings = Vec::new();

    for field in fields {
        if route_field(&field.name, &seen, options) != FieldRoute::Renderable {
            continue;
        }
        if let Some(classified) = classify_field(field, resolver, options, &mut warnings) {
            seen.insert(classified.name.clone());
            data.fields.push(classified);
        }
    }

    if !options.collect_warnings {
        warnings.clear();
    }
    ClassifyResult::with_warnings(data, warnings)
}

/// Classify a single renderable field.
///
/// Returns `None` for field types that are not part of the form data.
fn classify_field(
    field: &RawField,
    resolver: &dyn Resolve,
    options: &ClassifyOptions,
    warnings: &mut Vec<FormWarning>,
) -> Option<FormField> {
    let (kind, date_format, field_options) = match field.field_type? {
        FieldType::Text => {
            if field
                .name
                .to_lowercase()
                .contains(options.date_field_marker.as_str())
            {
                let format = date_format_of(field, resolver, warnings);
                (FieldKind::Date, format, Vec::new())
            } else {
                (FieldKind::Text, None, Vec::new())
            }
        }
        FieldType::Button => {
            let kind = match field.flags.button_kind() {
                ButtonKind::Checkbox => FieldKind::Checkbox,
                ButtonKind::Radio => FieldKind::Radio,
                ButtonKind::PushButton => return None,
            };
            let states = appearance_states(&field.name, &field.widgets, resolver, warnings);
            (kind, None, states)
        }
        FieldType::Choice => {
            let values = export_values(&field.name, field.attribute("Opt"), resolver, warnings);
            (FieldKind::Dropdown, None, values)
        }
        FieldType::Signature => return None,
    };

    Some(FormField {
        name: field.name.clone(),
        kind,
        label: tooltip_of(field, resolver, warnings),
        date_format,
        is_required: field.flags.is_required(),
        options: field_options,
    })
}

/// The `/TU` tooltip, or `""` when absent or not a string.
fn tooltip_of(field: &RawField, resolver: &dyn Resolve, warnings: &mut Vec<FormWarning>) -> String {
    let Some(tu) = field.attribute("TU") else {
        return String::new();
    };
    match resolver.deref(tu).as_ref().and_then(PdfValue::as_text) {
        Some(text) => text,
        None => {
            warnings.push(FormWarning::new(
                FormWarningCode::MalformedTooltip,
                &field.name,
                format!("/TU is a {}, expected string", tu.kind()),
            ));
            String::new()
        }
    }
}

/// Follow `/AA /K /JS` and extract the date pattern.
///
/// `/K` may be inline or indirect; `/JS` may be a string or a stream.
fn date_format_of(
    field: &RawField,
    resolver: &dyn Resolve,
    warnings: &mut Vec<FormWarning>,
) -> Option<String> {
    let aa = field.attribute("AA")?;
    let mut malformed = |what: String| {
        warnings.push(FormWarning::new(
            FormWarningCode::MalformedAction,
            &field.name,
            what,
        ));
    };

    let Some(aa) = resolver.deref(aa) else {
        malformed("/AA reference cannot be resolved".to_string());
        return None;
    };
    let Some(aa) = aa.as_dict() else {
        malformed(format!("/AA is a {}, expected dictionary", aa.kind()));
        return None;
    };
    let keystroke = aa.get("K")?;
    let Some(keystroke) = resolver.deref(keystroke) else {
        malformed("/AA /K reference cannot be resolved".to_string());
        return None;
    };
    let Some(js) = keystroke.as_dict().and_then(|k| k.get("JS")) else {
        malformed("/AA /K has no /JS script".to_string());
        return None;
    };
    let script = match resolver.deref(js) {
        Some(PdfValue::String(bytes)) => crate::object::decode_text(&bytes),
        Some(PdfValue::Stream { content, .. }) => crate::object::decode_text(&content),
        _ => {
            malformed("/JS is neither a string nor a stream".to_string());
            return None;
        }
    };

    let format = extract_date_format(&script);
    if format.is_empty() {
        warnings.push(FormWarning::new(
            FormWarningCode::MissingDateFormat,
            &field.name,
            "keystroke script has no date format",
        ));
        None
    } else {
        Some(format.to_string())
    }
}
