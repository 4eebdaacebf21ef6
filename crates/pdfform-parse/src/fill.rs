//! Applying a fill batch to a lopdf field tree.

use lopdf::{Document, Object, ObjectId, StringFormat};
use pdfform_core::{ButtonKind, FieldType, OFF_STATE, PdfFieldData, encode_text};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::field_tree::{self, FieldNode, deref, deref_entry};

/// Set field values from `batch`, returning how many pairs were applied.
///
/// Names without a matching terminal field are logged and skipped, as are
/// push buttons, signature fields, and untyped fields. Every terminal field
/// carrying the name receives the value.
pub(crate) fn apply_fill(
    doc: &mut Document,
    batch: &[PdfFieldData],
    max_depth: usize,
) -> Result<usize, BackendError> {
    if batch.is_empty() {
        return Ok(0);
    }
    if field_tree::root_fields(doc).is_none() {
        return Err(BackendError::Fill(
            "document has no interactive form".to_string(),
        ));
    }

    let fields = field_tree::collect_fields(doc, max_depth);
    let mut applied = 0;

    for entry in batch {
        let targets: Vec<&FieldNode> = fields.iter().filter(|f| f.name == entry.name).collect();
        if targets.is_empty() {
            warn!(field = %entry.name, "no field with this name, value skipped");
            continue;
        }

        let mut touched = false;
        for node in targets {
            match node.field_type {
                Some(FieldType::Text) | Some(FieldType::Choice) => {
                    set_text_value(doc, node, &entry.value)?;
                    touched = true;
                }
                Some(FieldType::Button) if node.flags.button_kind() != ButtonKind::PushButton => {
                    set_button_state(doc, node, &entry.value)?;
                    touched = true;
                }
                other => {
                    debug!(field = %entry.name, field_type = ?other, "field type cannot be filled");
                }
            }
        }
        if touched {
            debug!(field = %entry.name, value = %entry.value, "field filled");
            applied += 1;
        }
    }

    Ok(applied)
}

fn set_text_value(doc: &mut Document, node: &FieldNode, value: &str) -> Result<(), BackendError> {
    field_dict_mut(doc, node.id, &node.name)?.set(
        "V",
        Object::String(encode_text(value), StringFormat::Literal),
    );
    Ok(())
}

/// Select a button state: `/V` on the field, `/AS` on each widget.
///
/// A widget shows the state only if its appearance dictionary has an entry
/// for it (or it has no appearance at all); otherwise it is turned off. An
/// empty value clears the button.
fn set_button_state(doc: &mut Document, node: &FieldNode, value: &str) -> Result<(), BackendError> {
    let state = if value.is_empty() { OFF_STATE } else { value };

    let widget_states: Vec<(ObjectId, bool)> = node
        .widget_ids
        .iter()
        .map(|id| (*id, widget_accepts_state(doc, *id, state)))
        .collect();

    field_dict_mut(doc, node.id, &node.name)?.set("V", Object::Name(state.as_bytes().to_vec()));

    for (widget_id, accepts) in widget_states {
        let shown = if accepts { state } else { OFF_STATE };
        field_dict_mut(doc, widget_id, &node.name)?
            .set("AS", Object::Name(shown.as_bytes().to_vec()));
    }
    Ok(())
}

/// Whether the widget's normal appearance has an entry for `state`.
pub(crate) fn widget_accepts_state(doc: &Document, widget_id: ObjectId, state: &str) -> bool {
    let Some(widget) = doc.get_dictionary(widget_id).ok() else {
        return false;
    };
    let Some(normal) = deref_entry(doc, widget, b"AP")
        .and_then(|ap| ap.as_dict().ok())
        .and_then(|ap| ap.get(b"N").ok())
        .and_then(|n| deref(doc, n))
    else {
        return true;
    };
    match normal.as_dict() {
        Ok(states) if !matches!(normal, Object::Stream(_)) => states.has(state.as_bytes()),
        _ => true,
    }
}

fn field_dict_mut<'a>(
    doc: &'a mut Document,
    id: ObjectId,
    name: &str,
) -> Result<&'a mut lopdf::Dictionary, BackendError> {
    doc.get_dictionary_mut(id)
        .map_err(|e| BackendError::Fill(format!("field {name}: {e}")))
}
