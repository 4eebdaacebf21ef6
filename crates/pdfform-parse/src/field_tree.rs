//! AcroForm field-tree traversal over a lopdf document.
//!
//! Intermediate nodes carry partial names (joined with `.`) and may carry
//! `/FT` and `/Ff` for their descendants. A node whose `/Kids` contain no
//! child fields (kids without `/T`) is terminal; its kids are its widgets.

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfform_core::{FieldFlags, FieldType, decode_text};
use tracing::debug;

/// A terminal field located in the document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldNode {
    /// Object id of the field dictionary.
    pub id: ObjectId,
    /// Fully qualified name.
    pub name: String,
    /// `/FT`, own or inherited.
    pub field_type: Option<FieldType>,
    /// `/Ff`, own or inherited.
    pub flags: FieldFlags,
    /// Widget annotation ids, in `/Kids` order. A merged field/widget
    /// dictionary lists itself.
    pub widget_ids: Vec<ObjectId>,
}

/// Follow a reference, or return the object itself.
pub(crate) fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// The catalog's `/AcroForm` dictionary, if any.
pub(crate) fn acroform_dict(doc: &Document) -> Option<&Dictionary> {
    let catalog = doc.catalog().ok()?;
    let acroform = deref(doc, catalog.get(b"AcroForm").ok()?)?;
    acroform.as_dict().ok()
}

/// The `/Fields` array of the interactive form, if any.
pub(crate) fn root_fields(doc: &Document) -> Option<&Vec<Object>> {
    let acroform = acroform_dict(doc)?;
    deref(doc, acroform.get(b"Fields").ok()?)?.as_array().ok()
}

/// Collect terminal fields in depth-first document order.
pub(crate) fn collect_fields(doc: &Document, max_depth: usize) -> Vec<FieldNode> {
    let Some(roots) = root_fields(doc) else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    for entry in roots {
        let Object::Reference(field_id) = entry else {
            debug!("skipping inline /Fields entry");
            continue;
        };
        walk_field_tree(
            doc,
            *field_id,
            None,
            Inherited::default(),
            0,
            max_depth,
            &mut fields,
        );
    }
    fields
}

#[derive(Debug, Clone, Copy, Default)]
struct Inherited {
    field_type: Option<FieldType>,
    flags: Option<FieldFlags>,
}

fn walk_field_tree(
    doc: &Document,
    field_id: ObjectId,
    parent_name: Option<&str>,
    inherited: Inherited,
    depth: usize,
    max_depth: usize,
    fields: &mut Vec<FieldNode>,
) {
    if depth >= max_depth {
        debug!(?field_id, depth, "field tree depth limit reached");
        return;
    }

    let Some(field_dict) = doc.get_object(field_id).ok().and_then(|o| o.as_dict().ok()) else {
        debug!(?field_id, "field object is missing or not a dictionary");
        return;
    };

    let partial_name = text_entry(doc, field_dict, b"T");
    let full_name = match (parent_name, partial_name) {
        (Some(parent), Some(name)) => format!("{parent}.{name}"),
        (Some(parent), None) => parent.to_string(),
        (None, Some(name)) => name,
        (None, None) => String::new(),
    };

    let own = Inherited {
        field_type: match field_dict.get(b"FT") {
            Ok(Object::Name(name)) => FieldType::from_pdf_name(&String::from_utf8_lossy(name)),
            _ => None,
        },
        flags: match deref_entry(doc, field_dict, b"Ff") {
            Some(Object::Integer(bits)) => Some(FieldFlags::from_bits_retain(*bits as u32)),
            _ => None,
        },
    };
    let current = Inherited {
        field_type: own.field_type.or(inherited.field_type),
        flags: own.flags.or(inherited.flags),
    };

    let kids = deref_entry(doc, field_dict, b"Kids").and_then(|k| k.as_array().ok());
    let mut widget_ids = Vec::new();

    if let Some(kids) = kids {
        let has_child_fields = kids.iter().any(|kid| {
            deref(doc, kid)
                .and_then(|o| o.as_dict().ok())
                .is_some_and(|d| d.has(b"T"))
        });

        if has_child_fields {
            for kid in kids {
                if let Object::Reference(kid_id) = kid {
                    walk_field_tree(
                        doc,
                        *kid_id,
                        Some(&full_name),
                        current,
                        depth + 1,
                        max_depth,
                        fields,
                    );
                }
            }
            return;
        }

        widget_ids.extend(kids.iter().filter_map(|kid| kid.as_reference().ok()));
    } else if is_widget(field_dict) {
        widget_ids.push(field_id);
    }

    fields.push(FieldNode {
        id: field_id,
        name: full_name,
        field_type: current.field_type,
        flags: current.flags.unwrap_or_else(FieldFlags::empty),
        widget_ids,
    });
}

/// Whether a dictionary is (also) a widget annotation.
pub(crate) fn is_widget(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Widget")
        || dict.has(b"Rect")
}

/// Look up a key, following one level of indirection.
pub(crate) fn deref_entry<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    deref(doc, dict.get(key).ok()?)
}

/// A text-string or name entry, decoded.
pub(crate) fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match deref_entry(doc, dict, key)? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}
