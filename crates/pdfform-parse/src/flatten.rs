//! Flattening form widgets into page content.
//!
//! Each visible widget's normal appearance is painted as a Form XObject
//! mapped onto the widget's `/Rect`; the widget is then dropped from the
//! page's `/Annots`. After all pages, `/AcroForm` is removed from the
//! catalog and unreachable field objects are pruned.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use pdfform_core::{ButtonKind, FieldFlags, FieldType, FlattenPolicy, OFF_STATE, decode_text};
use tracing::{debug, info};

use crate::appearance::{
    self, DefaultAppearance, FONT_RESOURCE, Quadding, checkbox_appearance, radio_appearance,
    text_appearance,
};
use crate::error::BackendError;
use crate::field_tree::{self, FieldNode, deref, deref_entry, text_entry};

/// Annotation flag bit 2: the annotation is hidden.
const HIDDEN_FLAG: i64 = 1 << 1;

/// Counts reported after flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FlattenSummary {
    /// Widgets whose appearance was painted into page content.
    pub painted: usize,
    /// Widgets removed from `/Annots` (painted or not).
    pub removed: usize,
}

/// Flatten every widget of every page and remove the interactive form.
pub(crate) fn flatten_form(
    doc: &mut Document,
    policy: &FlattenPolicy,
    max_depth: usize,
) -> Result<FlattenSummary, BackendError> {
    let owners: HashMap<ObjectId, FieldNode> = field_tree::collect_fields(doc, max_depth)
        .into_iter()
        .flat_map(|node| {
            node.widget_ids
                .clone()
                .into_iter()
                .map(move |id| (id, node.clone()))
        })
        .collect();
    let form_defaults = FormDefaults::read(doc);
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    let mut painter = Painter {
        policy: *policy,
        defaults: form_defaults,
        font_id: None,
        next_name: 0,
    };
    let mut summary = FlattenSummary::default();

    for page_id in page_ids {
        let page = painter.flatten_page(doc, page_id, &owners)?;
        summary.painted += page.painted;
        summary.removed += page.removed;
    }

    if let Ok(catalog) = doc.catalog_mut() {
        catalog.remove(b"AcroForm");
    }
    let pruned = doc.prune_objects();
    info!(
        painted = summary.painted,
        removed = summary.removed,
        pruned = pruned.len(),
        "form flattened"
    );
    Ok(summary)
}

/// Form-level `/DA` and `/Q`, inherited by fields that lack their own.
#[derive(Debug, Clone, Default)]
struct FormDefaults {
    da: Option<String>,
    q: Option<i64>,
}

impl FormDefaults {
    fn read(doc: &Document) -> Self {
        let Some(acroform) = field_tree::acroform_dict(doc) else {
            return Self::default();
        };
        Self {
            da: text_entry(doc, acroform, b"DA"),
            q: deref_entry(doc, acroform, b"Q").and_then(|q| q.as_i64().ok()),
        }
    }
}

/// Where a widget's painted appearance comes from.
enum AppearanceSource {
    /// An existing appearance stream.
    Existing(ObjectId),
    /// Freshly generated content; `uses_font` when it draws text.
    Generated { content: Vec<u8>, uses_font: bool },
}

struct Painter {
    policy: FlattenPolicy,
    defaults: FormDefaults,
    font_id: Option<ObjectId>,
    next_name: usize,
}

impl Painter {
    fn flatten_page(
        &mut self,
        doc: &mut Document,
        page_id: ObjectId,
        owners: &HashMap<ObjectId, FieldNode>,
    ) -> Result<FlattenSummary, BackendError> {
        let mut summary = FlattenSummary::default();
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| BackendError::Flatten(format!("page {page_id:?}: {e}")))?;
        let Some(annots) = deref_entry(doc, page, b"Annots").and_then(|a| a.as_array().ok())
        else {
            return Ok(summary);
        };
        let annots = annots.clone();

        let mut kept = Vec::with_capacity(annots.len());
        let mut overlay = Vec::new();

        for annot in annots {
            let (widget_id, widget) = match &annot {
                Object::Reference(id) => match doc.get_dictionary(*id) {
                    Ok(dict) => (Some(*id), dict.clone()),
                    Err(_) => {
                        kept.push(annot);
                        continue;
                    }
                },
                Object::Dictionary(dict) => (None, dict.clone()),
                _ => {
                    kept.push(annot);
                    continue;
                }
            };
            if !matches!(widget.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Widget") {
                kept.push(annot);
                continue;
            }
            summary.removed += 1;

            let flags = deref_entry(doc, &widget, b"F")
                .and_then(|f| f.as_i64().ok())
                .unwrap_or(0);
            if flags & HIDDEN_FLAG != 0 {
                debug!(?widget_id, "hidden widget removed without painting");
                continue;
            }
            let Some(rect) = read_rect(doc, &widget, b"Rect") else {
                debug!(?widget_id, "widget without /Rect removed without painting");
                continue;
            };

            let owner = widget_id.and_then(|id| owners.get(&id));
            let Some(source) = self.choose_appearance(doc, &widget, owner, rect) else {
                continue;
            };
            let xobject_id = match source {
                AppearanceSource::Existing(id) => {
                    ensure_form_xobject(doc, id);
                    id
                }
                AppearanceSource::Generated { content, uses_font } => {
                    self.add_generated(doc, rect, content, uses_font)
                }
            };
            let Some((bbox, matrix)) = form_geometry(doc, xobject_id) else {
                debug!(?widget_id, "appearance stream has no usable /BBox");
                continue;
            };

            let name = self.add_xobject_resource(doc, page_id, xobject_id)?;
            overlay.extend_from_slice(&placement_ops(&name, bbox, matrix, rect));
            summary.painted += 1;
        }

        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| BackendError::Flatten(format!("page {page_id:?}: {e}")))?;
        if kept.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", kept);
        }
        if !overlay.is_empty() {
            append_page_content(doc, page_id, overlay)?;
        }
        Ok(summary)
    }

    /// Pick the appearance to paint for one widget, following the policy.
    fn choose_appearance(
        &self,
        doc: &Document,
        widget: &Dictionary,
        owner: Option<&FieldNode>,
        rect: [f32; 4],
    ) -> Option<AppearanceSource> {
        let field = owner.and_then(|o| doc.get_dictionary(o.id).ok());
        let field_type = owner.and_then(|o| o.field_type).or_else(|| {
            match widget.get(b"FT") {
                Ok(Object::Name(n)) => FieldType::from_pdf_name(&String::from_utf8_lossy(n)),
                _ => None,
            }
        });
        let flags = owner.map(|o| o.flags).unwrap_or_else(FieldFlags::empty);
        let existing = existing_appearance(doc, widget);

        let is_text = field_type == Some(FieldType::Text);
        if is_text && self.policy.regenerate_text_fields {
            return Some(self.text_source(doc, widget, field, rect));
        }
        if let Some(id) = existing {
            if self.policy.only_if_missing || !has_generator(field_type, flags) {
                return Some(AppearanceSource::Existing(id));
            }
        }

        let (width, height) = (rect[2] - rect[0], rect[3] - rect[1]);
        match field_type {
            Some(FieldType::Text) | Some(FieldType::Choice) => {
                Some(self.text_source(doc, widget, field, rect))
            }
            Some(FieldType::Button) => {
                let on = button_is_on(doc, widget, field);
                let content = match flags.button_kind() {
                    ButtonKind::Checkbox => checkbox_appearance(width, height, on),
                    ButtonKind::Radio => radio_appearance(width, height, on),
                    ButtonKind::PushButton => return None,
                };
                Some(AppearanceSource::Generated {
                    content,
                    uses_font: false,
                })
            }
            Some(FieldType::Signature) | None => None,
        }
    }

    fn text_source(
        &self,
        doc: &Document,
        widget: &Dictionary,
        field: Option<&Dictionary>,
        rect: [f32; 4],
    ) -> AppearanceSource {
        let lookup = |key: &[u8]| {
            deref_entry(doc, widget, key)
                .or_else(|| field.and_then(|f| deref_entry(doc, f, key)))
        };
        let da = lookup(b"DA")
            .and_then(|o| o.as_str().ok().map(|s| String::from_utf8_lossy(s).into_owned()))
            .or_else(|| self.defaults.da.clone())
            .map(|da| DefaultAppearance::parse(&da))
            .unwrap_or_default();
        let quadding = lookup(b"Q")
            .and_then(|q| q.as_i64().ok())
            .or(self.defaults.q)
            .map(Quadding::from_q)
            .unwrap_or_default();
        let value = field
            .or(Some(widget))
            .and_then(|dict| field_value_text(doc, dict))
            .unwrap_or_default();

        AppearanceSource::Generated {
            content: text_appearance(rect[2] - rect[0], rect[3] - rect[1], &value, &da, quadding),
            uses_font: true,
        }
    }

    fn add_generated(
        &mut self,
        doc: &mut Document,
        rect: [f32; 4],
        content: Vec<u8>,
        uses_font: bool,
    ) -> ObjectId {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![
                0.into(),
                0.into(),
                Object::Real((rect[2] - rect[0]) as _),
                Object::Real((rect[3] - rect[1]) as _),
            ],
        };
        if uses_font {
            let font_id = self.font(doc);
            dict.set(
                "Resources",
                dictionary! {
                    "Font" => dictionary! { FONT_RESOURCE => font_id },
                },
            );
        }
        doc.add_object(Stream::new(dict, content))
    }

    /// The Helvetica font object used by generated text, created once.
    fn font(&mut self, doc: &mut Document) -> ObjectId {
        *self.font_id.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            })
        })
    }

    /// Register `xobject` in the page's `/Resources /XObject`, returning its name.
    fn add_xobject_resource(
        &mut self,
        doc: &mut Document,
        page_id: ObjectId,
        xobject: ObjectId,
    ) -> Result<String, BackendError> {
        let xobjects = xobject_dict_mut(doc, page_id)?;
        let name = loop {
            self.next_name += 1;
            let candidate = format!("FlatW{}", self.next_name);
            if !xobjects.has(candidate.as_bytes()) {
                break candidate;
            }
        };
        xobjects.set(name.as_str(), xobject);
        Ok(name)
    }
}

fn has_generator(field_type: Option<FieldType>, flags: FieldFlags) -> bool {
    match field_type {
        Some(FieldType::Text) | Some(FieldType::Choice) => true,
        Some(FieldType::Button) => flags.button_kind() != ButtonKind::PushButton,
        _ => false,
    }
}

/// The widget's current normal appearance stream, if it has one.
///
/// `/AP /N` is either a stream or a dictionary of states keyed by `/AS`.
fn existing_appearance(doc: &Document, widget: &Dictionary) -> Option<ObjectId> {
    let ap = deref_entry(doc, widget, b"AP")?.as_dict().ok()?;
    let normal = ap.get(b"N").ok()?;
    if let Object::Reference(normal_id) = normal {
        if let Ok(Object::Stream(_)) = doc.get_object(*normal_id) {
            return Some(*normal_id);
        }
    }
    let states = deref(doc, normal)?.as_dict().ok()?;
    let state = match widget.get(b"AS") {
        Ok(Object::Name(name)) => name.as_slice(),
        _ => return None,
    };
    states.get(state).ok()?.as_reference().ok()
}

fn button_is_on(doc: &Document, widget: &Dictionary, field: Option<&Dictionary>) -> bool {
    if let Ok(Object::Name(state)) = widget.get(b"AS") {
        return state != OFF_STATE.as_bytes();
    }
    field
        .or(Some(widget))
        .and_then(|dict| field_value_text(doc, dict))
        .is_some_and(|v| !v.is_empty() && v != OFF_STATE)
}

/// `/V` as display text. Multi-select arrays are joined with `, `.
fn field_value_text(doc: &Document, dict: &Dictionary) -> Option<String> {
    match deref_entry(doc, dict, b"V")? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Array(items) => {
            let values: Vec<String> = items
                .iter()
                .filter_map(|item| match deref(doc, item)? {
                    Object::String(bytes, _) => Some(decode_text(bytes)),
                    Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
                    _ => None,
                })
                .collect();
            (!values.is_empty()).then(|| values.join(", "))
        }
        _ => None,
    }
}

/// A normalized `[llx lly urx ury]` rectangle with non-zero area.
fn read_rect(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<[f32; 4]> {
    let numbers = read_numbers(doc, deref_entry(doc, dict, key)?)?;
    let [x0, y0, x1, y1] = <[f32; 4]>::try_from(numbers).ok()?;
    let rect = [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)];
    (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
}

fn read_numbers(doc: &Document, obj: &Object) -> Option<Vec<f32>> {
    obj.as_array()
        .ok()?
        .iter()
        .map(|item| match deref(doc, item)? {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r as f32),
            _ => None,
        })
        .collect()
}

/// `/BBox` and `/Matrix` of a form XObject.
fn form_geometry(doc: &Document, id: ObjectId) -> Option<([f32; 4], [f32; 6])> {
    let stream = doc.get_object(id).ok()?.as_stream().ok()?;
    let bbox = read_rect(doc, &stream.dict, b"BBox")?;
    let matrix = deref_entry(doc, &stream.dict, b"Matrix")
        .and_then(|m| read_numbers(doc, m))
        .and_then(|m| <[f32; 6]>::try_from(m).ok())
        .unwrap_or([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    Some((bbox, matrix))
}

/// Mark an existing appearance stream as a form XObject if it is not already.
fn ensure_form_xobject(doc: &mut Document, id: ObjectId) {
    if let Ok(Object::Stream(stream)) = doc.get_object_mut(id) {
        if !stream.dict.has(b"Subtype") {
            stream.dict.set("Type", "XObject");
            stream.dict.set("Subtype", "Form");
        }
    }
}

/// `q sx 0 0 sy tx ty cm /Name Do Q`, mapping the transformed bbox onto `rect`.
///
/// `Do` applies the form's own `/Matrix`, so only the bbox-to-rect mapping
/// is emitted here.
fn placement_ops(name: &str, bbox: [f32; 4], matrix: [f32; 6], rect: [f32; 4]) -> Vec<u8> {
    let [x0, y0, x1, y1] = transformed_bbox(bbox, matrix);
    let (bw, bh) = (x1 - x0, y1 - y0);
    let sx = if bw != 0.0 { (rect[2] - rect[0]) / bw } else { 1.0 };
    let sy = if bh != 0.0 { (rect[3] - rect[1]) / bh } else { 1.0 };
    let tx = rect[0] - x0 * sx;
    let ty = rect[1] - y0 * sy;
    format!(
        "q\n{} 0 0 {} {} {} cm\n/{name} Do\nQ\n",
        appearance::fmt_num(sx),
        appearance::fmt_num(sy),
        appearance::fmt_num(tx),
        appearance::fmt_num(ty)
    )
    .into_bytes()
}

/// Bounding box of `bbox` after applying `matrix`.
fn transformed_bbox(bbox: [f32; 4], m: [f32; 6]) -> [f32; 4] {
    let corners = [
        (bbox[0], bbox[1]),
        (bbox[2], bbox[1]),
        (bbox[0], bbox[3]),
        (bbox[2], bbox[3]),
    ];
    let mut out = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
    for (x, y) in corners {
        let tx = m[0] * x + m[2] * y + m[4];
        let ty = m[1] * x + m[3] * y + m[5];
        out[0] = out[0].min(tx);
        out[1] = out[1].min(ty);
        out[2] = out[2].max(tx);
        out[3] = out[3].max(ty);
    }
    out
}

/// Where a dictionary-valued entry lives.
#[derive(Clone, Copy)]
enum Slot {
    Indirect(ObjectId),
    Inline,
    Missing,
}

fn slot_of(dict: &Dictionary, key: &[u8]) -> Slot {
    match dict.get(key) {
        Ok(Object::Reference(id)) => Slot::Indirect(*id),
        Ok(_) => Slot::Inline,
        Err(_) => Slot::Missing,
    }
}

fn flatten_err(e: lopdf::Error) -> BackendError {
    BackendError::Flatten(e.to_string())
}

/// The page's `/Resources /XObject` dictionary, created if needed.
///
/// Inherited resources are copied onto the page before being extended.
fn xobject_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, BackendError> {
    let page = doc.get_dictionary(page_id).map_err(flatten_err)?;
    let resources_slot = slot_of(page, b"Resources");
    if let Slot::Missing = resources_slot {
        let inherited = inherited_resources(doc, page_id).unwrap_or_default();
        doc.get_dictionary_mut(page_id)
            .map_err(flatten_err)?
            .set("Resources", inherited);
    }

    let resources_id = match resources_slot {
        Slot::Indirect(id) => id,
        Slot::Inline | Slot::Missing => page_id,
    };
    let xobject_slot = {
        let resources = resources_dict(doc, resources_id, page_id)?;
        slot_of(resources, b"XObject")
    };

    match xobject_slot {
        Slot::Indirect(id) => doc.get_dictionary_mut(id).map_err(flatten_err),
        Slot::Inline | Slot::Missing => {
            let resources = resources_dict_mut(doc, resources_id, page_id)?;
            if let Slot::Missing = xobject_slot {
                resources.set("XObject", Dictionary::new());
            }
            resources
                .get_mut(b"XObject")
                .and_then(Object::as_dict_mut)
                .map_err(flatten_err)
        }
    }
}

fn resources_dict(
    doc: &Document,
    resources_id: ObjectId,
    page_id: ObjectId,
) -> Result<&Dictionary, BackendError> {
    let dict = doc.get_dictionary(resources_id).map_err(flatten_err)?;
    if resources_id == page_id {
        dict.get(b"Resources")
            .and_then(Object::as_dict)
            .map_err(flatten_err)
    } else {
        Ok(dict)
    }
}

fn resources_dict_mut(
    doc: &mut Document,
    resources_id: ObjectId,
    page_id: ObjectId,
) -> Result<&mut Dictionary, BackendError> {
    let dict = doc.get_dictionary_mut(resources_id).map_err(flatten_err)?;
    if resources_id == page_id {
        dict.get_mut(b"Resources")
            .and_then(Object::as_dict_mut)
            .map_err(flatten_err)
    } else {
        Ok(dict)
    }
}

/// Resources inherited from the page tree, resolved to a dictionary.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    loop {
        let parent_id = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
        if let Some(resources) = deref_entry(doc, current, b"Resources") {
            return resources.as_dict().ok().cloned();
        }
    }
}

/// Append `overlay` after the page's existing content, isolating the
/// existing content's graphics state with `q`/`Q`.
fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    overlay: Vec<u8>,
) -> Result<(), BackendError> {
    let page = doc.get_dictionary(page_id).map_err(flatten_err)?;
    let existing: Vec<Object> = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    let mut tail = Vec::new();
    if !existing.is_empty() {
        let open = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(open));
        contents.extend(existing);
        tail.extend_from_slice(b"Q\n");
    }
    tail.extend_from_slice(&overlay);
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), tail));
    contents.push(Object::Reference(overlay_id));

    doc.get_dictionary_mut(page_id)
        .map_err(flatten_err)?
        .set("Contents", contents);
    Ok(())
}
