//! lopdf-based form backend.
//!
//! Implements [`FormBackend`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate. Field enumeration converts lopdf objects into backend-independent
//! [`PdfValue`]s; fill and flatten work on the lopdf document in place.

use lopdf::{Dictionary, Object, ObjectId};
use pdfform_core::{
    ClassifyOptions, FlattenPolicy, FormEngine, ObjectRef, PdfDict, PdfFieldData, PdfValue,
    RawField, Resolve,
};
use tracing::{debug, info};

use crate::backend::FormBackend;
use crate::error::BackendError;
use crate::field_tree::{self, FieldNode};
use crate::fill::apply_fill;
use crate::flatten::flatten_form;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    /// The underlying lopdf document.
    inner: lopdf::Document,
    /// Depth bound used by fill and flatten when walking the field tree.
    max_field_depth: usize,
}

impl LopdfDocument {
    /// Wrap an already-loaded lopdf document.
    pub fn from_document(inner: lopdf::Document) -> Self {
        Self {
            inner,
            max_field_depth: ClassifyOptions::default().max_field_depth,
        }
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    /// Unwrap into the underlying lopdf document.
    pub fn into_inner(self) -> lopdf::Document {
        self.inner
    }

    /// Set the field-tree depth bound used by fill and flatten.
    pub fn set_max_field_depth(&mut self, depth: usize) {
        self.max_field_depth = depth;
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("objects", &self.inner.objects.len())
            .field("max_field_depth", &self.max_field_depth)
            .finish_non_exhaustive()
    }
}

/// The lopdf-based form backend.
///
/// # Example
///
/// ```ignore
/// use pdfform_parse::{FormBackend, LopdfBackend};
///
/// let doc = LopdfBackend::open(pdf_bytes)?;
/// let fields = LopdfBackend::form_fields(&doc, 64)?;
/// ```
pub struct LopdfBackend;

impl FormBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            return Err(BackendError::Parse(
                "encrypted documents are not supported".to_string(),
            ));
        }

        debug!(objects = inner.objects.len(), "document loaded");
        Ok(LopdfDocument::from_document(inner))
    }

    fn has_form(doc: &Self::Document) -> bool {
        field_tree::root_fields(&doc.inner).is_some()
    }

    fn form_fields(doc: &Self::Document, max_depth: usize) -> Result<Vec<RawField>, Self::Error> {
        doc.inner
            .catalog()
            .map_err(|e| BackendError::Parse(format!("failed to read catalog: {e}")))?;

        let fields: Vec<RawField> = field_tree::collect_fields(&doc.inner, max_depth)
            .iter()
            .map(|node| raw_field(&doc.inner, node))
            .collect();
        debug!(count = fields.len(), "terminal fields collected");
        Ok(fields)
    }

    fn save(doc: &mut Self::Document) -> Result<Vec<u8>, Self::Error> {
        let mut buf = Vec::new();
        doc.inner.save_to(&mut buf)?;
        Ok(buf)
    }
}

impl Resolve for LopdfDocument {
    fn resolve(&self, reference: ObjectRef) -> Option<PdfValue> {
        let id: ObjectId = (reference.number, reference.generation);
        self.inner.get_object(id).ok().map(object_to_value)
    }
}

impl FormEngine for LopdfDocument {
    type Error = BackendError;

    fn fill(&mut self, batch: &[PdfFieldData]) -> Result<(), Self::Error> {
        let applied = apply_fill(&mut self.inner, batch, self.max_field_depth)?;
        info!(requested = batch.len(), applied, "form values applied");
        Ok(())
    }

    fn flatten_fields(&mut self, policy: &FlattenPolicy) -> Result<(), Self::Error> {
        flatten_form(&mut self.inner, policy, self.max_field_depth)?;
        Ok(())
    }
}

/// Snapshot a located field as a backend-independent [`RawField`].
fn raw_field(doc: &lopdf::Document, node: &FieldNode) -> RawField {
    let dict = doc
        .get_dictionary(node.id)
        .map(dict_to_value)
        .unwrap_or_default();
    let widgets = node
        .widget_ids
        .iter()
        .filter_map(|id| doc.get_dictionary(*id).ok())
        .map(dict_to_value)
        .collect();

    RawField {
        name: node.name.clone(),
        field_type: node.field_type,
        flags: node.flags,
        dict,
        widgets,
    }
}

/// Convert a lopdf object without following references.
///
/// Stream content is decoded when the stream declares a filter; otherwise
/// the raw bytes are kept.
pub(crate) fn object_to_value(obj: &Object) -> PdfValue {
    match obj {
        Object::Null => PdfValue::Null,
        Object::Boolean(b) => PdfValue::Boolean(*b),
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(f64::from(*r)),
        Object::Name(name) => PdfValue::Name(String::from_utf8_lossy(name).into_owned()),
        Object::String(bytes, _) => PdfValue::String(bytes.clone()),
        Object::Array(items) => PdfValue::Array(items.iter().map(object_to_value).collect()),
        Object::Dictionary(dict) => PdfValue::Dictionary(dict_to_value(dict)),
        Object::Stream(stream) => {
            let content = if stream.dict.has(b"Filter") {
                stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone())
            } else {
                stream.content.clone()
            };
            PdfValue::Stream {
                dict: dict_to_value(&stream.dict),
                content,
            }
        }
        Object::Reference((number, generation)) => {
            PdfValue::Reference(ObjectRef::new(*number, *generation))
        }
    }
}

pub(crate) fn dict_to_value(dict: &Dictionary) -> PdfDict {
    dict.iter()
        .map(|(key, value)| {
            (
                String::from_utf8_lossy(key).into_owned(),
                object_to_value(value),
            )
        })
        .collect()
}
