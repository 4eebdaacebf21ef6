//! pdfform-core: Backend-independent form-field engine.
//!
//! This crate provides the form metadata types ([`FormField`], [`FormData`],
//! overlay collections, rendering rules) and the algorithms that produce
//! them: field classification, date-format extraction, option discovery,
//! and fill planning. PDF access goes through the [`Resolve`] and
//! [`FormEngine`] seams, implemented by backends such as `pdfform-parse`.

pub mod classify;
pub mod date_format;
pub mod error;
pub mod fill;
pub mod form_field;
pub mod object;
pub mod options;
pub mod overlay;
pub mod rendering_rules;

pub use classify::{FieldRoute, classify_fields, route_field};
pub use date_format::{DATE_KEYSTROKE_MARKER, extract_date_format};
pub use error::{ClassifyOptions, ClassifyResult, FormError, FormWarning, FormWarningCode};
pub use fill::{
    FillPlan, FillReport, FillState, FlattenPolicy, FormEngine, PdfFieldData,
    SIGNATURE_FILL_PREFIX, encode_batch, plan_fill, run_fill,
};
pub use form_field::{ButtonKind, FieldFlags, FieldKind, FieldType, FormData, FormField, RawField};
pub use object::{ObjectRef, ObjectTable, PdfDict, PdfValue, Resolve, decode_text, encode_text};
pub use options::{OFF_STATE, appearance_states, export_values};
pub use overlay::{
    Coordinate, ESignField, ESignFormData, ImageField, ImageFormData, ImagePlacement,
    PagePlacement,
};
pub use rendering_rules::{CombinedFormMetadata, Condition, FieldRenderingRules, Rule};
