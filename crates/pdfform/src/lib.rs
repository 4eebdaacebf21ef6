//! pdfform: Classify, fill, and flatten PDF form fields.
//!
//! This is the public API facade crate for pdfform. It re-exports types from
//! pdfform-core and uses pdfform-parse for reading and rewriting documents.
//!
//! # Architecture
//!
//! - **pdfform-core**: Backend-independent classification, overlay metadata, and fill planning
//! - **pdfform-parse**: lopdf field-tree walk, fill primitive, and flatten primitive
//! - **pdfform** (this crate): Public API that ties everything together

mod document;

pub use document::{FlattenedDocument, FormDocument};
pub use pdfform_core::{
    ClassifyOptions, ClassifyResult, CombinedFormMetadata, Condition, Coordinate, ESignField,
    ESignFormData, FieldKind, FieldRenderingRules, FillReport, FillState, FlattenPolicy, FormData,
    FormError, FormField, FormWarning, FormWarningCode, ImageField, ImageFormData, ImagePlacement,
    PagePlacement, PdfFieldData, Rule, encode_batch, plan_fill,
};
pub use pdfform_core;
pub use pdfform_parse;
