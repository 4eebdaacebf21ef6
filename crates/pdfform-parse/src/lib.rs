//! pdfform-parse: lopdf backend for the form engine.
//!
//! This crate walks the AcroForm field tree of a parsed document, applies
//! fill batches, and flattens widgets into page content. It depends on
//! pdfform-core for shared data types and the classifier's [`Resolve`] and
//! [`FormEngine`] seams.
//!
//! [`Resolve`]: pdfform_core::Resolve
//! [`FormEngine`]: pdfform_core::FormEngine

mod appearance;
pub mod backend;
pub mod error;
mod field_tree;
mod fill;
mod flatten;
pub mod lopdf_backend;

#[cfg(test)]
mod test_fixtures;

pub use backend::FormBackend;
pub use error::BackendError;
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use pdfform_core;
