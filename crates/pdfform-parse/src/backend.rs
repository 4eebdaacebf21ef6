//! Form backend trait.
//!
//! Defines the [`FormBackend`] trait that abstracts the PDF operations the
//! form engine needs: opening a document, enumerating terminal fields, and
//! serializing the result. Fill and flatten live on the document type via
//! [`FormEngine`]; reference lookups via [`Resolve`].

use pdfform_core::{FormEngine, FormError, RawField, Resolve};

/// Trait abstracting the document side of form processing.
///
/// # Associated Types
///
/// - `Document`: The parsed document. It resolves references for the
///   classifier and acts as the engine for the fill pipeline.
/// - `Error`: Backend-specific error type, convertible to [`FormError`].
///
/// # Usage
///
/// ```ignore
/// let doc = MyBackend::open(pdf_bytes)?;
/// if MyBackend::has_form(&doc) {
///     let fields = MyBackend::form_fields(&doc, 64)?;
/// }
/// let bytes = MyBackend::save(&mut doc)?;
/// ```
pub trait FormBackend {
    /// The parsed PDF document type.
    type Document: Resolve + FormEngine;

    /// Backend-specific error type, convertible to [`FormError`].
    type Error: std::error::Error + Into<FormError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable, unencrypted PDF.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    /// Whether the catalog carries an `/AcroForm` with a `/Fields` array.
    fn has_form(doc: &Self::Document) -> bool;

    /// Terminal fields in document order (depth-first over `/Fields`).
    ///
    /// `max_depth` bounds the `/Kids` recursion. A document without a form
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error only if the catalog itself cannot be read.
    fn form_fields(doc: &Self::Document, max_depth: usize) -> Result<Vec<RawField>, Self::Error>;

    /// Serialize the document.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn save(doc: &mut Self::Document) -> Result<Vec<u8>, Self::Error>;
}
