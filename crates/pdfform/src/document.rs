use std::collections::BTreeMap;
use std::path::Path;

use pdfform_core::{
    ClassifyOptions, ClassifyResult, CombinedFormMetadata, FieldRenderingRules, FillReport,
    FlattenPolicy, FormData, FormError, RawField, Resolve, classify_fields, encode_batch,
    plan_fill, run_fill,
};
use pdfform_parse::{FormBackend, LopdfBackend, LopdfDocument};
use tracing::{debug, info, warn};

/// An interactive PDF form, opened for classification or filling.
///
/// Filling consumes the document and yields a [`FlattenedDocument`], the
/// only state that can be saved. A failed fill drops the document, so a
/// half-processed form is never written out.
///
/// # Example
///
/// ```ignore
/// use pdfform::FormDocument;
///
/// let form = FormDocument::open_file("application.pdf")?;
/// for field in form.classify()?.value.iter() {
///     println!("{} ({})", field.name, field.kind.as_str());
/// }
/// ```
pub struct FormDocument {
    doc: LopdfDocument,
    options: ClassifyOptions,
}

impl FormDocument {
    /// Open a PDF document from bytes with default [`ClassifyOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ParseError`] if the bytes are not a readable,
    /// unencrypted PDF.
    pub fn open(bytes: &[u8]) -> Result<Self, FormError> {
        Self::open_with_options(bytes, ClassifyOptions::default())
    }

    /// Open a PDF document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ParseError`] if the bytes are not a readable,
    /// unencrypted PDF.
    pub fn open_with_options(bytes: &[u8], options: ClassifyOptions) -> Result<Self, FormError> {
        let mut doc = LopdfBackend::open(bytes).map_err(FormError::from)?;
        doc.set_max_field_depth(options.max_field_depth);
        Ok(Self { doc, options })
    }

    /// Open a PDF document from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::IoError`] if the file cannot be read, or
    /// [`FormError::ParseError`] if it is not a valid PDF.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::open(&bytes)
    }

    /// The options classification runs with.
    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    /// Whether the document has an interactive form.
    pub fn has_form(&self) -> bool {
        LopdfBackend::has_form(&self.doc)
    }

    /// Terminal fields as the backend reports them, before classification.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ParseError`] if the catalog cannot be read.
    pub fn raw_fields(&self) -> Result<Vec<RawField>, FormError> {
        LopdfBackend::form_fields(&self.doc, self.options.max_field_depth).map_err(FormError::from)
    }

    /// Classify the document's fields.
    ///
    /// A document without a form yields empty [`FormData`]. Degraded
    /// auxiliary data is reported in the result's warnings and logged.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ParseError`] if the catalog cannot be read.
    pub fn classify(&self) -> Result<ClassifyResult<FormData>, FormError> {
        if !self.has_form() {
            debug!("document has no interactive form");
            return Ok(ClassifyResult::ok(FormData::new()));
        }

        let fields = self.raw_fields()?;
        let result = classify_fields(&fields, &self.doc, &self.options);
        for warning in &result.warnings {
            warn!(
                code = warning.code.as_str(),
                field = %warning.field,
                "{}",
                warning.description
            );
        }
        debug!(
            raw = fields.len(),
            classified = result.value.len(),
            degraded = result.degraded_fields(),
            "fields classified"
        );
        Ok(result)
    }

    /// Rendering rules carried by the form's rule field.
    ///
    /// The rule JSON lives in the `/V` of the first field whose lower-cased
    /// name contains the rendering-rule marker. A missing field yields empty
    /// rules; a malformed payload is logged and also yields empty rules.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ParseError`] if the catalog cannot be read.
    pub fn rendering_rules(&self) -> Result<FieldRenderingRules, FormError> {
        if !self.has_form() {
            return Ok(FieldRenderingRules::default());
        }
        let marker = self.options.rendering_rules_marker.as_str();
        let fields = self.raw_fields()?;
        let Some(field) = fields
            .iter()
            .find(|f| f.name.to_lowercase().contains(marker))
        else {
            return Ok(FieldRenderingRules::default());
        };

        let payload = field
            .attribute("V")
            .and_then(|v| self.doc.deref(v))
            .and_then(|v| v.as_text());
        let Some(payload) = payload else {
            warn!(field = %field.name, "rendering rule field has no string value");
            return Ok(FieldRenderingRules::default());
        };
        if payload.trim().is_empty() {
            return Ok(FieldRenderingRules::default());
        }

        match FieldRenderingRules::from_json(&payload) {
            Ok(rules) => {
                debug!(field = %field.name, conditions = rules.conditions.len(), "rendering rules read");
                Ok(rules)
            }
            Err(e) => {
                warn!(field = %field.name, error = %e, "malformed rendering rules ignored");
                Ok(FieldRenderingRules::default())
            }
        }
    }

    /// Classified fields and rendering rules in one container.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ParseError`] if the catalog cannot be read.
    pub fn combined_metadata(&self) -> Result<CombinedFormMetadata, FormError> {
        Ok(CombinedFormMetadata::new(
            self.classify()?.value,
            self.rendering_rules()?,
        ))
    }

    /// Fill every value, then flatten the whole form.
    ///
    /// Every entry is filled, including empty values. See
    /// [`fill_with_policy`](Self::fill_with_policy).
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FillError`] or [`FormError::FlattenError`] if the
    /// engine fails; the document is dropped in that case.
    pub fn fill(self, values: &BTreeMap<String, String>) -> Result<FlattenedDocument, FormError> {
        self.fill_with_policy(values, &FlattenPolicy::default())
    }

    /// Fill every value, then flatten the whole form with `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::SerializationError`] if the batch cannot be
    /// encoded, or the engine's fill or flatten error.
    pub fn fill_with_policy(
        self,
        values: &BTreeMap<String, String>,
        policy: &FlattenPolicy,
    ) -> Result<FlattenedDocument, FormError> {
        let batch = encode_batch(&plan_fill(values).batch)?;
        debug!(%batch, "fill batch");

        let mut doc = self.doc;
        let report = run_fill(&mut doc, values, policy)?;
        info!(
            filled = report.filled,
            candidates = report.flatten_candidates.len(),
            "form filled and flattened"
        );
        Ok(FlattenedDocument { doc, report })
    }
}

impl std::fmt::Debug for FormDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDocument")
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// A filled and flattened document, ready to be saved.
#[derive(Debug)]
pub struct FlattenedDocument {
    doc: LopdfDocument,
    report: FillReport,
}

impl FlattenedDocument {
    /// What the fill pass did.
    pub fn report(&self) -> &FillReport {
        &self.report
    }

    /// Serialize the document.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::IoError`] if writing fails.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, FormError> {
        LopdfBackend::save(&mut self.doc).map_err(FormError::from)
    }

    /// Write the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::IoError`] if serializing or writing fails.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), FormError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(path = %path.as_ref().display(), "flattened document saved");
        Ok(())
    }
}
