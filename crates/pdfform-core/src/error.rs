//! Error and warning types for pdfform.
//!
//! Provides [`FormError`] for fatal errors that abort a fill or open,
//! [`FormWarning`] for per-field issues that classification recovers from,
//! [`ClassifyResult`] for pairing a value with collected warnings, and
//! [`ClassifyOptions`] for configuring the classifier.

use std::collections::BTreeSet;
use std::fmt;

/// Fatal error types for form processing.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// Error parsing PDF structure or syntax.
    ParseError(String),
    /// I/O error reading or writing PDF data.
    IoError(String),
    /// The document engine rejected the fill batch.
    FillError(String),
    /// The document engine could not flatten the form.
    FlattenError(String),
    /// The fill batch could not be encoded.
    SerializationError(String),
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::ParseError(msg) => write!(f, "parse error: {msg}"),
            FormError::IoError(msg) => write!(f, "I/O error: {msg}"),
            FormError::FillError(msg) => write!(f, "fill error: {msg}"),
            FormError::FlattenError(msg) => write!(f, "flatten error: {msg}"),
            FormError::SerializationError(msg) => write!(f, "serialization error: {msg}"),
            FormError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FormError {}

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        FormError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::SerializationError(err.to_string())
    }
}

/// Machine-readable code for a degraded field extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormWarningCode {
    /// `/TU` is present but is not a string.
    MalformedTooltip,
    /// The `/AA /K` action chain exists but does not lead to a `/JS` script.
    MalformedAction,
    /// A keystroke script was found but carries no date format marker.
    MissingDateFormat,
    /// An `/Opt` entry is not an `[export, display]` pair.
    MalformedOption,
    /// A widget's appearance dictionary has an unexpected shape.
    MalformedAppearance,
}

impl FormWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormWarningCode::MalformedTooltip => "MALFORMED_TOOLTIP",
            FormWarningCode::MalformedAction => "MALFORMED_ACTION",
            FormWarningCode::MissingDateFormat => "MISSING_DATE_FORMAT",
            FormWarningCode::MalformedOption => "MALFORMED_OPTION",
            FormWarningCode::MalformedAppearance => "MALFORMED_APPEARANCE",
        }
    }
}

impl fmt::Display for FormWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue found while classifying one field.
///
/// The affected field is still classified; only the auxiliary value
/// (label, date format, options) falls back to its default.
#[derive(Debug, Clone, PartialEq)]
pub struct FormWarning {
    /// Machine-readable warning code.
    pub code: FormWarningCode,
    /// Full name of the field the warning belongs to.
    pub field: String,
    /// Human-readable description.
    pub description: String,
}

impl FormWarning {
    pub fn new(
        code: FormWarningCode,
        field: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code,
            field: field.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for FormWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (field {})", self.code, self.description, self.field)
    }
}

/// Result wrapper that pairs a value with collected warnings.
#[derive(Debug, Clone)]
pub struct ClassifyResult<T> {
    /// The classified value.
    pub value: T,
    /// Warnings collected during classification.
    pub warnings: Vec<FormWarning>,
}

impl<T> ClassifyResult<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<FormWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of distinct fields whose auxiliary data was degraded.
    pub fn degraded_fields(&self) -> usize {
        self.warnings
            .iter()
            .map(|w| w.field.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ClassifyResult<U> {
        ClassifyResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Options controlling field classification.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Lower-case name prefixes of signature/date overlay fields (default: `esign_`).
    pub signature_prefixes: Vec<String>,
    /// Lower-case name prefixes of image overlay fields (default: `image_`).
    pub image_prefixes: Vec<String>,
    /// Lower-case substring marking the rendering-rule field (default: `field_rendering_rules`).
    pub rendering_rules_marker: String,
    /// Lower-case substring that turns a text field into a date field (default: `_af_date`).
    pub date_field_marker: String,
    /// Maximum depth of the `/Kids` field hierarchy walked by backends (default: 64).
    pub max_field_depth: usize,
    /// Whether to collect warnings (default: true).
    pub collect_warnings: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            signature_prefixes: vec!["esign_".to_string()],
            image_prefixes: vec!["image_".to_string()],
            rendering_rules_marker: "field_rendering_rules".to_string(),
            date_field_marker: "_af_date".to_string(),
            max_field_depth: 64,
            collect_warnings: true,
        }
    }
}
