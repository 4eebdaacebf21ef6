//! PDF form field types for AcroForm classification.
//!
//! [`FieldType`] is the raw `/FT` tag and [`FieldFlags`] the `/Ff` bitmask a
//! backend reports; [`RawField`] bundles them with the attribute data the
//! classifier inspects. [`FormField`] and [`FormData`] are the classified
//! output, serialized in the `{"formFields": [...]}` wire shape.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::object::{PdfDict, PdfValue};

/// The type of a PDF form field.
///
/// Corresponds to the `/FT` entry in a field dictionary (PDF 1.7 Table 220).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Text field (`/FT /Tx`), accepts text input.
    Text,
    /// Button field (`/FT /Btn`): checkboxes, radio buttons, push buttons.
    Button,
    /// Choice field (`/FT /Ch`): dropdowns, list boxes.
    Choice,
    /// Signature field (`/FT /Sig`).
    Signature,
}

impl FieldType {
    /// Parse a field type from its PDF name string.
    ///
    /// Returns `None` if the string is not a recognized field type.
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "Tx" => Some(Self::Text),
            "Btn" => Some(Self::Button),
            "Ch" => Some(Self::Choice),
            "Sig" => Some(Self::Signature),
            _ => None,
        }
    }

    /// Return the PDF name string for this field type.
    pub fn as_pdf_name(&self) -> &'static str {
        match self {
            Self::Text => "Tx",
            Self::Button => "Btn",
            Self::Choice => "Ch",
            Self::Signature => "Sig",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "Text"),
            Self::Button => write!(f, "Button"),
            Self::Choice => write!(f, "Choice"),
            Self::Signature => write!(f, "Signature"),
        }
    }
}

bitflags! {
    /// Field flags from the `/Ff` entry.
    ///
    /// Per ISO 32000-1 tables 221 and 226. Bits not listed here are kept but
    /// ignored by classification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        /// Bit 1: Field is read-only
        const READ_ONLY = 1 << 0;
        /// Bit 2: Field is required
        const REQUIRED = 1 << 1;
        /// Bit 3: Field should not be exported
        const NO_EXPORT = 1 << 2;
        /// Bit 16: Button is a radio button
        const RADIO = 1 << 15;
        /// Bit 17: Button is a push button
        const PUSHBUTTON = 1 << 16;
    }
}

impl FieldFlags {
    /// Whether the required bit (value 2) is set.
    pub fn is_required(self) -> bool {
        self.contains(Self::REQUIRED)
    }

    /// The button subtype encoded by these flags.
    pub fn button_kind(self) -> ButtonKind {
        if self.contains(Self::PUSHBUTTON) {
            ButtonKind::PushButton
        } else if self.contains(Self::RADIO) {
            ButtonKind::Radio
        } else {
            ButtonKind::Checkbox
        }
    }
}

/// Subtype of a `/Btn` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Checkbox,
    Radio,
    PushButton,
}

/// A terminal form field as reported by a backend, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    /// Fully qualified name (partial names joined with `.`).
    pub name: String,
    /// Field type from `/FT`, possibly inherited.
    pub field_type: Option<FieldType>,
    /// Field flags from `/Ff`, possibly inherited.
    pub flags: FieldFlags,
    /// The field's own dictionary (`/TU`, `/AA`, `/Opt`, `/V`, ...).
    pub dict: PdfDict,
    /// Widget annotation dictionaries, in `/Kids` order.
    pub widgets: Vec<PdfDict>,
}

impl RawField {
    pub fn new(name: impl Into<String>, field_type: Option<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type,
            flags: FieldFlags::empty(),
            dict: PdfDict::new(),
            widgets: Vec::new(),
        }
    }

    pub fn with_flags(mut self, bits: u32) -> Self {
        self.flags = FieldFlags::from_bits_retain(bits);
        self
    }

    pub fn with_attribute(mut self, key: &str, value: PdfValue) -> Self {
        self.dict.set(key, value);
        self
    }

    pub fn with_widget(mut self, widget: PdfDict) -> Self {
        self.widgets.push(widget);
        self
    }

    /// Look up an entry in the field dictionary.
    pub fn attribute(&self, key: &str) -> Option<&PdfValue> {
        self.dict.get(key)
    }
}

/// Semantic type of a classified field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Date,
    Checkbox,
    Radio,
    Dropdown,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Date => "Date",
            Self::Checkbox => "Checkbox",
            Self::Radio => "Radio",
            Self::Dropdown => "Dropdown",
        }
    }

    /// Whether fields of this kind carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio | Self::Dropdown)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Fully qualified field name; unique within a [`FormData`].
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Tooltip (`/TU`) used as the display label; empty when absent.
    pub label: String,
    /// Date pattern recovered from the keystroke script. Date fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Whether the required flag is set.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_required: bool,
    /// Valid states or export values. Checkbox, radio, and dropdown only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// The classified fields of one document, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(rename = "formFields")]
    pub fields: Vec<FormField>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a field by exact name.
    pub fn get(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormField> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a FormData {
    type Item = &'a FormField;
    type IntoIter = std::slice::Iter<'a, FormField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_from_pdf_name() {
        assert_eq!(FieldType::from_pdf_name("Tx"), Some(FieldType::Text));
        assert_eq!(FieldType::from_pdf_name("Btn"), Some(FieldType::Button));
        assert_eq!(FieldType::from_pdf_name("Ch"), Some(FieldType::Choice));
        assert_eq!(FieldType::from_pdf_name("Sig"), Some(FieldType::Signature));
        assert_eq!(FieldType::from_pdf_name("Unknown"), None);
    }

    #[test]
    fn field_type_as_pdf_name() {
        assert_eq!(FieldType::Text.as_pdf_name(), "Tx");
        assert_eq!(FieldType::Button.as_pdf_name(), "Btn");
        assert_eq!(FieldType::Choice.as_pdf_name(), "Ch");
        assert_eq!(FieldType::Signature.as_pdf_name(), "Sig");
    }

    #[test]
    fn required_flag_is_bit_one_only() {
        assert!(FieldFlags::from_bits_retain(2).is_required());
        assert!(FieldFlags::from_bits_retain(3).is_required());
        assert!(!FieldFlags::from_bits_retain(0).is_required());
        assert!(!FieldFlags::from_bits_retain(1).is_required());
        assert!(!FieldFlags::from_bits_retain(4).is_required());
        assert!(!FieldFlags::from_bits_retain(1 << 15).is_required());
    }

    #[test]
    fn unknown_flag_bits_are_retained() {
        let flags = FieldFlags::from_bits_retain(1 << 25);
        assert_eq!(flags.bits(), 1 << 25);
    }

    #[test]
    fn button_kind_from_flags() {
        assert_eq!(FieldFlags::empty().button_kind(), ButtonKind::Checkbox);
        assert_eq!(FieldFlags::RADIO.button_kind(), ButtonKind::Radio);
        assert_eq!(FieldFlags::PUSHBUTTON.button_kind(), ButtonKind::PushButton);
        assert_eq!(
            (FieldFlags::RADIO | FieldFlags::PUSHBUTTON).button_kind(),
            ButtonKind::PushButton
        );
    }

    #[test]
    fn form_field_wire_shape_omits_empty_optionals() {
        let field = FormField {
            name: "FirstName".to_string(),
            kind: FieldKind::Text,
            label: String::new(),
            date_format: None,
            is_required: false,
            options: vec![],
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "FirstName", "type": "Text", "label": ""})
        );
    }

    #[test]
    fn form_field_wire_shape_full() {
        let field = FormField {
            name: "DOB_af_date".to_string(),
            kind: FieldKind::Date,
            label: "Date of birth".to_string(),
            date_format: Some("yyyy-mm-dd".to_string()),
            is_required: true,
            options: vec![],
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "DOB_af_date",
                "type": "Date",
                "label": "Date of birth",
                "dateFormat": "yyyy-mm-dd",
                "isRequired": true,
            })
        );
    }

    #[test]
    fn form_data_wire_shape() {
        let data = FormData {
            fields: vec![FormField {
                name: "Agree".to_string(),
                kind: FieldKind::Checkbox,
                label: "I agree".to_string(),
                date_format: None,
                is_required: false,
                options: vec!["Yes".to_string()],
            }],
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(
            json,
            r#"{"formFields":[{"name":"Agree","type":"Checkbox","label":"I agree","options":["Yes"]}]}"#
        );
        let back: FormData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn form_data_lookup() {
        let data = FormData {
            fields: vec![FormField {
                name: "A".to_string(),
                kind: FieldKind::Text,
                label: String::new(),
                date_format: None,
                is_required: false,
                options: vec![],
            }],
        };
        assert!(data.get("A").is_some());
        assert!(data.get("a").is_none());
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn raw_field_builder() {
        let raw = RawField::new("Name", Some(FieldType::Text))
            .with_flags(2)
            .with_attribute("TU", PdfValue::text("Your name"));
        assert!(raw.flags.is_required());
        assert_eq!(
            raw.attribute("TU").and_then(|v| v.as_text()),
            Some("Your name".to_string())
        );
    }
}
