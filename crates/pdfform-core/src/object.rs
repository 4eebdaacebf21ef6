//! Backend-neutral view of PDF objects.
//!
//! The classification engine never touches a PDF library directly. Backends
//! convert the attribute dictionaries they expose into [`PdfValue`] trees and
//! implement [`Resolve`] so the engine can follow indirect references on
//! demand (e.g. an `/AA /K` action stored as a separate object).

use std::collections::BTreeMap;

/// An indirect object reference (`N G R`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    /// Object number.
    pub number: u32,
    /// Generation number.
    pub generation: u16,
}

impl ObjectRef {
    /// Create a reference from object and generation numbers.
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// A PDF object value.
///
/// References are kept as [`PdfValue::Reference`]; conversion from a backend
/// never follows them, so a `PdfValue` tree is always finite.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    /// The `null` object.
    Null,
    /// A boolean.
    Boolean(bool),
    /// An integer number.
    Integer(i64),
    /// A real number.
    Real(f64),
    /// A string, still in its raw encoded bytes.
    String(Vec<u8>),
    /// A name, without the leading slash.
    Name(String),
    /// An array.
    Array(Vec<PdfValue>),
    /// A dictionary.
    Dictionary(PdfDict),
    /// A stream: its dictionary and (decoded when possible) content.
    Stream {
        /// The stream dictionary.
        dict: PdfDict,
        /// Stream content bytes.
        content: Vec<u8>,
    },
    /// An indirect reference.
    Reference(ObjectRef),
}

impl PdfValue {
    /// Build a string value from UTF-8 text.
    pub fn text(s: impl Into<String>) -> Self {
        Self::String(s.into().into_bytes())
    }

    /// Build a name value.
    pub fn name(s: impl Into<String>) -> Self {
        Self::Name(s.into())
    }

    /// The dictionary of a dictionary or stream value.
    pub fn as_dict(&self) -> Option<&PdfDict> {
        match self {
            Self::Dictionary(dict) | Self::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// The elements of an array value.
    pub fn as_array(&self) -> Option<&[PdfValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// A numeric value as `f64` (integers are widened).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// The name, if this is a name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Decode a string value as a PDF text string.
    ///
    /// Returns `None` for anything that is not a string.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(bytes) => Some(decode_text(bytes)),
            _ => None,
        }
    }

    /// Returns the reference if this value is indirect.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Self::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Short type label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Name(_) => "name",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
            Self::Stream { .. } => "stream",
            Self::Reference(_) => "reference",
        }
    }
}

/// An ordered PDF dictionary. Key order follows the source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDict {
    entries: Vec<(String, PdfValue)>,
}

impl PdfDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&PdfValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace a key, keeping the original position on replace.
    pub fn set(&mut self, key: impl Into<String>, value: PdfValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: PdfValue) -> Self {
        self.set(key, value);
        self
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PdfValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, PdfValue)> for PdfDict {
    fn from_iter<I: IntoIterator<Item = (String, PdfValue)>>(iter: I) -> Self {
        let mut dict = PdfDict::new();
        for (k, v) in iter {
            dict.set(k, v);
        }
        dict
    }
}

/// Follows indirect references into the owning document.
pub trait Resolve {
    /// Fetch the object a reference points to, or `None` if it is missing.
    fn resolve(&self, reference: ObjectRef) -> Option<PdfValue>;

    /// Resolve `value` if it is a reference, otherwise return it as is.
    ///
    /// Chains of references are followed up to a fixed depth.
    fn deref(&self, value: &PdfValue) -> Option<PdfValue> {
        let mut current = value.clone();
        for _ in 0..MAX_REFERENCE_CHAIN {
            match current {
                PdfValue::Reference(r) => current = self.resolve(r)?,
                other => return Some(other),
            }
        }
        None
    }
}

const MAX_REFERENCE_CHAIN: usize = 16;

/// In-memory object store, useful for documents assembled by hand.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: BTreeMap<ObjectRef, PdfValue>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object, returning its reference.
    pub fn insert(&mut self, reference: ObjectRef, value: PdfValue) -> ObjectRef {
        self.objects.insert(reference, value);
        reference
    }

    /// Store an object under the next free object number (generation 0).
    pub fn add(&mut self, value: PdfValue) -> ObjectRef {
        let next = self.objects.keys().map(|r| r.number).max().unwrap_or(0) + 1;
        self.insert(ObjectRef::new(next, 0), value)
    }
}

impl Resolve for ObjectTable {
    fn resolve(&self, reference: ObjectRef) -> Option<PdfValue> {
        self.objects.get(&reference).cloned()
    }
}

/// Decode a PDF text string, handling the UTF-16 BE BOM and Latin-1.
pub fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Encode text as a PDF text string.
///
/// ASCII text is stored as-is; anything else becomes UTF-16 BE with a BOM.
pub fn encode_text(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        return text.as_bytes().to_vec();
    }
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}
