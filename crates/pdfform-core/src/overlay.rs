//! Identifier-keyed overlay metadata.
//!
//! Callers place signature, date, and image blocks one at a time, keyed by
//! an external identifier (typically a signer). Each `add_*` call upserts:
//! the first call for an identifier appends a new entry, later calls append
//! a new placement to that entry. Entries keep first-insertion order.

use serde::{Deserialize, Serialize};

/// Integer rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Lower-left x.
    pub llx: i32,
    /// Lower-left y.
    pub lly: i32,
    /// Upper-right x.
    pub urx: i32,
    /// Upper-right y.
    pub ury: i32,
}

impl Coordinate {
    pub fn new(llx: i32, lly: i32, urx: i32, ury: i32) -> Self {
        Self { llx, lly, urx, ury }
    }

    pub fn width(&self) -> i32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> i32 {
        self.ury - self.lly
    }
}

/// One page placement holding a list of rectangles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePlacement {
    /// 1-based page number.
    pub page: u32,
    pub coordinates: Vec<Coordinate>,
}

impl PagePlacement {
    pub fn single(page: u32, coordinate: Coordinate) -> Self {
        Self {
            page,
            coordinates: vec![coordinate],
        }
    }
}

/// Signature and date placements for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ESignField {
    pub identifier: String,
    #[serde(default)]
    pub signature_positions: Vec<PagePlacement>,
    #[serde(default)]
    pub date_positions: Vec<PagePlacement>,
}

/// Signature/date overlay collection: `{"eSignFields": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ESignFormData {
    #[serde(rename = "eSignFields")]
    pub e_sign_fields: Vec<ESignField>,
}

impl ESignFormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signature block for `identifier` on `page`.
    pub fn add_signature_position(&mut self, identifier: &str, page: u32, coordinate: Coordinate) {
        let entry = upsert(&mut self.e_sign_fields, identifier, |id| ESignField {
            identifier: id.to_string(),
            signature_positions: Vec::new(),
            date_positions: Vec::new(),
        });
        entry
            .signature_positions
            .push(PagePlacement::single(page, coordinate));
    }

    /// Record a date-stamp block for `identifier` on `page`.
    pub fn add_date_position(&mut self, identifier: &str, page: u32, coordinate: Coordinate) {
        let entry = upsert(&mut self.e_sign_fields, identifier, |id| ESignField {
            identifier: id.to_string(),
            signature_positions: Vec::new(),
            date_positions: Vec::new(),
        });
        entry.date_positions.push(PagePlacement::single(page, coordinate));
    }

    pub fn get(&self, identifier: &str) -> Option<&ESignField> {
        self.e_sign_fields.iter().find(|f| f.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.e_sign_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.e_sign_fields.is_empty()
    }
}

/// One image placement. Unlike signatures, an image sits in exactly one rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// 1-based page number.
    pub page: u32,
    pub coordinates: Coordinate,
}

/// Image placements for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageField {
    pub identifier: String,
    #[serde(default)]
    pub image_data: Vec<ImagePlacement>,
}

/// Image overlay collection: `{"imageFields": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFormData {
    pub image_fields: Vec<ImageField>,
}

impl ImageFormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an image block for `identifier` on `page`.
    pub fn add_image_field(&mut self, identifier: &str, page: u32, coordinate: Coordinate) {
        let entry = upsert(&mut self.image_fields, identifier, |id| ImageField {
            identifier: id.to_string(),
            image_data: Vec::new(),
        });
        entry.image_data.push(ImagePlacement {
            page,
            coordinates: coordinate,
        });
    }

    pub fn get(&self, identifier: &str) -> Option<&ImageField> {
        self.image_fields.iter().find(|f| f.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.image_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_fields.is_empty()
    }
}

trait Identified {
    fn identifier(&self) -> &str;
}

impl Identified for ESignField {
    fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Identified for ImageField {
    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Find the entry for `identifier`, appending a fresh one if there is none.
///
/// Linear scan: collections hold one entry per signer, not per page.
fn upsert<'a, T: Identified>(
    entries: &'a mut Vec<T>,
    identifier: &str,
    create: impl FnOnce(&str) -> T,
) -> &'a mut T {
    let index = match entries.iter().position(|e| e.identifier() == identifier) {
        Some(index) => index,
        None => {
            entries.push(create(identifier));
            entries.len() - 1
        }
    };
    &mut entries[index]
}
