//! Shared lopdf form builders for the facade integration tests.

#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Builds a one-page AcroForm document field by field.
pub struct FormBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_id: ObjectId,
    font_id: ObjectId,
    fields: Vec<Object>,
    annots: Vec<Object>,
    top: i64,
}

impl FormBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        Self {
            doc,
            pages_id,
            page_id,
            font_id,
            fields: Vec::new(),
            annots: Vec::new(),
            top: 760,
        }
    }

    fn next_rect(&mut self, width: i64, height: i64) -> Object {
        let top = self.top;
        self.top -= height + 20;
        Object::Array(vec![
            72.into(),
            (top - height).into(),
            (72 + width).into(),
            top.into(),
        ])
    }

    fn widget(&mut self, mut dict: Dictionary, width: i64, height: i64) -> ObjectId {
        let rect = self.next_rect(width, height);
        dict.set("Type", "Annot");
        dict.set("Subtype", "Widget");
        dict.set("P", self.page_id);
        dict.set("Rect", rect);
        let id = self.doc.add_object(dict);
        self.annots.push(Object::Reference(id));
        id
    }

    fn add_merged(&mut self, dict: Dictionary, width: i64, height: i64) {
        let id = self.widget(dict, width, height);
        self.fields.push(Object::Reference(id));
    }

    fn button_states(&mut self, on: &str) -> Dictionary {
        let bbox = || vec![0.into(), 0.into(), 20.into(), 20.into()];
        let mut stream = |content: &[u8]| {
            self.doc.add_object(Stream::new(
                dictionary! { "Type" => "XObject", "Subtype" => "Form", "BBox" => bbox() },
                content.to_vec(),
            ))
        };
        let on_n = stream(b"0 0 1 rg 2 2 16 16 re f");
        let off_n = stream(b"");
        let on_d = stream(b"0.5 g 2 2 16 16 re f");
        let off_d = stream(b"0.75 g 0 0 20 20 re f");
        let mut normal = Dictionary::new();
        normal.set(on, on_n);
        normal.set("Off", off_n);
        let mut down = Dictionary::new();
        down.set(on, on_d);
        down.set("Off", off_d);
        dictionary! { "N" => normal, "D" => down }
    }

    pub fn text(mut self, name: &str, flags: i64) -> Self {
        let dict = dictionary! {
            "T" => Object::string_literal(name),
            "FT" => "Tx",
            "Ff" => flags,
            "DA" => Object::string_literal("/Helv 10 Tf 0 g"),
        };
        self.add_merged(dict, 200, 20);
        self
    }

    pub fn text_with_tooltip(mut self, name: &str, tooltip: &str) -> Self {
        let dict = dictionary! {
            "T" => Object::string_literal(name),
            "FT" => "Tx",
            "TU" => Object::string_literal(tooltip),
        };
        self.add_merged(dict, 200, 20);
        self
    }

    /// A text field whose keystroke action is an indirect `/K` dictionary.
    pub fn date(mut self, name: &str, script: &str, flags: i64) -> Self {
        let k = self.doc.add_object(dictionary! {
            "S" => "JavaScript",
            "JS" => Object::string_literal(script),
        });
        let dict = dictionary! {
            "T" => Object::string_literal(name),
            "FT" => "Tx",
            "Ff" => flags,
            "AA" => dictionary! { "K" => k },
        };
        self.add_merged(dict, 120, 20);
        self
    }

    /// A text field carrying `value` in `/V`.
    pub fn valued(mut self, name: &str, value: &str) -> Self {
        let dict = dictionary! {
            "T" => Object::string_literal(name),
            "FT" => "Tx",
            "V" => Object::string_literal(value),
        };
        self.add_merged(dict, 200, 20);
        self
    }

    pub fn checkbox(mut self, name: &str, on: &str) -> Self {
        let ap = self.button_states(on);
        let dict = dictionary! {
            "T" => Object::string_literal(name),
            "FT" => "Btn",
            "AS" => "Off",
            "AP" => ap,
        };
        self.add_merged(dict, 20, 20);
        self
    }

    pub fn radio(mut self, name: &str, states: &[&str]) -> Self {
        let parent_id = self.doc.new_object_id();
        let mut kids = Vec::new();
        for state in states {
            let ap = self.button_states(state);
            let widget = dictionary! { "Parent" => parent_id, "AS" => "Off", "AP" => ap };
            kids.push(Object::Reference(self.widget(widget, 20, 20)));
        }
        self.doc.objects.insert(
            parent_id,
            Object::Dictionary(dictionary! {
                "T" => Object::string_literal(name),
                "FT" => "Btn",
                "Ff" => 1 << 15,
                "Kids" => kids,
            }),
        );
        self.fields.push(Object::Reference(parent_id));
        self
    }

    pub fn dropdown(mut self, name: &str, options: &[(&str, &str)]) -> Self {
        let opt: Vec<Object> = options
            .iter()
            .map(|(export, label)| {
                Object::Array(vec![
                    Object::string_literal(*export),
                    Object::string_literal(*label),
                ])
            })
            .collect();
        let dict = dictionary! {
            "T" => Object::string_literal(name),
            "FT" => "Ch",
            "Ff" => 1 << 17,
            "Opt" => opt,
            "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        };
        self.add_merged(dict, 150, 20);
        self
    }

    pub fn push_button(mut self, name: &str) -> Self {
        let dict = dictionary! {
            "T" => Object::string_literal(name),
            "FT" => "Btn",
            "Ff" => 1 << 16,
        };
        self.add_merged(dict, 80, 20);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let content_id = self.doc.add_object(Stream::new(
            dictionary! {},
            b"BT /F1 12 Tf 72 780 Td (Application) Tj ET".to_vec(),
        ));
        self.doc.objects.insert(
            self.page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => self.font_id },
                },
                "Annots" => self.annots,
            }),
        );
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(self.page_id)],
                "Count" => 1,
            }),
        );
        let acroform_id = self.doc.add_object(dictionary! {
            "Fields" => self.fields,
            "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
            "DR" => dictionary! {
                "Font" => dictionary! { "Helv" => self.font_id },
            },
        });
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
            "AcroForm" => acroform_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).unwrap();
        buf
    }
}

/// A one-page document without a form.
pub fn plain_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Page content of the first page of `bytes`, concatenated.
pub fn page_content(bytes: &[u8]) -> String {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}
