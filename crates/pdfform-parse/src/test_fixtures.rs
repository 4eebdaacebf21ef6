//! lopdf-built form documents shared by the backend's unit tests.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Description of one top-level field in a fixture document.
#[derive(Debug, Clone)]
pub(crate) struct FixtureField {
    name: String,
    kind: FixtureKind,
    flags: i64,
    tooltip: Option<String>,
    value: Option<Object>,
    keystroke: Option<String>,
    with_appearance: bool,
}

#[derive(Debug, Clone)]
enum FixtureKind {
    Text,
    Checkbox(String),
    Radio(Vec<String>),
    Dropdown(Vec<(String, String)>),
    PushButton,
    Signature,
}

impl FixtureField {
    fn new(name: &str, kind: FixtureKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            flags: 0,
            tooltip: None,
            value: None,
            keystroke: None,
            with_appearance: true,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FixtureKind::Text)
    }

    pub fn checkbox(name: &str, on_state: &str) -> Self {
        Self::new(name, FixtureKind::Checkbox(on_state.to_string()))
    }

    pub fn radio(name: &str, states: &[&str]) -> Self {
        let mut field = Self::new(
            name,
            FixtureKind::Radio(states.iter().map(|s| s.to_string()).collect()),
        );
        field.flags = 1 << 15;
        field
    }

    pub fn dropdown(name: &str, options: &[(&str, &str)]) -> Self {
        let mut field = Self::new(
            name,
            FixtureKind::Dropdown(
                options
                    .iter()
                    .map(|(e, d)| (e.to_string(), d.to_string()))
                    .collect(),
            ),
        );
        field.flags = 1 << 17;
        field
    }

    pub fn push_button(name: &str) -> Self {
        let mut field = Self::new(name, FixtureKind::PushButton);
        field.flags = 1 << 16;
        field
    }

    pub fn signature(name: &str) -> Self {
        Self::new(name, FixtureKind::Signature)
    }

    pub fn flags(mut self, flags: i64) -> Self {
        self.flags |= flags;
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }

    pub fn value(mut self, value: Object) -> Self {
        self.value = Some(value);
        self
    }

    pub fn keystroke(mut self, script: &str) -> Self {
        self.keystroke = Some(script.to_string());
        self
    }

    pub fn without_appearance(mut self) -> Self {
        self.with_appearance = false;
        self
    }
}

/// A one-page document with the given fields laid out top to bottom.
pub(crate) fn build_form_document(fields: &[FixtureField]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let page_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut field_refs = Vec::new();
    let mut annots = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let top = 760 - (index as i64) * 40;
        let (field_id, widgets) = add_field(&mut doc, field, page_id, top);
        field_refs.push(Object::Reference(field_id));
        annots.extend(widgets.into_iter().map(Object::Reference));
    }

    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        b"BT /F1 12 Tf 72 780 Td (Form) Tj ET".to_vec(),
    ));
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Annots" => annots,
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let acroform_id = doc.add_object(dictionary! {
        "Fields" => field_refs,
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "DR" => dictionary! {
            "Font" => dictionary! { "Helv" => font_id },
        },
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acroform_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// A one-page document without an interactive form.
pub(crate) fn build_plain_document() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
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
    doc
}

/// Replace the form's `/Fields` array.
pub(crate) fn set_root_fields(doc: &mut Document, fields: Vec<Object>) {
    let acroform_id = doc
        .catalog()
        .and_then(|c| c.get(b"AcroForm"))
        .and_then(|a| a.as_reference())
        .expect("fixture has an indirect AcroForm");
    doc.get_dictionary_mut(acroform_id)
        .expect("AcroForm dictionary")
        .set("Fields", fields);
}

/// Serialize a fixture document.
pub(crate) fn to_bytes(doc: &mut Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// The single page of a fixture document.
pub(crate) fn first_page(doc: &Document) -> ObjectId {
    *doc.get_pages().values().next().expect("fixture has a page")
}

fn rect(top: i64, width: i64, height: i64) -> Object {
    Object::Array(vec![
        72.into(),
        (top - height).into(),
        (72 + width).into(),
        top.into(),
    ])
}

fn state_stream(doc: &mut Document, content: &[u8]) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 20.into(), 20.into()],
        },
        content.to_vec(),
    ))
}

fn button_appearance(doc: &mut Document, on_state: &str) -> Dictionary {
    let on_n = state_stream(doc, b"0 0 1 rg 2 2 16 16 re f");
    let off_n = state_stream(doc, b"");
    let on_d = state_stream(doc, b"0.5 g 2 2 16 16 re f");
    let off_d = state_stream(doc, b"0.75 g 0 0 20 20 re f");
    let mut normal = Dictionary::new();
    normal.set(on_state, on_n);
    normal.set("Off", off_n);
    let mut down = Dictionary::new();
    down.set(on_state, on_d);
    down.set("Off", off_d);
    dictionary! { "N" => normal, "D" => down }
}

fn add_field(
    doc: &mut Document,
    field: &FixtureField,
    page_id: ObjectId,
    top: i64,
) -> (ObjectId, Vec<ObjectId>) {
    let mut dict = dictionary! {
        "T" => Object::string_literal(field.name.as_str()),
    };
    if field.flags != 0 {
        dict.set("Ff", field.flags);
    }
    if let Some(tooltip) = &field.tooltip {
        dict.set("TU", Object::string_literal(tooltip.as_str()));
    }
    if let Some(value) = &field.value {
        dict.set("V", value.clone());
    }
    if let Some(script) = &field.keystroke {
        dict.set(
            "AA",
            dictionary! {
                "K" => dictionary! {
                    "S" => "JavaScript",
                    "JS" => Object::string_literal(script.as_str()),
                },
            },
        );
    }

    let widget_base = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "P" => page_id,
    };

    match &field.kind {
        FixtureKind::Radio(states) => {
            dict.set("FT", "Btn");
            let parent_id = doc.new_object_id();
            let mut widgets = Vec::new();
            for (i, state) in states.iter().enumerate() {
                let mut widget = widget_base.clone();
                widget.set("Parent", parent_id);
                widget.set(
                    "Rect",
                    Object::Array(vec![
                        (72 + 30 * i as i64).into(),
                        (top - 20).into(),
                        (92 + 30 * i as i64).into(),
                        top.into(),
                    ]),
                );
                widget.set("AS", "Off");
                if field.with_appearance {
                    let ap = button_appearance(doc, state);
                    widget.set("AP", ap);
                }
                widgets.push(doc.add_object(widget));
            }
            dict.set(
                "Kids",
                widgets.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            );
            doc.objects.insert(parent_id, Object::Dictionary(dict));
            (parent_id, widgets)
        }
        kind => {
            for (key, value) in widget_base.iter() {
                dict.set(key.clone(), value.clone());
            }
            match kind {
                FixtureKind::Text => {
                    dict.set("FT", "Tx");
                    dict.set("Rect", rect(top, 200, 20));
                    dict.set("DA", Object::string_literal("/Helv 10 Tf 0 g"));
                }
                FixtureKind::Checkbox(on_state) => {
                    dict.set("FT", "Btn");
                    dict.set("Rect", rect(top, 20, 20));
                    dict.set("AS", "Off");
                    if field.with_appearance {
                        let ap = button_appearance(doc, on_state);
                        dict.set("AP", ap);
                    }
                }
                FixtureKind::Dropdown(options) => {
                    dict.set("FT", "Ch");
                    dict.set("Rect", rect(top, 150, 20));
                    dict.set(
                        "Opt",
                        options
                            .iter()
                            .map(|(e, d)| {
                                Object::Array(vec![
                                    Object::string_literal(e.as_str()),
                                    Object::string_literal(d.as_str()),
                                ])
                            })
                            .collect::<Vec<_>>(),
                    );
                }
                FixtureKind::PushButton => {
                    dict.set("FT", "Btn");
                    dict.set("Rect", rect(top, 80, 20));
                    if field.with_appearance {
                        let n = state_stream(doc, b"0.8 g 0 0 80 20 re f");
                        dict.set("AP", dictionary! { "N" => n });
                    }
                }
                FixtureKind::Signature => {
                    dict.set("FT", "Sig");
                    dict.set("Rect", rect(top, 150, 30));
                }
                FixtureKind::Radio(_) => {}
            }
            let id = doc.add_object(dict);
            (id, vec![id])
        }
    }
}
