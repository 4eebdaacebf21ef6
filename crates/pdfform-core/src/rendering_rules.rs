//! Conditional rendering rules and the combined metadata document.
//!
//! Rules say which fields to show when another field takes a given value.
//! They travel inside the PDF as JSON stored in the value of a dedicated
//! carrier field (see [`crate::classify::FieldRoute::RenderingRule`]).

use serde::{Deserialize, Serialize};

use crate::form_field::FormData;

/// `{"conditions": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRenderingRules {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl FieldRenderingRules {
    /// Parse the JSON payload of a rule-carrier field.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Fields that become visible when `field` takes `value`.
    pub fn fields_rendered_by(&self, field: &str, value: &str) -> Vec<&str> {
        self.conditions
            .iter()
            .filter(|c| c.field == field)
            .flat_map(|c| c.rules.iter())
            .filter(|r| r.value == value)
            .flat_map(|r| r.render.iter().map(String::as_str))
            .collect()
    }
}

/// Rules keyed on one controlling field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    /// Kind of the controlling field, as free text (e.g. `"Radio"`).
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub value: String,
    #[serde(default)]
    pub render: Vec<String>,
}

/// Classified fields and rendering rules in one payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedFormMetadata {
    #[serde(rename = "formFieldsMetaData")]
    pub form_fields: FormData,
    #[serde(rename = "fieldRenderingRulesMetaData")]
    pub field_rendering_rules: FieldRenderingRules,
}

impl CombinedFormMetadata {
    pub fn new(form_fields: FormData, field_rendering_rules: FieldRenderingRules) -> Self {
        Self {
            form_fields,
            field_rendering_rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_field::{FieldKind, FormField};

    const RULES: &str = r#"{
        "conditions": [
            {
                "field": "HasPets",
                "type": "Radio",
                "rules": [
                    {"value": "Yes", "render": ["PetName", "PetType"]},
                    {"value": "No", "render": []}
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_rule_payload() {
        let rules = FieldRenderingRules::from_json(RULES).unwrap();
        assert_eq!(rules.conditions.len(), 1);
        assert_eq!(rules.conditions[0].field_type, "Radio");
        assert_eq!(rules.fields_rendered_by("HasPets", "Yes"), vec!["PetName", "PetType"]);
        assert!(rules.fields_rendered_by("HasPets", "No").is_empty());
        assert!(rules.fields_rendered_by("Other", "Yes").is_empty());
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(FieldRenderingRules::from_json("{\"conditions\": 5}").is_err());
        assert!(FieldRenderingRules::from_json("not json").is_err());
    }

    #[test]
    fn empty_object_is_empty_rules() {
        let rules = FieldRenderingRules::from_json("{}").unwrap();
        assert!(rules.is_empty());
        assert_eq!(serde_json::to_string(&rules).unwrap(), r#"{"conditions":[]}"#);
    }

    #[test]
    fn condition_wire_shape() {
        let rules = FieldRenderingRules::from_json(RULES).unwrap();
        let json = serde_json::to_value(&rules).unwrap();
        assert_eq!(json["conditions"][0]["type"], "Radio");
        assert_eq!(json["conditions"][0]["rules"][0]["render"][1], "PetType");
    }

    #[test]
    fn combined_wire_shape() {
        let fields = FormData {
            fields: vec![FormField {
                name: "HasPets".to_string(),
                kind: FieldKind::Radio,
                label: String::new(),
                date_format: None,
                is_required: false,
                options: vec!["Yes".to_string(), "No".to_string()],
            }],
        };
        let combined = CombinedFormMetadata::new(fields, FieldRenderingRules::default());
        let json = serde_json::to_value(&combined).unwrap();
        assert_eq!(json["formFieldsMetaData"]["formFields"][0]["type"], "Radio");
        assert_eq!(
            json["fieldRenderingRulesMetaData"],
            serde_json::json!({"conditions": []})
        );
    }
}
