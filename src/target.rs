use serde::Serialize;
use serde_json::Number;

/// A translated collection: `{ slug, fields }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetCollection {
    pub slug: String,
    pub fields: Vec<TargetField>,
}

/// A translated field. `localized` and `required` are only ever emitted as `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetField {
    pub name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub localized: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Date,
    RichText,
    Array {
        fields: Vec<TargetField>,
    },
    Group {
        fields: Vec<TargetField>,
    },
    Radio {
        options: Vec<SelectOption>,
    },
    Json,
    Checkbox,
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<Number>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<Number>,
    },
    Email,
    Upload {
        #[serde(rename = "relationTo")]
        relation_to: String,
    },
    Relationship {
        #[serde(rename = "relationTo")]
        relation_to: String,
        #[serde(rename = "hasMany", skip_serializing_if = "is_false")]
        has_many: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl TargetField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            localized: false,
            required: false,
            kind,
        }
    }

    /// Nested fields of `array` and `group` fields.
    pub fn subfields(&self) -> &[TargetField] {
        match &self.kind {
            FieldKind::Array { fields } | FieldKind::Group { fields } => fields,
            _ => &[],
        }
    }
}

impl FieldKind {
    /// The `type` tag this kind serializes to.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::RichText => "richText",
            Self::Array { .. } => "array",
            Self::Group { .. } => "group",
            Self::Radio { .. } => "radio",
            Self::Json => "json",
            Self::Checkbox => "checkbox",
            Self::Number { .. } => "number",
            Self::Email => "email",
            Self::Upload { .. } => "upload",
            Self::Relationship { .. } => "relationship",
        }
    }
}

impl SelectOption {
    /// An option whose label and stored value are the same string.
    pub fn echo(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_serialization_order_and_omissions() {
        let mut field = TargetField::new("title", FieldKind::Text);
        field.required = true;

        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"name":"title","required":true,"type":"text"}"#);
    }

    #[test]
    fn test_relationship_serialization() {
        let field = TargetField::new(
            "tags",
            FieldKind::Relationship { relation_to: "tags".into(), has_many: true },
        );
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({"name": "tags", "type": "relationship", "relationTo": "tags", "hasMany": true})
        );

        let field = TargetField::new(
            "author",
            FieldKind::Relationship { relation_to: "authors".into(), has_many: false },
        );
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({"name": "author", "type": "relationship", "relationTo": "authors"})
        );
    }

    #[test]
    fn test_number_bounds_are_optional() {
        let field = TargetField::new("rating", FieldKind::Number { min: Some(1.into()), max: None });
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({"name": "rating", "type": "number", "min": 1})
        );
    }

    #[test]
    fn test_subfields() {
        let inner = TargetField::new("file", FieldKind::Upload { relation_to: "media".into() });
        let outer = TargetField::new("gallery", FieldKind::Array { fields: vec![inner.clone()] });
        assert_eq!(outer.subfields(), &[inner]);
        assert!(TargetField::new("x", FieldKind::Json).subfields().is_empty());
        assert_eq!(outer.kind.type_name(), "array");
    }
}
