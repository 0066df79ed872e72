use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Relation target denoting an upload instead of another model.
pub const FILE_SENTINEL: &str = "file";

/// A model or component document as found on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub collection_name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub plugin_options: PluginOptions,
}

/// Top-level, independently addressable content type.
pub type Model = Schema;

/// Reusable attribute bundle embedded by models or other components.
pub type Component = Schema;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginOptions {
    #[serde(default)]
    pub i18n: Option<Value>,
}

impl Schema {
    /// Whether fields of this schema are localized unless they say otherwise.
    ///
    /// `pluginOptions.i18n` may be a bare flag or an object; an object with a
    /// `localized` key is decided by that key.
    pub fn localized_by_default(&self) -> bool {
        match &self.plugin_options.i18n {
            Some(Value::Object(options)) => options.get("localized").map_or(true, is_truthy),
            Some(flag) => is_truthy(flag),
            None => false,
        }
    }
}

/// Attribute definitions in document order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Attributes(Vec<(String, AttributeDef)>);

impl Attributes {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeDef)> {
        self.0.iter().map(|(name, def)| (name.as_str(), def))
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().map(|(name, value)| (name, AttributeDef::from(value))).collect())
    }
}

/// One attribute definition, classified when the document is parsed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct AttributeDef {
    pub kind: AttributeKind,
    pub required: bool,
    /// `pluginOptions.i18n.localized`, when the attribute sets it.
    pub localized: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    Scalar(ScalarType),
    Component { key: String, repeatable: bool },
    /// To-one relation (`model`).
    Model(RelationTarget),
    /// To-many relation (`collection`).
    Collection(RelationTarget),
    /// A shape no translation exists for; holds the whole definition.
    Unrecognized(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarType {
    String,
    Datetime,
    Richtext,
    Enumeration(Vec<String>),
    Json,
    Text,
    Boolean,
    Integer { min: Option<Number>, max: Option<Number> },
    Float,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTarget {
    File,
    Schema(String),
}

impl From<Value> for AttributeDef {
    fn from(value: Value) -> Self {
        let required = value.get("required").is_some_and(is_truthy);
        let localized = value.pointer("/pluginOptions/i18n/localized").map(is_truthy);
        let kind = AttributeKind::classify(&value).unwrap_or(AttributeKind::Unrecognized(value));

        Self { kind, required, localized }
    }
}

impl AttributeKind {
    /// Decide the variant by tag presence: `type`, then `model`, then `collection`.
    fn classify(value: &Value) -> Option<Self> {
        if let Some(tag) = value.get("type") {
            return match tag.as_str()? {
                "component" => Some(Self::Component {
                    key: value.get("component")?.as_str()?.to_string(),
                    repeatable: value.get("repeatable").is_some_and(is_truthy),
                }),
                name => ScalarType::parse(name, value).map(Self::Scalar),
            };
        }
        if let Some(target) = value.get("model") {
            return RelationTarget::parse(target).map(Self::Model);
        }
        if let Some(target) = value.get("collection") {
            return RelationTarget::parse(target).map(Self::Collection);
        }
        None
    }
}

impl ScalarType {
    fn parse(name: &str, value: &Value) -> Option<Self> {
        let scalar = match name {
            "string" => Self::String,
            "datetime" => Self::Datetime,
            "richtext" => Self::Richtext,
            "enumeration" => {
                let values = value
                    .get("enum")?
                    .as_array()?
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()?;
                if values.is_empty() {
                    return None;
                }
                Self::Enumeration(values)
            }
            "json" => Self::Json,
            "text" => Self::Text,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer {
                min: bound(value, "min")?,
                max: bound(value, "max")?,
            },
            "float" => Self::Float,
            "email" => Self::Email,
            _ => return None,
        };
        Some(scalar)
    }
}

/// `Some(None)` when the bound is absent, `None` when it is not a number.
fn bound(value: &Value, key: &str) -> Option<Option<Number>> {
    match value.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(Value::Number(n)) => Some(Some(n.clone())),
        Some(_) => None,
    }
}

impl RelationTarget {
    fn parse(target: &Value) -> Option<Self> {
        match target.as_str()? {
            FILE_SENTINEL => Some(Self::File),
            name => Some(Self::Schema(name.to_string())),
        }
    }
}

/// JavaScript-style truthiness, as the source documents were written for it.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attr(value: Value) -> AttributeDef {
        AttributeDef::from(value)
    }

    #[test]
    fn test_scalar_classification() {
        assert_eq!(attr(json!({"type": "string"})).kind, AttributeKind::Scalar(ScalarType::String));
        assert_eq!(
            attr(json!({"type": "enumeration", "enum": ["a", "b"]})).kind,
            AttributeKind::Scalar(ScalarType::Enumeration(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            attr(json!({"type": "integer", "min": 1})).kind,
            AttributeKind::Scalar(ScalarType::Integer { min: Some(1.into()), max: None })
        );
    }

    #[test]
    fn test_component_and_relations() {
        assert_eq!(
            attr(json!({"type": "component", "component": "shared.seo", "repeatable": true})).kind,
            AttributeKind::Component { key: "shared.seo".into(), repeatable: true }
        );
        assert_eq!(attr(json!({"model": "file"})).kind, AttributeKind::Model(RelationTarget::File));
        assert_eq!(
            attr(json!({"collection": "tag", "via": "articles"})).kind,
            AttributeKind::Collection(RelationTarget::Schema("tag".into()))
        );
    }

    #[test]
    fn test_type_tag_takes_precedence() {
        let def = attr(json!({"type": "string", "model": "author"}));
        assert_eq!(def.kind, AttributeKind::Scalar(ScalarType::String));
    }

    #[test]
    fn test_unrecognized_shapes_keep_the_raw_definition() {
        let cases = [
            json!({"required": true}),
            json!({"type": "uid", "targetField": "title"}),
            json!({"type": "enumeration", "enum": []}),
            json!({"type": "integer", "min": "one"}),
            json!({"type": "component"}),
            json!({"model": 42}),
        ];
        for case in cases {
            assert_eq!(attr(case.clone()).kind, AttributeKind::Unrecognized(case));
        }
    }

    #[test]
    fn test_required_and_localized_flags() {
        let def = attr(json!({
            "type": "string",
            "required": true,
            "pluginOptions": {"i18n": {"localized": false}}
        }));
        assert!(def.required);
        assert_eq!(def.localized, Some(false));

        let def = attr(json!({"type": "string", "pluginOptions": {}}));
        assert!(!def.required);
        assert_eq!(def.localized, None);
    }

    #[test]
    fn test_schema_keeps_attribute_order() {
        let schema: Schema = serde_json::from_value(json!({
            "collectionName": "articles",
            "attributes": {
                "zeta": {"type": "string"},
                "alpha": {"type": "text"},
                "mid": {"type": "json"}
            }
        }))
        .unwrap();

        let names: Vec<_> = schema.attributes.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(!schema.localized_by_default());
    }

    #[test]
    fn test_localized_by_default() {
        let parse = |options: Value| -> Schema {
            serde_json::from_value(json!({"collectionName": "x", "pluginOptions": options})).unwrap()
        };
        assert!(parse(json!({"i18n": {"localized": true}})).localized_by_default());
        assert!(!parse(json!({"i18n": {"localized": false}})).localized_by_default());
        assert!(parse(json!({"i18n": true})).localized_by_default());
        assert!(parse(json!({"i18n": {}})).localized_by_default());
        assert!(!parse(json!({})).localized_by_default());
    }

    #[test]
    fn test_i18n_object_with_localized_false_is_not_localized() {
        let schema: Schema = serde_json::from_value(json!({
            "collectionName": "pages",
            "pluginOptions": {"i18n": {"localized": false}},
            "attributes": {"title": {"type": "string"}}
        }))
        .unwrap();
        assert!(!schema.localized_by_default());
    }
}
