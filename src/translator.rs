use std::fmt;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use crate::{
    naming::{normalize_name, normalize_slug},
    schema::{AttributeDef, AttributeKind, Model, RelationTarget, ScalarType, Schema},
    schema_registry::SchemaRegistry,
    target::{FieldKind, SelectOption, TargetCollection, TargetField},
};

/// Collection that uploads relate to unless configured otherwise.
pub const DEFAULT_MEDIA_COLLECTION: &str = "media";

/// Name of the upload field wrapped by a to-many file relation.
const FILE_FIELD_NAME: &str = "file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorOptions {
    pub media_collection: String,
}

impl TranslatorOptions {
    pub fn new() -> Self {
        Self {
            media_collection: DEFAULT_MEDIA_COLLECTION.to_string(),
        }
    }

    pub fn with_media_collection(mut self, slug: impl Into<String>) -> Self {
        self.media_collection = slug.into();
        self
    }
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Component,
    Model,
    Collection,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component => f.write_str("component"),
            Self::Model => f.write_str("model"),
            Self::Collection => f.write_str("collection"),
        }
    }
}

/// Errors that abort a translation run
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Unresolved {kind} reference `{key}` at {location}")]
    UnresolvedReference {
        kind: ReferenceKind,
        key: String,
        location: String,
    },

    #[error("Unimplemented schema translation at {location}: {structure}")]
    UnimplementedShape { location: String, structure: Value },

    #[error("Component cycle detected: {}", chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },
}

/// Translates source attributes into target fields, expanding components
/// through the registry it borrows.
pub struct AttributeTranslator<'a> {
    registry: &'a SchemaRegistry,
    options: TranslatorOptions,
}

/// Where the translator currently is: the attribute path for diagnostics and
/// the chain of components being expanded.
#[derive(Debug, Default)]
struct Scope {
    path: Vec<String>,
    components: Vec<String>,
}

impl Scope {
    fn rooted(root: &str) -> Self {
        Self {
            path: vec![root.to_string()],
            components: Vec::new(),
        }
    }

    fn location(&self) -> String {
        self.path.join(".")
    }
}

impl<'a> AttributeTranslator<'a> {
    pub fn new(registry: &'a SchemaRegistry, options: TranslatorOptions) -> Self {
        Self { registry, options }
    }

    /// Translate every model in the registry, in registry order.
    pub fn translate_registry(&self) -> Result<Vec<TargetCollection>, TranslationError> {
        let collections = self
            .registry
            .models()
            .map(|(name, model)| self.assemble_collection(name, model))
            .collect::<Result<Vec<_>, _>>()?;

        info!(collections = collections.len(), "translated schema");
        Ok(collections)
    }

    /// Wrap a model's attributes into one target collection.
    pub fn assemble_collection(&self, name: &str, model: &Model) -> Result<TargetCollection, TranslationError> {
        let mut scope = Scope::rooted(name);
        let fields = self.translate_fields(model, &mut scope)?;

        Ok(TargetCollection {
            slug: normalize_slug(&model.collection_name),
            fields,
        })
    }

    /// Translate a single attribute owned by a schema whose default
    /// localization is `owner_localized`.
    pub fn translate_attribute(
        &self,
        name: &str,
        def: &AttributeDef,
        owner_localized: bool,
    ) -> Result<TargetField, TranslationError> {
        self.translate_in_scope(name, def, owner_localized, &mut Scope::default())
    }

    fn translate_fields(&self, schema: &Schema, scope: &mut Scope) -> Result<Vec<TargetField>, TranslationError> {
        let owner_localized = schema.localized_by_default();
        schema
            .attributes
            .iter()
            .map(|(name, def)| self.translate_in_scope(name, def, owner_localized, scope))
            .collect()
    }

    fn translate_in_scope(
        &self,
        name: &str,
        def: &AttributeDef,
        owner_localized: bool,
        scope: &mut Scope,
    ) -> Result<TargetField, TranslationError> {
        scope.path.push(name.to_string());
        debug!(attribute = %scope.location(), "translating attribute");
        let kind = self.translate_kind(&def.kind, scope);
        scope.path.pop();

        Ok(TargetField {
            name: normalize_name(name),
            localized: resolve_localized(def, owner_localized),
            required: def.required,
            kind: kind?,
        })
    }

    fn translate_kind(&self, kind: &AttributeKind, scope: &mut Scope) -> Result<FieldKind, TranslationError> {
        match kind {
            AttributeKind::Scalar(scalar) => Ok(translate_scalar(scalar)),
            AttributeKind::Component { key, repeatable } => {
                let fields = self.expand_component(key, scope)?;
                Ok(if *repeatable {
                    FieldKind::Array { fields }
                } else {
                    FieldKind::Group { fields }
                })
            }
            AttributeKind::Model(RelationTarget::File) => Ok(FieldKind::Upload {
                relation_to: self.options.media_collection.clone(),
            }),
            AttributeKind::Model(RelationTarget::Schema(target)) => Ok(FieldKind::Relationship {
                relation_to: self.relation_slug(target, ReferenceKind::Model, scope)?,
                has_many: false,
            }),
            AttributeKind::Collection(RelationTarget::File) => Ok(FieldKind::Array {
                fields: vec![TargetField::new(
                    FILE_FIELD_NAME,
                    FieldKind::Upload {
                        relation_to: self.options.media_collection.clone(),
                    },
                )],
            }),
            AttributeKind::Collection(RelationTarget::Schema(target)) => Ok(FieldKind::Relationship {
                relation_to: self.relation_slug(target, ReferenceKind::Collection, scope)?,
                has_many: true,
            }),
            AttributeKind::Unrecognized(structure) => Err(TranslationError::UnimplementedShape {
                location: scope.location(),
                structure: structure.clone(),
            }),
        }
    }

    fn expand_component(&self, key: &str, scope: &mut Scope) -> Result<Vec<TargetField>, TranslationError> {
        let component = self
            .registry
            .component(key)
            .ok_or_else(|| TranslationError::UnresolvedReference {
                kind: ReferenceKind::Component,
                key: key.to_string(),
                location: scope.location(),
            })?;

        if scope.components.iter().any(|k| k == key) {
            let mut chain = scope.components.clone();
            chain.push(key.to_string());
            return Err(TranslationError::CycleDetected { chain });
        }

        scope.components.push(key.to_string());
        let fields = self.translate_fields(component, scope);
        scope.components.pop();
        fields
    }

    fn relation_slug(&self, target: &str, kind: ReferenceKind, scope: &Scope) -> Result<String, TranslationError> {
        if !self.registry.resolves_model(target) {
            return Err(TranslationError::UnresolvedReference {
                kind,
                key: target.to_string(),
                location: scope.location(),
            });
        }
        Ok(normalize_slug(target))
    }
}

/// Translate every model of `registry` with the given options.
pub fn translate_registry(
    registry: &SchemaRegistry,
    options: TranslatorOptions,
) -> Result<Vec<TargetCollection>, TranslationError> {
    AttributeTranslator::new(registry, options).translate_registry()
}

/// Slugs a translated relation may point at without being emitted itself:
/// the media collection and every declared external model.
pub fn external_slugs(registry: &SchemaRegistry, options: &TranslatorOptions) -> Vec<String> {
    std::iter::once(options.media_collection.clone())
        .chain(registry.external_models().map(normalize_slug))
        .collect()
}

/// The field's own override wins; otherwise the owner's default applies.
pub fn resolve_localized(def: &AttributeDef, owner_localized: bool) -> bool {
    def.localized.unwrap_or(owner_localized)
}

fn translate_scalar(scalar: &ScalarType) -> FieldKind {
    match scalar {
        ScalarType::String | ScalarType::Text => FieldKind::Text,
        ScalarType::Datetime => FieldKind::Date,
        ScalarType::Richtext => FieldKind::RichText,
        ScalarType::Enumeration(values) => FieldKind::Radio {
            options: values.iter().map(|v| SelectOption::echo(v)).collect(),
        },
        ScalarType::Json => FieldKind::Json,
        ScalarType::Boolean => FieldKind::Checkbox,
        ScalarType::Integer { min, max } => FieldKind::Number {
            min: min.clone(),
            max: max.clone(),
        },
        ScalarType::Float => FieldKind::Number { min: None, max: None },
        ScalarType::Email => FieldKind::Email,
    }
}
