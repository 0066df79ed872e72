// Strapi to Payload schema compiler
pub mod schema;
pub mod schema_registry;
pub mod naming;
pub mod inflection;
pub mod target;
pub mod translator;
pub mod validation;
pub mod emitter;
pub mod reporter;

// Re-export core types for convenience
pub use schema::{AttributeDef, AttributeKind, Component, Model, RelationTarget, ScalarType, Schema};
pub use schema_registry::{RegistryError, SchemaRegistry};
pub use naming::{normalize_name, normalize_slug};
pub use target::{FieldKind, SelectOption, TargetCollection, TargetField};
pub use translator::{external_slugs, translate_registry, AttributeTranslator, TranslationError, TranslatorOptions};
pub use validation::{validate_collections, ValidationReport};
pub use emitter::{OutputFormat, SchemaEmitter};
pub use reporter::{ReportFormat, TranslationReport, TranslationReporter};
