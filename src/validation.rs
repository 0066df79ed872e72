use std::collections::HashSet;
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use crate::target::{FieldKind, TargetCollection, TargetField};

/// JSON Schema describing the `{ slug, fields }` grammar of the output
const TARGET_SCHEMA: &str = include_str!("target_schema.json");

/// Structural validation report for translated collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation error with the location it was found at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub error_type: ValidationErrorType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorType {
    SchemaViolation,
    DuplicateSlug,
    DuplicateFieldName,
    DanglingRelation,
}

impl ValidationError {
    pub fn new(path: String, error_type: ValidationErrorType, message: String) -> Self {
        Self {
            path,
            error_type,
            message,
        }
    }
}

/// The validator itself could not be set up
#[derive(Debug, Error)]
pub enum ValidationSetupError {
    #[error("Failed to compile target schema: {0}")]
    Compile(String),

    #[error("Failed to serialize collections: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Check translated collections against the target grammar, for slugs or
/// sibling field names that collide after normalization, and for relations
/// whose `relationTo` names neither an emitted slug nor one of
/// `external_slugs`.
pub fn validate_collections(
    collections: &[TargetCollection],
    external_slugs: &[String],
) -> Result<ValidationReport, ValidationSetupError> {
    let schema_json: Value = serde_json::from_str(TARGET_SCHEMA)?;
    let compiled_schema = JSONSchema::compile(&schema_json)
        .map_err(|e| ValidationSetupError::Compile(e.to_string()))?;

    let instance = serde_json::to_value(collections)?;
    let mut report = ValidationReport::new();

    if let Err(errors) = compiled_schema.validate(&instance) {
        for error in errors {
            report.add_error(ValidationError::new(
                error.instance_path.to_string(),
                ValidationErrorType::SchemaViolation,
                error.to_string(),
            ));
        }
    }

    let mut slugs = HashSet::new();
    for (index, collection) in collections.iter().enumerate() {
        if !slugs.insert(collection.slug.as_str()) {
            report.add_error(ValidationError::new(
                format!("/{index}/slug"),
                ValidationErrorType::DuplicateSlug,
                format!("Slug `{}` is produced by more than one model", collection.slug),
            ));
        }
        check_field_names(&collection.fields, &format!("/{index}/fields"), &mut report);
    }

    let targets: HashSet<&str> = slugs
        .into_iter()
        .chain(external_slugs.iter().map(String::as_str))
        .collect();
    for (index, collection) in collections.iter().enumerate() {
        check_relation_targets(&collection.fields, &format!("/{index}/fields"), &targets, &mut report);
    }

    Ok(report)
}

fn check_field_names(fields: &[TargetField], path: &str, report: &mut ValidationReport) {
    let mut names = HashSet::new();
    for (index, field) in fields.iter().enumerate() {
        if !names.insert(field.name.as_str()) {
            report.add_error(ValidationError::new(
                format!("{path}/{index}/name"),
                ValidationErrorType::DuplicateFieldName,
                format!("Field name `{}` appears more than once", field.name),
            ));
        }
        check_field_names(field.subfields(), &format!("{path}/{index}/fields"), report);
    }
}

fn check_relation_targets(fields: &[TargetField], path: &str, targets: &HashSet<&str>, report: &mut ValidationReport) {
    for (index, field) in fields.iter().enumerate() {
        let relation_to = match &field.kind {
            FieldKind::Upload { relation_to } | FieldKind::Relationship { relation_to, .. } => Some(relation_to),
            _ => None,
        };
        if let Some(slug) = relation_to.filter(|slug| !targets.contains(slug.as_str())) {
            report.add_error(ValidationError::new(
                format!("{path}/{index}/relationTo"),
                ValidationErrorType::DanglingRelation,
                format!("Field `{}` relates to `{slug}`, which is not an emitted collection", field.name),
            ));
        }
        check_relation_targets(field.subfields(), &format!("{path}/{index}/fields"), targets, report);
    }
}
