use std::collections::HashSet;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use crate::{naming::normalize_name, target::TargetCollection};

/// Module the TypeScript output imports its config type from
const PAYLOAD_TYPES_MODULE: &str = "payload/types";

/// Name of the exported array holding every collection
const COLLECTIONS_EXPORT: &str = "collections";

/// Names the module declares itself; collection constants must avoid them
const RESERVED_IDENTIFIERS: [&str; 2] = ["CollectionConfig", COLLECTIONS_EXPORT];

/// Serializes translated collections in the chosen output format
pub struct SchemaEmitter {
    output_format: OutputFormat,
}

/// Available output formats for the translated schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// YAML sequence
    Yaml,
    /// TypeScript module exporting one `CollectionConfig` per collection
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
}

impl SchemaEmitter {
    pub fn new() -> Self {
        Self {
            output_format: OutputFormat::Json,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Serialize the collections according to the configured output format
    pub fn emit(&self, collections: &[TargetCollection]) -> Result<String, EmitError> {
        match self.output_format {
            OutputFormat::Json => self.emit_json(collections),
            OutputFormat::Yaml => self.emit_yaml(collections),
            OutputFormat::TypeScript => self.emit_typescript(collections),
        }
    }

    fn emit_json(&self, collections: &[TargetCollection]) -> Result<String, EmitError> {
        let mut json = serde_json::to_string_pretty(collections)?;
        json.push('\n');
        Ok(json)
    }

    fn emit_yaml(&self, collections: &[TargetCollection]) -> Result<String, EmitError> {
        Ok(serde_yaml::to_string(collections)?)
    }

    fn emit_typescript(&self, collections: &[TargetCollection]) -> Result<String, EmitError> {
        let mut output = format!("import {{ CollectionConfig }} from '{PAYLOAD_TYPES_MODULE}';\n");
        let mut identifiers = Vec::with_capacity(collections.len());
        let mut taken: HashSet<String> = RESERVED_IDENTIFIERS.iter().map(|name| name.to_string()).collect();

        for collection in collections {
            let identifier = unique_identifier(const_identifier(&collection.slug), &mut taken);
            let body = serde_json::to_string_pretty(collection)?;
            output.push_str(&format!("\nexport const {identifier}: CollectionConfig = {body};\n"));
            identifiers.push(identifier);
        }

        output.push_str(&format!("\nexport const {COLLECTIONS_EXPORT}: CollectionConfig[] = [\n"));
        for identifier in &identifiers {
            output.push_str(&format!("  {identifier},\n"));
        }
        output.push_str("];\n");

        Ok(output)
    }
}

impl Default for SchemaEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// A TypeScript identifier for a collection constant.
fn const_identifier(slug: &str) -> String {
    let name = normalize_name(slug);
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{name}"),
        Some(_) => name,
        None => "_".to_string(),
    }
}

/// `base`, or `base_2`, `base_3`, ... when an earlier declaration holds it.
fn unique_identifier(base: String, taken: &mut HashSet<String>) -> String {
    let mut identifier = base.clone();
    let mut suffix = 2;
    while taken.contains(&identifier) {
        identifier = format!("{base}_{suffix}");
        suffix += 1;
    }
    taken.insert(identifier.clone());
    identifier
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{FieldKind, TargetField};

    fn collections() -> Vec<TargetCollection> {
        let mut title = TargetField::new("title", FieldKind::Text);
        title.required = true;
        vec![
            TargetCollection {
                slug: "articles".to_string(),
                fields: vec![title, TargetField::new("body", FieldKind::RichText)],
            },
            TargetCollection {
                slug: "blogPosts".to_string(),
                fields: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_emitter_creation() {
        let emitter = SchemaEmitter::new();
        assert_eq!(emitter.output_format, OutputFormat::Json);
        let emitter = SchemaEmitter::new().with_format(OutputFormat::Yaml);
        assert_eq!(emitter.output_format, OutputFormat::Yaml);
    }

    #[test]
    fn test_emit_json() {
        let output = SchemaEmitter::new().emit(&collections()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["slug"], "articles");
        assert_eq!(parsed[0]["fields"][0]["required"], true);
        assert!(output.contains("\n  {\n    \"slug\": \"articles\""));
    }

    #[test]
    fn test_emit_yaml() {
        let output = SchemaEmitter::new().with_format(OutputFormat::Yaml).emit(&collections()).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed[0]["slug"].as_str(), Some("articles"));
        assert_eq!(parsed[1]["slug"].as_str(), Some("blogPosts"));
    }

    #[test]
    fn test_emit_typescript_module() {
        let output = SchemaEmitter::new()
            .with_format(OutputFormat::TypeScript)
            .emit(&collections())
            .unwrap();

        assert!(output.starts_with("import { CollectionConfig } from 'payload/types';\n"));
        assert!(output.contains("export const articles: CollectionConfig = {\n  \"slug\": \"articles\","));
        assert!(output.contains("export const blogPosts: CollectionConfig = {"));
        assert!(output.ends_with("export const collections: CollectionConfig[] = [\n  articles,\n  blogPosts,\n];\n"));
    }

    #[test]
    fn test_const_identifier() {
        assert_eq!(const_identifier("articles"), "articles");
        assert_eq!(const_identifier("3dModels"), "_3dModels");
        assert_eq!(const_identifier(""), "_");
    }

    #[test]
    fn test_collection_named_collections_does_not_shadow_the_array() {
        let collections = vec![TargetCollection {
            slug: "collections".to_string(),
            fields: vec![TargetField::new("title", FieldKind::Text)],
        }];
        let output = SchemaEmitter::new()
            .with_format(OutputFormat::TypeScript)
            .emit(&collections)
            .unwrap();

        assert_eq!(output.matches("export const collections:").count(), 1);
        assert!(output.contains("export const collections_2: CollectionConfig = {"));
        assert!(output.ends_with("export const collections: CollectionConfig[] = [\n  collections_2,\n];\n"));
    }

    #[test]
    fn test_duplicate_slugs_get_distinct_identifiers() {
        let post = || TargetCollection {
            slug: "posts".to_string(),
            fields: Vec::new(),
        };
        let output = SchemaEmitter::new()
            .with_format(OutputFormat::TypeScript)
            .emit(&[post(), post(), post()])
            .unwrap();

        assert!(output.contains("export const posts: CollectionConfig"));
        assert!(output.contains("export const posts_2: CollectionConfig"));
        assert!(output.contains("export const posts_3: CollectionConfig"));
        assert!(output.contains("  posts,\n  posts_2,\n  posts_3,\n"));
    }

    #[test]
    fn test_unique_identifier_avoids_reserved_names() {
        let mut taken: HashSet<String> = RESERVED_IDENTIFIERS.iter().map(|name| name.to_string()).collect();
        assert_eq!(unique_identifier("CollectionConfig".to_string(), &mut taken), "CollectionConfig_2");
        assert_eq!(unique_identifier("articles".to_string(), &mut taken), "articles");
    }
}
