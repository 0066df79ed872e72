use std::collections::BTreeMap;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use crate::target::{TargetCollection, TargetField};

/// Reporter for summarizing a translation run
pub struct TranslationReporter {
    output_format: ReportFormat,
}

/// Available output formats for translation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
}

/// Summary of one translation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationReport {
    pub collections: Vec<CollectionSummary>,
    pub total_fields: usize,
    pub nested_fields: usize,
    /// Field count per target `type`, nested fields included
    pub field_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub slug: String,
    pub top_level_fields: usize,
    pub total_fields: usize,
}

impl TranslationReporter {
    pub fn new() -> Self {
        Self {
            output_format: ReportFormat::Console,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Generate a summary of the translated collections
    pub fn generate_report(&self, collections: &[TargetCollection]) -> TranslationReport {
        let mut field_types = BTreeMap::new();
        let mut summaries = Vec::with_capacity(collections.len());
        let mut total_fields = 0;

        for collection in collections {
            let count = count_fields(&collection.fields, &mut field_types);
            total_fields += count;
            summaries.push(CollectionSummary {
                slug: collection.slug.clone(),
                top_level_fields: collection.fields.len(),
                total_fields: count,
            });
        }

        let top_level: usize = summaries.iter().map(|s| s.top_level_fields).sum();

        TranslationReport {
            collections: summaries,
            total_fields,
            nested_fields: total_fields - top_level,
            field_types,
        }
    }

    /// Format the report according to the configured output format
    pub fn format_report(&self, report: &TranslationReport) -> Result<String, ReportError> {
        match self.output_format {
            ReportFormat::Console => Ok(self.format_console_report(report)),
            ReportFormat::Json => self.format_json_report(report),
        }
    }

    fn format_console_report(&self, report: &TranslationReport) -> String {
        let mut output = String::new();

        output.push_str("=== Schema Translation Report ===\n\n");
        output.push_str(&format!("Collections: {}\n", report.collections.len()));
        output.push_str(&format!(
            "Fields: {} ({} nested)\n",
            report.total_fields, report.nested_fields
        ));

        if !report.collections.is_empty() {
            output.push('\n');
            for collection in &report.collections {
                output.push_str(&format!(
                    "  ✓ {} ({} fields)\n",
                    collection.slug, collection.total_fields
                ));
            }
        }

        if !report.field_types.is_empty() {
            output.push_str("\nField types:\n");
            for (field_type, count) in &report.field_types {
                output.push_str(&format!("  • {field_type}: {count}\n"));
            }
        }

        output
    }

    fn format_json_report(&self, report: &TranslationReport) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report)
            .map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for TranslationReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Count `fields` and everything nested below them, tallying per type.
fn count_fields(fields: &[TargetField], field_types: &mut BTreeMap<String, usize>) -> usize {
    fields
        .iter()
        .map(|field| {
            *field_types.entry(field.kind.type_name().to_string()).or_insert(0) += 1;
            1 + count_fields(field.subfields(), field_types)
        })
        .sum()
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
