use std::io::Write;
use std::path::PathBuf;
use std::process;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use strapi2payload::{
    emitter::EmitError,
    reporter::ReportError,
    translator::{external_slugs, DEFAULT_MEDIA_COLLECTION},
    validation::ValidationSetupError,
    translate_registry, validate_collections, OutputFormat, RegistryError, ReportFormat,
    SchemaEmitter, SchemaRegistry, TranslationError, TranslationReporter, TranslatorOptions,
};

#[derive(Parser, Debug)]
#[command(name = "strapi2payload")]
#[command(about = "Translate Strapi content-type schemas into Payload collection configs")]
struct Args {
    /// Root of the Strapi project (the directory holding `api/` and `components/`)
    input_dir: PathBuf,

    /// Write the translated schema here instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Collection that upload fields relate to
    #[arg(long, value_name = "SLUG", default_value = DEFAULT_MEDIA_COLLECTION)]
    media_collection: String,

    /// Relation target provided outside the project tree (e.g. `user`); repeatable
    #[arg(long = "external-model", value_name = "NAME")]
    external_models: Vec<String>,

    /// Print a run summary to stderr
    #[arg(long, value_enum, value_name = "FORMAT")]
    report: Option<ReportFormat>,

    /// Skip the structural check of the translated collections
    #[arg(long)]
    skip_validation: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    ValidationSetup(#[from] ValidationSetupError),

    #[error("Translated schema failed structural validation with {0} error(s)")]
    ValidationFailed(usize),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("\n❌ Error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let mut registry = SchemaRegistry::load(&args.input_dir).await?;
    for name in &args.external_models {
        registry.declare_external_model(name.clone());
    }

    let options = TranslatorOptions::new().with_media_collection(args.media_collection);
    let known_targets = external_slugs(&registry, &options);
    let collections = translate_registry(&registry, options)?;

    if !args.skip_validation {
        let report = validate_collections(&collections, &known_targets)?;
        if report.has_errors() {
            eprintln!("\n=== Structural Validation ===");
            for issue in &report.errors {
                eprintln!("  ❌ {}: {}", issue.path, issue.message);
            }
            return Err(CliError::ValidationFailed(report.errors.len()));
        }
    }

    let rendered = SchemaEmitter::new().with_format(args.format).emit(&collections)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, rendered).await.map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "wrote translated schema");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| CliError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }

    if let Some(format) = args.report {
        let reporter = TranslationReporter::new().with_format(format);
        let report = reporter.generate_report(&collections);
        eprintln!("\n{}", reporter.format_report(&report)?);
    }

    eprintln!("\n=== Conversion Complete ===");
    eprintln!(
        "  ✓ {} models and {} components translated into {} collections",
        registry.model_count(),
        registry.component_count(),
        collections.len()
    );
    Ok(())
}
