//! Schema Builder CLI
//!
//! Validates documents against schemas, reports schema definition conflicts,
//! and infers schemas from example documents.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use familiar_schema_builder::{
    build_validation_tree, BuilderConfig, Inferrer, InstanceValidator, SchemaNode,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-builder")]
#[command(about = "Validate, check and infer JSON Schemas")]
#[command(version)]
struct Cli {
    /// Config file (defaults to schema-builder.toml lookup)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON document against a schema
    Validate {
        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,
        /// Document to validate
        document: PathBuf,
    },

    /// Report self-contradictory constraints in a schema
    Check {
        /// Schema file
        schema: PathBuf,
    },

    /// Infer a schema from one or more example documents
    Infer {
        /// Example documents
        #[arg(required = true)]
        samples: Vec<PathBuf>,
        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn read_schema(path: &Path) -> anyhow::Result<SchemaNode> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema {}", path.display()))?;
    SchemaNode::from_json_str(&text).with_context(|| format!("parsing schema {}", path.display()))
}

/// Returns whether the command succeeded without findings
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = BuilderConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { schema, document } => {
            let schema = read_schema(&schema)?;
            let text = std::fs::read_to_string(&document)
                .with_context(|| format!("reading document {}", document.display()))?;

            let result = InstanceValidator::new(config.validation).validate(&text, &schema);
            if result.valid {
                println!("✅ {} is valid", document.display());
                return Ok(true);
            }

            println!("❌ {} - {} error(s)", document.display(), result.errors.len());
            for error in &result.errors {
                match (error.line, error.column) {
                    (Some(line), Some(column)) => {
                        println!("   {}:{}:{} {} - {}", document.display(), line, column, error.path, error.message)
                    }
                    _ => println!("   {} - {}", error.path, error.message),
                }
            }
            Ok(false)
        }

        Commands::Check { schema } => {
            let node = read_schema(&schema)?;
            let catalog = config.messages.catalog();
            let tree = build_validation_tree(&node, &catalog);

            if tree.total_errors() == 0 {
                println!("✅ {} - no definition conflicts", schema.display());
                return Ok(true);
            }

            println!("❌ {} - {} conflict(s)", schema.display(), tree.total_errors());
            for (location, error) in tree.collect_errors() {
                let location = if location.is_empty() { "(root)".to_string() } else { location };
                println!("   └─ {} [{}] {}", location, error.path, error.message);
            }
            Ok(false)
        }

        Commands::Infer { samples, output } => {
            let mut values = Vec::with_capacity(samples.len());
            for path in &samples {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading sample {}", path.display()))?;
                let value: serde_json::Value = serde_json::from_str(&text)
                    .with_context(|| format!("sample {} is not valid JSON", path.display()))?;
                values.push(value);
            }
            if values.is_empty() {
                bail!("no samples given");
            }

            let schema = Inferrer::new(config.inference).infer_samples(&values);
            let json = schema.to_json_pretty()?;

            if let Some(path) = output {
                std::fs::write(&path, &json)?;
                println!("✅ Schema written to {:?}", path);
            } else {
                println!("{}", json);
            }
            Ok(true)
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(true)
        }
    }
}
