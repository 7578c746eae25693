//! Widget Manifest CLI
//!
//! Validates, migrates, and inspects widget manifest files.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use widget_manifest::{migrate, validate, ManifestDocument};

#[derive(Parser)]
#[command(name = "manifest-tool")]
#[command(about = "Validate, migrate, and inspect widget manifests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a manifest against its declared schema version
    Validate {
        /// Path to the manifest JSON file
        file: PathBuf,
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },

    /// Migrate a manifest forward to the latest schema version
    Migrate {
        /// Path to the manifest JSON file
        file: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a manifest's version, fingerprint, and declared surface
    Inspect {
        /// Path to the manifest JSON file
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load(path: &PathBuf) -> anyhow::Result<ManifestDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ManifestDocument::parse(&text)
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate { file, strict } => {
            let doc = load(&file)?;
            let result = validate(&doc);

            for warning in &result.warnings {
                println!("⚠️  [{}] {}: {}", warning.code, warning.path, warning.message);
            }
            for error in &result.errors {
                println!("❌ [{}] {}: {}", error.code, error.path, error.message);
            }

            if result.is_clean() && (!strict || !result.has_warnings()) {
                println!("✅ {} is a valid {} manifest", file.display(), doc.version());
            } else {
                println!(
                    "❌ {} - {} error(s), {} warning(s)",
                    file.display(),
                    result.errors.len(),
                    result.warnings.len()
                );
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Migrate { file, output } => {
            let doc = load(&file)?;
            let migrated = migrate(&doc)?;
            let rendered = migrated.to_string_pretty()?;

            if let Some(path) = output {
                fs::write(&path, &rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!(
                    "✅ Migrated {} -> {} ({})",
                    doc.version(),
                    migrated.version(),
                    path.display()
                );
            } else {
                println!("{rendered}");
            }
            Ok(())
        }

        Commands::Inspect { file } => {
            let doc = load(&file)?;
            println!("version:     {}", doc.version());
            println!("fingerprint: {}", doc.fingerprint());
            if let Some(name) = doc.name() {
                println!("name:        {name}");
            }

            let declarations = doc.declarations();
            println!("declarations: {}", declarations.len());
            for (i, declaration) in declarations.iter().enumerate() {
                println!(
                    "  [{}] slots: {}, cssParts: {}, cssProperties: {}, \
                     parameters: {}, portals: {}, demos: {}, data: {}",
                    i,
                    declaration.slots.len(),
                    declaration.css_parts.len(),
                    declaration.css_properties.len(),
                    declaration.parameters.len(),
                    declaration.portals.len(),
                    declaration.demos.len(),
                    declaration
                        .data
                        .as_ref()
                        .map_or("-".to_string(), |data| data.name.clone()),
                );
            }
            Ok(())
        }
    }
}
