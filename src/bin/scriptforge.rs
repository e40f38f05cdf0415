//! scriptforge command line interface
//!
//! # Usage
//!
//! ```bash
//! # Generate a script from selected and reverted scripts
//! scriptforge compile --collection windows --select clear-temp --revert disable-telemetry
//!
//! # Generate every script with a recommendation level
//! scriptforge compile --collection linux --recommend standard --output cleanup.sh
//!
//! # Compile every script of a collection and report failures
//! scriptforge validate --collection windows
//!
//! # List shared functions
//! scriptforge --format json functions --collection linux
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use script_core::{FunctionBody, SharedFunction};
use scriptforge::catalog::{CollectionData, CollectionLoader};
use scriptforge::{ApplicationCode, ScriptCollection, ScriptCompiler, SelectedScript};

#[derive(Parser)]
#[command(name = "scriptforge")]
#[command(version)]
#[command(about = "Generate batch and shell scripts from script collections")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Directory holding collection files
    #[arg(long, global = true, env = "SCRIPTFORGE_COLLECTIONS_DIR")]
    collections_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one script from a selection
    Compile {
        /// Collection name (file name without .yaml)
        #[arg(short, long)]
        collection: String,

        /// Script ids to run
        #[arg(short, long)]
        select: Vec<String>,

        /// Script ids to revert
        #[arg(short, long)]
        revert: Vec<String>,

        /// Also select every script with this recommendation level
        #[arg(long)]
        recommend: Option<String>,

        /// Write the script to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile every script and report failures
    Validate {
        #[arg(short, long)]
        collection: String,
    },

    /// List shared functions and their parameters
    Functions {
        #[arg(short, long)]
        collection: String,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let loader = match &cli.collections_dir {
        Some(dir) => CollectionLoader::new(dir),
        None => CollectionLoader::from_env(),
    };

    let result = match cli.command {
        Commands::Compile {
            collection,
            select,
            revert,
            recommend,
            output,
        } => cmd_compile(
            &loader,
            &collection,
            &select,
            &revert,
            recommend.as_deref(),
            output,
            cli.format,
        ),
        Commands::Validate { collection } => cmd_validate(&loader, &collection, cli.format),
        Commands::Functions { collection } => cmd_functions(&loader, &collection, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_compile(
    loader: &CollectionLoader,
    name: &str,
    select: &[String],
    revert: &[String],
    recommend: Option<&str>,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let data = loader.load(name)?;
    let collection = ScriptCollection::from_data(&data)
        .with_context(|| format!("Failed to compile collection {}", name))?;

    let selection = build_selection(&collection, select, revert, recommend)?;
    if selection.is_empty() {
        bail!("nothing selected, use --select, --revert or --recommend");
    }
    let application = ApplicationCode::with_selection(collection.metadata().clone(), &selection)?;

    if let Some(path) = &output {
        std::fs::write(path, application.current())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let positions: Vec<_> = application
                .positions()
                .iter()
                .map(|(selected, position)| {
                    serde_json::json!({
                        "id": selected.id(),
                        "name": selected.script().name,
                        "revert": selected.is_reverted(),
                        "position": position,
                    })
                })
                .collect();
            let mut report = serde_json::json!({
                "collection": name,
                "language": collection.language(),
                "scripts": positions,
            });
            if output.is_none() {
                report["code"] = serde_json::Value::String(application.current().to_string());
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => match &output {
            Some(path) => println!(
                "{} Wrote {} script(s) to {}",
                "OK".green(),
                selection.len(),
                path.display()
            ),
            None => println!("{}", application.current()),
        },
    }
    Ok(())
}

fn cmd_validate(loader: &CollectionLoader, name: &str, format: OutputFormat) -> Result<()> {
    let data = loader.load(name)?;
    let compiler = ScriptCompiler::new(&data.functions, data.scripting.language)
        .with_context(|| format!("Failed to parse functions of {}", name))?;

    let scripts = data.scripts();
    let failures: Vec<(String, String)> = scripts
        .iter()
        .filter_map(|script| {
            compiler
                .compile(script)
                .err()
                .map(|e| (script.id().to_string(), e.to_string()))
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "collection": name,
                "valid": failures.is_empty(),
                "scripts": scripts.len(),
                "failures": failures.iter().map(|(id, error)| {
                    serde_json::json!({ "id": id, "error": error })
                }).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for (id, error) in &failures {
                println!("{} {}", "FAIL".red().bold(), id.bold());
                for line in error.lines() {
                    println!("    {}", line);
                }
            }
            if failures.is_empty() {
                println!(
                    "{} {} script(s) compiled",
                    "OK".green().bold(),
                    scripts.len()
                );
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        bail!("{} of {} script(s) failed to compile", failures.len(), scripts.len())
    }
}

fn cmd_functions(loader: &CollectionLoader, name: &str, format: OutputFormat) -> Result<()> {
    let data: CollectionData = loader.load(name)?;
    let compiler = ScriptCompiler::new(&data.functions, data.scripting.language)
        .with_context(|| format!("Failed to parse functions of {}", name))?;

    match format {
        OutputFormat::Json => {
            let functions: Vec<_> = compiler
                .functions()
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "name": f.name(),
                        "kind": body_kind(f),
                        "parameters": f.parameters().iter().map(|p| {
                            serde_json::json!({ "name": p.name(), "optional": p.is_optional() })
                        }).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&functions)?);
        }
        OutputFormat::Text => {
            println!("{}", format!("Functions in {}", name).cyan().bold());
            for f in compiler.functions().iter() {
                let kind = match f.body() {
                    FunctionBody::Code { .. } => "[code]".dimmed(),
                    FunctionBody::Calls(_) => "[calls]".blue(),
                };
                let parameters: Vec<String> = f
                    .parameters()
                    .iter()
                    .map(|p| {
                        if p.is_optional() {
                            format!("{}?", p.name())
                        } else {
                            p.name().to_string()
                        }
                    })
                    .collect();
                println!("  {} {} ({})", f.name().green(), kind, parameters.join(", "));
            }
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn body_kind(function: &SharedFunction) -> &'static str {
    match function.body() {
        FunctionBody::Code { .. } => "code",
        FunctionBody::Calls(_) => "calls",
    }
}

/// Selected ids first, then reverted ids not already selected, then
/// recommended scripts not yet picked.
fn build_selection(
    collection: &ScriptCollection,
    select: &[String],
    revert: &[String],
    recommend: Option<&str>,
) -> Result<Vec<SelectedScript>> {
    let mut selection: Vec<SelectedScript> = Vec::new();
    let mut push = |id: &str, reverted: bool| -> Result<()> {
        if selection.iter().any(|s| s.id() == id) {
            return Ok(());
        }
        let script = collection.script(id)?;
        let selected = SelectedScript::new(script, reverted)
            .with_context(|| format!("Cannot revert {}", id))?;
        selection.push(selected);
        Ok(())
    };

    for id in select {
        push(id, revert.contains(id))?;
    }
    for id in revert {
        push(id, true)?;
    }
    if let Some(level) = recommend {
        for script in collection.recommended(level) {
            push(&script.id, false)?;
        }
    }
    Ok(selection)
}
