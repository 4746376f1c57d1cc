//! # formerr-cli
//!
//! Command-line harness for the error-message pipeline.
//!
//! Builds a form from a definition file, feeds it values, and prints the
//! message derived for each field.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use formerr_form::{FormDefinition, FormGroup, GroupSource};
use formerr_messages::{ErrorEquality, FormMessageMap, MessageCatalog, ReactiveErrorConfig};
use formerr_reactive::Scope;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formerr")]
#[command(about = "Derive per-field validation messages for a form")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Apply a set of values and print the message for every field
    Check {
        /// Form definition file (YAML or JSON)
        form: PathBuf,

        /// JSON object of field values
        values: PathBuf,

        /// Message catalog file (YAML or JSON)
        #[arg(short, long)]
        messages: Option<PathBuf>,
    },

    /// Apply a sequence of value updates and print every message change
    Replay {
        /// Form definition file (YAML or JSON)
        form: PathBuf,

        /// JSON array of partial value objects, applied in order
        updates: PathBuf,

        /// Message catalog file (YAML or JSON)
        #[arg(short, long)]
        messages: Option<PathBuf>,

        /// Snapshot comparison used to suppress repeated messages
        #[arg(short, long, value_enum)]
        equality: Option<EqualityArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EqualityArg {
    Strict,
    ShallowKey,
}

impl From<EqualityArg> for ErrorEquality {
    fn from(arg: EqualityArg) -> Self {
        match arg {
            EqualityArg::Strict => ErrorEquality::Strict,
            EqualityArg::ShallowKey => ErrorEquality::ShallowKey,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            form,
            values,
            messages,
        } => check(&form, &values, messages.as_deref()),
        Commands::Replay {
            form,
            updates,
            messages,
            equality,
        } => replay(&form, &updates, messages.as_deref(), equality.map(Into::into)),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_form(path: &Path) -> anyhow::Result<FormGroup> {
    let definition = FormDefinition::from_file(path)
        .with_context(|| format!("failed to load form definition {}", path.display()))?;
    Ok(definition.build()?)
}

fn load_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn message_map(
    messages: Option<&Path>,
    equality: Option<ErrorEquality>,
) -> anyhow::Result<FormMessageMap> {
    let mut config = ReactiveErrorConfig::new();
    if let Some(path) = messages {
        let catalog = MessageCatalog::from_file(path)
            .with_context(|| format!("failed to load message catalog {}", path.display()))?;
        config = config.with_catalog(&catalog);
    }
    if let Some(equality) = equality {
        config = config.with_equality(equality);
    }
    Ok(FormMessageMap::from_config(config))
}

fn display(message: &str) -> &str {
    if message.is_empty() { "ok" } else { message }
}

fn check(form_path: &Path, values_path: &Path, messages: Option<&Path>) -> anyhow::Result<ExitCode> {
    let form = load_form(form_path)?;
    let values = load_json(values_path)?;
    form.patch_value(&values)?;
    tracing::info!("Checking {} with {}", form_path.display(), values_path.display());

    let scope = Scope::new();
    let cells = message_map(messages, None)?.cells(&form, &scope);

    let mut invalid = false;
    for name in form.control_names() {
        if let Some(cell) = cells.get(&name) {
            invalid |= cell.has_error();
            println!("{name}: {}", display(&cell.get()));
        }
    }

    Ok(if invalid {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn replay(
    form_path: &Path,
    updates_path: &Path,
    messages: Option<&Path>,
    equality: Option<ErrorEquality>,
) -> anyhow::Result<ExitCode> {
    let form = load_form(form_path)?;
    let updates = load_json(updates_path)?;
    let updates = updates
        .as_array()
        .context("updates must be a JSON array of objects")?;

    let streams = message_map(messages, equality)?.streams(&form);
    let mut subscriptions = Vec::with_capacity(streams.len());
    for name in form.control_names() {
        if let Some(stream) = streams.get(&name) {
            subscriptions.push(stream.subscribe(move |message| {
                println!("{name}: {}", display(message));
            }));
        }
    }

    for (idx, update) in updates.iter().enumerate() {
        tracing::debug!(step = idx + 1, "applying update");
        form.patch_value(update)
            .with_context(|| format!("update #{} is not a JSON object", idx + 1))?;
    }

    drop(subscriptions);
    Ok(ExitCode::SUCCESS)
}
