//! router-manager - Reconcile an OpenShift router or edit YAML/JSON files.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use router_manager::cli::{CliOutput, OcClient};
use router_manager::config::{RouterConfig, State};
use router_manager::document::{ContentType, Document};
use router_manager::path::Separator;
use router_manager::router::{Router, RouterError};
use router_manager::telemetry;
use router_manager::value::{self, Value};

#[derive(Parser)]
#[command(name = "router-manager")]
#[command(about = "Declarative OpenShift router management", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<Level>,

    /// Log at debug level unless a level is given
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the router to the requested state
    Reconcile(ReconcileArgs),

    /// Read or change a YAML/JSON file by path
    Edit(EditArgs),
}

#[derive(Args)]
struct ReconcileArgs {
    /// Router parameter file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// present or absent
    #[arg(long)]
    state: Option<State>,

    /// Report what would change without changing anything
    #[arg(long)]
    check: bool,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    namespace: Option<String>,

    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Seconds to wait between deleting and recreating a drifted router
    #[arg(long, default_value_t = 15)]
    settle_seconds: u64,
}

#[derive(Args)]
struct EditArgs {
    /// File to edit; created on write when missing
    #[arg(short, long)]
    file: PathBuf,

    /// Path separator: one of . # | :
    #[arg(long, default_value = ".")]
    separator: Separator,

    /// Keep a .orig copy of the file before writing
    #[arg(long)]
    backup: bool,

    #[arg(long, default_value = "yaml")]
    content_type: ContentType,

    #[command(subcommand)]
    op: EditOp,
}

/// Values are parsed as YAML, so `1` is an integer and `{a: b}` a map.
#[derive(Subcommand)]
enum EditOp {
    Get {
        key: String,
    },
    Put {
        key: String,
        value: String,
    },
    Update {
        key: String,
        value: String,
        #[arg(long)]
        index: Option<i64>,
        #[arg(long)]
        curr_value: Option<String>,
    },
    Append {
        key: String,
        value: String,
    },
    Delete {
        key: String,
    },
    Exists {
        key: String,
        value: Option<String>,
    },
    Pop {
        key: String,
        value: String,
    },
}

#[derive(Serialize)]
struct EditResult {
    changed: bool,
    result: Value,
}

#[derive(Serialize)]
struct Failure {
    failed: bool,
    msg: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    results: Vec<CliOutput>,
}

fn parse_value(raw: &str) -> Result<Value> {
    value::from_yaml(raw).with_context(|| format!("cannot parse value '{}'", raw))
}

fn reconcile(args: ReconcileArgs) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => RouterConfig::from_file(path)?,
        None => RouterConfig::default(),
    };
    if let Some(state) = args.state {
        config.state = state;
    }
    if let Some(name) = args.name {
        config.name = name;
    }
    if let Some(namespace) = args.namespace {
        config.namespace = namespace;
    }
    if let Some(kubeconfig) = args.kubeconfig {
        config.kubeconfig = kubeconfig;
    }
    config.validate()?;

    let client = OcClient::new(config.namespace.clone(), &config.kubeconfig)
        .context("cannot set up the cluster client")?;
    let router = Router::new(config, client)
        .with_settle(Duration::from_secs(args.settle_seconds))
        .with_check_mode(args.check);

    let status = router.run()?;
    Ok(serde_json::to_string_pretty(&status)?)
}

fn edit(args: EditArgs) -> Result<String> {
    let mut doc = Document::open(&args.file, args.content_type)?
        .with_separator(args.separator)
        .with_backup(args.backup);

    let changed = match args.op {
        EditOp::Get { key } => {
            let result = doc.get(&key)?.cloned().unwrap_or_default();
            return render(false, result);
        }
        EditOp::Exists { key, value } => {
            let value = match value {
                Some(raw) => parse_value(&raw)?,
                None => Value::Null,
            };
            let found = doc.exists(&key, &value)?;
            return render(false, Value::Bool(found));
        }
        EditOp::Put { key, value } => doc.put(&key, parse_value(&value)?)?,
        EditOp::Update {
            key,
            value,
            index,
            curr_value,
        } => {
            let curr_value = curr_value.as_deref().map(parse_value).transpose()?;
            doc.update(&key, parse_value(&value)?, index, curr_value.as_ref())?
        }
        EditOp::Append { key, value } => doc.append(&key, parse_value(&value)?)?,
        EditOp::Delete { key } => doc.remove(&key)?,
        EditOp::Pop { key, value } => doc.pop(&key, &parse_value(&value)?)?,
    };

    if changed {
        doc.write()
            .with_context(|| format!("cannot write {}", args.file.display()))?;
    }
    render(changed, doc.into_root())
}

fn render(changed: bool, result: Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&EditResult { changed, result })?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Err(e) = telemetry::init(cli.log_level, default_level) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let outcome = match cli.command {
        Commands::Reconcile(args) => reconcile(args),
        Commands::Edit(args) => edit(args),
    };

    match outcome {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let results = err
                .downcast_ref::<RouterError>()
                .map(|e| e.results().to_vec())
                .unwrap_or_default();
            let failure = Failure {
                failed: true,
                msg: format!("{:#}", err),
                results,
            };
            match serde_json::to_string_pretty(&failure) {
                Ok(json) => println!("{}", json),
                Err(_) => eprintln!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
