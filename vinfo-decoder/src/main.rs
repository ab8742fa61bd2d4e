//! vinfo-decode - command-line vehicle decoder
//!
//! Decodes a VIN or registration plate and prints the outcome as JSON, or
//! maintains vehicle type templates.
//!
//! Exit codes: 0 decoded, 1 decode failed, 2 configuration or database error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vinfo_common::config::{read_config, TomlConfig};

use vinfo_decoder::db::init_database_pool;
use vinfo_decoder::db::templates::SqliteTemplateStore;
use vinfo_decoder::service_intervals::{generate_service_intervals, ServiceInterval};
use vinfo_decoder::templates::{MemoryTemplateStore, TemplateKey, TemplateStore, TemplateUpsert};
use vinfo_decoder::{DecodeOutcome, VehicleDecoder};

/// Command-line arguments for vinfo-decode
#[derive(Parser, Debug)]
#[command(name = "vinfo-decode")]
#[command(about = "Decode vehicles by VIN or registration plate")]
#[command(version)]
struct Cli {
    /// Config file (overrides VINFO_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a VIN from every available source
    Vin {
        vin: String,
        /// Include recommended service intervals
        #[arg(long)]
        intervals: bool,
    },
    /// Decode a registration plate through the registries
    Plate {
        plate: String,
        /// Include recommended service intervals
        #[arg(long)]
        intervals: bool,
    },
    /// Manage vehicle type templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// Create a template or update the one with the same key
    Upsert(UpsertArgs),
}

#[derive(Args, Debug)]
struct UpsertArgs {
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    engine_code: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    type_label: Option<String>,
    #[arg(long)]
    wheels_and_tyres: Option<String>,
    #[arg(long)]
    extra_records: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl From<UpsertArgs> for TemplateUpsert {
    fn from(args: UpsertArgs) -> Self {
        TemplateUpsert {
            key: TemplateKey {
                engine_code: args.engine_code,
                production_year: args.year,
                type_label: args.type_label,
                ..TemplateKey::new(args.make.trim(), args.model.trim())
            },
            wheels_and_tyres: args.wheels_and_tyres,
            extra_records: args.extra_records,
            default_notes: args.notes,
        }
    }
}

/// Decode outcome with optional service intervals
#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    outcome: DecodeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_intervals: Option<Vec<ServiceInterval>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = read_config(cli.config.as_deref());
    init_tracing(&loaded.config);
    loaded.log();
    let config = loaded.config;

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match runtime.block_on(run(cli.command, config)) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Log to stderr so stdout carries only JSON; `RUST_LOG` wins over config
fn init_tracing(config: &TomlConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(command: Command, config: TomlConfig) -> Result<ExitCode> {
    match command {
        Command::Vin { vin, intervals } => {
            let decoder = build_decoder(&config).await?;
            let outcome = decoder.decode_by_vin(&vin).await;
            print_report(outcome, intervals)
        }
        Command::Plate { plate, intervals } => {
            let decoder = build_decoder(&config).await?;
            let outcome = decoder.decode_by_plate(&plate).await;
            print_report(outcome, intervals)
        }
        Command::Template {
            action: TemplateAction::Upsert(args),
        } => {
            let store = open_sqlite_store(&config.database_path()).await?;
            let template = store.upsert_template(args.into()).await?;
            println!("{}", serde_json::to_string_pretty(&template)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn build_decoder(config: &TomlConfig) -> Result<VehicleDecoder> {
    let templates = open_template_store(config).await?;
    VehicleDecoder::from_config(config, templates).context("Failed to create vehicle decoder")
}

/// SQLite store when a database is configured or already exists, else in-memory
async fn open_template_store(config: &TomlConfig) -> Result<Arc<dyn TemplateStore>> {
    let db_path = config.database_path();
    if config.database_path.is_some() || db_path.exists() {
        Ok(Arc::new(open_sqlite_store(&db_path).await?))
    } else {
        info!("No template database found, templates disabled for this run");
        Ok(Arc::new(MemoryTemplateStore::new()))
    }
}

async fn open_sqlite_store(db_path: &Path) -> Result<SqliteTemplateStore> {
    info!("Database: {}", db_path.display());
    let pool = init_database_pool(db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(SqliteTemplateStore::new(pool))
}

fn print_report(outcome: DecodeOutcome, intervals: bool) -> Result<ExitCode> {
    let service_intervals = if intervals {
        outcome.record.as_ref().map(generate_service_intervals)
    } else {
        None
    };
    let code = if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };

    let report = Report {
        outcome,
        service_intervals,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(code)
}
