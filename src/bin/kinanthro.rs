//! kinanthro CLI - Command-line interface for the anthropometric engine
//!
//! Commands:
//! - reconcile: Reconcile the trials of one sitting (optionally finalize it)
//! - report: Build the comparison report for a client from stored records
//! - reference: Print the population reference table
//! - tolerances: Print the per-section trial tolerances

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use kinanthro::pipeline::{finalize_sitting_json, reconcile_sitting_json, AnthropometricEngine};
use kinanthro::types::{ClientProfile, Section, Sex};
use kinanthro::{EngineConfig, MissingDataPolicy, ReferenceTable, ENGINE_VERSION};

/// kinanthro - Compute engine for ISAK anthropometric measurement records
#[derive(Parser)]
#[command(name = "kinanthro")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Reconcile ISAK trials and build anthropometric reports", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON); defaults come from KINANTHRO_* variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// TDEE multiplier applied to BMR
    #[arg(long, global = true, env = "KINANTHRO_ACTIVITY_FACTOR")]
    activity_factor: Option<f64>,

    /// How missing measurements are treated by the calculators
    #[arg(long, global = true)]
    missing_data: Option<MissingDataArg>,

    /// Log verbosity when RUST_LOG is unset
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the trials of one sitting
    Reconcile {
        /// Sitting JSON file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Finalize into a measurement record instead of printing the outcome
        #[arg(long)]
        finalize: bool,
    },

    /// Build the report for a client's latest record
    Report {
        /// Backend records JSON file (use - for stdin)
        #[arg(short, long)]
        records: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Client identifier
        #[arg(long)]
        client_id: String,

        /// Client age in whole years
        #[arg(long)]
        age: u32,

        /// Client sex, used only by the sex-specific BMR equation
        #[arg(long)]
        sex: Option<SexArg>,
    },

    /// Print the population reference table
    Reference {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the per-section trial tolerances
    Tolerances {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MissingDataArg {
    /// Missing inputs make dependent outputs unavailable
    Strict,
    /// Missing inputs are read as zero
    ZeroFill,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SexArg {
    Female,
    Male,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), KinanthroCliError> {
    let config = load_config(
        cli.config.as_deref(),
        cli.activity_factor,
        cli.missing_data,
    )?;
    debug!(?config, "resolved engine configuration");

    match cli.command {
        Commands::Reconcile { input, finalize } => cmd_reconcile(&input, finalize, &config),

        Commands::Report {
            records,
            output,
            client_id,
            age,
            sex,
        } => {
            let profile = ClientProfile {
                client_id,
                age,
                sex: sex.map(|s| match s {
                    SexArg::Female => Sex::Female,
                    SexArg::Male => Sex::Male,
                }),
            };
            cmd_report(&records, &output, &profile, config)
        }

        Commands::Reference { json } => cmd_reference(json),

        Commands::Tolerances { json } => cmd_tolerances(&config, json),
    }
}

/// File config (or environment), then command-line overrides
fn load_config(
    path: Option<&Path>,
    activity_factor: Option<f64>,
    missing_data: Option<MissingDataArg>,
) -> Result<EngineConfig, KinanthroCliError> {
    let mut config = match path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => EngineConfig::from_env(),
    };

    if let Some(factor) = activity_factor {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(KinanthroCliError::InvalidArgument(format!(
                "activity factor must be positive, got {factor}"
            )));
        }
        config.activity_factor = factor;
    }

    if let Some(policy) = missing_data {
        config.missing_data_policy = match policy {
            MissingDataArg::Strict => MissingDataPolicy::Strict,
            MissingDataArg::ZeroFill => MissingDataPolicy::ZeroFill,
        };
    }

    config.validate()?;
    Ok(config)
}

fn read_input(path: &Path) -> Result<String, KinanthroCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: &Path, data: &str) -> Result<(), KinanthroCliError> {
    if path.to_string_lossy() == "-" {
        println!("{data}");
    } else {
        fs::write(path, data)?;
    }
    Ok(())
}

fn cmd_reconcile(
    input: &Path,
    finalize: bool,
    config: &EngineConfig,
) -> Result<(), KinanthroCliError> {
    let sitting_json = read_input(input)?;

    let output = if finalize {
        finalize_sitting_json(&sitting_json, config)?
    } else {
        reconcile_sitting_json(&sitting_json, config)?
    };

    println!("{output}");
    Ok(())
}

fn cmd_report(
    records: &Path,
    output: &Path,
    profile: &ClientProfile,
    config: EngineConfig,
) -> Result<(), KinanthroCliError> {
    let records_json = read_input(records)?;

    let mut engine = AnthropometricEngine::with_config(config);
    let imported = engine.import_records(&records_json)?;
    if imported == 0 {
        return Err(KinanthroCliError::NoRecords);
    }
    info!(imported, client_id = profile.client_id.as_str(), "records imported");

    let report = engine.report(profile)?;
    write_output(output, &report)
}

fn cmd_reference(json: bool) -> Result<(), KinanthroCliError> {
    let table = ReferenceTable::standard();

    if json {
        println!("{}", serde_json::to_string_pretty(table)?);
        return Ok(());
    }

    println!("{:<16} {:>8} {:>8} {:>4}", "metric", "mean", "sd", "dim");
    for entry in table.iter() {
        println!(
            "{:<16} {:>8.2} {:>8.2} {:>4}",
            entry.metric.as_str(),
            entry.mean,
            entry.standard_deviation,
            entry.dimension
        );
    }
    Ok(())
}

fn cmd_tolerances(config: &EngineConfig, json: bool) -> Result<(), KinanthroCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.tolerances)?);
        return Ok(());
    }

    for section in Section::ALL {
        let unit = section
            .metrics()
            .next()
            .map(|m| m.unit())
            .unwrap_or_default();
        println!(
            "{:<10} {:>5} {}",
            section.as_str(),
            config.tolerances.threshold(section),
            unit
        );
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum KinanthroCliError {
    Io(io::Error),
    Compute(kinanthro::ComputeError),
    Json(serde_json::Error),
    InvalidArgument(String),
    NoRecords,
}

impl From<io::Error> for KinanthroCliError {
    fn from(e: io::Error) -> Self {
        KinanthroCliError::Io(e)
    }
}

impl From<kinanthro::ComputeError> for KinanthroCliError {
    fn from(e: kinanthro::ComputeError) -> Self {
        KinanthroCliError::Compute(e)
    }
}

impl From<serde_json::Error> for KinanthroCliError {
    fn from(e: serde_json::Error) -> Self {
        KinanthroCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<KinanthroCliError> for CliError {
    fn from(e: KinanthroCliError) -> Self {
        match e {
            KinanthroCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            KinanthroCliError::Compute(e @ kinanthro::ComputeError::IncompleteMeasurement(_)) => {
                CliError {
                    code: "INCOMPLETE_MEASUREMENT".to_string(),
                    message: e.to_string(),
                    hint: Some("Enter a third trial for the listed metrics".to_string()),
                }
            }
            KinanthroCliError::Compute(e @ kinanthro::ComputeError::InvalidConfig(_)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: e.to_string(),
                hint: Some("Check tolerances, activity factor and bone mass fraction".to_string()),
            },
            KinanthroCliError::Compute(e @ kinanthro::ComputeError::Validation(_)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Correct the reading and resubmit".to_string()),
            },
            KinanthroCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            KinanthroCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            KinanthroCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: None,
            },
            KinanthroCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure the records file is not empty".to_string()),
            },
        }
    }
}
