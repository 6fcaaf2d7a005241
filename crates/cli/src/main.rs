use crate::{
    commands::{Commands, InputFormat, RunArgs},
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use connectors::{
    CsvRecordReader, FileRecordReader, FileRecordWriter, StandardOutputRecordWriter,
};
use engine_config::{
    report::callback::{CallbackMonitor, ENV_CALLBACK_URL},
    settings::JobSettings,
};
use engine_core::telemetry::init_tracing;
use engine_processing::{
    CompositeRecordProcessor,
    filter::{EmptyRecordFilter, HeaderRecordFilter, PredicateFilter},
};
use engine_runtime::{BatchJob, JobBuilder};
use model::{execution::parameters::JobParameters, records::record::Record};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

mod commands;
mod env;
mod error;
mod output;
mod shutdown;

const DEFAULT_CONFIG_FILE: &str = ".batchjob/job.json";

#[derive(Parser)]
#[command(name = "batchjob", version, about = "Read-process-write batch jobs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let code = match execute(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "batchjob failed");
            eprintln!("Error: {e}");
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

async fn execute(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Run(args) => run_job(args).await,
        Commands::Config { config, env_file } => {
            let env = load_env(env_file.as_deref())?;
            let parameters = effective_parameters(config.as_deref(), &env, JobSettings::default())?;
            let json = serde_json::to_string_pretty(&parameters)?;
            println!("{json}");
            if let Some(url) = env.display_value(ENV_CALLBACK_URL) {
                println!("{ENV_CALLBACK_URL}={url}");
            }
            Ok(ExitCode::Success)
        }
    }
}

async fn run_job(args: RunArgs) -> Result<ExitCode, CliError> {
    let env = load_env(args.env_file.as_deref())?;
    let parameters = effective_parameters(args.config.as_deref(), &env, args.overrides())?;

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let job = build_job(&args, parameters, &env, shutdown.cancel_token())?;
    info!(input = %args.input.display(), "Running job '{}'", job.name());
    let report = job.run().await?;

    if let Some(path) = &args.report {
        output::write_report(&report, path).await?;
    }
    output::print_report(&report, args.json, args.output.is_none())?;

    Ok(ExitCode::for_run(
        report.status(),
        shutdown.is_shutdown_requested(),
    ))
}

fn build_job(
    args: &RunArgs,
    parameters: JobParameters,
    env: &EnvManager,
    cancel: CancellationToken,
) -> Result<BatchJob, CliError> {
    let include = args.include.clone();
    let processors = CompositeRecordProcessor::new()
        .add_if(args.skip_header, || HeaderRecordFilter)
        .add_if(args.skip_empty, || EmptyRecordFilter)
        .add_if(include.is_some(), move || {
            let needle = include.unwrap_or_default();
            PredicateFilter::new(move |record: &Record| record.payload_text().contains(&needle))
        });

    let mut builder = JobBuilder::new()
        .parameters(parameters.clone())
        .processor(processors)
        .cancellation(cancel);

    builder = match args.format {
        InputFormat::Lines => builder.reader(FileRecordReader::new(&args.input)),
        InputFormat::Csv => builder.reader(CsvRecordReader::new(&args.input)),
    };

    builder = match &args.output {
        Some(path) => builder.writer(FileRecordWriter::new(path)),
        None => builder.writer(StandardOutputRecordWriter::new()),
    };

    if parameters.monitoring_enabled {
        match CallbackMonitor::from_lookup(|key| env.get(key)) {
            Ok(monitor) => builder = builder.monitor(monitor),
            Err(e) => debug!(error = %e, "Reporting job progress through logs only"),
        }
    }

    Ok(builder.build()?)
}

fn load_env(env_file: Option<&Path>) -> Result<EnvManager, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }
    Ok(env)
}

/// Defaults < settings file < environment < command line.
fn effective_parameters(
    config: Option<&Path>,
    env: &EnvManager,
    overrides: JobSettings,
) -> Result<JobParameters, CliError> {
    let file = match config.map(Path::to_path_buf).or_else(default_config_file) {
        Some(path) => JobSettings::from_file(&path)?,
        None => JobSettings::default(),
    };
    let from_env = JobSettings::from_lookup(|key| env.get(key))?;

    Ok(file.merge(from_env).merge(overrides).into_parameters()?)
}

/// `~/.batchjob/job.json`, when it exists.
fn default_config_file() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(DEFAULT_CONFIG_FILE);
    path.is_file().then_some(path)
}
