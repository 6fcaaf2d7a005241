use clap::{Args, Subcommand, ValueEnum};
use engine_config::settings::JobSettings;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a job over a line-oriented or CSV input file
    Run(RunArgs),

    /// Print the effective job parameters as JSON
    Config {
        #[arg(long, help = "JSON settings file")]
        config: Option<PathBuf>,

        #[arg(long, help = "Load variables from this .env file")]
        env_file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputFormat {
    /// One record per line
    #[default]
    Lines,
    /// One record per CSV row, keyed by the header row
    Csv,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(long, help = "Input file")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = InputFormat::Lines)]
    pub format: InputFormat,

    #[arg(long, help = "Output file; records go to stdout when omitted")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "JSON settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Load variables from this .env file")]
    pub env_file: Option<PathBuf>,

    #[arg(long, help = "Job name")]
    pub name: Option<String>,

    #[arg(long, help = "Maximum number of records per batch")]
    pub batch_size: Option<usize>,

    #[arg(long, help = "Number of processing errors tolerated before aborting")]
    pub error_threshold: Option<u64>,

    #[arg(long, help = "Publish report updates while the job runs")]
    pub monitoring: bool,

    #[arg(long, help = "Drop the first record of the input")]
    pub skip_header: bool,

    #[arg(long, help = "Drop empty records")]
    pub skip_empty: bool,

    #[arg(long, help = "Keep only records containing this text")]
    pub include: Option<String>,

    #[arg(long, help = "Write the final report as JSON to this file")]
    pub report: Option<PathBuf>,

    #[arg(long, help = "Print the final report as JSON instead of a table")]
    pub json: bool,
}

impl RunArgs {
    /// Settings given on the command line; they take precedence over every other source.
    pub fn overrides(&self) -> JobSettings {
        JobSettings {
            name: self.name.clone(),
            batch_size: self.batch_size,
            error_threshold: self.error_threshold,
            monitoring: self.monitoring.then_some(true),
        }
    }
}
