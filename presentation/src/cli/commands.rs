//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for scoring and payment reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every cluster, answer and payment job
    Full,
    /// Totals only
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for crowdcontrol_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => crowdcontrol_domain::OutputFormat::Full,
            OutputFormat::Summary => crowdcontrol_domain::OutputFormat::Summary,
            OutputFormat::Json => crowdcontrol_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for crowdcontrol
#[derive(Parser, Debug)]
#[command(name = "crowdcontrol")]
#[command(author, version, about = "Quality control and payment for crowdsourcing experiments")]
#[command(long_about = r#"
crowdcontrol scores the answers and ratings of a crowdsourcing experiment
and pays the workers who took part.

When an experiment is stopped:
1. Duplicate Detection: near-identical answers are clustered; all but the
   earliest answer of each cluster get the lowest quality
2. Rating Quality: every rating is scored against the other ratings of its answer
3. Answer Quality: every remaining answer is scored from its good ratings
4. Payment: each worker is paid for their good answers and ratings

Configuration files are loaded from (in priority order):
1. CROWDCONTROL_* environment variables
2. --config <path>          Explicit config file
3. ./crowdcontrol.toml      Project-level config
4. ~/.config/crowdcontrol/config.toml   Global config

Example:
  crowdcontrol run --dataset experiment.json --experiment 1
  crowdcontrol validate --dataset experiment.json
  crowdcontrol algorithms
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (defaults to the config file, then "summary")
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Write the audit trail (JSONL) to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub audit: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stop an experiment: score its answers and ratings, then pay its workers
    Run {
        /// JSON dataset with experiments, workers, answers, ratings and images
        #[arg(short, long, value_name = "PATH")]
        dataset: PathBuf,

        /// Experiment to stop
        #[arg(short, long, value_name = "ID")]
        experiment: u64,
    },

    /// Check experiment configurations without scoring anything
    Validate {
        #[arg(short, long, value_name = "PATH")]
        dataset: PathBuf,

        /// Only check this experiment
        #[arg(short, long, value_name = "ID")]
        experiment: Option<u64>,
    },

    /// List the available quality algorithms and their parameters
    Algorithms,
}
