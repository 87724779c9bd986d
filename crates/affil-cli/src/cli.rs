//! CLI argument definitions for `affil-recon`.

use std::path::PathBuf;

use affil_cli::config::HarvestOverrides;
use affil_match::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "affil-recon",
    version,
    about = "Reconcile Crossref affiliation strings with ROR registry labels",
    long_about = "Reconcile Crossref affiliation strings with ROR registry labels.\n\n\
                  harvest        page through the Crossref works API and collect affiliations\n\
                  extract-labels flatten registry names, labels, acronyms and aliases\n\
                  match          score each affiliation against its organization's labels\n\
                  menu           run the steps interactively"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: ./affil-recon.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Harvest affiliation records from the Crossref works API.
    Harvest(HarvestArgs),

    /// Extract registry labels for a list of canonical IDs.
    ExtractLabels(ExtractArgs),

    /// Match harvested affiliations against extracted labels.
    Match(MatchArgs),

    /// Run the interactive menu.
    Menu,
}

#[derive(Args)]
pub struct HarvestArgs {
    /// Works endpoint URL.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Crossref filter expression.
    #[arg(long, value_name = "FILTER")]
    pub filter: Option<String>,

    /// Contact email sent with every request.
    #[arg(long, value_name = "EMAIL")]
    pub mailto: Option<String>,

    /// Page size (1-1000).
    #[arg(long, value_name = "N")]
    pub rows: Option<u32>,

    /// Expected number of results; sets the planned page count.
    #[arg(long = "expected-total", value_name = "N")]
    pub expected_total: Option<u64>,

    /// Pause after every page, in seconds.
    #[arg(long = "delay-secs", value_name = "SECS")]
    pub delay_secs: Option<u64>,

    /// Resume from a cursor reported by an earlier run.
    #[arg(long = "start-cursor", value_name = "CURSOR")]
    pub start_cursor: Option<String>,

    /// Directory for affiliations.json and ror_ids.txt.
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
}

impl HarvestArgs {
    pub fn overrides(&self) -> HarvestOverrides {
        HarvestOverrides {
            endpoint: self.endpoint.clone(),
            filter: self.filter.clone(),
            mailto: self.mailto.clone(),
            rows: self.rows,
            expected_total: self.expected_total,
            delay_secs: self.delay_secs,
            start_cursor: self.start_cursor.clone(),
        }
    }
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Newline-delimited canonical IDs.
    #[arg(long, value_name = "PATH")]
    pub ids: PathBuf,

    /// Registry dump (JSON array).
    #[arg(long, value_name = "PATH")]
    pub dump: PathBuf,

    /// Label table to write (TSV).
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct MatchArgs {
    /// Harvested records (affiliations.json).
    #[arg(long, value_name = "PATH")]
    pub records: PathBuf,

    /// Label table written by extract-labels.
    #[arg(long, value_name = "PATH")]
    pub labels: PathBuf,

    /// Result table to write.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Output format (default: from the output extension, else tsv).
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Minimum score for a label to be considered (0-100).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub cutoff: Option<u8>,
}

impl MatchArgs {
    pub fn output_format(&self) -> OutputFormat {
        match self.format {
            Some(FormatArg::Tsv) => OutputFormat::Tsv,
            Some(FormatArg::Csv) => OutputFormat::Csv,
            None => OutputFormat::from_path(&self.output).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Tsv,
    Csv,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
