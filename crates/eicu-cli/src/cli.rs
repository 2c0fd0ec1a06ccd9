//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use eicu_cli::config::{BuildOverrides, ServerOverrides};
use eicu_mcp::Transport;

#[derive(Parser)]
#[command(
    name = "eicu",
    version,
    about = "eICU patient table builder and MCP server",
    long_about = "Join the eICU demo tables into one row per ICU stay and serve the result.\n\n\
                  The merged table carries APACHE severity scores, lab counts and critical lab\n\
                  flags, vital sign summaries and an expired flag. It is exposed to MCP clients\n\
                  through the get_schema, get_head and filter_rows tools."
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

    /// TOML configuration file; command-line flags take precedence over it.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the merged patient table and write it as CSV.
    Build(BuildArgs),

    /// Build (or load) the merged table and serve it over MCP.
    Serve(ServeArgs),

    /// Print the columns and types of a merged table.
    Schema(TableArgs),

    /// Run a single filter against a merged table and print matching rows as JSON.
    Query(QueryArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Directory containing patient.csv, apachePatientResult.csv, apacheApsVar.csv, lab.csv and vitalPeriodic.csv.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path of the merged CSV (default: complete_patient_data.csv).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl BuildArgs {
    pub fn overrides(&self) -> BuildOverrides {
        BuildOverrides {
            data_dir: self.data_dir.clone(),
            output: self.output.clone(),
        }
    }
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Serve an existing merged CSV instead of building one.
    #[arg(long = "table", value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Interface to bind for the HTTP transport (default: 0.0.0.0).
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Port for the HTTP transport (default: 8001).
    #[arg(long = "port")]
    pub port: Option<u16>,

    /// Mount path for the HTTP transport (default: /mcp).
    #[arg(long = "path")]
    pub path: Option<String>,

    /// MCP transport.
    #[arg(long = "transport", value_enum)]
    pub transport: Option<TransportArg>,
}

impl ServeArgs {
    pub fn overrides(&self) -> ServerOverrides {
        ServerOverrides {
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            transport: self.transport.map(Transport::from),
        }
    }
}

#[derive(Args)]
pub struct TableArgs {
    /// Merged CSV to read (default: the configured output path).
    #[arg(long = "table", value_name = "PATH")]
    pub table: Option<PathBuf>,
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Column to filter on.
    pub column: String,

    /// One of: ==, !=, >, <, >=, <=, contains, in.
    pub operator: String,

    /// Filter value, parsed as JSON when possible (e.g. 141296, "141296", [1,2], true).
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TransportArg {
    Http,
    Stdio,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Http => Transport::Http,
            TransportArg::Stdio => Transport::Stdio,
        }
    }
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
