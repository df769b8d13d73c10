//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// channelgen - typed channel adapters over generic payloads
#[derive(Parser, Debug)]
#[command(
    name = "channelgen",
    author,
    version,
    about = "Generate typed channel adapters from contract descriptors",
    long_about = "Reads contract descriptors (TOML or JSON), flattens each contract's \n\
                  method table and emits Rust emitters, dispatch tables and \n\
                  dispatchers that carry calls as discriminated payloads."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CHANNELGEN_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "CHANNELGEN_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging settings implied by `-v`, `-q` and `--log-format`
    pub fn observability_config(&self) -> ObservabilityConfig {
        let default_log_level = if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };

        ObservabilityConfig::new(self.log_format.into(), default_log_level)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate adapter source from a descriptor file
    Generate(GenerateArgs),

    /// Validate a descriptor file without writing anything
    Validate(ValidateArgs),

    /// Display flattened method tables
    Info(InfoArgs),
}

/// Arguments for the `generate` command
#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to descriptor file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "contracts.toml",
        env = "CHANNELGEN_CONTRACTS"
    )]
    pub contracts: PathBuf,

    /// Output file; generated source goes to stdout when omitted
    #[arg(short, long, env = "CHANNELGEN_OUT")]
    pub out: Option<PathBuf>,

    /// Generate adapters only for these contracts (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Parameter inspector applied before generation
    #[arg(long, value_enum, default_value = "none", env = "CHANNELGEN_INSPECTOR")]
    pub inspector: InspectorKind,

    /// Crate path generated code uses for runtime types
    #[arg(
        long,
        default_value = codegen::DEFAULT_RUNTIME_CRATE,
        env = "CHANNELGEN_RUNTIME_CRATE"
    )]
    pub runtime_crate: String,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to descriptor file to validate
    #[arg(short, long, default_value = "contracts.toml")]
    pub contracts: PathBuf,

    /// Parameter inspector applied during the dry run
    #[arg(long, value_enum, default_value = "none")]
    pub inspector: InspectorKind,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to descriptor file
    #[arg(short, long, default_value = "contracts.toml")]
    pub contracts: PathBuf,

    /// Show only this contract
    #[arg(long, value_name = "NAME")]
    pub contract: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parameter inspector selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InspectorKind {
    /// Accept every parameter
    #[default]
    None,
    /// Reject parameters of `other` types
    WireTypes,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
