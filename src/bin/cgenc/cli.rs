//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for cgenc.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Struct containing the CLI configuration for cgenc.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of cgenc.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// Also log warnings.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the compiler, e.g., which files are
    /// translated.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the pipeline.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, including per-phase traces.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Translate a source file into C11.
    Build(BuildArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// The path to the source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// Whether to dump the parsed AST (for debugging).
    #[arg(long)]
    pub dump_ast: bool,

    /// Whether to dump the lowered IR (for debugging).
    #[arg(long)]
    pub dump_ir: bool,

    /// The path to the output C file. Defaults to the input file with a `.c` extension.
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,
}
