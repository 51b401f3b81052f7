//! CLI argument definitions for the ETD batch converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "etd-batch",
    version,
    about = "ETD Batch Converter - Convert thesis submission packages to batch XML",
    long_about = "Convert a batch archive of electronic thesis and dissertation\n\
                  submission packages into a single merged batch-import XML file.\n\n\
                  Each submission's metadata is transformed with an XSLT stylesheet,\n\
                  enriched with majors read from the first pages of the thesis PDF,\n\
                  and validated against a controlled list of majors."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// Process a batch archive and generate the merged batch XML.
    Batch(BatchArgs),

    /// List the controlled vocabulary of majors.
    Majors(MajorsArgs),
}

#[derive(Parser)]
pub struct BatchArgs {
    /// Path to the batch archive: a zip holding one zip per submission.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Path of the merged batch XML output.
    #[arg(long = "output", value_name = "PATH", default_value = "outfile.xml")]
    pub output: PathBuf,

    /// Path of the invalid-majors CSV report.
    #[arg(
        long = "report",
        value_name = "PATH",
        default_value = "invalidmajors.csv"
    )]
    pub report: PathBuf,

    /// Controlled list of majors (single-column CSV, no header).
    #[arg(
        long = "majors-list",
        value_name = "PATH",
        default_value = "data/ListofMajors.csv"
    )]
    pub majors_list: PathBuf,

    /// XSLT stylesheet mapping vendor metadata to the batch-import schema.
    #[arg(
        long = "stylesheet",
        value_name = "PATH",
        default_value = "data/etd_transform.xsl"
    )]
    pub stylesheet: PathBuf,

    /// Saxon jar used to execute the stylesheet.
    #[arg(long = "saxon-jar", value_name = "PATH", default_value = "saxon9.jar")]
    pub saxon_jar: PathBuf,

    /// Number of leading PDF pages scanned for major declarations
    /// (0 skips PDF text extraction entirely).
    #[arg(long = "pdf-pages", value_name = "N", default_value_t = 8)]
    pub pdf_pages: usize,

    /// Validate every extracted major against the controlled list.
    ///
    /// By default only the first major of a multi-major submission is
    /// checked, matching the behavior of the legacy review workflow.
    #[arg(long = "validate-all-majors")]
    pub validate_all_majors: bool,

    /// Parse, transform, and validate without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct MajorsArgs {
    /// Controlled list of majors (single-column CSV, no header).
    #[arg(
        long = "majors-list",
        value_name = "PATH",
        default_value = "data/ListofMajors.csv"
    )]
    pub majors_list: PathBuf,
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
