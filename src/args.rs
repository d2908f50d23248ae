//! Code to parse the command line using `clap`, and definitions of the parsed
//! result

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::compare::Method;
use crate::config::Limits;
use crate::generate::GenerationRequest;
use crate::report::{ColorChoice, Format};

/// Returns the parsed command line, exiting with a usage message if `clap`
/// rejects it. Fails if the config file can't be read or the comparison
/// method isn't implemented.
pub fn parsed() -> Result<Args> {
    CliArgs::parse().resolve()
}

/// Like `parsed`, but from an explicit argument list, and returning `clap`'s
/// complaints as errors instead of exiting.
pub fn parse_from<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(args)?.resolve()
}

/// The parsed command line.
#[derive(Debug, Clone)]
pub struct Args {
    /// What to do
    pub command: Command,
    /// Ceilings in force for this run
    pub limits: Limits,
    /// Colouring of the text report
    pub color: ColorChoice,
    /// Default log filter, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Report format
    pub format: Format,
}

/// A parsed subcommand.
#[derive(Debug, Clone)]
pub enum Command {
    /// Count the identifiers two files share
    Compare {
        /// First input file
        file1: PathBuf,
        /// Second input file
        file2: PathBuf,
        /// Equivalence to compare under
        method: Method,
    },
    /// Write two synthetic files with a chosen overlap
    Generate {
        /// Sizes and overlap
        request: GenerationRequest,
        /// Directory for the two files
        out_dir: PathBuf,
        /// File name prefix
        prefix: String,
    },
    /// Write the SHA-256 digest of each identifier in a file
    Hash {
        /// Input file
        file: PathBuf,
        /// Output file, defaulting to `<stem>.hashed.csv` beside the input
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "overlap", version)]
/// Count the records two files share, or generate files that share a chosen
/// fraction of their records
struct CliArgs {
    #[command(subcommand)]
    command: CliCommand,
    /// TOML file overriding `max_records`, `dedup_threshold` and `max_generated`
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Maximum records accepted from one input file
    #[arg(long, global = true, value_name = "N")]
    max_records: Option<usize>,
    /// Record count at which deduplication and generation stop using hash sets
    #[arg(long, global = true, value_name = "N")]
    dedup_threshold: Option<usize>,
    /// When to colour the report
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Count the records two files have in common
    Compare {
        /// First file: one record per line, optional `email` header
        file1: PathBuf,
        /// Second file
        file2: PathBuf,
        /// exact or hashed (fuzzy and encrypted are reserved)
        #[arg(short, long, default_value = "exact")]
        method: String,
    },
    /// Generate two files with a given overlap
    Generate {
        /// Records in the first file
        size1: usize,
        /// Records in the second file
        size2: usize,
        /// Percentage of the first file's records to put in both
        #[arg(allow_negative_numbers = true)]
        percent: f64,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// File name prefix; files are `<prefix>_1.csv` and `<prefix>_2.csv`
        #[arg(long, default_value = "test_data")]
        prefix: String,
    },
    /// Replace each record of a file by its SHA-256 digest
    Hash {
        /// File to hash
        file: PathBuf,
        /// Where to write the digests
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl CliArgs {
    fn resolve(self) -> Result<Args> {
        let mut limits = match &self.config {
            Some(path) => Limits::load(path)?,
            None => Limits::default(),
        };
        if let Some(n) = self.max_records {
            limits.max_records = n;
        }
        if let Some(n) = self.dedup_threshold {
            limits.dedup_threshold = n;
        }

        let command = match self.command {
            CliCommand::Compare { file1, file2, method } => {
                Command::Compare { file1, file2, method: method.parse()? }
            }
            CliCommand::Generate { size1, size2, percent, out_dir, prefix } => Command::Generate {
                request: GenerationRequest { size_a: size1, size_b: size2, overlap_percent: percent },
                out_dir,
                prefix,
            },
            CliCommand::Hash { file, output } => Command::Hash { file, output },
        };
        let format = if self.json { Format::Json } else { Format::Text };
        Ok(Args { command, limits, color: self.color, log_level: self.log_level, format })
    }
}
