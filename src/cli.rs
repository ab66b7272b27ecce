//! Command-line surface of gtfkit
//! Alejandro Gonzales-Irribarren, 2025

use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug)]
#[clap(
    name = "gtfkit",
    version = env!("CARGO_PKG_VERSION"),
    author = "Alejandro Gonzales-Irribarren <alejandrxgzi@gmail.com>",
    about = "GTF record toolkit: attribute tables and cross-gene overlaps"
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// Number of threads to use; default is the number of logical CPUs.
    #[clap(
        short = 'j',
        long,
        help = "Number of threads",
        value_name = "THREADS",
        default_value_t = num_cpus::get(),
        global = true
    )]
    pub threads: usize,

    /// Logging verbosity.
    #[clap(
        short = 'L',
        long,
        help = "Logging level [trace, debug, info, warn, error]",
        value_name = "LEVEL",
        default_value = "info",
        global = true
    )]
    pub level: LevelFilter,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find transcripts whose body/TSS/TTS region, extended in 5' and 3',
    /// overlaps any transcript from another gene.
    Overlapping(OverlapArgs),
    /// Convert a GTF to tabulated format.
    Tabulate(TabulateArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OverlapArgs {
    #[clap(
        short = 'i',
        long = "input",
        help = "Path to GTF file (.gtf or .gtf.gz)",
        value_name = "GTF",
        required = true
    )]
    pub input: PathBuf,

    #[clap(
        short = 'o',
        long = "output",
        help = "Path to output GTF file",
        value_name = "GTF",
        required = true
    )]
    pub output: PathBuf,

    /// Tab-separated file with chromosome names and sizes.
    #[clap(
        short = 'c',
        long = "chrom-info",
        help = "Chromosome sizes (name<TAB>length)",
        value_name = "CHROMINFO",
        required = true
    )]
    pub chrom_info: PathBuf,

    #[clap(
        short = 'u',
        long,
        help = "Extend the region in 5' by this many bases",
        value_name = "UPSTREAM",
        default_value_t = 1500
    )]
    pub upstream: u64,

    #[clap(
        short = 'd',
        long,
        help = "Extend the region in 3' by this many bases",
        value_name = "DOWNSTREAM",
        default_value_t = 1500
    )]
    pub downstream: u64,

    #[clap(
        short = 't',
        long = "feature-type",
        help = "The feature of interest",
        value_name = "FEATURE",
        default_value = "transcript",
        value_parser = ["transcript", "promoter", "tts"]
    )]
    pub feature_type: String,

    #[clap(short = 's', long = "same-strandedness", help = "Require same strandedness")]
    pub same_strandedness: bool,

    #[clap(short = 'S', long = "diff-strandedness", help = "Require different strandedness")]
    pub diff_strandedness: bool,

    #[clap(short = 'n', long = "invert-match", help = "Report transcripts without overlap")]
    pub invert_match: bool,

    #[clap(
        short = 'a',
        long = "annotate-gtf",
        help = "Print every input line, tagging overlapping transcripts"
    )]
    pub annotate_gtf: bool,

    #[clap(
        short = 'k',
        long = "key-name",
        help = "Attribute name used by --annotate-gtf",
        value_name = "KEY"
    )]
    pub key_name: Option<String>,

    #[clap(long = "add-chr", help = "Prefix chromosome names with 'chr' on output")]
    pub add_chr: bool,
}

#[derive(ClapArgs, Debug, Clone)]
#[clap(group(ArgGroup::new("shortcut").multiple(false)))]
pub struct TabulateArgs {
    #[clap(
        short = 'i',
        long = "input",
        help = "Path to GTF file (.gtf or .gtf.gz)",
        value_name = "GTF",
        required = true
    )]
    pub input: PathBuf,

    #[clap(
        short = 'o',
        long = "output",
        help = "Path to output table",
        value_name = "TXT",
        required = true
    )]
    pub output: PathBuf,

    /// Comma-separated keys; `all` or `*` selects every key.
    #[clap(
        short = 'k',
        long = "key",
        help = "A comma separated list of key names",
        value_name = "KEY,KEY,...",
        default_value = "*"
    )]
    pub key: String,

    #[clap(
        short = 's',
        long = "separator",
        help = "The output field separator",
        value_name = "SEPARATOR",
        default_value = "\t"
    )]
    pub separator: String,

    #[clap(short = 'u', long, help = "Print a non redundant list of lines")]
    pub unique: bool,

    #[clap(short = 'H', long = "no-header", help = "Don't print the header line")]
    pub no_header: bool,

    #[clap(short = 'n', long = "no-unset", help = "Don't print lines containing '.'")]
    pub no_unset: bool,

    #[clap(
        short = 'x',
        long = "accept-undef",
        help = "Print lines for which a key is undefined ('?')"
    )]
    pub accept_undef: bool,

    #[clap(
        short = 'b',
        long = "no-basic",
        help = "With 'all' or '*', don't write basic columns"
    )]
    pub no_basic: bool,

    #[clap(short = 't', long = "select-transcript-ids", group = "shortcut", help = "Shortcut for -k transcript_id")]
    pub select_transcript_ids: bool,

    #[clap(short = 'g', long = "select-gene-ids", group = "shortcut", help = "Shortcut for -k gene_id")]
    pub select_gene_ids: bool,

    #[clap(short = 'a', long = "select-gene-names", group = "shortcut", help = "Shortcut for -k gene_name")]
    pub select_gene_names: bool,

    #[clap(short = 'e', long = "select-exon-ids", group = "shortcut", help = "Shortcut for -k exon_id")]
    pub select_exon_ids: bool,
}

impl Args {
    /// Checks all the arguments for validity using validate_args()
    pub fn check(&self) -> Result<(), ArgError> {
        self.validate_args()
    }

    /// Checks the number of threads for validity. The number of threads must be greater than 0
    /// and less than or equal to the number of logical CPUs.
    fn check_threads(&self) -> Result<(), ArgError> {
        if self.threads == 0 {
            let err = "number of threads must be greater than 0".to_string();
            Err(ArgError::InvalidThreads(err))
        } else if self.threads > num_cpus::get() {
            let err = "number of threads must be less than or equal to the number of logical CPUs"
                .to_string();
            Err(ArgError::InvalidThreads(err))
        } else {
            Ok(())
        }
    }

    /// Validates all the arguments
    fn validate_args(&self) -> Result<(), ArgError> {
        self.check_threads()?;
        match &self.command {
            Command::Overlapping(args) => {
                check_input(&args.input)?;
                check_input(&args.chrom_info)?;
                check_output(&args.output, &["gtf"])
            }
            Command::Tabulate(args) => {
                check_input(&args.input)?;
                check_output(&args.output, &["txt", "csv", "tab", "tsv"])
            }
        }
    }
}

/// The file must exist and be non-empty.
fn check_input(path: &Path) -> Result<(), ArgError> {
    if !path.exists() {
        let err = format!("file {:?} does not exist", path);
        return Err(ArgError::InvalidInput(err));
    }

    let len = std::fs::metadata(path)
        .map_err(|e| ArgError::InvalidInput(format!("cannot stat {:?}: {e}", path)))?
        .len();
    if len == 0 {
        let err = format!("file {:?} is empty", path);
        Err(ArgError::InvalidInput(err))
    } else {
        Ok(())
    }
}

/// Checks the output extension (case-insensitive) against `allowed`.
fn check_output(path: &Path, allowed: &[&str]) -> Result<(), ArgError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => {
            let err = format!("file {:?} should end with one of {:?}", path, allowed);
            Err(ArgError::InvalidOutput(err))
        }
    }
}

#[derive(Debug, Error)]
pub enum ArgError {
    /// The input file does not exist or is empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The output file has an unexpected extension.
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    /// The number of threads is invalid.
    #[error("Invalid number of threads: {0}")]
    InvalidThreads(String),
}
