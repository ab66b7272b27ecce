use crate::cli::{OverlapArgs, TabulateArgs};
use crate::error::Result;
use crate::fieldset::TableFilter;
use crate::merge::{default_key_name, MergeMode};
use crate::overlap::StrandFilter;
use crate::record::FormatOptions;
use crate::region::RegionPolicy;
use std::path::PathBuf;

/// Normalized configuration for an `overlapping` run.
///
/// Building it through [`OverlapConfig::new`] rejects mutually exclusive
/// options before any input is opened.
#[derive(Clone, Debug)]
pub struct OverlapConfig {
    /// Input GTF path.
    pub input: PathBuf,
    /// Output GTF path.
    pub output: PathBuf,
    /// Chromosome sizes path.
    pub chrom_info: PathBuf,
    /// Number of threads to use.
    pub threads: usize,
    /// Bases added in 5'.
    pub upstream: u64,
    /// Bases added in 3'.
    pub downstream: u64,
    /// Region anchored on each transcript.
    pub policy: RegionPolicy,
    /// Strand constraint on overlapping pairs.
    pub strand_filter: StrandFilter,
    /// Keep, invert or annotate.
    pub mode: MergeMode,
    /// Output formatting switches.
    pub format: FormatOptions,
}

/// Raw overlap switches before validation.
#[derive(Clone, Debug, Default)]
pub struct OverlapFlags {
    pub same_strandedness: bool,
    pub diff_strandedness: bool,
    pub invert_match: bool,
    pub annotate_gtf: bool,
    pub key_name: Option<String>,
}

impl OverlapConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        input: PathBuf,
        output: PathBuf,
        chrom_info: PathBuf,
        threads: usize,
        upstream: u64,
        downstream: u64,
        policy: RegionPolicy,
        flags: OverlapFlags,
    ) -> Result<Self> {
        let key_name = flags
            .key_name
            .unwrap_or_else(|| default_key_name(policy, upstream, downstream));

        let mode = MergeMode::from_flags(flags.invert_match, flags.annotate_gtf, key_name)?;
        let strand_filter =
            StrandFilter::from_flags(flags.same_strandedness, flags.diff_strandedness)?;

        Ok(Self {
            input,
            output,
            chrom_info,
            threads,
            upstream,
            downstream,
            policy,
            strand_filter,
            mode,
            format: FormatOptions::default(),
        })
    }

    /// Builds an overlap config from CLI arguments.
    pub fn from_args(args: &OverlapArgs, threads: usize) -> Result<Self> {
        let flags = OverlapFlags {
            same_strandedness: args.same_strandedness,
            diff_strandedness: args.diff_strandedness,
            invert_match: args.invert_match,
            annotate_gtf: args.annotate_gtf,
            key_name: args.key_name.clone(),
        };

        let mut config = Self::new(
            args.input.clone(),
            args.output.clone(),
            args.chrom_info.clone(),
            threads,
            args.upstream,
            args.downstream,
            args.feature_type.parse()?,
            flags,
        )?;
        config.format.add_chr = args.add_chr;
        Ok(config)
    }
}

/// Normalized configuration for a `tabulate` run.
#[derive(Clone, Debug)]
pub struct TabulateConfig {
    /// Input GTF path.
    pub input: PathBuf,
    /// Output table path.
    pub output: PathBuf,
    /// Number of threads to use.
    pub threads: usize,
    /// Keys to project; `None` selects every key.
    pub keys: Option<Vec<String>>,
    /// Include basic columns when every key is selected.
    pub with_basic: bool,
    /// Output field separator.
    pub separator: String,
    /// Write the header line.
    pub header: bool,
    /// Row filters.
    pub filter: TableFilter,
}

impl TabulateConfig {
    /// Builds a tabulate config from CLI arguments.
    pub fn from_args(args: &TabulateArgs, threads: usize) -> Self {
        let key = if args.select_transcript_ids {
            "transcript_id"
        } else if args.select_gene_ids {
            "gene_id"
        } else if args.select_gene_names {
            "gene_name"
        } else if args.select_exon_ids {
            "exon_id"
        } else {
            args.key.as_str()
        };

        Self {
            input: args.input.clone(),
            output: args.output.clone(),
            threads,
            keys: parse_keys(key),
            with_basic: !args.no_basic,
            separator: unescape_separator(&args.separator),
            header: !args.no_header,
            filter: TableFilter {
                unique: args.unique,
                drop_unset: args.no_unset,
                drop_undefined: !args.accept_undef,
            },
        }
    }
}

/// Splits a comma-separated key list; `all` and `*` map to `None`.
pub fn parse_keys(key: &str) -> Option<Vec<String>> {
    match key.trim() {
        "all" | "*" => None,
        list => Some(
            list.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        ),
    }
}

/// Turns a literal `\t` typed on the command line into a tab.
fn unescape_separator(sep: &str) -> String {
    match sep {
        "\\t" => "\t".to_string(),
        other => other.to_string(),
    }
}
