//! Flanked regions derived from transcript records.
//!
//! All regions here are zero-based and half-open, as BED intervals are. A
//! record spanning the one-based closed interval `[start, end]` becomes
//! `[start - 1, end)`.

use crate::chrom::ChromSizes;
use crate::error::{GtfkitError, Result};
use crate::record::{FeatureRecord, OnMissing, Strand};
use std::fmt;
use std::str::FromStr;

/// Separator joining transcript and gene ids in region names.
pub const DEFAULT_NAME_SEP: &str = "||";

/// A zero-based half-open interval with BED6 payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub score: String,
    pub strand: Strand,
}

impl Region {
    #[inline(always)]
    pub fn overlaps(&self, other: &Region) -> bool {
        self.chrom == other.chrom && self.start < other.end && other.start < self.end
    }

    pub fn width(&self) -> u64 {
        self.end - self.start
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.start, self.end, self.name, self.score, self.strand
        )
    }
}

/// Which part of a transcript anchors the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionPolicy {
    /// Whole transcript body.
    Whole,
    /// Single base at the 5' end (TSS / promoter).
    FivePrime,
    /// Single base at the 3' end (TTS).
    ThreePrime,
}

impl RegionPolicy {
    /// Short label used in derived attribute names.
    pub fn label(self) -> &'static str {
        match self {
            RegionPolicy::Whole => "transcript",
            RegionPolicy::FivePrime => "promoter",
            RegionPolicy::ThreePrime => "tts",
        }
    }
}

impl FromStr for RegionPolicy {
    type Err = GtfkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "transcript" | "whole" => Ok(RegionPolicy::Whole),
            "promoter" | "tss" | "five_prime" => Ok(RegionPolicy::FivePrime),
            "tts" | "three_prime" => Ok(RegionPolicy::ThreePrime),
            _ => Err(GtfkitError::UnsupportedFormat(format!("region policy {s:?}"))),
        }
    }
}

impl fmt::Display for RegionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds region names out of record keys, e.g. `g1t1||g1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionNamer {
    pub keys: Vec<String>,
    pub sep: String,
}

impl Default for RegionNamer {
    fn default() -> Self {
        Self {
            keys: vec!["transcript_id".to_string(), "gene_id".to_string()],
            sep: DEFAULT_NAME_SEP.to_string(),
        }
    }
}

impl RegionNamer {
    /// Joins the key values, unset ones written as `.`.
    pub fn name(&self, record: &FeatureRecord) -> Result<String> {
        let values = record.get(&self.keys, OnMissing::SetNa)?;
        Ok(values.into_iter().flatten().collect::<Vec<_>>().join(self.sep.as_str()))
    }

    /// Splits a name built by [`RegionNamer::name`] into its first two parts.
    pub fn decode<'a>(&self, name: &'a str) -> Option<(&'a str, &'a str)> {
        let (first, rest) = name.split_once(self.sep.as_str())?;
        let second = rest.split(self.sep.as_str()).next().unwrap_or(rest);
        Some((first, second))
    }
}

/// Derives flanked regions for transcripts.
#[derive(Debug, Clone)]
pub struct RegionBuilder<'a> {
    pub upstream: u64,
    pub downstream: u64,
    pub policy: RegionPolicy,
    pub sizes: &'a ChromSizes,
    pub namer: RegionNamer,
}

impl<'a> RegionBuilder<'a> {
    pub fn new(policy: RegionPolicy, upstream: u64, downstream: u64, sizes: &'a ChromSizes) -> Self {
        Self {
            upstream,
            downstream,
            policy,
            sizes,
            namer: RegionNamer::default(),
        }
    }

    pub fn with_namer(mut self, namer: RegionNamer) -> Self {
        self.namer = namer;
        self
    }

    /// Unflanked anchor for `record` under `policy`.
    fn anchor(&self, record: &FeatureRecord) -> Result<(u64, u64)> {
        match self.policy {
            RegionPolicy::Whole => Ok((record.start.saturating_sub(1), record.end)),
            RegionPolicy::FivePrime => {
                let pos = record.five_prime_end()?;
                Ok((pos.saturating_sub(1), pos))
            }
            RegionPolicy::ThreePrime => {
                let pos = record.three_prime_end()?;
                Ok((pos.saturating_sub(1), pos))
            }
        }
    }

    /// Builds the flanked, clipped region of `record`.
    ///
    /// Upstream is taken against the transcription direction: on `+` it
    /// extends the lower coordinate, on `-` the upper one.
    ///
    /// # Arguments
    ///
    /// * `record` - Transcript record to anchor the region on
    ///
    /// # Returns
    ///
    /// Returns a zero-based half-open region clipped to `[0, chrom length]`.
    ///
    /// # Errors
    ///
    /// Returns `StrandRequired` when an unstranded record needs a strand
    /// (flanks or 5'/3' anchors), and `UnknownChromosome` when its chromosome
    /// is missing from the size table.
    pub fn build(&self, record: &FeatureRecord) -> Result<Region> {
        let (start, end) = self.anchor(record)?;

        let (left, right) = match record.strand {
            Strand::Forward => (self.upstream, self.downstream),
            Strand::Reverse => (self.downstream, self.upstream),
            Strand::Unknown if self.upstream == 0 && self.downstream == 0 => (0, 0),
            Strand::Unknown => {
                return Err(GtfkitError::StrandRequired(format!(
                    "cannot flank unstranded {} at {}:{}-{}",
                    record.feature_type, record.chrom, record.start, record.end
                )))
            }
        };

        let length = self.sizes.length(&record.chrom)?;
        let start = start.saturating_sub(left).min(length);
        let end = end.saturating_add(right).min(length);

        Ok(Region {
            chrom: record.chrom.clone(),
            start,
            end,
            name: self.namer.name(record)?,
            score: record.score.clone(),
            strand: record.strand,
        })
    }

    /// Whole-body, unflanked, unclipped region used as overlap reference.
    pub fn reference(&self, record: &FeatureRecord) -> Result<Region> {
        Ok(Region {
            chrom: record.chrom.clone(),
            start: record.start.saturating_sub(1),
            end: record.end,
            name: self.namer.name(record)?,
            score: record.score.clone(),
            strand: record.strand,
        })
    }
}
