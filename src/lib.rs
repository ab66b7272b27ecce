//! # gtfkit
//!
//! Gene-annotation (GTF) record toolkit.
//!
//! The crate models GTF lines as [`FeatureRecord`]s holding an ordered
//! [`AttributeStore`], projects arbitrary keys into [`FieldSet`] rows, and
//! finds transcripts whose body, TSS or TTS region (extended by flanks)
//! overlaps a transcript from another gene.
//!
//! ## Usage
//!
//! ```rust, ignore
//! use gtfkit::{OverlapConfig, OverlapFlags, RegionPolicy};
//!
//! let config = OverlapConfig::new(
//!     "annotations.gtf".into(),
//!     "overlapping.gtf".into(),
//!     "chrom_sizes.txt".into(),
//!     4,
//!     1500,
//!     1500,
//!     RegionPolicy::FivePrime,
//!     OverlapFlags { annotate_gtf: true, ..Default::default() },
//! )?;
//!
//! let stats = gtfkit::overlapping::run(&config)?;
//! println!("Done in {:?}", stats.elapsed);
//! ```
//!
//! ## Examples
//!
//! ### Working with records directly
//!
//! ```rust, ignore
//! use gtfkit::{ChromSizes, OverlapEngine, ReferenceIndex, RegionBuilder, RegionPolicy, StrandFilter};
//!
//! let records = gtfkit::reader::read_records("annotations.gtf")?;
//! let sizes = ChromSizes::from_path("chrom_sizes.txt")?;
//! let transcripts: Vec<_> = records.iter().filter(|r| r.feature_type == "transcript").collect();
//!
//! let builder = RegionBuilder::new(RegionPolicy::ThreePrime, 2, 2, &sizes);
//! let queries = transcripts.iter().map(|r| builder.build(r)).collect::<Result<Vec<_>, _>>()?;
//! let index = ReferenceIndex::new(
//!     transcripts.iter().map(|r| builder.reference(r)).collect::<Result<Vec<_>, _>>()?,
//! );
//!
//! let overlaps = OverlapEngine::new(StrandFilter::Same).find(&queries, &index);
//! ```

pub mod chrom;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod fieldset;
pub mod merge;
pub mod overlap;
pub mod overlapping;
pub mod reader;
pub mod record;
pub mod region;
pub mod stats;
pub mod tabulate;

pub use chrom::ChromSizes;
pub use cli::{Args, Command};
pub use config::{OverlapConfig, OverlapFlags, TabulateConfig};
pub use error::{GtfkitError, Result};
pub use fieldset::{FieldSet, TableFilter};
pub use merge::{AnnotationMerger, MergeMode};
pub use overlap::{OverlapEngine, OverlapMap, OverlapSource, ReferenceIndex, StrandFilter};
pub use record::{
    AttributeStore, BedVariant, FeatureRecord, FormatOptions, Lookup, OnMissing, Strand,
};
pub use region::{Region, RegionBuilder, RegionNamer, RegionPolicy};
pub use stats::{max_mem_usage_mb, RunStats};
