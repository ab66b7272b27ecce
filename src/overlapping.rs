use crate::chrom::ChromSizes;
use crate::config::OverlapConfig;
use crate::error::Result;
use crate::merge::AnnotationMerger;
use crate::overlap::{OverlapEngine, OverlapMap, ReferenceIndex};
use crate::reader::read_records;
use crate::record::{FeatureRecord, FormatOptions, NA};
use crate::region::{Region, RegionBuilder};
use crate::stats::{RunStats, RunTimer};
use rayon::prelude::*;
use std::io::{BufWriter, Write};
use std::path::Path;

const TRANSCRIPT: &str = "transcript";

/// Runs the `overlapping` pipeline with the provided configuration.
///
/// Reads the GTF and chromosome sizes, builds one flanked query region and
/// one unflanked reference region per transcript, finds cross-gene overlaps
/// and writes the kept, inverted or annotated records.
///
/// # Arguments
///
/// * `config` - Validated overlap configuration
///
/// # Returns
///
/// Returns RunStats with timing, memory usage and record counts.
///
/// # Errors
///
/// Fails on unreadable inputs, transcripts on chromosomes missing from the
/// size table, or write errors. Unstranded transcripts that cannot be
/// flanked are skipped with a warning.
///
/// # Example
///
/// ```rust, ignore
/// use gtfkit::{OverlapConfig, OverlapFlags, RegionPolicy};
///
/// let config = OverlapConfig::new(
///     "in.gtf".into(), "out.gtf".into(), "chrom.txt".into(),
///     4, 2, 2, RegionPolicy::ThreePrime, OverlapFlags::default(),
/// )?;
/// let stats = gtfkit::overlapping::run(&config)?;
/// ```
pub fn run(config: &OverlapConfig) -> Result<RunStats> {
    let timer = RunTimer::start();

    log::info!(
        "Using -u {} -d {} on {} regions ({:?} strand filter)",
        config.upstream,
        config.downstream,
        config.policy,
        config.strand_filter
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let sizes = ChromSizes::from_path(&config.chrom_info)?;
    let records = pool.install(|| read_records(&config.input))?;
    let records_in = records.len();

    let map = pool.install(|| find_overlapping(&records, &sizes, config))?;
    log::info!("{} transcripts overlap a transcript from another gene", map.len());

    let output = AnnotationMerger::new(config.mode.clone()).apply(records, &map);
    write_records(&config.output, &output, &config.format)?;

    let stats = timer.finish(records_in, output.len());
    log::info!("Wrote {} records to {}", stats.records_out, config.output.display());
    Ok(stats)
}

/// Builds query/reference regions for every transcript record and returns
/// the cross-gene overlap map.
///
/// A transcript whose query region cannot be built for record-level reasons
/// (e.g. flanking an unstranded transcript) is left out of the queries but
/// stays in the reference set.
///
/// # Errors
///
/// Returns an error if a transcript's chromosome is missing from `sizes`.
pub fn find_overlapping(
    records: &[FeatureRecord],
    sizes: &ChromSizes,
    config: &OverlapConfig,
) -> Result<OverlapMap> {
    let transcripts: Vec<&FeatureRecord> = records
        .iter()
        .filter(|r| r.feature_type == TRANSCRIPT)
        .collect();

    if transcripts.is_empty() {
        log::warn!("No '{TRANSCRIPT}' features found in input");
        return Ok(OverlapMap::new());
    }
    log::info!("Getting {} regions for {} transcripts", config.policy, transcripts.len());

    let builder = RegionBuilder::new(config.policy, config.upstream, config.downstream, sizes);

    let queries: Vec<Region> = transcripts
        .par_iter()
        .map(|record| match builder.build(record) {
            Ok(region) => Ok(Some(region)),
            Err(e) if e.is_record_level() => {
                log::warn!(
                    "Skipping query for {}: {e}",
                    record.transcript_id().unwrap_or(NA)
                );
                Ok(None)
            }
            Err(e) => Err(e),
        })
        .collect::<Result<Vec<Option<Region>>>>()?
        .into_iter()
        .flatten()
        .collect();
    let references = transcripts
        .par_iter()
        .map(|record| builder.reference(record))
        .collect::<Result<Vec<Region>>>()?;

    let index = ReferenceIndex::new(references);
    Ok(OverlapEngine::new(config.strand_filter).find(&queries, &index))
}

/// Writes records as GTF lines.
pub fn write_records(path: &Path, records: &[FeatureRecord], options: &FormatOptions) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::with_capacity(256 * 1024, file);
    for record in records {
        writeln!(writer, "{}", record.format_gtf(options))?;
    }
    writer.flush()?;
    Ok(())
}
