use crate::config::TabulateConfig;
use crate::error::Result;
use crate::fieldset::{all_keys, project, FieldSet};
use crate::reader::read_records;
use crate::stats::{RunStats, RunTimer};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Runs the `tabulate` pipeline: projects the requested keys out of every
/// record and writes them as a delimited table.
///
/// # Arguments
///
/// * `config` - Validated tabulate configuration
///
/// # Returns
///
/// Returns RunStats with timing, memory usage and row counts.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the table
/// cannot be written.
///
/// # Example
///
/// ```rust, ignore
/// use gtfkit::{tabulate, TabulateConfig};
///
/// let stats = tabulate::run(&config)?;
/// println!("{} rows", stats.records_out);
/// ```
pub fn run(config: &TabulateConfig) -> Result<RunStats> {
    let timer = RunTimer::start();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let records = pool.install(|| read_records(&config.input))?;

    let keys = match &config.keys {
        Some(keys) => keys.clone(),
        None => all_keys(&records, config.with_basic),
    };
    log::info!("Extracting {} columns: {}", keys.len(), keys.join(","));

    let rows = pool.install(|| project(&records, &keys));
    let rows = config.filter.apply(rows);

    let header = config.header.then_some(keys.as_slice());
    write_table(&config.output, header, &rows, &config.separator)?;

    Ok(timer.finish(records.len(), rows.len()))
}

/// Writes an optional header followed by one line per row.
pub fn write_table(
    path: &Path,
    header: Option<&[String]>,
    rows: &[FieldSet],
    separator: &str,
) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::with_capacity(128 * 1024, file);

    if let Some(header) = header {
        writeln!(writer, "{}", header.join(separator))?;
    }
    for row in rows {
        writeln!(writer, "{}", row.format(separator))?;
    }

    writer.flush()?;
    Ok(())
}
