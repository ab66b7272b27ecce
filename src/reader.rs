use crate::detect::{detect_compression, Compression};
use crate::error::{GtfkitError, Result};
use crate::record::{AttributeStore, FeatureRecord, NA};
use flate2::read::MultiGzDecoder;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parses one GTF line into a record. `line_no` is used in error messages.
pub fn parse_line(line: &str, line_no: usize) -> Result<FeatureRecord> {
    let mut fields = line.trim_end_matches(['\n', '\r']).split('\t');
    let mut next = |what: &str| {
        fields
            .next()
            .ok_or_else(|| GtfkitError::parse(line_no, format!("missing {what}")))
    };

    let columns = [
        next("chrom")?,
        next("source")?,
        next("feature")?,
        next("start")?,
        next("end")?,
        next("score")?,
        next("strand")?,
        next("frame")?,
    ];
    let attr = next("attributes")?;

    let attributes = match attr.trim() {
        "" | NA => AttributeStore::new(),
        text => AttributeStore::parse(text)
            .map_err(|e| GtfkitError::parse(line_no, e.to_string()))?,
    };

    FeatureRecord::from_fields(columns, attributes).map_err(|e| match e {
        GtfkitError::InvalidCoordinate(msg) => GtfkitError::parse(line_no, msg),
        other => other,
    })
}

/// Parses GTF text, skipping blank and `#` lines. Lines are parsed in
/// parallel; the output keeps input order.
pub fn parse_str(contents: &str) -> Result<Vec<FeatureRecord>> {
    let lines: Vec<(usize, &str)> = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .collect();

    lines
        .par_iter()
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

/// Reads a `.gtf` or `.gtf.gz` file into memory and parses it.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<FeatureRecord>> {
    let path = path.as_ref();
    let compression = detect_compression(path)?;

    let file = File::open(path)?;
    let mut contents = String::new();
    match compression {
        Compression::None => {
            BufReader::new(file).read_to_string(&mut contents)?;
        }
        Compression::Gzip => {
            MultiGzDecoder::new(BufReader::new(file)).read_to_string(&mut contents)?;
        }
    }

    let records = parse_str(&contents)?;
    log::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
