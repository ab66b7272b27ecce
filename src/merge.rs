//! Folding overlap results back into the record set.

use crate::error::{GtfkitError, Result};
use crate::overlap::OverlapMap;
use crate::record::FeatureRecord;
use crate::region::RegionPolicy;

/// Output policy for the overlap annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeMode {
    /// Keep records whose key is in the overlap map.
    Keep,
    /// Keep records whose key is not in the overlap map.
    Invert,
    /// Keep everything; tag overlapping transcripts with `key_name`.
    Annotate { key_name: String },
}

impl MergeMode {
    /// Resolves the two CLI switches; `invert` and `annotate` are exclusive.
    pub fn from_flags(invert: bool, annotate: bool, key_name: String) -> Result<Self> {
        match (invert, annotate) {
            (true, true) => Err(GtfkitError::InvalidConfiguration(
                "annotate-gtf and invert-match are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(MergeMode::Invert),
            (false, true) => Ok(MergeMode::Annotate { key_name }),
            (false, false) => Ok(MergeMode::Keep),
        }
    }
}

/// Default attribute name for annotate mode, e.g. `overlap_tts_u1.5k_d1.5k`.
pub fn default_key_name(policy: RegionPolicy, upstream: u64, downstream: u64) -> String {
    format!(
        "overlap_{}_u{:?}k_d{:?}k",
        policy.label(),
        upstream as f64 / 1000.0,
        downstream as f64 / 1000.0
    )
}

/// Applies a [`MergeMode`] to a record collection.
#[derive(Debug, Clone)]
pub struct AnnotationMerger {
    pub mode: MergeMode,
    /// Attribute identifying a record in the overlap map.
    pub key: String,
    /// Feature type receiving the annotation in annotate mode.
    pub feature_type: String,
}

impl AnnotationMerger {
    pub fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            key: "transcript_id".to_string(),
            feature_type: "transcript".to_string(),
        }
    }

    fn in_map(&self, record: &FeatureRecord, map: &OverlapMap) -> bool {
        record
            .attributes
            .get(&self.key)
            .is_some_and(|id| map.contains(id))
    }

    pub fn apply(&self, records: Vec<FeatureRecord>, map: &OverlapMap) -> Vec<FeatureRecord> {
        match &self.mode {
            MergeMode::Keep => records
                .into_iter()
                .filter(|r| self.in_map(r, map))
                .collect(),
            MergeMode::Invert => records
                .into_iter()
                .filter(|r| !self.in_map(r, map))
                .collect(),
            MergeMode::Annotate { key_name } => records
                .into_iter()
                .map(|mut record| {
                    if record.feature_type == self.feature_type {
                        let partners = record
                            .attributes
                            .get(&self.key)
                            .and_then(|id| map.partners(id))
                            .map(|p| p.join(","));
                        if let Some(partners) = partners {
                            record.add_attr(key_name.as_str(), partners);
                        }
                    }
                    record
                })
                .collect(),
        }
    }
}
