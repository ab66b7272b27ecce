//! Cross-gene overlap detection between flanked queries and reference
//! transcripts.

use crate::error::{GtfkitError, Result};
use crate::record::Strand;
use crate::region::{Region, RegionNamer};
use hashbrown::HashMap;
use rayon::prelude::*;

/// Strand constraint applied to every overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrandFilter {
    #[default]
    None,
    /// Both strands known and equal.
    Same,
    /// Both strands known and different.
    Opposite,
}

impl StrandFilter {
    /// Builds a filter out of the two CLI switches; they are exclusive.
    pub fn from_flags(same: bool, opposite: bool) -> Result<Self> {
        match (same, opposite) {
            (true, true) => Err(GtfkitError::InvalidConfiguration(
                "same-strandedness and diff-strandedness are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(StrandFilter::Same),
            (false, true) => Ok(StrandFilter::Opposite),
            (false, false) => Ok(StrandFilter::None),
        }
    }

    #[inline(always)]
    pub fn accepts(self, a: Strand, b: Strand) -> bool {
        match self {
            StrandFilter::None => true,
            StrandFilter::Same => a.is_known() && a == b,
            StrandFilter::Opposite => a.is_known() && b.is_known() && a != b,
        }
    }
}

/// Interval-algebra backend: every reference region overlapping `query`
/// and passing `filter`.
pub trait OverlapSource: Sync {
    fn overlaps<'a>(&'a self, query: &Region, filter: StrandFilter) -> Vec<&'a Region>;
}

#[derive(Debug, Default)]
struct Bucket {
    regions: Vec<Region>,
    max_width: u64,
}

/// Reference regions bucketed per chromosome and sorted by start.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    buckets: HashMap<String, Bucket>,
    len: usize,
}

impl ReferenceIndex {
    pub fn new(regions: Vec<Region>) -> Self {
        let len = regions.len();
        let mut buckets: HashMap<String, Bucket> = HashMap::new();

        for region in regions {
            let bucket = buckets.entry(region.chrom.clone()).or_default();
            bucket.max_width = bucket.max_width.max(region.width());
            bucket.regions.push(region);
        }

        buckets
            .par_iter_mut()
            .for_each(|(_, bucket)| bucket.regions.sort_by_key(|r| (r.start, r.end)));

        Self { buckets, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl OverlapSource for ReferenceIndex {
    fn overlaps<'a>(&'a self, query: &Region, filter: StrandFilter) -> Vec<&'a Region> {
        let Some(bucket) = self.buckets.get(&query.chrom) else {
            return Vec::new();
        };

        // r.start < q.end bounds the slice from above; r.end <= r.start + max_width
        // bounds it from below.
        let upper = bucket.regions.partition_point(|r| r.start < query.end);
        let lower = bucket
            .regions
            .partition_point(|r| r.start.saturating_add(bucket.max_width) <= query.start);

        if lower >= upper {
            return Vec::new();
        }

        bucket.regions[lower..upper]
            .iter()
            .filter(|r| query.start < r.end && filter.accepts(query.strand, r.strand))
            .collect()
    }
}

/// Transcript id to its partner transcript ids (other genes only).
///
/// Keys and partner lists keep first-seen order; partners are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapMap {
    order: Vec<String>,
    partners: HashMap<String, Vec<String>>,
}

impl OverlapMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `partner` for `tx`; returns false if it was already there.
    pub fn insert(&mut self, tx: &str, partner: &str) -> bool {
        match self.partners.get_mut(tx) {
            Some(list) => {
                if list.iter().any(|p| p == partner) {
                    return false;
                }
                list.push(partner.to_string());
            }
            None => {
                self.order.push(tx.to_string());
                self.partners.insert(tx.to_string(), vec![partner.to_string()]);
            }
        }
        true
    }

    pub fn contains(&self, tx: &str) -> bool {
        self.partners.contains_key(tx)
    }

    pub fn partners(&self, tx: &str) -> Option<&[String]> {
        self.partners.get(tx).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order
            .iter()
            .map(|tx| (tx.as_str(), self.partners[tx].as_slice()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Finds, for every query, the reference transcripts of other genes it
/// overlaps.
#[derive(Debug, Clone)]
pub struct OverlapEngine {
    pub filter: StrandFilter,
    pub namer: RegionNamer,
}

impl OverlapEngine {
    pub fn new(filter: StrandFilter) -> Self {
        Self {
            filter,
            namer: RegionNamer::default(),
        }
    }

    pub fn with_namer(mut self, namer: RegionNamer) -> Self {
        self.namer = namer;
        self
    }

    /// Scans `queries` against `source` in parallel.
    ///
    /// Pairs are gathered per query in query order and merged sequentially,
    /// so the map is the same as a single-threaded scan would give.
    ///
    /// # Arguments
    ///
    /// * `queries` - Flanked query regions, named by the engine's namer
    /// * `source` - Reference regions to intersect against
    ///
    /// # Returns
    ///
    /// Returns the map of query transcripts to partner transcripts from other
    /// genes. Names that cannot be decoded are skipped with a warning.
    pub fn find<S: OverlapSource>(&self, queries: &[Region], source: &S) -> OverlapMap {
        let hits: Vec<Vec<(&str, &str)>> = queries
            .par_iter()
            .map(|query| self.cross_gene_hits(query, source))
            .collect();

        let mut map = OverlapMap::new();
        for (tx, partner) in hits.into_iter().flatten() {
            map.insert(tx, partner);
        }

        log::debug!("{} of {} queries overlap another gene", map.len(), queries.len());
        map
    }

    fn cross_gene_hits<'a, S: OverlapSource>(
        &self,
        query: &'a Region,
        source: &'a S,
    ) -> Vec<(&'a str, &'a str)> {
        let Some((tx, gene)) = self.namer.decode(&query.name) else {
            log::warn!("Skipping query with undecodable name {:?}", query.name);
            return Vec::new();
        };

        source
            .overlaps(query, self.filter)
            .into_iter()
            .filter_map(|other| match self.namer.decode(&other.name) {
                Some((other_tx, other_gene)) if other_gene != gene => Some((tx, other_tx)),
                Some(_) => None,
                None => {
                    log::warn!("Skipping reference with undecodable name {:?}", other.name);
                    None
                }
            })
            .collect()
    }
}
