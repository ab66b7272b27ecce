//! Flat value rows projected out of feature records.

use crate::record::{FeatureRecord, Lookup, NA};
use hashbrown::HashSet;
use rayon::prelude::*;
use std::ops::Index;
use std::sync::Arc;

/// Marker for a key that does not exist on a record.
pub const UNDEFINED: &str = "?";

/// Structural columns emitted first by the `all`/`*` key set.
pub const BASIC_KEYS: [&str; 8] = [
    "seqid", "source", "feature", "start", "end", "score", "strand", "frame",
];

/// An ordered, fixed-length snapshot of values taken from one record.
///
/// Equality and hashing use the value tuple only, so two rows coming from
/// different projections compare equal when their values do.
#[derive(Debug, Clone)]
pub struct FieldSet {
    fields: Vec<String>,
    names: Option<Arc<[String]>>,
}

impl FieldSet {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            names: None,
        }
    }

    /// Binds a name to each position. `names` must match `fields` in length.
    pub fn with_names(fields: Vec<String>, names: Arc<[String]>) -> Self {
        debug_assert_eq!(fields.len(), names.len());
        Self {
            fields,
            names: Some(names),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }

    /// First value bound to `name`, if names were attached.
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        let names = self.names.as_ref()?;
        let idx = names.iter().position(|n| n == name)?;
        self.get(idx)
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.fields.iter().any(|f| f == value)
    }

    pub fn format(&self, sep: &str) -> String {
        self.fields.join(sep)
    }
}

impl PartialEq for FieldSet {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for FieldSet {}

impl std::hash::Hash for FieldSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
    }
}

impl Index<usize> for FieldSet {
    type Output = str;

    fn index(&self, idx: usize) -> &str {
        &self.fields[idx]
    }
}

impl From<Vec<String>> for FieldSet {
    fn from(fields: Vec<String>) -> Self {
        FieldSet::new(fields)
    }
}

/// Projects `keys` out of every record, one row per record.
///
/// Keys resolve like [`FeatureRecord::get`]; a key that the record does not
/// carry is written as [`UNDEFINED`]. Duplicated keys give duplicated columns.
pub fn project<S: AsRef<str> + Sync>(records: &[FeatureRecord], keys: &[S]) -> Vec<FieldSet> {
    let names: Arc<[String]> = keys.iter().map(|k| k.as_ref().to_string()).collect();

    records
        .par_iter()
        .map(|record| {
            let fields = names
                .iter()
                .map(|key| match record.lookup(key) {
                    Lookup::Found(value) => value.into_owned(),
                    Lookup::NotFound | Lookup::Invalid => UNDEFINED.to_string(),
                })
                .collect();
            FieldSet::with_names(fields, Arc::clone(&names))
        })
        .collect()
}

/// Key list for `all`/`*`: optional basic columns, then every attribute key
/// in first-seen order.
pub fn all_keys(records: &[FeatureRecord], with_basic: bool) -> Vec<String> {
    let mut keys: Vec<String> = if with_basic {
        BASIC_KEYS.iter().map(|k| k.to_string()).collect()
    } else {
        Vec::new()
    };

    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        for key in record.attr_names() {
            if seen.insert(key) {
                keys.push(key.to_string());
            }
        }
    }

    keys
}

/// Row filters applied when writing a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Keep only the first occurrence of each row.
    pub unique: bool,
    /// Drop rows holding an unset (`.`) value.
    pub drop_unset: bool,
    /// Drop rows holding an undefined (`?`) value.
    pub drop_undefined: bool,
}

impl TableFilter {
    fn rejects(&self, row: &FieldSet) -> bool {
        (self.drop_unset && row.contains(NA)) || (self.drop_undefined && row.contains(UNDEFINED))
    }

    /// Applies the filter, preserving row order.
    pub fn apply(&self, rows: Vec<FieldSet>) -> Vec<FieldSet> {
        let mut printed: HashSet<FieldSet> = HashSet::new();
        let mut kept = Vec::with_capacity(rows.len());

        for row in rows {
            if self.unique {
                if printed.contains(&row) {
                    continue;
                }
                printed.insert(row.clone());
            }
            if self.rejects(&row) {
                continue;
            }
            kept.push(row);
        }

        kept
    }
}
