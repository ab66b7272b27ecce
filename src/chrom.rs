use crate::error::{GtfkitError, Result};
use hashbrown::HashMap;
use std::path::Path;

/// Chromosome name to length table, used to clip flanked regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromSizes {
    sizes: HashMap<String, u64>,
}

impl ChromSizes {
    /// Reads a two-column `name<TAB>length` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let sizes = Self::parse(&contents)?;
        log::info!(
            "Loaded {} chromosome sizes from {}",
            sizes.len(),
            path.as_ref().display()
        );
        Ok(sizes)
    }

    /// Parses chromosome sizes; blank and `#` lines are skipped and any
    /// extra columns are ignored.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut sizes = HashMap::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split('\t');
            let name = fields
                .next()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| GtfkitError::parse(idx + 1, "missing chromosome name"))?;
            let length = fields
                .next()
                .ok_or_else(|| GtfkitError::parse(idx + 1, format!("missing size for {name}")))?
                .trim()
                .parse::<u64>()
                .map_err(|e| GtfkitError::parse(idx + 1, format!("invalid size for {name}: {e}")))?;

            if length == 0 {
                return Err(GtfkitError::parse(idx + 1, format!("size of {name} must be positive")));
            }

            sizes.insert(name.to_string(), length);
        }

        Ok(Self { sizes })
    }

    /// Length of `chrom`; a missing chromosome is a configuration error.
    pub fn length(&self, chrom: &str) -> Result<u64> {
        self.sizes
            .get(chrom)
            .copied()
            .ok_or_else(|| GtfkitError::UnknownChromosome(chrom.to_string()))
    }

    pub fn insert(&mut self, chrom: impl Into<String>, length: u64) {
        self.sizes.insert(chrom.into(), length);
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for ChromSizes {
    fn from_iter<T: IntoIterator<Item = (K, u64)>>(iter: T) -> Self {
        Self {
            sizes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sizes() {
        let sizes = ChromSizes::parse("# header\nchr1\t1000\n\nchr2\t500\textra\n").unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes.length("chr1").unwrap(), 1000);
        assert_eq!(sizes.length("chr2").unwrap(), 500);
    }

    #[test]
    fn test_unknown_chromosome() {
        let sizes: ChromSizes = [("chr1", 10u64)].into_iter().collect();
        assert!(matches!(
            sizes.length("chrX"),
            Err(GtfkitError::UnknownChromosome(c)) if c == "chrX"
        ));
    }

    #[test]
    fn test_insert_overrides() {
        let mut sizes = ChromSizes::default();
        assert!(sizes.is_empty());
        sizes.insert("chr1", 100);
        sizes.insert(String::from("chr1"), 250);
        sizes.insert("chrM", 16569);
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes.length("chr1").unwrap(), 250);
        assert_eq!(sizes.length("chrM").unwrap(), 16569);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            ChromSizes::parse("chr1\n"),
            Err(GtfkitError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            ChromSizes::parse("chr1\t10\nchr2\tabc\n"),
            Err(GtfkitError::Parse { line: 2, .. })
        ));
        assert!(ChromSizes::parse("chr1\t0\n").is_err());
    }
}
