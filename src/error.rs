use thiserror::Error;

/// Error type for gtfkit operations.
#[derive(Debug, Error)]
pub enum GtfkitError {
    /// A key was not found under the `Raise` lookup policy.
    #[error("missing attribute: {0}")]
    MissingAttribute(String),
    /// A key name that can never be resolved (e.g. empty).
    #[error("invalid attribute key: {0:?}")]
    InvalidKey(String),
    /// Coordinates that are not integers or break `1 <= start <= end`.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    /// A strand-dependent operation was requested on an unstranded record.
    #[error("strand required: {0}")]
    StrandRequired(String),
    /// Chromosome missing from the chromosome size table.
    #[error("unknown chromosome: {0}")]
    UnknownChromosome(String),
    /// Mutually exclusive options were combined.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Unrecognized BED variant or region policy.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Input extension is missing or not supported.
    #[error("unsupported input extension: {0}")]
    UnsupportedExtension(String),
    /// Malformed input line.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// Failed to build a Rayon thread pool.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Wraps standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GtfkitError {
    /// Returns true for conditions that concern a single record and that a
    /// caller may choose to skip.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            GtfkitError::MissingAttribute(_) | GtfkitError::StrandRequired(_)
        )
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        GtfkitError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result alias for gtfkit operations.
pub type Result<T> = std::result::Result<T, GtfkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_level_errors() {
        assert!(GtfkitError::StrandRequired("t1".into()).is_record_level());
        assert!(GtfkitError::MissingAttribute("gene_id".into()).is_record_level());
        assert!(!GtfkitError::UnknownChromosome("chr9".into()).is_record_level());
        assert!(!GtfkitError::parse(3, "bad").is_record_level());
    }
}
