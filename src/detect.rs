use crate::error::{GtfkitError, Result};
use std::path::{Path, PathBuf};

/// Supported compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    /// Returns true when the input is compressed.
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// use gtfkit::detect::Compression;
    ///
    /// assert!(Compression::Gzip.is_compressed());
    /// assert!(!Compression::None.is_compressed());
    /// ```
    pub fn is_compressed(self) -> bool {
        !matches!(self, Compression::None)
    }
}

/// Detects GTF compression from the file extension(s).
///
/// Accepts `.gtf` and `.gtf.gz` (case-insensitive); anything else is
/// rejected so that GFF3 or BED files are not silently misread.
///
/// # Arguments
///
/// * `path` - Path to the input file
///
/// # Returns
///
/// Returns the compression of the GTF input.
///
/// # Errors
///
/// Returns `UnsupportedExtension` for any other extension.
///
/// # Example
///
/// ```rust, ignore
/// use gtfkit::detect::{detect_compression, Compression};
/// use std::path::Path;
///
/// let compression = detect_compression(Path::new("file.gtf.gz"))?;
/// assert_eq!(compression, Compression::Gzip);
/// ```
pub fn detect_compression(path: &Path) -> Result<Compression> {
    let unsupported = || GtfkitError::UnsupportedExtension(path.display().to_string());
    let ext = extension_lowercase(path).ok_or_else(unsupported)?;

    match ext.as_str() {
        "gtf" => Ok(Compression::None),
        "gz" | "gzip" => match nested_extension(path).as_deref() {
            Some("gtf") => Ok(Compression::Gzip),
            _ => Err(unsupported()),
        },
        _ => Err(unsupported()),
    }
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Inner extension of a compressed file (`.gtf.gz` -> `gtf`).
fn nested_extension(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    extension_lowercase(&PathBuf::from(stem))
}
