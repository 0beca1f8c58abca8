//! Output Location

use crate::error::*;
use std::path::{Path, PathBuf};

/// Image formats supported for render results.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// OpenEXR.
    Exr,

    /// Portable FloatMap.
    Pfm,
}

/// Resolves where a render result is written and in which format.
#[derive(Clone, Debug)]
pub struct LocationResolver {
    /// Output file path.
    path: PathBuf,

    /// Format derived from the extension.
    format: OutputFormat,
}

impl LocationResolver {
    /// Create a resolver for an output path; the extension selects the format.
    ///
    /// * `path` - Output file path ending in `.exr` or `.pfm`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let format = match ext.as_deref() {
            Some("exr") => OutputFormat::Exr,
            Some("pfm") => OutputFormat::Pfm,
            Some(ext) => return Err(Error::InvalidArgument(format!("Extension {ext} is not supported"))),
            None => {
                return Err(Error::InvalidArgument(format!(
                    "Can't determine file type from suffix of filename {}",
                    path.display()
                )))
            }
        };
        Ok(Self { path, format })
    }

    /// Returns the output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns a sibling path next to the output file.
    ///
    /// * `file_name` - Name of the sibling file.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        match self.path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(LocationResolver::new("out/a.EXR").map(|r| r.format()).ok(), Some(OutputFormat::Exr));
        assert_eq!(LocationResolver::new("a.pfm").map(|r| r.format()).ok(), Some(OutputFormat::Pfm));
        assert!(LocationResolver::new("a.png").is_err());
        assert!(LocationResolver::new("noext").is_err());
    }

    #[test]
    fn sibling_paths() {
        let r = LocationResolver::new("out/render.pfm").expect("resolver");
        assert_eq!(r.resolve("aux.pfm"), PathBuf::from("out/aux.pfm"));
    }
}
