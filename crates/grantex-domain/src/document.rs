//! Input documents

use std::path::{Path, PathBuf};

/// One input document on disk
///
/// The identity is the file stem; the canonical text is read lazily by the
/// orchestrator so a batch never holds every document in memory at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUnit {
    /// Path to the primary (markdown) file
    pub path: PathBuf,

    /// File stem, used to locate siblings and name the artifact
    pub stem: String,

    /// File name including extension, the natural key for persistence
    pub file_name: String,
}

impl DocumentUnit {
    /// Create a document unit from a path
    ///
    /// # Examples
    ///
    /// ```
    /// use grantex_domain::DocumentUnit;
    ///
    /// let doc = DocumentUnit::from_path("data/notice_2025_01.md");
    /// assert_eq!(doc.stem, "notice_2025_01");
    /// assert_eq!(doc.file_name, "notice_2025_01.md");
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            stem,
            file_name,
        }
    }

    /// Bracketed label used as a log prefix
    pub fn label(&self) -> String {
        format!("[{}]", self.file_name)
    }
}
