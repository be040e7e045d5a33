//! The converter trait and its supporting enums

use crate::sibling;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Alternate source format of an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Portable Document Format
    Pdf,
    /// Hangul Word Processor
    Hwp,
}

impl SourceFormat {
    /// File extensions (lowercase, without dot) recognised for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SourceFormat::Pdf => &["pdf"],
            SourceFormat::Hwp => &["hwp", "hwpx"],
        }
    }

    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Hwp => "hwp",
        }
    }

    /// Parse a format name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Some(SourceFormat::Pdf),
            "hwp" => Some(SourceFormat::Hwp),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Tie-break rule when several sibling documents are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingSelection {
    /// Prefer a candidate whose name overlaps the base name, else the first
    NameSimilarity,
    /// Always take the first candidate in sorted order
    FirstFound,
}

/// Converts an alternate-format sibling of a markdown announcement into markdown
///
/// Conversion is synchronous and may touch the filesystem heavily; async
/// callers run it on a blocking thread.
pub trait AlternateFormatConverter: Send + Sync {
    /// Format handled by this converter
    fn format(&self) -> SourceFormat;

    /// Selection rule used when the caller has no preference
    fn default_selection(&self) -> SiblingSelection;

    /// Find documents of this format under `<root>/<base_name>/`
    fn find_sibling_documents(&self, root: &Path, base_name: &str) -> Vec<PathBuf> {
        sibling::find_siblings(root, base_name, self.format().extensions())
    }

    /// Whether `source` is a variant this converter can read
    fn can_convert(&self, _source: &Path) -> bool {
        true
    }

    /// Pick one candidate according to `rule`
    ///
    /// Candidates this converter can read are ranked ahead of the rest, so an
    /// unreadable variant is only chosen when nothing else was found.
    fn select_sibling(
        &self,
        candidates: &[PathBuf],
        base_name: &str,
        rule: SiblingSelection,
    ) -> Option<PathBuf> {
        let (readable, unreadable): (Vec<PathBuf>, Vec<PathBuf>) = candidates
            .iter()
            .cloned()
            .partition(|candidate| self.can_convert(candidate));
        sibling::select_sibling(&readable, base_name, rule)
            .or_else(|| sibling::select_sibling(&unreadable, base_name, rule))
    }

    /// Convert `source` to markdown, returning the path written
    ///
    /// When `output` is `None` the markdown goes to
    /// `<dir>/<dir_name>/out/<stem>.md` next to the source.
    fn convert(&self, source: &Path, output: Option<&Path>) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(SourceFormat::Pdf.extensions(), &["pdf"]);
        assert_eq!(SourceFormat::Hwp.extensions(), &["hwp", "hwpx"]);
    }

    #[test]
    fn test_format_parse_and_display() {
        assert_eq!(SourceFormat::parse("PDF"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::parse("hwp"), Some(SourceFormat::Hwp));
        assert_eq!(SourceFormat::parse("docx"), None);
        assert_eq!(SourceFormat::Hwp.to_string(), "HWP");
    }
}
