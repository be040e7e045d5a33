//! Canonical text normalization

use regex::Regex;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank-run pattern is valid"));

/// Spaces substituted for each tab character
pub const TAB_WIDTH: usize = 4;

/// Converts raw document text to the canonical form fed to the engine
///
/// Normalization is pure and total: it never fails and never reorders
/// content.
///
/// # Examples
///
/// ```
/// use grantex_extractor::DocumentNormalizer;
///
/// let normalizer = DocumentNormalizer::new();
/// let text = "# Title<!-- draft -->\r\n\tItem\r\n\r\n\r\n\r\nEnd";
/// assert_eq!(normalizer.normalize(text), "# Title\n    Item\n\nEnd");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentNormalizer {
    _private: (),
}

impl DocumentNormalizer {
    /// Create a normalizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize text into canonical form
    ///
    /// 1. Strip `<!-- ... -->` comments including their contents
    /// 2. Unify line endings to `\n`
    /// 3. Expand tabs to spaces
    /// 4. Collapse 3+ consecutive newlines into a single blank line
    pub fn normalize(&self, text: &str) -> String {
        let without_comments = COMMENT_RE.replace_all(text, "");
        let unified = without_comments.replace("\r\n", "\n").replace('\r', "\n");
        let expanded = unified.replace('\t', &" ".repeat(TAB_WIDTH));
        BLANK_RUN_RE.replace_all(&expanded, "\n\n").into_owned()
    }
}
