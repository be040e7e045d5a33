//! Markdown shaping of extracted plain text

use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.").expect("numbered-heading pattern is valid"));

/// Give extracted plain text a light markdown structure
///
/// Lines starting with `•` or `-` become `-` bullets, with a blank line
/// before and after each run of bullets. With `numbered_headings`, lines
/// starting with `<digits>.` become `## ` headings.
///
/// # Examples
///
/// ```
/// use grantex_convert::shape_markdown;
///
/// let text = "1. Overview\nintro\n• first\n• second\nafter";
/// assert_eq!(
///     shape_markdown(text, true),
///     "## 1. Overview\nintro\n\n- first\n- second\n\nafter"
/// );
/// ```
pub fn shape_markdown(text: &str, numbered_headings: bool) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in text.split('\n') {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            lines.push(String::new());
            in_list = false;
            continue;
        }

        if numbered_headings && NUMBERED_HEADING_RE.is_match(trimmed) {
            lines.push(format!("## {}", line));
            continue;
        }

        if trimmed.starts_with('•') || trimmed.starts_with('-') {
            if !in_list {
                lines.push(String::new());
            }
            lines.push(line.replace('•', "-"));
            in_list = true;
            continue;
        }

        if in_list {
            lines.push(String::new());
            in_list = false;
        }
        lines.push(line.to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(shape_markdown("a\nb\n\nc", false), "a\nb\n\nc");
    }

    #[test]
    fn test_bullets_surrounded_by_blank_lines() {
        assert_eq!(
            shape_markdown("intro\n- a\n• b\nend", false),
            "intro\n\n- a\n- b\n\nend"
        );
    }

    #[test]
    fn test_numbered_lines_only_when_enabled() {
        assert_eq!(shape_markdown("2. Budget", false), "2. Budget");
        assert_eq!(shape_markdown("2. Budget", true), "## 2. Budget");
        assert_eq!(shape_markdown("2025 budget", true), "2025 budget");
    }

    #[test]
    fn test_blank_line_ends_list() {
        assert_eq!(shape_markdown("- a\n\nb", false), "\n- a\n\nb");
    }
}
