//! Sibling document discovery and selection

use crate::converter::SiblingSelection;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Find files with one of `extensions` under `<root>/<base_name>/`
///
/// A trailing `.md` is removed from `base_name` first. The search is
/// recursive and the extension match case-insensitive. Results are sorted
/// and absolute. A missing directory yields an empty list.
pub fn find_siblings(root: &Path, base_name: &str, extensions: &[&str]) -> Vec<PathBuf> {
    let stem = base_name.strip_suffix(".md").unwrap_or(base_name);
    let search_dir = root.join(stem);

    if !search_dir.is_dir() {
        debug!("No sibling directory at {}", search_dir.display());
        return Vec::new();
    }

    let mut found: Vec<PathBuf> = WalkDir::new(&search_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", search_dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), extensions))
        .map(|entry| absolute(entry.path()))
        .collect();

    found.sort();

    if found.is_empty() {
        debug!(
            "No {} files under {}",
            extensions.join("/"),
            search_dir.display()
        );
    }
    found
}

/// Pick one candidate according to `rule`
///
/// With `NameSimilarity`, the first candidate whose lowercase file stem
/// contains, or is contained in, the lowercase base name wins; otherwise
/// the first candidate is used.
pub fn select_sibling(
    candidates: &[PathBuf],
    base_name: &str,
    rule: SiblingSelection,
) -> Option<PathBuf> {
    let first = candidates.first()?;

    if rule == SiblingSelection::FirstFound {
        return Some(first.clone());
    }

    let base = base_name
        .strip_suffix(".md")
        .unwrap_or(base_name)
        .to_lowercase();

    let similar = candidates.iter().find(|candidate| {
        candidate
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase())
            .is_some_and(|stem| stem.contains(&base) || base.contains(&stem))
    });

    Some(similar.unwrap_or(first).clone())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_recursive_case_insensitive_sorted() {
        let root = tempdir().unwrap();
        let dir = root.path().join("notice");
        fs::create_dir_all(dir.join("attachments")).unwrap();
        fs::write(dir.join("b.pdf"), b"x").unwrap();
        fs::write(dir.join("attachments").join("A.PDF"), b"x").unwrap();
        fs::write(dir.join("readme.txt"), b"x").unwrap();

        let found = find_siblings(root.path(), "notice.md", &["pdf"]);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["A.PDF", "b.pdf"]);
        assert!(found.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let root = tempdir().unwrap();
        assert!(find_siblings(root.path(), "absent", &["hwp"]).is_empty());
    }

    #[test]
    fn test_select_first_found() {
        let candidates = vec![PathBuf::from("/d/a.pdf"), PathBuf::from("/d/notice.pdf")];
        assert_eq!(
            select_sibling(&candidates, "notice.md", SiblingSelection::FirstFound),
            Some(PathBuf::from("/d/a.pdf"))
        );
    }

    #[test]
    fn test_select_name_similarity() {
        let candidates = vec![
            PathBuf::from("/d/appendix.hwp"),
            PathBuf::from("/d/2025_Notice_Final.hwp"),
        ];
        assert_eq!(
            select_sibling(&candidates, "notice.md", SiblingSelection::NameSimilarity),
            Some(PathBuf::from("/d/2025_Notice_Final.hwp"))
        );
    }

    #[test]
    fn test_select_name_similarity_contained_in_base() {
        let candidates = vec![PathBuf::from("/d/zz.hwp"), PathBuf::from("/d/voucher.hwp")];
        assert_eq!(
            select_sibling(&candidates, "export_voucher_2025.md", SiblingSelection::NameSimilarity),
            Some(PathBuf::from("/d/voucher.hwp"))
        );
    }

    #[test]
    fn test_select_name_similarity_falls_back_to_first() {
        let candidates = vec![PathBuf::from("/d/x.hwp"), PathBuf::from("/d/y.hwp")];
        assert_eq!(
            select_sibling(&candidates, "notice", SiblingSelection::NameSimilarity),
            Some(PathBuf::from("/d/x.hwp"))
        );
    }

    #[test]
    fn test_select_empty() {
        assert_eq!(select_sibling(&[], "notice", SiblingSelection::FirstFound), None);
    }
}
