//! Output path resolution and markdown writing

use crate::error::ConvertError;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Default markdown path for a converted document
///
/// `<dir>/<dir_name>/out/<stem>.md`, where `dir` is the source's parent
/// directory and `dir_name` its final component.
///
/// # Examples
///
/// ```
/// use grantex_convert::default_output_path;
/// use std::path::Path;
///
/// let out = default_output_path(Path::new("/data/notice/notice.pdf"));
/// assert_eq!(out, Path::new("/data/notice/notice/out/notice.md"));
/// ```
pub fn default_output_path(source: &Path) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    let dir_name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    let stem = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();

    let mut file_name = stem;
    file_name.push(".md");
    dir.join(dir_name).join("out").join(file_name)
}

/// Resolve the output path and create its parent directories
pub(crate) fn prepare_output(source: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(source),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
    }
    Ok(path)
}

/// Write markdown text to `path`
pub(crate) fn write_markdown(path: &Path, markdown: &str) -> Result<()> {
    fs::write(path, markdown).map_err(|e| ConvertError::io(path, e))
}

/// Fail early when the source is missing
pub(crate) fn ensure_exists(source: &Path) -> Result<()> {
    if source.is_file() {
        Ok(())
    } else {
        Err(ConvertError::NotFound(source.to_path_buf()))
    }
}
