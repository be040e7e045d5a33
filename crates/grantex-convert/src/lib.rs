//! Grantex Convert
//!
//! Alternate-format converters used when a markdown announcement does not
//! yield a complete record.
//!
//! Each converter knows how to:
//! - find sibling documents of its format under `<root>/<base_name>/`
//! - pick one of several candidates (`SiblingSelection`)
//! - convert it to shaped markdown text
//!
//! # Formats
//!
//! - `PdfConverter`: per-page text extraction with pdf-extract
//! - `HwpConverter`: HWP 5.x compound files (`.hwpx` is reported as unsupported)
//!
//! # Examples
//!
//! ```no_run
//! use grantex_convert::{AlternateFormatConverter, PdfConverter};
//! use std::path::Path;
//!
//! let converter = PdfConverter::new();
//! let candidates = converter.find_sibling_documents(Path::new("data"), "notice.md");
//! let rule = converter.default_selection();
//! if let Some(pdf) = converter.select_sibling(&candidates, "notice.md", rule) {
//!     let markdown_path = converter.convert(&pdf, None).unwrap();
//!     println!("Converted to {}", markdown_path.display());
//! }
//! ```

#![warn(missing_docs)]

mod converter;
mod error;
mod hwp;
mod markdown;
mod output;
mod pdf;
mod sibling;

pub use converter::{AlternateFormatConverter, SiblingSelection, SourceFormat};
pub use error::ConvertError;
pub use hwp::{extract_hwp_text, HwpConverter};
pub use markdown::shape_markdown;
pub use output::default_output_path;
pub use pdf::PdfConverter;
pub use sibling::{find_siblings, select_sibling};

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
