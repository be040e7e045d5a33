//! PDF to markdown conversion

use crate::converter::{AlternateFormatConverter, SiblingSelection, SourceFormat};
use crate::error::ConvertError;
use crate::markdown::shape_markdown;
use crate::output::{ensure_exists, prepare_output, write_markdown};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF converter using the pdf-extract crate
///
/// Handles digital PDFs with embedded text layers. Each page is shaped
/// separately and pages are joined with a blank line.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter;

impl PdfConverter {
    /// Create a PDF converter
    pub fn new() -> Self {
        Self
    }

    /// Extract shaped markdown from PDF bytes
    pub fn extract_markdown(&self, pdf_bytes: &[u8]) -> Result<String> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ConvertError::Pdf(e.to_string()))?;

        debug!("Extracted {} PDF pages", pages.len());

        let mut markdown = String::new();
        for page in &pages {
            markdown.push_str(&shape_markdown(page, false));
            markdown.push_str("\n\n");
        }
        Ok(markdown.trim().to_string())
    }
}

impl AlternateFormatConverter for PdfConverter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Pdf
    }

    fn default_selection(&self) -> SiblingSelection {
        SiblingSelection::FirstFound
    }

    fn convert(&self, source: &Path, output: Option<&Path>) -> Result<PathBuf> {
        ensure_exists(source)?;
        let output_path = prepare_output(source, output)?;

        let bytes = fs::read(source).map_err(|e| ConvertError::io(source, e))?;
        let markdown = self.extract_markdown(&bytes)?;
        write_markdown(&output_path, &markdown)?;

        info!("Converted {} -> {}", source.display(), output_path.display());
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Generate a single-page PDF whose text layer holds `lines`
    fn make_test_pdf(lines: &[&str]) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut content = String::from("BT /F1 12 Tf 14 TL 72 720 Td");
        for line in lines {
            content.push_str(&format!(" ({}) Tj T*", line));
        }
        content.push_str(" ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extract_text_from_digital_pdf() {
        let bytes = make_test_pdf(&["Regional Export Voucher", "Contact 053-655-5609"]);
        let markdown = PdfConverter::new().extract_markdown(&bytes).unwrap();
        assert!(
            markdown.contains("Export") || markdown.contains("Voucher"),
            "unexpected text: {markdown}"
        );
    }

    #[test]
    fn test_invalid_pdf_is_error() {
        let result = PdfConverter::new().extract_markdown(b"not a pdf");
        assert!(matches!(result, Err(ConvertError::Pdf(_))));
    }

    #[test]
    fn test_convert_writes_default_output() {
        let root = tempdir().unwrap();
        let dir = root.path().join("notice");
        std::fs::create_dir_all(&dir).unwrap();
        let source = dir.join("notice.pdf");
        std::fs::write(&source, make_test_pdf(&["Smart Factory Support"])).unwrap();

        let output = PdfConverter::new().convert(&source, None).unwrap();

        assert_eq!(output, dir.join("notice").join("out").join("notice.md"));
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("Smart") || text.contains("Factory"));
    }

    #[test]
    fn test_convert_missing_source() {
        let root = tempdir().unwrap();
        let result = PdfConverter::new().convert(&root.path().join("absent.pdf"), None);
        assert!(matches!(result, Err(ConvertError::NotFound(_))));
    }
}
