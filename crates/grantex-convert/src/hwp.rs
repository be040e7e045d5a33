//! HWP 5.x to markdown conversion
//!
//! An HWP 5.x document is an OLE compound file. The `FileHeader` stream
//! carries a signature and property flags; body text lives in
//! `BodyText/Section{N}` streams as a sequence of tagged records, usually
//! raw-deflate compressed. Paragraph text records hold UTF-16LE code units
//! interleaved with control codes.

use crate::converter::{AlternateFormatConverter, SiblingSelection, SourceFormat};
use crate::error::ConvertError;
use crate::markdown::shape_markdown;
use crate::output::{ensure_exists, prepare_output, write_markdown};
use crate::Result;
use flate2::read::DeflateDecoder;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SIGNATURE: &[u8] = b"HWP Document File";
const FILE_HEADER_LEN: usize = 40;

const FLAG_COMPRESSED: u32 = 1 << 0;
const FLAG_ENCRYPTED: u32 = 1 << 1;
const FLAG_DISTRIBUTION: u32 = 1 << 2;

const TAG_PARA_TEXT: u32 = 67;
const EXTENDED_SIZE: u32 = 0xFFF;

/// HWP converter for HWP 5.x compound documents
#[derive(Debug, Clone, Default)]
pub struct HwpConverter;

impl HwpConverter {
    /// Create an HWP converter
    pub fn new() -> Self {
        Self
    }
}

impl AlternateFormatConverter for HwpConverter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Hwp
    }

    fn default_selection(&self) -> SiblingSelection {
        SiblingSelection::NameSimilarity
    }

    fn can_convert(&self, source: &Path) -> bool {
        !is_hwpx(source)
    }

    fn convert(&self, source: &Path, output: Option<&Path>) -> Result<PathBuf> {
        ensure_exists(source)?;

        if is_hwpx(source) {
            return Err(ConvertError::Unsupported(format!(
                "{} is HWPX (OOXML-based), only HWP 5.x is supported",
                source.display()
            )));
        }

        let raw_text = extract_hwp_text(source)?;

        let output_path = prepare_output(source, output)?;
        let staging_dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);

        // Stage the raw text; the file is removed when `staged` drops
        let mut staged = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile_in(&staging_dir)
            .map_err(|e| ConvertError::io(&staging_dir, e))?;
        staged
            .write_all(raw_text.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| ConvertError::io(staged.path(), e))?;

        let text =
            fs::read_to_string(staged.path()).map_err(|e| ConvertError::io(staged.path(), e))?;
        let markdown = shape_markdown(&text, true);
        write_markdown(&output_path, &markdown)?;

        info!("Converted {} -> {}", source.display(), output_path.display());
        Ok(output_path)
    }
}

/// Extract the plain text of an HWP 5.x document
///
/// Paragraphs are separated by newlines; sections follow each other in
/// numeric order.
pub fn extract_hwp_text(path: &Path) -> Result<String> {
    let mut compound = cfb::open(path).map_err(|e| ConvertError::io(path, e))?;

    let header = read_stream(&mut compound, "/FileHeader")?;
    let properties = parse_file_header(&header)?;

    let sections = section_streams(&compound)?;
    if sections.is_empty() {
        return Err(ConvertError::Hwp("document has no BodyText sections".to_string()));
    }

    let mut text = String::new();
    for section in &sections {
        let raw = read_stream(&mut compound, section)?;
        let records = if properties & FLAG_COMPRESSED != 0 {
            inflate(&raw).map_err(|e| ConvertError::Hwp(format!("{}: {}", section, e)))?
        } else {
            raw
        };
        debug!("{}: {} bytes of records", section, records.len());
        append_section_text(&records, &mut text)?;
    }

    Ok(text)
}

fn is_hwpx(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("hwpx"))
}

fn read_stream<F: Read + Seek>(compound: &mut cfb::CompoundFile<F>, name: &str) -> Result<Vec<u8>> {
    let mut stream = compound
        .open_stream(name)
        .map_err(|e| ConvertError::Hwp(format!("missing stream {}: {}", name, e)))?;
    let mut buf = Vec::new();
    stream
        .read_to_end(&mut buf)
        .map_err(|e| ConvertError::Hwp(format!("reading {}: {}", name, e)))?;
    Ok(buf)
}

/// Validate the signature and return the property flags
fn parse_file_header(header: &[u8]) -> Result<u32> {
    if header.len() < FILE_HEADER_LEN || !header.starts_with(SIGNATURE) {
        return Err(ConvertError::Unsupported(
            "not an HWP 5.x document (bad FileHeader signature)".to_string(),
        ));
    }

    let properties = u32::from_le_bytes([header[36], header[37], header[38], header[39]]);

    if properties & FLAG_ENCRYPTED != 0 {
        return Err(ConvertError::Unsupported("password-protected HWP document".to_string()));
    }
    if properties & FLAG_DISTRIBUTION != 0 {
        return Err(ConvertError::Unsupported("distribution-only HWP document".to_string()));
    }
    Ok(properties)
}

/// `BodyText/Section{N}` stream paths in numeric order
fn section_streams<F: Read + Seek>(compound: &cfb::CompoundFile<F>) -> Result<Vec<String>> {
    let entries = compound
        .read_storage("/BodyText")
        .map_err(|e| ConvertError::Hwp(format!("missing BodyText storage: {}", e)))?;

    let mut sections: Vec<(u32, String)> = entries
        .filter(|entry| entry.is_stream())
        .filter_map(|entry| {
            let index = entry.name().strip_prefix("Section")?.parse::<u32>().ok()?;
            Some((index, format!("/BodyText/{}", entry.name())))
        })
        .collect();

    sections.sort();
    Ok(sections.into_iter().map(|(_, path)| path).collect())
}

fn inflate(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(raw).read_to_end(&mut out)?;
    Ok(out)
}

/// Walk the record stream and decode every paragraph text record
fn append_section_text(records: &[u8], text: &mut String) -> Result<()> {
    let mut pos = 0;

    while pos < records.len() {
        let header = read_u32(records, pos)
            .ok_or_else(|| ConvertError::Hwp(format!("truncated record header at {}", pos)))?;
        pos += 4;

        let tag = header & 0x3FF;
        let mut size = (header >> 20) & 0xFFF;
        if size == EXTENDED_SIZE {
            size = read_u32(records, pos)
                .ok_or_else(|| ConvertError::Hwp(format!("truncated record size at {}", pos)))?;
            pos += 4;
        }

        let end = pos
            .checked_add(size as usize)
            .filter(|end| *end <= records.len())
            .ok_or_else(|| ConvertError::Hwp(format!("record at {} overruns section", pos)))?;

        if tag == TAG_PARA_TEXT {
            decode_para_text(&records[pos..end], text);
            if !text.ends_with('\n') {
                text.push('\n');
            }
        }
        pos = end;
    }
    Ok(())
}

fn read_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    let slice = bytes.get(pos..pos + 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Decode a PARA_TEXT payload, skipping inline and extended control spans
///
/// Char controls (0, 10, 13, 24-31) occupy one code unit; every other code
/// below 32 occupies eight.
fn decode_para_text(payload: &[u8], text: &mut String) {
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let mut run: Vec<u16> = Vec::new();
    let mut i = 0;

    while i < units.len() {
        let unit = units[i];
        if unit >= 32 {
            run.push(unit);
            i += 1;
            continue;
        }

        text.push_str(&String::from_utf16_lossy(&run));
        run.clear();

        match unit {
            10 | 13 => text.push('\n'),
            30 | 31 => text.push(' '),
            9 => text.push('\t'),
            _ => {}
        }

        i += match unit {
            0 | 10 | 13 | 24..=31 => 1,
            _ => 8,
        };
    }

    text.push_str(&String::from_utf16_lossy(&run));
}
