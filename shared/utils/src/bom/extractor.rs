//! Tabular Extractors
//!
//! One adapter per document format. Each adapter turns the raw bytes of a
//! document into one or more [`RawGrid`]s and knows nothing about headers or
//! BOM semantics. Supports delimited text (CSV/TXT), Excel (XLSX/XLS), Word
//! tables (DOCX) and text-based PDF.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use bomdiff_models::{RawCell, RawGrid, RawRow};

use crate::error::{BomDiffError, BomDiffResult};

/// Supported BOM file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BomFormat {
    Csv,
    Text,
    Excel, // XLSX/XLS
    Docx,
    Pdf,
}

impl BomFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "txt" => Some(Self::Text),
            "xlsx" | "xls" => Some(Self::Excel),
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect format from content type header
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or("").trim();
        match mime {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "text/plain" => Some(Self::Text),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Excel),
            "application/vnd.ms-excel" => Some(Self::Excel),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some(Self::Docx),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Text => "TXT",
            Self::Excel => "Excel",
            Self::Docx => "DOCX",
            Self::Pdf => "PDF",
        }
    }

    /// Extractor adapter for this format
    pub fn extractor(&self) -> Box<dyn TabularExtractor> {
        match self {
            Self::Csv => Box::new(DelimitedExtractor::new()),
            Self::Text => Box::new(TextExtractor),
            Self::Excel => Box::new(ExcelExtractor),
            Self::Docx => Box::new(DocxExtractor),
            Self::Pdf => Box::new(PdfExtractor),
        }
    }
}

/// Converts a source document into raw grids.
///
/// Formats with a single table return exactly one grid. Word documents return
/// one grid per top-level table.
pub trait TabularExtractor: Send + Sync {
    fn extract(&self, document: &str, data: &[u8]) -> BomDiffResult<Vec<RawGrid>>;
}

const CSV_SNIFF_BYTES: usize = 1024;
const TXT_SNIFF_BYTES: usize = 2048;
const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Runs of two or more whitespace characters separate columns in plain text
fn column_gap() -> &'static Regex {
    static COLUMN_GAP: OnceLock<Regex> = OnceLock::new();
    COLUMN_GAP.get_or_init(|| Regex::new(r"\s{2,}").expect("column gap pattern is valid"))
}

/// CSV extractor with delimiter sniffing
#[derive(Debug, Clone, Default)]
pub struct DelimitedExtractor {
    delimiter: Option<u8>,
}

impl DelimitedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip sniffing and always use `delimiter`
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }
}

impl TabularExtractor for DelimitedExtractor {
    fn extract(&self, document: &str, data: &[u8]) -> BomDiffResult<Vec<RawGrid>> {
        let text = decode_text(document, data)?;
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| sniff_delimiter(prefix(text, CSV_SNIFF_BYTES)));
        debug!(document, delimiter = %(delimiter as char).escape_debug(), "Reading delimited text");

        Ok(vec![read_delimited(document, text, delimiter)?])
    }
}

/// Plain text extractor.
///
/// Uses tab, comma or semicolon as the delimiter when one appears in the
/// leading sample, otherwise splits lines on wide whitespace gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TabularExtractor for TextExtractor {
    fn extract(&self, document: &str, data: &[u8]) -> BomDiffResult<Vec<RawGrid>> {
        let text = decode_text(document, data)?;
        let sample = prefix(text, TXT_SNIFF_BYTES);

        let delimiter = [b'\t', b',', b';']
            .into_iter()
            .find(|d| sample.as_bytes().contains(d));

        let grid = match delimiter {
            Some(delimiter) => read_delimited(document, text, delimiter)?,
            None => rows_from_text_block(text),
        };

        Ok(vec![grid])
    }
}

/// Excel extractor, reads the first worksheet
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelExtractor;

impl TabularExtractor for ExcelExtractor {
    fn extract(&self, document: &str, data: &[u8]) -> BomDiffResult<Vec<RawGrid>> {
        use calamine::{Xls, Xlsx};

        // XLSX is a ZIP container, legacy XLS is an OLE compound file
        let grid = if data.starts_with(b"PK") {
            read_first_sheet::<Xlsx<_>>(document, data)?
        } else {
            read_first_sheet::<Xls<_>>(document, data)?
        };

        Ok(vec![grid])
    }
}

fn read_first_sheet<'a, R>(document: &str, data: &'a [u8]) -> BomDiffResult<RawGrid>
where
    R: calamine::Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    use calamine::{open_workbook_from_rs, DataType};

    let mut workbook: R = open_workbook_from_rs(Cursor::new(data))
        .map_err(|e| BomDiffError::extraction(document, format!("Failed to open workbook: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| BomDiffError::extraction(document, "No sheets found in workbook"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| BomDiffError::extraction(document, format!("Sheet '{}' is missing", sheet_name)))?
        .map_err(|e| BomDiffError::extraction(document, format!("Failed to read worksheet: {}", e)))?;

    let rows: Vec<RawRow> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    DataType::Empty | DataType::Error(_) => None,
                    DataType::String(text) if text.is_empty() => None,
                    DataType::String(text) => Some(RawCell::Text(text.clone())),
                    DataType::Int(value) => Some(RawCell::Integer(*value)),
                    DataType::Float(value) => Some(RawCell::Float(*value)),
                    DataType::Bool(value) => Some(RawCell::Bool(*value)),
                    other => Some(RawCell::Text(other.to_string())),
                })
                .collect()
        })
        .collect();

    debug!(document, sheet = %sheet_name, rows = rows.len(), "Read worksheet");
    Ok(RawGrid::new(rows))
}

/// Word document extractor, one grid per top-level table
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl TabularExtractor for DocxExtractor {
    fn extract(&self, document: &str, data: &[u8]) -> BomDiffResult<Vec<RawGrid>> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| BomDiffError::extraction(document, format!("Not a DOCX container: {}", e)))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| BomDiffError::extraction(document, format!("Missing document body: {}", e)))?
            .read_to_string(&mut xml)
            .map_err(|e| BomDiffError::extraction(document, e))?;

        let tables = parse_document_tables(document, &xml)?;
        if tables.is_empty() {
            return Err(BomDiffError::extraction(document, "No tables found in the DOCX file"));
        }

        Ok(tables)
    }
}

/// Collect the top-level tables of a WordprocessingML body.
///
/// Cell text is the concatenation of its text runs, with paragraphs joined by
/// newlines. Nested tables contribute their text to the enclosing cell.
/// Rows are laid out on the table grid: a cell spanning several grid columns
/// (`w:gridSpan`) holds its text in the first of them and leaves the rest
/// empty, and a vertical merge continuation (`w:vMerge`) repeats the text of
/// the cell above.
pub fn parse_document_tables(document: &str, xml: &str) -> BomDiffResult<Vec<RawGrid>> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);

    let mut tables = Vec::new();
    let mut depth = 0usize;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<String> = None;
    let mut layout = CellLayout::default();
    let mut paragraphs = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| BomDiffError::extraction(document, format!("XML parse error: {}", e)))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"tbl" => {
                    depth += 1;
                    if depth == 1 {
                        rows.clear();
                    }
                }
                b"tr" if depth == 1 => row.clear(),
                b"tc" if depth == 1 => {
                    cell = Some(String::new());
                    layout = CellLayout::default();
                    paragraphs = 0;
                }
                b"gridSpan" | b"vMerge" if depth == 1 => layout.apply(e),
                b"p" => {
                    if let Some(text) = cell.as_mut() {
                        if paragraphs > 0 {
                            text.push('\n');
                        }
                        paragraphs += 1;
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(ref e) => {
                let name = e.local_name();
                if depth == 1 && matches!(name.as_ref(), b"gridSpan" | b"vMerge") {
                    layout.apply(e);
                } else if let Some(text) = cell.as_mut() {
                    match name.as_ref() {
                        b"tab" => text.push(' '),
                        b"br" => text.push('\n'),
                        b"p" => {
                            if paragraphs > 0 {
                                text.push('\n');
                            }
                            paragraphs += 1;
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(e) if in_text => {
                if let Some(text) = cell.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| BomDiffError::extraction(document, err))?;
                    text.push_str(&unescaped);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tc" if depth == 1 => {
                    if let Some(mut text) = cell.take() {
                        if layout.continues_merge {
                            text = rows
                                .last()
                                .and_then(|above| above.get(row.len()))
                                .cloned()
                                .unwrap_or(text);
                        }
                        row.push(text);
                        row.extend(std::iter::repeat(String::new()).take(layout.span - 1));
                    }
                }
                b"tr" if depth == 1 => rows.push(std::mem::take(&mut row)),
                b"tbl" => {
                    if depth == 1 {
                        tables.push(RawGrid::from_text_rows(std::mem::take(&mut rows)));
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(document, tables = tables.len(), "Parsed document tables");
    Ok(tables)
}

/// Grid placement of one table cell, from its `w:tcPr`
#[derive(Debug, Clone, Copy)]
struct CellLayout {
    /// Grid columns covered, at least 1
    span: usize,
    /// Continuation of a vertical merge started in a row above
    continues_merge: bool,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self {
            span: 1,
            continues_merge: false,
        }
    }
}

impl CellLayout {
    fn apply(&mut self, element: &quick_xml::events::BytesStart<'_>) {
        let value = element
            .attributes()
            .flatten()
            .find(|attr| attr.key.local_name().as_ref() == b"val")
            .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());

        match element.local_name().as_ref() {
            b"gridSpan" => {
                self.span = value.and_then(|v| v.trim().parse().ok()).filter(|n| *n > 0).unwrap_or(1);
            }
            // A bare <w:vMerge/> means "continue"
            b"vMerge" => self.continues_merge = value.as_deref().map_or(true, |v| v == "continue"),
            _ => {}
        }
    }
}

/// Text-based PDF extractor.
///
/// Only the text layer is used; columns are reconstructed from wide
/// whitespace gaps, so complex layouts may not survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TabularExtractor for PdfExtractor {
    fn extract(&self, document: &str, data: &[u8]) -> BomDiffResult<Vec<RawGrid>> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| BomDiffError::extraction(document, format!("Failed to extract text from PDF: {}", e)))?;

        let lines = text.lines().filter(|line| !line.trim().is_empty());
        Ok(vec![split_lines(lines)])
    }
}

/// Split every line of a text block on wide whitespace gaps
pub fn rows_from_text_block(text: &str) -> RawGrid {
    split_lines(text.lines())
}

fn split_lines<'a>(lines: impl Iterator<Item = &'a str>) -> RawGrid {
    let gap = column_gap();
    RawGrid::from_text_rows(lines.map(|line| gap.split(line.trim()).collect::<Vec<_>>()))
}

fn read_delimited(document: &str, text: &str, delimiter: u8) -> BomDiffResult<RawGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            BomDiffError::extraction(document, format!("Row {}: Parse error - {}", idx + 1, e))
        })?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(RawGrid::from_text_rows(rows))
}

/// Pick the delimiter of a delimited text sample.
///
/// Each candidate is counted per line, outside quotes. The candidate whose
/// non-zero count is the same on the most lines wins, so a delimiter that
/// also shows up inside unquoted free text loses to the one that shapes the
/// columns. Ties go to the higher total count, then to the earlier
/// candidate. Comma when no candidate occurs.
pub fn sniff_delimiter(sample: &str) -> u8 {
    let mut lines: Vec<&str> = sample.lines().filter(|line| !line.trim().is_empty()).collect();
    // The sample may end mid-line
    if lines.len() > 1 && !sample.ends_with('\n') {
        lines.pop();
    }

    let mut per_line = vec![[0usize; SNIFF_CANDIDATES.len()]; lines.len()];
    let mut in_quotes = false;
    for (counts, line) in per_line.iter_mut().zip(&lines) {
        for byte in line.bytes() {
            if byte == b'"' {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }
            if let Some(idx) = SNIFF_CANDIDATES.iter().position(|c| *c == byte) {
                counts[idx] += 1;
            }
        }
    }

    let mut best: Option<(usize, usize, usize)> = None;
    for idx in 0..SNIFF_CANDIDATES.len() {
        let total: usize = per_line.iter().map(|counts| counts[idx]).sum();
        if total == 0 {
            continue;
        }

        // Lines agreeing on the most common non-zero count
        let mut frequency: BTreeMap<usize, usize> = BTreeMap::new();
        for counts in per_line.iter().filter(|counts| counts[idx] > 0) {
            *frequency.entry(counts[idx]).or_default() += 1;
        }
        let consistent = frequency.values().copied().max().unwrap_or(0);

        let better = match best {
            None => true,
            Some((_, best_consistent, best_total)) => (consistent, total) > (best_consistent, best_total),
        };
        if better {
            best = Some((idx, consistent, total));
        }
    }

    best.map_or(b',', |(idx, _, _)| SNIFF_CANDIDATES[idx])
}

fn decode_text<'a>(document: &str, data: &'a [u8]) -> BomDiffResult<&'a str> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    std::str::from_utf8(data)
        .map_err(|e| BomDiffError::extraction(document, format!("File is not valid UTF-8: {}", e)))
}

/// Longest prefix of `text` not exceeding `max_bytes`, on a char boundary
fn prefix(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
