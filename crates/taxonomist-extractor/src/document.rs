//! PDF text extraction, one left/right column pair per page

use crate::error::ExtractorError;
use pdf_oxide::PdfDocument;
use std::io::Write;
use taxonomist_domain::traits::DocumentReader;
use taxonomist_domain::PageColumns;
use tracing::{debug, warn};

/// Spans whose baselines differ by less than this share a line
const LINE_TOLERANCE: f32 = 1.0;

/// A run of text with its horizontal extent and baseline
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedText {
    /// Left edge
    pub x: f32,
    /// Vertical position
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Text content
    pub text: String,
}

impl PositionedText {
    /// Create a positioned span
    pub fn new(x: f32, y: f32, width: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            text: text.into(),
        }
    }

    fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Split a page's spans into a left and a right column
///
/// The split is at the horizontal midpoint of the page's text extent. Spans
/// keep their reading order within each column.
pub fn split_columns(spans: &[PositionedText]) -> PageColumns {
    let (min_x, max_x) = spans.iter().fold((f32::MAX, f32::MIN), |(lo, hi), span| {
        (lo.min(span.x), hi.max(span.x + span.width))
    });
    let midpoint = (min_x + max_x) / 2.0;

    let (left, right): (Vec<&PositionedText>, Vec<&PositionedText>) =
        spans.iter().partition(|span| span.center() < midpoint);

    PageColumns::new(join_lines(&left), join_lines(&right))
}

fn join_lines(spans: &[&PositionedText]) -> String {
    let mut text = String::new();
    let mut previous_y: Option<f32> = None;

    for span in spans {
        match previous_y {
            Some(y) if (y - span.y).abs() < LINE_TOLERANCE => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        text.push_str(&span.text);
        previous_y = Some(span.y);
    }

    text
}

/// Reads uploaded PDF bytes with `pdf_oxide`
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfDocumentReader;

impl PdfDocumentReader {
    /// Create a new reader
    pub fn new() -> Self {
        Self
    }
}

impl DocumentReader for PdfDocumentReader {
    type Error = ExtractorError;

    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<PageColumns>, Self::Error> {
        let mut temp_file = tempfile::NamedTempFile::new().map_err(|e| {
            ExtractorError::Extraction(format!("failed to create temp file: {}", e))
        })?;
        temp_file
            .write_all(bytes)
            .map_err(|e| ExtractorError::Extraction(format!("failed to write temp file: {}", e)))?;

        let mut document = PdfDocument::open(temp_file.path())
            .map_err(|e| ExtractorError::Extraction(format!("failed to parse PDF: {}", e)))?;
        let page_count = document
            .page_count()
            .map_err(|e| ExtractorError::Extraction(format!("failed to read page count: {}", e)))?;

        let mut pages = Vec::with_capacity(page_count);
        for page_index in 0..page_count {
            let spans = page_spans(page_index, document.extract_spans(page_index))?;

            let positioned: Vec<PositionedText> = spans
                .into_iter()
                .map(|span| {
                    PositionedText::new(span.bbox.x, span.bbox.y, span.bbox.width, span.text)
                })
                .collect();
            pages.push(split_columns(&positioned));
        }

        debug!(page_count, "PDF pages extracted");
        Ok(pages)
    }
}

/// Marker in the reader's error for a page without a content stream
const NO_CONTENTS: &str = "no Contents";

/// Resolve one page's span extraction. A page with no content stream reads
/// as empty; any other failure aborts the document.
fn page_spans<T, E: std::fmt::Display>(
    page_index: usize,
    result: Result<Vec<T>, E>,
) -> Result<Vec<T>, ExtractorError> {
    match result {
        Ok(spans) => Ok(spans),
        Err(e) if e.to_string().contains(NO_CONTENTS) => {
            warn!(page = page_index + 1, error = %e, "Page has no content stream");
            Ok(Vec::new())
        }
        Err(e) => Err(ExtractorError::Extraction(format!(
            "failed to read page {}: {}",
            page_index + 1,
            e
        ))),
    }
}
