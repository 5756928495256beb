//! Document module - page text as delivered by a layout-aware extractor

/// Text of one page, split into its left and right columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageColumns {
    /// Text of the left half of the page
    pub left: String,
    /// Text of the right half of the page
    pub right: String,
}

impl PageColumns {
    /// Create page text from its two columns
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Read the page left column first, then right column
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.left.trim(), self.right.trim())
    }
}

/// Assemble the full document text, pages separated by a blank line
///
/// # Examples
///
/// ```
/// use taxonomist_domain::{assemble_text, PageColumns};
///
/// let pages = vec![PageColumns::new(" a ", "b"), PageColumns::new("c", "")];
/// assert_eq!(assemble_text(&pages), "a\nb\n\nc\n");
/// ```
pub fn assemble_text(pages: &[PageColumns]) -> String {
    pages
        .iter()
        .map(PageColumns::combined)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_trims_each_column() {
        let page = PageColumns::new("\n  left text \n", "  right text\n\n");
        assert_eq!(page.combined(), "left text\nright text");
    }

    #[test]
    fn test_assemble_empty_document() {
        assert_eq!(assemble_text(&[]), "");
    }

    #[test]
    fn test_assemble_keeps_page_order() {
        let pages = vec![PageColumns::new("1L", "1R"), PageColumns::new("2L", "2R")];
        assert_eq!(assemble_text(&pages), "1L\n1R\n\n2L\n2R");
    }
}
