//! Attachment filter: extension allow-list, matched case-insensitively.

use std::collections::HashSet;

/// Decides which attachment filenames qualify for extraction
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    allowed: HashSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from an allow-list. Entries are normalized to
    /// lowercase with any leading dot stripped, so "pdf", ".pdf" and "PDF"
    /// all mean the same thing.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self { allowed }
    }

    /// Exact-extension, case-insensitive membership test.
    ///
    /// Filenames without an extension, or with a trailing dot, never
    /// qualify. This is a skip, not an error.
    pub fn qualifies(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => {
                self.allowed.contains(&ext.to_ascii_lowercase())
            }
            _ => false,
        }
    }
}

impl Default for ExtensionFilter {
    /// Reference policy: document and e-book formats
    fn default() -> Self {
        Self::new(["pdf", "epub"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifies_is_case_insensitive() {
        let filter = ExtensionFilter::default();

        assert!(filter.qualifies("report.pdf"));
        assert!(filter.qualifies("report.PDF"));
        assert!(filter.qualifies("book.epub"));
        assert!(filter.qualifies("book.EPUB"));
        assert!(filter.qualifies("book.ePub"));
    }

    #[test]
    fn test_exact_extension_only() {
        let filter = ExtensionFilter::default();

        assert!(!filter.qualifies("report.pdfx"));
        assert!(!filter.qualifies("report.pd"));
        assert!(!filter.qualifies("report"));
        assert!(!filter.qualifies("report."));
        assert!(!filter.qualifies(""));
        assert!(!filter.qualifies("notes.txt"));
    }

    #[test]
    fn test_only_last_extension_counts() {
        let filter = ExtensionFilter::default();

        assert!(filter.qualifies("archive.tar.pdf"));
        assert!(!filter.qualifies("report.pdf.bak"));
    }

    #[test]
    fn test_dotfile_with_allowed_extension() {
        let filter = ExtensionFilter::default();
        assert!(filter.qualifies(".pdf"));
    }

    #[test]
    fn test_allow_list_normalization() {
        let filter = ExtensionFilter::new([".PDF", "Epub"]);

        assert!(filter.qualifies("a.pdf"));
        assert!(filter.qualifies("b.EPUB"));
        assert!(!filter.qualifies("c.mobi"));
    }
}
