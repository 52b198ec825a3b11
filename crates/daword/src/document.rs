//! Document host abstraction.
//!
//! The Office host owns the document. The task pane only ever needs two
//! calls: one batched read of the body text and one synchronized write at
//! the end of the current selection.

use crate::error::{Error, Result};
use crate::placeholder::{scan_text, Placeholder};
use std::ops::Range;
use tracing::{debug, error};

/// Access to the open document.
pub trait DocumentHost {
    /// Read the full plain-text body in a single request/sync cycle.
    fn body_text(&mut self) -> Result<String>;

    /// Insert `text` at the end of the current selection and sync.
    fn insert_at_selection_end(&mut self, text: &str) -> Result<()>;
}

/// In-memory document with a byte-offset selection.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    body: String,
    selection: Range<usize>,
    writes: usize,
}

impl MemoryDocument {
    /// Create a document whose selection is a caret at the end of `body`.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        let end = body.len();
        Self {
            body,
            selection: end..end,
            writes: 0,
        }
    }

    /// Replace the selection range.
    #[must_use]
    pub fn with_selection(mut self, selection: Range<usize>) -> Self {
        self.selection = selection;
        self
    }

    /// Current document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Number of writes performed against this document.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl DocumentHost for MemoryDocument {
    fn body_text(&mut self) -> Result<String> {
        Ok(self.body.clone())
    }

    fn insert_at_selection_end(&mut self, text: &str) -> Result<()> {
        let at = self.selection.end;
        if at > self.body.len() || !self.body.is_char_boundary(at) {
            return Err(Error::Host(format!(
                "selection end {} is not a valid position",
                at
            )));
        }
        self.body.insert_str(at, text);
        self.writes += 1;
        Ok(())
    }
}

/// Scan the open document for placeholders.
///
/// Host failures are logged and returned; no partial list is produced.
pub fn scan_document<H: DocumentHost + ?Sized>(host: &mut H) -> Result<Vec<Placeholder>> {
    let text = match host.body_text() {
        Ok(text) => text,
        Err(e) => {
            error!("Error scanning document: {}", e);
            return Err(e);
        }
    };
    debug!("Scanning document text ({} bytes)", text.len());

    let found = scan_text(&text);
    debug!(
        "Found variables: {:?}",
        found.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
    );
    Ok(found)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Host whose every call fails.
    pub(crate) struct BrokenHost;

    impl DocumentHost for BrokenHost {
        fn body_text(&mut self) -> Result<String> {
            Err(Error::Host("document is not available".to_string()))
        }

        fn insert_at_selection_end(&mut self, _text: &str) -> Result<()> {
            Err(Error::Host("document is read-only".to_string()))
        }
    }

    #[test]
    fn test_insert_at_caret() {
        let mut doc = MemoryDocument::new("Hello");
        doc.insert_at_selection_end(" world").unwrap();
        assert_eq!(doc.text(), "Hello world");
        assert_eq!(doc.write_count(), 1);
    }

    #[test]
    fn test_insert_after_selected_range() {
        let mut doc = MemoryDocument::new("one two three").with_selection(4..7);
        doc.insert_at_selection_end("!").unwrap();
        assert_eq!(doc.text(), "one two! three");
    }

    #[test]
    fn test_insert_rejects_out_of_range_selection() {
        let mut doc = MemoryDocument::new("abc").with_selection(0..10);
        assert!(doc.insert_at_selection_end("x").is_err());
        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.write_count(), 0);
    }

    #[test]
    fn test_insert_rejects_mid_char_selection() {
        let mut doc = MemoryDocument::new("é").with_selection(0..1);
        assert!(doc.insert_at_selection_end("x").is_err());
    }

    #[test]
    fn test_scan_document_reads_body() {
        let mut doc = MemoryDocument::new("{{ a }} {{ b }} {{ a }}");
        let found = scan_document(&mut doc).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(doc.write_count(), 0);
    }

    #[test]
    fn test_scan_document_propagates_host_failure() {
        let err = scan_document(&mut BrokenHost).unwrap_err();
        assert!(matches!(err, Error::Host(_)));
    }
}
