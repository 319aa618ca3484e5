//! Document splitting: cut a page window out of a PDF as a standalone file.
//!
//! ## Why split at all?
//!
//! The extraction service receives each batch as a complete, self-contained
//! PDF whose first page is the window's first page. That is what makes
//! batch-local numbering ("1", "2", "3") well defined on the service side —
//! the model is never shown pages outside the window, so it cannot leak
//! surrounding page numbers into its keys.
//!
//! lopdf works on in-memory buffers, which keeps the whole pipeline
//! file-system free: bytes in, sub-document bytes out.

use crate::error::Pdf2GridError;
use crate::pages::BatchWindow;
use tracing::debug;

/// A loaded source document, parsed once per run.
#[derive(Debug)]
pub struct SourceDocument {
    inner: lopdf::Document,
    page_count: usize,
}

impl SourceDocument {
    /// Parse a PDF from an encoded byte buffer.
    ///
    /// Fails with [`Pdf2GridError::DocumentLoad`] when the bytes are not a
    /// well-formed PDF.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Pdf2GridError> {
        let inner = lopdf::Document::load_mem(bytes).map_err(|e| Pdf2GridError::DocumentLoad {
            detail: e.to_string(),
        })?;
        let page_count = inner.get_pages().len();
        debug!("Loaded PDF: {} pages", page_count);
        Ok(Self { inner, page_count })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Serialize a new document containing exactly the window's pages,
    /// in window order, to the same encoding as the input.
    pub fn window_bytes(&self, window: &BatchWindow) -> Result<Vec<u8>, Pdf2GridError> {
        if window.is_empty() || window.end > self.page_count {
            return Err(Pdf2GridError::Internal(format!(
                "window {:?} out of range for {} pages",
                window, self.page_count
            )));
        }

        // lopdf numbers pages 1-based; drop everything outside the window.
        let delete: Vec<u32> = (1..=self.page_count as u32)
            .filter(|p| {
                let idx = (*p as usize) - 1;
                idx < window.start || idx >= window.end
            })
            .collect();

        let mut sub = self.inner.clone();
        sub.delete_pages(&delete);
        sub.prune_objects();
        sub.renumber_objects();
        sub.compress();

        let mut bytes = Vec::new();
        sub.save_to(&mut bytes)
            .map_err(|e| Pdf2GridError::Internal(format!("sub-document serialization: {e}")))?;

        debug!(
            "Window pages {} serialized to {} bytes",
            window.label(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a minimal n-page PDF with "Page N" text on each page.
    fn sample_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages);
        for i in 0..pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("Page {}", i + 1))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn load_reports_page_count() {
        let doc = SourceDocument::from_bytes(&sample_pdf(5)).unwrap();
        assert_eq!(doc.page_count(), 5);
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let err = SourceDocument::from_bytes(b"not a pdf").unwrap_err();
        assert!(matches!(err, Pdf2GridError::DocumentLoad { .. }));
    }

    #[test]
    fn window_produces_standalone_sub_document() {
        let doc = SourceDocument::from_bytes(&sample_pdf(5)).unwrap();

        let first = doc
            .window_bytes(&BatchWindow { start: 0, end: 3 })
            .unwrap();
        let second = doc
            .window_bytes(&BatchWindow { start: 3, end: 5 })
            .unwrap();

        assert_eq!(SourceDocument::from_bytes(&first).unwrap().page_count(), 3);
        assert_eq!(SourceDocument::from_bytes(&second).unwrap().page_count(), 2);
    }

    #[test]
    fn full_window_round_trips() {
        let doc = SourceDocument::from_bytes(&sample_pdf(2)).unwrap();
        let all = doc
            .window_bytes(&BatchWindow { start: 0, end: 2 })
            .unwrap();
        assert_eq!(SourceDocument::from_bytes(&all).unwrap().page_count(), 2);
    }

    #[test]
    fn out_of_range_window_rejected() {
        let doc = SourceDocument::from_bytes(&sample_pdf(2)).unwrap();
        assert!(doc.window_bytes(&BatchWindow { start: 0, end: 3 }).is_err());
        assert!(doc.window_bytes(&BatchWindow { start: 2, end: 2 }).is_err());
    }
}
