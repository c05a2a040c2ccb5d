//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use invex_core::{DocumentOcr, OcrError, OcrLine, OcrPage, PdfExtractor};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// A one-page PDF whose content stream draws `lines` top to bottom in Courier.
pub fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("TL", vec![14.into()]),
        Operation::new("Td", vec![40.into(), 760.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

/// A one-page PDF with no text at all, as a scanner would produce.
pub fn blank_pdf() -> Vec<u8> {
    text_pdf(&[])
}

/// Typical invoice text, well over the OCR threshold.
pub const INVOICE_LINES: &[&str] = &[
    "Northwind Traders",
    "12 Harbour Road, Seattle",
    "Invoice Number: INV-1001",
    "Invoice Date: 2024-02-29",
    "Bill To: Contoso Ltd",
    "Description    Qty    Unit Price    Amount",
    "Coffee beans    5    12.00    60.00",
    "Subtotal    60.00",
    "Total Due    $60.00",
];

pub fn write_pdf(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Document OCR that returns fixed lines on a single page and counts calls.
pub struct MockOcr {
    lines: Vec<String>,
    pub calls: AtomicUsize,
}

impl MockOcr {
    pub fn new(lines: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentOcr for MockOcr {
    fn recognize_document(&self, _pdf: &PdfExtractor) -> Result<Vec<OcrPage>, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![OcrPage {
            number: 1,
            lines: self.lines.iter().map(|l| OcrLine::new(l.as_str(), 0.9)).collect(),
        }])
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Document OCR that always fails, standing in for broken models.
pub struct FailingOcr;

impl DocumentOcr for FailingOcr {
    fn recognize_document(&self, _pdf: &PdfExtractor) -> Result<Vec<OcrPage>, OcrError> {
        Err(OcrError::Recognition("model exploded".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Document OCR whose first call panics; later calls behave like [`MockOcr`].
pub struct PanicOnceOcr {
    inner: Arc<MockOcr>,
    calls: AtomicUsize,
}

impl PanicOnceOcr {
    pub fn new(lines: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            inner: MockOcr::new(lines),
            calls: AtomicUsize::new(0),
        })
    }
}

impl DocumentOcr for PanicOnceOcr {
    fn recognize_document(&self, pdf: &PdfExtractor) -> Result<Vec<OcrPage>, OcrError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("recognizer state corrupted");
        }
        self.inner.recognize_document(pdf)
    }

    fn name(&self) -> &str {
        "panic-once"
    }
}
