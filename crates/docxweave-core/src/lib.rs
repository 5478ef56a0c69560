//! docxweave-core - Word documents to HTML and Markdown
//!
//! Core library for docxweave: rebuilds list structure from Word's flat
//! numbered paragraphs and renders the loaded document.
//!
//! # Example
//!
//! ```
//! use docxweave_core::{convert_bytes, Settings};
//! use docxweave_ooxml::test_utils::{paragraph, DocxBuilder};
//!
//! let docx = DocxBuilder::new().body(&paragraph("Hello")).build();
//! let html = convert_bytes(&docx, &Settings::default()).unwrap();
//! assert!(html.contains("<p>Hello</p>"));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod footnote_tracker;
pub mod numbering_span;

use std::path::Path;

use docxweave_ooxml::WordDocument;

pub use config::{OutputFormat, Settings};
pub use error::{ConvertError, Result};
pub use export::{Exporter, FormatHooks, HtmlExporter, HtmlHooks, MarkdownExporter, MarkdownHooks};
pub use footnote_tracker::FootnoteTracker;
pub use numbering_span::{Component, NumberingItem, NumberingSpan, NumberingSpanBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render a loaded document as configured
pub fn convert(doc: &WordDocument, settings: &Settings) -> String {
    match settings.output.format {
        OutputFormat::Html => Exporter::new(HtmlHooks::new(settings.html.clone()))
            .with_layers(&settings.layers)
            .export(doc),
        OutputFormat::Markdown => Exporter::new(MarkdownHooks)
            .with_layers(&settings.layers)
            .export(doc),
    }
}

/// Load and render a DOCX held in memory
pub fn convert_bytes(bytes: &[u8], settings: &Settings) -> Result<String> {
    let doc = WordDocument::from_bytes(bytes)?;
    Ok(convert(&doc, settings))
}

/// Load and render a DOCX file
pub fn convert_file<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<String> {
    let doc = WordDocument::open(path)?;
    Ok(convert(&doc, settings))
}

/// HTML with default settings
pub fn to_html(doc: &WordDocument) -> String {
    HtmlExporter::html().export(doc)
}

/// Markdown with default settings
pub fn to_markdown(doc: &WordDocument) -> String {
    MarkdownExporter::markdown().export(doc)
}

/// List outline of the document body
pub fn outline(doc: &WordDocument) -> String {
    let components = NumberingSpanBuilder::new(&doc.styles, &doc.numbering)
        .build(doc.document.body.children());
    numbering_span::outline(&components)
}
