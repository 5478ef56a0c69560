//! # docxweave-ooxml
//!
//! Reading side of docxweave: everything between a `.docx` file and a typed,
//! style-aware document tree.
//!
//! This crate provides functionality to:
//! - Unpack DOCX packages and resolve part relationships
//! - Parse parts into a generic XML tree and then into typed nodes
//! - Read styles, numbering definitions, footnotes and the font table
//! - Compute effective (cascaded) paragraph and run properties
//!
//! ## Example: Reading a Document
//!
//! ```no_run
//! use docxweave_ooxml::{Block, WordDocument};
//!
//! let doc = WordDocument::open("document.docx")?;
//! for block in doc.document.body.children() {
//!     if let Block::Paragraph(p) = block {
//!         println!("{:?}: {}", p.heading_level(&doc.styles), p.plain_text());
//!     }
//! }
//! # Ok::<(), docxweave_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod error;
pub mod fonts;
pub mod footnotes;
pub mod model;
pub mod numbering;
pub mod package;
pub mod properties;
pub mod relationships;
pub mod styles;
pub mod test_utils;
pub mod xml;

pub use archive::{OoxmlArchive, PartContainer};
pub use error::{OoxmlError, Result};
pub use fonts::FontTable;
pub use footnotes::{Footnote, Footnotes};
pub use model::{
    Block, Body, Document, Drawing, FromXml, Hyperlink, ImageSize, Inline, LoadContext, NodeId,
    Paragraph, ParagraphProperties, Picture, Run, RunContent, RunProperties, Table, TableCell,
    TableRow,
};
pub use numbering::{Level, NumberFormat, NumberingDefinitions};
pub use package::WordDocument;
pub use relationships::{Relationship, RelationshipResolver, Relationships};
pub use styles::{Style, StyleSheet, StyleType};
pub use xml::{XmlElement, XmlNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
