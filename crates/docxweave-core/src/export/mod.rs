//! Export pipeline
//!
//! An [`Exporter`] walks a loaded [`WordDocument`] and renders it through a
//! [`FormatHooks`] implementation. The walk itself (style resolution, list
//! reconstruction, field codes, footnote numbering) is shared; the hooks
//! only turn already-decided structure into target syntax.
//!
//! Optional behaviors are [`ExportLayer`]s. They are applied in the order
//! they were added, each deciding whether to hand off to the next.
//!
//! # Example
//!
//! ```no_run
//! use docxweave_core::export::{Exporter, HtmlHooks, UpperRomanHeadings};
//! use docxweave_ooxml::WordDocument;
//!
//! let doc = WordDocument::open("report.docx")?;
//! let html = Exporter::new(HtmlHooks::default())
//!     .with_layer(UpperRomanHeadings)
//!     .export(&doc);
//! # Ok::<(), docxweave_ooxml::OoxmlError>(())
//! ```

use std::collections::BTreeSet;

use docxweave_ooxml::model::{Indentation, Justification};
use docxweave_ooxml::{ImageSize, WordDocument};

use crate::config::LayerSettings;
use crate::numbering_span::NumberingSpan;

pub mod fields;
pub mod html;
pub mod layers;
pub mod markdown;
pub mod walker;

pub use html::HtmlHooks;
pub use layers::{ExportLayer, FakedVerticalAlign, Next, RunContext, UpperRomanHeadings};
pub use markdown::MarkdownHooks;
pub use walker::Walker;

/// Where a block is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Body,
    ListItem,
    Cell,
    TextBox,
    Footnote,
}

/// Kind of an already-rendered block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    Table,
}

/// Output of one block, before the container joins its blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub kind: BlockKind,
    pub content: String,
}

/// Inline styling applied around run content
///
/// Variant order is wrapping order: earlier variants end up innermost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunStyle {
    /// Monospace font
    Code,
    Bold,
    Italic,
    Underline,
    Caps,
    SmallCaps,
    Strike,
    Hidden,
    Superscript,
    Subscript,
}

/// The styles of one run; a set, so no style wraps twice
pub type RunStyles = BTreeSet<RunStyle>;

/// A resolved image reference
#[derive(Debug, Clone, Copy)]
pub struct ImageData<'a> {
    /// Package URI, or the URL of an external image
    pub target: &'a str,
    pub is_external: bool,
    /// Image bytes for package images
    pub bytes: Option<&'a [u8]>,
    pub alt: Option<&'a str>,
    pub size: Option<ImageSize>,
}

/// A rendered table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub content: String,
    pub colspan: u32,
    /// 0 for a cell merged into the one above
    pub rowspan: u32,
}

/// Target syntax for each node kind
pub trait FormatHooks {
    /// Assemble the final document
    fn document(&self, body: String, footnotes: String, page_width: Option<u32>) -> String;

    fn paragraph(&self, content: String, container: Container) -> String;

    fn heading(&self, content: String, level: u8, container: Container) -> String;

    /// Combine the non-empty blocks of one container
    fn join_blocks(&self, container: Container, blocks: Vec<RenderedBlock>) -> String;

    /// Justification and indentation of a paragraph
    fn block_style(
        &self,
        content: String,
        justification: Option<&Justification>,
        indentation: Option<&Indentation>,
    ) -> String;

    fn run_style(&self, content: String, style: RunStyle) -> String;

    fn text(&self, text: &str) -> String;

    fn tab(&self) -> String;

    fn line_break(&self) -> String;

    fn page_break(&self) -> String;

    fn insertion(&self, content: String) -> String;

    fn deletion(&self, content: String) -> String;
    /// Whether deleted content is rendered at all; when not, footnotes
    /// cited only inside deletions are never numbered
    fn renders_deletions(&self) -> bool {
        true
    }

    fn hyperlink(&self, content: String, href: &str) -> String;

    fn image(&self, image: ImageData<'_>) -> String;

    /// A list; `items` are rendered and at least one is non-empty
    fn list(&self, span: &NumberingSpan<'_>, items: Vec<String>) -> String;

    fn table(&self, rows: Vec<Vec<RenderedCell>>) -> String;

    /// In-text citation of footnote `index`
    fn footnote_reference(&self, index: usize) -> String;

    /// The footnote's own back-reference mark
    fn footnote_mark(&self, index: usize) -> String;

    /// The footnote list; called only when something was cited
    fn footnotes(&self, notes: Vec<(usize, String)>) -> String;
}

/// Renders documents with one set of hooks and an ordered layer chain
pub struct Exporter<H> {
    hooks: H,
    layers: Vec<Box<dyn ExportLayer>>,
}

/// HTML exporter
pub type HtmlExporter = Exporter<HtmlHooks>;

/// Markdown exporter
pub type MarkdownExporter = Exporter<MarkdownHooks>;

impl<H: FormatHooks> Exporter<H> {
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            layers: Vec::new(),
        }
    }

    /// Append a layer; layers added first intercept first
    pub fn with_layer(mut self, layer: impl ExportLayer + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Append the layers enabled in `settings`
    pub fn with_layers(mut self, settings: &LayerSettings) -> Self {
        if settings.upper_roman_headings {
            self = self.with_layer(UpperRomanHeadings);
        }
        if settings.faked_vertical_align {
            self = self.with_layer(FakedVerticalAlign);
        }
        self
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Render a whole document
    ///
    /// Each call starts with fresh footnote numbering.
    pub fn export(&self, doc: &WordDocument) -> String {
        Walker::new(doc, &self.hooks, &self.layers).export()
    }
}

impl HtmlExporter {
    pub fn html() -> Self {
        Exporter::new(HtmlHooks::default())
    }
}

impl MarkdownExporter {
    pub fn markdown() -> Self {
        Exporter::new(MarkdownHooks)
    }
}

/// Twips to em at 12pt (240 twips per em), two decimals
pub(crate) fn twips_to_em(twips: i32) -> String {
    format!("{:.2}em", f64::from(twips) / 240.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_style_order() {
        let styles: RunStyles = [RunStyle::Subscript, RunStyle::Bold, RunStyle::Italic, RunStyle::Bold]
            .into_iter()
            .collect();
        assert_eq!(
            styles.into_iter().collect::<Vec<_>>(),
            vec![RunStyle::Bold, RunStyle::Italic, RunStyle::Subscript]
        );
    }

    #[test]
    fn test_twips_to_em() {
        assert_eq!(twips_to_em(720), "3.00em");
        assert_eq!(twips_to_em(-360), "-1.50em");
        assert_eq!(twips_to_em(100), "0.42em");
    }

    #[test]
    fn test_layers_from_settings() {
        let exporter = Exporter::html().with_layers(&LayerSettings {
            upper_roman_headings: true,
            faked_vertical_align: true,
        });
        assert_eq!(exporter.layers.len(), 2);
        assert_eq!(Exporter::markdown().with_layers(&LayerSettings::default()).layers.len(), 0);
    }
}
