//! Typed document model
//!
//! Every supported WordprocessingML element has a Rust type implementing
//! [`FromXml`]. Heterogeneous child collections (block content, paragraph
//! content) are declared once with [`xml_children!`], which expands to the
//! shared loading routine: walk the element's children in order, pick the
//! variant registered for each tag, skip everything else.
//!
//! Unknown tags are ignored so newer OOXML content degrades to missing
//! output instead of failing the conversion.

use tracing::warn;

use crate::error::{OoxmlError, Result};
use crate::xml::XmlElement;

pub mod document;
pub mod image;
pub mod paragraph;
pub mod run;
pub mod table;

pub use document::{flatten_blocks, AlternateContentBlock, Block, Body, CustomXmlBlock, Document, SdtBlock};
pub use image::{Drawing, ImageSize, Picture, TextBox};
pub use paragraph::{
    DeletedRun, Hyperlink, Indentation, Inline, InsertedRun, Justification,
    CustomXmlRun, NumberingProperties, Paragraph, ParagraphProperties, SdtRun, SimpleField,
    SmartTagRun,
};
pub use run::{BreakKind, FieldCharKind, OnOff, Run, RunContent, RunProperties, VerticalAlign};
pub use table::{Table, TableCell, TableRow, VMerge};

/// An element type that can be loaded from the generic XML tree
pub trait FromXml: Sized {
    /// Local tag name this type is loaded from
    const TAG: &'static str;

    /// Build the node; unknown children and missing attributes never fail
    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self;
}

/// Load `T` from an element that must carry `T::TAG`
pub fn load_strict<T: FromXml>(element: &XmlElement, ctx: &mut LoadContext) -> Result<T> {
    if element.tag != T::TAG {
        return Err(OoxmlError::ShapeMismatch {
            expected: T::TAG,
            found: element.tag.clone(),
        });
    }
    Ok(T::from_xml(element, ctx))
}

/// Document-unique identity of a block-level node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub u32);

/// State shared by one load of a package
///
/// Hands out [`NodeId`]s and bounds nesting depth, which breaks the loop of
/// self-recursive content (tables inside cells, tags inside tags).
#[derive(Debug, Default)]
pub struct LoadContext {
    next_id: u32,
    depth: usize,
}

impl LoadContext {
    /// Nesting ceiling; deeper content is dropped
    pub const MAX_DEPTH: usize = 256;

    /// Create a fresh context
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next node identity
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `load` one level deeper, or return `None` past the ceiling
    pub fn descend<T>(&mut self, tag: &str, load: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.depth >= Self::MAX_DEPTH {
            warn!(tag, depth = self.depth, "nesting too deep, dropping content");
            return None;
        }
        self.depth += 1;
        let node = load(self);
        self.depth -= 1;
        Some(node)
    }
}

/// Declare a loader for a heterogeneous child collection
///
/// ```ignore
/// xml_children! {
///     pub fn load_blocks -> Block {
///         "p" => Paragraph(Paragraph),
///         "tbl" => Table(Table),
///     }
/// }
/// ```
///
/// expands to `pub fn load_blocks(&XmlElement, &mut LoadContext) -> Vec<Block>`.
#[macro_export]
macro_rules! xml_children {
    ($vis:vis fn $name:ident -> $enum:ident { $($tag:literal => $variant:ident($ty:ty)),+ $(,)? }) => {
        $vis fn $name(
            parent: &$crate::xml::XmlElement,
            ctx: &mut $crate::model::LoadContext,
        ) -> Vec<$enum> {
            let mut children = Vec::new();
            for child in parent.elements() {
                match child.tag.as_str() {
                    $(
                        $tag => {
                            let node = ctx.descend($tag, |ctx| {
                                <$ty as $crate::model::FromXml>::from_xml(child, ctx)
                            });
                            if let Some(node) = node {
                                children.push($enum::$variant(node));
                            }
                        }
                    )+
                    _ => {}
                }
            }
            children
        }
    };
}

/// Parse an integer attribute, tolerating junk
pub(crate) fn parse_int<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
