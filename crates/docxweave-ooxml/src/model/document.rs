//! Document root, body and block-level content

use std::collections::HashMap;

use super::paragraph::Paragraph;
use super::table::Table;
use super::{parse_int, FromXml, LoadContext, NodeId};
use crate::xml::XmlElement;

/// The `w:document` root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub body: Body,
}

impl FromXml for Document {
    const TAG: &'static str = "document";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            body: element
                .child(Body::TAG)
                .map(|body| Body::from_xml(body, ctx))
                .unwrap_or_default(),
        }
    }
}

/// The `w:body` element
///
/// Keeps a position index over its children so sibling lookups by
/// [`NodeId`] are O(1). The children are private to keep the index valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    children: Vec<Block>,
    positions: HashMap<NodeId, usize>,
    /// Page width of the final section in twips (`w:sectPr/w:pgSz/@w:w`)
    pub page_width: Option<u32>,
}

impl FromXml for Body {
    const TAG: &'static str = "body";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let page_width = element
            .child("sectPr")
            .and_then(|sect| sect.child("pgSz"))
            .and_then(|size| parse_int(size.attr("w")));
        Self::new(load_blocks(element, ctx), page_width)
    }
}

impl Body {
    /// Build a body and its sibling index
    pub fn new(children: Vec<Block>, page_width: Option<u32>) -> Self {
        let positions = children
            .iter()
            .enumerate()
            .map(|(index, block)| (block.id(), index))
            .collect();
        Self {
            children,
            positions,
            page_width,
        }
    }

    /// Block children in document order
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// Position of a child by identity
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// The child following `id`
    pub fn next_sibling(&self, id: NodeId) -> Option<&Block> {
        let index = self.position(id)?;
        self.children.get(index + 1)
    }

    /// The child preceding `id`
    pub fn previous_sibling(&self, id: NodeId) -> Option<&Block> {
        let index = self.position(id)?;
        index.checked_sub(1).and_then(|i| self.children.get(i))
    }
}

/// Block-level content
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Sdt(SdtBlock),
    AlternateContent(AlternateContentBlock),
    CustomXml(CustomXmlBlock),
}

impl Block {
    /// Identity of the node
    pub fn id(&self) -> NodeId {
        match self {
            Block::Paragraph(p) => p.id,
            Block::Table(t) => t.id,
            Block::Sdt(b) => b.id,
            Block::AlternateContent(b) => b.id,
            Block::CustomXml(b) => b.id,
        }
    }

    /// Children of the transparent wrapper variants
    pub fn wrapped_children(&self) -> Option<&[Block]> {
        match self {
            Block::Sdt(b) => Some(&b.children),
            Block::AlternateContent(b) => Some(&b.children),
            Block::CustomXml(b) => Some(&b.children),
            Block::Paragraph(_) | Block::Table(_) => None,
        }
    }

    /// The paragraph, if this block is one
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

crate::xml_children! {
    pub fn load_blocks -> Block {
        "p" => Paragraph(Paragraph),
        "tbl" => Table(Table),
        "sdt" => Sdt(SdtBlock),
        "AlternateContent" => AlternateContent(AlternateContentBlock),
        "customXml" => CustomXml(CustomXmlBlock),
    }
}

/// Expand transparent wrappers into the plain sequence of paragraphs and tables
pub fn flatten_blocks(blocks: &[Block]) -> Vec<&Block> {
    let mut flat = Vec::with_capacity(blocks.len());
    push_flat(blocks, &mut flat);
    flat
}

fn push_flat<'a>(blocks: &'a [Block], flat: &mut Vec<&'a Block>) {
    for block in blocks {
        match block.wrapped_children() {
            Some(children) => push_flat(children, flat),
            None => flat.push(block),
        }
    }
}

/// Block-level structured document tag; content lives in `w:sdtContent`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdtBlock {
    pub id: NodeId,
    pub children: Vec<Block>,
}

impl FromXml for SdtBlock {
    const TAG: &'static str = "sdt";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            id: ctx.next_id(),
            children: element
                .child("sdtContent")
                .map(|content| load_blocks(content, ctx))
                .unwrap_or_default(),
        }
    }
}

/// `mc:AlternateContent` at block level; only the fallback is read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlternateContentBlock {
    pub id: NodeId,
    pub children: Vec<Block>,
}

impl FromXml for AlternateContentBlock {
    const TAG: &'static str = "AlternateContent";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            id: ctx.next_id(),
            children: element
                .child("Fallback")
                .map(|fallback| load_blocks(fallback, ctx))
                .unwrap_or_default(),
        }
    }
}

/// Block-level `w:customXml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomXmlBlock {
    pub id: NodeId,
    pub children: Vec<Block>,
}

impl FromXml for CustomXmlBlock {
    const TAG: &'static str = "customXml";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            id: ctx.next_id(),
            children: load_blocks(element, ctx),
        }
    }
}
