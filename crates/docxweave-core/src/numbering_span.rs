//! Numbering span reconstruction
//!
//! Word stores lists as a flat run of paragraphs that each carry a
//! `(numId, ilvl)` pair. This module regroups such a run into nested
//! [`NumberingSpan`]s: one span per list level, one [`NumberingItem`] per
//! numbered paragraph, with any non-list content that follows an item
//! folded into that item as continuation content.
//!
//! The builder is a single left-to-right pass over one container (the body,
//! a table cell, a text box or a footnote). Table cells are never descended
//! into here; the exporter runs a fresh builder per cell.

use std::fmt::Write;

use tracing::{debug, warn};

use docxweave_ooxml::model::flatten_blocks;
use docxweave_ooxml::{Block, NumberFormat, NumberingDefinitions, Paragraph, StyleSheet, Table};

/// A block after list reconstruction
#[derive(Debug, Clone, PartialEq)]
pub enum Component<'d> {
    Paragraph(&'d Paragraph),
    Table(&'d Table),
    Span(NumberingSpan<'d>),
}

/// Consecutive items of one list at one level
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingSpan<'d> {
    pub num_id: u32,
    pub level: u32,
    pub format: NumberFormat,
    /// Nesting among spans; 0 for a span directly in its container
    pub depth: usize,
    /// Number of tables enclosing the container this span was built for
    pub table_depth: usize,
    pub items: Vec<NumberingItem<'d>>,
}

impl<'d> NumberingSpan<'d> {
    fn open(key: &ListKey, depth: usize, table_depth: usize, first: &'d Paragraph) -> Self {
        Self {
            num_id: key.num_id,
            level: key.level,
            format: key.format.clone(),
            depth,
            table_depth,
            items: vec![NumberingItem::new(first)],
        }
    }

    /// List identity; the same `numId` inside a table is a different list
    pub fn identity(&self) -> (usize, u32) {
        (self.table_depth, self.num_id)
    }
}

/// One list item: its numbered paragraph followed by continuation content
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingItem<'d> {
    pub children: Vec<Component<'d>>,
}

impl<'d> NumberingItem<'d> {
    fn new(paragraph: &'d Paragraph) -> Self {
        Self {
            children: vec![Component::Paragraph(paragraph)],
        }
    }

    /// The numbered paragraph that opened the item
    pub fn leading_paragraph(&self) -> Option<&'d Paragraph> {
        match self.children.first() {
            Some(Component::Paragraph(p)) => Some(*p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ListKey {
    num_id: u32,
    level: u32,
    format: NumberFormat,
}

enum Role {
    Heading,
    Numbered(ListKey),
    Plain,
}

/// Regroups flat block sequences into list structure
#[derive(Debug, Clone, Copy)]
pub struct NumberingSpanBuilder<'d> {
    styles: &'d StyleSheet,
    numbering: &'d NumberingDefinitions,
    table_depth: usize,
}

impl<'d> NumberingSpanBuilder<'d> {
    pub fn new(styles: &'d StyleSheet, numbering: &'d NumberingDefinitions) -> Self {
        Self {
            styles,
            numbering,
            table_depth: 0,
        }
    }

    /// Builder for the contents of a cell nested `table_depth` tables deep
    pub fn with_table_depth(mut self, table_depth: usize) -> Self {
        self.table_depth = table_depth;
        self
    }

    /// Regroup `blocks`, expanding transparent wrappers first
    pub fn build(&self, blocks: &'d [Block]) -> Vec<Component<'d>> {
        let mut state = BuildState::new(self.table_depth);
        for block in flatten_blocks(blocks) {
            match block {
                Block::Paragraph(p) => match self.role(p) {
                    Role::Heading => state.push_heading(p),
                    Role::Numbered(key) => state.push_numbered(p, key),
                    Role::Plain => state.push_plain(Component::Paragraph(p)),
                },
                Block::Table(t) => state.push_plain(Component::Table(t)),
                Block::Sdt(_) | Block::AlternateContent(_) | Block::CustomXml(_) => {}
            }
        }
        state.finish()
    }

    fn role(&self, paragraph: &Paragraph) -> Role {
        if paragraph.heading_level(self.styles).is_some() {
            return Role::Heading;
        }
        let Some(numbering) = paragraph.effective_properties(self.styles).numbering.as_ref() else {
            return Role::Plain;
        };
        let num_id = match numbering.num_id {
            Some(0) | None => return Role::Plain,
            Some(id) => id,
        };
        let level_id = numbering.level.unwrap_or(0);
        match paragraph.get_numbering_level(self.styles, self.numbering) {
            Some(level) => Role::Numbered(ListKey {
                num_id,
                level: level_id,
                format: level.format.clone(),
            }),
            None => {
                warn!(num_id, level = level_id, "unknown numbering level, treating as plain paragraph");
                Role::Plain
            }
        }
    }
}

/// State of one builder pass
struct BuildState<'d> {
    output: Vec<Component<'d>>,
    /// Open spans, outermost first; every open span has at least one item
    stack: Vec<NumberingSpan<'d>>,
    /// Non-list components seen since the last numbered paragraph
    candidates: Vec<Component<'d>>,
    table_depth: usize,
}

impl<'d> BuildState<'d> {
    fn new(table_depth: usize) -> Self {
        Self {
            output: Vec::new(),
            stack: Vec::new(),
            candidates: Vec::new(),
            table_depth,
        }
    }

    fn push_plain(&mut self, component: Component<'d>) {
        if self.stack.is_empty() {
            self.output.push(component);
        } else {
            self.candidates.push(component);
        }
    }

    fn push_heading(&mut self, paragraph: &'d Paragraph) {
        self.close_all();
        self.output.append(&mut self.candidates);
        self.output.push(Component::Paragraph(paragraph));
    }

    fn push_numbered(&mut self, paragraph: &'d Paragraph, key: ListKey) {
        let same_list = self.stack.first().map(|root| root.num_id == key.num_id);
        match same_list {
            None => self.open_root(paragraph, &key),
            Some(false) => {
                self.close_all();
                self.output.append(&mut self.candidates);
                self.open_root(paragraph, &key);
            }
            Some(true) => {
                self.attach_candidates();
                self.place(paragraph, &key);
            }
        }
    }

    /// Put a paragraph of the current list at its level
    fn place(&mut self, paragraph: &'d Paragraph, key: &ListKey) {
        loop {
            let Some(top) = self.stack.last_mut() else {
                self.open_root(paragraph, key);
                return;
            };
            let top_level = top.level;
            if key.level == top_level {
                top.items.push(NumberingItem::new(paragraph));
                return;
            }
            if key.level > top_level {
                let depth = self.stack.len();
                self.stack
                    .push(NumberingSpan::open(key, depth, self.table_depth, paragraph));
                return;
            }
            if self.stack.len() == 1 {
                warn!(
                    num_id = key.num_id,
                    level = key.level,
                    root_level = top_level,
                    "list level above its first item, starting a new list"
                );
                self.close_all();
                self.open_root(paragraph, key);
                return;
            }
            self.pop_span();
        }
    }

    fn open_root(&mut self, paragraph: &'d Paragraph, key: &ListKey) {
        debug!(num_id = key.num_id, level = key.level, "opening list");
        self.stack
            .push(NumberingSpan::open(key, 0, self.table_depth, paragraph));
    }

    /// Fold buffered content into the innermost open item
    fn attach_candidates(&mut self) {
        match self.stack.last_mut().and_then(|span| span.items.last_mut()) {
            Some(item) => item.children.append(&mut self.candidates),
            None => self.output.append(&mut self.candidates),
        }
    }

    fn pop_span(&mut self) {
        let Some(span) = self.stack.pop() else {
            return;
        };
        match self.stack.last_mut().and_then(|parent| parent.items.last_mut()) {
            Some(item) => item.children.push(Component::Span(span)),
            None => self.output.push(Component::Span(span)),
        }
    }

    fn close_all(&mut self) {
        while !self.stack.is_empty() {
            self.pop_span();
        }
    }

    fn finish(mut self) -> Vec<Component<'d>> {
        self.attach_candidates();
        self.close_all();
        self.output
    }
}

/// Every paragraph in `components`, depth-first in document order
pub fn collect_paragraphs<'d>(components: &[Component<'d>]) -> Vec<&'d Paragraph> {
    let mut paragraphs = Vec::new();
    push_paragraphs(components, &mut paragraphs);
    paragraphs
}

fn push_paragraphs<'d>(components: &[Component<'d>], out: &mut Vec<&'d Paragraph>) {
    for component in components {
        match component {
            Component::Paragraph(p) => out.push(p),
            Component::Table(_) => {}
            Component::Span(span) => {
                for item in &span.items {
                    push_paragraphs(&item.children, out);
                }
            }
        }
    }
}

/// Indented text outline of a reconstructed container
pub fn outline(components: &[Component<'_>]) -> String {
    let mut out = String::new();
    write_outline(components, 0, &mut out);
    out
}

fn write_outline(components: &[Component<'_>], indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    for component in components {
        match component {
            Component::Paragraph(p) => {
                let _ = writeln!(out, "{}paragraph {:?}", pad, preview(&p.plain_text()));
            }
            Component::Table(t) => {
                let columns = t.rows.first().map_or(0, |r| r.cells.len());
                let _ = writeln!(out, "{}table {}x{}", pad, t.rows.len(), columns);
            }
            Component::Span(span) => {
                let _ = writeln!(
                    out,
                    "{}list num={} level={} format={}",
                    pad,
                    span.num_id,
                    span.level,
                    span.format.as_str()
                );
                for item in &span.items {
                    let _ = writeln!(out, "{}  item", pad);
                    write_outline(&item.children, indent + 2, out);
                }
            }
        }
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 40;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(LIMIT).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docxweave_ooxml::test_utils::{
        heading_styles, numbered_paragraph, numbering_definition, paragraph, styled_paragraph,
        DocxBuilder,
    };
    use docxweave_ooxml::WordDocument;

    fn load(body: &str) -> WordDocument {
        let docx = DocxBuilder::new()
            .styles(&heading_styles())
            .numbering(&format!(
                "{}{}",
                numbering_definition(1, &["lowerLetter", "decimal", "bullet", "upperRoman"]),
                numbering_definition(2, &["bullet", "bullet"])
            ))
            .body(body)
            .build();
        WordDocument::from_bytes(&docx).unwrap()
    }

    fn build(doc: &WordDocument) -> Vec<Component<'_>> {
        NumberingSpanBuilder::new(&doc.styles, &doc.numbering).build(doc.document.body.children())
    }

    fn span<'a, 'd>(component: &'a Component<'d>) -> &'a NumberingSpan<'d> {
        match component {
            Component::Span(span) => span,
            other => panic!("expected a span, got {other:?}"),
        }
    }

    fn texts(components: &[Component<'_>]) -> Vec<String> {
        collect_paragraphs(components)
            .iter()
            .map(|p| p.plain_text())
            .collect()
    }

    #[test]
    fn test_consecutive_items_form_one_span() {
        let doc = load(&format!(
            "{}{}{}",
            numbered_paragraph(1, 0, "AAA"),
            numbered_paragraph(1, 0, "BBB"),
            numbered_paragraph(1, 0, "CCC")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 1);
        let list = span(&components[0]);
        assert_eq!(list.format, NumberFormat::LowerLetter);
        assert_eq!(list.depth, 0);
        let items: Vec<String> = list
            .items
            .iter()
            .map(|i| i.leading_paragraph().unwrap().plain_text())
            .collect();
        assert_eq!(items, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn test_plain_paragraph_between_items_continues_item() {
        let doc = load(&format!(
            "{}{}{}",
            numbered_paragraph(1, 0, "AAA"),
            paragraph("bare paragraph"),
            numbered_paragraph(1, 0, "BBB")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 1);
        let list = span(&components[0]);
        assert_eq!(list.items.len(), 2);
        assert_eq!(texts(&list.items[0].children), vec!["AAA", "bare paragraph"]);
        assert_eq!(texts(&list.items[1].children), vec!["BBB"]);
    }

    #[test]
    fn test_heading_splits_list() {
        let doc = load(&format!(
            "{}{}{}{}",
            numbered_paragraph(1, 0, "one"),
            paragraph("after one"),
            styled_paragraph("Heading1", "Section"),
            numbered_paragraph(1, 0, "two")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 4);
        assert_eq!(span(&components[0]).items.len(), 1);
        assert!(matches!(components[1], Component::Paragraph(p) if p.plain_text() == "after one"));
        assert!(matches!(components[2], Component::Paragraph(p) if p.plain_text() == "Section"));
        assert_eq!(span(&components[3]).items.len(), 1);
    }

    #[test]
    fn test_numbered_heading_does_not_join_list() {
        let doc = load(&format!(
            "{}{}",
            numbered_paragraph(1, 0, "item"),
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>Numbered heading</w:t></w:r></w:p>"#
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 2);
        assert!(matches!(components[1], Component::Paragraph(_)));
    }

    #[test]
    fn test_deeper_level_nests_inside_item() {
        let doc = load(&format!(
            "{}{}{}{}",
            numbered_paragraph(1, 0, "outer"),
            numbered_paragraph(1, 1, "inner a"),
            numbered_paragraph(1, 1, "inner b"),
            numbered_paragraph(1, 0, "outer again")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 1);
        let outer = span(&components[0]);
        assert_eq!(outer.items.len(), 2);
        let first = &outer.items[0];
        assert_eq!(first.children.len(), 2);
        let inner = span(&first.children[1]);
        assert_eq!(inner.depth, 1);
        assert_eq!(inner.level, 1);
        assert_eq!(inner.format, NumberFormat::Decimal);
        assert_eq!(inner.items.len(), 2);
    }

    #[test]
    fn test_level_jump_nests_directly() {
        let doc = load(&format!(
            "{}{}",
            numbered_paragraph(1, 0, "top"),
            numbered_paragraph(1, 3, "deep")
        ));
        let components = build(&doc);
        let outer = span(&components[0]);
        let nested = span(&outer.items[0].children[1]);
        assert_eq!(nested.level, 3);
        assert_eq!(nested.depth, 1);
        assert_eq!(nested.format, NumberFormat::UpperRoman);
    }

    #[test]
    fn test_level_above_root_starts_new_list() {
        let doc = load(&format!(
            "{}{}{}",
            numbered_paragraph(1, 2, "starts deep"),
            numbered_paragraph(1, 0, "shallow"),
            numbered_paragraph(1, 0, "shallow two")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 2);
        assert_eq!(span(&components[0]).level, 2);
        let second = span(&components[1]);
        assert_eq!(second.level, 0);
        assert_eq!(second.depth, 0);
        assert_eq!(second.items.len(), 2);
    }

    #[test]
    fn test_returning_to_middle_level() {
        let doc = load(&format!(
            "{}{}{}{}",
            numbered_paragraph(1, 0, "a"),
            numbered_paragraph(1, 1, "b"),
            numbered_paragraph(1, 2, "c"),
            numbered_paragraph(1, 1, "d")
        ));
        let components = build(&doc);
        let level0 = span(&components[0]);
        assert_eq!(level0.items.len(), 1);
        let level1 = span(&level0.items[0].children[1]);
        assert_eq!(level1.items.len(), 2);
        assert_eq!(level1.items[1].leading_paragraph().unwrap().plain_text(), "d");
    }

    #[test]
    fn test_different_list_starts_sibling_span() {
        let doc = load(&format!(
            "{}{}{}",
            numbered_paragraph(1, 0, "first list"),
            paragraph("between"),
            numbered_paragraph(2, 0, "second list")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 3);
        assert_eq!(span(&components[0]).num_id, 1);
        assert!(matches!(components[1], Component::Paragraph(_)));
        assert_eq!(span(&components[2]).num_id, 2);
        assert!(span(&components[2]).format.is_bullet());
    }

    #[test]
    fn test_trailing_content_joins_last_item() {
        let doc = load(&format!(
            "{}{}{}",
            numbered_paragraph(1, 0, "only"),
            paragraph("tail"),
            "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>"
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 1);
        let item = &span(&components[0]).items[0];
        assert_eq!(item.children.len(), 3);
        assert!(matches!(item.children[2], Component::Table(_)));
    }

    #[test]
    fn test_unknown_numbering_is_plain() {
        let doc = load(&format!(
            "{}{}",
            numbered_paragraph(42, 0, "ghost"),
            numbered_paragraph(0, 0, "removed")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 2);
        assert!(components.iter().all(|c| matches!(c, Component::Paragraph(_))));
    }

    #[test]
    fn test_every_paragraph_appears_once() {
        let body = [
            paragraph("intro"),
            numbered_paragraph(1, 0, "a"),
            numbered_paragraph(1, 2, "b"),
            paragraph("c"),
            numbered_paragraph(1, 1, "d"),
            styled_paragraph("Heading1", "e"),
            numbered_paragraph(2, 1, "f"),
            numbered_paragraph(2, 0, "g"),
            numbered_paragraph(1, 0, "h"),
            paragraph("i"),
        ]
        .concat();
        let doc = load(&body);
        let components = build(&doc);

        let expected: Vec<&str> = vec!["intro", "a", "b", "c", "d", "e", "f", "g", "h", "i"];
        assert_eq!(texts(&components), expected);

        let mut numbered = 0;
        fn count_items(components: &[Component<'_>], numbered: &mut usize) {
            for component in components {
                if let Component::Span(span) = component {
                    for item in &span.items {
                        *numbered += 1;
                        count_items(&item.children, numbered);
                    }
                }
            }
        }
        count_items(&components, &mut numbered);
        assert_eq!(numbered, 6);
    }

    #[test]
    fn test_wrappers_are_flattened() {
        let doc = load(&format!(
            "<w:sdt><w:sdtContent>{}{}</w:sdtContent></w:sdt>",
            numbered_paragraph(1, 0, "x"),
            numbered_paragraph(1, 0, "y")
        ));
        let components = build(&doc);
        assert_eq!(components.len(), 1);
        assert_eq!(span(&components[0]).items.len(), 2);
    }

    #[test]
    fn test_table_depth_is_recorded() {
        let doc = load(&numbered_paragraph(1, 0, "cell item"));
        let components = NumberingSpanBuilder::new(&doc.styles, &doc.numbering)
            .with_table_depth(2)
            .build(doc.document.body.children());
        assert_eq!(span(&components[0]).identity(), (2, 1));
    }

    #[test]
    fn test_outline() {
        let doc = load(&format!(
            "{}{}",
            numbered_paragraph(1, 0, "a"),
            numbered_paragraph(1, 1, "b")
        ));
        let text = outline(&build(&doc));
        let expected = "list num=1 level=0 format=lowerLetter\n  item\n    paragraph \"a\"\n    list num=1 level=1 format=decimal\n      item\n        paragraph \"b\"\n";
        assert_eq!(text, expected);
    }
}
