//! Document walk shared by every output format
//!
//! A [`Walker`] lives for one export. It dispatches on the typed model,
//! resolves styles and relationships, rebuilds lists per container, and
//! feeds the pieces to the format hooks. Layers reach back into it through
//! [`Next::walker`](super::Next::walker) to render blocks their own way.

use std::cell::{Cell, RefCell};

use tracing::{debug, warn};

use docxweave_ooxml::model::{BreakKind, FieldCharKind, TextBox};
use docxweave_ooxml::{
    Block, Hyperlink, ImageSize, Inline, Paragraph, PartContainer, RelationshipResolver,
    Relationships, Run, RunContent, RunProperties, Table, WordDocument,
};

use super::fields::{FieldCode, FieldFrame, FieldStack};
use super::layers::{ExportLayer, Next, RunContext};
use super::{BlockKind, Container, FormatHooks, ImageData, RenderedBlock, RenderedCell, RunStyle, RunStyles};
use crate::footnote_tracker::FootnoteTracker;
use crate::numbering_span::{Component, NumberingSpan, NumberingSpanBuilder};

/// State of one export
pub struct Walker<'d> {
    doc: &'d WordDocument,
    hooks: &'d dyn FormatHooks,
    layers: &'d [Box<dyn ExportLayer>],
    footnotes: RefCell<FootnoteTracker<'d>>,
    /// Relationships of the part being rendered (body or footnotes)
    relationships: Cell<&'d Relationships>,
    table_depth: Cell<usize>,
    current_footnote: Cell<Option<usize>>,
    fields: RefCell<FieldStack>,
}

impl<'d> Walker<'d> {
    pub fn new(
        doc: &'d WordDocument,
        hooks: &'d dyn FormatHooks,
        layers: &'d [Box<dyn ExportLayer>],
    ) -> Self {
        Self {
            doc,
            hooks,
            layers,
            footnotes: RefCell::new(FootnoteTracker::new(&doc.footnotes)),
            relationships: Cell::new(&doc.relationships),
            table_depth: Cell::new(0),
            current_footnote: Cell::new(None),
            fields: RefCell::new(FieldStack::default()),
        }
    }

    /// The document being exported
    pub fn document(&self) -> &'d WordDocument {
        self.doc
    }

    pub fn hooks(&self) -> &'d dyn FormatHooks {
        self.hooks
    }

    /// Render the body, then every cited footnote
    pub fn export(&self) -> String {
        let body = self.render_container(self.doc.document.body.children(), Container::Body);
        let footnotes = self.render_footnotes();
        self.hooks
            .document(body, footnotes, self.doc.document.body.page_width)
    }

    /// Rebuild lists in `blocks` and render them as one container
    pub fn render_container(&self, blocks: &'d [Block], container: Container) -> String {
        let components = NumberingSpanBuilder::new(&self.doc.styles, &self.doc.numbering)
            .with_table_depth(self.table_depth.get())
            .build(blocks);
        self.render_components(&components, container)
    }

    /// Render and join reconstructed components
    pub fn render_components(&self, components: &[Component<'d>], container: Container) -> String {
        let blocks = self.render_blocks(components, container);
        self.hooks.join_blocks(container, blocks)
    }

    /// Render components without joining; empty output is dropped
    pub fn render_blocks(&self, components: &[Component<'d>], container: Container) -> Vec<RenderedBlock> {
        components
            .iter()
            .filter_map(|component| self.render_component(component, container))
            .collect()
    }

    fn render_component(&self, component: &Component<'d>, container: Container) -> Option<RenderedBlock> {
        match component {
            Component::Paragraph(p) => self.render_paragraph(*p, container),
            Component::Table(t) => Some(RenderedBlock {
                kind: BlockKind::Table,
                content: self.render_table(*t),
            }),
            Component::Span(span) => {
                let content = Next::new(self.layers, self).numbering_span(span, container);
                (!content.is_empty()).then_some(RenderedBlock {
                    kind: BlockKind::List,
                    content,
                })
            }
        }
    }

    /// A list without any layer involvement; empty lists collapse
    pub fn render_span(&self, span: &NumberingSpan<'d>, _container: Container) -> String {
        let items: Vec<String> = span
            .items
            .iter()
            .map(|item| self.render_components(&item.children, Container::ListItem))
            .collect();
        if items.iter().all(String::is_empty) {
            return String::new();
        }
        self.hooks.list(span, items)
    }

    /// A paragraph as a block, or `None` when it renders empty
    pub fn render_paragraph(&self, paragraph: &'d Paragraph, container: Container) -> Option<RenderedBlock> {
        let styles = &self.doc.styles;
        if let Some(level) = paragraph.heading_level(styles) {
            return self.render_heading(paragraph, level, container);
        }
        let content = self.render_paragraph_content(paragraph);
        if content.is_empty() {
            return None;
        }
        let props = paragraph.effective_properties(styles);
        let indentation = match container {
            Container::ListItem => None,
            _ => props.indentation.as_ref(),
        };
        let styled = self
            .hooks
            .block_style(content, props.justification.as_ref(), indentation);
        Some(RenderedBlock {
            kind: BlockKind::Paragraph,
            content: self.hooks.paragraph(styled, container),
        })
    }

    /// A paragraph rendered as a heading of `level`
    pub fn render_heading(&self, paragraph: &'d Paragraph, level: u8, container: Container) -> Option<RenderedBlock> {
        let content = self.render_paragraph_content(paragraph);
        if content.is_empty() {
            return None;
        }
        Some(RenderedBlock {
            kind: BlockKind::Heading,
            content: self.hooks.heading(content, level, container),
        })
    }

    /// Inline content of a paragraph, with its own field state
    pub fn render_paragraph_content(&self, paragraph: &'d Paragraph) -> String {
        self.render_isolated(&paragraph.children, paragraph.style_id(&self.doc.styles))
    }

    /// Render inline children against a fresh field stack
    ///
    /// Fields left open at the end flush their results.
    fn render_isolated(&self, children: &'d [Inline], paragraph_style: Option<&'d str>) -> String {
        let saved = self.fields.replace(FieldStack::default());
        let mut out = String::new();
        self.render_inlines(children, paragraph_style, &mut out);
        while !self.fields.borrow().is_empty() {
            let frame = self.fields.borrow_mut().end();
            if let Some(frame) = frame {
                let rendered = self.finish_field(frame);
                self.emit(&rendered, &mut out);
            }
        }
        self.fields.replace(saved);
        out
    }

    fn render_inlines(&self, children: &'d [Inline], paragraph_style: Option<&'d str>, out: &mut String) {
        for inline in children {
            match inline {
                Inline::Run(run) => self.render_run(run, paragraph_style, out),
                Inline::Hyperlink(link) => {
                    let content = self.render_isolated(&link.children, paragraph_style);
                    let rendered = self.render_hyperlink(link, content);
                    self.emit(&rendered, out);
                }
                Inline::Inserted(ins) => {
                    let content = self.render_isolated(&ins.children, paragraph_style);
                    if !content.is_empty() {
                        self.emit(&self.hooks.insertion(content), out);
                    }
                }
                Inline::Deleted(_) if !self.hooks.renders_deletions() => {}
                Inline::Deleted(del) => {
                    let content = self.render_isolated(&del.children, paragraph_style);
                    if !content.is_empty() {
                        self.emit(&self.hooks.deletion(content), out);
                    }
                }
                Inline::SimpleField(field) => {
                    let content = self.render_isolated(&field.children, paragraph_style);
                    let rendered = self.apply_field_code(FieldCode::parse(&field.instruction), content);
                    self.emit(&rendered, out);
                }
                Inline::SmartTag(_) | Inline::Sdt(_) | Inline::CustomXml(_) => {
                    if let Some(children) = inline.nested_children() {
                        self.render_inlines(children, paragraph_style, out);
                    }
                }
            }
        }
    }

    fn render_hyperlink(&self, link: &Hyperlink, content: String) -> String {
        if content.is_empty() {
            return content;
        }
        let target = link.rel_id.as_deref().and_then(|id| {
            let rel = self.relationships.get().get_relationship(id);
            if rel.is_none() {
                warn!(rel_id = id, "unresolved hyperlink relationship");
            }
            rel.map(|r| r.target_uri.as_str())
        });
        let href = match (target, link.anchor.as_deref()) {
            (Some(target), Some(anchor)) => format!("{}#{}", target, anchor),
            (Some(target), None) => target.to_string(),
            (None, Some(anchor)) => format!("#{}", anchor),
            (None, None) => return content,
        };
        self.hooks.hyperlink(content, &href)
    }

    fn render_run(&self, run: &'d Run, paragraph_style: Option<&'d str>, out: &mut String) {
        let styles = &self.doc.styles;
        let properties = run.effective_properties(styles, paragraph_style);
        let cx = RunContext {
            run,
            properties,
            paragraph_style,
            styles,
        };
        let run_styles = Next::new(self.layers, self).run_styles(&cx);

        let mut segment = String::new();
        for content in &run.content {
            match content {
                RunContent::FieldChar(kind) => {
                    self.flush_segment(&mut segment, &run_styles, out);
                    self.field_char(*kind, out);
                }
                RunContent::FieldInstruction(text) => {
                    self.fields.borrow_mut().instruction(text);
                }
                RunContent::FootnoteReference(id) => {
                    self.flush_segment(&mut segment, &run_styles, out);
                    if self.fields.borrow().is_capturing() {
                        continue;
                    }
                    let index = self.footnotes.borrow_mut().record(id);
                    if let Some(index) = index {
                        self.emit(&self.hooks.footnote_reference(index), out);
                    }
                }
                RunContent::FootnoteRef => {
                    self.flush_segment(&mut segment, &run_styles, out);
                    if let Some(index) = self.current_footnote.get() {
                        self.emit(&self.hooks.footnote_mark(index), out);
                    }
                }
                RunContent::Drawing(drawing) => {
                    self.flush_segment(&mut segment, &run_styles, out);
                    let image = self.render_image(
                        drawing.embed.as_deref(),
                        drawing.description.as_deref(),
                        drawing.size(),
                    );
                    self.emit(&image, out);
                    self.render_text_box(drawing.text_box.as_ref(), out);
                }
                RunContent::Picture(picture) => {
                    self.flush_segment(&mut segment, &run_styles, out);
                    let image = self.render_image(
                        picture.image_rel_id.as_deref(),
                        picture.title.as_deref(),
                        picture.size(),
                    );
                    self.emit(&image, out);
                    self.render_text_box(picture.text_box.as_ref(), out);
                }
                other => segment.push_str(&self.render_run_content(other)),
            }
        }
        self.flush_segment(&mut segment, &run_styles, out);
    }

    fn render_run_content(&self, content: &RunContent) -> String {
        match content {
            RunContent::Text(text) | RunContent::DeletedText(text) => self.hooks.text(text),
            RunContent::Tab => self.hooks.tab(),
            RunContent::Break(BreakKind::Line) => self.hooks.line_break(),
            RunContent::Break(BreakKind::Page) => self.hooks.page_break(),
            RunContent::NoBreakHyphen => self.hooks.text("-"),
            RunContent::Symbol(c) => self.hooks.text(&c.to_string()),
            _ => String::new(),
        }
    }

    /// Wrap the pending run text in the run's styles and emit it
    fn flush_segment(&self, segment: &mut String, run_styles: &RunStyles, out: &mut String) {
        if segment.is_empty() {
            return;
        }
        let mut content = std::mem::take(segment);
        for style in run_styles {
            content = self.hooks.run_style(content, *style);
        }
        self.emit(&content, out);
    }

    /// Styles a run gets before any layer runs
    pub fn default_run_styles(&self, cx: &RunContext<'d>) -> RunStyles {
        let props: &RunProperties = cx.properties;
        let mut styles = RunStyles::new();
        if props
            .font
            .as_deref()
            .is_some_and(|font| self.doc.fonts.is_monospace(font))
        {
            styles.insert(RunStyle::Code);
        }
        let toggles = [
            (props.is_bold(), RunStyle::Bold),
            (props.is_italic(), RunStyle::Italic),
            (props.is_underline(), RunStyle::Underline),
            (props.is_caps(), RunStyle::Caps),
            (props.is_small_caps(), RunStyle::SmallCaps),
            (props.is_strike(), RunStyle::Strike),
            (props.is_hidden(), RunStyle::Hidden),
            (props.is_superscript(), RunStyle::Superscript),
            (props.is_subscript(), RunStyle::Subscript),
        ];
        styles.extend(toggles.into_iter().filter(|(on, _)| *on).map(|(_, style)| style));
        styles
    }

    fn field_char(&self, kind: FieldCharKind, out: &mut String) {
        match kind {
            FieldCharKind::Begin => self.fields.borrow_mut().begin(),
            FieldCharKind::Separate => self.fields.borrow_mut().separate(),
            FieldCharKind::End => {
                let frame = self.fields.borrow_mut().end();
                if let Some(frame) = frame {
                    let rendered = self.finish_field(frame);
                    self.emit(&rendered, out);
                }
            }
        }
    }

    fn finish_field(&self, frame: FieldFrame) -> String {
        let code = frame.code();
        self.apply_field_code(code, frame.result)
    }

    fn apply_field_code(&self, code: FieldCode, result: String) -> String {
        match code {
            FieldCode::Hyperlink(href) if !result.is_empty() => self.hooks.hyperlink(result, &href),
            _ => result,
        }
    }

    /// Send output to the innermost open field, or to `out`
    fn emit(&self, text: &str, out: &mut String) {
        if text.is_empty() {
            return;
        }
        self.fields.borrow_mut().emit(text, out);
    }

    fn render_image(&self, rel_id: Option<&str>, alt: Option<&str>, size: Option<ImageSize>) -> String {
        let Some(rel_id) = rel_id else {
            return String::new();
        };
        let Some(rel) = self.relationships.get().get_relationship(rel_id) else {
            warn!(rel_id, "unresolved image relationship");
            return String::new();
        };
        let bytes = if rel.is_external {
            None
        } else {
            let bytes = self.doc.get_part(&rel.target_uri);
            if bytes.is_none() {
                warn!(target = %rel.target_uri, "image part missing from package");
                return String::new();
            }
            bytes
        };
        self.hooks.image(ImageData {
            target: &rel.target_uri,
            is_external: rel.is_external,
            bytes,
            alt: alt.filter(|a| !a.is_empty()),
            size,
        })
    }

    fn render_text_box(&self, text_box: Option<&'d TextBox>, out: &mut String) {
        if let Some(text_box) = text_box {
            let content = self.render_container(&text_box.children, Container::TextBox);
            self.emit(&content, out);
        }
    }

    fn render_table(&self, table: &'d Table) -> String {
        let depth = self.table_depth.get() + 1;
        self.table_depth.set(depth);
        let rows = table
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.cells
                    .iter()
                    .enumerate()
                    .map(|(c, cell)| {
                        let rowspan = table.row_span(r, c);
                        let content = if rowspan == 0 {
                            String::new()
                        } else {
                            self.render_container(&cell.children, Container::Cell)
                        };
                        RenderedCell {
                            content,
                            colspan: cell.grid_span.max(1),
                            rowspan,
                        }
                    })
                    .collect()
            })
            .collect();
        self.table_depth.set(depth - 1);
        self.hooks.table(rows)
    }

    /// Render cited footnotes in citation order
    fn render_footnotes(&self) -> String {
        let mut notes = Vec::new();
        self.relationships.set(&self.doc.footnote_relationships);
        loop {
            let batch = self.footnotes.borrow_mut().drain();
            if batch.is_empty() {
                break;
            }
            for (index, footnote) in batch {
                self.current_footnote.set(Some(index));
                let content = self.render_container(&footnote.children, Container::Footnote);
                notes.push((index, content));
            }
        }
        self.current_footnote.set(None);
        self.relationships.set(&self.doc.relationships);

        if notes.is_empty() {
            return String::new();
        }
        debug!(count = notes.len(), "rendering footnotes");
        self.hooks.footnotes(notes)
    }
}
