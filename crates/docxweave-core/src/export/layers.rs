//! Behavior layers
//!
//! A layer intercepts one or both of two decisions: how a numbering span
//! renders, and which styles a run gets. Every method receives a [`Next`]
//! over the remaining layers; calling through it delegates, not calling it
//! replaces the default. Layers run in the order they were added to the
//! exporter.

use docxweave_ooxml::{NumberFormat, Run, RunProperties, StyleSheet};

use super::walker::Walker;
use super::{Container, RunStyle, RunStyles};
use crate::numbering_span::{Component, NumberingSpan};

/// Inputs for deciding a run's styles
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'d> {
    pub run: &'d Run,
    /// Cascaded properties of the run
    pub properties: &'d RunProperties,
    /// Effective style of the enclosing paragraph
    pub paragraph_style: Option<&'d str>,
    pub styles: &'d StyleSheet,
}

/// An optional export behavior
pub trait ExportLayer {
    /// Render a numbering span
    fn numbering_span<'d>(
        &self,
        span: &NumberingSpan<'d>,
        container: Container,
        next: Next<'_, 'd>,
    ) -> String {
        next.numbering_span(span, container)
    }

    /// Decide the styles of a run
    fn run_styles<'d>(&self, cx: &RunContext<'d>, next: Next<'_, 'd>) -> RunStyles {
        next.run_styles(cx)
    }
}

/// The rest of the layer chain, ending in the walker's defaults
pub struct Next<'a, 'd> {
    layers: &'a [Box<dyn ExportLayer>],
    walker: &'a Walker<'d>,
}

impl<'a, 'd> Next<'a, 'd> {
    pub(crate) fn new(layers: &'a [Box<dyn ExportLayer>], walker: &'a Walker<'d>) -> Self {
        Self { layers, walker }
    }

    /// The walker, for rendering blocks directly
    pub fn walker(&self) -> &'a Walker<'d> {
        self.walker
    }

    pub fn numbering_span(self, span: &NumberingSpan<'d>, container: Container) -> String {
        match self.layers.split_first() {
            Some((layer, rest)) => {
                layer.numbering_span(span, container, Next::new(rest, self.walker))
            }
            None => self.walker.render_span(span, container),
        }
    }

    pub fn run_styles(self, cx: &RunContext<'d>) -> RunStyles {
        match self.layers.split_first() {
            Some((layer, rest)) => layer.run_styles(cx, Next::new(rest, self.walker)),
            None => self.walker.default_run_styles(cx),
        }
    }
}

/// Top-level upper-roman lists become sections
///
/// Each item's numbered paragraph renders as a level-2 heading and the rest
/// of the item as ordinary blocks, without list markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperRomanHeadings;

impl ExportLayer for UpperRomanHeadings {
    fn numbering_span<'d>(
        &self,
        span: &NumberingSpan<'d>,
        container: Container,
        next: Next<'_, 'd>,
    ) -> String {
        if span.depth != 0 || span.format != NumberFormat::UpperRoman {
            return next.numbering_span(span, container);
        }
        let walker = next.walker();
        let mut blocks = Vec::new();
        for item in &span.items {
            let rest = match item.children.split_first() {
                Some((Component::Paragraph(p), rest)) => {
                    blocks.extend(walker.render_heading(*p, 2, container));
                    rest
                }
                _ => &item.children[..],
            };
            blocks.extend(walker.render_blocks(rest, container));
        }
        walker.hooks().join_blocks(container, blocks)
    }
}

/// Superscript and subscript faked with a smaller, shifted font
///
/// Applies when a run has no explicit vertical alignment, its size is
/// below the paragraph style's size, and its position is shifted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakedVerticalAlign;

impl ExportLayer for FakedVerticalAlign {
    fn run_styles<'d>(&self, cx: &RunContext<'d>, next: Next<'_, 'd>) -> RunStyles {
        let mut styles = next.run_styles(cx);
        let props = cx.properties;
        if props.vertical_align.is_some() {
            return styles;
        }
        let (Some(size), Some(position)) = (props.size, props.position) else {
            return styles;
        };
        let paragraph_size = cx.styles.paragraph_run_properties(cx.paragraph_style).size;
        if paragraph_size.is_some_and(|paragraph_size| size < paragraph_size) {
            if position > 0 {
                styles.insert(RunStyle::Superscript);
            } else if position < 0 {
                styles.insert(RunStyle::Subscript);
            }
        }
        styles
    }
}
