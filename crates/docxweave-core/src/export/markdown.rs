//! Markdown output
//!
//! Plain text with inline markers. Block styling (justification,
//! indentation) has no Markdown form and is dropped.

use std::fmt::Write;

use docxweave_ooxml::model::{Indentation, Justification};

use super::{Container, FormatHooks, ImageData, RenderedBlock, RenderedCell, RunStyle};
use crate::numbering_span::NumberingSpan;

/// Markdown rendering hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownHooks;

/// Prefix the first line with `marker` and align the rest under it
fn hang(content: &str, marker: &str) -> String {
    let indent = " ".repeat(marker.len());
    let mut out = String::new();
    for (i, line) in content.lines().enumerate() {
        if i == 0 {
            out.push_str(marker);
            out.push_str(line);
            continue;
        }
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&indent);
            out.push_str(line);
        }
    }
    if out.is_empty() {
        out.push_str(marker.trim_end());
    }
    out
}

fn cell_text(content: &str) -> String {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

impl FormatHooks for MarkdownHooks {
    fn document(&self, body: String, footnotes: String, _page_width: Option<u32>) -> String {
        let mut out = body.trim_end().to_string();
        if !footnotes.is_empty() {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&footnotes);
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn paragraph(&self, content: String, _container: Container) -> String {
        content
    }

    fn heading(&self, content: String, level: u8, container: Container) -> String {
        match container {
            Container::Body => format!("{} {}", "#".repeat(usize::from(level.clamp(1, 6))), content),
            _ => content,
        }
    }

    fn join_blocks(&self, container: Container, blocks: Vec<RenderedBlock>) -> String {
        let separator = match container {
            Container::Body => "\n\n",
            Container::ListItem => "\n",
            Container::Cell | Container::TextBox | Container::Footnote => " ",
        };
        blocks
            .into_iter()
            .map(|block| block.content)
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn block_style(
        &self,
        content: String,
        _justification: Option<&Justification>,
        _indentation: Option<&Indentation>,
    ) -> String {
        content
    }

    fn run_style(&self, content: String, style: RunStyle) -> String {
        match style {
            RunStyle::Code => format!("`{}`", content),
            RunStyle::Bold => format!("**{}**", content),
            RunStyle::Italic => format!("*{}*", content),
            RunStyle::Underline => format!("***{}***", content),
            RunStyle::Caps
            | RunStyle::SmallCaps
            | RunStyle::Strike
            | RunStyle::Hidden
            | RunStyle::Superscript
            | RunStyle::Subscript => content,
        }
    }

    fn text(&self, text: &str) -> String {
        text.to_string()
    }

    fn tab(&self) -> String {
        "\t".to_string()
    }

    fn line_break(&self) -> String {
        "  \n".to_string()
    }

    fn page_break(&self) -> String {
        "\n\n---\n\n".to_string()
    }

    fn insertion(&self, content: String) -> String {
        content
    }

    fn deletion(&self, _content: String) -> String {
        String::new()
    }

    fn renders_deletions(&self) -> bool {
        false
    }

    fn hyperlink(&self, content: String, href: &str) -> String {
        format!("[{}]({})", content, href)
    }

    fn image(&self, image: ImageData<'_>) -> String {
        format!("![{}]({})", image.alt.unwrap_or_default(), image.target)
    }

    fn list(&self, span: &NumberingSpan<'_>, items: Vec<String>) -> String {
        let marker = if span.format.is_bullet() { "- " } else { "1. " };
        items
            .iter()
            .map(|item| hang(item, marker))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table(&self, rows: Vec<Vec<RenderedCell>>) -> String {
        let grid: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| {
                let mut cells = Vec::new();
                for cell in row {
                    cells.push(cell_text(&cell.content));
                    for _ in 1..cell.colspan {
                        cells.push(String::new());
                    }
                }
                cells
            })
            .collect();
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return String::new();
        }

        let mut out = String::new();
        for (i, row) in grid.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push('|');
            for column in 0..width {
                let text = row.get(column).map(String::as_str).unwrap_or_default();
                let _ = write!(out, " {} |", text);
            }
            if i == 0 {
                out.push_str("\n|");
                out.push_str(&" --- |".repeat(width));
            }
        }
        out
    }

    fn footnote_reference(&self, index: usize) -> String {
        format!("[^{}]", index)
    }

    fn footnote_mark(&self, _index: usize) -> String {
        String::new()
    }

    fn footnotes(&self, notes: Vec<(usize, String)>) -> String {
        notes
            .into_iter()
            .map(|(index, content)| format!("[^{}]: {}", index, content.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
