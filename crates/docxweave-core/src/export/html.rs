//! HTML output
//!
//! A single self-contained page. Inline formatting uses a fixed set of
//! `pydocx-*` utility classes whose declarations live in the `<style>`
//! block, so consumers can restyle them without touching the markup.

use std::collections::BTreeMap;
use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use html_escape::{encode_double_quoted_attribute, encode_text};

use docxweave_ooxml::model::{Indentation, Justification};
use docxweave_ooxml::NumberFormat;

use super::{twips_to_em, BlockKind, Container, FormatHooks, ImageData, RenderedBlock, RenderedCell, RunStyle};
use crate::config::HtmlSettings;
use crate::numbering_span::NumberingSpan;

/// HTML rendering hooks
#[derive(Debug, Clone, Default)]
pub struct HtmlHooks {
    settings: HtmlSettings,
}

impl HtmlHooks {
    pub fn new(settings: HtmlSettings) -> Self {
        Self { settings }
    }
}

/// List-style classes and the CSS list style each maps to
const LIST_STYLE_TYPES: &[(&str, &str)] = &[
    ("cardinalText", "decimal"),
    ("decimal", "decimal"),
    ("decimalZero", "decimal-leading-zero"),
    ("lowerLetter", "lower-alpha"),
    ("lowerRoman", "lower-roman"),
    ("ordinal", "decimal"),
    ("ordinalText", "decimal"),
    ("upperLetter", "upper-alpha"),
    ("upperRoman", "upper-roman"),
];

/// The `<style>` contents
///
/// Rules are sorted by selector. A known page width adds a `body` rule first.
pub fn stylesheet(page_width: Option<u32>) -> String {
    let mut rules: BTreeMap<String, &str> = BTreeMap::new();
    for (selector, declarations) in [
        ("caps", "text-transform:uppercase"),
        ("center", "text-align:center"),
        ("delete", "color:red;text-decoration:line-through"),
        ("hidden", "visibility:hidden"),
        ("insert", "color:green"),
        ("left", "text-align:left"),
        ("right", "text-align:right"),
        ("small-caps", "font-variant:small-caps"),
        ("strike", "text-decoration:line-through"),
        ("tab", "display:inline-block;width:4em"),
        ("underline", "text-decoration:underline"),
    ] {
        rules.insert(format!(".pydocx-{}", selector), declarations);
    }
    let list_rules: Vec<(String, String)> = LIST_STYLE_TYPES
        .iter()
        .map(|(format, css)| {
            (
                format!(".pydocx-list-style-type-{}", format),
                format!("list-style-type:{}", css),
            )
        })
        .collect();
    for (selector, declarations) in &list_rules {
        rules.insert(selector.clone(), declarations);
    }

    let mut css = String::new();
    if let Some(twips) = page_width {
        let pixels = f64::from(twips) / 20.0 * 4.0 / 3.0;
        let _ = write!(css, "body {{margin:0px auto;width:{:.2}px}}", pixels);
    }
    for (selector, declarations) in &rules {
        let _ = write!(css, "{} {{{}}}", selector, declarations);
    }
    css
}

fn justification_class(justification: &Justification) -> Option<&'static str> {
    match justification {
        Justification::Left => Some("left"),
        Justification::Center => Some("center"),
        Justification::Right => Some("right"),
        Justification::Both | Justification::Other(_) => None,
    }
}

fn indentation_style(indentation: &Indentation) -> String {
    let mut declarations = Vec::new();
    if let Some(left) = indentation.left.filter(|v| *v != 0) {
        declarations.push(format!("margin-left:{}", twips_to_em(left)));
    }
    if let Some(right) = indentation.right.filter(|v| *v != 0) {
        declarations.push(format!("margin-right:{}", twips_to_em(right)));
    }
    if let Some(first_line) = indentation.first_line_offset().filter(|v| *v != 0) {
        declarations.push(format!("text-indent:{}", twips_to_em(first_line)));
    }
    declarations.join(";")
}

fn mime_type(target: &str) -> &'static str {
    let extension = target
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}

fn span_with_class(class: &str, content: String) -> String {
    format!("<span class=\"pydocx-{}\">{}</span>", class, content)
}

impl FormatHooks for HtmlHooks {
    fn document(&self, body: String, footnotes: String, page_width: Option<u32>) -> String {
        let mut html = String::from("<html><head><meta charset=\"utf-8\" />");
        if self.settings.include_stylesheet {
            let width = page_width.filter(|_| self.settings.page_width);
            html.push_str("<style>");
            html.push_str(&stylesheet(width));
            html.push_str("</style>");
        }
        html.push_str("</head><body>");
        html.push_str(&body);
        html.push_str(&footnotes);
        html.push_str("</body></html>");
        html
    }

    fn paragraph(&self, content: String, container: Container) -> String {
        match container {
            Container::Body | Container::Footnote => format!("<p>{}</p>", content),
            Container::ListItem | Container::Cell | Container::TextBox => content,
        }
    }

    fn heading(&self, content: String, level: u8, _container: Container) -> String {
        let level = level.clamp(1, 6);
        format!("<h{level}>{}</h{level}>", content, level = level)
    }

    fn join_blocks(&self, container: Container, blocks: Vec<RenderedBlock>) -> String {
        let mut out = String::new();
        for (i, block) in blocks.into_iter().enumerate() {
            let inline_paragraph = matches!(
                container,
                Container::ListItem | Container::Cell | Container::TextBox
            ) && block.kind == BlockKind::Paragraph;
            if i > 0 && inline_paragraph {
                out.push_str("<br />");
            }
            out.push_str(&block.content);
        }
        out
    }

    fn block_style(
        &self,
        content: String,
        justification: Option<&Justification>,
        indentation: Option<&Indentation>,
    ) -> String {
        let mut out = content;
        if let Some(style) = indentation.map(indentation_style).filter(|s| !s.is_empty()) {
            out = format!("<span style=\"display:inline-block;{}\">{}</span>", style, out);
        }
        if let Some(class) = justification.and_then(justification_class) {
            out = span_with_class(class, out);
        }
        out
    }

    fn run_style(&self, content: String, style: RunStyle) -> String {
        match style {
            RunStyle::Code => content,
            RunStyle::Bold => format!("<strong>{}</strong>", content),
            RunStyle::Italic => format!("<em>{}</em>", content),
            RunStyle::Underline => span_with_class("underline", content),
            RunStyle::Caps => span_with_class("caps", content),
            RunStyle::SmallCaps => span_with_class("small-caps", content),
            RunStyle::Strike => span_with_class("strike", content),
            RunStyle::Hidden => span_with_class("hidden", content),
            RunStyle::Superscript => format!("<sup>{}</sup>", content),
            RunStyle::Subscript => format!("<sub>{}</sub>", content),
        }
    }

    fn text(&self, text: &str) -> String {
        encode_text(text).into_owned()
    }

    fn tab(&self) -> String {
        "<span class=\"pydocx-tab\"></span>".to_string()
    }

    fn line_break(&self) -> String {
        "<br />".to_string()
    }

    fn page_break(&self) -> String {
        "<hr />".to_string()
    }

    fn insertion(&self, content: String) -> String {
        span_with_class("insert", content)
    }

    fn deletion(&self, content: String) -> String {
        span_with_class("delete", content)
    }

    fn hyperlink(&self, content: String, href: &str) -> String {
        format!(
            "<a href=\"{}\">{}</a>",
            encode_double_quoted_attribute(href),
            content
        )
    }

    fn image(&self, image: ImageData<'_>) -> String {
        let src = match image.bytes {
            Some(bytes) if self.settings.embed_images => format!(
                "data:{};base64,{}",
                mime_type(image.target),
                STANDARD.encode(bytes)
            ),
            _ => image.target.to_string(),
        };
        let mut tag = format!("<img src=\"{}\"", encode_double_quoted_attribute(&src));
        if let Some(size) = image.size {
            let _ = write!(tag, " height=\"{}px\" width=\"{}px\"", size.height, size.width);
        }
        if let Some(alt) = image.alt {
            let _ = write!(tag, " alt=\"{}\"", encode_double_quoted_attribute(alt));
        }
        tag.push_str(" />");
        tag
    }

    fn list(&self, span: &NumberingSpan<'_>, items: Vec<String>) -> String {
        let mut out = match &span.format {
            NumberFormat::Bullet | NumberFormat::None => "<ul>".to_string(),
            format => format!("<ol class=\"pydocx-list-style-type-{}\">", format.as_str()),
        };
        for item in items {
            out.push_str("<li>");
            out.push_str(&item);
            out.push_str("</li>");
        }
        out.push_str(if span.format.is_bullet() { "</ul>" } else { "</ol>" });
        out
    }

    fn table(&self, rows: Vec<Vec<RenderedCell>>) -> String {
        let mut out = String::from("<table border=\"1\">");
        for row in rows {
            out.push_str("<tr>");
            for cell in row.into_iter().filter(|c| c.rowspan > 0) {
                out.push_str("<td");
                if cell.colspan > 1 {
                    let _ = write!(out, " colspan=\"{}\"", cell.colspan);
                }
                if cell.rowspan > 1 {
                    let _ = write!(out, " rowspan=\"{}\"", cell.rowspan);
                }
                out.push('>');
                out.push_str(&cell.content);
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</table>");
        out
    }

    fn footnote_reference(&self, index: usize) -> String {
        format!(
            "<sup><a href=\"#footnote-{n}\" id=\"footnote-ref-{n}\">{n}</a></sup>",
            n = index
        )
    }

    fn footnote_mark(&self, index: usize) -> String {
        format!("<a href=\"#footnote-ref-{}\">^</a>", index)
    }

    fn footnotes(&self, notes: Vec<(usize, String)>) -> String {
        let mut out = String::from("<hr /><ol>");
        for (index, content) in notes {
            let _ = write!(out, "<li id=\"footnote-{}\">{}</li>", index, content);
        }
        out.push_str("</ol>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_is_sorted_and_exact() {
        let css = stylesheet(None);
        assert!(css.starts_with(".pydocx-caps {text-transform:uppercase}.pydocx-center {text-align:center}"));
        assert!(css.contains(".pydocx-delete {color:red;text-decoration:line-through}.pydocx-hidden {visibility:hidden}"));
        assert!(css.contains(".pydocx-left {text-align:left}.pydocx-list-style-type-cardinalText {list-style-type:decimal}"));
        assert!(css.contains(".pydocx-list-style-type-decimalZero {list-style-type:decimal-leading-zero}"));
        assert!(css.contains(".pydocx-list-style-type-upperRoman {list-style-type:upper-roman}.pydocx-right {text-align:right}"));
        assert!(css.ends_with(".pydocx-tab {display:inline-block;width:4em}.pydocx-underline {text-decoration:underline}"));
    }

    #[test]
    fn test_stylesheet_page_width() {
        let css = stylesheet(Some(12240));
        assert!(css.starts_with("body {margin:0px auto;width:816.00px}.pydocx-caps"));
    }

    #[test]
    fn test_block_style_wrapping_order() {
        let hooks = HtmlHooks::default();
        let indentation = Indentation {
            left: Some(720),
            hanging: Some(360),
            first_line: Some(100),
            ..Default::default()
        };
        assert_eq!(
            hooks.block_style("x".into(), Some(&Justification::Center), Some(&indentation)),
            "<span class=\"pydocx-center\"><span style=\"display:inline-block;margin-left:3.00em;text-indent:-1.50em\">x</span></span>"
        );
        assert_eq!(hooks.block_style("x".into(), Some(&Justification::Both), None), "x");
        assert_eq!(
            hooks.block_style("x".into(), None, Some(&Indentation::default())),
            "x"
        );
    }

    #[test]
    fn test_image_tag() {
        let hooks = HtmlHooks::default();
        let tag = hooks.image(ImageData {
            target: "word/media/image1.png",
            is_external: false,
            bytes: Some(b"abc"),
            alt: Some("a \"cat\""),
            size: Some(docxweave_ooxml::ImageSize { width: 20, height: 10 }),
        });
        assert_eq!(
            tag,
            "<img src=\"data:image/png;base64,YWJj\" height=\"10px\" width=\"20px\" alt=\"a &quot;cat&quot;\" />"
        );

        let linked = HtmlHooks::new(HtmlSettings {
            embed_images: false,
            ..HtmlSettings::default()
        })
        .image(ImageData {
            target: "word/media/image1.png",
            is_external: false,
            bytes: Some(b"abc"),
            alt: None,
            size: None,
        });
        assert_eq!(linked, "<img src=\"word/media/image1.png\" />");
    }

    #[test]
    fn test_table_skips_merged_cells() {
        let hooks = HtmlHooks::default();
        let cell = |content: &str, colspan, rowspan| RenderedCell {
            content: content.to_string(),
            colspan,
            rowspan,
        };
        let html = hooks.table(vec![
            vec![cell("A", 1, 2), cell("B", 2, 1)],
            vec![cell("", 1, 0), cell("C", 1, 1)],
        ]);
        assert_eq!(
            html,
            "<table border=\"1\"><tr><td rowspan=\"2\">A</td><td colspan=\"2\">B</td></tr><tr><td>C</td></tr></table>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(HtmlHooks::default().text("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("word/media/x.JPEG"), "image/jpeg");
        assert_eq!(mime_type("word/media/x.emf"), "image/x-emf");
        assert_eq!(mime_type("word/media/noext"), "application/octet-stream");
    }
}
