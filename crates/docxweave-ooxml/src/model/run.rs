//! Runs and run properties

use std::cell::OnceCell;

use super::image::{Drawing, Picture};
use super::{parse_int, FromXml, LoadContext};
use crate::styles::StyleSheet;
use crate::xml::XmlElement;

/// A `w:r` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// Direct properties (`w:rPr`)
    pub properties: Option<RunProperties>,
    /// Run content in document order
    pub content: Vec<RunContent>,
    effective: OnceCell<RunProperties>,
}

impl FromXml for Run {
    const TAG: &'static str = "r";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            properties: element
                .child(RunProperties::TAG)
                .map(|e| RunProperties::from_xml(e, ctx)),
            content: load_run_content(element, ctx),
            effective: OnceCell::new(),
        }
    }
}

impl Run {
    /// Build a run directly (mostly for tests)
    pub fn new(properties: Option<RunProperties>, content: Vec<RunContent>) -> Self {
        Self {
            properties,
            content,
            effective: OnceCell::new(),
        }
    }

    /// Cascaded properties, computed on first use and cached
    ///
    /// `paragraph_style` is the effective style of the enclosing paragraph;
    /// a run always lives in exactly one paragraph so the cache is sound.
    pub fn effective_properties(
        &self,
        styles: &StyleSheet,
        paragraph_style: Option<&str>,
    ) -> &RunProperties {
        self.effective.get_or_init(|| {
            styles.effective_run_properties(paragraph_style, self.properties.as_ref())
        })
    }

    /// Visible text of the run
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for item in &self.content {
            match item {
                RunContent::Text(t) => text.push_str(t),
                RunContent::Tab => text.push('\t'),
                RunContent::Break(_) => text.push('\n'),
                _ => {}
            }
        }
        text
    }
}

/// Run-level content
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    /// `w:t`
    Text(String),
    /// `w:delText`, only meaningful inside a deletion
    DeletedText(String),
    /// `w:instrText`, field instruction text
    FieldInstruction(String),
    /// `w:tab`
    Tab,
    /// `w:br` / `w:cr`
    Break(BreakKind),
    /// `w:noBreakHyphen`
    NoBreakHyphen,
    /// `w:softHyphen`
    SoftHyphen,
    /// `w:sym`, already decoded to a character
    Symbol(char),
    /// `w:fldChar`
    FieldChar(FieldCharKind),
    /// `w:footnoteReference`, pointing into the footnotes part
    FootnoteReference(String),
    /// `w:footnoteRef`, the mark at the start of a footnote body
    FootnoteRef,
    /// `w:drawing`
    Drawing(Drawing),
    /// `w:pict` (VML)
    Picture(Picture),
}

/// Kind of `w:br`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    Line,
    Page,
}

/// `w:fldChar/@w:fldCharType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCharKind {
    Begin,
    Separate,
    End,
}

fn load_run_content(element: &XmlElement, ctx: &mut LoadContext) -> Vec<RunContent> {
    let mut content = Vec::new();
    push_run_content(element, ctx, &mut content);
    content
}

fn push_run_content(element: &XmlElement, ctx: &mut LoadContext, content: &mut Vec<RunContent>) {
    for child in element.elements() {
        let item = match child.tag.as_str() {
            "t" => RunContent::Text(child.text()),
            "delText" => RunContent::DeletedText(child.text()),
            "instrText" => RunContent::FieldInstruction(child.text()),
            "tab" => RunContent::Tab,
            "br" => match child.attr("type") {
                Some("page") => RunContent::Break(BreakKind::Page),
                _ => RunContent::Break(BreakKind::Line),
            },
            "cr" => RunContent::Break(BreakKind::Line),
            "noBreakHyphen" => RunContent::NoBreakHyphen,
            "softHyphen" => RunContent::SoftHyphen,
            "sym" => match decode_symbol(child.attr("char")) {
                Some(c) => RunContent::Symbol(c),
                None => continue,
            },
            "fldChar" => match child.attr("fldCharType") {
                Some("begin") => RunContent::FieldChar(FieldCharKind::Begin),
                Some("separate") => RunContent::FieldChar(FieldCharKind::Separate),
                Some("end") => RunContent::FieldChar(FieldCharKind::End),
                _ => continue,
            },
            "footnoteReference" => match child.attr("id") {
                Some(id) => RunContent::FootnoteReference(id.to_string()),
                None => continue,
            },
            "footnoteRef" => RunContent::FootnoteRef,
            "drawing" => match ctx.descend("drawing", |ctx| Drawing::from_xml(child, ctx)) {
                Some(drawing) => RunContent::Drawing(drawing),
                None => continue,
            },
            "pict" => match ctx.descend("pict", |ctx| Picture::from_xml(child, ctx)) {
                Some(picture) => RunContent::Picture(picture),
                None => continue,
            },
            "AlternateContent" => {
                if let Some(fallback) = child.child("Fallback") {
                    push_run_content(fallback, ctx, content);
                }
                continue;
            }
            _ => continue,
        };
        content.push(item);
    }
}

fn decode_symbol(code: Option<&str>) -> Option<char> {
    let code = u32::from_str_radix(code?.trim(), 16).ok()?;
    // Symbol fonts map their glyphs into U+F000..U+F0FF
    let code = if (0xF000..=0xF0FF).contains(&code) {
        code - 0xF000
    } else {
        code
    };
    char::from_u32(code)
}

/// Tri-state toggle backing bold, italic and friends
///
/// `OnOff(None)` is a bare element (`<w:b/>`), which counts as on. Only
/// explicit off-like values turn a toggle off.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OnOff(pub Option<String>);

impl OnOff {
    /// Toggle read from an element, honouring its `w:val`
    pub fn from_element(element: &XmlElement) -> Self {
        Self(element.val().map(str::to_string))
    }

    /// Boolean coercion
    pub fn is_on(&self) -> bool {
        !matches!(
            self.0.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("false" | "off" | "none" | "0")
        )
    }
}

/// Vertical alignment (`w:vertAlign`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Baseline,
    Superscript,
    Subscript,
}

/// Run properties (`w:rPr`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    /// Character style reference (`w:rStyle`)
    pub style_id: Option<String>,
    pub bold: Option<OnOff>,
    pub italic: Option<OnOff>,
    pub underline: Option<OnOff>,
    pub caps: Option<OnOff>,
    pub small_caps: Option<OnOff>,
    pub strike: Option<OnOff>,
    pub double_strike: Option<OnOff>,
    pub vanish: Option<OnOff>,
    pub web_hidden: Option<OnOff>,
    pub vertical_align: Option<VerticalAlign>,
    /// Font size in half-points (`w:sz`)
    pub size: Option<u32>,
    /// Baseline shift in half-points (`w:position`)
    pub position: Option<i32>,
    /// ASCII font name (`w:rFonts/@w:ascii`)
    pub font: Option<String>,
}

impl FromXml for RunProperties {
    const TAG: &'static str = "rPr";

    fn from_xml(element: &XmlElement, _ctx: &mut LoadContext) -> Self {
        let toggle = |tag: &str| element.child(tag).map(OnOff::from_element);

        Self {
            style_id: element
                .child("rStyle")
                .and_then(|e| e.val())
                .map(str::to_string),
            bold: toggle("b"),
            italic: toggle("i"),
            underline: toggle("u"),
            caps: toggle("caps"),
            small_caps: toggle("smallCaps"),
            strike: toggle("strike"),
            double_strike: toggle("dstrike"),
            vanish: toggle("vanish"),
            web_hidden: toggle("webHidden"),
            vertical_align: element
                .child("vertAlign")
                .and_then(|e| e.val())
                .and_then(|v| match v {
                    "superscript" => Some(VerticalAlign::Superscript),
                    "subscript" => Some(VerticalAlign::Subscript),
                    "baseline" => Some(VerticalAlign::Baseline),
                    _ => None,
                }),
            size: parse_int(element.child("sz").and_then(|e| e.val())),
            position: parse_int(element.child("position").and_then(|e| e.val())),
            font: element
                .child("rFonts")
                .and_then(|e| e.attr("ascii"))
                .map(str::to_string),
        }
    }
}

impl RunProperties {
    /// Overlay `other` on top of `self`, property by property
    pub fn merge(&mut self, other: &RunProperties) {
        overlay(&mut self.style_id, &other.style_id);
        overlay(&mut self.bold, &other.bold);
        overlay(&mut self.italic, &other.italic);
        overlay(&mut self.underline, &other.underline);
        overlay(&mut self.caps, &other.caps);
        overlay(&mut self.small_caps, &other.small_caps);
        overlay(&mut self.strike, &other.strike);
        overlay(&mut self.double_strike, &other.double_strike);
        overlay(&mut self.vanish, &other.vanish);
        overlay(&mut self.web_hidden, &other.web_hidden);
        overlay(&mut self.vertical_align, &other.vertical_align);
        overlay(&mut self.size, &other.size);
        overlay(&mut self.position, &other.position);
        overlay(&mut self.font, &other.font);
    }

    fn flag(value: &Option<OnOff>) -> bool {
        value.as_ref().is_some_and(OnOff::is_on)
    }

    pub fn is_bold(&self) -> bool {
        Self::flag(&self.bold)
    }

    pub fn is_italic(&self) -> bool {
        Self::flag(&self.italic)
    }

    pub fn is_underline(&self) -> bool {
        Self::flag(&self.underline)
    }

    pub fn is_caps(&self) -> bool {
        Self::flag(&self.caps)
    }

    pub fn is_small_caps(&self) -> bool {
        Self::flag(&self.small_caps)
    }

    /// Single or double strike-through
    pub fn is_strike(&self) -> bool {
        Self::flag(&self.strike) || Self::flag(&self.double_strike)
    }

    /// `vanish` or `webHidden`
    pub fn is_hidden(&self) -> bool {
        Self::flag(&self.vanish) || Self::flag(&self.web_hidden)
    }

    pub fn is_superscript(&self) -> bool {
        self.vertical_align == Some(VerticalAlign::Superscript)
    }

    pub fn is_subscript(&self) -> bool {
        self.vertical_align == Some(VerticalAlign::Subscript)
    }
}

fn overlay<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *slot = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(xml: &str) -> Run {
        let xml = format!(r#"<w:r xmlns:w="urn:w" xmlns:mc="urn:mc">{}</w:r>"#, xml);
        let element = XmlElement::parse(xml.as_bytes()).unwrap();
        Run::from_xml(&element, &mut LoadContext::new())
    }

    #[test]
    fn test_on_off_coercion() {
        assert!(OnOff(None).is_on());
        for on in ["", "true", "on", "1", "single"] {
            assert!(OnOff(Some(on.to_string())).is_on(), "{on}");
        }
        for off in ["false", "off", "none", "0", "FALSE"] {
            assert!(!OnOff(Some(off.to_string())).is_on(), "{off}");
        }
    }

    #[test]
    fn test_run_properties() {
        let run = load(
            r#"<w:rPr><w:rStyle w:val="Strong"/><w:b/><w:i w:val="0"/><w:u w:val="single"/><w:dstrike/><w:webHidden/><w:vertAlign w:val="superscript"/><w:sz w:val="18"/><w:position w:val="-4"/><w:rFonts w:ascii="Courier New"/></w:rPr><w:t>x</w:t>"#,
        );
        let props = run.properties.unwrap();
        assert_eq!(props.style_id.as_deref(), Some("Strong"));
        assert!(props.is_bold());
        assert!(!props.is_italic());
        assert!(props.is_underline());
        assert!(props.is_strike());
        assert!(props.is_hidden());
        assert!(props.is_superscript());
        assert_eq!(props.size, Some(18));
        assert_eq!(props.position, Some(-4));
        assert_eq!(props.font.as_deref(), Some("Courier New"));
    }

    #[test]
    fn test_absent_toggle_is_off() {
        let props = RunProperties::default();
        assert!(!props.is_bold());
        assert!(!props.is_hidden());
    }

    #[test]
    fn test_run_content() {
        let run = load(
            r#"<w:t xml:space="preserve">a </w:t><w:tab/><w:br/><w:br w:type="page"/><w:cr/><w:sym w:char="F041"/><w:fldChar w:fldCharType="begin"/><w:instrText> PAGE </w:instrText><w:footnoteReference w:id="2"/><w:unknown/>"#,
        );
        assert_eq!(
            run.content,
            vec![
                RunContent::Text("a ".to_string()),
                RunContent::Tab,
                RunContent::Break(BreakKind::Line),
                RunContent::Break(BreakKind::Page),
                RunContent::Break(BreakKind::Line),
                RunContent::Symbol('A'),
                RunContent::FieldChar(FieldCharKind::Begin),
                RunContent::FieldInstruction(" PAGE ".to_string()),
                RunContent::FootnoteReference("2".to_string()),
            ]
        );
    }

    #[test]
    fn test_alternate_content_uses_fallback() {
        let run = load(
            r#"<mc:AlternateContent><mc:Choice Requires="wps"><w:t>choice</w:t></mc:Choice><mc:Fallback><w:t>fallback</w:t></mc:Fallback></mc:AlternateContent>"#,
        );
        assert_eq!(run.content, vec![RunContent::Text("fallback".to_string())]);
    }

    #[test]
    fn test_merge_explicit_off_wins() {
        let mut props = RunProperties {
            bold: Some(OnOff(None)),
            ..Default::default()
        };
        props.merge(&RunProperties {
            bold: Some(OnOff(Some("off".to_string()))),
            ..Default::default()
        });
        assert!(!props.is_bold());
    }
}
