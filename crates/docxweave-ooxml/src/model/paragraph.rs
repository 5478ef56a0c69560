//! Paragraphs and paragraph-level content

use std::cell::OnceCell;

use super::run::Run;
use super::{parse_int, FromXml, LoadContext, NodeId};
use crate::numbering::{Level, NumberingDefinitions, NumberingInstance};
use crate::styles::StyleSheet;
use crate::xml::XmlElement;

/// A `w:p` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Identity within the document
    pub id: NodeId,
    /// Direct properties (`w:pPr`)
    pub properties: Option<ParagraphProperties>,
    /// Paragraph content in document order
    pub children: Vec<Inline>,
    effective: OnceCell<ParagraphProperties>,
}

impl FromXml for Paragraph {
    const TAG: &'static str = "p";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            id: ctx.next_id(),
            properties: element
                .child(ParagraphProperties::TAG)
                .map(|e| ParagraphProperties::from_xml(e, ctx)),
            children: load_inlines(element, ctx),
            effective: OnceCell::new(),
        }
    }
}

impl Paragraph {
    /// Build a paragraph directly (mostly for tests)
    pub fn new(id: NodeId, properties: Option<ParagraphProperties>, children: Vec<Inline>) -> Self {
        Self {
            id,
            properties,
            children,
            effective: OnceCell::new(),
        }
    }

    /// Cascaded properties, computed on first use and cached
    pub fn effective_properties(&self, styles: &StyleSheet) -> &ParagraphProperties {
        self.effective
            .get_or_init(|| styles.effective_paragraph_properties(self.properties.as_ref()))
    }

    /// Effective paragraph style id (direct `pStyle` or the default style)
    pub fn style_id<'a>(&'a self, styles: &StyleSheet) -> Option<&'a str> {
        self.effective_properties(styles).style_id.as_deref()
    }

    /// Heading level derived from the paragraph style chain
    pub fn heading_level(&self, styles: &StyleSheet) -> Option<u8> {
        self.style_id(styles).and_then(|id| styles.heading_level(id))
    }

    /// The numbering instance this paragraph refers to, if any
    pub fn get_numbering_definition<'n>(
        &self,
        styles: &StyleSheet,
        numbering: &'n NumberingDefinitions,
    ) -> Option<&'n NumberingInstance> {
        let num_id = self.effective_properties(styles).numbering.as_ref()?.num_id?;
        if num_id == 0 {
            return None;
        }
        numbering.instance(num_id)
    }

    /// The numbering level this paragraph is formatted with, if any
    pub fn get_numbering_level<'n>(
        &self,
        styles: &StyleSheet,
        numbering: &'n NumberingDefinitions,
    ) -> Option<&'n Level> {
        let props = self.effective_properties(styles).numbering.as_ref()?;
        let num_id = props.num_id?;
        if num_id == 0 {
            return None;
        }
        numbering.level(num_id, props.level.unwrap_or(0))
    }

    /// Every run in the paragraph, descending into wrappers
    pub fn runs(&self) -> Vec<&Run> {
        let mut runs = Vec::new();
        collect_runs(&self.children, &mut runs);
        runs
    }

    /// Concatenated visible text, for diagnostics and outlines
    pub fn plain_text(&self) -> String {
        self.runs()
            .iter()
            .map(|r| r.plain_text())
            .collect::<Vec<_>>()
            .concat()
    }
}

fn collect_runs<'a>(children: &'a [Inline], out: &mut Vec<&'a Run>) {
    for child in children {
        match child {
            Inline::Run(run) => out.push(run),
            other => {
                if let Some(nested) = other.nested_children() {
                    collect_runs(nested, out);
                }
            }
        }
    }
}

/// Paragraph properties (`w:pPr`)
///
/// Every field is optional so the same type serves direct formatting,
/// style definitions, numbering levels and the cascaded result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProperties {
    /// Paragraph style reference (`w:pStyle`)
    pub style_id: Option<String>,
    /// List membership (`w:numPr`)
    pub numbering: Option<NumberingProperties>,
    /// Alignment (`w:jc`)
    pub justification: Option<Justification>,
    /// Indentation (`w:ind`)
    pub indentation: Option<Indentation>,
    /// Outline level (`w:outlineLvl`), 0 is the top level
    pub outline_level: Option<u8>,
}

impl FromXml for ParagraphProperties {
    const TAG: &'static str = "pPr";

    fn from_xml(element: &XmlElement, _ctx: &mut LoadContext) -> Self {
        let numbering = element.child("numPr").map(|num_pr| NumberingProperties {
            num_id: parse_int(num_pr.child("numId").and_then(|e| e.val())),
            level: parse_int(num_pr.child("ilvl").and_then(|e| e.val())),
        });

        Self {
            style_id: element
                .child("pStyle")
                .and_then(|e| e.val())
                .map(str::to_string),
            numbering,
            justification: element
                .child("jc")
                .and_then(|e| e.val())
                .map(Justification::from_val),
            indentation: element.child("ind").map(Indentation::from_element),
            outline_level: parse_int(element.child("outlineLvl").and_then(|e| e.val())),
        }
    }
}

impl ParagraphProperties {
    /// Overlay `other` on top of `self`, field by field
    pub fn merge(&mut self, other: &ParagraphProperties) {
        if other.style_id.is_some() {
            self.style_id = other.style_id.clone();
        }
        if let Some(numbering) = &other.numbering {
            let merged = self.numbering.get_or_insert_with(NumberingProperties::default);
            if numbering.num_id.is_some() {
                merged.num_id = numbering.num_id;
            }
            if numbering.level.is_some() {
                merged.level = numbering.level;
            }
        }
        if other.justification.is_some() {
            self.justification = other.justification.clone();
        }
        if let Some(indentation) = &other.indentation {
            self.indentation
                .get_or_insert_with(Indentation::default)
                .merge(indentation);
        }
        if other.outline_level.is_some() {
            self.outline_level = other.outline_level;
        }
    }
}

/// `w:numPr` contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberingProperties {
    /// `w:numId`; 0 explicitly removes list formatting
    pub num_id: Option<u32>,
    /// `w:ilvl`
    pub level: Option<u32>,
}

/// Paragraph alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Justification {
    Left,
    Center,
    Right,
    Both,
    /// Any other `w:jc` value (distribute, kashida variants, ...)
    Other(String),
}

impl Justification {
    /// Map a `w:jc/@w:val`, folding bidi-neutral `start`/`end` into left/right
    pub fn from_val(val: &str) -> Self {
        match val {
            "left" | "start" => Self::Left,
            "center" => Self::Center,
            "right" | "end" => Self::Right,
            "both" => Self::Both,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Paragraph indentation in twips
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indentation {
    pub left: Option<i32>,
    pub right: Option<i32>,
    pub first_line: Option<i32>,
    pub hanging: Option<i32>,
}

impl Indentation {
    fn from_element(element: &XmlElement) -> Self {
        Self {
            left: parse_int(element.attr("left").or_else(|| element.attr("start"))),
            right: parse_int(element.attr("right").or_else(|| element.attr("end"))),
            first_line: parse_int(element.attr("firstLine")),
            hanging: parse_int(element.attr("hanging")),
        }
    }

    fn merge(&mut self, other: &Indentation) {
        if other.left.is_some() {
            self.left = other.left;
        }
        if other.right.is_some() {
            self.right = other.right;
        }
        if other.first_line.is_some() {
            self.first_line = other.first_line;
        }
        if other.hanging.is_some() {
            self.hanging = other.hanging;
        }
    }

    /// Signed first-line offset: hanging wins over firstLine and is negated
    pub fn first_line_offset(&self) -> Option<i32> {
        match (self.hanging, self.first_line) {
            (Some(hanging), _) => Some(hanging.saturating_neg()),
            (None, first_line) => first_line,
        }
    }

    /// True when no offset is non-zero
    pub fn is_zero(&self) -> bool {
        self.left.unwrap_or(0) == 0
            && self.right.unwrap_or(0) == 0
            && self.first_line_offset().unwrap_or(0) == 0
    }
}

/// Paragraph-level content
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    Hyperlink(Hyperlink),
    SmartTag(SmartTagRun),
    Inserted(InsertedRun),
    Deleted(DeletedRun),
    Sdt(SdtRun),
    SimpleField(SimpleField),
    CustomXml(CustomXmlRun),
}

impl Inline {
    /// Children of wrapper variants; `None` for runs
    pub fn nested_children(&self) -> Option<&[Inline]> {
        match self {
            Inline::Run(_) => None,
            Inline::Hyperlink(h) => Some(&h.children),
            Inline::SmartTag(g) => Some(&g.children),
            Inline::Inserted(g) => Some(&g.children),
            Inline::Deleted(g) => Some(&g.children),
            Inline::Sdt(g) => Some(&g.children),
            Inline::SimpleField(f) => Some(&f.children),
            Inline::CustomXml(g) => Some(&g.children),
        }
    }
}

crate::xml_children! {
    pub fn load_inlines -> Inline {
        "r" => Run(Run),
        "hyperlink" => Hyperlink(Hyperlink),
        "smartTag" => SmartTag(SmartTagRun),
        "ins" => Inserted(InsertedRun),
        "del" => Deleted(DeletedRun),
        "sdt" => Sdt(SdtRun),
        "fldSimple" => SimpleField(SimpleField),
        "customXml" => CustomXml(CustomXmlRun),
    }
}

/// A `w:hyperlink`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hyperlink {
    /// Relationship id (`r:id`) of an external target
    pub rel_id: Option<String>,
    /// Bookmark name (`w:anchor`) of an internal target
    pub anchor: Option<String>,
    pub children: Vec<Inline>,
}

impl FromXml for Hyperlink {
    const TAG: &'static str = "hyperlink";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            rel_id: element.attr("id").map(str::to_string),
            anchor: element.attr("anchor").map(str::to_string),
            children: load_inlines(element, ctx),
        }
    }
}

/// A `w:fldSimple`: a field whose instruction is an attribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleField {
    pub instruction: String,
    pub children: Vec<Inline>,
}

impl FromXml for SimpleField {
    const TAG: &'static str = "fldSimple";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            instruction: element.attr("instr").unwrap_or_default().to_string(),
            children: load_inlines(element, ctx),
        }
    }
}

/// A run-level structured document tag; content lives in `w:sdtContent`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdtRun {
    pub children: Vec<Inline>,
}

impl FromXml for SdtRun {
    const TAG: &'static str = "sdt";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            children: element
                .child("sdtContent")
                .map(|content| load_inlines(content, ctx))
                .unwrap_or_default(),
        }
    }
}

macro_rules! inline_wrapper {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub children: Vec<Inline>,
        }

        impl FromXml for $name {
            const TAG: &'static str = $tag;

            fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
                Self {
                    children: load_inlines(element, ctx),
                }
            }
        }
    };
}

inline_wrapper!(
    /// A `w:smartTag`, rendered as its content
    SmartTagRun,
    "smartTag"
);
inline_wrapper!(
    /// Tracked insertion (`w:ins`)
    InsertedRun,
    "ins"
);
inline_wrapper!(
    /// Tracked deletion (`w:del`)
    DeletedRun,
    "del"
);
inline_wrapper!(
    /// Run-level `w:customXml`
    CustomXmlRun,
    "customXml"
);
