//! Style definitions parsing (word/styles.xml)
//!
//! Styles are stored per [`StyleType`] so inheritance only ever walks
//! same-type ancestors: a paragraph style `basedOn` a character style simply
//! ends its chain there.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::model::{FromXml, LoadContext, ParagraphProperties, RunProperties};
use crate::xml::XmlElement;

/// Collection of styles from a document
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    /// Styles by type, then by style ID
    styles: HashMap<StyleType, HashMap<String, Style>>,
    /// Default paragraph style ID (`w:default="1"`)
    pub default_paragraph: Option<String>,
    /// Default character style ID
    pub default_character: Option<String>,
    /// `w:docDefaults/w:rPrDefault`
    pub default_run_properties: RunProperties,
    /// `w:docDefaults/w:pPrDefault`
    pub default_paragraph_properties: ParagraphProperties,
}

/// A Word style definition
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Paragraph properties defined by the style
    pub paragraph_properties: Option<ParagraphProperties>,
    /// Run properties defined by the style
    pub run_properties: Option<RunProperties>,
}

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleType {
    /// Paragraph style
    Paragraph,
    /// Character (run) style
    Character,
    /// Table style
    Table,
    /// Numbering style
    Numbering,
}

impl StyleType {
    /// Map `w:style/@w:type`; missing or unknown values mean paragraph
    pub fn from_val(val: Option<&str>) -> Self {
        match val {
            Some("character") => Self::Character,
            Some("table") => Self::Table,
            Some("numbering") => Self::Numbering,
            _ => Self::Paragraph,
        }
    }
}

impl FromXml for StyleSheet {
    const TAG: &'static str = "styles";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let mut stylesheet = StyleSheet::default();

        if let Some(defaults) = element.child("docDefaults") {
            if let Some(r_pr) = defaults.find(&["rPrDefault", "rPr"]) {
                stylesheet.default_run_properties = RunProperties::from_xml(r_pr, ctx);
            }
            if let Some(p_pr) = defaults.find(&["pPrDefault", "pPr"]) {
                stylesheet.default_paragraph_properties = ParagraphProperties::from_xml(p_pr, ctx);
            }
        }

        for style_element in element.children_named("style") {
            let Some(id) = style_element.attr("styleId") else {
                continue;
            };
            let style_type = StyleType::from_val(style_element.attr("type"));
            let is_default = matches!(style_element.attr("default"), Some("1" | "true" | "on"));

            let style = Style {
                id: id.to_string(),
                name: style_element
                    .child("name")
                    .and_then(|e| e.val())
                    .unwrap_or(id)
                    .to_string(),
                style_type,
                based_on: style_element
                    .child("basedOn")
                    .and_then(|e| e.val())
                    .map(str::to_string),
                paragraph_properties: style_element
                    .child("pPr")
                    .map(|e| ParagraphProperties::from_xml(e, ctx)),
                run_properties: style_element
                    .child("rPr")
                    .map(|e| RunProperties::from_xml(e, ctx)),
            };

            if is_default {
                match style_type {
                    StyleType::Paragraph => stylesheet.default_paragraph = Some(style.id.clone()),
                    StyleType::Character => stylesheet.default_character = Some(style.id.clone()),
                    _ => {}
                }
            }
            stylesheet.insert(style);
        }

        stylesheet
    }
}

impl StyleSheet {
    /// Add or replace a style
    pub fn insert(&mut self, style: Style) {
        self.styles
            .entry(style.style_type)
            .or_default()
            .insert(style.id.clone(), style);
    }

    /// Get a style by type and ID
    pub fn get(&self, style_type: StyleType, id: &str) -> Option<&Style> {
        self.styles.get(&style_type).and_then(|by_id| by_id.get(id))
    }

    /// Get all styles of one type
    pub fn of_type(&self, style_type: StyleType) -> impl Iterator<Item = &Style> {
        self.styles.get(&style_type).into_iter().flat_map(|by_id| by_id.values())
    }

    /// Number of styles across all types
    pub fn len(&self) -> usize {
        self.styles.values().map(HashMap::len).sum()
    }

    /// True when no style is defined
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the inheritance chain of a style, most specific first
    ///
    /// Stops at a missing parent, a parent of another type, or the first
    /// repeated ID. An unknown `style_id` yields an empty chain.
    pub fn resolve_chain(&self, style_type: StyleType, style_id: &str) -> Vec<&Style> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(style_id);

        while let Some(id) = current {
            let Some(style) = self.get(style_type, id) else {
                break;
            };
            if !seen.insert(style.id.as_str()) {
                warn!(style = %style_id, repeated = %style.id, "style inheritance cycle");
                break;
            }
            chain.push(style);
            current = style.based_on.as_deref();
        }

        chain
    }

    /// Heading level (1-9) of a paragraph style, if it's a heading
    ///
    /// The first style in the chain named `heading N` or `title`, or carrying
    /// an outline level, decides. Style IDs of the form `HeadingN` are the
    /// fallback for documents with localized names.
    pub fn heading_level(&self, style_id: &str) -> Option<u8> {
        for style in self.resolve_chain(StyleType::Paragraph, style_id) {
            if let Some(level) = heading_level_from_name(&style.name) {
                return Some(level);
            }
            let outline = style
                .paragraph_properties
                .as_ref()
                .and_then(|p| p.outline_level);
            if let Some(level) = outline.filter(|l| *l < 9) {
                return Some(level + 1);
            }
        }
        heading_level_from_id(style_id)
    }
}

fn heading_level_from_name(name: &str) -> Option<u8> {
    let name = name.trim().to_ascii_lowercase();
    if name == "title" {
        return Some(1);
    }
    let level: u8 = name.strip_prefix("heading ")?.trim().parse().ok()?;
    (1..=9).contains(&level).then_some(level)
}

fn heading_level_from_id(id: &str) -> Option<u8> {
    let lower = id.to_ascii_lowercase();
    let level: u8 = lower.strip_prefix("heading")?.parse().ok()?;
    (1..=9).contains(&level).then_some(level)
}
