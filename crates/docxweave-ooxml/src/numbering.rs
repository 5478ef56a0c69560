//! Numbering definitions (word/numbering.xml)
//!
//! Paragraphs point at a `w:num` instance by `numId`; the instance points at
//! a `w:abstractNum` holding one `w:lvl` per indent level. An instance may
//! shadow individual levels with `w:lvlOverride`, which is consulted first.

use std::collections::{BTreeMap, HashMap};

use crate::model::{parse_int, FromXml, LoadContext, ParagraphProperties, RunProperties};
use crate::xml::XmlElement;

/// Numbering format of a level (`w:numFmt`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberFormat {
    Bullet,
    Decimal,
    DecimalZero,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    CardinalText,
    Ordinal,
    OrdinalText,
    None,
    /// Any other format, kept verbatim
    Other(String),
}

impl NumberFormat {
    /// Map a `w:numFmt/@w:val`
    pub fn from_val(val: &str) -> Self {
        match val {
            "bullet" => Self::Bullet,
            "decimal" => Self::Decimal,
            "decimalZero" => Self::DecimalZero,
            "lowerLetter" => Self::LowerLetter,
            "upperLetter" => Self::UpperLetter,
            "lowerRoman" => Self::LowerRoman,
            "upperRoman" => Self::UpperRoman,
            "cardinalText" => Self::CardinalText,
            "ordinal" => Self::Ordinal,
            "ordinalText" => Self::OrdinalText,
            "none" => Self::None,
            other => Self::Other(other.to_string()),
        }
    }

    /// The OOXML name of the format
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bullet => "bullet",
            Self::Decimal => "decimal",
            Self::DecimalZero => "decimalZero",
            Self::LowerLetter => "lowerLetter",
            Self::UpperLetter => "upperLetter",
            Self::LowerRoman => "lowerRoman",
            Self::UpperRoman => "upperRoman",
            Self::CardinalText => "cardinalText",
            Self::Ordinal => "ordinal",
            Self::OrdinalText => "ordinalText",
            Self::None => "none",
            Self::Other(other) => other,
        }
    }

    /// Unordered list formats
    pub fn is_bullet(&self) -> bool {
        matches!(self, Self::Bullet | Self::None)
    }
}

/// One level of a numbering definition (`w:lvl`)
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// `w:ilvl`
    pub level_id: u32,
    pub format: NumberFormat,
    /// `w:start`
    pub start: Option<u32>,
    /// `w:lvlRestart`
    pub restart: Option<u32>,
    /// `w:lvlText`, the label template
    pub text: Option<String>,
    pub paragraph_properties: Option<ParagraphProperties>,
    pub run_properties: Option<RunProperties>,
}

impl FromXml for Level {
    const TAG: &'static str = "lvl";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        Self {
            level_id: parse_int(element.attr("ilvl")).unwrap_or(0),
            format: element
                .child("numFmt")
                .and_then(|e| e.val())
                .map(NumberFormat::from_val)
                .unwrap_or(NumberFormat::Decimal),
            start: parse_int(element.child("start").and_then(|e| e.val())),
            restart: parse_int(element.child("lvlRestart").and_then(|e| e.val())),
            text: element
                .child("lvlText")
                .and_then(|e| e.val())
                .map(str::to_string),
            paragraph_properties: element
                .child("pPr")
                .map(|e| ParagraphProperties::from_xml(e, ctx)),
            run_properties: element
                .child("rPr")
                .map(|e| RunProperties::from_xml(e, ctx)),
        }
    }
}

/// A `w:abstractNum`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractNumbering {
    pub id: String,
    pub levels: BTreeMap<u32, Level>,
}

/// `w:lvlOverride` inside a `w:num`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelOverride {
    /// `w:startOverride`
    pub start_override: Option<u32>,
    /// A full replacement level
    pub level: Option<Level>,
}

/// A `w:num`, the thing paragraphs reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberingInstance {
    pub num_id: u32,
    pub abstract_id: String,
    pub level_overrides: BTreeMap<u32, LevelOverride>,
}

/// The numbering part
#[derive(Debug, Clone, Default)]
pub struct NumberingDefinitions {
    abstracts: HashMap<String, AbstractNumbering>,
    instances: HashMap<u32, NumberingInstance>,
}

impl FromXml for NumberingDefinitions {
    const TAG: &'static str = "numbering";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let mut definitions = Self::default();

        for abstract_element in element.children_named("abstractNum") {
            let Some(id) = abstract_element.attr("abstractNumId") else {
                continue;
            };
            let levels = abstract_element
                .children_named("lvl")
                .map(|lvl| Level::from_xml(lvl, ctx))
                .map(|level| (level.level_id, level))
                .collect();
            definitions.abstracts.insert(
                id.to_string(),
                AbstractNumbering {
                    id: id.to_string(),
                    levels,
                },
            );
        }

        for num in element.children_named("num") {
            let Some(num_id) = parse_int::<u32>(num.attr("numId")) else {
                continue;
            };
            let Some(abstract_id) = num.child("abstractNumId").and_then(|e| e.val()) else {
                continue;
            };
            let level_overrides = num
                .children_named("lvlOverride")
                .filter_map(|ov| {
                    let level_id = parse_int::<u32>(ov.attr("ilvl"))?;
                    Some((
                        level_id,
                        LevelOverride {
                            start_override: parse_int(
                                ov.child("startOverride").and_then(|e| e.val()),
                            ),
                            level: ov.child("lvl").map(|lvl| {
                                let mut level = Level::from_xml(lvl, ctx);
                                level.level_id = level_id;
                                level
                            }),
                        },
                    ))
                })
                .collect();
            definitions.instances.insert(
                num_id,
                NumberingInstance {
                    num_id,
                    abstract_id: abstract_id.to_string(),
                    level_overrides,
                },
            );
        }

        definitions
    }
}

impl NumberingDefinitions {
    /// The `w:num` with the given id
    pub fn instance(&self, num_id: u32) -> Option<&NumberingInstance> {
        self.instances.get(&num_id)
    }

    /// The abstract definition behind a `w:num`
    pub fn abstract_for(&self, num_id: u32) -> Option<&AbstractNumbering> {
        let instance = self.instance(num_id)?;
        self.abstracts.get(&instance.abstract_id)
    }

    /// Resolve a level, honouring instance overrides before the abstract level
    pub fn level(&self, num_id: u32, level_id: u32) -> Option<&Level> {
        let instance = self.instance(num_id)?;
        if let Some(level) = instance
            .level_overrides
            .get(&level_id)
            .and_then(|ov| ov.level.as_ref())
        {
            return Some(level);
        }
        self.abstracts
            .get(&instance.abstract_id)?
            .levels
            .get(&level_id)
    }

    /// True when the part defines nothing
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
