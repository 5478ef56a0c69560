//! Font table (word/fontTable.xml)

use std::collections::HashMap;

use crate::model::{FromXml, LoadContext};
use crate::xml::XmlElement;

/// A `w:font` entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Font {
    pub name: String,
    /// `w:pitch` (`fixed`, `variable`, `default`)
    pub pitch: Option<String>,
    /// `w:family` (`modern`, `roman`, `swiss`, ...)
    pub family: Option<String>,
}

/// Fonts declared by the document, keyed by name
#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: HashMap<String, Font>,
}

impl FromXml for FontTable {
    const TAG: &'static str = "fonts";

    fn from_xml(element: &XmlElement, _ctx: &mut LoadContext) -> Self {
        let fonts = element
            .children_named("font")
            .filter_map(|font| {
                let name = font.attr("name")?.to_string();
                Some((
                    name.clone(),
                    Font {
                        name,
                        pitch: font.child("pitch").and_then(|e| e.val()).map(str::to_string),
                        family: font.child("family").and_then(|e| e.val()).map(str::to_string),
                    },
                ))
            })
            .collect();
        Self { fonts }
    }
}

impl FontTable {
    /// Look up a font by name
    pub fn get(&self, name: &str) -> Option<&Font> {
        self.fonts.get(name)
    }

    /// Whether text in `name` should be treated as code
    ///
    /// A fixed pitch in the font table decides; otherwise well-known
    /// monospace family names are recognised.
    pub fn is_monospace(&self, name: &str) -> bool {
        if let Some(font) = self.get(name) {
            if font.pitch.as_deref() == Some("fixed") {
                return true;
            }
        }
        is_monospace_name(name)
    }
}

fn is_monospace_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("mono")
        || lower.contains("courier")
        || lower.contains("consolas")
        || lower.contains("menlo")
        || lower.contains("source code")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FontTable {
        let xml = br#"<w:fonts xmlns:w="w">
            <w:font w:name="Calibri"><w:family w:val="swiss"/><w:pitch w:val="variable"/></w:font>
            <w:font w:name="Fixedsys"><w:family w:val="modern"/><w:pitch w:val="fixed"/></w:font>
        </w:fonts>"#;
        let element = XmlElement::parse(xml).unwrap();
        FontTable::from_xml(&element, &mut LoadContext::new())
    }

    #[test]
    fn test_fixed_pitch_is_monospace() {
        let fonts = table();
        assert!(fonts.is_monospace("Fixedsys"));
        assert!(!fonts.is_monospace("Calibri"));
        assert_eq!(fonts.get("Calibri").unwrap().family.as_deref(), Some("swiss"));
    }

    #[test]
    fn test_monospace_name_variants() {
        let fonts = FontTable::default();
        assert!(fonts.is_monospace("Courier New"));
        assert!(fonts.is_monospace("DejaVu Sans Mono"));
        assert!(fonts.is_monospace("Consolas"));
        assert!(fonts.is_monospace("Source Code Pro"));
        assert!(!fonts.is_monospace("Times New Roman"));
    }
}
