//! Footnotes part (word/footnotes.xml)

use std::collections::HashMap;

use crate::model::document::load_blocks;
use crate::model::{Block, FromXml, LoadContext};
use crate::xml::XmlElement;

/// A single `w:footnote`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Footnote {
    pub id: String,
    pub children: Vec<Block>,
}

/// All real footnotes of a document, keyed by id
///
/// Separator and continuation notes are layout furniture and are skipped.
#[derive(Debug, Clone, Default)]
pub struct Footnotes {
    notes: HashMap<String, Footnote>,
}

impl FromXml for Footnotes {
    const TAG: &'static str = "footnotes";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let notes = element
            .children_named("footnote")
            .filter(|note| {
                !matches!(
                    note.attr("type"),
                    Some("separator" | "continuationSeparator" | "continuationNotice")
                )
            })
            .filter_map(|note| {
                let id = note.attr("id")?.to_string();
                Some((
                    id.clone(),
                    Footnote {
                        id,
                        children: load_blocks(note, ctx),
                    },
                ))
            })
            .collect();
        Self { notes }
    }
}

impl Footnotes {
    /// Look up a footnote by id
    pub fn get(&self, id: &str) -> Option<&Footnote> {
        self.notes.get(id)
    }

    /// Number of real footnotes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True when there are no real footnotes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_separators() {
        let xml = br#"<w:footnotes xmlns:w="w">
            <w:footnote w:type="separator" w:id="-1"><w:p/></w:footnote>
            <w:footnote w:type="continuationSeparator" w:id="0"><w:p/></w:footnote>
            <w:footnote w:id="1"><w:p><w:r><w:t>First</w:t></w:r></w:p></w:footnote>
            <w:footnote w:id="2"><w:p/><w:p/></w:footnote>
        </w:footnotes>"#;
        let element = XmlElement::parse(xml).unwrap();
        let footnotes = Footnotes::from_xml(&element, &mut LoadContext::new());

        assert_eq!(footnotes.len(), 2);
        assert!(footnotes.get("-1").is_none());
        assert!(footnotes.get("0").is_none());
        assert_eq!(footnotes.get("2").unwrap().children.len(), 2);
    }
}
