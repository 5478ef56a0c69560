//! Relationship parsing for OOXML packages
//!
//! OOXML uses relationship files (`_rels/*.rels`) to map IDs to targets.
//! Hyperlinks, images, and the optional document parts (styles, numbering,
//! footnotes, font table) are all reached through them.
//!
//! # Example
//!
//! ```ignore
//! use docxweave_ooxml::relationships::{RelationshipResolver, Relationships};
//!
//! let rels = Relationships::parse(xml_bytes, "word/document.xml")?;
//! let image = rels.get_relationship("rId4").unwrap();
//! assert_eq!(image.target_uri, "word/media/image1.png");
//! ```

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// Common relationship type URIs
impl Relationships {
    /// Main document part, referenced from the package root
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Hyperlink relationship type
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Styles relationship type
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    /// Numbering relationship type
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    /// Font table relationship type
    pub const TYPE_FONT_TABLE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/fontTable";
    /// Footnotes relationship type
    pub const TYPE_FOOTNOTES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
}

/// A single resolved relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Package URI for internal targets, the verbatim target for external ones
    pub target_uri: String,
    /// True when `TargetMode="External"`
    pub is_external: bool,
    /// The relationship type URI
    pub rel_type: String,
}

/// Lookup of relationships by ID
///
/// Implemented by the relationship table of each part so the typed model
/// never needs to know where the table came from.
pub trait RelationshipResolver {
    /// Resolve a relationship ID, `None` when the ID is unknown
    fn get_relationship(&self, id: &str) -> Option<&Relationship>;
}

/// Parsed relationships of one part
///
/// Keeps insertion order so iteration follows the `.rels` file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Relationship IDs in document order
    order: Vec<String>,
    /// Map of relationship ID to resolved target
    map: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create an empty relationships table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    ///
    /// `source_part` is the part that owns the `.rels` file. Internal targets
    /// are resolved against its directory; pass `""` for the package root.
    pub fn parse(xml: &[u8], source_part: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let base_dir = part_directory(source_part);
        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut target_mode = None;

                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = attr.unescape_value()?.to_string();
                            match attr.key.as_ref() {
                                b"Id" => id = Some(value),
                                b"Target" => target = Some(value),
                                b"Type" => rel_type = Some(value),
                                b"TargetMode" => target_mode = Some(value),
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            let is_external = target_mode
                                .as_deref()
                                .is_some_and(|m| m.eq_ignore_ascii_case("External"));
                            let target_uri = if is_external {
                                target
                            } else {
                                resolve_target(base_dir, &target)
                            };
                            rels.insert(
                                id,
                                Relationship {
                                    target_uri,
                                    is_external,
                                    rel_type: rel_type.unwrap_or_default(),
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    fn insert(&mut self, id: String, rel: Relationship) {
        if self.map.insert(id.clone(), rel).is_none() {
            self.order.push(id);
        }
    }

    /// Get the resolved target for a relationship ID
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target_uri.as_str())
    }

    /// First relationship of the given type, in file order
    pub fn find_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.iter()
            .map(|(_, rel)| rel)
            .find(|rel| rel.rel_type == rel_type)
    }

    /// Check if a relationship ID exists
    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    /// Get the number of relationships
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over relationships in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }
}

impl RelationshipResolver for Relationships {
    fn get_relationship(&self, id: &str) -> Option<&Relationship> {
        self.map.get(id)
    }
}

/// Location of the `.rels` file belonging to `part`
///
/// `word/document.xml` maps to `word/_rels/document.xml.rels`, the package
/// root (`""`) maps to `_rels/.rels`.
pub fn rels_path_for(part: &str) -> String {
    let part = part.trim_start_matches('/');
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{}/_rels/{}.rels", dir, name),
        None => format!("_rels/{}.rels", part),
    }
}

fn part_directory(part: &str) -> &str {
    let part = part.trim_start_matches('/');
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve an internal target against the source part's directory
///
/// A leading `/` makes the target package-absolute; `.` and `..` segments
/// are collapsed.
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if base_dir.is_empty() {
        target.to_string()
    } else {
        format!("{}/{}", base_dir, target)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
