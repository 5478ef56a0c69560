//! A loaded Word package
//!
//! [`WordDocument`] reads every part it needs up front: the main document,
//! its relationships, and the optional styles, numbering, footnotes and font
//! table parts. Nothing downstream touches the archive except to fetch media
//! bytes by URI.

use std::path::Path;

use tracing::{debug, warn};

use crate::archive::{OoxmlArchive, PartContainer};
use crate::error::Result;
use crate::fonts::FontTable;
use crate::footnotes::Footnotes;
use crate::model::{load_strict, Document, FromXml, LoadContext};
use crate::numbering::NumberingDefinitions;
use crate::relationships::{rels_path_for, Relationships};
use crate::styles::StyleSheet;
use crate::xml::XmlElement;

/// Conventional location of the main document part
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Everything the exporters need from a `.docx`
#[derive(Debug)]
pub struct WordDocument {
    archive: OoxmlArchive,
    /// URI of the main document part
    pub main_part: String,
    /// Typed main document
    pub document: Document,
    /// Relationships of the main document part
    pub relationships: Relationships,
    pub styles: StyleSheet,
    pub numbering: NumberingDefinitions,
    pub footnotes: Footnotes,
    /// Relationships of the footnotes part (links and images inside notes)
    pub footnote_relationships: Relationships,
    pub fonts: FontTable,
}

impl WordDocument {
    /// Open and load a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load a DOCX held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(bytes)?)
    }

    /// Load from an unpacked archive
    ///
    /// Fails only when the main document part is missing, unparseable, or
    /// not rooted at `w:document`. Problems with optional parts are logged
    /// and the part is treated as empty.
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let main_part = locate_main_part(&archive);
        let mut ctx = LoadContext::new();

        let root = XmlElement::parse(archive.require_part(&main_part)?)?;
        let document = load_strict::<Document>(&root, &mut ctx)?;

        let relationships = load_relationships(&archive, &main_part);

        let styles_uri = optional_part_uri(&relationships, Relationships::TYPE_STYLES, "styles.xml");
        let numbering_uri =
            optional_part_uri(&relationships, Relationships::TYPE_NUMBERING, "numbering.xml");
        let footnotes_uri =
            optional_part_uri(&relationships, Relationships::TYPE_FOOTNOTES, "footnotes.xml");
        let fonts_uri =
            optional_part_uri(&relationships, Relationships::TYPE_FONT_TABLE, "fontTable.xml");

        let styles: StyleSheet = load_optional(&archive, &styles_uri, &mut ctx);
        let numbering: NumberingDefinitions = load_optional(&archive, &numbering_uri, &mut ctx);
        let footnotes: Footnotes = load_optional(&archive, &footnotes_uri, &mut ctx);
        let fonts: FontTable = load_optional(&archive, &fonts_uri, &mut ctx);
        let footnote_relationships = load_relationships(&archive, &footnotes_uri);

        debug!(
            main_part = %main_part,
            blocks = document.body.children().len(),
            styles = styles.len(),
            footnotes = footnotes.len(),
            "loaded package"
        );

        Ok(Self {
            archive,
            main_part,
            document,
            relationships,
            styles,
            numbering,
            footnotes,
            footnote_relationships,
            fonts,
        })
    }

    /// The underlying archive
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }
}

impl PartContainer for WordDocument {
    fn get_part(&self, uri: &str) -> Option<&[u8]> {
        self.archive.get_part(uri)
    }
}

fn locate_main_part(archive: &OoxmlArchive) -> String {
    archive
        .get_part(&rels_path_for(""))
        .and_then(|xml| match Relationships::parse(xml, "") {
            Ok(rels) => Some(rels),
            Err(e) => {
                warn!(error = %e, "unreadable package relationships");
                None
            }
        })
        .and_then(|rels| {
            rels.find_by_type(Relationships::TYPE_OFFICE_DOCUMENT)
                .map(|rel| rel.target_uri.clone())
        })
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string())
}

fn load_relationships(archive: &OoxmlArchive, part: &str) -> Relationships {
    let rels_path = rels_path_for(part);
    match archive.get_part(&rels_path) {
        None => Relationships::new(),
        Some(xml) => Relationships::parse(xml, part).unwrap_or_else(|e| {
            warn!(part = %rels_path, error = %e, "unreadable relationships, ignoring");
            Relationships::new()
        }),
    }
}

fn optional_part_uri(relationships: &Relationships, rel_type: &str, fallback: &str) -> String {
    relationships
        .find_by_type(rel_type)
        .filter(|rel| !rel.is_external)
        .map(|rel| rel.target_uri.clone())
        .unwrap_or_else(|| format!("word/{}", fallback))
}

fn load_optional<T: FromXml + Default>(
    archive: &OoxmlArchive,
    uri: &str,
    ctx: &mut LoadContext,
) -> T {
    let Some(bytes) = archive.get_part(uri) else {
        debug!(part = uri, "optional part missing");
        return T::default();
    };
    let loaded = XmlElement::parse(bytes).and_then(|root| load_strict::<T>(&root, ctx));
    match loaded {
        Ok(part) => part,
        Err(e) => {
            warn!(part = uri, error = %e, "unreadable optional part, ignoring");
            T::default()
        }
    }
}
