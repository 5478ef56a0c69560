//! Shared test utilities for docxweave-ooxml
//!
//! Fixtures are built in memory with [`DocxBuilder`], which writes a real
//! ZIP package with content types, package relationships and whichever
//! optional parts a test asks for.
//!
//! # Example
//! ```ignore
//! use docxweave_ooxml::test_utils::{paragraph, DocxBuilder};
//! let docx = DocxBuilder::new().body(&paragraph("Hello")).build();
//! ```

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::relationships::Relationships;

/// Namespace declarations used by every fixture part
pub const NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" "#,
    r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" "#,
    r#"xmlns:v="urn:schemas-microsoft-com:vml" "#,
    r#"xmlns:o="urn:schemas-microsoft-com:office:office""#,
);

struct FixtureRelationship {
    id: String,
    rel_type: String,
    target: String,
    external: bool,
}

/// Builder for in-memory DOCX packages
#[derive(Default)]
pub struct DocxBuilder {
    document: Option<String>,
    styles: Option<String>,
    numbering: Option<String>,
    footnotes: Option<String>,
    font_table: Option<String>,
    relationships: Vec<FixtureRelationship>,
    parts: Vec<(String, Vec<u8>)>,
    omit_main_part: bool,
}

impl DocxBuilder {
    /// Start an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `xml` as the content of `<w:body>`
    pub fn body(mut self, xml: &str) -> Self {
        self.document = Some(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {}><w:body>{}</w:body></w:document>"#,
            NAMESPACES, xml
        ));
        self
    }

    /// Use `xml` verbatim as `word/document.xml`
    pub fn document_xml(mut self, xml: &str) -> Self {
        self.document = Some(xml.to_string());
        self
    }

    /// Leave out `word/document.xml` entirely
    pub fn without_main_part(mut self) -> Self {
        self.omit_main_part = true;
        self
    }

    /// Add `word/styles.xml` wrapping `xml` in `<w:styles>`
    pub fn styles(mut self, xml: &str) -> Self {
        self.styles = Some(wrap_part("styles", xml));
        self
    }

    /// Add `word/numbering.xml` wrapping `xml` in `<w:numbering>`
    pub fn numbering(mut self, xml: &str) -> Self {
        self.numbering = Some(wrap_part("numbering", xml));
        self
    }

    /// Add `word/footnotes.xml` wrapping `xml` in `<w:footnotes>`
    pub fn footnotes(mut self, xml: &str) -> Self {
        self.footnotes = Some(wrap_part("footnotes", xml));
        self
    }

    /// Add `word/fontTable.xml` wrapping `xml` in `<w:fonts>`
    pub fn font_table(mut self, xml: &str) -> Self {
        self.font_table = Some(wrap_part("fonts", xml));
        self
    }

    /// Add a relationship to the main document part
    pub fn relationship(mut self, id: &str, rel_type: &str, target: &str, external: bool) -> Self {
        self.relationships.push(FixtureRelationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external,
        });
        self
    }

    /// Add an external hyperlink relationship
    pub fn hyperlink(self, id: &str, url: &str) -> Self {
        self.relationship(id, Relationships::TYPE_HYPERLINK, url, true)
    }

    /// Add an image relationship and its media part (`target` is relative to `word/`)
    pub fn image(self, id: &str, target: &str, bytes: Vec<u8>) -> Self {
        let path = format!("word/{}", target);
        self.relationship(id, Relationships::TYPE_IMAGE, target, false)
            .media(&path, bytes)
    }

    /// Add an arbitrary part at a package path
    pub fn media(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.parts.push((path.to_string(), bytes));
        self
    }

    /// Write the package and return the ZIP bytes
    pub fn build(self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let put = |zip: &mut ZipWriter<&mut Cursor<Vec<u8>>>, path: &str, bytes: &[u8]| {
            zip.start_file(path, options).unwrap();
            zip.write_all(bytes).unwrap();
        };

        put(
            &mut zip,
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
        );

        put(
            &mut zip,
            "_rels/.rels",
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        );

        let mut rels = self.relationships;
        let optional = [
            ("styles.xml", Relationships::TYPE_STYLES, &self.styles),
            ("numbering.xml", Relationships::TYPE_NUMBERING, &self.numbering),
            ("footnotes.xml", Relationships::TYPE_FOOTNOTES, &self.footnotes),
            ("fontTable.xml", Relationships::TYPE_FONT_TABLE, &self.font_table),
        ];
        for (name, rel_type, content) in optional {
            if let Some(content) = content {
                rels.push(FixtureRelationship {
                    id: format!("rIdPart{}", rels.len() + 1),
                    rel_type: rel_type.to_string(),
                    target: name.to_string(),
                    external: false,
                });
                put(&mut zip, &format!("word/{}", name), content.as_bytes());
            }
        }

        let mut rels_xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &rels {
            rels_xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                rel.id,
                rel.rel_type,
                rel.target.replace('&', "&amp;").replace('"', "&quot;"),
                if rel.external {
                    r#" TargetMode="External""#
                } else {
                    ""
                }
            ));
        }
        rels_xml.push_str("</Relationships>");
        put(&mut zip, "word/_rels/document.xml.rels", rels_xml.as_bytes());

        if !self.omit_main_part {
            let document = self.document.unwrap_or_else(|| {
                format!(r#"<w:document {}><w:body/></w:document>"#, NAMESPACES)
            });
            put(&mut zip, "word/document.xml", document.as_bytes());
        }

        for (path, bytes) in &self.parts {
            put(&mut zip, path, bytes);
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }
}

fn wrap_part(root: &str, xml: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:{root} {ns}>{xml}</w:{root}>"#,
        root = root,
        ns = NAMESPACES,
        xml = xml
    )
}

/// A plain paragraph with a single run of text
pub fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
}

/// A paragraph carrying direct numbering properties
pub fn numbered_paragraph(num_id: u32, ilvl: u32, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        ilvl, num_id, text
    )
}

/// A paragraph with a paragraph style reference
pub fn styled_paragraph(style_id: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        style_id, text
    )
}

/// An abstract numbering definition plus a `w:num` pointing at it
///
/// Both use `num_id` as their identifier; `formats[i]` is the format of level `i`.
pub fn numbering_definition(num_id: u32, formats: &[&str]) -> String {
    let mut xml = format!(r#"<w:abstractNum w:abstractNumId="{}">"#, num_id);
    for (level, format) in formats.iter().enumerate() {
        xml.push_str(&format!(
            r#"<w:lvl w:ilvl="{}"><w:start w:val="1"/><w:numFmt w:val="{}"/></w:lvl>"#,
            level, format
        ));
    }
    xml.push_str("</w:abstractNum>");
    xml.push_str(&format!(
        r#"<w:num w:numId="{id}"><w:abstractNumId w:val="{id}"/></w:num>"#,
        id = num_id
    ));
    xml
}

/// Heading styles `Heading1`..`Heading3` plus `Title`
pub fn heading_styles() -> String {
    let mut xml = String::new();
    for level in 1..=3 {
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/></w:style>"#,
            level = level
        ));
    }
    xml.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
    );
    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>"#);
    xml
}
