//! End-to-end loading tests: DOCX bytes to typed model and effective properties

use docxweave_ooxml::model::{BreakKind, Inline, RunContent, VMerge};
use docxweave_ooxml::test_utils::{
    heading_styles, numbered_paragraph, numbering_definition, paragraph, styled_paragraph,
    DocxBuilder,
};
use docxweave_ooxml::{Block, NumberFormat, RelationshipResolver, WordDocument};

fn load(builder: DocxBuilder) -> WordDocument {
    WordDocument::from_bytes(&builder.build()).expect("fixture should load")
}

fn paragraphs(doc: &WordDocument) -> Vec<&docxweave_ooxml::Paragraph> {
    doc.document
        .body
        .children()
        .iter()
        .filter_map(Block::as_paragraph)
        .collect()
}

#[test]
fn test_inherited_bold_turned_off_locally() {
    let doc = load(
        DocxBuilder::new()
            .styles(
                r#"<w:style w:type="paragraph" w:styleId="Strong"><w:name w:val="Strong Para"/><w:rPr><w:b/></w:rPr></w:style>"#,
            )
            .body(
                r#"<w:p><w:pPr><w:pStyle w:val="Strong"/></w:pPr>
                    <w:r><w:rPr><w:b w:val="off"/></w:rPr><w:t>plain</w:t></w:r>
                    <w:r><w:t>bold</w:t></w:r></w:p>"#,
            ),
    );

    let p = paragraphs(&doc)[0];
    let style = p.style_id(&doc.styles);
    assert_eq!(style, Some("Strong"));
    let runs = p.runs();
    assert!(!runs[0].effective_properties(&doc.styles, style).is_bold());
    assert!(runs[1].effective_properties(&doc.styles, style).is_bold());
}

#[test]
fn test_effective_properties_are_memoized() {
    let doc = load(DocxBuilder::new().styles(&heading_styles()).body(&styled_paragraph("Heading2", "x")));
    let p = paragraphs(&doc)[0];
    let first = p.effective_properties(&doc.styles) as *const _;
    let second = p.effective_properties(&doc.styles) as *const _;
    assert_eq!(first, second);
    assert_eq!(p.heading_level(&doc.styles), Some(2));
}

#[test]
fn test_numbering_lookup_from_paragraph() {
    let doc = load(
        DocxBuilder::new()
            .numbering(&numbering_definition(1, &["lowerLetter", "bullet"]))
            .body(&format!(
                "{}{}{}",
                numbered_paragraph(1, 1, "nested"),
                numbered_paragraph(0, 0, "removed"),
                numbered_paragraph(5, 0, "unknown")
            )),
    );
    let ps = paragraphs(&doc);

    let level = ps[0].get_numbering_level(&doc.styles, &doc.numbering).unwrap();
    assert_eq!(level.format, NumberFormat::Bullet);
    assert_eq!(level.level_id, 1);
    assert!(ps[0]
        .get_numbering_definition(&doc.styles, &doc.numbering)
        .is_some());

    assert!(ps[1].get_numbering_level(&doc.styles, &doc.numbering).is_none());
    assert!(ps[2].get_numbering_level(&doc.styles, &doc.numbering).is_none());
}

#[test]
fn test_numbering_inherited_from_paragraph_style() {
    let doc = load(
        DocxBuilder::new()
            .styles(
                r#"<w:style w:type="paragraph" w:styleId="ListPara"><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr></w:style>"#,
            )
            .numbering(&numbering_definition(1, &["decimal"]))
            .body(&styled_paragraph("ListPara", "item")),
    );
    let p = paragraphs(&doc)[0];
    let level = p.get_numbering_level(&doc.styles, &doc.numbering).unwrap();
    assert_eq!(level.format, NumberFormat::Decimal);
}

#[test]
fn test_hyperlink_resolution() {
    let doc = load(
        DocxBuilder::new()
            .hyperlink("rId9", "https://example.com/")
            .body(
                r#"<w:p><w:hyperlink r:id="rId9"><w:r><w:t>ok</w:t></w:r></w:hyperlink><w:hyperlink r:id="rId404"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>"#,
            ),
    );
    let p = paragraphs(&doc)[0];
    let ids: Vec<Option<&str>> = p
        .children
        .iter()
        .map(|child| match child {
            Inline::Hyperlink(h) => h.rel_id.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![Some("rId9"), Some("rId404")]);

    let resolved = doc.relationships.get_relationship("rId9").unwrap();
    assert!(resolved.is_external);
    assert_eq!(resolved.target_uri, "https://example.com/");
    assert!(doc.relationships.get_relationship("rId404").is_none());
}

#[test]
fn test_tables_and_text_boxes() {
    let doc = load(DocxBuilder::new().body(
        r#"<w:tbl>
            <w:tr><w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr>
            <w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr>
        </w:tbl>
        <w:p><w:r><w:pict><v:shape><v:textbox><w:txbxContent><w:p><w:r><w:t>inside</w:t></w:r></w:p></w:txbxContent></v:textbox></v:shape></w:pict></w:r></w:p>"#,
    ));

    let children = doc.document.body.children();
    let Block::Table(table) = &children[0] else {
        panic!("expected a table");
    };
    assert_eq!(table.rows[1].cells[0].v_merge, Some(VMerge::Continue));
    assert_eq!(table.row_span(0, 0), 2);

    let Block::Paragraph(p) = &children[1] else {
        panic!("expected a paragraph");
    };
    let run = p.runs()[0];
    match &run.content[0] {
        RunContent::Picture(picture) => {
            assert_eq!(picture.text_box.as_ref().unwrap().children.len(), 1);
        }
        other => panic!("expected a picture, got {other:?}"),
    }
}

#[test]
fn test_page_break_and_missing_main_part() {
    let docx = DocxBuilder::new().without_main_part().build();
    assert!(WordDocument::from_bytes(&docx).is_err());

    let doc = load(DocxBuilder::new().body(&format!(
        "{}<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>",
        paragraph("before")
    )));
    let ps = paragraphs(&doc);
    assert_eq!(ps.len(), 2);
    assert_eq!(ps[1].runs()[0].content, vec![RunContent::Break(BreakKind::Page)]);
}
