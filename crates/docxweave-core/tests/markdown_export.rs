//! Markdown export of complete packages

use docxweave_core::{convert_bytes, outline, to_markdown, OutputFormat, Settings};
use docxweave_ooxml::test_utils::{
    heading_styles, numbered_paragraph, numbering_definition, paragraph, styled_paragraph,
    DocxBuilder,
};
use docxweave_ooxml::WordDocument;

fn markdown(builder: DocxBuilder) -> String {
    let doc = WordDocument::from_bytes(&builder.build()).unwrap();
    to_markdown(&doc)
}

#[test]
fn test_headings_and_paragraphs() {
    let md = markdown(
        DocxBuilder::new()
            .styles(&heading_styles())
            .body(&format!(
                "{}{}{}",
                styled_paragraph("Heading1", "Title"),
                paragraph("First"),
                styled_paragraph("Heading3", "Detail")
            )),
    );
    assert_eq!(md, "# Title\n\nFirst\n\n### Detail\n");
}

#[test]
fn test_ordered_list_with_continuation() {
    let md = markdown(
        DocxBuilder::new()
            .numbering(&numbering_definition(1, &["decimal"]))
            .body(&format!(
                "{}{}{}",
                numbered_paragraph(1, 0, "AAA"),
                paragraph("bare paragraph"),
                numbered_paragraph(1, 0, "BBB")
            )),
    );
    assert_eq!(md, "1. AAA\n   bare paragraph\n1. BBB\n");
}

#[test]
fn test_nested_bullets_are_indented() {
    let md = markdown(
        DocxBuilder::new()
            .numbering(&numbering_definition(1, &["decimal", "bullet"]))
            .body(&format!(
                "{}{}{}{}{}",
                numbered_paragraph(1, 0, "one"),
                numbered_paragraph(1, 1, "one.a"),
                numbered_paragraph(1, 1, "one.b"),
                numbered_paragraph(1, 0, "two"),
                paragraph("")
            )),
    );
    assert_eq!(md, "1. one\n   - one.a\n   - one.b\n1. two\n");
}

#[test]
fn test_inline_formatting() {
    let md = markdown(
        DocxBuilder::new()
            .font_table(r#"<w:font w:name="Courier New"><w:pitch w:val="fixed"/></w:font>"#)
            .body(concat!(
                r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r>"#,
                r#"<w:r><w:t xml:space="preserve">, </w:t></w:r>"#,
                r#"<w:r><w:rPr><w:i/></w:rPr><w:t>italic</w:t></w:r>"#,
                r#"<w:r><w:t xml:space="preserve"> and </w:t></w:r>"#,
                r#"<w:r><w:rPr><w:rFonts w:ascii="Courier New"/></w:rPr><w:t>code()</w:t></w:r></w:p>"#,
            )),
    );
    assert_eq!(md, "**bold**, *italic* and `code()`\n");
}

#[test]
fn test_links_and_deletions() {
    let md = markdown(
        DocxBuilder::new()
            .hyperlink("rId3", "https://example.com")
            .body(concat!(
                r#"<w:p><w:hyperlink r:id="rId3"><w:r><w:t>site</w:t></w:r></w:hyperlink>"#,
                r#"<w:del><w:r><w:delText>gone</w:delText></w:r></w:del>"#,
                r#"<w:ins><w:r><w:t xml:space="preserve"> kept</w:t></w:r></w:ins></w:p>"#,
            )),
    );
    assert_eq!(md, "[site](https://example.com) kept\n");
}

#[test]
fn test_pipe_table() {
    let md = markdown(DocxBuilder::new().body(concat!(
        r#"<w:tbl>"#,
        r#"<w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Value</w:t></w:r></w:p></w:tc></w:tr>"#,
        r#"<w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>1</w:t></w:r></w:p></w:tc></w:tr>"#,
        r#"</w:tbl>"#,
    )));
    assert_eq!(md, "| Name | Value |\n| --- | --- |\n| a | 1 |\n");
}

#[test]
fn test_footnotes_follow_body() {
    let md = markdown(
        DocxBuilder::new()
            .footnotes(concat!(
                r#"<w:footnote w:id="1"><w:p><w:r><w:footnoteRef/></w:r><w:r><w:t xml:space="preserve"> Early</w:t></w:r></w:p></w:footnote>"#,
                r#"<w:footnote w:id="2"><w:p><w:r><w:footnoteRef/></w:r><w:r><w:t xml:space="preserve"> Late</w:t></w:r></w:p></w:footnote>"#,
            ))
            .body(concat!(
                r#"<w:p><w:r><w:t>One</w:t></w:r><w:r><w:footnoteReference w:id="2"/></w:r></w:p>"#,
                r#"<w:p><w:r><w:t>Two</w:t></w:r><w:r><w:footnoteReference w:id="1"/></w:r></w:p>"#,
            )),
    );
    assert_eq!(md, "One[^1]\n\nTwo[^2]\n\n[^1]: Late\n[^2]: Early\n");
}

#[test]
fn test_citation_in_deletion_is_not_numbered() {
    let md = markdown(
        DocxBuilder::new()
            .footnotes(concat!(
                r#"<w:footnote w:id="1"><w:p><w:r><w:t>Removed</w:t></w:r></w:p></w:footnote>"#,
                r#"<w:footnote w:id="2"><w:p><w:r><w:t>Kept</w:t></w:r></w:p></w:footnote>"#,
            ))
            .body(concat!(
                r#"<w:p><w:del><w:r><w:delText>old</w:delText></w:r><w:r><w:footnoteReference w:id="1"/></w:r></w:del>"#,
                r#"<w:r><w:t>new</w:t></w:r><w:r><w:footnoteReference w:id="2"/></w:r></w:p>"#,
            )),
    );
    assert_eq!(md, "new[^1]\n\n[^1]: Kept\n");
}

#[test]
fn test_format_from_settings() {
    let docx = DocxBuilder::new()
        .numbering(&numbering_definition(1, &["upperRoman"]))
        .body(&format!(
            "{}{}",
            numbered_paragraph(1, 0, "Scope"),
            paragraph("details")
        ))
        .build();
    let settings = Settings::from_toml_str(
        "[output]\nformat = \"markdown\"\n\n[layers]\nupper_roman_headings = true\n",
    )
    .unwrap();
    assert_eq!(settings.output.format, OutputFormat::Markdown);
    assert_eq!(convert_bytes(&docx, &settings).unwrap(), "## Scope\n\ndetails\n");
}

#[test]
fn test_outline_of_body() {
    let docx = DocxBuilder::new()
        .numbering(&numbering_definition(4, &["bullet", "lowerRoman"]))
        .body(&format!(
            "{}{}{}",
            paragraph("intro"),
            numbered_paragraph(4, 0, "first"),
            numbered_paragraph(4, 1, "sub")
        ))
        .build();
    let doc = WordDocument::from_bytes(&docx).unwrap();
    assert_eq!(
        outline(&doc),
        "paragraph \"intro\"\n\
         list num=4 level=0 format=bullet\n\
         \x20 item\n\
         \x20   paragraph \"first\"\n\
         \x20   list num=4 level=1 format=lowerRoman\n\
         \x20     item\n\
         \x20       paragraph \"sub\"\n"
    );
}
