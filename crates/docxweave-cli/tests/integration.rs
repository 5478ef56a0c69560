//! Integration tests for the docxweave CLI
//!
//! Fixtures are written to a temporary directory and converted through the
//! same entry points the binary uses.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::Parser;
use tempfile::TempDir;

use docxweave_cli::{inspect_command, run, Cli};
use docxweave_ooxml::test_utils::{numbered_paragraph, numbering_definition, paragraph, DocxBuilder};

fn write_fixture(dir: &Path) -> PathBuf {
    let docx = DocxBuilder::new()
        .numbering(&numbering_definition(1, &["upperRoman", "decimal"]))
        .body(&format!(
            "{}{}{}",
            numbered_paragraph(1, 0, "Scope"),
            numbered_paragraph(1, 1, "Goals"),
            paragraph("Closing words")
        ))
        .build();
    let path = dir.join("report.docx");
    fs::write(&path, docx).unwrap();
    path
}

fn run_args(args: &[&str]) -> anyhow::Result<()> {
    run(Cli::try_parse_from(args).unwrap())
}

#[test]
fn test_convert_to_html_file() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());
    let output = dir.path().join("report.html");

    run_args(&[
        "docxweave",
        "convert",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<html><head><meta charset=\"utf-8\" /><style>"));
    assert!(html.contains(
        "<ol class=\"pydocx-list-style-type-upperRoman\"><li>Scope\
         <ol class=\"pydocx-list-style-type-decimal\"><li>Goals<br />Closing words</li></ol></li></ol>"
    ));
}

#[test]
fn test_convert_to_markdown_with_layer() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());
    let output = dir.path().join("report.md");

    run_args(&[
        "docxweave",
        "convert",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--format",
        "markdown",
        "--upper-roman-headings",
    ])
    .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "## Scope\n\n1. Goals\n   Closing words\n"
    );
}

#[test]
fn test_config_file_selects_format() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());
    let config = dir.path().join("settings.toml");
    fs::write(&config, "[output]\nformat = \"markdown\"\n").unwrap();
    let output = dir.path().join("out.txt");

    run_args(&[
        "docxweave",
        "convert",
        input.to_str().unwrap(),
        "-c",
        config.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();

    assert!(fs::read_to_string(&output).unwrap().starts_with("1. Scope\n"));
}

#[test]
fn test_inspect_outline() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());
    let outline = inspect_command(&input).unwrap();
    assert!(outline.starts_with("list num=1 level=0 format=upperRoman\n  item\n    paragraph \"Scope\"\n"));
    assert!(outline.contains("list num=1 level=1 format=decimal"));
    assert!(outline.contains("paragraph \"Closing words\""));
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.docx");
    let err = run_args(&["docxweave", "convert", missing.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("Failed to open DOCX file"));
}

#[test]
fn test_exit_status() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());
    let garbage = dir.path().join("garbage.docx");
    fs::write(&garbage, b"not a zip archive").unwrap();
    let binary = env!("CARGO_BIN_EXE_docxweave");

    let ok = Command::new(binary)
        .args(["convert", input.to_str().unwrap(), "-f", "markdown"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(ok.status.success());
    assert_eq!(String::from_utf8_lossy(&ok.stdout), "1. Scope\n   1. Goals\n      Closing words\n");

    let failed = Command::new(binary)
        .args(["convert", garbage.to_str().unwrap()])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!failed.status.success());
    assert!(String::from_utf8_lossy(&failed.stderr).contains("Failed to open DOCX file"));
}
