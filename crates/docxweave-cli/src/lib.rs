//! docxweave CLI - Command-line interface library
//!
//! # Binary Usage
//!
//! ```bash
//! # HTML to stdout
//! docxweave convert report.docx
//!
//! # Markdown file, upper-roman lists as sections
//! docxweave convert report.docx -f markdown -o report.md --upper-roman-headings
//!
//! # Show how numbered paragraphs were grouped into lists
//! docxweave inspect report.docx
//! ```

pub mod app;

pub use app::{
    convert_command, effective_settings, inspect_command, load_settings, run, run_cli, Cli,
    Commands, ConvertArgs, FormatArg, DEFAULT_CONFIG_FILE,
};
