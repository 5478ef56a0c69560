//! Conversion settings
//!
//! Loaded from TOML; every table and key is optional.
//!
//! ```toml
//! [output]
//! format = "markdown"
//!
//! [html]
//! embed_images = false
//!
//! [layers]
//! upper_roman_headings = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Target format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Markdown,
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub output: OutputSettings,
    pub html: HtmlSettings,
    pub layers: LayerSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

/// `[html]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSettings {
    /// Emit the `<style>` block with the utility classes
    pub include_stylesheet: bool,
    /// Inline images as `data:` URIs instead of linking package paths
    pub embed_images: bool,
    /// Constrain the body to the section page width
    pub page_width: bool,
}

impl Default for HtmlSettings {
    fn default() -> Self {
        Self {
            include_stylesheet: true,
            embed_images: true,
            page_width: true,
        }
    }
}

/// `[layers]`: optional export behaviors, off unless enabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LayerSettings {
    /// Render top-level upper-roman lists as level-2 headings
    pub upper_roman_headings: bool,
    /// Detect superscript/subscript faked with a smaller raised or lowered font
    pub faked_vertical_align: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output.format, OutputFormat::Html);
        assert!(settings.html.include_stylesheet);
        assert!(settings.html.embed_images);
        assert!(!settings.layers.upper_roman_headings);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
[output]
format = "markdown"

[html]
embed_images = false

[layers]
faked_vertical_align = true
"#;
        let settings = Settings::from_toml_str(toml).unwrap();
        assert_eq!(settings.output.format, OutputFormat::Markdown);
        assert!(!settings.html.embed_images);
        assert!(settings.html.page_width);
        assert!(settings.layers.faked_vertical_align);
        assert!(!settings.layers.upper_roman_headings);
    }

    #[test]
    fn test_unknown_format_is_config_error() {
        let err = Settings::from_toml_str("[output]\nformat = \"latex\"").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docxweave.toml");
        fs::write(&path, "[html]\ninclude_stylesheet = false\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert!(!settings.html.include_stylesheet);

        let missing = Settings::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConvertError::Io(_)));
    }
}
