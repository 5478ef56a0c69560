//! Effective (cascaded) properties
//!
//! Run properties resolve, lowest priority first:
//!
//! 1. document defaults (`w:docDefaults/w:rPrDefault`)
//! 2. the paragraph style chain, general to specific
//! 3. the character style chain, general to specific
//! 4. direct run properties
//!
//! Paragraph properties resolve from `w:pPrDefault`, then the paragraph
//! style chain, then direct properties. Each property is merged on its own,
//! so an explicit off at a higher layer beats an inherited on.
//!
//! The paragraph mark's own `w:rPr` (inside `w:pPr`) is not read at all and
//! can never leak into run formatting.

use tracing::debug;

use crate::model::{ParagraphProperties, RunProperties};
use crate::styles::{StyleSheet, StyleType};

impl StyleSheet {
    /// Validate a style reference against the styles of `style_type`
    fn usable_style(&self, style_type: StyleType, id: Option<&str>) -> Option<String> {
        let id = id?;
        if self.get(style_type, id).is_some() {
            Some(id.to_string())
        } else {
            debug!(style = id, ?style_type, "ignoring reference to unknown style");
            None
        }
    }

    /// Cascade paragraph properties for a paragraph with `direct` formatting
    ///
    /// The result's `style_id` is the paragraph style actually applied: the
    /// direct `pStyle` when it names a paragraph style, else the default
    /// paragraph style.
    pub fn effective_paragraph_properties(
        &self,
        direct: Option<&ParagraphProperties>,
    ) -> ParagraphProperties {
        let style_id = self
            .usable_style(
                StyleType::Paragraph,
                direct.and_then(|d| d.style_id.as_deref()),
            )
            .or_else(|| self.default_paragraph.clone());

        let mut effective = self.default_paragraph_properties.clone();
        if let Some(id) = style_id.as_deref() {
            for style in self.resolve_chain(StyleType::Paragraph, id).iter().rev() {
                if let Some(props) = &style.paragraph_properties {
                    effective.merge(props);
                }
            }
        }
        if let Some(direct) = direct {
            effective.merge(direct);
        }
        effective.style_id = style_id;
        effective
    }

    /// Run properties contributed by defaults and a paragraph style alone
    pub fn paragraph_run_properties(&self, paragraph_style: Option<&str>) -> RunProperties {
        let mut effective = self.default_run_properties.clone();
        if let Some(id) = paragraph_style {
            for style in self.resolve_chain(StyleType::Paragraph, id).iter().rev() {
                if let Some(props) = &style.run_properties {
                    effective.merge(props);
                }
            }
        }
        effective.style_id = None;
        effective
    }

    /// Cascade run properties for a run inside a paragraph styled `paragraph_style`
    pub fn effective_run_properties(
        &self,
        paragraph_style: Option<&str>,
        direct: Option<&RunProperties>,
    ) -> RunProperties {
        let mut effective = self.paragraph_run_properties(paragraph_style);

        let character_style = self
            .usable_style(
                StyleType::Character,
                direct.and_then(|d| d.style_id.as_deref()),
            )
            .or_else(|| self.default_character.clone());
        if let Some(id) = character_style.as_deref() {
            for style in self.resolve_chain(StyleType::Character, id).iter().rev() {
                if let Some(props) = &style.run_properties {
                    effective.merge(props);
                }
            }
        }

        if let Some(direct) = direct {
            effective.merge(direct);
        }
        effective.style_id = character_style;
        effective
    }
}
