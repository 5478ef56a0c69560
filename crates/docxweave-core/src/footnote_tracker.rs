//! Footnote citation numbering
//!
//! Footnotes are numbered in the order their references are first met
//! during the body walk, not in the order the footnotes part stores them.
//! One tracker lives for exactly one export.

use std::collections::HashMap;

use tracing::warn;

use docxweave_ooxml::{Footnote, Footnotes};

/// Records footnote references and hands back the cited bodies
#[derive(Debug)]
pub struct FootnoteTracker<'d> {
    footnotes: &'d Footnotes,
    cited: Vec<&'d Footnote>,
    indices: HashMap<&'d str, usize>,
    drained: usize,
}

impl<'d> FootnoteTracker<'d> {
    /// Create an empty tracker over the document's footnotes
    pub fn new(footnotes: &'d Footnotes) -> Self {
        Self {
            footnotes,
            cited: Vec::new(),
            indices: HashMap::new(),
            drained: 0,
        }
    }

    /// Citation number (1-based) for footnote `id`
    ///
    /// Repeated references reuse the first number. A reference to a
    /// footnote that does not exist is not recorded.
    pub fn record(&mut self, id: &str) -> Option<usize> {
        if let Some(index) = self.indices.get(id) {
            return Some(*index);
        }
        let Some(footnote) = self.footnotes.get(id) else {
            warn!(footnote = id, "reference to missing footnote");
            return None;
        };
        self.cited.push(footnote);
        let index = self.cited.len();
        self.indices.insert(footnote.id.as_str(), index);
        Some(index)
    }

    /// Footnotes cited since the last drain, with their numbers
    ///
    /// Rendering a footnote body can cite further footnotes; callers drain
    /// until nothing is left.
    pub fn drain(&mut self) -> Vec<(usize, &'d Footnote)> {
        let pending = self.cited[self.drained..]
            .iter()
            .enumerate()
            .map(|(offset, footnote)| (self.drained + offset + 1, *footnote))
            .collect();
        self.drained = self.cited.len();
        pending
    }

    /// Number of distinct footnotes cited so far
    pub fn len(&self) -> usize {
        self.cited.len()
    }

    /// Whether nothing has been cited
    pub fn is_empty(&self) -> bool {
        self.cited.is_empty()
    }
}
