//! Tables and merged cells

use super::document::{load_blocks, Block};
use super::{parse_int, FromXml, LoadContext, NodeId};
use crate::xml::XmlElement;

/// A `w:tbl` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub id: NodeId,
    pub rows: Vec<TableRow>,
}

/// A `w:tr` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// A `w:tc` element
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub children: Vec<Block>,
    /// Columns covered (`w:gridSpan`, default 1)
    pub grid_span: u32,
    /// Vertical merge marker (`w:vMerge`)
    pub v_merge: Option<VMerge>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            grid_span: 1,
            v_merge: None,
        }
    }
}

/// `w:vMerge` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMerge {
    /// Starts a merged group
    Restart,
    /// Extends the group above; a bare `<w:vMerge/>` means this too
    Continue,
}

impl FromXml for Table {
    const TAG: &'static str = "tbl";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let id = ctx.next_id();
        let mut rows = Vec::new();
        for child in element.elements() {
            match child.tag.as_str() {
                "tr" => rows.push(TableRow::from_xml(child, ctx)),
                "sdt" => {
                    if let Some(content) = child.child("sdtContent") {
                        for row in content.children_named("tr") {
                            rows.push(TableRow::from_xml(row, ctx));
                        }
                    }
                }
                _ => {}
            }
        }
        Self { id, rows }
    }
}

impl FromXml for TableRow {
    const TAG: &'static str = "tr";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let mut cells = Vec::new();
        for child in element.elements() {
            match child.tag.as_str() {
                "tc" => cells.push(TableCell::from_xml(child, ctx)),
                "sdt" => {
                    if let Some(content) = child.child("sdtContent") {
                        for cell in content.children_named("tc") {
                            cells.push(TableCell::from_xml(cell, ctx));
                        }
                    }
                }
                _ => {}
            }
        }
        Self { cells }
    }
}

impl FromXml for TableCell {
    const TAG: &'static str = "tc";

    fn from_xml(element: &XmlElement, ctx: &mut LoadContext) -> Self {
        let properties = element.child("tcPr");
        let grid_span = properties
            .and_then(|p| p.child("gridSpan"))
            .and_then(|span| parse_int::<u32>(span.val()))
            .filter(|span| *span > 0)
            .unwrap_or(1);
        let v_merge = properties
            .and_then(|p| p.child("vMerge"))
            .map(|merge| match merge.val() {
                Some("restart") => VMerge::Restart,
                _ => VMerge::Continue,
            });

        Self {
            children: load_blocks(element, ctx),
            grid_span,
            v_merge,
        }
    }
}

impl TableRow {
    /// Grid column where the cell at `index` starts
    pub fn grid_column(&self, index: usize) -> usize {
        self.cells
            .iter()
            .take(index)
            .map(|cell| cell.grid_span as usize)
            .sum()
    }

    /// The cell starting at grid column `column`, if any
    pub fn cell_at_column(&self, column: usize) -> Option<&TableCell> {
        let mut start = 0;
        for cell in &self.cells {
            if start == column {
                return Some(cell);
            }
            if start > column {
                return None;
            }
            start += cell.grid_span as usize;
        }
        None
    }
}

impl Table {
    /// Rows covered by the cell at (`row`, `cell`)
    ///
    /// A restart cell spans itself plus the contiguous continuation cells
    /// below it in the same grid column. A continuation cell returns 0 (it
    /// was absorbed by the cell above); any other cell returns 1.
    pub fn row_span(&self, row: usize, cell: usize) -> u32 {
        let Some(current) = self.rows.get(row).and_then(|r| r.cells.get(cell)) else {
            return 0;
        };
        match current.v_merge {
            None => 1,
            Some(VMerge::Continue) => 0,
            Some(VMerge::Restart) => {
                let column = self.rows[row].grid_column(cell);
                let continued = self.rows[row + 1..]
                    .iter()
                    .take_while(|below| {
                        below
                            .cell_at_column(column)
                            .is_some_and(|c| c.v_merge == Some(VMerge::Continue))
                    })
                    .count();
                1 + continued as u32
            }
        }
    }
}
