//! Grid layout
//!
//! Flattens the dataset tree into the row list the heatmap is drawn from.
//! For every level, category, subcategory and control (in source order) the
//! grid emits section header rows followed by one control row holding one
//! cell per organization column:
//!
//! ```text
//!                      OpenAI  Anthropic  Google
//! [SL5] Top-priority operations
//! Access Control
//!     Weights                                   <- omitted when the name is empty
//!         MFA enforced  100%     0%        0%
//! ```
//!
//! `Grid::build` is a pure function of the dataset, the organization columns
//! and the current [`CellStates`]; building twice from the same inputs
//! yields equal grids.

use crate::cell::{CellDetail, CellId, CellStates, PopoverPolicy};
use crate::classify::{classify, Bucket, Contrast};
use crate::dataset::{Control, ControlId, Dataset};
use crate::orgs::OrganizationSet;
use serde::Serialize;

/// Nesting depth of control labels below their category.
pub const CONTROL_INDENT: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub id: CellId,
    pub score: u8,
    pub bucket: Bucket,
    pub contrast: Contrast,
    pub open: bool,
    pub detail: CellDetail,
}

impl GridCell {
    fn build(control_id: ControlId, control: &Control, org: &str, states: &CellStates) -> Self {
        let id = CellId::new(control_id, org);
        let detail = CellDetail::resolve(control, org);
        let bucket = classify(i64::from(detail.score));
        GridCell {
            open: states.is_open(&id),
            id,
            score: detail.score,
            bucket,
            contrast: bucket.contrast(),
            detail,
        }
    }

    /// Text on the cell itself, e.g. `"75%"`.
    pub fn label(&self) -> String {
        format!("{}%", self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlRow {
    pub id: ControlId,
    pub name: String,
    /// Name of the enclosing subcategory, empty when it has no heading.
    pub subcategory: String,
    pub indent: u8,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridRow {
    Level { level: u32, description: String },
    Category { name: String },
    Subcategory { name: String },
    Control(ControlRow),
}

impl GridRow {
    pub fn as_control(&self) -> Option<&ControlRow> {
        match self {
            GridRow::Control(row) => Some(row),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub organizations: Vec<String>,
    pub policy: PopoverPolicy,
    pub rows: Vec<GridRow>,
}

impl Grid {
    pub fn build(dataset: &Dataset, orgs: &OrganizationSet, states: &CellStates) -> Self {
        let mut rows = Vec::new();

        for (li, level) in dataset.levels().iter().enumerate() {
            rows.push(GridRow::Level {
                level: level.level,
                description: level.description.clone(),
            });

            for (ci, category) in level.categories.iter().enumerate() {
                rows.push(GridRow::Category { name: category.name.clone() });

                for (si, sub) in category.subcategories.iter().enumerate() {
                    if sub.has_heading() {
                        rows.push(GridRow::Subcategory { name: sub.name.clone() });
                    }

                    for (ki, control) in sub.controls.iter().enumerate() {
                        let id = ControlId::new(li, ci, si, ki);
                        let cells = orgs
                            .iter()
                            .map(|org| GridCell::build(id, control, org, states))
                            .collect();
                        rows.push(GridRow::Control(ControlRow {
                            id,
                            name: control.name.clone(),
                            subcategory: sub.name.clone(),
                            indent: CONTROL_INDENT,
                            cells,
                        }));
                    }
                }
            }
        }

        Grid {
            organizations: orgs.iter().map(str::to_string).collect(),
            policy: states.policy(),
            rows,
        }
    }

    pub fn control_rows(&self) -> impl Iterator<Item = &ControlRow> {
        self.rows.iter().filter_map(GridRow::as_control)
    }

    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.control_rows().flat_map(|row| row.cells.iter())
    }

    pub fn cell(&self, id: &CellId) -> Option<&GridCell> {
        self.control_rows()
            .find(|row| row.id == id.control)?
            .cells
            .iter()
            .find(|cell| cell.id.org == id.org)
    }
}
