//! Compliance Heatmap - render security-control compliance scores as a grid
//!
//! A compliance dataset scores how well each organization meets each control
//! of a security framework. Controls are grouped into security levels,
//! categories and subcategories. This crate turns that tree into a heatmap:
//! one row per control, one column per organization, each cell colored by
//! score and able to open a popover with the justification and sources.
//!
//! # Overview
//!
//! The pipeline has four pieces, each a plain function or value type:
//!
//! 1. [`Dataset`]: loads and validates the JSON tree once. Immutable afterwards.
//! 2. [`classify`]: maps a 0-100 score onto a color [`Bucket`].
//! 3. [`CellStates`]: which cell popovers are open, under a [`PopoverPolicy`].
//! 4. [`Grid::build`]: flattens dataset + columns + cell states into rows.
//!
//! Hosts ([`report`] writers, the [`serve`] HTTP mode, the CLI) only ever
//! consume a built [`Grid`].
//!
//! # Quick Start
//!
//! ```no_run
//! use compliance_heatmap::{CellStates, Dataset, Grid, OrganizationSet};
//!
//! let dataset = Dataset::load("data/compliance-data.json")?;
//! let orgs = OrganizationSet::default();
//! let grid = Grid::build(&dataset, &orgs, &CellStates::default());
//!
//! for row in grid.control_rows() {
//!     let scores: Vec<String> = row.cells.iter().map(|c| c.label()).collect();
//!     println!("{:<40} {}", row.name, scores.join(" "));
//! }
//! # Ok::<(), compliance_heatmap::DatasetError>(())
//! ```
//!
//! # Buckets
//!
//! | Score | Bucket   |
//! |-------|----------|
//! | 0     | none     |
//! | 1-24  | low      |
//! | 25-49 | mid-low  |
//! | 50-74 | mid-high |
//! | 75-99 | high     |
//! | 100   | full     |
//!
//! A cell with no dataset entry is colored like 0 but its detail reads
//! "No information available" and is marked [`DataState::Missing`].
//!
//! # Modules
//!
//! - [`dataset`]: Dataset tree, loading and validation
//! - [`classify`]: Score buckets and palette
//! - [`cell`]: Cell ids, popover state and detail payloads
//! - [`grid`]: Row layout
//! - [`report`]: Output formatters (HTML, JSON, CSV)
//! - [`serve`]: Interactive HTTP mode

pub mod cell;
pub mod classify;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod legend;
pub mod orgs;
pub mod report;
pub mod serve;

pub use cell::{CellDetail, CellId, CellStates, DataState, PopoverPolicy, NO_INFORMATION};
pub use classify::{classify, Bucket, Contrast};
pub use dataset::{
    Category, ComplianceInfo, Control, ControlId, Dataset, SecurityLevel, Subcategory,
};
pub use error::{DatasetError, OrgSetError};
pub use grid::{ControlRow, Grid, GridCell, GridRow};
pub use legend::{LegendEntry, LEGEND};
pub use orgs::{OrganizationSet, DEFAULT_ORGANIZATIONS};
