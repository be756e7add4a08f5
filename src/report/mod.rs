//! Report generation for heatmap grids
//!
//! This module provides output formatters for a built [`Grid`] in multiple formats:
//!
//! - **HTML**: Self-contained heatmap page with per-cell detail popovers and legend
//! - **JSON**: Machine-readable rows, cells, summary and legend
//! - **CSV**: One line per (control, organization) cell for spreadsheets
//!
//! # Usage
//!
//! ```ignore
//! use compliance_heatmap::report::{self, PageOptions};
//!
//! // Automatically picks format based on extension
//! report::generate("heatmap.html", &grid, &PageOptions::default())?;  // HTML
//! report::generate("heatmap.json", &grid, &PageOptions::default())?;  // JSON
//! report::generate("heatmap.csv", &grid, &PageOptions::default())?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::classify::Bucket;
use crate::grid::Grid;
use serde::Serialize;
use std::io;
use std::path::Path;

pub const DEFAULT_TITLE: &str = "SL5 Compliance Heatmap";

pub const DEFAULT_DESCRIPTION: &str = "Track Security Level 5 (SL5) compliance of major AI labs. \
This data is compiled from public sources, is open-source, and updates daily using advanced \
Large Language Models to provide the latest insights into frontier model security.";

/// Page-level settings for the HTML host page.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    pub description: String,
    /// Google Analytics measurement id; when set, the gtag loader is added to `<head>`.
    pub analytics_id: Option<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            analytics_id: None,
        }
    }
}

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, grid: &Grid, page: &PageOptions) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    tracing::debug!(path = %path.display(), format = %ext, "writing report");

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, grid, page, html::CellMode::Static),
        "json" => json::write(&mut file, grid),
        _ => csv::write(&mut file, grid),
    }
}

/// Summary statistics over every cell of a grid
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub controls: usize,
    pub cells: usize,
    pub none: usize,
    pub low: usize,
    pub mid_low: usize,
    pub mid_high: usize,
    pub high: usize,
    pub full: usize,
    /// Cells with no dataset entry (also counted under `none`).
    pub missing: usize,
    /// Mean score across all cells, missing data counted as 0.
    pub mean_score: f64,
}

impl Summary {
    pub fn from_grid(grid: &Grid) -> Self {
        let mut summary = Self::default();
        summary.controls = grid.control_rows().count();
        let mut total: u64 = 0;

        for cell in grid.cells() {
            summary.cells += 1;
            total += u64::from(cell.score);
            match cell.bucket {
                Bucket::None => summary.none += 1,
                Bucket::Low => summary.low += 1,
                Bucket::MidLow => summary.mid_low += 1,
                Bucket::MidHigh => summary.mid_high += 1,
                Bucket::High => summary.high += 1,
                Bucket::Full => summary.full += 1,
            }
            if cell.detail.is_missing() {
                summary.missing += 1;
            }
        }

        if summary.cells > 0 {
            summary.mean_score = total as f64 / summary.cells as f64;
        }
        summary
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::None => self.none,
            Bucket::Low => self.low,
            Bucket::MidLow => self.mid_low,
            Bucket::MidHigh => self.mid_high,
            Bucket::High => self.high,
            Bucket::Full => self.full,
        }
    }
}
