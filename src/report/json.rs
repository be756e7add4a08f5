//! JSON report

use crate::grid::Grid;
use crate::legend::{LegendEntry, LEGEND};
use crate::report::Summary;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub generated: String,
    pub summary: Summary,
    pub legend: &'static [LegendEntry],
    #[serde(flatten)]
    pub grid: &'a Grid,
}

impl<'a> JsonReport<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            generated: chrono::Local::now().to_rfc3339(),
            summary: Summary::from_grid(grid),
            legend: LEGEND,
            grid,
        }
    }
}

pub fn write<W: Write>(writer: &mut W, grid: &Grid) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &JsonReport::new(grid))?;
    writeln!(writer)
}
