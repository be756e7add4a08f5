//! CSV report: one line per (control, organization) cell

use crate::grid::{Grid, GridRow};
use std::io::{self, Write};

const HEADER: &str =
    "level,category,subcategory,control,organization,score,bucket,data,justification,sources";

pub fn write<W: Write>(writer: &mut W, grid: &Grid) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;

    let mut level = 0;
    let mut category = "";

    for row in &grid.rows {
        match row {
            GridRow::Level { level: l, .. } => level = *l,
            GridRow::Category { name } => category = name,
            GridRow::Subcategory { .. } => {}
            GridRow::Control(control) => {
                for cell in &control.cells {
                    let data = if cell.detail.is_missing() { "missing" } else { "present" };
                    writeln!(
                        writer,
                        "{},{},{},{},{},{},{},{},{},{}",
                        level,
                        escape(category),
                        escape(&control.subcategory),
                        escape(&control.name),
                        escape(&cell.id.org),
                        cell.score,
                        cell.bucket,
                        data,
                        escape(&cell.detail.justification),
                        escape(&cell.detail.sources.join(" | ")),
                    )?;
                }
            }
        }
    }

    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
