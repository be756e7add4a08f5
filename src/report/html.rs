//! HTML heatmap page
//!
//! The page is self-contained (inline CSS, no scripts unless an analytics id
//! is configured). How a cell opens its detail popover depends on
//! [`CellMode`]: a static file lets the browser toggle each cell with a
//! native `<details>` element (all sharing one `name` under
//! [`PopoverPolicy::Single`], so opening one closes the rest), while the
//! interactive server turns every cell into a link that posts the toggle
//! back to it and renders only the popovers its
//! [`CellStates`](crate::CellStates) has open.

use crate::cell::{CellDetail, PopoverPolicy};
use crate::grid::{ControlRow, Grid, GridCell, GridRow};
use crate::legend::LEGEND;
use crate::report::{PageOptions, Summary};
use std::fmt::Write as _;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    /// Each cell toggles in the browser, independently of the others.
    Static,
    /// Each cell links to the server's `/toggle` route.
    Interactive,
}

pub fn write<W: Write>(writer: &mut W, grid: &Grid, page: &PageOptions, mode: CellMode) -> io::Result<()> {
    writer.write_all(render(grid, page, mode).as_bytes())
}

/// Render the full page to a string.
pub fn render(grid: &Grid, page: &PageOptions, mode: CellMode) -> String {
    let summary = Summary::from_grid(grid);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="description" content="{description}">
    <title>{title}</title>{analytics}
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">{title}</div>
            <div class="subtitle">{description}</div>
        </div>
        {stats}
        <div class="card">
            <div class="heatmap">
                <div class="grid-header">
                    <div class="label-col"></div>{columns}
                </div>
                <div class="scroll">{rows}
                </div>
            </div>
            {legend}
        </div>
        <div class="footer">Generated {generated}</div>
    </div>
</body>
</html>
"#,
        title = escape(&page.title),
        description = escape(&page.description),
        analytics = page.analytics_id.as_deref().map(analytics_snippet).unwrap_or_default(),
        css = CSS,
        stats = render_stats(&summary),
        columns = render_columns(&grid.organizations),
        rows = render_rows(grid, mode),
        legend = render_legend(),
        generated = chrono::Local::now().format("%Y-%m-%d %H:%M"),
    )
}

fn analytics_snippet(id: &str) -> String {
    let id = escape(id);
    format!(
        r#"
    <script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
    <script>
        window.dataLayer = window.dataLayer || [];
        function gtag(){{dataLayer.push(arguments);}}
        gtag('js', new Date());
        gtag('config', '{id}');
    </script>"#,
        id = id
    )
}

fn render_stats(summary: &Summary) -> String {
    format!(
        r#"<div class="stats">
            <div class="stat"><div class="stat-value">{controls}</div><div class="stat-label">Controls</div></div>
            <div class="stat full"><div class="stat-value">{full}</div><div class="stat-label">Fully Compliant</div></div>
            <div class="stat none"><div class="stat-value">{none}</div><div class="stat-label">Non-Compliant</div></div>
            <div class="stat"><div class="stat-value">{missing}</div><div class="stat-label">No Information</div></div>
        </div>"#,
        controls = summary.controls,
        full = summary.full,
        none = summary.none,
        missing = summary.missing,
    )
}

fn render_columns(orgs: &[String]) -> String {
    let mut out = String::new();
    for org in orgs {
        let _ = write!(out, r#"<div class="col-header">{}</div>"#, escape(org));
    }
    out
}

fn render_rows(grid: &Grid, mode: CellMode) -> String {
    let mut out = String::new();
    for row in &grid.rows {
        match row {
            GridRow::Level { level, description } => {
                let _ = write!(
                    out,
                    r#"
                    <div class="level"><span class="badge">SL{}</span><p class="dim">{}</p></div>"#,
                    level,
                    escape(description)
                );
            }
            GridRow::Category { name } => {
                let _ = write!(out, r#"
                    <h3 class="category">{}</h3>"#, escape(name));
            }
            GridRow::Subcategory { name } => {
                let _ = write!(out, r#"
                    <h4 class="subcategory">{}</h4>"#, escape(name));
            }
            GridRow::Control(control) => {
                out.push_str(&render_control_row(control, grid.policy, mode))
            }
        }
    }
    out
}

fn render_control_row(row: &ControlRow, policy: PopoverPolicy, mode: CellMode) -> String {
    let cells: String = row.cells.iter().map(|cell| render_cell(cell, policy, mode)).collect();
    format!(
        r#"
                    <div class="row"><div class="label-col"><div class="control indent-{}">{}</div></div>{}</div>"#,
        row.indent,
        escape(&row.name),
        cells
    )
}

/// Shared `name` for exclusive `<details>` cells.
const CELL_GROUP: &str = "heatmap-cell";

fn render_cell(cell: &GridCell, policy: PopoverPolicy, mode: CellMode) -> String {
    let classes = format!(
        "swatch bucket-{} {}{}",
        cell.bucket,
        cell.contrast.css_class(),
        if cell.open { " open" } else { "" }
    );
    let data = if cell.detail.is_missing() { "missing" } else { "present" };

    match mode {
        CellMode::Static => format!(
            r#"<details class="cell" id="{anchor}"{group} data-state="{data}"{open}><summary class="{classes}">{label}</summary>{popover}</details>"#,
            anchor = cell.id.anchor(),
            group = match policy {
                PopoverPolicy::Single => format!(r#" name="{}""#, CELL_GROUP),
                PopoverPolicy::Multiple => String::new(),
            },
            data = data,
            open = if cell.open { " open" } else { "" },
            classes = classes,
            label = cell.label(),
            popover = render_popover(&cell.detail),
        ),
        CellMode::Interactive => {
            let query = serde_urlencoded::to_string([
                ("control", cell.id.control.to_string()),
                ("org", cell.id.org.clone()),
            ])
            .unwrap_or_default();
            format!(
                r#"<div class="cell" id="{anchor}" data-state="{data}"><a class="{classes}" href="/toggle?{query}">{label}</a>{popover}</div>"#,
                anchor = cell.id.anchor(),
                data = data,
                classes = classes,
                query = escape(&query),
                label = cell.label(),
                popover = if cell.open { render_popover(&cell.detail) } else { String::new() },
            )
        }
    }
}

fn render_popover(detail: &CellDetail) -> String {
    let mut out = format!(
        r#"<div class="popover"><div class="popover-title">{}</div><div>Score: {}%</div><div><span class="strong">Reason:</span> {}</div>"#,
        escape(&detail.title()),
        detail.score,
        escape(&detail.justification)
    );
    if !detail.sources.is_empty() {
        out.push_str(r#"<div><span class="strong">Sources:</span><ul>"#);
        for source in &detail.sources {
            let _ = write!(out, "<li>{}</li>", escape(source));
        }
        out.push_str("</ul></div>");
    }
    out.push_str("</div>");
    out
}

fn render_legend() -> String {
    let mut out = String::from(r#"<div class="legend">"#);
    for entry in LEGEND {
        let _ = write!(
            out,
            r#"<div class="legend-item"><div class="legend-dot bucket-{}"></div><span>{}</span></div>"#,
            entry.bucket, entry.label
        );
    }
    out.push_str("</div>");
    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS: &str = r#"
        :root {
            --bg: #f8fafc;
            --card: #ffffff;
            --border: #e5e7eb;
            --text: #111827;
            --dim: #6b7280;
            --accent: #1d4ed8;
            --red-500: #ef4444;
            --red-400: #f87171;
            --orange-400: #fb923c;
            --yellow-400: #facc15;
            --green-400: #4ade80;
            --green-500: #22c55e;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }
        .container { max-width: 80rem; margin: 0 auto; padding: 1rem; }

        /* Header */
        .header { text-align: center; margin-bottom: 1.5rem; }
        .logo { font-size: 1.5rem; font-weight: 700; }
        .subtitle { color: var(--dim); max-width: 56rem; margin: 0.5rem auto 0; }

        /* Stats Row */
        .stats {
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 1rem;
            margin-bottom: 1.5rem;
        }
        .stat {
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1rem;
            text-align: center;
        }
        .stat-value { font-size: 2rem; font-weight: 700; line-height: 1; }
        .stat-label { color: var(--dim); font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }
        .stat.full .stat-value { color: var(--green-500); }
        .stat.none .stat-value { color: var(--red-500); }

        /* Heatmap */
        .card {
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            overflow-x: auto;
        }
        .heatmap { min-width: 800px; }
        .grid-header { display: flex; margin-bottom: 1rem; }
        .label-col { width: 20rem; flex-shrink: 0; padding-right: 1rem; }
        .col-header {
            width: 4rem; height: 3rem;
            display: flex; align-items: center; justify-content: center;
            font-weight: 600; font-size: 0.875rem;
            background: #f3f4f6; border: 1px solid var(--border);
        }
        .scroll { max-height: 600px; overflow-y: auto; }
        .level { position: sticky; top: 0; background: var(--card); z-index: 10; padding: 1.5rem 0 0.5rem; border-bottom: 1px solid var(--border); }
        .badge { display: inline-block; font-size: 1.125rem; padding: 0.5rem 1rem; border: 1px solid var(--border); border-radius: 9999px; }
        .dim { color: var(--dim); font-size: 0.875rem; margin-top: 0.25rem; max-width: 56rem; }
        .category { font-size: 1rem; font-weight: 600; color: var(--accent); margin: 1rem 0 0.5rem; }
        .subcategory { font-size: 0.875rem; font-weight: 500; color: #4b5563; margin: 0.5rem 0 0.25rem 1rem; }
        .row { display: flex; align-items: center; }
        .control { font-size: 0.875rem; color: #374151; }
        .indent-1 { margin-left: 1rem; }
        .indent-2 { margin-left: 2rem; }

        /* Cells */
        .cell { position: relative; }
        .swatch {
            width: 4rem; height: 3rem;
            display: flex; align-items: center; justify-content: center;
            font-size: 0.75rem; font-weight: 500;
            cursor: pointer; list-style: none; text-decoration: none;
            border: 1px solid var(--border);
            transition: transform 0.2s, box-shadow 0.2s;
        }
        .swatch::-webkit-details-marker { display: none; }
        .swatch:hover { transform: scale(1.05); box-shadow: 0 4px 6px rgba(0,0,0,0.1); }
        .swatch.open, details[open] > .swatch { outline: 2px solid #3b82f6; outline-offset: -2px; }
        .text-light { color: #ffffff; }
        .text-dark { color: #111827; }
        .bucket-none { background: var(--red-500); }
        .bucket-low { background: var(--red-400); }
        .bucket-mid-low { background: var(--orange-400); }
        .bucket-mid-high { background: var(--yellow-400); }
        .bucket-high { background: var(--green-400); }
        .bucket-full { background: var(--green-500); }

        /* Popover */
        .popover {
            position: absolute; bottom: 100%; left: 50%; transform: translateX(-50%);
            width: 24rem; padding: 0.75rem; z-index: 20;
            background: var(--card); border: 1px solid var(--border); border-radius: 8px;
            box-shadow: 0 4px 12px rgba(0,0,0,0.15);
            font-size: 0.875rem;
        }
        .popover > div + div { margin-top: 0.5rem; }
        .popover-title, .strong { font-weight: 600; }
        .popover ul { list-style: disc inside; margin-top: 0.25rem; font-size: 0.75rem; word-break: break-all; }

        /* Legend */
        .legend { display: flex; justify-content: center; gap: 1rem; margin-top: 1.5rem; font-size: 0.875rem; flex-wrap: wrap; }
        .legend-item { display: flex; align-items: center; gap: 0.5rem; }
        .legend-dot { width: 1rem; height: 1rem; border-radius: 4px; }

        /* Footer */
        .footer {
            margin-top: 2rem;
            padding-top: 1rem;
            border-top: 1px solid var(--border);
            color: var(--dim);
            font-size: 0.875rem;
            text-align: center;
        }
"#;
