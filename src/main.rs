use chrono::Local;
use clap::{Parser, Subcommand};
use compliance_heatmap::report::{self, PageOptions, Summary};
use compliance_heatmap::serve::{self, AppState};
use compliance_heatmap::{
    Bucket, CellStates, Dataset, Grid, GridRow, OrganizationSet, PopoverPolicy,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_ORGS: &str = "OpenAI,Anthropic,Google,xAI,Meta";

#[derive(Parser, Debug)]
#[command(name = "compliance-heatmap")]
#[command(author, version, about = "Render security-control compliance scores as a heatmap")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Compliance dataset (JSON) to render (optional in GUI mode)
    dataset: Option<PathBuf>,

    /// Launch GUI file picker for the dataset
    #[arg(long)]
    gui: bool,

    /// Organization columns, comma-separated, in display order
    #[arg(long, default_value = DEFAULT_ORGS)]
    orgs: OrganizationSet,

    /// Popover policy: multiple (cells toggle independently) or single
    #[arg(long, default_value = "multiple")]
    popover: PopoverPolicy,

    /// Output report file (.html, .json, .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, default_value = "heatmap-reports")]
    report_dir: PathBuf,

    /// Don't auto-generate an HTML report
    #[arg(long)]
    no_report: bool,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Page title for HTML output
    #[arg(long)]
    title: Option<String>,

    /// Google Analytics id to embed in HTML output
    #[arg(long)]
    analytics_id: Option<String>,

    /// Show justifications under each row
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start interactive web UI for the heatmap
    Serve {
        /// Compliance dataset (JSON)
        dataset: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Organization columns, comma-separated, in display order
        #[arg(long, default_value = DEFAULT_ORGS)]
        orgs: OrganizationSet,

        /// Popover policy: multiple or single
        #[arg(long, default_value = "multiple")]
        popover: PopoverPolicy,

        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// Google Analytics id to embed in the page
        #[arg(long)]
        analytics_id: Option<String>,

        /// Don't open a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Load and validate a dataset without rendering it
    Validate {
        /// Compliance dataset (JSON)
        dataset: PathBuf,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Handle subcommands first
    if let Some(cmd) = args.command {
        match cmd {
            Command::Serve { dataset, port, orgs, popover, title, analytics_id, no_open } => {
                let data = load_or_exit(&dataset);
                let state = AppState::new(data, orgs, popover, page_options(title, analytics_id));
                if let Err(e) = serve::start(port, state, !no_open) {
                    eprintln!("Server error: {}", e);
                    std::process::exit(1);
                }
                return;
            }
            Command::Validate { dataset } => {
                let data = load_or_exit(&dataset);
                let cells: usize = data
                    .controls()
                    .map(|(_, c)| c.compliance.len())
                    .sum();
                println!(
                    "\x1b[32mOK\x1b[0m {}: {} levels, {} controls, {} scored entries",
                    dataset.display(),
                    data.levels().len(),
                    data.control_count(),
                    cells
                );
                return;
            }
        }
    }

    #[cfg(feature = "gui")]
    let use_gui = args.gui || args.dataset.is_none();

    #[cfg(not(feature = "gui"))]
    let use_gui = false;

    #[cfg(feature = "gui")]
    let path = if use_gui {
        match pick_dataset_gui() {
            Some(p) => p,
            None => {
                eprintln!("No dataset selected.");
                std::process::exit(0);
            }
        }
    } else {
        match args.dataset.clone() {
            Some(p) => p,
            None => std::process::exit(1),
        }
    };

    #[cfg(not(feature = "gui"))]
    let path = if let Some(p) = args.dataset.clone() {
        if args.gui {
            eprintln!("Note: GUI mode not available in this build.");
        }
        p
    } else {
        eprintln!("Usage: compliance-heatmap <DATASET>");
        eprintln!("Run 'compliance-heatmap --help' for more options.");
        std::process::exit(1);
    };

    let dataset = load_or_exit(&path);
    let grid = Grid::build(&dataset, &args.orgs, &CellStates::new(args.popover));
    let summary = Summary::from_grid(&grid);

    if !args.quiet {
        eprintln!("\x1b[1mCompliance Heatmap\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        print_grid(&grid, args.verbose);
    }

    eprintln!("\n{}", "─".repeat(70));
    eprintln!("\x1b[1mSummary:\x1b[0m {} controls x {} organizations", summary.controls, grid.organizations.len());
    for bucket in Bucket::ALL.iter().rev() {
        eprintln!(
            "  {}{}  {:<8}\x1b[0m {}",
            bucket.ansi_bg(),
            bucket.contrast().ansi_fg(),
            bucket.name(),
            summary.count(*bucket)
        );
    }
    eprintln!("  \x1b[90mno information:\x1b[0m {}", summary.missing);
    eprintln!("  \x1b[90mmean score:\x1b[0m     {:.1}%", summary.mean_score);

    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        std::fs::create_dir_all(&args.report_dir).ok();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("heatmap_{}.html", timestamp);
        Some(args.report_dir.join(filename))
    } else {
        None
    };

    if let Some(ref output_path) = report_path {
        let page = page_options(args.title.clone(), args.analytics_id.clone());
        if let Err(e) = report::generate(output_path, &grid, &page) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }

        if !args.no_open {
            if use_gui {
                let _ = open::that(output_path);
            } else if !args.quiet {
                eprint!("\nOpen report in browser? [Y/n] ");
                io::stderr().flush().ok();

                let mut input = String::new();
                if io::stdin().read_line(&mut input).is_ok() {
                    let input = input.trim().to_lowercase();
                    if input.is_empty() || input == "y" || input == "yes" {
                        if let Err(e) = open::that(output_path) {
                            eprintln!("Failed to open report: {}", e);
                        }
                    }
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_or_exit(path: &Path) -> Dataset {
    match Dataset::load(path) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("\x1b[31mFailed to load {}:\x1b[0m {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn page_options(title: Option<String>, analytics_id: Option<String>) -> PageOptions {
    let mut page = PageOptions::default();
    if let Some(title) = title {
        page.title = title;
    }
    page.analytics_id = analytics_id;
    page
}

#[cfg(feature = "gui")]
fn pick_dataset_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select compliance dataset")
        .add_filter("JSON", &["json"])
        .pick_file()
}

const LABEL_WIDTH: usize = 44;
const CELL_WIDTH: usize = 9;

fn print_grid(grid: &Grid, verbose: bool) {
    let mut header = " ".repeat(LABEL_WIDTH);
    for org in &grid.organizations {
        header.push_str(&format!("{:^width$}", truncate(org, CELL_WIDTH), width = CELL_WIDTH));
    }
    println!("\x1b[1m{}\x1b[0m", header);

    for row in &grid.rows {
        match row {
            GridRow::Level { level, description } => {
                println!("\n\x1b[1m[SL{}]\x1b[0m \x1b[90m{}\x1b[0m", level, truncate(description, 100));
            }
            GridRow::Category { name } => println!("\x1b[1;34m{}\x1b[0m", name),
            GridRow::Subcategory { name } => println!("  \x1b[90m{}\x1b[0m", name),
            GridRow::Control(control) => {
                let indent = "  ".repeat(control.indent as usize);
                let label = truncate(&control.name, LABEL_WIDTH - indent.len() - 1);
                let mut line = format!("{}{:<width$}", indent, label, width = LABEL_WIDTH - indent.len());
                for cell in &control.cells {
                    line.push_str(&format!(
                        "{}{}{:^width$}\x1b[0m",
                        cell.bucket.ansi_bg(),
                        cell.contrast.ansi_fg(),
                        cell.label(),
                        width = CELL_WIDTH
                    ));
                }
                println!("{}", line);

                if verbose {
                    for cell in &control.cells {
                        println!(
                            "{}    \x1b[90m{}: {}\x1b[0m",
                            indent,
                            cell.id.org,
                            truncate(&cell.detail.justification, 100)
                        );
                    }
                }
            }
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
