//! pressflow CLI - magazine page pagination tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pressflow::render::{to_json, PAGE_STYLESHEET};
use pressflow::{
    Decomposer, FlowEngine, JsonFormat, LayoutConfig, PageSelection, PaginateOptions,
    PublicationMetadata, RenderedPage, TextMetricsMeasurer, Typography,
};

#[derive(Parser)]
#[command(name = "pressflow")]
#[command(version)]
#[command(about = "Paginate article markup into print-ready magazine pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginate an article into pages
    Paginate {
        /// Article body markup
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Publication metadata (JSON)
        #[arg(short, long, value_name = "FILE")]
        metadata: Option<PathBuf>,

        /// Output directory (html) or file (json, preview); stdout for json if not specified
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: OutputKind,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Assemble pages on a single thread
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// List content units with their measured heights
    Units {
        /// Article body markup
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Publication metadata (JSON)
        #[arg(short, long, value_name = "FILE")]
        metadata: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show the content area for a page configuration
    Capacity {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct LayoutArgs {
    /// Number of text columns
    #[arg(long, default_value = "2", env = "PRESSFLOW_COLUMNS")]
    columns: u32,

    /// Gap between columns in millimetres
    #[arg(long, default_value = "10")]
    gap: f32,

    /// Body font size in points
    #[arg(long, default_value = "10")]
    font_size: f32,

    /// Line height multiplier
    #[arg(long, default_value = "1.5")]
    line_height: f32,

    /// Header band height on the first page, in millimetres
    #[arg(long)]
    first_page_header: Option<f32>,
}

impl LayoutArgs {
    fn layout(&self) -> LayoutConfig {
        let mut layout = LayoutConfig::default()
            .with_columns(self.columns)
            .with_column_gap(self.gap);
        if let Some(height) = self.first_page_header {
            layout = layout.with_first_page_header(height);
        }
        layout
    }

    fn typography(&self) -> Typography {
        Typography::default()
            .with_font_size(self.font_size)
            .with_line_height(self.line_height)
    }

    fn options(&self) -> PaginateOptions {
        PaginateOptions::new()
            .with_layout(self.layout())
            .with_typography(self.typography())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    /// One HTML fragment per page
    Html,
    /// Pages as a JSON array
    Json,
    /// A single standalone HTML document for viewing or printing
    Preview,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Paginate {
            input,
            metadata,
            output,
            format,
            compact,
            pages,
            sequential,
            layout,
        }) => cmd_paginate(
            &input,
            metadata.as_deref(),
            output.as_deref(),
            format,
            compact,
            pages.as_deref(),
            sequential,
            &layout,
        ),
        Some(Commands::Units {
            input,
            metadata,
            layout,
        }) => cmd_units(&input, metadata.as_deref(), &layout),
        Some(Commands::Capacity { layout }) => cmd_capacity(&layout),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pressflow paginate <FILE> [--metadata FILE]".yellow());
            println!("       pressflow --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_metadata(
    input: &Path,
    metadata: Option<&Path>,
) -> Result<PublicationMetadata, Box<dyn std::error::Error>> {
    match metadata {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            let metadata: PublicationMetadata = serde_json::from_str(&json)
                .map_err(|e| format!("Invalid metadata in {}: {}", path.display(), e))?;
            Ok(metadata)
        }
        None => {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            Ok(PublicationMetadata::new(stem))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_paginate(
    input: &Path,
    metadata: Option<&Path>,
    output: Option<&Path>,
    format: OutputKind,
    compact: bool,
    pages: Option<&str>,
    sequential: bool,
    layout: &LayoutArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let markup = fs::read_to_string(input)?;
    let metadata = load_metadata(input, metadata)?;

    let mut options = layout.options().with_pages(page_selection);
    if sequential {
        options.render = options.render.with_parallel(false);
    }

    let mut measurer = TextMetricsMeasurer::new();
    let result = pressflow::paginate_with_stats(&markup, &metadata, &options, &mut measurer)?;

    match format {
        OutputKind::Json => {
            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = to_json(&result.pages, format)?;
            if let Some(path) = output {
                fs::write(path, &json)?;
                println!("{} {}", "Saved to".green(), path.display());
            } else {
                println!("{}", json);
            }
        }
        OutputKind::Preview => {
            let path = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                PathBuf::from(format!("{}_preview.html", stem))
            });
            fs::write(&path, preview_document(&metadata, &result.pages))?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        OutputKind::Html => {
            let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                PathBuf::from(format!("{}_pages", stem))
            });
            fs::create_dir_all(&output_dir)?;

            let pb = ProgressBar::new(result.pages.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb.set_message("Writing pages...");
            for page in &result.pages {
                let path = output_dir.join(format!("page-{:03}.html", page.page_number));
                fs::write(&path, &page.html)?;
                pb.inc(1);
            }
            pb.finish_with_message("Done!");

            println!("\n{} {}", "Output directory:".green().bold(), output_dir.display());
        }
    }

    let stats = &result.stats;
    eprintln!(
        "{} {} pages, {} units",
        "Paginated".green(),
        stats.page_count,
        stats.unit_count
    );
    if stats.overflowed_page_count > 0 {
        eprintln!(
            "{} {} page(s) hold content taller than a page",
            "Warning:".yellow().bold(),
            stats.overflowed_page_count
        );
    }
    if stats.scaled_image_count > 0 {
        eprintln!(
            "{} {} image(s) scaled to fit a column",
            "Note:".cyan(),
            stats.scaled_image_count
        );
    }

    Ok(())
}

fn cmd_units(
    input: &Path,
    metadata: Option<&Path>,
    layout: &LayoutArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let markup = fs::read_to_string(input)?;
    let metadata = load_metadata(input, metadata)?;
    let options = layout.options();
    options.validate()?;

    let units = Decomposer::default().decompose(&markup, &metadata)?;
    let engine = FlowEngine::new(options.layout, options.typography);
    let mut measurer = TextMetricsMeasurer::new();

    println!("{}", "Content Units".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());

    let mut total = 0.0;
    for unit in &units {
        let height = engine.measure(unit, &mut measurer)?;
        total += height;
        let preview: String = unit.markup.chars().take(40).collect();
        println!(
            "{:>4}  {:<18} {:>8.1}mm  {}",
            unit.order_index,
            unit.kind.label().bold(),
            height,
            preview.replace('\n', " ").dimmed()
        );
    }

    println!("{}", "─".repeat(60).dimmed());
    println!("{}: {}", "Units".bold(), units.len());
    println!("{}: {:.1}mm", "Total height".bold(), total);

    Ok(())
}

fn cmd_capacity(layout: &LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = layout.layout();
    let first = config.capacity(true)?;
    let rest = config.capacity(false)?;

    println!("{}", "Page Capacity".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}mm × {}mm", "Page".bold(), config.page_width, config.page_height);
    println!("{}: {}", "Columns".bold(), rest.column_count);
    println!("{}: {:.1}mm", "Column width".bold(), rest.column_width);
    println!("{}: {:.1}mm", "Content width".bold(), rest.content_width);
    println!("{}: {:.1}mm", "Content height".bold(), rest.content_height);
    if first.content_height != rest.content_height {
        println!(
            "{}: {:.1}mm",
            "First page content height".bold(),
            first.content_height
        );
    }
    println!("{}: {:.1}mm", "Flow height".bold(), rest.flow_height());

    Ok(())
}

fn preview_document(metadata: &PublicationMetadata, pages: &[RenderedPage]) -> String {
    let title = pressflow::parser::markup::escape(
        metadata
            .title
            .as_deref()
            .unwrap_or(&metadata.publication_title),
    );
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\
body{{background:#e5e7eb;margin:0}}\n\
.magazine-page{{margin:10mm auto;box-shadow:0 1mm 4mm rgba(0,0,0,0.2)}}\n\
@media print{{body{{background:none}}.magazine-page{{margin:0;box-shadow:none;break-after:page}}}}\n\
</style>\n</head>\n<body>\n",
        title, PAGE_STYLESHEET
    );
    for page in pages {
        html.push_str(&page.html);
        html.push('\n');
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn cmd_version() {
    println!("{} {}", "pressflow".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Magazine page pagination tool");
    println!();
    println!("License: MIT");
}
