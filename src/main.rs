//! Command-line PDF to per-page PNG converter.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2png::{ExportOptions, FontOverride, PageExporter, PageRegion, DEFAULT_DPI};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Convert a PDF document into one PNG image per page.
///
/// Output files are named `<input filename>-<page index>.png`, zero-based,
/// in document order. A replacement font can be preloaded to correct
/// CID-keyed CJK faces the renderer cannot map (e.g. STSong-Light).
#[derive(Debug, Parser)]
#[command(name = "pdf2png", version, about)]
struct Args {
    /// Path to the PDF document to convert
    input: PathBuf,

    /// Rasterization resolution in dots per inch
    #[arg(long, default_value_t = DEFAULT_DPI, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Directory that receives the PNG files (created if absent)
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Replacement font as NAME=PATH, e.g. STSong-Light=fonts/stsong.ttf
    #[arg(long, value_name = "NAME=PATH")]
    font_override: Option<FontOverride>,

    /// Rasterize only this page region, in points: X,Y,WxH (e.g. 0,0,960x120)
    #[arg(long, value_name = "X,Y,WxH")]
    region: Option<PageRegion>,

    /// PDFium shared library file or directory (default: current directory,
    /// then the system library path)
    #[arg(long, value_name = "PATH")]
    pdfium_lib: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pdf2png=info".parse().expect("valid directive")),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let exporter = match &args.pdfium_lib {
        Some(library) => PageExporter::with_library(library),
        None => PageExporter::new(),
    }
    .context("failed to initialize the PDF renderer")?;

    let mut options = ExportOptions::new()
        .set_dpi(args.dpi)
        .set_output_dir(&args.output_dir);
    if let Some(font) = args.font_override.clone() {
        options = options.set_font_override(font);
    }
    if let Some(region) = args.region {
        options = options.set_region(region);
    }

    // A document that fails to open here is reported by export below.
    if let Ok(page_count) = exporter.page_count(&args.input) {
        info!(
            "{}: {page_count} page(s) to render at {} dpi",
            args.input.display(),
            args.dpi
        );
    }

    let files = match exporter.export(&args.input, &options) {
        Ok(files) => files,
        Err(err) => {
            let completed = err.completed_pages().len();
            if completed > 0 {
                eprintln!("{completed} page(s) were already written before the failure");
            }
            return Err(err)
                .with_context(|| format!("export failed for {}", args.input.display()));
        }
    };

    for file in &files {
        info!("{} ({}x{})", file.path.display(), file.width, file.height);
    }
    println!(
        "wrote {} page(s) to {}",
        files.len(),
        args.output_dir.display()
    );
    Ok(())
}
