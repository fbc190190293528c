//! # pdf2png
//!
//! Convert a PDF document into one PNG image per page at a fixed resolution,
//! optionally preloading a replacement font for CID-keyed CJK faces
//! (e.g. STSong-Light) whose glyph mappings the renderer cannot resolve on
//! its own.
//!
//! Rasterization is delegated to PDFium through the `pdfium-render` binding;
//! this crate owns the export pipeline around it: open the document, preload
//! the replacement font if one is configured, rasterize each page in order,
//! and encode it as PNG with physical-resolution metadata. Output files are
//! named `<input filename>-<page index>.png`, zero-based, in document order.
//!
//! ## Example
//!
//! ```no_run
//! use pdf2png::{ExportOptions, FontOverride, PageExporter};
//! use std::path::Path;
//!
//! # fn example() -> pdf2png::Result<()> {
//! let exporter = PageExporter::new()?;
//! let options = ExportOptions::new()
//!     .set_dpi(300)
//!     .set_output_dir("out")
//!     .set_font_override(FontOverride::new("STSong-Light", "fonts/stsong.ttf"));
//!
//! let files = exporter.export(Path::new("sample.pdf"), &options)?;
//! for file in &files {
//!     println!("{} ({}x{})", file.path.display(), file.width, file.height);
//! }
//! # Ok(())
//! # }
//! ```

// Clippy pedantic allows:
// - DPI and dimension conversions move between f32 and integer pixel types
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

mod encode;
mod error;
mod exporter;
mod options;

pub use error::{ExportError, Result};
pub use exporter::{PageExporter, PageFile};
pub use options::{ExportOptions, FontOverride, PageRegion, DEFAULT_DPI};
