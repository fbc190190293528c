//! PDF page export: document open, font preload, sequential rasterization.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, error, trace};

use crate::encode;
use crate::error::{ExportError, Result};
use crate::options::{ExportOptions, FontOverride, PageRegion};

/// Reference to one PNG file written for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    /// Zero-based page index within the source document.
    pub page_index: usize,
    /// Location of the written PNG.
    pub path: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// Converts PDF documents into one PNG file per page.
///
/// Owns the PDFium binding; construct once and reuse across documents. The
/// document handle opened by [`export`](Self::export) is scoped to that call
/// and closed on every exit path, success or failure.
pub struct PageExporter {
    pdfium: Pdfium,
}

impl PageExporter {
    /// Bind PDFium from the current directory, falling back to the system
    /// library path.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Initialization`] if no PDFium shared library
    /// can be found and bound.
    pub fn new() -> Result<Self> {
        Self::bind(None)
    }

    /// Bind PDFium from an explicit shared-library file, or from the
    /// platform library name inside an explicit directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Initialization`] if the library cannot be
    /// bound.
    pub fn with_library(library: impl AsRef<Path>) -> Result<Self> {
        Self::bind(Some(library.as_ref()))
    }

    fn bind(library: Option<&Path>) -> Result<Self> {
        let bindings = match library {
            Some(path) if path.is_dir() => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ExportError::Initialization {
            reason: e.to_string(),
        })?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Number of pages in the document at `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidInput`] if `input` is not a readable
    /// PDF.
    pub fn page_count(&self, input: &Path) -> Result<usize> {
        let document = self.open(input)?;
        Ok(document.pages().len() as usize)
    }

    /// Export every page of `input` as a PNG file.
    ///
    /// Pages are rasterized sequentially in document order at the configured
    /// DPI and written to the output directory as
    /// `<input filename>-<page index>.png`, zero-based. The
    /// returned list is in page order, one entry per page; a document with
    /// zero pages yields an empty list. Re-running on the same input
    /// overwrites the previous files.
    ///
    /// If a font override is configured it is registered into the document
    /// before any page is rendered; a missing or unreadable font file fails
    /// the whole export.
    ///
    /// # Errors
    ///
    /// On a per-page failure, files already written stay on disk and the
    /// error carries their [`PageFile`] entries
    /// ([`ExportError::completed_pages`]). Every failure is also logged at
    /// error level with the input filename.
    pub fn export(&self, input: &Path, options: &ExportOptions) -> Result<Vec<PageFile>> {
        let result = self.export_pages(input, options);
        if let Err(err) = &result {
            error!("render image error [{}]: {err}", input.display());
        }
        result
    }

    fn export_pages(&self, input: &Path, options: &ExportOptions) -> Result<Vec<PageFile>> {
        if options.dpi() == 0 {
            return Err(ExportError::InvalidParameter(
                "dpi must be at least 1".to_string(),
            ));
        }
        let file_name = match input.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => {
                return Err(ExportError::InvalidInput {
                    path: input.to_path_buf(),
                    reason: "path has no file name".to_string(),
                })
            }
        };

        let mut document = self.open(input)?;
        if let Some(font) = options.font_override() {
            preload_font(&mut document, font)?;
        }

        let page_count = document.pages().len() as usize;
        debug!(
            "rendering {page_count} pages from {} at {} dpi",
            input.display(),
            options.dpi()
        );

        fs::create_dir_all(options.output_dir())?;

        let mut written = Vec::with_capacity(page_count);
        for (index, page) in document.pages().iter().enumerate() {
            let width_pts = page.width().value;
            let height_pts = page.height().value;
            let (width, height) = options.pixel_size(width_pts, height_pts);

            let config = PdfRenderConfig::new()
                .set_target_width(width as i32)
                .set_target_height(height as i32)
                .render_form_data(true)
                .render_annotations(true);

            let bitmap = match page.render_with_config(&config) {
                Ok(bitmap) => bitmap,
                Err(e) => {
                    return Err(ExportError::RenderFailure {
                        index,
                        reason: e.to_string(),
                        completed: written,
                    })
                }
            };

            let mut image = bitmap.as_image();
            if let Some(region) = options.region() {
                image = crop_to_region(&image, region, options.dpi());
            }
            let rgb = image.into_rgb8();
            let (out_width, out_height) = rgb.dimensions();

            let path = options.output_dir().join(page_file_name(&file_name, index));
            trace!("page {index}: {width_pts}x{height_pts} pt -> {out_width}x{out_height} px -> {}", path.display());

            if let Err(reason) =
                encode::write_png(&path, rgb.as_raw(), out_width, out_height, options.dpi())
            {
                return Err(ExportError::EncodeFailure {
                    index,
                    path,
                    reason,
                    completed: written,
                });
            }

            written.push(PageFile {
                page_index: index,
                path,
                width: out_width,
                height: out_height,
            });
        }

        debug!(
            "wrote {} files to {}",
            written.len(),
            options.output_dir().display()
        );
        Ok(written)
    }

    fn open(&self, input: &Path) -> Result<PdfDocument<'_>> {
        if !input.exists() {
            return Err(ExportError::InvalidInput {
                path: input.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }
        if !input.is_file() {
            return Err(ExportError::InvalidInput {
                path: input.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }
        self.pdfium
            .load_pdf_from_file(input, None)
            .map_err(|e| ExportError::InvalidInput {
                path: input.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

/// Register the replacement font into the document's font table.
///
/// The data is loaded as a CID-keyed TrueType face, the format of the CJK
/// faces (e.g. STSong-Light) whose glyph mappings the renderer cannot
/// resolve on its own.
fn preload_font(document: &mut PdfDocument<'_>, font: &FontOverride) -> Result<()> {
    let data = fs::read(&font.path).map_err(|e| ExportError::FontOverride {
        name: font.name.clone(),
        path: font.path.clone(),
        reason: e.to_string(),
    })?;

    document
        .fonts_mut()
        .load_true_type_from_bytes(&data, true)
        .map_err(|e| ExportError::FontOverride {
            name: font.name.clone(),
            path: font.path.clone(),
            reason: e.to_string(),
        })?;

    debug!(
        "preloaded replacement font {:?} from {}",
        font.name,
        font.path.display()
    );
    Ok(())
}

/// Crop a rendered page to the configured region, clamped to the page.
fn crop_to_region(image: &DynamicImage, region: PageRegion, dpi: u32) -> DynamicImage {
    let (x, y, width, height) = region.to_pixels(dpi, image.width(), image.height());
    image.crop_imm(x, y, width, height)
}

/// Output file name for one page: the full input filename (extension
/// included), a hyphen, the zero-based page index, and `.png`.
fn page_file_name(input_file_name: &str, index: usize) -> String {
    format!("{input_file_name}-{index}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_file_name_keeps_the_full_input_name() {
        assert_eq!(page_file_name("sample.pdf", 0), "sample.pdf-0.png");
        assert_eq!(page_file_name("sample.pdf", 12), "sample.pdf-12.png");
    }

    #[test]
    fn page_file_name_survives_dots_and_non_ascii() {
        assert_eq!(page_file_name("a.b.pdf", 1), "a.b.pdf-1.png");
        assert_eq!(page_file_name("说明书.pdf", 2), "说明书.pdf-2.png");
        assert_eq!(page_file_name("no-extension", 0), "no-extension-0.png");
    }
}
