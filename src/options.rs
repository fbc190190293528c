//! Export configuration: resolution, output location, font override, region.

use crate::error::{ExportError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default rasterization resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 300;

/// PDF points per inch - standard PostScript/PDF unit conversion factor.
pub(crate) const POINTS_PER_INCH: f32 = 72.0;

/// A replacement font registered into a document before rendering.
///
/// Exists to counter glyph-mapping defects in CID-keyed CJK faces such as
/// STSong-Light: without a substitute the renderer silently drops or garbles
/// those glyphs. The replacement file is loaded as a CID-keyed TrueType face.
/// A missing or unreadable font file fails the export before any page is
/// rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontOverride {
    /// Face name the replacement stands in for (e.g. `"STSong-Light"`).
    pub name: String,
    /// Path to the replacement TrueType font file.
    pub path: PathBuf,
}

impl FontOverride {
    /// Create a font override from a face name and a font file path.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl FromStr for FontOverride {
    type Err = ExportError;

    /// Parse `NAME=PATH`, e.g. `STSong-Light=fonts/chinese.stsong.ttf`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, path) = s.split_once('=').ok_or_else(|| {
            ExportError::InvalidParameter(format!("font override must be NAME=PATH, got {s:?}"))
        })?;
        if name.is_empty() || path.is_empty() {
            return Err(ExportError::InvalidParameter(format!(
                "font override must be NAME=PATH with both parts non-empty, got {s:?}"
            )));
        }
        Ok(Self::new(name, path))
    }
}

/// A sub-rectangle of a page in points, origin at the top-left corner.
///
/// Used to rasterize only part of each page (for example a header strip)
/// instead of the full page. Coordinates are clamped to the page bounds at
/// render time, so an oversized region degrades to the full page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageRegion {
    /// Create a region from its top-left corner and size, all in points.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel rectangle `(x, y, width, height)` for this region at the given
    /// DPI, clamped to a page of `page_width` x `page_height` pixels. Always
    /// at least one pixel in each direction.
    pub(crate) fn to_pixels(self, dpi: u32, page_width: u32, page_height: u32) -> (u32, u32, u32, u32) {
        let scale = dpi as f32 / POINTS_PER_INCH;
        let x = ((self.x * scale).round().max(0.0) as u32).min(page_width.saturating_sub(1));
        let y = ((self.y * scale).round().max(0.0) as u32).min(page_height.saturating_sub(1));
        let width = ((self.width * scale).round().max(1.0) as u32).min(page_width - x);
        let height = ((self.height * scale).round().max(1.0) as u32).min(page_height - y);
        (x, y, width, height)
    }
}

impl FromStr for PageRegion {
    type Err = ExportError;

    /// Parse `X,Y,WxH` in points, e.g. `0,0,960x120`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        let &[x, y, size] = parts.as_slice() else {
            return Err(ExportError::InvalidParameter(format!(
                "region must be X,Y,WxH, got {s:?}"
            )));
        };
        let (width, height) = size.split_once('x').ok_or_else(|| {
            ExportError::InvalidParameter(format!("region size must be WxH, got {size:?}"))
        })?;

        let region = Self::new(
            parse_points(x, "x")?,
            parse_points(y, "y")?,
            parse_points(width, "width")?,
            parse_points(height, "height")?,
        );
        if region.width <= 0.0 || region.height <= 0.0 {
            return Err(ExportError::InvalidParameter(format!(
                "region size must be positive, got {s:?}"
            )));
        }
        Ok(region)
    }
}

fn parse_points(s: &str, what: &str) -> Result<f32> {
    let value: f32 = s.trim().parse().map_err(|_| {
        ExportError::InvalidParameter(format!("region {what} {s:?} is not a number"))
    })?;
    if value < 0.0 {
        return Err(ExportError::InvalidParameter(format!(
            "region {what} must not be negative, got {s:?}"
        )));
    }
    Ok(value)
}

/// Configuration for an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    dpi: u32,
    output_dir: PathBuf,
    font_override: Option<FontOverride>,
    region: Option<PageRegion>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            output_dir: PathBuf::from("."),
            font_override: None,
            region: None,
        }
    }
}

impl ExportOptions {
    /// Create export options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rasterization resolution.
    ///
    /// Default: 300 DPI
    pub fn set_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the directory that receives the PNG files.
    ///
    /// Default: the current working directory. Created if absent.
    pub fn set_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Preload a replacement font before rendering.
    pub fn set_font_override(mut self, font: FontOverride) -> Self {
        self.font_override = Some(font);
        self
    }

    /// Rasterize only the given page region instead of the full page.
    pub fn set_region(mut self, region: PageRegion) -> Self {
        self.region = Some(region);
        self
    }

    /// Get the DPI setting.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Get the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Get the font override, if any.
    pub fn font_override(&self) -> Option<&FontOverride> {
        self.font_override.as_ref()
    }

    /// Get the page region, if any.
    pub fn region(&self) -> Option<PageRegion> {
        self.region
    }

    /// Output pixel dimensions for a page of the given size in points.
    ///
    /// Scale is `dpi / 72`; each axis rounds to the nearest pixel, minimum 1.
    pub(crate) fn pixel_size(&self, page_width: f32, page_height: f32) -> (u32, u32) {
        let scale = self.dpi as f32 / POINTS_PER_INCH;
        let width = (page_width * scale).round().max(1.0) as u32;
        let height = (page_height * scale).round().max(1.0) as u32;
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ExportOptions::new();
        assert_eq!(options.dpi(), 300);
        assert_eq!(options.output_dir(), Path::new("."));
        assert!(options.font_override().is_none());
        assert!(options.region().is_none());
    }

    #[test]
    fn setters_chain() {
        let options = ExportOptions::new()
            .set_dpi(150)
            .set_output_dir("out")
            .set_font_override(FontOverride::new("STSong-Light", "stsong.ttf"))
            .set_region(PageRegion::new(0.0, 0.0, 960.0, 120.0));
        assert_eq!(options.dpi(), 150);
        assert_eq!(options.output_dir(), Path::new("out"));
        assert_eq!(
            options.font_override(),
            Some(&FontOverride::new("STSong-Light", "stsong.ttf"))
        );
        assert_eq!(options.region(), Some(PageRegion::new(0.0, 0.0, 960.0, 120.0)));
    }

    #[test]
    fn pixel_size_us_letter_at_300_dpi() {
        let options = ExportOptions::new();
        assert_eq!(options.pixel_size(612.0, 792.0), (2550, 3300));
    }

    #[test]
    fn pixel_size_rounds_to_nearest() {
        // 200 x 100 pt at 300 DPI: 833.33 x 416.67
        let options = ExportOptions::new();
        assert_eq!(options.pixel_size(200.0, 100.0), (833, 417));
    }

    #[test]
    fn pixel_size_never_collapses_to_zero() {
        let options = ExportOptions::new().set_dpi(1);
        assert_eq!(options.pixel_size(0.5, 0.5), (1, 1));
    }

    #[test]
    fn font_override_parses_name_and_path() {
        let font: FontOverride = "STSong-Light=fonts/chinese.stsong.ttf".parse().unwrap();
        assert_eq!(font.name, "STSong-Light");
        assert_eq!(font.path, PathBuf::from("fonts/chinese.stsong.ttf"));
    }

    #[test]
    fn font_override_allows_equals_in_path() {
        let font: FontOverride = "A=b=c.ttf".parse().unwrap();
        assert_eq!(font.name, "A");
        assert_eq!(font.path, PathBuf::from("b=c.ttf"));
    }

    #[test]
    fn font_override_rejects_malformed_pairs() {
        assert!("no-separator".parse::<FontOverride>().is_err());
        assert!("=path-only.ttf".parse::<FontOverride>().is_err());
        assert!("name-only=".parse::<FontOverride>().is_err());
    }

    #[test]
    fn region_parses_points() {
        let region: PageRegion = "0,0,960x120".parse().unwrap();
        assert_eq!(region, PageRegion::new(0.0, 0.0, 960.0, 120.0));

        let region: PageRegion = "10.5, 20, 30.25x40".parse().unwrap();
        assert_eq!(region, PageRegion::new(10.5, 20.0, 30.25, 40.0));
    }

    #[test]
    fn region_rejects_malformed_input() {
        assert!("0,0".parse::<PageRegion>().is_err());
        assert!("0,0,960".parse::<PageRegion>().is_err());
        assert!("0,0,960x".parse::<PageRegion>().is_err());
        assert!("a,0,960x120".parse::<PageRegion>().is_err());
        assert!("-1,0,960x120".parse::<PageRegion>().is_err());
        assert!("0,0,0x120".parse::<PageRegion>().is_err());
    }

    #[test]
    fn region_scales_and_clamps_to_page() {
        let region = PageRegion::new(0.0, 0.0, 960.0, 120.0);
        // US Letter at 300 DPI is 2550 x 3300 px; 960 pt would be 4000 px.
        assert_eq!(region.to_pixels(300, 2550, 3300), (0, 0, 2550, 500));

        let inside = PageRegion::new(72.0, 72.0, 72.0, 72.0);
        assert_eq!(inside.to_pixels(300, 2550, 3300), (300, 300, 300, 300));
    }

    #[test]
    fn region_off_page_degrades_to_a_sliver() {
        let region = PageRegion::new(10_000.0, 10_000.0, 50.0, 50.0);
        let (x, y, width, height) = region.to_pixels(300, 2550, 3300);
        assert_eq!((x, y), (2549, 3299));
        assert_eq!((width, height), (1, 1));
    }
}
