//! PNG serialization with physical-resolution metadata.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use png::{BitDepth, ColorType, Encoder, PixelDimensions, Unit};

/// pHYs resolution for a DPI value, in pixels per meter (1 inch = 2.54 cm).
///
/// 300 DPI maps to 11811 px/m.
pub(crate) fn pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) * 100.0 / 2.54).round() as u32
}

/// Write an 8-bit RGB pixel buffer to `path` as a PNG tagged with the
/// physical resolution it was rendered at.
///
/// `pixels` must hold exactly `width * height * 3` bytes in row-major order.
/// The error value is the underlying cause as text; the caller adds page and
/// file context.
pub(crate) fn write_png(
    path: &Path,
    pixels: &[u8],
    width: u32,
    height: u32,
    dpi: u32,
) -> std::result::Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);

    let ppm = pixels_per_meter(dpi);
    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_pixel_dims(Some(PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: Unit::Meter,
    }));

    let mut png_writer = encoder.write_header().map_err(|e| e.to_string())?;
    png_writer.write_image_data(pixels).map_err(|e| e.to_string())?;

    Ok(())
}
