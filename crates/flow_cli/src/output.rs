//! Film encoding.
//!
//! - `.png`: gamma 2 and clamped to 8 bits per channel
//! - `.exr`, `.hdr`: linear float, untouched

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{bail, Context, Result};
use flow_renderer::{Color, Film};
use image::codecs::hdr::HdrEncoder;
use image::{DynamicImage, Rgb, Rgb32FImage, RgbImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Exr,
    Hdr,
}

impl OutputFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("exr") => Ok(OutputFormat::Exr),
            Some("hdr") => Ok(OutputFormat::Hdr),
            _ => bail!(
                "unsupported output '{}': expected a .png, .exr or .hdr file",
                path.display()
            ),
        }
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    color.to_array().map(|c| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8)
}

/// 8-bit display image of the film.
pub fn to_rgb8(film: &Film) -> RgbImage {
    RgbImage::from_fn(film.width(), film.height(), |x, y| Rgb(color_to_rgb(film.get(x, y))))
}

/// Linear float image of the film.
pub fn to_rgb32f(film: &Film) -> Rgb32FImage {
    Rgb32FImage::from_fn(film.width(), film.height(), |x, y| Rgb(film.get(x, y).to_array()))
}

/// Write the film to `path` in the format named by its extension.
pub fn save(film: &Film, path: &Path) -> Result<()> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Png => to_rgb8(film).save(path)?,
        OutputFormat::Exr => DynamicImage::ImageRgb32F(to_rgb32f(film)).save(path)?,
        OutputFormat::Hdr => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let pixels: Vec<Rgb<f32>> = to_rgb32f(film).pixels().copied().collect();
            HdrEncoder::new(BufWriter::new(file)).encode(
                &pixels,
                film.width() as usize,
                film.height() as usize,
            )?;
        }
    }

    log::info!("Wrote {}", path.display());
    Ok(())
}
