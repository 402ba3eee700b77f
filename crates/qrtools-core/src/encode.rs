//! QR code generation in PNG and SVG form.
//!
//! Codes are always built at high error correction. Rasters are a fixed
//! 300x300 RGBA canvas so saved files have a predictable size.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};

use crate::error::EncodeError;

/// Edge length of generated rasters, in pixels
pub const QR_IMAGE_SIZE: u32 = 300;

/// Light border around the symbol, in modules
const QUIET_ZONE: u32 = 4;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedQr {
    Png(Vec<u8>),
    Svg(String),
}

impl EncodedQr {
    pub fn format(&self) -> OutputFormat {
        match self {
            EncodedQr::Png(_) => OutputFormat::Png,
            EncodedQr::Svg(_) => OutputFormat::Svg,
        }
    }

    /// File contents to write to disk
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EncodedQr::Png(bytes) => bytes,
            EncodedQr::Svg(markup) => markup.as_bytes(),
        }
    }
}

fn build_code(text: &str) -> Result<QrCode, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::EmptyContent);
    }

    QrCode::with_error_correction_level(text.as_bytes(), EcLevel::H).map_err(|e| match e {
        QrError::DataTooLong => EncodeError::TooLong { len: text.len() },
        other => EncodeError::Codec(other.to_string()),
    })
}

/// Rasterize `text` onto a 300x300 white canvas.
///
/// Modules are scaled by the largest whole factor that fits the symbol plus
/// its quiet zone, then centered.
pub fn render(text: &str) -> Result<RgbaImage, EncodeError> {
    let code = build_code(text)?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let total = modules + 2 * QUIET_ZONE;
    let scale = (QR_IMAGE_SIZE / total).max(1);
    let offset = (QR_IMAGE_SIZE.saturating_sub(total * scale)) / 2 + QUIET_ZONE * scale;

    let mut image = RgbaImage::from_pixel(QR_IMAGE_SIZE, QR_IMAGE_SIZE, LIGHT);
    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }

        let mx = i as u32 % modules;
        let my = i as u32 / modules;
        for dy in 0..scale {
            for dx in 0..scale {
                let px = offset + mx * scale + dx;
                let py = offset + my * scale + dy;
                if px < QR_IMAGE_SIZE && py < QR_IMAGE_SIZE {
                    image.put_pixel(px, py, DARK);
                }
            }
        }
    }

    tracing::debug!(
        "Rendered {} bytes as {}x{} modules at scale {}",
        text.len(),
        modules,
        modules,
        scale
    );
    Ok(image)
}

pub fn encode(text: &str, format: OutputFormat) -> Result<EncodedQr, EncodeError> {
    match format {
        OutputFormat::Png => {
            let image = render(text)?;
            let mut png_bytes = Vec::new();
            DynamicImage::ImageRgba8(image)
                .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
            Ok(EncodedQr::Png(png_bytes))
        }
        OutputFormat::Svg => {
            let code = build_code(text)?;
            let markup = code
                .render()
                .min_dimensions(QR_IMAGE_SIZE, QR_IMAGE_SIZE)
                .dark_color(svg::Color("#000000"))
                .light_color(svg::Color("#ffffff"))
                .build();
            Ok(EncodedQr::Svg(markup))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_fixed_size() {
        let image = render("https://example.com").unwrap();
        assert_eq!(image.width(), QR_IMAGE_SIZE);
        assert_eq!(image.height(), QR_IMAGE_SIZE);
    }

    #[test]
    fn test_render_has_quiet_zone_and_dark_modules() {
        let image = render("Test QR Code").unwrap();
        assert_eq!(*image.get_pixel(0, 0), LIGHT);
        assert_eq!(*image.get_pixel(QR_IMAGE_SIZE - 1, QR_IMAGE_SIZE - 1), LIGHT);
        assert!(image.pixels().any(|p| *p == DARK));
    }

    #[test]
    fn test_png_output_decodes_as_300_square() {
        let encoded = encode("https://example.com", OutputFormat::Png).unwrap();
        assert_eq!(encoded.format(), OutputFormat::Png);

        let decoded = image::load_from_memory(encoded.as_bytes()).unwrap();
        assert_eq!(decoded.width(), 300);
        assert_eq!(decoded.height(), 300);
    }

    #[test]
    fn test_svg_output() {
        let encoded = encode("hello", OutputFormat::Svg).unwrap();
        let EncodedQr::Svg(markup) = encoded else {
            panic!("expected svg output");
        };
        assert!(markup.contains("<svg"));
        assert!(markup.contains("#000000"));
    }

    #[test]
    fn test_deterministic() {
        for format in [OutputFormat::Png, OutputFormat::Svg] {
            let a = encode("same text every time", format).unwrap();
            let b = encode("same text every time", format).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_too_long_is_rejected() {
        // Byte mode at level H tops out at 1273 bytes
        let text = "x".repeat(1300);
        let err = encode(&text, OutputFormat::Png).unwrap_err();
        assert!(matches!(err, EncodeError::TooLong { len: 1300 }));
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(render(""), Err(EncodeError::EmptyContent)));
    }

    #[test]
    fn test_extension() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Svg.extension(), "svg");
    }
}
