use std::panic::{self, AssertUnwindSafe};

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};

use crate::error::DecodeError;
use crate::grayscale::to_luma;

/// Smallest edge worth a downscaled pass (a version 1 symbol is 21 modules)
const MIN_DOWNSCALED_EDGE: u32 = 21;

/// Largest edge that still gets a 2x upscaled pass
const MAX_UPSCALED_EDGE: u32 = 1024;

#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Retry with inverted, upscaled and half-resolution images when the plain pass finds nothing
    pub try_harder: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { try_harder: true }
    }
}

fn decode_luma(gray: &GrayImage) -> Option<String> {
    // rqrr asserts on symbols drawn at one pixel per module
    match panic::catch_unwind(AssertUnwindSafe(|| scan_grids(gray))) {
        Ok(found) => found,
        Err(_) => {
            tracing::warn!(
                "QR detector failed on {}x{} image, treating as not found",
                gray.width(),
                gray.height()
            );
            None
        }
    }
}

fn scan_grids(gray: &GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        gray.width() as usize,
        gray.height() as usize,
        |x, y| gray.get_pixel(x as u32, y as u32).0[0],
    );

    let grids = prepared.detect_grids();
    tracing::debug!("Detected {} QR grid(s)", grids.len());

    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => return Some(content),
            Err(e) => tracing::debug!("QR grid found but failed to decode: {:?}", e),
        }
    }

    None
}

/// Decode the first QR code in `image`.
///
/// `Ok(None)` means no symbol was found, which is an expected outcome.
pub fn decode(image: &RgbaImage, options: DecodeOptions) -> Result<Option<String>, DecodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    let gray = to_luma(image);
    if let Some(text) = decode_luma(&gray) {
        return Ok(Some(text));
    }

    if !options.try_harder {
        return Ok(None);
    }

    tracing::debug!("Plain pass found nothing, trying inverted image");
    let mut inverted = gray.clone();
    imageops::invert(&mut inverted);
    if let Some(text) = decode_luma(&inverted) {
        return Ok(Some(text));
    }

    if width <= MAX_UPSCALED_EDGE && height <= MAX_UPSCALED_EDGE {
        tracing::debug!("Trying 2x upscaled image");
        let doubled = imageops::resize(&gray, width * 2, height * 2, FilterType::Nearest);
        if let Some(text) = decode_luma(&doubled) {
            return Ok(Some(text));
        }
    }

    if width / 2 >= MIN_DOWNSCALED_EDGE && height / 2 >= MIN_DOWNSCALED_EDGE {
        tracing::debug!("Trying half-resolution image");
        let half = imageops::resize(&gray, width / 2, height / 2, FilterType::Triangle);
        if let Some(text) = decode_luma(&half) {
            return Ok(Some(text));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::encode::render;

    #[test]
    fn test_round_trip() {
        for text in ["https://example.com", "Test QR Code Content", "12345", "MIXED case & symbols: 100%"] {
            let image = render(text).unwrap();
            let decoded = decode(&image, DecodeOptions::default()).unwrap();
            assert_eq!(decoded.as_deref(), Some(text));
        }
    }

    #[test]
    fn test_round_trip_near_capacity() {
        // 1273 bytes is the most a version 40 symbol holds at level H
        for len in [800, 1000, 1273] {
            let text = "a".repeat(len);
            let image = render(&text).unwrap();
            let decoded = decode(&image, DecodeOptions::default()).unwrap();
            assert_eq!(decoded.as_deref(), Some(text.as_str()), "length {len}");
        }
    }

    #[test]
    fn test_dense_code_without_try_harder_does_not_panic() {
        let text = "z".repeat(1100);
        let image = render(&text).unwrap();
        // One pixel per module: the plain pass may miss it but must return
        if let Some(found) = decode(&image, DecodeOptions { try_harder: false }).unwrap() {
            assert_eq!(found, text);
        }
    }

    #[test]
    fn test_finds_code_inside_larger_capture() {
        let code = render("embedded").unwrap();
        let mut screen = RgbaImage::from_pixel(800, 600, Rgba([200, 180, 160, 255]));
        imageops::overlay(&mut screen, &code, 250, 120);

        let decoded = decode(&screen, DecodeOptions::default()).unwrap();
        assert_eq!(decoded.as_deref(), Some("embedded"));
    }

    #[test]
    fn test_inverted_code_needs_try_harder() {
        let mut code = render("inverted").unwrap();
        imageops::invert(&mut code);

        let decoded = decode(&code, DecodeOptions::default()).unwrap();
        assert_eq!(decoded.as_deref(), Some("inverted"));
    }

    #[test]
    fn test_blank_image_is_not_found() {
        let blank = RgbaImage::from_pixel(300, 300, Rgba([255, 255, 255, 255]));
        assert_eq!(decode(&blank, DecodeOptions::default()).unwrap(), None);
        assert_eq!(decode(&blank, DecodeOptions { try_harder: false }).unwrap(), None);
    }

    #[test]
    fn test_empty_image_is_an_error() {
        let empty = RgbaImage::new(0, 0);
        assert!(matches!(
            decode(&empty, DecodeOptions::default()),
            Err(DecodeError::EmptyImage { .. })
        ));
    }
}
