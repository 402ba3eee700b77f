use image::{GrayImage, Luma, Rgba, RgbaImage};

/// BT.601 luma of one pixel, rounded to the nearest level
fn luma(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = pixel.0;
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

pub trait Preprocessor {
    // Default: gray out every pixel, keep alpha
    fn process(&self, image: &RgbaImage) -> RgbaImage {
        let mut out = image.clone();
        for pixel in out.pixels_mut() {
            let y = luma(pixel);
            pixel.0 = [y, y, y, pixel.0[3]];
        }
        out
    }
}

/// Grayscale pass run on captures before decoding
pub struct LumaPreprocessor;
impl Preprocessor for LumaPreprocessor {}

pub fn to_grayscale(image: &RgbaImage) -> RgbaImage {
    LumaPreprocessor.process(image)
}

/// Single-channel luma plane, the form the decoder consumes
pub fn to_luma(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luma(image.get_pixel(x, y))])
    })
}
