#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Content is empty")]
    EmptyContent,

    #[error("Content too long for a QR code at high error correction ({len} bytes)")]
    TooLong { len: usize },

    #[error("QR encoding failed: {0}")]
    Codec(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}
