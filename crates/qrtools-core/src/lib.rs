pub mod classify;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filename;
pub mod grayscale;

pub use classify::{ResultKind, classify};
pub use decode::{DecodeOptions, decode};
pub use encode::{EncodedQr, OutputFormat, QR_IMAGE_SIZE, encode, render};
pub use error::{DecodeError, EncodeError};
pub use filename::{auto_save_file_name, unique_path};
pub use grayscale::{LumaPreprocessor, Preprocessor, to_grayscale, to_luma};
