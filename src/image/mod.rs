//! Image intake and image value types.

pub mod intake;
mod types;

pub use intake::{decode_data_url, encode_bytes, read_file, IntakePolicy, DEFAULT_MAX_UPLOAD_BYTES};
pub use types::{EncodedImage, GeneratedImage, ImageFormat, OUTPUT_MEDIA_TYPE};
