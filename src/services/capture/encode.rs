use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder};

use super::{CaptureError, source::RgbFrame};

/// Encodes a frame as a JPEG data URL, the shape the analyzer ingests.
///
/// # Errors
/// Returns error if JPEG encoding fails (malformed dimensions).
pub fn frame_to_jpeg_data_url(frame: &RgbFrame, quality: u8) -> Result<String, CaptureError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .write_image(
            &frame.data,
            frame.width,
            frame.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    let mut url = String::from("data:image/jpeg;base64,");
    STANDARD.encode_string(&jpeg, &mut url);
    Ok(url)
}

/// Encodes f32 samples as base64 over their little-endian byte layout.
pub fn samples_to_base64(samples: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    STANDARD.encode(bytes)
}
