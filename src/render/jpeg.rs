use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};

use crate::domain::errors::{DomainError, DomainResult};

/// Comprime un frame RGB a JPEG con la calidad indicada (1..=100).
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> DomainResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut enc = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    enc.encode(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| DomainError::OperationFailed(format!("codificación JPEG: {e}")))?;
    Ok(buf)
}
