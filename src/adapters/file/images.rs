use std::path::Path;

use image::RgbImage;

use crate::domain::errors::{DomainError, DomainResult};

/// Carga una imagen de disco en RGB, sea cual sea su formato.
pub fn load_rgb(path: &Path) -> DomainResult<RgbImage> {
    if !path.exists() {
        return Err(DomainError::NotFound(path.display().to_string()));
    }
    let img = image::open(path)
        .map_err(|e| DomainError::InvalidInput(format!("{}: {e}", path.display())))?;
    Ok(img.to_rgb8())
}
