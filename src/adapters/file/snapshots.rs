use std::path::PathBuf;

use image::RgbImage;

use crate::application::ports::SnapshotStore;
use crate::domain::errors::{DomainError, DomainResult};
use crate::render::encode_jpeg;

/// Fotos JPEG en un directorio, creado al guardar la primera.
pub struct FsSnapshotStore {
    dir: PathBuf,
    quality: u8,
}

impl FsSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, quality: u8) -> Self {
        Self { dir: dir.into(), quality }
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn save(&self, image: &RgbImage, stem: &str) -> DomainResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| DomainError::OperationFailed(format!("{}: {e}", self.dir.display())))?;
        let path = self.dir.join(format!("{stem}.jpg"));
        let jpeg = encode_jpeg(image, self.quality)?;
        std::fs::write(&path, jpeg)
            .map_err(|e| DomainError::OperationFailed(format!("{}: {e}", path.display())))?;
        tracing::info!("💾 Foto guardada en {}", path.display());
        Ok(path)
    }
}
