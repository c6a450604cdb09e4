use std::path::PathBuf;

use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{
    camera::{CameraInfo, FrameSize},
    detection::{Detection, Feature},
    errors::DomainResult,
    stream::FrameMeta,
    threat::ThreatAlert,
};

#[async_trait]
pub trait CameraCatalogPort: Send + Sync {
    async fn list_cameras(&self) -> DomainResult<Vec<CameraInfo>>;
}

/// Origen de frames. Se usa desde el hilo de captura, por eso no exige `Send`.
pub trait FrameSource {
    /// Siguiente frame a la resolución de vista previa.
    fn next_frame(&mut self) -> DomainResult<RgbImage>;
    /// Foto a resolución completa.
    fn capture_still(&mut self) -> DomainResult<RgbImage>;
    fn frame_size(&self) -> FrameSize;
}

#[async_trait]
pub trait VisionPort: Send + Sync {
    /// Envía un JPEG a la API y devuelve las detecciones de la operación pedida.
    async fn annotate(&self, jpeg: &[u8], feature: Feature, max_results: u32) -> DomainResult<Vec<Detection>>;
}

/// Salida de vídeo: la vista previa en directo y las fotos puntuales.
pub trait DisplayPort: Send + Sync {
    fn show_frame(&self, frame: &RgbImage, meta: FrameMeta);
    fn show_still(&self, still: &RgbImage, caption: &str);
}

pub trait AlertPort: Send + Sync {
    fn raise(&self, alert: &ThreatAlert) -> DomainResult<()>;
}

pub trait SirenPort: Send + Sync {
    fn sound(&self) -> DomainResult<()>;
}

pub trait SnapshotStore: Send + Sync {
    /// Guarda la imagen como JPEG y devuelve la ruta final.
    fn save(&self, image: &RgbImage, stem: &str) -> DomainResult<PathBuf>;
}
