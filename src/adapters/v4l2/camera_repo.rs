use async_trait::async_trait;
use v4l::Device;

use crate::application::ports::CameraCatalogPort;
use crate::domain::camera::{CameraId, CameraInfo};
use crate::domain::errors::DomainResult;

/// Inventario de los nodos `/dev/video*` que responden a `QUERYCAP`.
#[derive(Default)]
pub struct V4l2CameraCatalog;

impl V4l2CameraCatalog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CameraCatalogPort for V4l2CameraCatalog {
    async fn list_cameras(&self) -> DomainResult<Vec<CameraInfo>> {
        let mut out = Vec::new();
        for node in v4l::context::enum_devices() {
            let path = node.path().to_string_lossy().to_string();
            let caps = match Device::with_path(&path).and_then(|dev| dev.query_caps()) {
                Ok(caps) => caps,
                Err(e) => {
                    tracing::debug!("Ignorando {}: {}", path, e);
                    continue;
                }
            };
            out.push(CameraInfo {
                id: CameraId { path },
                name: node.name().unwrap_or_else(|| "Unknown".to_string()),
                driver: caps.driver,
                card: caps.card,
                bus: caps.bus,
            });
        }
        Ok(out)
    }
}
