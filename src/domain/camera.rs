// src/domain/camera.rs
use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraId { pub path: String }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraInfo {
    pub id: CameraId,
    pub name: String,
    pub card: String,
    pub driver: String,
    pub bus: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Resolución reducida `full / factor` para ahorrar ancho de banda.
    pub fn scaled(full: FrameSize, factor: u32) -> DomainResult<FrameSize> {
        if factor == 0 {
            return Err(DomainError::InvalidInput("el factor de escala debe ser mayor que 0".into()));
        }
        Ok(FrameSize {
            width: full.width / factor,
            height: full.height / factor,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureMode {
    pub format: String,
    pub size: FrameSize,
    pub fps: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preview_is_quarter_resolution() {
        let full = FrameSize { width: 1920, height: 1080 };
        assert_eq!(FrameSize::scaled(full, 4).unwrap(), FrameSize { width: 480, height: 270 });
        assert_eq!(FrameSize::scaled(full, 1).unwrap(), full);
        assert!(FrameSize::scaled(full, 0).is_err());
    }
}
