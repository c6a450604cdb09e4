use std::time::Duration;

use image::{imageops::FilterType, RgbImage};

use crate::application::ports::FrameSource;
use crate::domain::camera::FrameSize;
use crate::domain::errors::DomainResult;

/// Repite una imagen fija como si fuera la cámara. Útil sin hardware.
pub struct FileFrameSource {
    full: RgbImage,
    preview: RgbImage,
    interval: Duration,
}

impl FileFrameSource {
    /// `scale` divide la resolución de la vista previa; las fotos salen a
    /// tamaño completo.
    pub fn new(full: RgbImage, scale: u32) -> DomainResult<Self> {
        let size = FrameSize::scaled(FrameSize { width: full.width(), height: full.height() }, scale)?;
        let preview = if scale == 1 {
            full.clone()
        } else {
            image::imageops::resize(&full, size.width.max(1), size.height.max(1), FilterType::Triangle)
        };
        Ok(Self { full, preview, interval: Duration::ZERO })
    }

    /// Espera entre frames para imitar la cadencia de una cámara.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.interval = if fps == 0 { Duration::ZERO } else { Duration::from_secs(1) / fps };
        self
    }
}

impl FrameSource for FileFrameSource {
    fn next_frame(&mut self) -> DomainResult<RgbImage> {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
        Ok(self.preview.clone())
    }

    fn capture_still(&mut self) -> DomainResult<RgbImage> {
        Ok(self.full.clone())
    }

    fn frame_size(&self) -> FrameSize {
        FrameSize { width: self.preview.width(), height: self.preview.height() }
    }
}
