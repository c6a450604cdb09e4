use chrono::Local;
use tracing::debug;

use crate::{
    application::{
        sampling::FpsMeter,
        services::{Stage, Watch},
    },
    domain::{errors::DomainResult, geometry::{Anchor, WHITE}, stream::FrameMeta},
};

/// Vista previa sin API de visión: hora y logotipo sobre la cámara.
pub struct PreviewWatch {
    stage: Stage,
    fps: FpsMeter,
}

impl PreviewWatch {
    pub fn new(stage: Stage) -> Self {
        Self { stage, fps: FpsMeter::new() }
    }
}

impl Watch for PreviewWatch {
    fn name(&self) -> &'static str {
        "preview"
    }

    fn step(&mut self) -> DomainResult<()> {
        let mut frame = self.stage.source.next_frame()?;
        let clock = Local::now().format("%H:%M").to_string();
        self.stage
            .overlay
            .overlay_text(&mut frame, &clock, Anchor::new(20, 20), WHITE, false);
        self.stage.stamp_logo(&mut frame);

        let (instant, _) = self.fps.tick();
        debug!("Frame Rate: {:.1} FPS (Average: {:.1} FPS)", instant, self.fps.average());

        let meta = FrameMeta {
            width: frame.width(),
            height: frame.height(),
            vision_ms: 0.0,
            fps_est: self.fps.estimate(),
            sampled: false,
            detections: Vec::new(),
        };
        self.stage.display.show_frame(&frame, meta);
        Ok(())
    }
}
