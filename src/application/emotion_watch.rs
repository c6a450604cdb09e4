use chrono::Local;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use crate::{
    application::{
        sampling::{FpsMeter, Sampler},
        services::{Stage, VisionSession, Watch},
    },
    domain::{
        detection::{Feature, VertexSpace},
        errors::DomainResult,
        faces::{eyebrow_band, EmotionGroups},
        geometry::{bounding_box, outline_points, Anchor, Size, BLACK, WHITE},
        stream::FrameMeta,
    },
    render::{Caption, HighlightStyle},
};

const GREEN: [u8; 3] = [0, 255, 0];
const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const LILAC: [u8; 3] = [172, 128, 255];
const GOTCHA: [u8; 3] = [236, 78, 53];

const SORROW_BLOCK: u32 = 16;
const ANGER_BLOCK: u32 = 4;

#[derive(Debug, Clone)]
pub struct EmotionWatchSettings {
    pub sample_every: u32,
}

/// Contador de emociones: detecta caras, muestra cuántas hay de cada tipo y
/// saca fotos cuando todo el mundo sonríe o cuando hay varias sorprendidas.
pub struct EmotionWatch {
    stage: Stage,
    vision: VisionSession,
    sampler: Sampler,
    fps: FpsMeter,
    groups: EmotionGroups,
    /// Tras la foto "Gotcha" las caras tristes y enfadadas se pixelan.
    mosaic_mode: bool,
    smile_latched: bool,
    gotcha_latched: bool,
    rng: StdRng,
}

impl EmotionWatch {
    pub fn new(stage: Stage, vision: VisionSession, settings: EmotionWatchSettings) -> Self {
        Self {
            stage,
            vision,
            sampler: Sampler::new(settings.sample_every),
            fps: FpsMeter::new(),
            groups: EmotionGroups::default(),
            mosaic_mode: false,
            smile_latched: false,
            gotcha_latched: false,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn mosaic_mode(&self) -> bool {
        self.mosaic_mode
    }

    pub fn groups(&self) -> &EmotionGroups {
        &self.groups
    }

    fn draw_counters(&self, frame: &mut RgbImage) {
        let g = &self.groups;
        let faces_colour = if self.mosaic_mode { LILAC } else { WHITE };
        let rows = [
            (format!("=D {}", g.joyful.len()), -120, GREEN),
            (format!("=[ {}", g.sorrowful.len()), -96, BLACK),
            (format!("=O {}", g.surprised.len()), -68, BLUE),
            (format!(">( {}", g.angry.len()), -44, RED),
            (format!("Faces: {}", g.all.len()), -20, faces_colour),
        ];
        for (text, y, colour) in rows {
            self.stage
                .overlay
                .overlay_text(frame, &text, Anchor::new(-20, y), colour, false);
        }
    }

    fn pixelate(&mut self, frame: &mut RgbImage) {
        let canvas = Size::new(frame.width(), frame.height());
        for face in &self.groups.sorrowful {
            let points = outline_points(&face.bounding_poly, VertexSpace::Absolute, canvas);
            if let Some(bbox) = bounding_box(&points) {
                self.stage
                    .overlay
                    .mosaic(frame, bbox.to_region(), SORROW_BLOCK, &mut self.rng);
            }
        }
        for face in &self.groups.angry {
            let band = eyebrow_band(face, canvas.height);
            self.stage.overlay.mosaic(frame, band, ANGER_BLOCK, &mut self.rng);
        }
    }

    /// Foto a resolución completa con logotipo y fecha.
    fn take_snapshot(&mut self, prefix: &str, stamp_colour: [u8; 3]) -> DomainResult<()> {
        let now = Local::now();
        let mut still = self.stage.source.capture_still()?;
        self.stage.stamp_logo(&mut still);
        let stamp = now.format("%Y-%m-%d %H:%M").to_string();
        self.stage
            .overlay
            .overlay_text(&mut still, &stamp, Anchor::new(-20, -20), stamp_colour, false);
        self.stage.display.show_still(&still, prefix);

        let stem = format!("{prefix}-{}", now.format("%Y-%m-%d-%H%M%S"));
        let path = self.stage.snapshots.save(&still, &stem)?;
        info!("📸 Foto guardada en {}", path.display());
        Ok(())
    }
}

impl Watch for EmotionWatch {
    fn name(&self) -> &'static str {
        "emotions"
    }

    fn step(&mut self) -> DomainResult<()> {
        let mut frame = self.stage.source.next_frame()?;

        let sampled = self.sampler.due();
        if sampled {
            match self.vision.annotate(&frame, Feature::Face) {
                Ok(faces) => self.groups = EmotionGroups::from_faces(faces),
                Err(e) => warn!("⚠️ API de visión: {e}"),
            }
        }

        self.draw_counters(&mut frame);
        self.stage.stamp_logo(&mut frame);

        let joyful = HighlightStyle { colour: GREEN, caption: Caption::None, space: VertexSpace::Absolute };
        let others = HighlightStyle { colour: RED, ..joyful };
        self.stage.overlay.highlight(&mut frame, &self.groups.joyful, &joyful);
        self.stage.overlay.highlight(&mut frame, &self.groups.not_joyful, &others);

        if self.mosaic_mode {
            self.pixelate(&mut frame);
        }

        self.fps.tick();
        let meta = FrameMeta {
            width: frame.width(),
            height: frame.height(),
            vision_ms: self.vision.last_ms(),
            fps_est: self.fps.estimate(),
            sampled,
            detections: self.groups.all.clone(),
        };
        self.stage.display.show_frame(&frame, meta);

        if self.groups.all_smiling() && !self.mosaic_mode {
            if !self.smile_latched {
                if let Err(e) = self.take_snapshot("IMG", WHITE) {
                    error!("❌ Foto de sonrisas: {e}");
                }
                self.smile_latched = true;
            }
        } else {
            self.smile_latched = false;
        }

        if self.groups.all.len() > 1 && self.groups.surprised.len() > 1 && !self.mosaic_mode {
            if !self.gotcha_latched {
                if let Err(e) = self.take_snapshot("Gotcha", GOTCHA) {
                    error!("❌ Foto Gotcha: {e}");
                }
                self.gotcha_latched = true;
                self.mosaic_mode = true;
                info!("🎭 Modo mosaico activado");
            }
        } else {
            self.gotcha_latched = false;
        }

        self.sampler.advance();
        Ok(())
    }
}
