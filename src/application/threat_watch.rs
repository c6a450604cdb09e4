use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::{
    application::{
        ports::{AlertPort, SirenPort},
        sampling::{FpsMeter, Sampler},
        services::{Stage, VisionSession, Watch},
    },
    domain::{
        detection::{Detection, Feature, VertexSpace},
        errors::DomainResult,
        geometry::{Anchor, BLACK},
        stream::{summarize_detections, FrameMeta},
        threat::{threats_in, ThreatAlert, ThreatKind},
    },
    render::{Caption, HighlightStyle},
};

const FRAME_COLOUR: [u8; 3] = [255, 0, 0];
const BANNER_ANCHOR: Anchor = Anchor::new(10, 20);

#[derive(Debug, Clone)]
pub struct ThreatWatchSettings {
    /// Texto fijo en cada frame de vista previa.
    pub banner: String,
    /// Lugar vigilado, citado en las alertas.
    pub site: String,
    pub sample_every: u32,
    /// Tiempo mínimo entre dos alertas del mismo tipo.
    pub alert_cooldown: Duration,
    pub auto_siren: bool,
}

/// Vigilancia de armas: localiza objetos en uno de cada N frames, enmarca
/// todo lo encontrado y lanza alertas cuando aparece un arma.
pub struct ThreatWatch {
    stage: Stage,
    vision: VisionSession,
    alerts: Vec<Arc<dyn AlertPort>>,
    siren: Option<Arc<dyn SirenPort>>,
    settings: ThreatWatchSettings,
    sampler: Sampler,
    fps: FpsMeter,
    detections: Vec<Detection>,
    last_alert: HashMap<ThreatKind, Instant>,
}

impl ThreatWatch {
    pub fn new(
        stage: Stage,
        vision: VisionSession,
        alerts: Vec<Arc<dyn AlertPort>>,
        siren: Option<Arc<dyn SirenPort>>,
        settings: ThreatWatchSettings,
    ) -> Self {
        Self {
            stage,
            vision,
            alerts,
            siren,
            sampler: Sampler::new(settings.sample_every),
            settings,
            fps: FpsMeter::new(),
            detections: Vec::new(),
            last_alert: HashMap::new(),
        }
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    fn cooling_down(&self, kind: ThreatKind) -> bool {
        self.last_alert
            .get(&kind)
            .is_some_and(|t| t.elapsed() < self.settings.alert_cooldown)
    }

    fn handle_threat(&mut self, kind: ThreatKind) {
        if self.cooling_down(kind) {
            debug!("Alerta de {} en espera (cooldown)", kind);
            return;
        }
        warn!("🚨 {} detectado", kind);

        // Sin foto la alerta sale igualmente, sin adjunto
        let snapshot = match self.stage.source.capture_still() {
            Ok(mut still) => {
                self.stage
                    .overlay
                    .overlay_text(&mut still, kind.banner(), BANNER_ANCHOR, BLACK, false);
                self.stage.display.show_still(&still, kind.banner());
                match self.stage.snapshots.save(&still, kind.snapshot_stem()) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        error!("No se pudo guardar la foto de la alerta: {e}");
                        None
                    }
                }
            }
            Err(e) => {
                error!("No se pudo tomar la foto de la alerta: {e}");
                None
            }
        };

        let alert = ThreatAlert::new(kind, &self.settings.site, snapshot);
        for port in &self.alerts {
            if let Err(e) = port.raise(&alert) {
                error!("❌ Fallo al notificar la alerta: {e}");
            }
        }
        self.last_alert.insert(kind, Instant::now());

        if self.settings.auto_siren {
            if let Some(siren) = &self.siren {
                if let Err(e) = siren.sound() {
                    error!("❌ Sirena: {e}");
                }
            }
        }
    }
}

impl Watch for ThreatWatch {
    fn name(&self) -> &'static str {
        "watch"
    }

    fn step(&mut self) -> DomainResult<()> {
        let mut frame = self.stage.source.next_frame()?;
        self.stage
            .overlay
            .overlay_text(&mut frame, &self.settings.banner, BANNER_ANCHOR, BLACK, false);

        let sampled = self.sampler.due();
        if sampled {
            match self.vision.annotate(&frame, Feature::Object) {
                Ok(found) => {
                    if !found.is_empty() {
                        info!("🔍 {} ({:.0} ms)", summarize_detections(&found), self.vision.last_ms());
                    }
                    self.detections = found;
                    for kind in threats_in(&self.detections) {
                        self.handle_threat(kind);
                    }
                }
                // Se conservan los resultados anteriores
                Err(e) => warn!("⚠️ API de visión: {e}"),
            }
        }

        let style = HighlightStyle {
            colour: FRAME_COLOUR,
            caption: Caption::Label,
            space: VertexSpace::Normalized,
        };
        self.stage.overlay.highlight(&mut frame, &self.detections, &style);

        self.sampler.advance();
        self.fps.tick();

        let meta = FrameMeta {
            width: frame.width(),
            height: frame.height(),
            vision_ms: self.vision.last_ms(),
            fps_est: self.fps.estimate(),
            sampled,
            detections: self.detections.clone(),
        };
        self.stage.display.show_frame(&frame, meta);
        Ok(())
    }
}
