use std::sync::Arc;

use image::RgbImage;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::application::ports::{AlertPort, DisplayPort};
use crate::domain::errors::DomainResult;
use crate::domain::stream::{FrameMeta, StreamMessage};
use crate::domain::threat::ThreatAlert;
use crate::render::encode_jpeg;

/// Un mensaje para los clientes WebSocket: metadatos y, si aplica, el JPEG.
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub message: StreamMessage,
    pub jpeg: Option<Arc<Vec<u8>>>,
}

/// Publica la salida de vídeo y las alertas en un canal `broadcast`.
pub struct BroadcastDisplay {
    tx: broadcast::Sender<StreamEvent>,
    quality: u8,
}

impl BroadcastDisplay {
    pub fn new(tx: broadcast::Sender<StreamEvent>, quality: u8) -> Self {
        Self { tx, quality }
    }

    fn publish_image(&self, img: &RgbImage, message: StreamMessage) {
        // Sin clientes no merece la pena comprimir
        if self.tx.receiver_count() == 0 {
            return;
        }
        match encode_jpeg(img, self.quality) {
            Ok(jpeg) => {
                let _ = self.tx.send(StreamEvent { message, jpeg: Some(Arc::new(jpeg)) });
            }
            Err(e) => warn!("No se pudo publicar el frame: {e}"),
        }
    }
}

impl DisplayPort for BroadcastDisplay {
    fn show_frame(&self, frame: &RgbImage, meta: FrameMeta) {
        self.publish_image(frame, StreamMessage::Frame { meta });
    }

    fn show_still(&self, still: &RgbImage, caption: &str) {
        self.publish_image(still, StreamMessage::Still { caption: caption.to_string() });
    }
}

impl AlertPort for BroadcastDisplay {
    fn raise(&self, alert: &ThreatAlert) -> DomainResult<()> {
        let event = StreamEvent { message: StreamMessage::Alert { alert: alert.clone() }, jpeg: None };
        if self.tx.send(event).is_err() {
            debug!("Alerta '{}' sin clientes conectados", alert.kind);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::threat::ThreatKind;

    fn meta() -> FrameMeta {
        FrameMeta { width: 4, height: 4, vision_ms: 0.0, fps_est: 0.0, sampled: false, detections: vec![] }
    }

    #[test]
    fn frames_carry_jpeg() {
        let (tx, mut rx) = broadcast::channel(4);
        let display = BroadcastDisplay::new(tx, 80);
        display.show_frame(&RgbImage::new(4, 4), meta());
        let ev = rx.try_recv().unwrap();
        assert!(matches!(ev.message, StreamMessage::Frame { .. }));
        assert_eq!(&ev.jpeg.unwrap()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn alerts_have_no_image() {
        let (tx, mut rx) = broadcast::channel(4);
        let display = BroadcastDisplay::new(tx, 80);
        let alert = ThreatAlert::new(ThreatKind::Knife, "Lab", None);
        display.raise(&alert).unwrap();
        let ev = rx.try_recv().unwrap();
        assert!(ev.jpeg.is_none());
        match ev.message {
            StreamMessage::Alert { alert } => assert_eq!(alert.kind, ThreatKind::Knife),
            other => panic!("mensaje inesperado: {other:?}"),
        }
    }

    #[test]
    fn raising_without_clients_is_not_an_error() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        let display = BroadcastDisplay::new(tx, 80);
        assert!(display.raise(&ThreatAlert::new(ThreatKind::Handgun, "Lab", None)).is_ok());
    }
}
