use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::detection::Detection;
use super::threat::ThreatAlert;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMeta {
    pub width: u32,
    pub height: u32,
    /// Latencia de la última llamada a la API de visión.
    pub vision_ms: f32,
    pub fps_est: f32,
    /// Si este frame se envió a la API o reutiliza resultados anteriores.
    pub sampled: bool,
    pub detections: Vec<Detection>,
}

/// Mensajes de texto del WebSocket. `frame` y `still` van seguidos de un
/// mensaje binario con el JPEG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    Frame { meta: FrameMeta },
    Still { caption: String },
    Alert { alert: ThreatAlert },
}

pub fn summarize_detections(detections: &[Detection]) -> String {
    let mut counts = BTreeMap::new();
    for det in detections {
        *counts.entry(det.label_or("?")).or_insert(0) += 1;
    }
    counts.iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ")
}
