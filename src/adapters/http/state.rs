use std::sync::Arc;

use tokio::sync::broadcast;

use crate::adapters::http::display::StreamEvent;
use crate::application::ports::SirenPort;
use crate::application::services::CameraService;

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Inventario de cámaras para el selector del panel.
    pub camera: Arc<CameraService>,
    /// Sirena del botón "Call Backup", si hay una configurada.
    pub siren: Option<Arc<dyn SirenPort>>,
    /// Frames, fotos y alertas que emite el hilo de captura.
    pub events: broadcast::Sender<StreamEvent>,
    /// Configuración efectiva sin secretos.
    pub config: Arc<serde_json::Value>,
}
