use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::{
    application::ports::{CameraCatalogPort, DisplayPort, FrameSource, SnapshotStore, VisionPort},
    domain::{
        camera::CameraInfo,
        detection::{Detection, Feature},
        errors::DomainResult,
        geometry::Anchor,
    },
    render::{encode_jpeg, Blend, Overlay},
};

/// Servicio de inventario de cámaras para el panel.
#[derive(Clone)]
pub struct CameraService {
    catalog: Arc<dyn CameraCatalogPort>,
}

impl CameraService {
    pub fn new(catalog: Arc<dyn CameraCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn list_cameras(&self) -> DomainResult<Vec<CameraInfo>> {
        self.catalog.list_cameras().await
    }
}

/// Acceso síncrono a la API de visión desde el hilo de captura.
///
/// El hilo de captura no pertenece al runtime de Tokio, así que puede
/// bloquear sobre el `Handle` mientras espera la respuesta.
pub struct VisionSession {
    vision: Arc<dyn VisionPort>,
    runtime: Handle,
    jpeg_quality: u8,
    max_results: u32,
    last_ms: f32,
}

impl VisionSession {
    pub fn new(vision: Arc<dyn VisionPort>, runtime: Handle, jpeg_quality: u8, max_results: u32) -> Self {
        Self { vision, runtime, jpeg_quality, max_results, last_ms: 0.0 }
    }

    pub fn annotate(&mut self, frame: &RgbImage, feature: Feature) -> DomainResult<Vec<Detection>> {
        let jpeg = encode_jpeg(frame, self.jpeg_quality)?;
        let started = Instant::now();
        let result = self
            .runtime
            .block_on(self.vision.annotate(&jpeg, feature, self.max_results));
        self.last_ms = started.elapsed().as_secs_f32() * 1000.0;
        result
    }

    /// Latencia de la última llamada, en milisegundos.
    pub fn last_ms(&self) -> f32 {
        self.last_ms
    }
}

/// Lo que comparten todos los modos: origen de frames, salida, dibujo y
/// almacenamiento de fotos.
pub struct Stage {
    pub source: Box<dyn FrameSource>,
    pub display: Arc<dyn DisplayPort>,
    pub overlay: Arc<Overlay>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub logo: Option<RgbImage>,
}

impl Stage {
    /// Logotipo en la esquina superior derecha, sin su fondo claro.
    pub fn stamp_logo(&self, img: &mut RgbImage) {
        if let Some(logo) = &self.logo {
            if let Err(e) = self.overlay.overlay_image(img, logo, Anchor::new(-20, 5), Blend::KeyOutLight) {
                warn!("No se pudo superponer el logotipo: {e}");
            }
        }
    }
}

/// Un modo de funcionamiento: cada `step` procesa un frame.
pub trait Watch {
    fn name(&self) -> &'static str;
    fn step(&mut self) -> DomainResult<()>;
}

/// Ejecuta el modo hasta que se levante `stop`. Un paso fallido no detiene
/// el bucle.
pub fn run_until(watch: &mut dyn Watch, stop: &AtomicBool) {
    info!("Worker: modo '{}' iniciado.", watch.name());
    while !stop.load(Ordering::Relaxed) {
        if let Err(e) = watch.step() {
            warn!("Error procesando frame: {}", e);
            std::thread::sleep(Duration::from_millis(10));
        }
    }
    info!("Worker: modo '{}' detenido.", watch.name());
}
