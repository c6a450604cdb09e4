//! Dobles de prueba de los puertos de la aplicación.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use lifeline::application::ports::{
    AlertPort, DisplayPort, FrameSource, SirenPort, SnapshotStore, VisionPort,
};
use lifeline::application::services::{Stage, VisionSession};
use lifeline::domain::camera::FrameSize;
use lifeline::domain::detection::{
    BoundingPoly, Detection, FaceDetails, Feature, Likelihood, NormalizedVertex, Vertex,
};
use lifeline::domain::errors::{DomainError, DomainResult};
use lifeline::domain::stream::FrameMeta;
use lifeline::domain::threat::ThreatAlert;
use lifeline::render::Overlay;

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Frames grises de tamaño fijo; las fotos salen al cuádruple.
pub struct GreySource {
    size: FrameSize,
    pub stills: Arc<AtomicUsize>,
    broken_stills: bool,
}

impl GreySource {
    pub fn new(width: u32, height: u32) -> Self {
        Self { size: FrameSize { width, height }, stills: Arc::new(AtomicUsize::new(0)), broken_stills: false }
    }

    /// Vista previa normal, pero toda foto falla.
    pub fn without_stills(mut self) -> Self {
        self.broken_stills = true;
        self
    }
}

impl FrameSource for GreySource {
    fn next_frame(&mut self) -> DomainResult<RgbImage> {
        Ok(RgbImage::from_pixel(self.size.width, self.size.height, Rgb([128, 128, 128])))
    }

    fn capture_still(&mut self) -> DomainResult<RgbImage> {
        self.stills.fetch_add(1, Ordering::SeqCst);
        if self.broken_stills {
            return Err(DomainError::OperationFailed("foto: dispositivo ocupado".into()));
        }
        Ok(RgbImage::from_pixel(self.size.width * 4, self.size.height * 4, Rgb([128, 128, 128])))
    }

    fn frame_size(&self) -> FrameSize {
        self.size
    }
}

/// Respuestas preparadas, una por llamada. Agotadas, devuelve lista vacía.
#[derive(Default)]
pub struct ScriptedVision {
    replies: Mutex<VecDeque<DomainResult<Vec<Detection>>>>,
    calls: Mutex<Vec<Feature>>,
}

impl ScriptedVision {
    pub fn new(replies: Vec<DomainResult<Vec<Detection>>>) -> Self {
        Self { replies: Mutex::new(replies.into()), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<Feature> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl VisionPort for ScriptedVision {
    async fn annotate(&self, jpeg: &[u8], feature: Feature, _max_results: u32) -> DomainResult<Vec<Detection>> {
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "la API debe recibir un JPEG");
        lock(&self.calls).push(feature);
        lock(&self.replies).pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Mutex<Vec<FrameMeta>>,
    pub last_frame: Mutex<Option<RgbImage>>,
    pub stills: Mutex<Vec<(String, (u32, u32))>>,
}

impl RecordingDisplay {
    pub fn frames(&self) -> Vec<FrameMeta> {
        lock(&self.frames).clone()
    }

    pub fn still_captions(&self) -> Vec<String> {
        lock(&self.stills).iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn last_frame(&self) -> Option<RgbImage> {
        lock(&self.last_frame).clone()
    }
}

impl DisplayPort for RecordingDisplay {
    fn show_frame(&self, frame: &RgbImage, meta: FrameMeta) {
        lock(&self.frames).push(meta);
        *lock(&self.last_frame) = Some(frame.clone());
    }

    fn show_still(&self, still: &RgbImage, caption: &str) {
        lock(&self.stills).push((caption.to_string(), still.dimensions()));
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub raised: Mutex<Vec<ThreatAlert>>,
}

impl RecordingAlerts {
    pub fn raised(&self) -> Vec<ThreatAlert> {
        lock(&self.raised).clone()
    }
}

impl AlertPort for RecordingAlerts {
    fn raise(&self, alert: &ThreatAlert) -> DomainResult<()> {
        lock(&self.raised).push(alert.clone());
        Ok(())
    }
}

/// Puerto de alertas que siempre falla, como un SMTP caído.
pub struct FailingAlerts;

impl AlertPort for FailingAlerts {
    fn raise(&self, _alert: &ThreatAlert) -> DomainResult<()> {
        Err(DomainError::OperationFailed("smtp caído".into()))
    }
}

#[derive(Default)]
pub struct CountingSiren(pub AtomicUsize);

impl CountingSiren {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl SirenPort for CountingSiren {
    fn sound(&self) -> DomainResult<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Guarda sólo los nombres de las fotos.
#[derive(Default)]
pub struct MemorySnapshots {
    pub stems: Mutex<Vec<String>>,
}

impl MemorySnapshots {
    pub fn stems(&self) -> Vec<String> {
        lock(&self.stems).clone()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn save(&self, _image: &RgbImage, stem: &str) -> DomainResult<PathBuf> {
        lock(&self.stems).push(stem.to_string());
        Ok(PathBuf::from(format!("/tmp/{stem}.jpg")))
    }
}

pub fn stage(
    source: GreySource,
    display: Arc<RecordingDisplay>,
    snapshots: Arc<dyn SnapshotStore>,
) -> Stage {
    Stage {
        source: Box::new(source),
        display,
        overlay: Arc::new(Overlay::new(None, 24.0, 5)),
        snapshots,
        logo: None,
    }
}

pub fn session(vision: Arc<ScriptedVision>, rt: &tokio::runtime::Runtime) -> VisionSession {
    VisionSession::new(vision, rt.handle().clone(), 75, 10)
}

pub fn object(name: &str) -> Detection {
    Detection {
        label: Some(name.to_string()),
        score: 0.9,
        bounding_poly: BoundingPoly {
            vertices: vec![],
            normalized_vertices: vec![
                NormalizedVertex { x: 0.1, y: 0.1 },
                NormalizedVertex { x: 0.5, y: 0.1 },
                NormalizedVertex { x: 0.5, y: 0.6 },
                NormalizedVertex { x: 0.1, y: 0.6 },
            ],
        },
        ..Detection::new(Feature::Object)
    }
}

/// Cara en un cuadrado de 40 px con la esquina en (x, y).
pub fn face(x: i32, y: i32, joy: Likelihood, sorrow: Likelihood, anger: Likelihood, surprise: Likelihood) -> Detection {
    Detection {
        score: 0.95,
        bounding_poly: BoundingPoly {
            vertices: vec![
                Vertex { x, y },
                Vertex { x: x + 40, y },
                Vertex { x: x + 40, y: y + 40 },
                Vertex { x, y: y + 40 },
            ],
            normalized_vertices: vec![],
        },
        face: Some(FaceDetails { joy, sorrow, anger, surprise, ..FaceDetails::default() }),
        ..Detection::new(Feature::Face)
    }
}

pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}
