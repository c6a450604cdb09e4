use anyhow::{anyhow, Result};
use image::{ImageFormat, RgbImage};
use v4l::format::FourCC;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::Device;

use crate::application::ports::FrameSource;
use crate::domain::camera::{CaptureMode, FrameSize};
use crate::domain::errors::{DomainError, DomainResult};

/// Configuración para inicializar la captura de vídeo.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub camera_path: String,
    pub fourcc: String,
    /// Resolución completa del sensor (la de las fotos).
    pub full: FrameSize,
    /// Divisor de la resolución de vista previa.
    pub scale: u32,
    pub fps: u32,
}

/// Flujo abierto con un modo concreto.
struct OpenStream {
    stream: Stream<'static>,
    fourcc: FourCC,
    size: FrameSize,
}

impl OpenStream {
    /// Negocia formato e intervalo en el dispositivo y arranca el flujo MMAP.
    fn start(dev: &'static Device, mode: &CaptureMode) -> Result<Self> {
        let mut fmt = dev.format()?;
        let b = mode.format.as_bytes();
        if b.len() != 4 {
            return Err(anyhow!("FourCC debe tener 4 caracteres"));
        }
        fmt.fourcc = FourCC::new(&[b[0], b[1], b[2], b[3]]);
        fmt.width = mode.size.width;
        fmt.height = mode.size.height;

        // El driver puede ajustar los valores a los más cercanos soportados
        let actual = dev.set_format(&fmt)?;

        let mut params = dev.params()?;
        params.interval.numerator = 1;
        params.interval.denominator = mode.fps;
        if let Err(e) = dev.set_params(&params) {
            tracing::warn!("El driver no acepta {} FPS: {}", mode.fps, e);
        }

        let stream = Stream::with_buffers(dev, v4l::buffer::Type::VideoCapture, 4)?;

        tracing::info!(
            "📷 Cámara abierta: {}x{} [{}] a {} FPS",
            actual.width, actual.height, actual.fourcc, mode.fps
        );

        Ok(Self {
            stream,
            fourcc: actual.fourcc,
            size: FrameSize { width: actual.width, height: actual.height },
        })
    }

    fn next_rgb(&mut self) -> Result<RgbImage> {
        let (data, _) = self.stream.next()?;
        let fcc = self.fourcc.str().map_err(|_| anyhow!("FourCC inválido"))?;

        match fcc {
            "MJPG" => {
                let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
                Ok(img.to_rgb8())
            }
            "YUYV" => Ok(yuyv_to_rgb(data, self.size.width, self.size.height)),
            _ => Err(anyhow!("Formato de cámara {} no soportado", fcc)),
        }
    }
}

/// Cambio de resolución sobre un flujo ya abierto.
trait ModeSwitch {
    fn preview_scale(&self) -> u32;
    fn reopen(&mut self, scale: u32) -> Result<()>;
    fn grab(&mut self) -> Result<RgbImage>;
}

/// Foto a escala 1. La vista previa se restaura siempre, también cuando la
/// foto falla; el error de la foto tiene prioridad sobre el de la restauración.
fn still_and_restore(cam: &mut impl ModeSwitch) -> Result<RgbImage> {
    let shot = cam.reopen(1).and_then(|()| cam.grab());
    let restored = cam.reopen(cam.preview_scale());
    match (shot, restored) {
        (Ok(img), Ok(())) => Ok(img),
        (Err(e), Err(r)) => {
            tracing::error!("Vista previa sin restaurar: {}", r);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(r)) => Err(r),
    }
}

/// Cámara V4L2 como origen de frames: vista previa reducida y fotos a
/// resolución completa.
pub struct V4l2Capture {
    cfg: CaptureConfig,
    dev: &'static Device,
    stream: Option<OpenStream>,
    size: FrameSize,
}

impl V4l2Capture {
    pub fn open(cfg: CaptureConfig) -> Result<Self> {
        let dev = Device::with_path(&cfg.camera_path)?;
        // El dispositivo debe vivir tanto como el stream 'static; se abre una
        // sola vez y se reutiliza en cada cambio de resolución
        let dev: &'static Device = Box::leak(Box::new(dev));
        let mut cap = Self { size: FrameSize::scaled(cfg.full, cfg.scale)?, cfg, dev, stream: None };
        cap.reopen(cap.cfg.scale)?;
        Ok(cap)
    }
}

impl ModeSwitch for V4l2Capture {
    fn preview_scale(&self) -> u32 {
        self.cfg.scale
    }

    fn reopen(&mut self, scale: u32) -> Result<()> {
        let mode = CaptureMode {
            format: self.cfg.fourcc.clone(),
            size: FrameSize::scaled(self.cfg.full, scale)?,
            fps: self.cfg.fps,
        };
        // Hay que parar el flujo antes de cambiar el formato
        self.stream = None;
        let stream = OpenStream::start(self.dev, &mode)?;
        self.size = stream.size;
        self.stream = Some(stream);
        Ok(())
    }

    fn grab(&mut self) -> Result<RgbImage> {
        self.stream
            .as_mut()
            .ok_or_else(|| anyhow!("la cámara no está abierta"))?
            .next_rgb()
    }
}

impl FrameSource for V4l2Capture {
    fn next_frame(&mut self) -> DomainResult<RgbImage> {
        self.grab()
            .map_err(|e| DomainError::OperationFailed(format!("captura: {e}")))
    }

    fn capture_still(&mut self) -> DomainResult<RgbImage> {
        still_and_restore(self)
            .map_err(|e| DomainError::OperationFailed(format!("foto: {e}")))
    }

    fn frame_size(&self) -> FrameSize {
        self.size
    }
}

/// Convierte un buffer YUYV (YUV 4:2:2) a RGB con BT.601.
pub fn yuyv_to_rgb(yuyv: &[u8], w: u32, h: u32) -> RgbImage {
    let mut out = RgbImage::new(w, h);
    if w == 0 {
        return out;
    }

    // Cada bloque [Y0, U, Y1, V] define dos píxeles que comparten crominancia
    for (i, chunk) in yuyv.chunks_exact(4).enumerate() {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        let to_rgb = |y: f32| {
            image::Rgb([
                (y + 1.402 * v).clamp(0.0, 255.0) as u8,
                (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8,
                (y + 1.772 * u).clamp(0.0, 255.0) as u8,
            ])
        };

        let idx = i as u32 * 2;
        let (x, y) = (idx % w, idx / w);
        if y < h {
            out.put_pixel(x, y, to_rgb(chunk[0] as f32));
            if x + 1 < w {
                out.put_pixel(x + 1, y, to_rgb(chunk[2] as f32));
            }
        }
    }
    out
}
