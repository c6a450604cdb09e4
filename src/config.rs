//! Configuración de LifeLine.
//!
//! Se lee de un TOML (`lifeline.toml` por defecto). Si el archivo no existe
//! se usan los valores por defecto. Los secretos nunca van en el archivo: el
//! archivo sólo nombra las variables de entorno que los contienen.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::alert::email::SmtpSettings;
use crate::adapters::gvision::{Credentials, DEFAULT_ENDPOINT};
use crate::adapters::v4l2::capture::CaptureConfig;
use crate::domain::camera::FrameSize;

pub const DEFAULT_CONFIG_PATH: &str = "lifeline.toml";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub vision: VisionConfig,
    pub overlay: OverlayConfig,
    pub alerts: AlertsConfig,
    pub email: EmailConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device: String,
    pub fourcc: String,
    /// Resolución completa (fotos).
    pub width: u32,
    pub height: u32,
    /// Divisor de la vista previa para ahorrar ancho de banda.
    pub scale: u32,
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".into(),
            fourcc: "MJPG".into(),
            width: 1920,
            height: 1080,
            scale: 4,
            fps: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub endpoint: String,
    /// Variable de entorno con la clave de API.
    pub api_key_env: String,
    /// Variable de entorno con un token OAuth (alternativa a la clave).
    pub token_env: String,
    pub max_results: u32,
    /// Se consulta la API uno de cada `sample_every` frames.
    pub sample_every: u32,
    pub jpeg_quality: u8,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key_env: "LIFELINE_VISION_API_KEY".into(),
            token_env: "LIFELINE_VISION_TOKEN".into(),
            max_results: 10,
            sample_every: 20,
            jpeg_quality: 75,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub font: PathBuf,
    pub font_px: f32,
    pub line_width: u32,
    pub logo: Option<PathBuf>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font: "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf".into(),
            font_px: 24.0,
            line_width: crate::domain::geometry::LINE_WIDTH,
            logo: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub banner: String,
    /// Lugar vigilado, citado en los mensajes de alerta.
    pub site: String,
    pub cooldown_secs: u64,
    pub snapshot_dir: PathBuf,
    pub snapshot_quality: u8,
    pub siren_wav: Option<PathBuf>,
    /// Hacer sonar la sirena sin esperar al botón del panel.
    pub auto_siren: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            banner: "LifeLine 1.0 ".into(),
            site: "LE4 HKU".into(),
            cooldown_secs: 30,
            snapshot_dir: "snapshots".into(),
            snapshot_quality: 90,
            siren_wav: None,
            auto_siren: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub from: String,
    pub to: Vec<String>,
    /// Variable de entorno con la contraseña SMTP.
    pub password_env: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "smtp.gmail.com".into(),
            port: 587,
            username: String::new(),
            from: String::new(),
            to: Vec::new(),
            password_env: "LIFELINE_SMTP_PASSWORD".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub static_dir: PathBuf,
    /// Calidad JPEG del vídeo enviado al panel.
    pub stream_quality: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8090".into(), static_dir: "static".into(), stream_quality: 80 }
    }
}

impl AppConfig {
    /// Carga y valida el archivo. Un archivo inexistente da la configuración
    /// por defecto.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            info!("⚙️ Cargando configuración de {}", path.display());
            Self::from_toml(
                &std::fs::read_to_string(path).with_context(|| format!("leyendo {}", path.display()))?,
            )
            .with_context(|| format!("en {}", path.display()))?
        } else {
            debug!("{} no existe, usando valores por defecto", path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.camera.scale == 0 {
            bail!("camera.scale debe ser mayor que 0");
        }
        if self.camera.fourcc.len() != 4 {
            bail!("camera.fourcc debe tener 4 caracteres, no '{}'", self.camera.fourcc);
        }
        if self.camera.fps == 0 {
            bail!("camera.fps debe ser mayor que 0");
        }
        if self.vision.timeout_secs == 0 {
            bail!("vision.timeout_secs debe ser mayor que 0");
        }
        if self.vision.sample_every == 0 {
            bail!("vision.sample_every debe ser mayor que 0");
        }
        for (name, q) in [
            ("vision.jpeg_quality", self.vision.jpeg_quality),
            ("alerts.snapshot_quality", self.alerts.snapshot_quality),
            ("http.stream_quality", self.http.stream_quality),
        ] {
            if !(1..=100).contains(&q) {
                bail!("{name} debe estar entre 1 y 100, no {q}");
            }
        }
        if self.overlay.line_width == 0 {
            bail!("overlay.line_width debe ser mayor que 0");
        }
        if self.email.enabled && self.email.to.is_empty() {
            bail!("email.to no puede estar vacío con el correo activado");
        }
        Ok(())
    }

    pub fn capture(&self) -> CaptureConfig {
        CaptureConfig {
            camera_path: self.camera.device.clone(),
            fourcc: self.camera.fourcc.clone(),
            full: FrameSize { width: self.camera.width, height: self.camera.height },
            scale: self.camera.scale,
            fps: self.camera.fps,
        }
    }

    /// Credenciales de la API: clave primero, token después.
    pub fn vision_credentials(&self) -> Result<Credentials> {
        self.vision_credentials_from(|name| std::env::var(name).ok())
    }

    fn vision_credentials_from(&self, env: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        if let Some(key) = env(&self.vision.api_key_env).filter(|v| !v.is_empty()) {
            return Ok(Credentials::ApiKey(key));
        }
        if let Some(token) = env(&self.vision.token_env).filter(|v| !v.is_empty()) {
            return Ok(Credentials::Bearer(token));
        }
        Err(anyhow!(
            "faltan credenciales de visión: defina {} o {}",
            self.vision.api_key_env,
            self.vision.token_env
        ))
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision.timeout_secs)
    }

    /// Datos SMTP si el correo está activado.
    pub fn smtp(&self) -> Result<Option<SmtpSettings>> {
        self.smtp_from(|name| std::env::var(name).ok())
    }

    fn smtp_from(&self, env: impl Fn(&str) -> Option<String>) -> Result<Option<SmtpSettings>> {
        if !self.email.enabled {
            return Ok(None);
        }
        let password = env(&self.email.password_env)
            .ok_or_else(|| anyhow!("defina {} con la contraseña SMTP", self.email.password_env))?;
        let username = if self.email.username.is_empty() { self.email.from.clone() } else { self.email.username.clone() };
        Ok(Some(SmtpSettings {
            host: self.email.host.clone(),
            port: self.email.port,
            username,
            password,
            from: self.email.from.clone(),
            to: self.email.to.clone(),
        }))
    }

    /// Vista para `GET /api/config`: sólo nombres de variables, nunca valores.
    pub fn sanitized(&self, mode: &str) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert("mode".into(), serde_json::Value::String(mode.to_string()));
        }
        value
    }
}
