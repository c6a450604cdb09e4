use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use lifeline::adapters::{
    alert::{email::EmailAlert, siren::AplaySiren},
    file::{images::load_rgb, replay::FileFrameSource, snapshots::FsSnapshotStore},
    gvision::GoogleVisionClient,
    http::{display::BroadcastDisplay, router, state::HttpState},
    v4l2::{camera_repo::V4l2CameraCatalog, capture::V4l2Capture},
};
use lifeline::application::{
    annotate::{annotate_image, describe, render_report},
    emotion_watch::{EmotionWatch, EmotionWatchSettings},
    ports::{AlertPort, CameraCatalogPort, FrameSource, SirenPort, SnapshotStore, VisionPort},
    preview::PreviewWatch,
    services::{run_until, CameraService, Stage, VisionSession, Watch},
    threat_watch::{ThreatWatch, ThreatWatchSettings},
};
use lifeline::config::{AppConfig, DEFAULT_CONFIG_PATH};
use lifeline::domain::detection::Feature;
use lifeline::render::Overlay;

#[derive(Parser)]
#[command(name = "lifeline", version, about = "Cámara vigilada con Google Cloud Vision")]
struct Cli {
    /// Archivo de configuración TOML.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Usa una imagen fija en lugar de la cámara.
    #[arg(long, global = true, value_name = "IMAGE")]
    replay: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vigila armas y lanza alertas.
    Watch,
    /// Cuenta emociones y saca fotos de grupo.
    Emotions,
    /// Vista previa con hora y logotipo, sin API de visión.
    Preview,
    /// Anota una imagen suelta e imprime los resultados.
    Annotate {
        image: PathBuf,
        /// text, label, face u object.
        #[arg(short, long, default_value = "text")]
        feature: Feature,
        #[arg(long)]
        max_results: Option<u32>,
        /// Copia enmarcada de la imagen.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Lista las cámaras V4L2.
    Cameras,
}

#[derive(Clone, Copy)]
enum Mode {
    Watch,
    Emotions,
    Preview,
}

impl Mode {
    fn name(self) -> &'static str {
        match self {
            Mode::Watch => "watch",
            Mode::Emotions => "emotions",
            Mode::Preview => "preview",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs con RUST_LOG=info por defecto
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Watch => serve(config, Mode::Watch, cli.replay).await,
        Commands::Emotions => serve(config, Mode::Emotions, cli.replay).await,
        Commands::Preview => serve(config, Mode::Preview, cli.replay).await,
        Commands::Annotate { image, feature, max_results, output } => {
            annotate(&config, &image, feature, max_results, output.as_deref()).await
        }
        Commands::Cameras => cameras().await,
    }
}

fn vision_client(config: &AppConfig) -> Result<GoogleVisionClient> {
    GoogleVisionClient::new(&config.vision.endpoint, config.vision_credentials()?, config.vision_timeout())
}

fn open_source(config: &AppConfig, replay: Option<&Path>) -> Result<Box<dyn FrameSource>> {
    match replay {
        Some(path) => {
            info!("🖼️ Reproduciendo {} en lugar de la cámara", path.display());
            let img = load_rgb(path)?;
            Ok(Box::new(FileFrameSource::new(img, config.camera.scale)?.with_fps(config.camera.fps)))
        }
        None => Ok(Box::new(V4l2Capture::open(config.capture())?)),
    }
}

async fn serve(config: AppConfig, mode: Mode, replay: Option<PathBuf>) -> Result<()> {
    info!("🔧 Inicializando adaptadores de infraestructura...");

    let (events, _) = broadcast::channel(16);
    let display = Arc::new(BroadcastDisplay::new(events.clone(), config.http.stream_quality));
    let overlay = Arc::new(Overlay::load(&config.overlay.font, config.overlay.font_px, config.overlay.line_width));
    let snapshots: Arc<dyn SnapshotStore> =
        Arc::new(FsSnapshotStore::new(&config.alerts.snapshot_dir, config.alerts.snapshot_quality));
    let logo = config.overlay.logo.as_deref().and_then(|p| match load_rgb(p) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!("Logotipo no disponible: {e}");
            None
        }
    });
    let siren: Option<Arc<dyn SirenPort>> = config
        .alerts
        .siren_wav
        .as_ref()
        .map(|wav| Arc::new(AplaySiren::new(wav)) as Arc<dyn SirenPort>);

    let vision: Option<Arc<dyn VisionPort>> = match mode {
        Mode::Preview => None,
        _ => Some(Arc::new(vision_client(&config)?)),
    };
    let mut alerts: Vec<Arc<dyn AlertPort>> = vec![display.clone() as Arc<dyn AlertPort>];
    if let Some(smtp) = config.smtp()? {
        alerts.push(Arc::new(EmailAlert::new(smtp)));
    }

    // El hilo de captura abre la cámara y ejecuta el modo elegido
    let stop = Arc::new(AtomicBool::new(false));
    let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();
    let worker = {
        let stop = stop.clone();
        let config = config.clone();
        let siren = siren.clone();
        let runtime = Handle::current();
        std::thread::Builder::new().name("capture".into()).spawn(move || {
            let source = match open_source(&config, replay.as_deref()) {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let size = source.frame_size();
            info!("🎞️ Origen de vídeo listo: {}x{}", size.width, size.height);
            let _ = ready_tx.send(Ok(()));

            let stage = Stage { source, display, overlay, snapshots, logo };
            let session = |v: Arc<dyn VisionPort>| {
                VisionSession::new(v, runtime.clone(), config.vision.jpeg_quality, config.vision.max_results)
            };
            let mut watch: Box<dyn Watch> = match (mode, vision) {
                (Mode::Watch, Some(v)) => Box::new(ThreatWatch::new(
                    stage,
                    session(v),
                    alerts,
                    siren,
                    ThreatWatchSettings {
                        banner: config.alerts.banner.clone(),
                        site: config.alerts.site.clone(),
                        sample_every: config.vision.sample_every,
                        alert_cooldown: Duration::from_secs(config.alerts.cooldown_secs),
                        auto_siren: config.alerts.auto_siren,
                    },
                )),
                (Mode::Emotions, Some(v)) => Box::new(EmotionWatch::new(
                    stage,
                    session(v),
                    EmotionWatchSettings { sample_every: config.vision.sample_every },
                )),
                _ => Box::new(PreviewWatch::new(stage)),
            };
            run_until(watch.as_mut(), &stop);
        })?
    };

    ready_rx
        .await
        .map_err(|_| anyhow!("el hilo de captura terminó antes de arrancar"))?
        .context("no se pudo abrir el origen de vídeo")?;

    let state = HttpState {
        camera: Arc::new(CameraService::new(Arc::new(V4l2CameraCatalog::new()))),
        siren,
        events,
        config: Arc::new(config.sanitized(mode.name())),
    };
    let app = router(state).fallback_service(ServeDir::new(&config.http.static_dir));

    let listener = tokio::net::TcpListener::bind(&config.http.bind).await?;
    info!("🚀 LifeLine ({}) en http://{}", mode.name(), config.http.bind);
    info!("📂 Archivos estáticos servidos desde '{}'", config.http.static_dir.display());

    let shutdown_flag = stop.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("No se pudo escuchar Ctrl-C: {e}");
            }
            info!("🛑 Deteniendo LifeLine...");
            shutdown_flag.store(true, Ordering::Relaxed);
        })
        .await?;

    stop.store(true, Ordering::Relaxed);
    let joined = tokio::task::spawn_blocking(move || worker.join()).await?;
    if joined.is_err() {
        error!("❌ El hilo de captura terminó con pánico");
    }
    Ok(())
}

async fn annotate(
    config: &AppConfig,
    image: &Path,
    feature: Feature,
    max_results: Option<u32>,
    output: Option<&Path>,
) -> Result<()> {
    let vision = vision_client(config)?;
    let img = load_rgb(image)?;
    let max_results = max_results.unwrap_or(config.vision.max_results);

    let report = annotate_image(&vision, &img, feature, max_results, config.vision.jpeg_quality).await?;
    info!(
        "⏱️ {} resultados de {} en {:.0} ms",
        report.detections.len(),
        feature.wire_name(),
        report.latency.as_secs_f64() * 1000.0
    );
    for det in &report.detections {
        println!("{}", describe(det));
    }

    if let Some(out) = output {
        let overlay = Overlay::load(&config.overlay.font, config.overlay.font_px, config.overlay.line_width);
        match render_report(&overlay, &img, &report) {
            Some(framed) => {
                framed.save(out).with_context(|| format!("guardando {}", out.display()))?;
                info!("💾 Imagen anotada en {}", out.display());
            }
            None => warn!("Las etiquetas no tienen posición; no se escribe {}", out.display()),
        }
    }
    Ok(())
}

async fn cameras() -> Result<()> {
    let cameras = V4l2CameraCatalog::new().list_cameras().await?;
    if cameras.is_empty() {
        warn!("No se encontraron cámaras V4L2");
    }
    for cam in cameras {
        println!("{}\t{}\t{} ({})", cam.id.path, cam.card, cam.driver, cam.bus);
    }
    Ok(())
}
