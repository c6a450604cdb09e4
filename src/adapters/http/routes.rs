use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::adapters::http::state::HttpState;
use crate::application::dto::{CameraEntry, CamerasResponse, ErrorResponse, OkResponse};

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    Json(st.config.as_ref().clone())
}

pub async fn list_cameras(State(st): State<HttpState>) -> impl IntoResponse {
    match st.camera.list_cameras().await {
        Ok(cameras) => {
            let cameras = cameras.into_iter().map(CameraEntry::from).collect();
            Json(CamerasResponse { cameras }).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() })).into_response(),
    }
}

/// Botón "Call Backup": hace sonar la sirena.
pub async fn call_backup(State(st): State<HttpState>) -> impl IntoResponse {
    let Some(siren) = st.siren.clone() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse { error: "no hay sirena configurada".into() }),
        )
            .into_response();
    };
    tracing::warn!("📣 Solicitud de refuerzos desde el panel");
    match siren.sound() {
        Ok(()) => Json(OkResponse { ok: true }).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() })).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::to_bytes;
    use tokio::sync::broadcast;

    use super::*;
    use crate::application::ports::{CameraCatalogPort, SirenPort};
    use crate::application::services::CameraService;
    use crate::domain::camera::{CameraId, CameraInfo};
    use crate::domain::errors::DomainResult;

    struct OneCamera;

    #[async_trait]
    impl CameraCatalogPort for OneCamera {
        async fn list_cameras(&self) -> DomainResult<Vec<CameraInfo>> {
            Ok(vec![CameraInfo {
                id: CameraId { path: "/dev/video0".into() },
                name: "cam".into(),
                card: "USB Camera".into(),
                driver: "uvcvideo".into(),
                bus: "usb-1".into(),
            }])
        }
    }

    #[derive(Default)]
    struct CountingSiren(AtomicUsize);

    impl SirenPort for CountingSiren {
        fn sound(&self) -> DomainResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn state(siren: Option<Arc<dyn SirenPort>>) -> HttpState {
        let (events, _) = broadcast::channel(4);
        HttpState {
            camera: Arc::new(CameraService::new(Arc::new(OneCamera))),
            siren,
            events,
            config: Arc::new(serde_json::json!({ "vision": { "feature": "object" } })),
        }
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn cameras_are_listed_with_index() {
        let resp = list_cameras(State(state(None))).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["cameras"][0]["index"], 0);
        assert_eq!(json["cameras"][0]["card"], "USB Camera");
    }

    #[tokio::test]
    async fn backup_sounds_the_siren() {
        let siren = Arc::new(CountingSiren::default());
        let resp = call_backup(State(state(Some(siren.clone() as Arc<dyn SirenPort>)))).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(siren.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backup_without_siren_is_unavailable() {
        let resp = call_backup(State(state(None))).await.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn config_is_served_verbatim() {
        let json = body_json(get_config(State(state(None))).await.into_response()).await;
        assert_eq!(json["vision"]["feature"], "object");
    }
}
