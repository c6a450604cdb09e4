pub mod display;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{routing::{get, post}, Router};

use crate::adapters::http::state::HttpState;
use crate::adapters::http::ws::ws_handler;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/config", get(routes::get_config))
        .route("/api/cameras", get(routes::list_cameras))
        .route("/api/alerts/backup", post(routes::call_backup))
        .route("/ws/stream", get(ws_handler))
        .with_state(state)
}
