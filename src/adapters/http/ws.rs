use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use tokio::sync::broadcast::error::RecvError;

use crate::adapters::http::state::HttpState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(st): State<HttpState>) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, st))
}

/// Cada evento sale como texto JSON y, si lleva imagen, un mensaje binario
/// con el JPEG justo después.
async fn handle_socket(mut socket: WebSocket, st: HttpState) {
    let mut rx = st.events.subscribe();
    tracing::info!("🔌 Cliente WebSocket conectado");

    loop {
        let event = match rx.recv().await {
            Ok(ev) => ev,
            Err(RecvError::Lagged(n)) => {
                tracing::debug!("Cliente lento: {} eventos descartados", n);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let json = match serde_json::to_string(&event.message) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("No se pudo serializar el evento: {e}");
                continue;
            }
        };
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
        if let Some(jpeg) = event.jpeg {
            if socket.send(Message::Binary(jpeg.as_ref().clone())).await.is_err() {
                break;
            }
        }
    }
    tracing::info!("🔌 Cliente WebSocket desconectado");
}
