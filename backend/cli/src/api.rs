use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use dialer_core::{DispatchReceipt, DispatchRegistry, DispatchRequest, AGENT_NAME};
use dialer_logging::{redact_sensitive_data, LogStream};

/// Shared application state for API handlers.
pub struct AppState {
    pub registry: DispatchRegistry,
    pub logs: LogStream,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/dispatch", get(list_dispatches).post(create_dispatch))
        .route("/ws/logs", get(ws_handler))
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "dialer",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": state.registry.room_count().await,
    }))
}

/// Record an agent dispatch for a new outbound call.
async fn create_dispatch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<DispatchReceipt>, (StatusCode, String)> {
    if let Err(reason) = check_request(&request) {
        warn!(room = %request.room_name, reason, "Rejected dispatch request");
        return Err((StatusCode::BAD_REQUEST, reason.to_string()));
    }

    let dispatch = state.registry.create(&request).await;
    info!(
        dispatch_id = %dispatch.id,
        room = %dispatch.room,
        agent = %dispatch.agent_name,
        phone = %redact_sensitive_data(&request.phone_number),
        "created dispatch"
    );

    Ok(Json(DispatchReceipt {
        message: "Dispatch created successfully".to_string(),
        dispatch: request.room_name,
    }))
}

fn check_request(request: &DispatchRequest) -> Result<(), &'static str> {
    if request.room_name.trim().is_empty() {
        return Err("room_name is required");
    }
    if request.phone_number.trim().is_empty() {
        return Err("phone_number is required");
    }
    if request.agent_name != AGENT_NAME {
        return Err("unknown agent_name");
    }
    Ok(())
}

#[derive(Deserialize)]
struct ListParams {
    room_name: String,
}

/// List dispatches recorded for a room.
async fn list_dispatches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let dispatches = state.registry.list(&params.room_name).await;
    Json(json!({
        "room_name": params.room_name,
        "dispatches": dispatches,
    }))
}

/// WebSocket handler streaming server log lines.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut lines = BroadcastStream::new(state.logs.subscribe());
    debug!("Log stream client connected");

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    if sender.send(Message::Text(line)).await.is_err() {
                        break;
                    }
                }
                // Lagged or closed
                _ => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
        }
    }

    debug!("Log stream client disconnected");
}
