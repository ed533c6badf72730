//! Axum web server with WebSocket streaming for visualization.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, RwLock};
use tower_http::cors::CorsLayer;

use algoviz_trace::{Algorithm, Step, Trace};

use crate::config::VisConfig;
use crate::error::{Error, Result};
use crate::input::{algorithm_for, InputSpec};
use crate::playback::{Playback, PlaybackStatus};
use crate::timer::{TimerToken, TokioTimer};

/// Shared application state.
pub struct AppState {
    playback: RwLock<Playback<TokioTimer>>,
    updates: broadcast::Sender<PlaybackStatus>,
}

impl AppState {
    /// Push the current status to every connected socket.
    fn publish(&self, status: &PlaybackStatus) {
        // No subscribers is fine
        let _ = self.updates.send(status.clone());
    }
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
    ticks: mpsc::UnboundedReceiver<TimerToken>,
    config: VisConfig,
}

impl VisServer {
    /// Create a server with the initial algorithm and input from `config`.
    pub fn new(config: VisConfig) -> Result<Self> {
        let input = config.input_spec().build()?;
        let (timer, ticks) = TokioTimer::new();
        let mut playback = Playback::new(config.algorithm, input, timer)?
            .with_options(config.generation_options()?);
        playback.set_speed(config.speed);

        let (updates, _) = broadcast::channel(64);
        Ok(Self {
            state: Arc::new(AppState {
                playback: RwLock::new(playback),
                updates,
            }),
            ticks,
            config,
        })
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Run the server until it fails.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.listen_addr()?;
        let app = self.router();
        tokio::spawn(drive_ticks(self.state, self.ticks));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Visualization server running on http://{}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Viewer page
        .route("/", get(index_handler))
        // API routes
        .route("/api/status", get(status_handler))
        .route("/api/step", get(step_handler))
        .route("/api/trace", get(trace_handler))
        .route("/api/input", post(input_handler))
        .route("/api/playback", get(playback_status_handler))
        .route("/api/playback/play", post(play_handler))
        .route("/api/playback/pause", post(pause_handler))
        .route("/api/playback/toggle", post(toggle_handler))
        .route("/api/playback/reset", post(reset_handler))
        .route("/api/playback/seek", post(seek_handler))
        .route("/api/playback/speed", post(speed_handler))
        .route("/api/playback/step", post(step_command_handler))
        // WebSocket for real-time updates
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Deliver fired timer tokens to the playback, one at a time.
async fn drive_ticks(state: Arc<AppState>, mut ticks: mpsc::UnboundedReceiver<TimerToken>) {
    while let Some(token) = ticks.recv().await {
        let status = {
            let mut playback = state.playback.write().await;
            if !playback.on_tick(token) {
                continue;
            }
            PlaybackStatus::from(&*playback)
        };
        state.publish(&status);
    }
}

/// Serve the viewer page.
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Error body returned by the API.
#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    algorithm: Algorithm,
    pseudocode: &'static [&'static str],
    total_steps: usize,
    truncated: bool,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let playback = state.playback.read().await;
    Json(StatusResponse {
        status: "ok",
        algorithm: playback.algorithm(),
        pseudocode: playback.algorithm().pseudocode(),
        total_steps: playback.total_steps(),
        truncated: playback.trace().is_some_and(Trace::is_truncated),
    })
}

/// The step the viewer should render, with its pseudocode line.
#[derive(Debug, Clone, Serialize)]
struct StepView {
    index: usize,
    line: Option<usize>,
    step: Option<Step>,
}

impl<T: crate::timer::Timer> From<&Playback<T>> for StepView {
    fn from(playback: &Playback<T>) -> Self {
        let step = playback.current_step().cloned();
        Self {
            index: playback.current_index(),
            line: step
                .as_ref()
                .and_then(|s| playback.algorithm().line_of(s.marker)),
            step,
        }
    }
}

async fn step_handler(State(state): State<Arc<AppState>>) -> ApiResult<StepView> {
    let mut playback = state.playback.write().await;
    playback.prepare()?;
    Ok(Json(StepView::from(&*playback)))
}

async fn trace_handler(State(state): State<Arc<AppState>>) -> ApiResult<Trace> {
    let mut playback = state.playback.write().await;
    Ok(Json(playback.prepare()?.clone()))
}

async fn playback_status_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let playback = state.playback.read().await;
    Json(PlaybackStatus::from(&*playback))
}

/// Apply `op` to the playback and publish the resulting status.
async fn update<F>(state: &AppState, op: F) -> ApiResult<PlaybackStatus>
where
    F: FnOnce(&mut Playback<TokioTimer>) -> Result<()>,
{
    let status = {
        let mut playback = state.playback.write().await;
        op(&mut *playback)?;
        PlaybackStatus::from(&*playback)
    };
    state.publish(&status);
    Ok(Json(status))
}

async fn play_handler(State(state): State<Arc<AppState>>) -> ApiResult<PlaybackStatus> {
    update(&state, |pb| pb.start()).await
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<PlaybackStatus> {
    update(&state, |pb| {
        pb.pause();
        Ok(())
    })
    .await
}

async fn toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult<PlaybackStatus> {
    update(&state, |pb| pb.toggle()).await
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<PlaybackStatus> {
    update(&state, |pb| {
        pb.reset();
        Ok(())
    })
    .await
}

#[derive(Deserialize)]
struct SeekRequest {
    index: usize,
}

async fn seek_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> ApiResult<PlaybackStatus> {
    update(&state, |pb| pb.set_index(req.index)).await
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: i64,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> ApiResult<PlaybackStatus> {
    update(&state, |pb| {
        pb.set_speed(req.speed);
        Ok(())
    })
    .await
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Direction {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: Direction,
}

async fn step_command_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> ApiResult<PlaybackStatus> {
    update(&state, |pb| step(pb, req.direction)).await
}

fn step(playback: &mut Playback<TokioTimer>, direction: Direction) -> Result<()> {
    match direction {
        Direction::Forward => {
            playback.step_forward()?;
        }
        Direction::Backward => playback.step_backward(),
    }
    Ok(())
}

/// New input, optionally with an algorithm to run on it.
#[derive(Debug, Deserialize)]
struct LoadRequest {
    algorithm: Option<Algorithm>,
    #[serde(flatten)]
    input: InputSpec,
}

async fn input_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadRequest>,
) -> ApiResult<PlaybackStatus> {
    let input = req.input.build().map_err(Error::from)?;
    update(&state, |pb| {
        let algorithm = req
            .algorithm
            .unwrap_or_else(|| algorithm_for(input.kind(), pb.algorithm()));
        pb.load(algorithm, input)
    })
    .await
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut updates = state.updates.subscribe();

    // Send initial status
    let status = PlaybackStatus::from(&*state.playback.read().await);
    if send_json(&mut socket, &WsResponse::Status(status)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let response = match serde_json::from_str::<WsCommand>(&text) {
                            Ok(cmd) => handle_ws_command(&state, cmd).await,
                            Err(e) => WsResponse::Error { message: e.to_string() },
                        };
                        if send_json(&mut socket, &response).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            update = updates.recv() => {
                match update {
                    Ok(status) => {
                        if send_json(&mut socket, &WsResponse::Status(status)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "websocket client lagging behind updates");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

async fn send_json(socket: &mut WebSocket, response: &WsResponse) -> std::result::Result<(), axum::Error> {
    match serde_json::to_string(response) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::warn!("failed to encode websocket response: {e}");
            Ok(())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetStatus,
    GetStep,
    Play,
    Pause,
    Toggle,
    Reset,
    Step { direction: Direction },
    Seek { index: usize },
    Speed { speed: i64 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Status(PlaybackStatus),
    Step(StepView),
    Error { message: String },
}

async fn handle_ws_command(state: &AppState, cmd: WsCommand) -> WsResponse {
    let result = match cmd {
        WsCommand::GetStatus => {
            let playback = state.playback.read().await;
            return WsResponse::Status(PlaybackStatus::from(&*playback));
        }
        WsCommand::GetStep => {
            let mut playback = state.playback.write().await;
            return match playback.prepare() {
                Ok(_) => WsResponse::Step(StepView::from(&*playback)),
                Err(e) => WsResponse::Error { message: e.to_string() },
            };
        }
        WsCommand::Play => update(state, |pb| pb.start()).await,
        WsCommand::Pause => update(state, |pb| {
            pb.pause();
            Ok(())
        })
        .await,
        WsCommand::Toggle => update(state, |pb| pb.toggle()).await,
        WsCommand::Reset => update(state, |pb| {
            pb.reset();
            Ok(())
        })
        .await,
        WsCommand::Step { direction } => update(state, |pb| step(pb, direction)).await,
        WsCommand::Seek { index } => update(state, |pb| pb.set_index(index)).await,
        WsCommand::Speed { speed } => update(state, |pb| {
            pb.set_speed(speed);
            Ok(())
        })
        .await,
    };

    match result {
        Ok(Json(status)) => WsResponse::Status(status),
        Err(e) => WsResponse::Error { message: e.error },
    }
}
