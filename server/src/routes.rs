use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::{
    sink::{Sink, SinkExt},
    stream::StreamExt,
};
use serde::{Deserialize, Serialize};
use shared::{
    protocol::{ClientMsg, RacesView, ServerMsg, TokensView},
    ranking::SortCriterion,
};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    poller,
    state::{AppState, BoardChange, FeedStates, Viewer},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/leaderboard/tokens", get(tokens_handler))
        .route("/api/leaderboard/races", get(races_handler))
        .route("/api/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Deserialize, Debug, Default)]
pub struct TokensQuery {
    sort: Option<String>,
    q: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RacesQuery {
    q: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct Health {
    feeds: FeedStates,
    viewers: usize,
}

async fn tokens_handler(
    State(state): State<AppState>,
    Query(params): Query<TokensQuery>,
) -> Result<Json<TokensView>, (StatusCode, Json<ServerMsg>)> {
    let tokens = state.tokens.read().await;
    let criterion = match params.sort.as_deref() {
        Some(name) => name.parse::<SortCriterion>().map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ServerMsg::Error {
                    message: e.to_string(),
                }),
            )
        })?,
        None => tokens.criterion(),
    };
    let query = params.q.unwrap_or_default();
    Ok(Json(tokens.view_as(criterion, &query)))
}

async fn races_handler(
    State(state): State<AppState>,
    Query(params): Query<RacesQuery>,
) -> Json<RacesView> {
    let query = params.q.unwrap_or_default();
    Json(state.races.read().await.view_as(&query))
}

async fn health_handler(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        feeds: *state.feeds.read().await,
        viewers: state.viewers.len(),
    })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// The view of `change` as seen by `viewer_id`, or `None` once it is gone.
async fn view_for(state: &AppState, viewer_id: &str, change: BoardChange) -> Option<ServerMsg> {
    let (criterion, query) = state
        .viewers
        .get(viewer_id)
        .map(|v| (v.criterion, v.query.clone()))?;
    Some(match change {
        BoardChange::Tokens => {
            ServerMsg::Tokens(state.tokens.read().await.view_as(criterion, &query))
        }
        BoardChange::Races => ServerMsg::Races(state.races.read().await.view_as(&query)),
    })
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let viewer_id = Uuid::new_v4().to_string();
    let mut board_rx = state.subscribe();

    let criterion = state.tokens.read().await.criterion();
    state.viewers.insert(
        viewer_id.clone(),
        Viewer {
            criterion,
            query: String::new(),
        },
    );
    info!("Viewer {} connected ({} watching)", viewer_id, state.viewers.len());

    let mut pending = vec![BoardChange::Tokens, BoardChange::Races];

    'session: loop {
        for change in pending.drain(..) {
            let Some(msg) = view_for(&state, &viewer_id, change).await else {
                break 'session;
            };
            if !send(&mut sender, &msg).await {
                debug!("Failed to send view to viewer {}", viewer_id);
                break 'session;
            }
        }

        tokio::select! {
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMsg>(&text) {
                        Ok(ClientMsg::Search { query }) => {
                            debug!("Viewer {} searches {:?}", viewer_id, query);
                            if let Some(mut viewer) = state.viewers.get_mut(&viewer_id) {
                                viewer.query = query;
                            }
                            pending.extend([BoardChange::Tokens, BoardChange::Races]);
                        }
                        Ok(ClientMsg::Sort { criterion }) => {
                            debug!("Viewer {} sorts by {}", viewer_id, criterion);
                            if let Some(mut viewer) = state.viewers.get_mut(&viewer_id) {
                                viewer.criterion = criterion;
                            }
                            pending.push(BoardChange::Tokens);
                        }
                        Ok(ClientMsg::Refresh) => {
                            if let Some(source) = state.stats_source.clone() {
                                let state = state.clone();
                                tokio::spawn(async move { poller::refresh(&state, &source).await });
                            }
                            pending.extend([BoardChange::Tokens, BoardChange::Races]);
                        }
                        Err(e) => {
                            warn!("Bad message from viewer {}: {}", viewer_id, e);
                            let msg = ServerMsg::Error { message: format!("unrecognised message: {}", e) };
                            if !send(&mut sender, &msg).await {
                                break 'session;
                            }
                        }
                    },
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break 'session,
                    _ => {}
                }
            }

            change = board_rx.recv() => {
                match change {
                    Ok(change) => pending.push(change),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Viewer {} lagged {} board changes", viewer_id, skipped);
                        pending.extend([BoardChange::Tokens, BoardChange::Races]);
                    }
                    Err(broadcast::error::RecvError::Closed) => break 'session,
                }
            }
        }
    }

    state.viewers.remove(&viewer_id);
    info!("Viewer {} disconnected", viewer_id);
}

async fn send<S>(sender: &mut S, msg: &ServerMsg) -> bool
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(msg) {
        Ok(text) => sender.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            warn!("Could not encode view: {}", e);
            true
        }
    }
}
