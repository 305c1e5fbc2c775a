use dashmap::DashMap;
use serde::Serialize;
use shared::{
    board::{StreamBoard, TokenBoard},
    fsm::{FeedEvent, FeedState},
    ranking::SortCriterion,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::{broadcast, RwLock};

use crate::config::Config;

/// Which board changed; viewers re-derive their own view on receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardChange {
    Tokens,
    Races,
}

/// What a connected dashboard is looking at.
#[derive(Clone, Debug)]
pub struct Viewer {
    pub criterion: SortCriterion,
    pub query: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct FeedStates {
    pub stats: FeedState,
    pub races: FeedState,
}

/// Where the stats snapshot comes from.
#[derive(Clone, Debug)]
pub struct StatsSource {
    pub client: reqwest::Client,
    pub url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<RwLock<TokenBoard>>,
    pub races: Arc<RwLock<StreamBoard>>,
    pub feeds: Arc<RwLock<FeedStates>>,
    pub viewers: Arc<DashMap<String, Viewer>>,
    pub stats_source: Option<Arc<StatsSource>>,
    request_seq: Arc<AtomicU64>,
    tx: broadcast::Sender<BoardChange>,
}

impl AppState {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        let (tx, _) = broadcast::channel(100);
        Self {
            tokens: Arc::new(RwLock::new(
                TokenBoard::new(config.sort, config.denominator).with_top_n(config.top_n),
            )),
            races: Arc::new(RwLock::new(StreamBoard::new().with_top_n(config.top_n))),
            feeds: Arc::new(RwLock::new(FeedStates::default())),
            viewers: Arc::new(DashMap::new()),
            stats_source: config.stats_url.clone().map(|url| Arc::new(StatsSource { client, url })),
            request_seq: Arc::new(AtomicU64::new(0)),
            tx,
        }
    }

    /// Sequence token for the next stats request.
    pub fn next_request_seq(&self) -> u64 {
        self.request_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardChange> {
        self.tx.subscribe()
    }

    pub fn notify(&self, change: BoardChange) {
        // no receivers just means no viewer is connected
        let _ = self.tx.send(change);
    }

    pub async fn stats_feed(&self, event: FeedEvent) {
        self.feeds.write().await.stats.advance(event);
    }

    pub async fn races_feed(&self, event: FeedEvent) {
        self.feeds.write().await.races.advance(event);
    }
}
