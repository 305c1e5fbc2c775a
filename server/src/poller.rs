use shared::{
    error::FeedError,
    format::{format_share, format_wins},
    fsm::FeedEvent,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use crate::state::{AppState, BoardChange, StatsSource};

/// Poll the stats endpoint forever, or once when `every` is zero.
pub async fn run(state: AppState, source: Arc<StatsSource>, every: Duration) {
    loop {
        refresh(&state, &source).await;
        if every.is_zero() {
            info!("stats_poll = one_shot");
            break;
        }
        tokio::time::sleep(every).await;
    }
}

/// Fetch one snapshot and apply it to the token board.
///
/// Every request gets a sequence token; a response that lands after a newer
/// one was applied is discarded. Failures keep the previous snapshot.
pub async fn refresh(state: &AppState, source: &StatsSource) {
    let seq = state.next_request_seq();
    // no-op while the source is already live
    state.stats_feed(FeedEvent::Connect).await;

    let body = match fetch_stats(&source.client, &source.url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("stats_fetch_failed seq={} err={}", seq, e);
            state.stats_feed(FeedEvent::Failed).await;
            state.stats_feed(FeedEvent::Dropped).await;
            return;
        }
    };

    let applied = state.tokens.write().await.apply_response(seq, &body);
    match applied {
        Ok(true) => {
            state.stats_feed(FeedEvent::Established).await;
            let tokens = state.tokens.read().await;
            info!(
                "Applied stats snapshot seq={} tokens={} total_races={}",
                seq,
                tokens.batch().len(),
                tokens.total_races()
            );
            if let Some(leader) = tokens.ranked().first() {
                debug!(
                    "stats_leader id={} wins=\"{}\" share={}",
                    leader.id,
                    format_wins(leader.win_count),
                    format_share(leader.participation_win_share, 2)
                );
            }
            drop(tokens);
            state.notify(BoardChange::Tokens);
        }
        Ok(false) => {
            debug!("stale_stats_response seq={}", seq);
        }
        Err(e) => {
            warn!("stats_payload_dropped seq={} err={}", seq, e);
            state.stats_feed(FeedEvent::Failed).await;
            state.stats_feed(FeedEvent::Dropped).await;
        }
    }
}

async fn fetch_stats(client: &reqwest::Client, url: &str) -> Result<String, FeedError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| FeedError::SourceUnavailable(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FeedError::SourceUnavailable(format!("HTTP {}", status)));
    }
    resp.text()
        .await
        .map_err(|e| FeedError::SourceUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{http::StatusCode, routing::get, Router};
    use shared::fsm::FeedState;

    const SNAPSHOT: &str = r#"{"data":[
        {"token_id":"7","total_wins":2,"total_races":4},
        {"token_id":"17","total_wins":5,"total_races":9}
    ]}"#;

    fn state() -> AppState {
        let config = Config::from_lookup(|_| None).unwrap();
        AppState::new(&config, reqwest::Client::new())
    }

    /// Local stats endpoint: `/good` serves a snapshot, `/down` fails, and
    /// `/garbled` answers 200 with a body that is not stats JSON.
    async fn upstream() -> String {
        let app = Router::new()
            .route("/good", get(|| async { SNAPSHOT }))
            .route(
                "/down",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/garbled", get(|| async { "<html>502 Bad Gateway</html>" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn source(base: &str, path: &str) -> StatsSource {
        StatsSource {
            client: reqwest::Client::new(),
            url: format!("{}{}", base, path),
        }
    }

    async fn ranked_ids(state: &AppState) -> Vec<String> {
        let tokens = state.tokens.read().await;
        tokens.ranked().iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn failed_fetch_keeps_snapshot_and_marks_lost() {
        let base = upstream().await;
        let state = state();
        let mut rx = state.subscribe();

        // never reached the source yet
        refresh(&state, &source(&base, "/down")).await;
        assert_eq!(state.tokens.read().await.applied_seq(), None);
        assert_eq!(state.feeds.read().await.stats, FeedState::Lost);
        assert!(rx.try_recv().is_err());

        refresh(&state, &source(&base, "/good")).await;
        assert_eq!(state.tokens.read().await.applied_seq(), Some(2));
        assert_eq!(state.feeds.read().await.stats, FeedState::Live);
        assert_eq!(rx.try_recv().unwrap(), BoardChange::Tokens);
        let before = ranked_ids(&state).await;
        assert_eq!(before, vec!["17", "7"]);

        refresh(&state, &source(&base, "/down")).await;
        assert_eq!(state.tokens.read().await.applied_seq(), Some(2));
        assert_eq!(state.tokens.read().await.total_races(), 13);
        assert_eq!(ranked_ids(&state).await, before);
        assert_eq!(state.feeds.read().await.stats, FeedState::Lost);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_body_marks_live_feed_lost() {
        let base = upstream().await;
        let state = state();

        refresh(&state, &source(&base, "/good")).await;
        assert_eq!(state.feeds.read().await.stats, FeedState::Live);
        let before = ranked_ids(&state).await;

        refresh(&state, &source(&base, "/garbled")).await;
        assert_eq!(state.tokens.read().await.applied_seq(), Some(1));
        assert_eq!(ranked_ids(&state).await, before);
        assert_eq!(state.feeds.read().await.stats, FeedState::Lost);

        // the next good response brings it back
        refresh(&state, &source(&base, "/good")).await;
        assert_eq!(state.tokens.read().await.applied_seq(), Some(3));
        assert_eq!(state.feeds.read().await.stats, FeedState::Live);
    }

    #[tokio::test]
    async fn unreachable_source_marks_lost() {
        let state = state();
        // nothing listens on port 9 of the loopback
        refresh(&state, &source("http://127.0.0.1:9", "/api/stats/tokens")).await;
        assert_eq!(state.tokens.read().await.applied_seq(), None);
        assert_eq!(state.feeds.read().await.stats, FeedState::Lost);
    }
}
