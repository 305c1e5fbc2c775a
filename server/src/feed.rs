use futures::StreamExt;
use rand::Rng;
use shared::{fsm::FeedEvent, protocol::parse_race_results};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::state::{AppState, BoardChange};

const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Follow the race stream, reconnecting after every loss.
///
/// The tally survives reconnects; nothing is replayed or reset.
pub async fn run(state: AppState, url: String, reconnect_max: Duration) {
    let mut attempt: u32 = 0;
    loop {
        state.races_feed(FeedEvent::Connect).await;
        match connect_async(url.as_str()).await {
            Ok((mut ws, _)) => {
                state.races_feed(FeedEvent::Established).await;
                attempt = 0;
                info!("Race feed connected to {}", url);

                while let Some(msg) = ws.next().await {
                    match msg {
                        Ok(Message::Text(text)) => handle_message(&state, text.as_str()).await,
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("race_feed_error = {}", e);
                            break;
                        }
                    }
                }

                state.races_feed(FeedEvent::Dropped).await;
                let kept = state.races.read().await.tally().total_absorbed();
                warn!("Race feed lost, keeping tally of {} results", kept);
            }
            Err(e) => {
                state.races_feed(FeedEvent::Failed).await;
                warn!("race_feed_unavailable url={} err={}", url, e);
            }
        }

        let delay = backoff(attempt, reconnect_max);
        attempt = attempt.saturating_add(1);
        debug!("race_feed_reconnect_in_ms = {}", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

/// Absorb one stream message. Malformed messages are logged and dropped.
pub async fn handle_message(state: &AppState, text: &str) {
    let batch = match parse_race_results(text) {
        Ok(batch) => batch,
        Err(e) => {
            warn!("race_message_dropped err={}", e);
            return;
        }
    };

    let mut races = state.races.write().await;
    for result in &batch {
        if let Some(address) = races.tally().address_of(&result.winning_token_id) {
            if address != result.winner_address {
                debug!(
                    "token {} won from {} but keeps first address {}",
                    result.winning_token_id, result.winner_address, address
                );
            }
        }
    }
    races.absorb(&batch);
    drop(races);

    debug!("race_results_absorbed = {}", batch.len());
    state.notify(BoardChange::Races);
}

/// Exponential backoff capped at `max`, plus up to a quarter of jitter.
fn backoff(attempt: u32, max: Duration) -> Duration {
    let exp = BASE_BACKOFF.saturating_mul(2u32.saturating_pow(attempt.min(16)));
    let capped = exp.min(max);
    let jitter_ms = rand::thread_rng().gen_range(0..=capped.as_millis() as u64 / 4);
    capped + Duration::from_millis(jitter_ms)
}
