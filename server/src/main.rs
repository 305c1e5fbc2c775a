mod config;
mod feed;
mod poller;
mod routes;
mod state;

use config::Config;
use state::AppState;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!(
        "Leaderboard config: sort={} denominator={:?} top_n={} poll={:?}",
        config.sort, config.denominator, config.top_n, config.poll_interval
    );

    let client = reqwest::Client::builder()
        .user_agent("kartboard/0.1")
        .timeout(Duration::from_secs(20))
        .build()?;
    let state = AppState::new(&config, client);

    match state.stats_source.clone() {
        Some(source) => {
            info!("Polling token stats from {}", source.url);
            tokio::spawn(poller::run(state.clone(), source, config.poll_interval));
        }
        None => info!("stats_feed = disabled"),
    }

    match config.races_ws_url.clone() {
        Some(url) => {
            info!("Following race results on {}", url);
            tokio::spawn(feed::run(state.clone(), url, config.reconnect_max));
        }
        None => info!("race_feed = disabled"),
    }

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Server running on http://{}", config.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
