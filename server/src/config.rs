use anyhow::Context;
use shared::ranking::{ShareDenominator, SortCriterion};
use std::{env, time::Duration};

pub const DEFAULT_STATS_URL: &str = "http://localhost:8000/api/stats/tokens";
pub const DEFAULT_RACES_WS_URL: &str = "ws://localhost:8000/ws";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Clone, Debug)]
pub struct Config {
    /// `None` turns the stats poller off.
    pub stats_url: Option<String>,
    /// `None` turns the race stream off.
    pub races_ws_url: Option<String>,
    pub bind: String,
    /// Zero means fetch once at startup and then only on viewer refresh.
    pub poll_interval: Duration,
    pub sort: SortCriterion,
    pub denominator: ShareDenominator,
    pub top_n: usize,
    pub reconnect_max: Duration,
}

impl Config {
    /// Read `KARTBOARD_*` variables, loading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let url = |key: &str, default: &str| match get(key) {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => Some(default.to_string()),
        };

        let poll_secs: u64 = match get("KARTBOARD_POLL_SECS") {
            Some(v) => v.trim().parse().context("KARTBOARD_POLL_SECS must be whole seconds")?,
            None => 10,
        };
        let reconnect_secs: u64 = match get("KARTBOARD_RECONNECT_MAX_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .context("KARTBOARD_RECONNECT_MAX_SECS must be whole seconds")?,
            None => 30,
        };
        let sort = match get("KARTBOARD_SORT") {
            Some(v) => v.trim().parse()?,
            None => SortCriterion::default(),
        };
        let denominator = match get("KARTBOARD_SHARE_DENOMINATOR") {
            Some(v) => v.trim().parse()?,
            None => ShareDenominator::default(),
        };
        let top_n: usize = match get("KARTBOARD_TOP_N") {
            Some(v) => v.trim().parse().context("KARTBOARD_TOP_N must be a count")?,
            None => shared::podium::PODIUM_SIZE,
        };

        Ok(Self {
            stats_url: url("KARTBOARD_STATS_URL", DEFAULT_STATS_URL),
            races_ws_url: url("KARTBOARD_RACES_WS_URL", DEFAULT_RACES_WS_URL),
            bind: get("KARTBOARD_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            poll_interval: Duration::from_secs(poll_secs),
            sort,
            denominator,
            top_n,
            reconnect_max: Duration::from_secs(reconnect_secs.max(1)),
        })
    }
}
