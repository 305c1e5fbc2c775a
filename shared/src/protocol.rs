use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::format::{row_labels, RowLabels};
use crate::ranking::{RankedEntry, SortCriterion};
use crate::tally::StreamEntry;

/// Per-token summary as served by `/api/stats/tokens`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenSummary {
    pub token_id: String,
    pub total_wins: u64,
    pub total_races: u64,
}

/// One finished race as pushed on the race stream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaceResult {
    pub race_id: i64,
    pub winning_token_id: String,
    pub winner_address: String,
}

/// Both upstream sources wrap their records in `{ "data": [...] }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Envelope<T> {
    pub data: Vec<T>,
}

pub fn parse_token_stats(text: &str) -> Result<Vec<TokenSummary>, FeedError> {
    let envelope: Envelope<TokenSummary> = serde_json::from_str(text)?;
    Ok(envelope.data)
}

pub fn parse_race_results(text: &str) -> Result<Vec<RaceResult>, FeedError> {
    let envelope: Envelope<RaceResult> = serde_json::from_str(text)?;
    Ok(envelope.data)
}

/// Messages a dashboard viewer sends over `/ws`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ClientMsg {
    Search { query: String },
    Sort { criterion: SortCriterion },
    Refresh,
}

/// Messages pushed to dashboard viewers.
///
/// Serialize-only: undefined shares go out as `null` and are not read back.
#[derive(Serialize, Clone, Debug)]
pub enum ServerMsg {
    Tokens(TokensView),
    Races(RacesView),
    Error { message: String },
}

/// `labels` runs parallel to `entries`.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TokensView {
    pub criterion: SortCriterion,
    pub total_races: u64,
    pub podium: Vec<RankedEntry>,
    pub entries: Vec<RankedEntry>,
    pub labels: Vec<RowLabels>,
}

impl TokensView {
    pub fn new(
        criterion: SortCriterion,
        total_races: u64,
        podium: Vec<RankedEntry>,
        entries: Vec<RankedEntry>,
    ) -> Self {
        let labels = row_labels(&entries);
        Self {
            criterion,
            total_races,
            podium,
            entries,
            labels,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RacesView {
    pub total_absorbed: u64,
    pub podium: Vec<StreamEntry>,
    pub entries: Vec<StreamEntry>,
    pub labels: Vec<RowLabels>,
}

impl RacesView {
    pub fn new(total_absorbed: u64, podium: Vec<StreamEntry>, entries: Vec<StreamEntry>) -> Self {
        let labels = row_labels(&entries);
        Self {
            total_absorbed,
            podium,
            entries,
            labels,
        }
    }
}
