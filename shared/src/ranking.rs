use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::protocol::TokenSummary;

/// Which field a token leaderboard is sorted by (descending).
///
/// Wire names match the dashboard's sort menu.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortCriterion {
    #[default]
    #[serde(rename = "totalWins")]
    ByWinCount,
    #[serde(rename = "totalWinPercentage")]
    ByTotalWinShare,
    #[serde(rename = "participationWinPercentage")]
    ByParticipationWinShare,
}

impl SortCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::ByWinCount => "totalWins",
            SortCriterion::ByTotalWinShare => "totalWinPercentage",
            SortCriterion::ByParticipationWinShare => "participationWinPercentage",
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown sort criterion: {0}")]
pub struct UnknownCriterion(pub String);

impl FromStr for SortCriterion {
    type Err = UnknownCriterion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "totalWins" => Ok(SortCriterion::ByWinCount),
            "totalWinPercentage" => Ok(SortCriterion::ByTotalWinShare),
            "participationWinPercentage" => Ok(SortCriterion::ByParticipationWinShare),
            other => Err(UnknownCriterion(other.to_string())),
        }
    }
}

/// Denominator of `total_win_share`: the batch-wide sum of wins, or of races.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShareDenominator {
    #[default]
    Wins,
    Races,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown share denominator: {0} (expected `wins` or `races`)")]
pub struct UnknownDenominator(pub String);

impl FromStr for ShareDenominator {
    type Err = UnknownDenominator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wins" => Ok(ShareDenominator::Wins),
            "races" => Ok(ShareDenominator::Races),
            other => Err(UnknownDenominator(other.to_string())),
        }
    }
}

/// A token's row on the stats leaderboard.
///
/// Shares are percentages in `0..=100`, or NaN when their denominator is zero.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub id: String,
    pub win_count: u64,
    pub position: usize,
    pub total_win_share: f64,
    pub participation_win_share: f64,
    pub total_participations: u64,
}

/// Sum of `total_races` across a batch, saturating at `u64::MAX`.
pub fn total_races(batch: &[TokenSummary]) -> u64 {
    batch
        .iter()
        .fold(0u64, |acc, t| acc.saturating_add(t.total_races))
}

/// Percentage of `part` over `whole`, NaN when `whole` is zero.
pub fn share(part: u64, whole: u64) -> f64 {
    percent(part as f64, whole as f64)
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return f64::NAN;
    }
    part / whole * 100.0
}

/// Rank a stats snapshot.
///
/// Stable: entries with equal keys keep their batch order. NaN keys sort
/// after every number.
pub fn rank_tokens(
    batch: &[TokenSummary],
    criterion: SortCriterion,
    denominator: ShareDenominator,
) -> Vec<RankedEntry> {
    // summed in f64: batch totals may exceed u64
    let global_total: f64 = match denominator {
        ShareDenominator::Wins => batch.iter().map(|t| t.total_wins as f64).sum(),
        ShareDenominator::Races => batch.iter().map(|t| t.total_races as f64).sum(),
    };

    let mut entries: Vec<RankedEntry> = batch
        .iter()
        .map(|t| RankedEntry {
            id: t.token_id.clone(),
            win_count: t.total_wins,
            position: 0,
            total_win_share: percent(t.total_wins as f64, global_total),
            participation_win_share: share(t.total_wins, t.total_races),
            total_participations: t.total_races,
        })
        .collect();

    match criterion {
        SortCriterion::ByWinCount => entries.sort_by(|a, b| b.win_count.cmp(&a.win_count)),
        SortCriterion::ByTotalWinShare => {
            entries.sort_by(|a, b| descending(a.total_win_share, b.total_win_share))
        }
        SortCriterion::ByParticipationWinShare => entries.sort_by(|a, b| {
            descending(a.participation_win_share, b.participation_win_share)
        }),
    }

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.position = index + 1;
    }
    entries
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
