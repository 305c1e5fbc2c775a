use serde::Serialize;
use std::collections::HashMap;

use crate::error::FeedError;
use crate::protocol::{parse_race_results, RaceResult};

/// A winner's row on the live race leaderboard.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreamEntry {
    pub id: String,
    pub address: String,
    pub win_count: u64,
    pub position: usize,
}

#[derive(Clone, Debug)]
struct Tally {
    id: String,
    address: String,
    count: u64,
}

/// Running per-winner tally over the race stream.
///
/// Entries keep the order in which their id was first seen; that order is the
/// tie-break of the ranking. The ranking is rebuilt once per absorbed batch,
/// so `ranking()` always reflects a completed `absorb`.
#[derive(Clone, Debug, Default)]
pub struct RaceTally {
    tallies: Vec<Tally>,
    index: HashMap<String, usize>,
    absorbed: u64,
    ranking: Vec<StreamEntry>,
}

impl RaceTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every result in `batch`, in order, then re-rank.
    ///
    /// A winner's address is the one on its first result; later results with a
    /// different address only add to the count.
    pub fn absorb(&mut self, batch: &[RaceResult]) {
        for result in batch {
            let slot = match self.index.get(&result.winning_token_id) {
                Some(&slot) => slot,
                None => {
                    let slot = self.tallies.len();
                    self.tallies.push(Tally {
                        id: result.winning_token_id.clone(),
                        address: result.winner_address.clone(),
                        count: 0,
                    });
                    self.index.insert(result.winning_token_id.clone(), slot);
                    slot
                }
            };
            self.tallies[slot].count += 1;
            self.absorbed += 1;
        }
        self.rerank();
    }

    /// Parse a raw `{ "data": [...] }` message and absorb it.
    ///
    /// On a parse failure nothing is counted and the previous ranking stays.
    pub fn absorb_message(&mut self, text: &str) -> Result<usize, FeedError> {
        let batch = parse_race_results(text)?;
        self.absorb(&batch);
        Ok(batch.len())
    }

    pub fn ranking(&self) -> &[StreamEntry] {
        &self.ranking
    }

    pub fn count_of(&self, id: &str) -> Option<u64> {
        self.index.get(id).map(|&slot| self.tallies[slot].count)
    }

    pub fn address_of(&self, id: &str) -> Option<&str> {
        self.index
            .get(id)
            .map(|&slot| self.tallies[slot].address.as_str())
    }

    /// Number of results absorbed since creation or the last reset.
    pub fn total_absorbed(&self) -> u64 {
        self.absorbed
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Forget everything, as on a fresh subscription.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn rerank(&mut self) {
        let mut ranking: Vec<StreamEntry> = self
            .tallies
            .iter()
            .map(|t| StreamEntry {
                id: t.id.clone(),
                address: t.address.clone(),
                win_count: t.count,
                position: 0,
            })
            .collect();
        // stable: ties keep first-seen order
        ranking.sort_by(|a, b| b.win_count.cmp(&a.win_count));
        for (index, entry) in ranking.iter_mut().enumerate() {
            entry.position = index + 1;
        }
        self.ranking = ranking;
    }
}
