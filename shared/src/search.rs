use crate::ranking::RankedEntry;
use crate::tally::StreamEntry;

/// A row of a ranked list.
pub trait Ranked {
    fn id(&self) -> &str;
    fn position(&self) -> usize;

    /// Whether a search query selects this row. Empty queries select all.
    fn matches(&self, query: &str) -> bool {
        self.id().contains(query)
    }
}

impl Ranked for RankedEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> usize {
        self.position
    }
}

impl Ranked for StreamEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> usize {
        self.position
    }

    /// Ids match case-sensitively, addresses case-insensitively.
    fn matches(&self, query: &str) -> bool {
        self.id.contains(query) || self.address.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Rows selected by `query`, in their original order and with their original
/// positions.
pub fn filter<T: Ranked + Clone>(entries: &[T], query: &str) -> Vec<T> {
    entries.iter().filter(|e| e.matches(query)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TokenSummary;
    use crate::ranking::{rank_tokens, ShareDenominator, SortCriterion};

    fn tokens() -> Vec<RankedEntry> {
        let batch: Vec<TokenSummary> = [("101", 5), ("2024", 9), ("310", 1)]
            .iter()
            .map(|(id, wins)| TokenSummary {
                token_id: id.to_string(),
                total_wins: *wins,
                total_races: 10,
            })
            .collect();
        rank_tokens(&batch, SortCriterion::ByWinCount, ShareDenominator::Wins)
    }

    fn winners() -> Vec<StreamEntry> {
        vec![
            StreamEntry {
                id: "Kart".to_string(),
                address: "0xAbCd01".to_string(),
                win_count: 4,
                position: 1,
            },
            StreamEntry {
                id: "zoom".to_string(),
                address: "0xfeed02".to_string(),
                win_count: 2,
                position: 2,
            },
        ]
    }

    #[test]
    fn empty_query_keeps_everything() {
        let entries = tokens();
        assert_eq!(filter(&entries, ""), entries);
        assert_eq!(filter(&winners(), ""), winners());
    }

    #[test]
    fn keeps_original_positions() {
        let hits = filter(&tokens(), "10");
        let found: Vec<(&str, usize)> = hits.iter().map(|e| (e.id.as_str(), e.position)).collect();
        // "2024" is ranked 1st, "101" 2nd, "310" 3rd
        assert_eq!(found, vec![("101", 2), ("310", 3)]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter(&tokens(), "999").is_empty());
        assert!(filter(&winners(), "nope").is_empty());
    }

    #[test]
    fn token_ids_are_case_sensitive() {
        let hits = filter(&winners(), "kart");
        assert!(hits.is_empty());
        assert_eq!(filter(&winners(), "Kart").len(), 1);
    }

    #[test]
    fn addresses_are_case_insensitive() {
        let hits = filter(&winners(), "ABCD");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "Kart");
        assert_eq!(filter(&winners(), "FEED")[0].position, 2);
    }
}
