use serde::Serialize;

use crate::podium::position_label;
use crate::ranking::RankedEntry;
use crate::tally::StreamEntry;

/// Placeholder shown instead of an undefined ratio.
pub const UNDEFINED: &str = "—";

/// Render a percentage share with `decimals` digits, or the placeholder when
/// the share is undefined.
pub fn format_share(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return UNDEFINED.to_string();
    }
    format!("{:.*}%", decimals, value)
}

pub fn format_wins(count: u64) -> String {
    format!("{} Wins", count)
}

/// Ready-to-print text for one leaderboard row.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowLabels {
    pub id: String,
    pub position: String,
    pub wins: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<String>,
}

impl From<&RankedEntry> for RowLabels {
    fn from(entry: &RankedEntry) -> Self {
        Self {
            id: entry.id.clone(),
            position: position_label(entry.position),
            wins: format_wins(entry.win_count),
            share: Some(format_share(entry.participation_win_share, 2)),
        }
    }
}

impl From<&StreamEntry> for RowLabels {
    fn from(entry: &StreamEntry) -> Self {
        Self {
            id: entry.id.clone(),
            position: position_label(entry.position),
            wins: format_wins(entry.win_count),
            share: None,
        }
    }
}

pub fn row_labels<'a, T>(entries: &'a [T]) -> Vec<RowLabels>
where
    RowLabels: From<&'a T>,
{
    entries.iter().map(RowLabels::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(66.666, 1), "66.7%");
        assert_eq!(format_share(50.0, 2), "50.00%");
        assert_eq!(format_share(0.0, 1), "0.0%");
    }

    #[test]
    fn test_undefined_share() {
        // 0 wins out of 0 races must not read as 0% or NaN%
        assert_eq!(format_share(f64::NAN, 2), "—");
        assert_eq!(format_share(f64::INFINITY, 1), "—");
    }

    #[test]
    fn test_format_wins() {
        assert_eq!(format_wins(7), "7 Wins");
    }

    #[test]
    fn test_row_labels() {
        let entries = vec![
            RankedEntry {
                id: "12".to_string(),
                win_count: 3,
                position: 1,
                total_win_share: 60.0,
                participation_win_share: 37.5,
                total_participations: 8,
            },
            RankedEntry {
                id: "40".to_string(),
                win_count: 0,
                position: 4,
                total_win_share: 0.0,
                participation_win_share: f64::NAN,
                total_participations: 0,
            },
        ];
        let labels = row_labels(&entries);
        assert_eq!(labels[0].position, "🥇");
        assert_eq!(labels[0].wins, "3 Wins");
        assert_eq!(labels[0].share.as_deref(), Some("37.50%"));
        assert_eq!(labels[1].position, "4");
        assert_eq!(labels[1].share.as_deref(), Some("—"));

        let winner = StreamEntry {
            id: "A".to_string(),
            address: "0xA".to_string(),
            win_count: 2,
            position: 2,
        };
        let labels = row_labels(std::slice::from_ref(&winner));
        assert_eq!(labels[0].position, "🥈");
        assert_eq!(labels[0].share, None);
    }
}
