use crate::search::Ranked;

/// How many leaders the dashboard puts on the podium.
pub const PODIUM_SIZE: usize = 3;

/// The first `n` rows of a ranked list.
pub fn top<T: Clone>(entries: &[T], n: usize) -> Vec<T> {
    entries.iter().take(n).cloned().collect()
}

/// Arrange a full podium as second, first, third so the winner stands in
/// the middle. Anything other than exactly three rows is returned as is.
pub fn podium_order<T: Ranked + Clone>(top: &[T]) -> Vec<T> {
    if top.len() != PODIUM_SIZE {
        return top.to_vec();
    }
    let Some(first) = top.iter().find(|e| e.position() == 1) else {
        return top.to_vec();
    };
    let others: Vec<&T> = top.iter().filter(|e| e.position() != 1).collect();
    if others.len() != 2 {
        return top.to_vec();
    }
    vec![others[0].clone(), first.clone(), others[1].clone()]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_position(position: usize) -> Option<Medal> {
        match position {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Medal::Gold => "🥇",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
        }
    }
}

/// Medal glyph for the top three, the plain position otherwise.
pub fn position_label(position: usize) -> String {
    match Medal::for_position(position) {
        Some(medal) => medal.glyph().to_string(),
        None => position.to_string(),
    }
}
