//! Leaderboard state containers.
//!
//! Each board owns its canonical inputs (the latest batch or the running
//! tally, the search query, the sort criterion) and keeps the derived views
//! (full ranking, podium, filtered rows) in sync. Every mutator recomputes
//! all derived views before returning, so a reader never sees a ranking from
//! one input next to a filter from another.

use crate::error::FeedError;
use crate::podium::{podium_order, top, PODIUM_SIZE};
use crate::protocol::{parse_token_stats, RaceResult, RacesView, TokenSummary, TokensView};
use crate::ranking::{rank_tokens, total_races, RankedEntry, ShareDenominator, SortCriterion};
use crate::search::filter;
use crate::tally::{RaceTally, StreamEntry};

/// Leaderboard over `/api/stats/tokens` snapshots.
#[derive(Clone, Debug)]
pub struct TokenBoard {
    batch: Vec<TokenSummary>,
    applied_seq: Option<u64>,
    criterion: SortCriterion,
    denominator: ShareDenominator,
    query: String,
    top_n: usize,

    ranked: Vec<RankedEntry>,
    top: Vec<RankedEntry>,
    filtered: Vec<RankedEntry>,
    total_races: u64,
}

impl TokenBoard {
    pub fn new(criterion: SortCriterion, denominator: ShareDenominator) -> Self {
        Self {
            batch: Vec::new(),
            applied_seq: None,
            criterion,
            denominator,
            query: String::new(),
            top_n: PODIUM_SIZE,
            ranked: Vec::new(),
            top: Vec::new(),
            filtered: Vec::new(),
            total_races: 0,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self.recompute();
        self
    }

    /// Replace the snapshot with the response to request `seq`.
    ///
    /// Responses older than the last applied one are dropped; returns whether
    /// the batch was applied.
    pub fn apply_batch(&mut self, seq: u64, batch: Vec<TokenSummary>) -> bool {
        if matches!(self.applied_seq, Some(applied) if seq < applied) {
            return false;
        }
        self.applied_seq = Some(seq);
        self.batch = batch;
        self.recompute();
        true
    }

    /// Parse a raw response body and apply it. A malformed body changes nothing.
    pub fn apply_response(&mut self, seq: u64, body: &str) -> Result<bool, FeedError> {
        let batch = parse_token_stats(body)?;
        Ok(self.apply_batch(seq, batch))
    }

    pub fn set_criterion(&mut self, criterion: SortCriterion) {
        if self.criterion != criterion {
            self.criterion = criterion;
            self.recompute();
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.filtered = filter(&self.ranked, &self.query);
    }

    pub fn criterion(&self) -> SortCriterion {
        self.criterion
    }

    pub fn denominator(&self) -> ShareDenominator {
        self.denominator
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn applied_seq(&self) -> Option<u64> {
        self.applied_seq
    }

    pub fn batch(&self) -> &[TokenSummary] {
        &self.batch
    }

    pub fn ranked(&self) -> &[RankedEntry] {
        &self.ranked
    }

    pub fn top(&self) -> &[RankedEntry] {
        &self.top
    }

    pub fn filtered(&self) -> &[RankedEntry] {
        &self.filtered
    }

    pub fn total_races(&self) -> u64 {
        self.total_races
    }

    /// The board's own view.
    pub fn view(&self) -> TokensView {
        TokensView::new(
            self.criterion,
            self.total_races,
            podium_order(&self.top),
            self.filtered.clone(),
        )
    }

    /// A view of the same snapshot under another viewer's criterion and query,
    /// leaving this board untouched.
    pub fn view_as(&self, criterion: SortCriterion, query: &str) -> TokensView {
        if criterion == self.criterion {
            return TokensView::new(
                criterion,
                self.total_races,
                podium_order(&self.top),
                filter(&self.ranked, query),
            );
        }
        let ranked = rank_tokens(&self.batch, criterion, self.denominator);
        TokensView::new(
            criterion,
            self.total_races,
            podium_order(&top(&ranked, self.top_n)),
            filter(&ranked, query),
        )
    }

    fn recompute(&mut self) {
        self.ranked = rank_tokens(&self.batch, self.criterion, self.denominator);
        self.top = top(&self.ranked, self.top_n);
        self.filtered = filter(&self.ranked, &self.query);
        self.total_races = total_races(&self.batch);
    }
}

/// Live leaderboard over the race result stream.
#[derive(Clone, Debug)]
pub struct StreamBoard {
    tally: RaceTally,
    query: String,
    top_n: usize,

    top: Vec<StreamEntry>,
    filtered: Vec<StreamEntry>,
}

impl Default for StreamBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamBoard {
    pub fn new() -> Self {
        Self {
            tally: RaceTally::new(),
            query: String::new(),
            top_n: PODIUM_SIZE,
            top: Vec::new(),
            filtered: Vec::new(),
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self.recompute();
        self
    }

    pub fn absorb(&mut self, batch: &[RaceResult]) {
        self.tally.absorb(batch);
        self.recompute();
    }

    /// Absorb a raw stream message; on error the board is left as it was.
    pub fn absorb_message(&mut self, text: &str) -> Result<usize, FeedError> {
        let absorbed = self.tally.absorb_message(text)?;
        self.recompute();
        Ok(absorbed)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.filtered = filter(self.tally.ranking(), &self.query);
    }

    pub fn reset(&mut self) {
        self.tally.reset();
        self.recompute();
    }

    pub fn tally(&self) -> &RaceTally {
        &self.tally
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn ranked(&self) -> &[StreamEntry] {
        self.tally.ranking()
    }

    pub fn top(&self) -> &[StreamEntry] {
        &self.top
    }

    pub fn filtered(&self) -> &[StreamEntry] {
        &self.filtered
    }

    pub fn view(&self) -> RacesView {
        RacesView::new(
            self.tally.total_absorbed(),
            podium_order(&self.top),
            self.filtered.clone(),
        )
    }

    pub fn view_as(&self, query: &str) -> RacesView {
        RacesView::new(
            self.tally.total_absorbed(),
            podium_order(&self.top),
            filter(self.tally.ranking(), query),
        )
    }

    fn recompute(&mut self) {
        self.top = top(self.tally.ranking(), self.top_n);
        self.filtered = filter(self.tally.ranking(), &self.query);
    }
}
