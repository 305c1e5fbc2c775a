pub mod board;
pub mod error;
pub mod format;
pub mod fsm;
pub mod podium;
pub mod protocol;
pub mod ranking;
pub mod search;
pub mod tally;
