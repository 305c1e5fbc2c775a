use rust_fsm::*;
use serde::Serialize;

/// Lifecycle of an upstream feed (stats poller or race stream).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedState {
    #[default]
    Idle,
    Connecting,
    Live,
    Lost,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    Connect,
    Established,
    Failed,
    Dropped,
    Stop,
}

impl StateMachineImpl for FeedState {
    type Input = FeedEvent;
    type State = FeedState;
    type Output = ();
    const INITIAL_STATE: Self::State = FeedState::Idle;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        match (state, input) {
            (FeedState::Idle, FeedEvent::Connect) => Some(FeedState::Connecting),
            (FeedState::Lost, FeedEvent::Connect) => Some(FeedState::Connecting),
            (FeedState::Connecting, FeedEvent::Established) => Some(FeedState::Live),
            (FeedState::Connecting, FeedEvent::Failed) => Some(FeedState::Lost),
            (FeedState::Live, FeedEvent::Dropped) => Some(FeedState::Lost),
            (FeedState::Stopped, _) => None,
            (_, FeedEvent::Stop) => Some(FeedState::Stopped),
            _ => None,
        }
    }

    fn output(_state: &Self::State, _input: &Self::Input) -> Option<Self::Output> {
        None
    }
}

impl FeedState {
    /// Apply `event`, keeping the current state when the move is not allowed.
    pub fn advance(&mut self, event: FeedEvent) -> bool {
        match <FeedState as StateMachineImpl>::transition(self, &event) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}
