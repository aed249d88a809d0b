use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::interaction::{InteractionStatus, TrackedInteraction};

/// Local lifecycle of an interaction.
///
/// SUBMITTED → POLLING → COMPLETED | FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollState {
    Submitted,
    Polling,
    Completed,
    Failed,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PollState::Completed | PollState::Failed)
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollState::Submitted => write!(f, "SUBMITTED"),
            PollState::Polling => write!(f, "POLLING"),
            PollState::Completed => write!(f, "COMPLETED"),
            PollState::Failed => write!(f, "FAILED"),
        }
    }
}

/// What the poll loop should do after observing a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Wait one interval and poll again.
    Continue,
    /// The job finished; hand the payload back.
    Complete,
    /// The job failed remotely.
    Fail,
}

/// Drives a [`TrackedInteraction`] from observed statuses.
pub struct StateMachine;

impl StateMachine {
    /// Record one poll result and compute the next transition.
    ///
    /// Terminal states are absorbing: once completed or failed, further
    /// observations do not change the state.
    pub fn next(tracked: &mut TrackedInteraction, status: &InteractionStatus) -> Transition {
        if tracked.state.is_terminal() {
            return Self::terminal_transition(tracked.state);
        }

        tracked.poll_count += 1;
        tracked.updated_at = Utc::now();

        let next_state = match status {
            InteractionStatus::Completed => PollState::Completed,
            InteractionStatus::Failed => PollState::Failed,
            InteractionStatus::InProgress(_) => PollState::Polling,
        };

        if next_state != tracked.state {
            tracked.state_history.push(tracked.state);
            tracked.state = next_state;
        }

        match next_state {
            PollState::Completed | PollState::Failed => Self::terminal_transition(next_state),
            _ => Transition::Continue,
        }
    }

    fn terminal_transition(state: PollState) -> Transition {
        match state {
            PollState::Failed => Transition::Fail,
            _ => Transition::Complete,
        }
    }
}
