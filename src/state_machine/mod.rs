mod interaction;
mod state;

pub use interaction::{InteractionStatus, TrackedInteraction};
pub use state::{StateMachine, Transition};
