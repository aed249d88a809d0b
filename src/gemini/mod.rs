pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, InteractionTransport};
pub use error::GeminiError;
pub use types::JobRequest;
