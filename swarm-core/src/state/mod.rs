//! Engine state machine
//!
//! Replaces an ad-hoc "busy" flag with explicit states, so re-entrant calls
//! from observer callbacks are refused deterministically.

pub mod events;
pub mod machine;

pub use events::EngineEvent;
pub use machine::EngineState;
