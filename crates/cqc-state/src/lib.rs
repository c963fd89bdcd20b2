//! Lead state machine: phase handlers, scoring, scarcity annotation, the
//! per-lead lock manager, and the deterministic budget/contact parsers
//! (spec §4).

pub mod budget;
pub mod contact;
pub mod error;
pub mod handlers;
pub mod lock;
pub mod machine;
pub mod messages;
pub mod scarcity;
pub mod scoring;
pub mod slots;

pub use error::StateError;
pub use lock::LeadLockManager;
pub use machine::StateMachine;
