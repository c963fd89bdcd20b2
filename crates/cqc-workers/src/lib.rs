//! Background tenant workers: Ghost Protocol follow-ups, new-property match
//! notifications, and the daily digest (spec §4.7/§4.8, SPEC_FULL.md
//! supplement). Each worker owns a `tokio::select!` tick loop over a fixed
//! interval (or an event stream) and a shutdown watch channel, the shape of
//! the teacher's scheduler engine.

pub mod digest;
pub mod error;
pub mod ghost;
pub mod match_notifier;
pub mod notifier;

pub use digest::DigestWorker;
pub use error::{Result, WorkerError};
pub use ghost::GhostWorker;
pub use match_notifier::MatchNotifier;
pub use notifier::Notifier;
