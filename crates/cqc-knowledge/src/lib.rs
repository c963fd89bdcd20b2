pub mod retrieval;

pub use retrieval::{education_snippet, retrieve, trust_snippet, ScoredEntry, DEFAULT_TOP_K};
