//! Data models

pub mod candidate;

pub use candidate::CandidateRecord;
