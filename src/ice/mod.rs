//! ICE candidates — data model, priority and SDP candidate lines.
//!
//! Covers the candidate value types only (RFC 8445 section 5.1):
//! 1. Host, server-reflexive, peer-reflexive and relayed candidate kinds
//! 2. Priority from type preference, local preference and component ID
//! 3. Single-line encoding consumed by SDP writers
//!
//! Gathering, connectivity checks and pairing live elsewhere and only see
//! candidates through the [`Candidate`] trait.

pub mod candidate;
pub mod error;
pub mod priority;

pub use candidate::{
    sort_by_priority, Candidate, CandidateBase, CandidateHost, CandidatePrflx, CandidateRelay,
    CandidateSrflx, CandidateType, PrioritizedCandidate, Protocol, RelatedAddress,
};
pub use error::{validate_port, ValidationError};
pub use priority::{Component, FixedDraw, LocalPreferenceSource, OsRandom};
