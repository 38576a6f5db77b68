//! ICE candidate types and their single-line encoding.
//!
//! Every candidate kind embeds a [`CandidateBase`] and implements the
//! [`Candidate`] trait. Consumers work through the trait only: they ask for
//! the base record, a priority, or the encoded line, and never need to know
//! which concrete kind they hold.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::priority::{
    compute_priority, draw_local_preference, Component, LocalPreferenceSource, OsRandom,
    HOST_PREFERENCE, PRFLX_PREFERENCE, RELAY_PREFERENCE, SRFLX_PREFERENCE,
};

// ---------------------------------------------------------------------------
// Protocol and candidate type
// ---------------------------------------------------------------------------

/// ICE transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Udp,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => write!(f, "udp"),
            Protocol::Tcp => write!(f, "tcp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            _ => Err(ValidationError::UnknownProtocol(s.to_string())),
        }
    }
}

/// ICE candidate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateType {
    #[serde(rename = "host")]
    Host,
    #[serde(rename = "srflx")]
    ServerReflexive,
    #[serde(rename = "prflx")]
    PeerReflexive,
    #[serde(rename = "relay")]
    Relay,
}

impl CandidateType {
    /// Type preference: 126 for host, 110 for peer reflexive, 100 for server
    /// reflexive and 0 for relayed candidates.
    pub fn preference(self) -> u16 {
        match self {
            CandidateType::Host => HOST_PREFERENCE,
            CandidateType::PeerReflexive => PRFLX_PREFERENCE,
            CandidateType::ServerReflexive => SRFLX_PREFERENCE,
            CandidateType::Relay => RELAY_PREFERENCE,
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CandidateType::Host => "host",
            CandidateType::ServerReflexive => "srflx",
            CandidateType::PeerReflexive => "prflx",
            CandidateType::Relay => "relay",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Shared records
// ---------------------------------------------------------------------------

/// Fields shared by every candidate kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBase {
    protocol: Protocol,
    address: String,
    port: u16,
    last_seen: DateTime<Utc>,
}

impl CandidateBase {
    pub fn new(
        protocol: Protocol,
        address: impl Into<String>,
        port: u16,
    ) -> Result<Self, ValidationError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        Ok(Self {
            protocol,
            address,
            port,
            last_seen: Utc::now(),
        })
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Last time traffic was seen on this candidate. Not used for priority
    /// or encoding.
    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    pub fn set_last_seen(&mut self, at: DateTime<Utc>) {
        self.last_seen = at;
    }

    /// Mark the candidate as seen now.
    pub fn seen(&mut self) {
        self.last_seen = Utc::now();
    }
}

/// The `raddr`/`rport` pair carried by non-host candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedAddress {
    address: String,
    port: u16,
}

impl RelatedAddress {
    pub fn new(address: impl Into<String>, port: u16) -> Result<Self, ValidationError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(ValidationError::MissingRemoteAddress);
        }
        Ok(Self { address, port })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

// ---------------------------------------------------------------------------
// Candidate trait
// ---------------------------------------------------------------------------

/// An ICE candidate.
pub trait Candidate: fmt::Debug + Send + Sync {
    /// Attributes shared between all candidates.
    fn base(&self) -> &CandidateBase;

    fn base_mut(&mut self) -> &mut CandidateBase;

    fn candidate_type(&self) -> CandidateType;

    /// Related transport address, for kinds that carry one.
    fn related_address(&self) -> Option<&RelatedAddress> {
        None
    }

    /// Priority for `component`, taking one local preference draw from
    /// `source`.
    fn priority_with(&self, component: Component, source: &mut dyn LocalPreferenceSource) -> u32 {
        let local_preference = draw_local_preference(source);
        let priority = compute_priority(
            self.candidate_type().preference(),
            local_preference,
            component,
        );
        tracing::debug!(
            "{} candidate {}:{} component {} local preference {} -> priority {}",
            self.candidate_type(),
            self.base().address(),
            self.base().port(),
            component,
            local_preference,
            priority
        );
        priority
    }

    /// Priority for `component` with a fresh OS random draw. Differs between
    /// calls; cache it (see [`PrioritizedCandidate`]) if it must be stable.
    fn priority(&self, component: Component) -> u32 {
        self.priority_with(component, &mut OsRandom)
    }

    /// Encode with an already computed priority.
    fn to_sdp_line_with_priority(&self, component: Component, priority: u32) -> String {
        let base = self.base();
        let mut line = format!(
            "{} {} {} {} {} typ {}",
            component,
            base.protocol(),
            priority,
            base.address(),
            base.port(),
            self.candidate_type()
        );
        if let Some(related) = self.related_address() {
            line.push_str(&format!(
                " raddr {} rport {}",
                related.address(),
                related.port()
            ));
        }
        line.push_str(" generation 0");
        line
    }

    /// Encode for `component`, drawing the priority from `source`.
    fn to_sdp_line_with(
        &self,
        component: Component,
        source: &mut dyn LocalPreferenceSource,
    ) -> String {
        let priority = self.priority_with(component, source);
        self.to_sdp_line_with_priority(component, priority)
    }

    /// Encode for `component`, e.g. `1 udp 2130706431 10.0.0.5 54321 typ host generation 0`.
    fn to_sdp_line(&self, component: Component) -> String {
        self.to_sdp_line_with(component, &mut OsRandom)
    }
}

// ---------------------------------------------------------------------------
// Candidate kinds
// ---------------------------------------------------------------------------

/// Candidate bound directly to a local interface.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateHost {
    base: CandidateBase,
}

impl CandidateHost {
    pub fn new(base: CandidateBase) -> Self {
        Self { base }
    }

    pub fn address(&self) -> &str {
        self.base.address()
    }

    pub fn port(&self) -> u16 {
        self.base.port()
    }
}

impl Candidate for CandidateHost {
    fn base(&self) -> &CandidateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CandidateBase {
        &mut self.base
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::Host
    }
}

/// Server-reflexive candidate: the mapping a STUN server observed for the
/// local binding.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSrflx {
    base: CandidateBase,
    remote: RelatedAddress,
}

impl CandidateSrflx {
    pub fn new(base: CandidateBase, remote: RelatedAddress) -> Self {
        Self { base, remote }
    }

    pub fn remote_address(&self) -> &str {
        self.remote.address()
    }

    pub fn remote_port(&self) -> u16 {
        self.remote.port()
    }
}

impl Candidate for CandidateSrflx {
    fn base(&self) -> &CandidateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CandidateBase {
        &mut self.base
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::ServerReflexive
    }

    fn related_address(&self) -> Option<&RelatedAddress> {
        Some(&self.remote)
    }
}

/// Relayed candidate allocated on a TURN server.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRelay {
    base: CandidateBase,
    related: RelatedAddress,
}

impl CandidateRelay {
    pub fn new(base: CandidateBase, related: RelatedAddress) -> Self {
        Self { base, related }
    }
}

impl Candidate for CandidateRelay {
    fn base(&self) -> &CandidateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CandidateBase {
        &mut self.base
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::Relay
    }

    fn related_address(&self) -> Option<&RelatedAddress> {
        Some(&self.related)
    }
}

/// Peer-reflexive candidate learned from a peer's connectivity check.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePrflx {
    base: CandidateBase,
    related: RelatedAddress,
}

impl CandidatePrflx {
    pub fn new(base: CandidateBase, related: RelatedAddress) -> Self {
        Self { base, related }
    }
}

impl Candidate for CandidatePrflx {
    fn base(&self) -> &CandidateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CandidateBase {
        &mut self.base
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::PeerReflexive
    }

    fn related_address(&self) -> Option<&RelatedAddress> {
        Some(&self.related)
    }
}

// ---------------------------------------------------------------------------
// Cached priorities
// ---------------------------------------------------------------------------

/// A candidate paired with a priority drawn once, so every encoding of it
/// agrees.
#[derive(Debug)]
pub struct PrioritizedCandidate {
    candidate: Box<dyn Candidate>,
    component: Component,
    priority: u32,
}

impl PrioritizedCandidate {
    pub fn new(
        candidate: Box<dyn Candidate>,
        component: Component,
        source: &mut dyn LocalPreferenceSource,
    ) -> Self {
        let priority = candidate.priority_with(component, source);
        Self {
            candidate,
            component,
            priority,
        }
    }

    pub fn candidate(&self) -> &dyn Candidate {
        self.candidate.as_ref()
    }

    pub fn candidate_mut(&mut self) -> &mut dyn Candidate {
        self.candidate.as_mut()
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn to_sdp_line(&self) -> String {
        self.candidate
            .to_sdp_line_with_priority(self.component, self.priority)
    }
}

/// Order candidates highest priority first.
pub fn sort_by_priority(candidates: &mut [PrioritizedCandidate]) {
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
}
