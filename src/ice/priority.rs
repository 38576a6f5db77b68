//! Candidate priority per RFC 8445 section 5.1.2.1.
//!
//! ```text
//! priority = (2^24) * type preference
//!          + (2^8)  * local preference
//!          + (2^0)  * (256 - component ID)
//! ```
//!
//! The three factors occupy disjoint bit bands (type in the top byte, local
//! preference in the middle 16 bits, component in the low byte), so they are
//! composed with shifts and OR. A higher band always dominates a lower one.

use std::fmt;
use std::str::FromStr;

use super::error::ValidationError;

/// Type preference of host candidates.
pub const HOST_PREFERENCE: u16 = 126;
/// Type preference of peer-reflexive candidates.
pub const PRFLX_PREFERENCE: u16 = 110;
/// Type preference of server-reflexive candidates.
pub const SRFLX_PREFERENCE: u16 = 100;
/// Type preference of relayed candidates.
pub const RELAY_PREFERENCE: u16 = 0;

/// ICE component ID (1..=256).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Component(u16);

impl Component {
    /// RTP component.
    pub const RTP: Component = Component(1);
    /// RTCP component.
    pub const RTCP: Component = Component(2);

    pub fn new(id: u16) -> Result<Self, ValidationError> {
        if (1..=256).contains(&id) {
            Ok(Component(id))
        } else {
            Err(ValidationError::ComponentOutOfRange(id as i64))
        }
    }

    pub fn id(self) -> u16 {
        self.0
    }
}

impl Default for Component {
    fn default() -> Self {
        Component::RTP
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Component {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidComponent(s.to_string()))?;
        let id = u16::try_from(value).map_err(|_| ValidationError::ComponentOutOfRange(value))?;
        Component::new(id)
    }
}

/// Source of the 32-bit random value behind each local preference.
pub trait LocalPreferenceSource {
    fn next_u32(&mut self) -> u32;
}

/// Draws from the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl LocalPreferenceSource for OsRandom {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).expect("OS CSPRNG failed");
        u32::from_be_bytes(buf)
    }
}

/// Always returns the same draw. Makes priorities reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDraw(pub u32);

impl LocalPreferenceSource for FixedDraw {
    fn next_u32(&mut self) -> u32 {
        self.0
    }
}

/// Take one draw from `source` and reduce it to a 16-bit local preference:
/// halve the 32-bit value, keep the low 16 bits.
pub fn draw_local_preference(source: &mut dyn LocalPreferenceSource) -> u16 {
    (source.next_u32() / 2) as u16
}

/// Compose the priority from its three factors.
pub fn compute_priority(type_preference: u16, local_preference: u16, component: Component) -> u32 {
    // type preference is confined to the top byte
    ((u32::from(type_preference) & 0xFF) << 24)
        | ((local_preference as u32) << 8)
        | (256 - component.id() as u32)
}
