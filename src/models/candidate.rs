//! Candidate output model

use serde::Serialize;

use crate::ice::{Candidate, CandidateType, PrioritizedCandidate, Protocol};

/// A candidate with its cached priority, as printed by `list --json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    #[serde(rename = "type")]
    pub candidate_type: CandidateType,
    pub component: u16,
    pub protocol: Protocol,
    pub priority: u32,
    pub address: String,
    pub port: u16,
    pub related_address: Option<String>,
    pub related_port: Option<u16>,
    pub line: String,
}

impl From<&PrioritizedCandidate> for CandidateRecord {
    fn from(c: &PrioritizedCandidate) -> Self {
        let candidate: &dyn Candidate = c.candidate();
        let base = candidate.base();
        let related = candidate.related_address();
        Self {
            candidate_type: candidate.candidate_type(),
            component: c.component().id(),
            protocol: base.protocol(),
            priority: c.priority(),
            address: base.address().to_string(),
            port: base.port(),
            related_address: related.map(|r| r.address().to_string()),
            related_port: related.map(|r| r.port()),
            line: c.to_sdp_line(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ice::{CandidateBase, CandidateSrflx, Component, FixedDraw, RelatedAddress};

    #[test]
    fn test_record_json() {
        let srflx = CandidateSrflx::new(
            CandidateBase::new(Protocol::Udp, "10.0.0.5", 54321).unwrap(),
            RelatedAddress::new("203.0.113.9", 60000).unwrap(),
        );
        let c = PrioritizedCandidate::new(Box::new(srflx), Component::RTCP, &mut FixedDraw(0));
        let record = CandidateRecord::from(&c);
        let v = serde_json::to_value(&record).unwrap();

        assert_eq!(v["type"], "srflx");
        assert_eq!(v["component"], 2);
        assert_eq!(v["protocol"], "udp");
        assert_eq!(v["priority"], 1677721854u32);
        assert_eq!(v["relatedAddress"], "203.0.113.9");
        assert_eq!(v["relatedPort"], 60000);
        assert_eq!(
            v["line"],
            "2 udp 1677721854 10.0.0.5 54321 typ srflx raddr 203.0.113.9 rport 60000 generation 0"
        );
    }

    #[test]
    fn test_host_record_has_no_related_fields() {
        let host = crate::ice::CandidateHost::new(
            CandidateBase::new(Protocol::Tcp, "192.168.1.100", 5000).unwrap(),
        );
        let c = PrioritizedCandidate::new(Box::new(host), Component::RTP, &mut FixedDraw(0));
        let v = serde_json::to_value(CandidateRecord::from(&c)).unwrap();
        assert_eq!(v["type"], "host");
        assert!(v["relatedAddress"].is_null());
        assert!(v["relatedPort"].is_null());
    }
}
