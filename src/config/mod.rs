//! Configuration: defaults and the candidate set listed by `ice-cli list`

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ice::{
    validate_port, Candidate, CandidateBase, CandidateHost, CandidatePrflx, CandidateRelay,
    CandidateSrflx, CandidateType, Component, LocalPreferenceSource, PrioritizedCandidate,
    Protocol, RelatedAddress, ValidationError,
};

fn default_component() -> u16 {
    Component::RTP.id()
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Component ID used when encoding configured candidates
    #[serde(default = "default_component")]
    pub component: u16,
    /// Protocol for entries that don't name one
    #[serde(default)]
    pub protocol: Protocol,
    /// Candidates, as an external gatherer would have produced them
    #[serde(default)]
    pub candidates: Vec<CandidateEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            component: default_component(),
            protocol: Protocol::default(),
            candidates: Vec::new(),
        }
    }
}

/// One `[[candidates]]` table.
///
/// Ports are read as plain integers so out-of-range values are reported
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub kind: CandidateType,
    pub address: String,
    pub port: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raddr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rport: Option<i64>,
}

impl CandidateEntry {
    /// Validate the entry and build the matching candidate kind.
    pub fn to_candidate(
        &self,
        default_protocol: Protocol,
    ) -> Result<Box<dyn Candidate>, ValidationError> {
        let port = validate_port(self.port)?;
        let protocol = self.protocol.unwrap_or(default_protocol);
        let base = CandidateBase::new(protocol, self.address.as_str(), port)?;

        let candidate: Box<dyn Candidate> = match self.kind {
            CandidateType::Host => Box::new(CandidateHost::new(base)),
            CandidateType::ServerReflexive => {
                Box::new(CandidateSrflx::new(base, self.related_address()?))
            }
            CandidateType::Relay => Box::new(CandidateRelay::new(base, self.related_address()?)),
            CandidateType::PeerReflexive => {
                Box::new(CandidatePrflx::new(base, self.related_address()?))
            }
        };
        Ok(candidate)
    }

    fn related_address(&self) -> Result<RelatedAddress, ValidationError> {
        match (&self.raddr, self.rport) {
            (Some(raddr), Some(rport)) => RelatedAddress::new(raddr.as_str(), validate_port(rport)?),
            _ => Err(ValidationError::MissingRemoteAddress),
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "ice-cli", "ice-cli")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get default config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        tracing::debug!(
            "Loaded {} candidate(s) from {}",
            config.candidates.len(),
            path.display()
        );
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn component(&self) -> Result<Component> {
        Component::new(self.component).context("Invalid component in config")
    }

    /// Build every configured candidate and draw its priority once.
    pub fn prioritized(
        &self,
        source: &mut dyn LocalPreferenceSource,
    ) -> Result<Vec<PrioritizedCandidate>> {
        let component = self.component()?;
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<PrioritizedCandidate> {
                let candidate = entry
                    .to_candidate(self.protocol)
                    .with_context(|| format!("Invalid candidate #{} ({})", i + 1, entry.address))?;
                Ok(PrioritizedCandidate::new(candidate, component, &mut *source))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ice::FixedDraw;

    const SAMPLE: &str = r#"
component = 1
protocol = "udp"

[[candidates]]
kind = "srflx"
address = "203.0.113.9"
port = 60000
raddr = "10.0.0.5"
rport = 54321

[[candidates]]
kind = "host"
address = "10.0.0.5"
port = 54321

[[candidates]]
kind = "relay"
protocol = "tcp"
address = "52.114.0.1"
port = 3478
raddr = "203.0.113.9"
rport = 60000
"#;

    #[test]
    fn test_parse_sample() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.component, 1);
        assert_eq!(config.candidates.len(), 3);
        assert_eq!(config.candidates[0].kind, CandidateType::ServerReflexive);
        assert_eq!(config.candidates[2].protocol, Some(Protocol::Tcp));
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.component().unwrap(), Component::RTP);
    }

    #[test]
    fn test_prioritized_builds_every_kind() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let list = config.prioritized(&mut FixedDraw(0)).unwrap();
        let kinds: Vec<CandidateType> =
            list.iter().map(|c| c.candidate().candidate_type()).collect();
        assert_eq!(
            kinds,
            vec![
                CandidateType::ServerReflexive,
                CandidateType::Host,
                CandidateType::Relay
            ]
        );
        assert_eq!(
            list[2].to_sdp_line(),
            "1 tcp 255 52.114.0.1 3478 typ relay raddr 203.0.113.9 rport 60000 generation 0"
        );
    }

    #[test]
    fn test_entry_validation() {
        let mut entry = CandidateEntry {
            kind: CandidateType::ServerReflexive,
            address: "10.0.0.5".into(),
            port: 54321,
            protocol: None,
            raddr: None,
            rport: None,
        };
        assert_eq!(
            entry.to_candidate(Protocol::Udp).unwrap_err(),
            ValidationError::MissingRemoteAddress
        );

        entry.raddr = Some("203.0.113.9".into());
        entry.rport = Some(70000);
        assert_eq!(
            entry.to_candidate(Protocol::Udp).unwrap_err(),
            ValidationError::PortOutOfRange(70000)
        );

        entry.rport = Some(60000);
        entry.port = -5;
        assert_eq!(
            entry.to_candidate(Protocol::Udp).unwrap_err(),
            ValidationError::PortOutOfRange(-5)
        );

        entry.port = 54321;
        entry.address = String::new();
        assert_eq!(
            entry.to_candidate(Protocol::Udp).unwrap_err(),
            ValidationError::EmptyAddress
        );
    }

    #[test]
    fn test_invalid_entry_reports_position() {
        let config: Config = toml::from_str(
            r#"
[[candidates]]
kind = "host"
address = ""
port = 1
"#,
        )
        .unwrap();
        let err = config.prioritized(&mut FixedDraw(0)).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid candidate #1"));
    }

    #[test]
    fn test_invalid_component() {
        let config: Config = toml::from_str("component = 0").unwrap();
        assert!(config.prioritized(&mut FixedDraw(0)).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let path = std::env::temp_dir()
            .join(format!("ice-cli-test-{}", std::process::id()))
            .join("config.toml");
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("ice-cli-does-not-exist/config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
