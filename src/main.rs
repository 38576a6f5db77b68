//! ice-cli - build ICE candidates and print their SDP candidate lines
//!
//! Encodes ad-hoc host/srflx/relay/prflx candidates, or lists the candidates
//! from the config file ranked by priority.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ice_cli::config::Config;
use ice_cli::ice::{
    sort_by_priority, Candidate, CandidateBase, CandidateHost, CandidatePrflx, CandidateRelay,
    CandidateSrflx, Component, FixedDraw, LocalPreferenceSource, OsRandom, Protocol,
    RelatedAddress,
};
use ice_cli::models::CandidateRecord;

#[derive(Parser)]
#[command(name = "ice-cli")]
#[command(about = "Build ICE candidates and print their SDP candidate lines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct EndpointArgs {
    /// Candidate address (IP or hostname)
    #[arg(short, long)]
    address: String,

    /// Candidate port
    #[arg(short, long)]
    port: u16,

    /// Transport protocol: udp or tcp
    #[arg(long, default_value = "udp")]
    protocol: Protocol,

    /// ICE component ID (1 = RTP, 2 = RTCP)
    #[arg(long, default_value = "1")]
    component: Component,

    /// Fixed 32-bit draw for the local preference (reproducible priority)
    #[arg(long)]
    seed: Option<u32>,
}

#[derive(Args)]
struct RelatedArgs {
    /// Related address (raddr)
    #[arg(long)]
    raddr: String,

    /// Related port (rport)
    #[arg(long)]
    rport: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a host candidate
    Host {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Encode a server-reflexive candidate
    Srflx {
        #[command(flatten)]
        endpoint: EndpointArgs,
        #[command(flatten)]
        related: RelatedArgs,
    },

    /// Encode a relayed candidate
    Relay {
        #[command(flatten)]
        endpoint: EndpointArgs,
        #[command(flatten)]
        related: RelatedArgs,
    },

    /// Encode a peer-reflexive candidate
    Prflx {
        #[command(flatten)]
        endpoint: EndpointArgs,
        #[command(flatten)]
        related: RelatedArgs,
    },

    /// List configured candidates, highest priority first
    List {
        /// Print JSON records instead of candidate lines
        #[arg(long)]
        json: bool,

        /// Fixed 32-bit draw for the local preference
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Print the config file path
    ConfigPath,
}

fn preference_source(seed: Option<u32>) -> Box<dyn LocalPreferenceSource> {
    match seed {
        Some(draw) => Box::new(FixedDraw(draw)),
        None => Box::new(OsRandom),
    }
}

fn base(endpoint: &EndpointArgs) -> Result<CandidateBase> {
    CandidateBase::new(endpoint.protocol, endpoint.address.as_str(), endpoint.port)
        .context("Invalid candidate address")
}

fn related(related: &RelatedArgs) -> Result<RelatedAddress> {
    RelatedAddress::new(related.raddr.as_str(), related.rport)
        .context("Invalid related address")
}

fn print_candidate(candidate: &dyn Candidate, endpoint: &EndpointArgs) {
    let mut source = preference_source(endpoint.seed);
    tracing::info!(
        "Encoding {} candidate for component {}",
        candidate.candidate_type(),
        endpoint.component
    );
    println!(
        "{}",
        candidate.to_sdp_line_with(endpoint.component, source.as_mut())
    );
}

fn list_candidates(config: &Config, json: bool, seed: Option<u32>) -> Result<()> {
    let mut source = preference_source(seed);
    let mut candidates = config.prioritized(source.as_mut())?;
    if candidates.is_empty() {
        tracing::info!("No candidates configured");
        return Ok(());
    }
    sort_by_priority(&mut candidates);

    if json {
        let records: Vec<CandidateRecord> = candidates.iter().map(CandidateRecord::from).collect();
        let out = serde_json::to_string_pretty(&records).context("Failed to serialize candidates")?;
        println!("{}", out);
    } else {
        for candidate in &candidates {
            println!("{}", candidate.to_sdp_line());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so stdout only carries candidates)
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Host { endpoint } => {
            let candidate = CandidateHost::new(base(&endpoint)?);
            print_candidate(&candidate, &endpoint);
        }
        Commands::Srflx { endpoint, related: r } => {
            let candidate = CandidateSrflx::new(base(&endpoint)?, related(&r)?);
            print_candidate(&candidate, &endpoint);
        }
        Commands::Relay { endpoint, related: r } => {
            let candidate = CandidateRelay::new(base(&endpoint)?, related(&r)?);
            print_candidate(&candidate, &endpoint);
        }
        Commands::Prflx { endpoint, related: r } => {
            let candidate = CandidatePrflx::new(base(&endpoint)?, related(&r)?);
            print_candidate(&candidate, &endpoint);
        }
        Commands::List { json, seed } => {
            let config = match &cli.config {
                Some(path) => Config::load_from(path)?,
                None => Config::load()?,
            };
            list_candidates(&config, json, seed)?;
        }
        Commands::ConfigPath => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::config_path()?,
            };
            println!("{}", path.display());
        }
    }

    Ok(())
}
