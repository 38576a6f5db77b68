//! ICE candidate model: candidate kinds, priorities and SDP candidate lines.

pub mod config;
pub mod ice;
pub mod models;
