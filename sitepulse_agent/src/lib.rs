//! Library surface of the agent, shared by the binary and the integration tests.

pub mod cache;
pub mod config;
pub mod db;
pub mod host;
pub mod http;
pub mod metrics;
pub mod provider;
pub mod session;
pub mod settings;
pub mod state;
pub mod types;
pub mod ws;
