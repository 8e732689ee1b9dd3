//! Library surface of the dashboard client, shared by the binary and tests.

pub mod alerts;
pub mod app;
pub mod dashboard;
pub mod history;
pub mod scheduler;
pub mod transport;
pub mod types;
pub mod ui;
pub mod ws;
