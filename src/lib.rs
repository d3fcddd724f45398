// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod alert;
pub mod analyze;
pub mod anomaly;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod rolling;
pub mod sink;
pub mod source_metrics;
pub mod themes;
pub mod trends;

// ---- Re-exports for stable public API ----
pub use crate::config::EngineConfig;
pub use crate::engine::{evaluate, Engine};
pub use crate::ingest::Snapshot;
pub use crate::report::RunReport;
