//! ApiParamedic -- result-aggregating endpoint probe harness.
//!
//! This crate sends a fixed battery of HTTP probes against an AI backend's
//! API (tool listings, agent generation, workflow generation, chatbots),
//! classifies each response, and aggregates per-category pass/fail results
//! into a run report.

pub mod checks;
pub mod classify;
pub mod config;
pub mod groq;
pub mod probe;
pub mod report;

pub use checks::run_all;
pub use config::HarnessConfig;
pub use report::RunReport;
