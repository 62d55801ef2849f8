//! Multimodal credit assessment core for micro-loan underwriting.
//!
//! The crate fuses a baseline statistical/rule-based borrower score with
//! bounded adjustments derived from photo and field-note analysis, then
//! emits a risk category, an income-consistency check, and a loan-size
//! recommendation. External AI analyzers, persistence, and any HTTP
//! surface are collaborators behind traits; everything else is pure.

pub mod config;
pub mod telemetry;
pub mod workflows;
