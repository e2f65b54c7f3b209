//! Conditional masking engine.
//!
//! Applies an ordered [`condmask_rules::RuleSet`] to every record of a
//! collection and returns masked copies alongside a [`MaskReport`].

pub mod engine;
pub mod report;

pub use engine::{MaskOutcome, MaskingEngine};
pub use report::{MaskReport, REPORT_VERSION, RuleStats, SentinelCounts, render_report};
