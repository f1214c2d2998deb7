//! # CallShield Risk — streaming scam-call risk scoring
//!
//! Deterministic, explainable, decay-based scoring of live conversation
//! transcripts. One [`StreamingScorer`] exclusively owns one session;
//! [`ShieldEngine`] fronts many independent sessions behind string handles
//! and shares a single immutable [`RuleCatalog`] across all of them.

pub mod assess;
pub mod catalog;
pub mod engine;
pub mod scorer;
pub mod timeline;
pub mod types;

pub use assess::assess_text;
pub use catalog::{CatalogBuilder, PhraseDataset, RuleCatalog};
pub use engine::{EngineReport, ShieldEngine};
pub use scorer::StreamingScorer;
pub use timeline::Timeline;
pub use types::{
    Assessment, Evidence, FinalReport, RiskLevel, RuleId, Severity, ShieldAlert, Snapshot,
    TraceEntry,
};
