//! Shield Engine — multi-session front end for the streaming scorer
//!
//! Features:
//! - Session lifecycle (open, ingest, finalize, close) keyed by session id
//! - Catalogue construction with a one-time external dataset merge
//! - Per-session transcript-length cap on behalf of latency-bound callers
//! - Alerting when a session crosses into high risk
//! - Reporting and statistics
//!
//! Sessions are fully independent: the engine shares one immutable
//! catalogue across all of them and serializes access to the session map,
//! nothing more.

use crate::assess::assess_text;
use crate::catalog::{CatalogBuilder, PhraseDataset, RuleCatalog};
use crate::scorer::StreamingScorer;
use crate::types::{Assessment, FinalReport, RiskLevel, Severity, ShieldAlert, Snapshot};
use callshield_core::{ShieldConfig, ShieldError, ShieldResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

// ── Engine ──────────────────────────────────────────────────────────────────

pub struct ShieldEngine {
    catalog: Arc<RuleCatalog>,
    sessions: RwLock<HashMap<String, StreamingScorer>>,
    alerts: RwLock<Vec<ShieldAlert>>,
    max_alerts: usize,
    max_transcript_tokens: usize,
    sessions_opened: AtomicU64,
    chunks_ingested: AtomicU64,
    sessions_finalized: AtomicU64,
    high_risk_sessions: AtomicU64,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EngineReport {
    pub sessions_open: u64,
    pub sessions_opened: u64,
    pub chunks_ingested: u64,
    pub sessions_finalized: u64,
    pub high_risk_sessions: u64,
}

impl ShieldEngine {
    /// Build an engine from config: built-in catalogue, plus the external
    /// dataset when configured and loadable. A broken dataset is logged and
    /// ignored — startup never aborts over phrase data.
    pub fn new(config: &ShieldConfig) -> Self {
        let mut builder = CatalogBuilder::builtin();
        if let Some(path) = &config.catalog.dataset_path {
            match PhraseDataset::load(path) {
                Ok(dataset) => {
                    builder = builder.merge_dataset(dataset);
                    info!(path = %path.display(), "External phrase dataset merged");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unloadable phrase dataset")
                }
            }
        }
        let catalog = Arc::new(builder.build());
        info!(phrases = catalog.phrase_count(), "Rule catalogue ready");

        Self {
            catalog,
            sessions: RwLock::new(HashMap::new()),
            alerts: RwLock::new(Vec::new()),
            max_alerts: config.scoring.max_alerts,
            max_transcript_tokens: config.scoring.max_transcript_tokens,
            sessions_opened: AtomicU64::new(0),
            chunks_ingested: AtomicU64::new(0),
            sessions_finalized: AtomicU64::new(0),
            high_risk_sessions: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> Arc<RuleCatalog> {
        self.catalog.clone()
    }

    /// Open a session. The id is the handle; re-opening an existing id
    /// replaces the previous session wholesale.
    pub fn new_session(&self, session_id: &str) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
        let scorer = StreamingScorer::new(session_id, self.catalog.clone());
        self.sessions.write().insert(session_id.to_string(), scorer);
    }

    pub fn ingest_chunk(&self, session_id: &str, text: &str) -> ShieldResult<Snapshot> {
        let mut sessions = self.sessions.write();
        let scorer = sessions
            .get_mut(session_id)
            .ok_or_else(|| ShieldError::UnknownSession { session_id: session_id.to_string() })?;
        if scorer.token_count() >= self.max_transcript_tokens {
            return Err(ShieldError::TranscriptCapExceeded {
                session_id: session_id.to_string(),
                cap: self.max_transcript_tokens,
            });
        }

        let was_high = scorer.risk_level() == RiskLevel::High;
        let snapshot = scorer.ingest_chunk(text)?;
        self.chunks_ingested.fetch_add(1, Ordering::Relaxed);

        if snapshot.risk_level == RiskLevel::High && !was_high {
            self.high_risk_sessions.fetch_add(1, Ordering::Relaxed);
            let recent: Vec<&str> =
                scorer.timeline().last_n(3).iter().map(|e| e.kind.as_str()).collect();
            warn!(
                session = %session_id,
                score = snapshot.risk_score,
                "Session crossed into high risk"
            );
            self.add_alert(
                Severity::High,
                session_id,
                "High-risk call in progress",
                &format!(
                    "score={} new_signals={} recent_events={}",
                    snapshot.risk_score,
                    snapshot.newly_detected_signals.join(","),
                    recent.join(",")
                ),
            );
        }
        Ok(snapshot)
    }

    /// Finalize a session and return its frozen report. Repeated calls
    /// return the same report; the session stays readable until closed.
    pub fn finalize(&self, session_id: &str) -> ShieldResult<FinalReport> {
        let mut sessions = self.sessions.write();
        let scorer = sessions
            .get_mut(session_id)
            .ok_or_else(|| ShieldError::UnknownSession { session_id: session_id.to_string() })?;
        let already_finalized = scorer.is_finalized();
        let report = scorer.finalize();
        if !already_finalized {
            self.sessions_finalized.fetch_add(1, Ordering::Relaxed);
            if report.risk_level == RiskLevel::High {
                self.add_alert(
                    Severity::Critical,
                    session_id,
                    "High-risk call finalized",
                    &format!("score={} signals={}", report.risk_score, report.signals.join(",")),
                );
            }
        }
        Ok(report)
    }

    pub fn close_session(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    /// Whole-transcript assessment against this engine's catalogue.
    pub fn assess(&self, text: &str) -> Assessment {
        assess_text(&self.catalog, text, None)
    }

    pub fn alerts(&self) -> Vec<ShieldAlert> {
        self.alerts.read().clone()
    }

    pub fn report(&self) -> EngineReport {
        EngineReport {
            sessions_open: self.sessions.read().len() as u64,
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            chunks_ingested: self.chunks_ingested.load(Ordering::Relaxed),
            sessions_finalized: self.sessions_finalized.load(Ordering::Relaxed),
            high_risk_sessions: self.high_risk_sessions.load(Ordering::Relaxed),
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    fn add_alert(&self, severity: Severity, session_id: &str, title: &str, details: &str) {
        let mut alerts = self.alerts.write();
        if alerts.len() >= self.max_alerts {
            let drain = alerts.len() - self.max_alerts + 1;
            alerts.drain(..drain);
        }
        alerts.push(ShieldAlert {
            timestamp: chrono::Utc::now().timestamp(),
            severity,
            session_id: session_id.to_string(),
            title: title.to_string(),
            details: details.to_string(),
        });
    }
}
