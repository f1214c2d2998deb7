//! Streaming Scorer — decay-based risk scoring state machine
//!
//! Features:
//! - Per-signal confidence in [0, 1] with per-chunk decay and bounded
//!   reinforcement
//! - Score deltas proportional to strength changes, every change traced
//! - Irreversible escalation stage ratchet with whole-score multipliers
//! - Structural cues (URL / phone / currency) over the raw transcript
//! - Benign-cue suppression that can never erase active risk
//! - Hard finalize-time overrides for credential harvesting and
//!   multi-indicator sessions
//!
//! One scorer exclusively owns one conversation session; it holds mutable
//! state with no internal locking. Phrase matching always runs against the
//! full accumulated transcript, so phrases split across chunk boundaries
//! still land, and an established cue keeps re-reinforcing until the call
//! ends.

use crate::catalog::RuleCatalog;
use crate::timeline::{Timeline, EVENT_CHUNK_INGESTED};
use crate::types::{clamp_score, FinalReport, RiskLevel, RuleId, Snapshot, TraceEntry};
use callshield_core::matcher::{fuzzy_phrase_match, tokenize};
use callshield_core::{ShieldError, ShieldResult};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

const DECAY_FACTOR: f64 = 0.90;
const STRENGTH_FLOOR: f64 = 0.05;
const DEFAULT_REINFORCE: f64 = 0.6;
const DEFAULT_MAX_DIST: usize = 1;
const WINDOW_SLACK: usize = 2;

const STAGE_WARNING_MULTIPLIER: f64 = 1.10;
const STAGE_THREAT_MULTIPLIER: f64 = 1.25;

pub(crate) const URL_PATTERN: &str = r"(?i)https?://\S+|www\.\S+";
pub(crate) const PHONE_PATTERN: &str = r"\b\+?\d[\d\-\s]{7,}\d\b";
pub(crate) const MONEY_PATTERN: &str = r"[₹$€£]\s*\d+(?:[.,]\d+)?";

/// Core scored categories with base points, applied in this order.
const CORE_RULES: &[(RuleId, i32, &str)] = &[
    (RuleId::PressureUrgency, 20, "Pressure/urgency language increases scam likelihood."),
    (RuleId::CredentialOtp, 35, "OTP/credential solicitation is a high-confidence scam intent."),
    (
        RuleId::CredentialHarvesting,
        35,
        "Requests for card/account numbers are high-risk credential harvesting.",
    ),
    (
        RuleId::PaymentMethodRisk,
        30,
        "High-risk payment methods (gift card/crypto/wire) are common in scams.",
    ),
    (RuleId::OffPlatform, 12, "Moving off-platform reduces safeguards; common in scams."),
    (RuleId::Secrecy, 18, "Secrecy/manipulation language is a scam signal."),
    (RuleId::AuthorityImpersonation, 18, "Authority/support impersonation elevates risk."),
];

/// Categories whose presence counts as an explicit scam ask. Any of them
/// disables false-positive suppression for the whole session-so-far.
const HIGH_RISK_ASKS: &[RuleId] = &[
    RuleId::CredentialOtp,
    RuleId::PaymentMethodRisk,
    RuleId::OffPlatform,
    RuleId::CredentialHarvesting,
    RuleId::FinancialAccount,
    RuleId::ActionRequest,
    RuleId::AuthorityImpersonation,
];

pub struct StreamingScorer {
    session_id: String,
    catalog: Arc<RuleCatalog>,
    timeline: Timeline,
    tokens: Vec<String>,
    transcript: String,
    chunk_index: u32,
    strengths: BTreeMap<RuleId, f64>,
    emitted: BTreeSet<RuleId>,
    escalation_stage: u8,
    score: i32,
    trace: Vec<TraceEntry>,
    frozen: Option<FinalReport>,
    url_re: Regex,
    phone_re: Regex,
    money_re: Regex,
}

impl StreamingScorer {
    pub fn new(session_id: impl Into<String>, catalog: Arc<RuleCatalog>) -> Self {
        let session_id = session_id.into();
        Self {
            timeline: Timeline::new(session_id.clone()),
            session_id,
            catalog,
            tokens: Vec::new(),
            transcript: String::new(),
            chunk_index: 0,
            strengths: BTreeMap::new(),
            emitted: BTreeSet::new(),
            escalation_stage: 0,
            score: 0,
            trace: Vec::new(),
            frozen: None,
            url_re: Regex::new(URL_PATTERN).unwrap(),
            phone_re: Regex::new(PHONE_PATTERN).unwrap(),
            money_re: Regex::new(MONEY_PATTERN).unwrap(),
        }
    }

    /// Ingest one transcript chunk and return the updated snapshot.
    ///
    /// Empty or garbage chunks are accepted as no-ops. Fails only when the
    /// session is already finalized, leaving state untouched.
    pub fn ingest_chunk(&mut self, chunk: &str) -> ShieldResult<Snapshot> {
        if self.frozen.is_some() {
            return Err(ShieldError::SessionFinalized { session_id: self.session_id.clone() });
        }

        self.chunk_index += 1;
        self.timeline.add(
            EVENT_CHUNK_INGESTED,
            Some(format!("i={},len={}", self.chunk_index, chunk.len())),
        );

        self.tokens.extend(tokenize(chunk));
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            if !self.transcript.is_empty() {
                self.transcript.push(' ');
            }
            self.transcript.push_str(trimmed);
        }

        // Signals weaken unless this chunk's transcript re-reinforces them.
        self.decay_strengths();

        let mut newly: Vec<String> = Vec::new();
        let score_before = self.score;

        for &(rule, base_points, why) in CORE_RULES {
            if self.match_any(rule, DEFAULT_MAX_DIST) {
                self.add_signal(rule, base_points, why, DEFAULT_REINFORCE, &mut newly);
            }
        }

        // Escalation gradient: a multiplier on the whole score, never a
        // flat bonus, applied once per stage increase.
        let warning = self.match_any(RuleId::EscalationWarning, DEFAULT_MAX_DIST);
        let threat = self.match_any(RuleId::EscalationThreat, DEFAULT_MAX_DIST);
        let stage: u8 = if threat {
            2
        } else if warning {
            1
        } else {
            0
        };
        if stage > self.escalation_stage {
            let mult = if stage == 1 { STAGE_WARNING_MULTIPLIER } else { STAGE_THREAT_MULTIPLIER };
            let new_score = clamp_score((self.score as f64 * mult).round() as i32);
            let delta = new_score - self.score;
            if delta != 0 {
                self.score = new_score;
                self.trace.push(TraceEntry {
                    chunk_index: self.chunk_index,
                    rule_id: RuleId::EscalationMultiplier,
                    change: delta,
                    why: format!(
                        "Language escalation stage increased to {}; applying multiplier {:.2}.",
                        stage, mult
                    ),
                });
            }
            self.escalation_stage = stage;
            if self.emitted.insert(RuleId::EscalationMultiplier) {
                newly.push(RuleId::EscalationMultiplier.as_str().to_string());
            }
        }

        // Structural cues run over the raw accumulated transcript, where
        // URLs and currency symbols survive tokenization.
        if self.url_re.is_match(&self.transcript) {
            self.add_signal(
                RuleId::ContainsUrl,
                10,
                "Links are often used to phish credentials/payments.",
                0.4,
                &mut newly,
            );
        }
        if self.phone_re.is_match(&self.transcript) {
            self.add_signal(
                RuleId::ContainsPhone,
                6,
                "Phone numbers can be used to move off-platform.",
                0.3,
                &mut newly,
            );
        }
        if self.money_re.is_match(&self.transcript) {
            self.add_signal(
                RuleId::MentionsMoney,
                6,
                "Money amounts can indicate payment pressure.",
                0.3,
                &mut newly,
            );
        }

        // False-positive suppression: benign caller cues matched verbatim
        // (no fuzz) pull the score down a bounded amount, but never while
        // any high-risk ask is on the table and never below zero.
        let benign_identity = self.match_any(RuleId::BenignIdentity, 0);
        let benign_reference = self.match_any(RuleId::BenignReference, 0)
            || self
                .tokens
                .iter()
                .any(|w| w.len() >= 6 && w.chars().all(|c| c.is_ascii_digit()));
        let benign_callback = self.match_any(RuleId::BenignCallback, 0);

        if (benign_identity || benign_reference || benign_callback) && !self.has_high_risk_asks() {
            let suppress = -((self.score as f64 * 0.20).round() as i32).clamp(5, 15);
            let new_score = clamp_score(self.score + suppress);
            let delta = new_score - self.score;
            if delta != 0 {
                self.score = new_score;
                self.trace.push(TraceEntry {
                    chunk_index: self.chunk_index,
                    rule_id: RuleId::FalsePositiveSuppression,
                    change: delta,
                    why: "Benign caller cues (identity/reference/callback) present without scam \
                          asks (OTP/link/immediate action)."
                        .to_string(),
                });
            }
            if self.emitted.insert(RuleId::FalsePositiveSuppression) {
                newly.push(RuleId::FalsePositiveSuppression.as_str().to_string());
            }
        }

        let score_delta = self.score - score_before;
        debug!(
            session = %self.session_id,
            chunk = self.chunk_index,
            score = self.score,
            delta = score_delta,
            "Chunk scored"
        );
        Ok(Snapshot {
            chunk_index: self.chunk_index,
            risk_score: self.score,
            risk_level: RiskLevel::from_score(self.score),
            newly_detected_signals: newly,
            score_delta,
        })
    }

    /// Freeze the session and apply the hard, non-suppressible overrides.
    ///
    /// Idempotent: the first call computes and freezes the report; later
    /// calls return the frozen report unchanged. `ingest_chunk` fails once
    /// a session is finalized.
    pub fn finalize(&mut self) -> FinalReport {
        if let Some(report) = &self.frozen {
            return report.clone();
        }

        let has_otp = self.match_any(RuleId::CredentialOtp, DEFAULT_MAX_DIST);
        let has_harvest = self.match_any(RuleId::CredentialHarvesting, DEFAULT_MAX_DIST);
        let has_financial = self.match_any(RuleId::FinancialAccount, DEFAULT_MAX_DIST);
        let has_authority = self.match_any(RuleId::AuthorityImpersonation, DEFAULT_MAX_DIST);
        let has_action = self.match_any(RuleId::ActionRequest, DEFAULT_MAX_DIST);

        // Credential harvesting plus an explicit ask floors the score at
        // HIGH, or higher still when an authority framing backs it.
        if (has_otp || has_harvest || has_financial) && has_action {
            let target = if has_authority { 90 } else { 75 };
            if self.score < target {
                let delta = target - self.score;
                self.score = target;
                self.trace.push(TraceEntry {
                    chunk_index: self.chunk_index,
                    rule_id: RuleId::HardRuleCredentialHarvest,
                    change: delta,
                    why: "Transcript includes requests for financial credentials \
                          (card/account/code). Escalating minimum risk."
                        .to_string(),
                });
            }
        }

        // Several medium-strength indicators together are themselves a
        // strong indicator.
        let mut medium_indicators = 0;
        for rule in [
            RuleId::PressureUrgency,
            RuleId::PaymentMethodRisk,
            RuleId::Secrecy,
            RuleId::OffPlatform,
            RuleId::EscalationWarning,
        ] {
            if self.match_any(rule, DEFAULT_MAX_DIST) {
                medium_indicators += 1;
            }
        }
        if medium_indicators >= 3 && self.score < 70 {
            let delta = 70 - self.score;
            self.score = 70;
            self.trace.push(TraceEntry {
                chunk_index: self.chunk_index,
                rule_id: RuleId::ContextMultiMedium,
                change: delta,
                why: "Multiple medium-strength scam indicators co-occur \
                      (pressure/payment/secrecy/off-platform/escalation)."
                    .to_string(),
            });
        }

        let mut signals: Vec<String> =
            self.emitted.iter().map(|r| r.as_str().to_string()).collect();
        signals.sort();

        let report = FinalReport {
            risk_score: self.score,
            risk_level: RiskLevel::from_score(self.score),
            signals,
            trace: self.trace.clone(),
        };
        self.frozen = Some(report.clone());
        report
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn match_any(&self, rule: RuleId, max_dist: usize) -> bool {
        self.catalog
            .phrases(rule)
            .iter()
            .any(|p| fuzzy_phrase_match(&self.tokens, p, max_dist, WINDOW_SLACK))
    }

    fn has_high_risk_asks(&self) -> bool {
        HIGH_RISK_ASKS.iter().any(|&rule| self.match_any(rule, DEFAULT_MAX_DIST))
    }

    pub(crate) fn decay_strengths(&mut self) {
        self.strengths.retain(|_, strength| {
            *strength *= DECAY_FACTOR;
            *strength >= STRENGTH_FLOOR
        });
    }

    pub(crate) fn reinforce(&mut self, rule: RuleId, add: f64) -> (f64, f64) {
        let prev = self.strengths.get(&rule).copied().unwrap_or(0.0);
        let cur = (prev + add).min(1.0);
        self.strengths.insert(rule, cur);
        (prev, cur)
    }

    fn add_signal(
        &mut self,
        rule: RuleId,
        base_points: i32,
        why: &str,
        reinforce: f64,
        newly: &mut Vec<String>,
    ) {
        let (prev, cur) = self.reinforce(rule, reinforce);
        // Points are proportional to strength; only the delta lands this chunk.
        let prev_pts = (base_points as f64 * prev).round() as i32;
        let cur_pts = (base_points as f64 * cur).round() as i32;
        let delta = cur_pts - prev_pts;
        if delta != 0 {
            self.score = clamp_score(self.score + delta);
            self.trace.push(TraceEntry {
                chunk_index: self.chunk_index,
                rule_id: rule,
                change: delta,
                why: why.to_string(),
            });
        }
        if self.emitted.insert(rule) {
            newly.push(rule.as_str().to_string());
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.score)
    }

    pub fn chunk_index(&self) -> u32 {
        self.chunk_index
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Current confidence for a signal; 0.0 once decayed out or never seen.
    pub fn strength(&self, rule: RuleId) -> f64 {
        self.strengths.get(&rule).copied().unwrap_or(0.0)
    }

    pub fn escalation_stage(&self) -> u8 {
        self.escalation_stage
    }

    pub fn is_finalized(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}
