//! Shared types for the risk scoring layer.

/// Behavioral rule identifiers.
///
/// The phrase-backed catalogue categories come first; the remaining
/// variants are synthetic and only ever appear as trace/signal ids
/// (structural cues, the escalation multiplier, suppression, and the
/// finalize-time hard rules). Keeping them in one enum keeps the audit
/// trail exhaustively typed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    PressureUrgency,
    CredentialOtp,
    CredentialHarvesting,
    PaymentMethodRisk,
    OffPlatform,
    Secrecy,
    AuthorityImpersonation,
    EscalationWarning,
    EscalationThreat,
    BenignIdentity,
    BenignReference,
    BenignCallback,
    ActionRequest,
    FinancialAccount,
    KnownScamScript,
    ContainsUrl,
    ContainsPhone,
    MentionsMoney,
    PhraseBankHit,
    EscalationMultiplier,
    FalsePositiveSuppression,
    HardRuleCredentialHarvest,
    ContextMultiMedium,
}

impl RuleId {
    /// The phrase-backed subset a catalogue carries entries for.
    pub const CATALOGUE: &'static [RuleId] = &[
        RuleId::PressureUrgency,
        RuleId::CredentialOtp,
        RuleId::CredentialHarvesting,
        RuleId::PaymentMethodRisk,
        RuleId::OffPlatform,
        RuleId::Secrecy,
        RuleId::AuthorityImpersonation,
        RuleId::EscalationWarning,
        RuleId::EscalationThreat,
        RuleId::BenignIdentity,
        RuleId::BenignReference,
        RuleId::BenignCallback,
        RuleId::ActionRequest,
        RuleId::FinancialAccount,
        RuleId::KnownScamScript,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::PressureUrgency => "PRESSURE_URGENCY",
            RuleId::CredentialOtp => "CREDENTIAL_OTP",
            RuleId::CredentialHarvesting => "CREDENTIAL_HARVESTING",
            RuleId::PaymentMethodRisk => "PAYMENT_METHOD_RISK",
            RuleId::OffPlatform => "OFF_PLATFORM",
            RuleId::Secrecy => "SECRECY",
            RuleId::AuthorityImpersonation => "AUTHORITY_IMPERSONATION",
            RuleId::EscalationWarning => "ESCALATION_WARNING",
            RuleId::EscalationThreat => "ESCALATION_THREAT",
            RuleId::BenignIdentity => "BENIGN_IDENTITY",
            RuleId::BenignReference => "BENIGN_REFERENCE",
            RuleId::BenignCallback => "BENIGN_CALLBACK",
            RuleId::ActionRequest => "ACTION_REQUEST",
            RuleId::FinancialAccount => "FINANCIAL_ACCOUNT",
            RuleId::KnownScamScript => "KNOWN_SCAM_SCRIPT",
            RuleId::ContainsUrl => "CONTAINS_URL",
            RuleId::ContainsPhone => "CONTAINS_PHONE",
            RuleId::MentionsMoney => "MENTIONS_MONEY",
            RuleId::PhraseBankHit => "PHRASE_BANK_HIT",
            RuleId::EscalationMultiplier => "ESCALATION_MULTIPLIER",
            RuleId::FalsePositiveSuppression => "FALSE_POSITIVE_SUPPRESSION",
            RuleId::HardRuleCredentialHarvest => "HARD_RULE_CREDENTIAL_HARVEST",
            RuleId::ContextMultiMedium => "CONTEXT_MULTI_MEDIUM",
        }
    }

    /// Map an external dataset key (e.g. "CREDENTIAL_OTP") to a catalogue
    /// category. Synthetic ids are not addressable from datasets.
    pub fn from_catalog_key(key: &str) -> Option<RuleId> {
        let key = key.trim().to_ascii_uppercase();
        Self::CATALOGUE.iter().copied().find(|r| r.as_str() == key)
    }
}

/// Internal four-tier risk banding. External consumers remap to their own
/// scale; this engine never does.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: i32) -> Self {
        if score >= 70 {
            RiskLevel::High
        } else if score >= 50 {
            RiskLevel::Medium
        } else if score >= 25 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Minimal => "minimal",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// One score-changing event. Replaying `change` values in order, clamping
/// to [0, 100] at every step, reproduces the recorded final score.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TraceEntry {
    pub chunk_index: u32,
    pub rule_id: RuleId,
    pub change: i32,
    pub why: String,
}

/// Per-chunk view of a live session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub chunk_index: u32,
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub newly_detected_signals: Vec<String>,
    pub score_delta: i32,
}

/// Frozen end-of-session report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FinalReport {
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    /// Every signal emitted during the session, name-sorted, deduplicated.
    pub signals: Vec<String>,
    pub trace: Vec<TraceEntry>,
}

/// Alert severity levels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Engine-level alert raised when a session crosses into high risk.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShieldAlert {
    pub timestamp: i64,
    pub severity: Severity,
    pub session_id: String,
    pub title: String,
    pub details: String,
}

/// One explainable evidence group from whole-transcript assessment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Evidence {
    pub rule_id: RuleId,
    pub weight: i32,
    pub description: String,
    pub matches: Vec<String>,
}

/// Whole-transcript assessment result.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Assessment {
    pub risk_score: i32,
    pub risk_level: RiskLevel,
    pub evidences: Vec<Evidence>,
    pub signals: Vec<String>,
}

pub(crate) fn clamp_score(score: i32) -> i32 {
    score.clamp(0, 100)
}
