//! One-shot Assessment — whole-transcript explainable scoring
//!
//! For callers that hold a complete transcript up front rather than a live
//! stream. Matching here is plain lowercased substring containment after
//! spelled-acronym repair; the per-group weights are flatter than the
//! streaming scorer's because everything lands in a single pass. With a
//! timeline attached, cross-call behavioral sequences (authority framing,
//! then urgency, then an action request) add session-scoped bonuses.

use crate::catalog::RuleCatalog;
use crate::scorer::{MONEY_PATTERN, PHONE_PATTERN, URL_PATTERN};
use crate::timeline::{
    Timeline, EVENT_ACTION_SIGNAL, EVENT_ASSESSED, EVENT_AUTHORITY_SIGNAL, EVENT_URGENCY_SIGNAL,
};
use crate::types::{clamp_score, Assessment, Evidence, RiskLevel, RuleId};
use callshield_core::matcher::collapse_spelled_sequences;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const ASSESS_RULES: &[(RuleId, i32, &str)] = &[
    (RuleId::PressureUrgency, 10, "Pressure/urgency language detected."),
    (RuleId::CredentialOtp, 20, "Credential/OTP solicitation language detected."),
    (
        RuleId::PaymentMethodRisk,
        20,
        "High-risk payment method language detected (gift cards/crypto/wire).",
    ),
    (RuleId::OffPlatform, 8, "Attempts to move conversation off-platform detected."),
    (RuleId::Secrecy, 12, "Secrecy/manipulation language detected."),
    (
        RuleId::AuthorityImpersonation,
        12,
        "Authority/customer-support impersonation language detected.",
    ),
];

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).unwrap())
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).unwrap())
}

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MONEY_PATTERN).unwrap())
}

fn all_caps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]{4,}\b").unwrap())
}

/// Deterministically assess a whole transcript and return explainable
/// evidence. Pass a timeline to accumulate behavioral sequence bonuses
/// across repeated assessments of the same session.
pub fn assess_text(
    catalog: &RuleCatalog,
    text: &str,
    mut timeline: Option<&mut Timeline>,
) -> Assessment {
    let raw = text.trim();
    let lowered = collapse_spelled_sequences(raw);

    let mut score: i32 = 0;
    let mut evidences: Vec<Evidence> = Vec::new();
    let mut signals: Vec<String> = Vec::new();

    for &(rule, weight, description) in ASSESS_RULES {
        let matches: Vec<String> = catalog
            .phrases(rule)
            .iter()
            .filter(|p| lowered.contains(p.as_str()))
            .cloned()
            .collect();
        score += add_evidence(&mut evidences, rule, weight, description, matches);
    }

    // Flat phrase bank, kept at modest weight since the rule groups above
    // already cover many of the same phrases.
    let phrase_hits: Vec<String> = catalog
        .scam_phrases()
        .iter()
        .filter(|p| lowered.contains(p.as_str()))
        .cloned()
        .collect();
    if !phrase_hits.is_empty() {
        let distinct = phrase_hits.iter().collect::<BTreeSet<_>>().len() as i32;
        score += add_evidence(
            &mut evidences,
            RuleId::PhraseBankHit,
            (3 * distinct).min(25),
            "Known scam phrase(s) detected from phrase bank.",
            phrase_hits,
        );
    }

    // Keyword density.
    let kw_hits: BTreeSet<&str> = catalog
        .suspicious_keywords()
        .iter()
        .filter(|k| lowered.contains(k.as_str()))
        .map(String::as_str)
        .collect();
    if !kw_hits.is_empty() {
        let preview: Vec<&str> = kw_hits.iter().copied().take(10).collect();
        let suffix = if kw_hits.len() > 10 { "..." } else { "" };
        signals.push(format!("keywords:{}{}", preview.join(","), suffix));
        score += (2 * kw_hits.len() as i32).min(20);
    }

    // Structural cues on the raw text, where case and symbols survive.
    if url_re().is_match(raw) {
        signals.push("contains_url".to_string());
        score += 12;
    }
    if phone_re().is_match(raw) {
        signals.push("contains_phone_number".to_string());
        score += 6;
    }
    if money_re().is_match(raw) {
        signals.push("mentions_money_amount".to_string());
        score += 6;
    }
    if all_caps_re().find_iter(raw).count() >= 3 {
        signals.push("excessive_caps".to_string());
        score += 6;
    }
    if raw.matches('!').count() >= 3 {
        signals.push("excessive_exclamation".to_string());
        score += 4;
    }

    // Session-scoped behavioral sequences.
    if let Some(tl) = timeline.as_deref_mut() {
        tl.add(EVENT_ASSESSED, Some(format!("len={}", raw.len())));

        let rule_hits: BTreeSet<RuleId> = evidences.iter().map(|e| e.rule_id).collect();
        if rule_hits.contains(&RuleId::AuthorityImpersonation) {
            tl.add(EVENT_AUTHORITY_SIGNAL, None);
        }
        if rule_hits.contains(&RuleId::PressureUrgency) {
            tl.add(EVENT_URGENCY_SIGNAL, None);
        }
        if rule_hits.contains(&RuleId::CredentialOtp)
            || rule_hits.contains(&RuleId::PaymentMethodRisk)
        {
            tl.add(EVENT_ACTION_SIGNAL, None);
        }

        // Attacker pattern emerging across chunks: authority framing, then
        // urgency, then an action request.
        if tl.count(EVENT_AUTHORITY_SIGNAL) > 0
            && tl.count(EVENT_URGENCY_SIGNAL) > 0
            && tl.count(EVENT_ACTION_SIGNAL) > 0
        {
            signals.push("dangerous_sequence:authority_urgency_action".to_string());
            score += 10;
        }

        if tl.count(EVENT_URGENCY_SIGNAL) >= 3 {
            signals.push("repeated_pressure_tactics_in_session".to_string());
            score += 10;
        }
    }

    let score = clamp_score(score);
    Assessment {
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        evidences,
        signals,
    }
}

fn add_evidence(
    evidences: &mut Vec<Evidence>,
    rule_id: RuleId,
    weight: i32,
    description: &str,
    matches: Vec<String>,
) -> i32 {
    let mut matches: Vec<String> = matches.into_iter().filter(|m| !m.is_empty()).collect();
    matches.sort();
    matches.dedup();
    if matches.is_empty() {
        return 0;
    }
    evidences.push(Evidence {
        rule_id,
        weight,
        description: description.to_string(),
        matches,
    });
    weight
}
