//! Rule Catalogue — immutable phrase data behind the behavioral rules
//!
//! Features:
//! - Built-in phrase tables per behavioral category
//! - Multilingual variants carried as plain additional entries, not logic
//! - Flat scam-phrase bank and suspicious-keyword list for whole-text scans
//! - One-time merge of an optional external JSON dataset at startup
//! - Case-insensitive de-duplication preserving first-seen order
//!
//! A catalogue is constructed once via [`CatalogBuilder`], frozen, and then
//! shared read-only (`Arc`) into every scorer instance. Nothing mutates it
//! after `build()`, which is the whole thread-safety story.

use crate::types::RuleId;
use callshield_core::ShieldResult;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::warn;

// ── Built-in phrase tables ──────────────────────────────────────────────────

const PRESSURE_URGENCY: &[&str] = &[
    "urgent",
    "immediately",
    "act now",
    "asap",
    "final notice",
    "last chance",
    "limited time",
    // Romanized Hindi / Tamil / Telugu / Malayalam urgency forms
    "abhi ke abhi",
    "turant",
    "jaldi",
    "udane",
    "ippove",
    "seekiram",
    "ventane",
    "twaraga",
    "pettannu",
    "तुरंत",
    "அப்போவே",
    "உடனே",
    "వెంటనే",
    "ഉടനെ",
];

const CREDENTIAL_OTP: &[&str] = &[
    "otp",
    "one time password",
    "verification code",
    "security code",
    "new code",
    "share the code",
    "send the code",
    "password",
    "pin",
    // Spoken-language OTP asks
    "otp bataye",
    "otp bhejo",
    "otp sollunga",
    "otp cheppandi",
    "otp parayu",
    "code bataye",
    "ओटीपी",
    "ஓடிபி",
    "ఓటిపి",
    "ഒടിപി",
];

const CREDENTIAL_HARVESTING: &[&str] = &[
    "confirm your card",
    "which card are you using",
    "write down account numbers",
    "card number",
    "account number",
    "debit card number",
    "credit card number",
    "expiry date",
    "cvv",
];

const PAYMENT_METHOD_RISK: &[&str] = &[
    "gift card",
    "wire transfer",
    "bank transfer",
    "send bitcoin",
    "crypto wallet",
    "usdt",
];

const OFF_PLATFORM: &[&str] = &["whatsapp", "telegram", "dm me", "message me"];

const SECRECY: &[&str] = &[
    "keep this confidential",
    "do not tell anyone",
    "don't tell anyone",
    "keep it secret",
    "between you and me",
    "kisi ko mat batao",
    "किसी को मत बताना",
    "யாருக்கும் சொல்லாதே",
    "ఎవ్వరికీ చెప్పకండి",
    "ആരോടും പറയരുത്",
];

const AUTHORITY_IMPERSONATION: &[&str] = &[
    "bank officer",
    "security team",
    "customer support",
    "police",
    "income tax",
    "customs",
    "court",
    "legal action",
    "fraud division",
    "fraud watch",
    "visa department",
    "mastercard department",
    "visa mastercard department",
    "security department",
    "fraud department",
    "बैंक से बोल रहा",
    "வங்கியிலிருந்து",
];

const ESCALATION_WARNING: &[&str] = &[
    "warning",
    "final warning",
    "last warning",
    "account will be suspended",
    "account may be blocked",
    "account will be blocked",
    "kyc update",
    "update your kyc",
    "unusual activity",
    "account band",
    "अकाउंट ब्लॉक",
    "அக்கவுண்ட் ப்ளாக்",
    "అకౌంట్ బ్లాక్",
    "അക്കൗണ്ട് ബ്ലോക്ക്",
];

const ESCALATION_THREAT: &[&str] = &[
    "legal action",
    "police case",
    "court notice",
    "warrant",
    "arrest",
    "freeze your account",
    "you will be arrested",
];

const BENIGN_IDENTITY: &[&str] = &["my name is", "this is", "i am", "speaking from"];

const BENIGN_REFERENCE: &[&str] = &[
    "reference number",
    "ref number",
    "ticket number",
    "complaint number",
    "case id",
];

const BENIGN_CALLBACK: &[&str] = &[
    "call back",
    "callback",
    "you can call us",
    "our official number",
    "helpline",
];

const ACTION_REQUEST: &[&str] = &[
    "confirm your card",
    "confirm your account",
    "confirm these charges",
    "verify this transaction",
    "read me the code",
    "tell me the code",
    "share the code",
    "provide the code",
    "read me the otp",
    "tell me the otp",
    "share the otp",
    "write down account numbers",
    "select option one",
    "press one to",
    "press 1 to",
    "stay on the line",
];

const FINANCIAL_ACCOUNT: &[&str] = &[
    "card number",
    "account number",
    "bank account",
    "checking account",
    "savings account",
    "current account",
    "routing number",
    "iban",
];

const KNOWN_SCAM_SCRIPT: &[&str] = &[
    "due to increase in computer related fraud",
    "card holders are held responsible",
    "we underwrite all fraud charges",
    "you will receive a package",
];

struct RuleSeed {
    rule: RuleId,
    phrases: &'static [&'static str],
}

const RULE_SEEDS: &[RuleSeed] = &[
    RuleSeed { rule: RuleId::PressureUrgency, phrases: PRESSURE_URGENCY },
    RuleSeed { rule: RuleId::CredentialOtp, phrases: CREDENTIAL_OTP },
    RuleSeed { rule: RuleId::CredentialHarvesting, phrases: CREDENTIAL_HARVESTING },
    RuleSeed { rule: RuleId::PaymentMethodRisk, phrases: PAYMENT_METHOD_RISK },
    RuleSeed { rule: RuleId::OffPlatform, phrases: OFF_PLATFORM },
    RuleSeed { rule: RuleId::Secrecy, phrases: SECRECY },
    RuleSeed { rule: RuleId::AuthorityImpersonation, phrases: AUTHORITY_IMPERSONATION },
    RuleSeed { rule: RuleId::EscalationWarning, phrases: ESCALATION_WARNING },
    RuleSeed { rule: RuleId::EscalationThreat, phrases: ESCALATION_THREAT },
    RuleSeed { rule: RuleId::BenignIdentity, phrases: BENIGN_IDENTITY },
    RuleSeed { rule: RuleId::BenignReference, phrases: BENIGN_REFERENCE },
    RuleSeed { rule: RuleId::BenignCallback, phrases: BENIGN_CALLBACK },
    RuleSeed { rule: RuleId::ActionRequest, phrases: ACTION_REQUEST },
    RuleSeed { rule: RuleId::FinancialAccount, phrases: FINANCIAL_ACCOUNT },
    RuleSeed { rule: RuleId::KnownScamScript, phrases: KNOWN_SCAM_SCRIPT },
];

/// High-signal phrases commonly used in scams, scanned as a flat bank by
/// the whole-transcript assessment.
const SCAM_PHRASES: &[&str] = &[
    "verify your account",
    "your account will be suspended",
    "unusual activity",
    "confirm your identity",
    "reset your password",
    "limited time offer",
    "act now",
    "urgent",
    "click the link",
    "login to continue",
    "payment failed",
    "invoice attached",
    "you have won",
    "congratulations you won",
    "claim your prize",
    "free gift",
    "wire transfer",
    "gift card",
    "send bitcoin",
    "crypto wallet",
    "bank details",
    "otp",
    "one time password",
    "share the code",
    "do not share this code",
    "remote access",
    "teamviewer",
    "anydesk",
    "refund",
    "tech support",
    "your subscription",
    "due to increase in computer related fraud",
    "card holders are held responsible",
    "we underwrite all fraud charges",
    "you will receive a package",
    "move to whatsapp",
    "move to telegram",
    "continue on whatsapp",
    "continue on telegram",
    "message me on whatsapp",
    "message me on telegram",
    "keep this confidential",
    "do not tell anyone",
    "don't tell anyone",
    "keep it secret",
    "between you and me",
    "police case",
    "legal action",
    "court notice",
    "income tax",
    "customs",
    "bank officer",
    "customer support",
    "security team",
    "kyc update",
    "update your kyc",
];

/// Keyword-density signals for the whole-transcript assessment.
const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "urgent",
    "immediately",
    "asap",
    "final notice",
    "suspended",
    "locked",
    "verify",
    "confirm",
    "password",
    "otp",
    "code",
    "gift card",
    "bitcoin",
    "crypto",
    "wallet",
    "wire",
    "transfer",
    "whatsapp",
    "telegram",
    "confidential",
    "secret",
    "police",
    "legal",
    "court",
    "kyc",
    "customs",
    "support",
];

// ── External dataset ────────────────────────────────────────────────────────

/// Optional external phrase dataset, merged into the catalogue exactly once
/// at startup. All fields default, so partial datasets are fine.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PhraseDataset {
    #[serde(default)]
    pub scam_phrases: Vec<String>,
    #[serde(default)]
    pub suspicious_keywords: Vec<String>,
    /// Rule name (e.g. "CREDENTIAL_OTP") to extra phrases. BTreeMap keeps
    /// the merge order deterministic.
    #[serde(default)]
    pub rule_phrases: BTreeMap<String, Vec<String>>,
}

impl PhraseDataset {
    /// Read and parse a dataset file. Callers log and discard the error
    /// path rather than abort startup.
    pub fn load(path: impl AsRef<Path>) -> ShieldResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ── Catalogue ───────────────────────────────────────────────────────────────

/// Builds a [`RuleCatalog`] from the built-in tables plus at most one
/// external dataset, then freezes it.
pub struct CatalogBuilder {
    rules: BTreeMap<RuleId, Vec<String>>,
    scam_phrases: Vec<String>,
    suspicious_keywords: Vec<String>,
}

impl CatalogBuilder {
    pub fn builtin() -> Self {
        let mut rules = BTreeMap::new();
        for seed in RULE_SEEDS {
            let mut list = Vec::new();
            append_unique(&mut list, seed.phrases.iter().map(|p| p.to_string()));
            rules.insert(seed.rule, list);
        }
        let mut scam_phrases = Vec::new();
        append_unique(&mut scam_phrases, SCAM_PHRASES.iter().map(|p| p.to_string()));
        let mut suspicious_keywords = Vec::new();
        append_unique(
            &mut suspicious_keywords,
            SUSPICIOUS_KEYWORDS.iter().map(|p| p.to_string()),
        );
        Self { rules, scam_phrases, suspicious_keywords }
    }

    /// Append dataset entries, de-duplicating case-insensitively while
    /// preserving first-seen order. Unknown rule names are skipped with a
    /// warning.
    pub fn merge_dataset(mut self, dataset: PhraseDataset) -> Self {
        for (key, phrases) in dataset.rule_phrases {
            match RuleId::from_catalog_key(&key) {
                Some(rule) => {
                    append_unique(self.rules.entry(rule).or_default(), phrases);
                }
                None => warn!(rule = %key, "Ignoring unknown rule in phrase dataset"),
            }
        }
        append_unique(&mut self.scam_phrases, dataset.scam_phrases);
        append_unique(&mut self.suspicious_keywords, dataset.suspicious_keywords);
        self
    }

    pub fn build(self) -> RuleCatalog {
        RuleCatalog {
            rules: self.rules,
            scam_phrases: self.scam_phrases,
            suspicious_keywords: self.suspicious_keywords,
        }
    }
}

/// Immutable phrase catalogue shared read-only across scorer instances.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: BTreeMap<RuleId, Vec<String>>,
    scam_phrases: Vec<String>,
    suspicious_keywords: Vec<String>,
}

impl RuleCatalog {
    /// The built-in catalogue with no external dataset.
    pub fn builtin() -> Self {
        CatalogBuilder::builtin().build()
    }

    /// Phrase list for a category; empty for synthetic rule ids.
    pub fn phrases(&self, rule: RuleId) -> &[String] {
        self.rules.get(&rule).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn scam_phrases(&self) -> &[String] {
        &self.scam_phrases
    }

    pub fn suspicious_keywords(&self) -> &[String] {
        &self.suspicious_keywords
    }

    /// Total phrase entries across all tables.
    pub fn phrase_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum::<usize>()
            + self.scam_phrases.len()
            + self.suspicious_keywords.len()
    }
}

fn append_unique(list: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    let mut seen: HashSet<String> = list.iter().map(|p| p.to_lowercase()).collect();
    for phrase in extra {
        let key = phrase.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        list.push(key);
    }
}
