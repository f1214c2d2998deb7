//! Behavioral Timeline — append-only per-session event log
//!
//! Lightweight in-memory tracking used to spot multi-chunk behavioral
//! sequences (authority framing, then urgency, then an action request)
//! without re-scanning the transcript each time.

pub const EVENT_CHUNK_INGESTED: &str = "chunk_ingested";
pub const EVENT_ASSESSED: &str = "assessed_transcript";
pub const EVENT_AUTHORITY_SIGNAL: &str = "authority_signal";
pub const EVENT_URGENCY_SIGNAL: &str = "urgency_signal";
pub const EVENT_ACTION_SIGNAL: &str = "action_signal";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimelineEvent {
    pub ts: i64,
    pub kind: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    pub session_id: String,
    events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), events: Vec::new() }
    }

    pub fn add(&mut self, kind: &str, detail: Option<String>) {
        self.events.push(TimelineEvent {
            ts: chrono::Utc::now().timestamp(),
            kind: kind.to_string(),
            detail,
        });
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn last_n(&self, n: usize) -> &[TimelineEvent] {
        if n == 0 {
            return &[];
        }
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }
}
