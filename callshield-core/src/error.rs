use thiserror::Error;

pub type ShieldResult<T> = Result<T, ShieldError>;

#[derive(Error, Debug)]
pub enum ShieldError {
    #[error("Session '{session_id}' is finalized and no longer accepts chunks")]
    SessionFinalized { session_id: String },

    #[error("Unknown session '{session_id}'")]
    UnknownSession { session_id: String },

    #[error("Session '{session_id}' reached the transcript cap of {cap} tokens")]
    TranscriptCapExceeded { session_id: String, cap: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset parse error: {0}")]
    Dataset(#[from] serde_json::Error),
}
