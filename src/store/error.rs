use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store `{0}` is not open")]
    NotOpen(&'static str),

    #[error("remote store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("remote store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("roster file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("roster JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("injected failure: {0}")]
    Injected(&'static str),
}
