use tokio_tungstenite::tungstenite;

/// Failures talking to the remote service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gateway error: {0}")]
    Gateway(#[from] tungstenite::Error),

    #[error("couldn't decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("gateway closed: {0}")]
    Closed(String),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
