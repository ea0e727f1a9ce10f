use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiveStreamError {
    #[error("HTTP transport error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Event stream error: {0}")]
    StreamError(String),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Endpoint cannot carry a channel path: {0}")]
    InvalidEndpoint(String),

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Connection controller has stopped")]
    ControllerStopped,

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("Metrics server error: {0}")]
    MetricsError(String),
}
