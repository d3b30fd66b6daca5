use thiserror::Error;

/// Errors returned by the Jenkins client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-side configuration problem, detected before any request.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request construction or connection failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with an unexpected HTTP status.
    #[error("unexpected response code: {status}, body: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Trigger response carried no Location header.
    #[error("no Location header in trigger response")]
    MissingLocation,

    /// Location header does not contain the queue item marker.
    #[error("no queue item in Location header: {0}")]
    QueueIdNotFound(String),

    /// Queue item marker is not followed by a decimal id.
    #[error("malformed queue id in Location header: {0}")]
    InvalidQueueId(String),

    /// A polling phase exceeded the shared deadline.
    #[error("timeout waiting for job {job}{}", match .build_number {
        Some(number) => format!(" build #{number}"),
        None => String::new(),
    })]
    Timeout {
        job: String,
        build_number: Option<i64>,
    },

    /// Terminal build result other than SUCCESS.
    #[error("job {job} (build #{build_number}) failed with status: {result}")]
    BuildFailed {
        job: String,
        build_number: i64,
        result: String,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;
