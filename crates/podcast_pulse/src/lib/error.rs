use podcast_status::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing configuration: {0} is not set")]
    MissingConfig(&'static str),
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(&'static str),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingConfig(_) => ErrorKind::Configuration,
            Error::Request(_) | Error::Api { .. } | Error::UnexpectedResponse(_) => {
                ErrorKind::Transport
            }
            Error::Io(_) => ErrorKind::Storage,
            Error::ParseError(_) => ErrorKind::Parse,
        }
    }

    /// Whether another attempt at the same call could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::MissingConfig(_) | Error::ParseError(_))
    }

    /// Maps a non-2xx response into [`Error::Api`]
    pub(crate) async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Error::Api { status, message }
    }
}

/// Failures of the synchronous fetch-generate-dispatch half
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0}")]
    Search(String),
    #[error("{0}")]
    Generation(String),
    #[error("Background worker is not running")]
    QueueClosed,
}
