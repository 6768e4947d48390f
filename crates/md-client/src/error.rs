//! Client errors

use md_workflow::WorkflowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure or undecodable response
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer; `message` is the body's `detail` or the status reason
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("mock data unavailable: {0}")]
    MockData(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
