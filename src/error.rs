use indexmap::IndexMap;

use crate::connection::WireFormat;
use crate::parse::ParsedErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum WiremapError {
    /// A descriptor cannot be used as given (bad verb, bad base URI,
    /// invalid selector syntax). Fatal, never retried.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The raw payload could not be structured per its declared format.
    #[error("failed to parse {format} payload: {cause}")]
    Parse { payload: String, format: WireFormat, cause: String },

    /// A response selector matched no nodes, or request mapping was asked
    /// to do something the schema does not support.
    #[error("{message}")]
    Mapping { message: String, payload: Option<String> },

    /// Non-2xx HTTP status. `parsed_body` is a best-effort parse of the
    /// response body; an unparsable body leaves it absent.
    #[error("remote host returned {status}")]
    Remote {
        status: u16,
        body: String,
        headers: IndexMap<String, String>,
        parsed_body: Option<ParsedErrorBody>,
    },

    /// Network-level failure from the HTTP client, passed through.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error returned by a before/after hook, passed through untouched.
    #[error("hook failed: {0}")]
    Hook(#[source] anyhow::Error),
}

impl WiremapError {
    pub(crate) fn mapping(message: impl Into<String>) -> Self {
        WiremapError::Mapping { message: message.into(), payload: None }
    }
}

pub type WiremapResult<T> = Result<T, WiremapError>;
