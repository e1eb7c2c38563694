use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::hooks::{AfterResponseHook, BeforeRequestHook};

/// Wire format for request and response payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "xml")]
    Xml,
    #[serde(rename = "form-encoded")]
    FormEncoded,
}

impl WireFormat {
    /// MIME type used for content negotiation.
    pub fn mime(&self) -> &'static str {
        match self {
            WireFormat::Json => "application/json",
            WireFormat::Xml => "application/xml",
            WireFormat::FormEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireFormat::Json => "json",
            WireFormat::Xml => "xml",
            WireFormat::FormEncoded => "form-encoded",
        };
        f.write_str(name)
    }
}

/// Optional raw-request/raw-response hooks attached to a connection.
/// Runtime-only; never serialized with the descriptor.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before_request: Option<Arc<dyn BeforeRequestHook>>,
    pub after_response: Option<Arc<dyn AfterResponseHook>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_request", &self.before_request.is_some())
            .field("after_response", &self.after_response.is_some())
            .finish()
    }
}

/// Shared configuration for one remote service. Created once at
/// registration and treated as read-only afterwards; the request builder
/// copies anything it needs to merge or interpolate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub identity: String,

    /// Base URI for the service; may itself be a template.
    pub base_uri: String,

    #[serde(default = "default_format")]
    pub format: WireFormat,

    /// Default headers; values may be templates.
    #[serde(default)]
    pub headers: IndexMap<String, String>,

    /// Default query parameters; values may be templates.
    #[serde(default)]
    pub url_parameters: IndexMap<String, String>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password_plain_text: String,

    /// Pass reserved URI characters through unencoded, as legacy OData
    /// endpoints require.
    #[serde(default)]
    pub legacy_odata_support: bool,

    #[serde(skip)]
    pub hooks: Hooks,
}

impl Connection {
    /// Create a connection with defaults for everything but identity and
    /// base URI.
    pub fn new(identity: impl Into<String>, base_uri: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            base_uri: base_uri.into(),
            format: default_format(),
            headers: IndexMap::new(),
            url_parameters: IndexMap::new(),
            username: String::new(),
            password_plain_text: String::new(),
            legacy_odata_support: false,
            hooks: Hooks::default(),
        }
    }
}

fn default_format() -> WireFormat {
    WireFormat::Json
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mime_types() {
        assert_eq!(WireFormat::Json.mime(), "application/json");
        assert_eq!(WireFormat::Xml.mime(), "application/xml");
        assert_eq!(WireFormat::FormEncoded.mime(), "application/x-www-form-urlencoded");
    }

    #[test]
    fn connection_deserializes_with_defaults() {
        let connection: Connection = serde_json::from_str(
            r#"{"identity": "test", "base_uri": "http://localhost:1337"}"#,
        )
        .unwrap();

        assert_eq!(connection.format, WireFormat::Json);
        assert!(connection.headers.is_empty());
        assert!(!connection.legacy_odata_support);
        assert!(connection.hooks.before_request.is_none());
    }

    #[test]
    fn format_round_trips_through_serde() {
        let json = serde_json::to_string(&WireFormat::FormEncoded).unwrap();
        assert_eq!(json, "\"form-encoded\"");
        let back: WireFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WireFormat::FormEncoded);
    }
}
