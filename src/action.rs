use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::connection::WireFormat;

/// Bidirectional field-mapping tables for one action.
///
/// `request` maps canonical attribute names to wire field names (or XML
/// tags); `response` maps attribute names to selector expressions
/// evaluated against each selected response node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(default)]
    pub request: IndexMap<String, String>,
    #[serde(default)]
    pub response: IndexMap<String, String>,
}

/// Declarative description of one remote operation.
///
/// Immutable per call; clone before passing if mutation-safety matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// HTTP method name, e.g. `GET`.
    pub verb: String,

    /// Endpoint path appended to the connection's base URI; may be a
    /// template.
    pub path: String,

    /// Overrides the connection format when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<WireFormat>,

    #[serde(default)]
    pub headers: IndexMap<String, String>,

    #[serde(default)]
    pub url_parameters: IndexMap<String, String>,

    /// When non-empty, interpolated and used verbatim as the request
    /// body, bypassing field mapping.
    #[serde(default)]
    pub body_payload_template: String,

    /// Root tag name for XML request bodies.
    #[serde(default)]
    pub object_name_mapping: String,

    /// Response node selector. Empty string means the response body is
    /// intentionally ignored; `$` means the whole payload is the single
    /// node.
    #[serde(default)]
    pub path_selector: String,

    #[serde(default)]
    pub mapping: Mapping,

    /// Query parameters applied beneath explicit call-time parameters.
    #[serde(default)]
    pub default_params: IndexMap<String, String>,
}

impl Action {
    /// Create an action with required fields and defaults for the rest.
    pub fn new(verb: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            path: path.into(),
            format: None,
            headers: IndexMap::new(),
            url_parameters: IndexMap::new(),
            body_payload_template: String::new(),
            object_name_mapping: String::new(),
            path_selector: String::new(),
            mapping: Mapping::default(),
            default_params: IndexMap::new(),
        }
    }

    /// The action's format, falling back to the connection format.
    pub fn format_or(&self, connection_format: WireFormat) -> WireFormat {
        self.format.unwrap_or(connection_format)
    }
}
