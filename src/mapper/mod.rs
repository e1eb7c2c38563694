//! Bidirectional field mappers between canonical attributes and wire
//! payloads, one per wire format.

pub mod form;
pub mod json;
pub mod xml;

pub use form::FormEncodedMapper;
pub use json::JsonMapper;
pub use xml::XmlMapper;

use serde_json::Value;

/// One mapped result object keyed by canonical attribute names.
pub type Record = serde_json::Map<String, Value>;

/// Synthetic ids are only injected for verbs that create or replace a
/// resource.
pub(crate) fn verb_takes_synthetic_id(verb: &str) -> bool {
    verb.eq_ignore_ascii_case("POST") || verb.eq_ignore_ascii_case("PUT")
}

/// The id route parameter, when the call context carries one.
pub(crate) fn context_id(context: &Value) -> Option<&Value> {
    context
        .get("params")
        .and_then(|params| params.get("id"))
        .filter(|id| !id.is_null())
}
