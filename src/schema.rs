use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared type of a canonical attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Text,
    Integer,
    Float,
    Date,
    Datetime,
    Boolean,
    Array,
    Json,
}

/// The ordered canonical set of field names a model exposes.
///
/// Order is significant: form-encoded request bodies emit pairs in
/// schema order.
pub type AttributeSchema = IndexMap<String, AttributeType>;
