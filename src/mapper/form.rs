use serde_json::Value;

use crate::action::Action;
use crate::error::WiremapResult;
use crate::interpolate::scalar_to_string;
use crate::schema::AttributeSchema;

/// Maps canonical attributes to `application/x-www-form-urlencoded`
/// request bodies. Request-only; form-encoded responses are parsed per
/// the connection format.
pub struct FormEncodedMapper<'a> {
    schema: &'a AttributeSchema,
    action: &'a Action,
}

impl<'a> FormEncodedMapper<'a> {
    pub fn new(schema: &'a AttributeSchema, action: &'a Action) -> Self {
        Self { schema, action }
    }

    /// Encode one object, or several objects flattened into a single
    /// pair list joined by `&`.
    pub fn map_request(&self, values: &Value) -> WiremapResult<String> {
        let encoded = match values {
            Value::Array(items) => items
                .iter()
                .map(|item| self.map_object(item))
                .collect::<Vec<String>>()
                .join("&"),
            single => self.map_object(single),
        };
        Ok(encoded)
    }

    /// Pairs are emitted in schema attribute order, not input key order.
    fn map_object(&self, object: &Value) -> String {
        let mut pairs = Vec::new();
        for attribute in self.schema.keys() {
            let Some(wire_key) = self.action.mapping.request.get(attribute) else {
                continue;
            };
            let Some(value) = object.get(attribute) else {
                continue;
            };
            pairs.push(format!(
                "{}={}",
                encode_component(wire_key),
                encode_component(&scalar_to_string(value))
            ));
        }
        pairs.join("&")
    }
}

/// Form-wire component encoding: sub-delims stay readable, encoded
/// spaces become `+`.
fn encode_component(input: &str) -> String {
    let mut encoded = urlencoding::encode(input).into_owned();
    for (escaped, raw) in
        [("%20", "+"), ("%27", "'"), ("%21", "!"), ("%2A", "*"), ("%28", "("), ("%29", ")")]
    {
        encoded = encoded.replace(escaped, raw);
    }
    encoded
}
