use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use jsonpath_lib::Compiled;
use serde_json::Value;

use super::{context_id, verb_takes_synthetic_id, Record};
use crate::action::Action;
use crate::error::{WiremapError, WiremapResult};
use crate::interpolate::scalar_to_string;
use crate::schema::{AttributeSchema, AttributeType};

/// Maps between canonical attributes and JSON wire payloads using
/// JSONPath selectors.
pub struct JsonMapper<'a> {
    schema: &'a AttributeSchema,
    action: &'a Action,
    context: &'a Value,
}

impl<'a> JsonMapper<'a> {
    pub fn new(schema: &'a AttributeSchema, action: &'a Action, context: &'a Value) -> Self {
        Self { schema, action, context }
    }

    /// Extract one record per node selected by the action's path
    /// selector. Fails when the selector matches nothing at all.
    pub fn map_response(&self, payload: &Value) -> WiremapResult<Vec<Record>> {
        let nodes: Vec<&Value> = if self.action.path_selector == "$" {
            vec![payload]
        } else {
            let selector = compile_selector(&self.action.path_selector)?;
            selector.select(payload).map_err(|e| WiremapError::Mapping {
                message: format!(
                    "selector {:?} could not be evaluated: {e:?}",
                    self.action.path_selector
                ),
                payload: Some(payload.to_string()),
            })?
        };

        if nodes.is_empty() {
            return Err(WiremapError::Mapping {
                message: format!(
                    "no nodes matched selector {:?}; check the action's path selector",
                    self.action.path_selector
                ),
                payload: Some(payload.to_string()),
            });
        }

        let attribute_selectors = self.compile_attribute_selectors()?;

        nodes
            .into_iter()
            .map(|node| self.map_node(node, &attribute_selectors))
            .collect()
    }

    fn compile_attribute_selectors(&self) -> WiremapResult<Vec<(&'a str, Compiled)>> {
        self.schema
            .keys()
            .filter_map(|attribute| {
                self.action
                    .mapping
                    .response
                    .get(attribute)
                    .map(|selector| (attribute.as_str(), selector))
            })
            .map(|(attribute, selector)| Ok((attribute, compile_selector(selector)?)))
            .collect()
    }

    fn map_node(&self, node: &Value, selectors: &[(&str, Compiled)]) -> WiremapResult<Record> {
        let mut record = Record::new();
        for (attribute, selector) in selectors {
            // First match wins; attributes whose selector finds nothing
            // stay absent from the record.
            if let Ok(matches) = selector.select(node) {
                if let Some(first) = matches.first() {
                    record.insert((*attribute).to_string(), (*first).clone());
                }
            }
        }
        Ok(record)
    }

    /// Produce the wire representation for a single object or, for an
    /// array, one wire object per element in order.
    pub fn map_request(&self, values: &Value) -> WiremapResult<Value> {
        match values {
            Value::Array(items) => items
                .iter()
                .map(|item| self.map_request_object(item))
                .collect::<WiremapResult<Vec<Value>>>()
                .map(Value::Array),
            single => self.map_request_object(single),
        }
    }

    fn map_request_object(&self, object: &Value) -> WiremapResult<Value> {
        let mut wire = Record::new();
        if let Some(fields) = object.as_object() {
            for (field, value) in fields {
                if let Some(wire_key) = self.action.mapping.request.get(field) {
                    wire.insert(wire_key.clone(), value.clone());
                }
            }
        }

        if !wire.contains_key("id") {
            if let Some(id) = self.synthetic_id()? {
                wire.insert("id".to_string(), id);
            }
        }

        Ok(Value::Object(wire))
    }

    fn synthetic_id(&self) -> WiremapResult<Option<Value>> {
        if !verb_takes_synthetic_id(&self.action.verb) {
            return Ok(None);
        }
        let Some(param) = context_id(self.context) else {
            return Ok(None);
        };

        let id_type = self.schema.get("id").copied().unwrap_or(AttributeType::Text);
        self.coerce_id(param, id_type).map(Some)
    }

    fn coerce_id(&self, param: &Value, id_type: AttributeType) -> WiremapResult<Value> {
        match id_type {
            AttributeType::Integer | AttributeType::Float => match param {
                Value::Number(_) => Ok(param.clone()),
                Value::String(s) => {
                    if let Ok(int) = s.parse::<i64>() {
                        Ok(Value::from(int))
                    } else if let Ok(float) = s.parse::<f64>() {
                        Ok(Value::from(float))
                    } else {
                        Err(WiremapError::mapping(format!(
                            "id parameter {s:?} is not numeric"
                        )))
                    }
                }
                other => Err(WiremapError::mapping(format!(
                    "id parameter {other} is not numeric"
                ))),
            },
            AttributeType::Text => Ok(Value::String(scalar_to_string(param))),
            AttributeType::Date | AttributeType::Datetime => coerce_datetime(param),
            AttributeType::Boolean => Ok(Value::Bool(scalar_to_string(param) == "true")),
            unsupported => Err(WiremapError::mapping(format!(
                "id field of type {unsupported:?} is not supported"
            ))),
        }
    }
}

/// Bare field names are shorthand for a root-level lookup.
fn normalize_selector(selector: &str) -> String {
    if selector.starts_with('$') {
        selector.to_string()
    } else {
        format!("$.{selector}")
    }
}

fn compile_selector(selector: &str) -> WiremapResult<Compiled> {
    let normalized = normalize_selector(selector);
    Compiled::compile(&normalized)
        .map_err(|e| WiremapError::Config(format!("invalid JSONPath selector {selector:?}: {e:?}")))
}

fn coerce_datetime(param: &Value) -> WiremapResult<Value> {
    if let Some(millis) = param.as_i64() {
        if let Some(dt) = Utc.timestamp_millis_opt(millis).single() {
            return Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
    }

    let text = scalar_to_string(param);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Value::String(
                dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
    }

    Err(WiremapError::mapping(format!(
        "id parameter {text:?} is not a recognizable date"
    )))
}
