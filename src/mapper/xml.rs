use serde_json::Value;
use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value as XPathValue, XPath};

use super::{context_id, verb_takes_synthetic_id, Record};
use crate::action::Action;
use crate::error::{WiremapError, WiremapResult};
use crate::interpolate::scalar_to_string;
use crate::schema::AttributeSchema;

/// Maps between canonical attributes and XML wire payloads using XPath
/// selectors.
pub struct XmlMapper<'a> {
    schema: &'a AttributeSchema,
    action: &'a Action,
    context: &'a Value,
}

impl<'a> XmlMapper<'a> {
    pub fn new(schema: &'a AttributeSchema, action: &'a Action, context: &'a Value) -> Self {
        Self { schema, action, context }
    }

    /// Extract one record per node selected by the action's path
    /// selector. Fails when the selector matches nothing.
    pub fn map_response(&self, package: &Package) -> WiremapResult<Vec<Record>> {
        let document = package.as_document();
        let factory = Factory::new();
        let xpath_context = Context::new();

        let selector = build_xpath(&factory, &self.action.path_selector)?;
        let selected = selector
            .evaluate(&xpath_context, document.root())
            .map_err(|e| WiremapError::mapping(format!(
                "selector {:?} could not be evaluated: {e}",
                self.action.path_selector
            )))?;

        let nodes = match selected {
            XPathValue::Nodeset(set) => set.document_order(),
            _ => Vec::new(),
        };

        if nodes.is_empty() {
            return Err(WiremapError::Mapping {
                message: format!(
                    "no nodes matched selector {:?}; check the action's path selector",
                    self.action.path_selector
                ),
                payload: None,
            });
        }

        nodes
            .into_iter()
            .map(|node| self.map_node(&factory, &xpath_context, node))
            .collect()
    }

    fn map_node<'d>(
        &self,
        factory: &Factory,
        xpath_context: &Context<'d>,
        node: Node<'d>,
    ) -> WiremapResult<Record> {
        let mut record = Record::new();
        for attribute in self.schema.keys() {
            let selector = match self.action.mapping.response.get(attribute) {
                Some(mapped) if looks_like_path(mapped) => mapped.clone(),
                Some(mapped) => format!("{mapped}/text()"),
                // Unmapped attributes read a same-named child element.
                None => format!("{attribute}/text()"),
            };

            let xpath = build_xpath(factory, &selector)?;
            let value = xpath.evaluate(xpath_context, node).map_err(|e| {
                WiremapError::mapping(format!(
                    "selector {selector:?} could not be evaluated: {e}"
                ))
            })?;
            record.insert(attribute.clone(), Value::String(xpath_string(value)));
        }
        Ok(record)
    }

    /// Serialize a single object, or a `<collection>` of objects, to an
    /// XML string using the action's request tags.
    pub fn map_request(&self, values: &Value) -> WiremapResult<String> {
        let root = &self.action.object_name_mapping;
        if root.is_empty() {
            return Err(WiremapError::Config(
                "action has no object name mapping for its XML body".to_string(),
            ));
        }

        let (objects, is_collection): (Vec<&Value>, bool) = match values {
            Value::Array(items) => (items.iter().collect(), true),
            single => (vec![single], false),
        };

        let mut payload = String::new();
        if is_collection {
            payload.push_str("<collection>");
        }

        for object in objects {
            payload.push('<');
            payload.push_str(root);
            payload.push('>');

            let has_id = object
                .as_object()
                .map(|fields| fields.contains_key("id"))
                .unwrap_or(false);
            if !has_id {
                if let Some(id) = self.synthetic_id() {
                    payload.push_str("<id>");
                    payload.push_str(&escape_text(&id));
                    payload.push_str("</id>");
                }
            }

            if let Some(fields) = object.as_object() {
                for (field, value) in fields {
                    if let Some(tag) = self.action.mapping.request.get(field) {
                        payload.push('<');
                        payload.push_str(tag);
                        payload.push('>');
                        payload.push_str(&escape_text(&scalar_to_string(value)));
                        payload.push_str("</");
                        payload.push_str(tag);
                        payload.push('>');
                    }
                }
            }

            payload.push_str("</");
            payload.push_str(root);
            payload.push('>');
        }

        if is_collection {
            payload.push_str("</collection>");
        }
        Ok(payload)
    }

    fn synthetic_id(&self) -> Option<String> {
        if !verb_takes_synthetic_id(&self.action.verb) {
            return None;
        }
        context_id(self.context).map(scalar_to_string)
    }
}

/// Mapping values containing path syntax are used verbatim; bare names
/// become a child-element text lookup.
fn looks_like_path(mapping: &str) -> bool {
    mapping.contains('/') || mapping.contains('.') || mapping.contains('@')
}

fn build_xpath(factory: &Factory, selector: &str) -> WiremapResult<XPath> {
    factory
        .build(selector)
        .map_err(|e| WiremapError::Config(format!("invalid XPath selector {selector:?}: {e}")))?
        .ok_or_else(|| {
            WiremapError::Config(format!("invalid XPath selector {selector:?}: empty expression"))
        })
}

/// XPath string conversion: node-sets concatenate the string-values of
/// their nodes (empty set yields an empty string).
fn xpath_string(value: XPathValue<'_>) -> String {
    match value {
        XPathValue::Nodeset(set) => set
            .document_order()
            .iter()
            .map(|node| node.string_value())
            .collect(),
        XPathValue::String(s) => s,
        XPathValue::Number(n) => n.to_string(),
        XPathValue::Boolean(b) => b.to_string(),
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
