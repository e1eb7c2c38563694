use std::fmt;

use serde_json::Value;
use sxd_document::Package;

use crate::connection::WireFormat;
use crate::error::{WiremapError, WiremapResult};

/// A structured response payload: a parsed JSON value or a parsed XML
/// document.
pub enum ParsedPayload {
    Json(Value),
    Xml(Package),
}

impl ParsedPayload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedPayload::Json(value) => Some(value),
            ParsedPayload::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&Package> {
        match self {
            ParsedPayload::Json(_) => None,
            ParsedPayload::Xml(package) => Some(package),
        }
    }
}

impl fmt::Debug for ParsedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedPayload::Json(value) => f.debug_tuple("Json").field(value).finish(),
            ParsedPayload::Xml(package) => {
                let root = root_element_name(package);
                f.debug_tuple("Xml").field(&root).finish()
            }
        }
    }
}

/// Best-effort structured view of a non-2xx response body, carried on
/// remote errors. XML bodies are carried as their raw text once they
/// are known to be well-formed; re-parse to inspect them.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedErrorBody {
    Json(Value),
    Xml(String),
}

impl ParsedErrorBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedErrorBody::Json(value) => Some(value),
            ParsedErrorBody::Xml(_) => None,
        }
    }
}

fn root_element_name(package: &Package) -> Option<String> {
    package
        .as_document()
        .root()
        .children()
        .iter()
        .find_map(|child| child.element())
        .map(|element| element.name().local_part().to_string())
}

/// Parse a raw response body according to the wire format.
///
/// Blank input yields `None` rather than an error; invalid input fails
/// with a `Parse` error carrying the payload, format and cause.
pub fn parse(raw: &str, format: WireFormat) -> WiremapResult<Option<ParsedPayload>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    match format {
        WireFormat::Json | WireFormat::FormEncoded => parse_json(raw).map(Some),
        WireFormat::Xml => parse_xml(raw).map(Some),
    }
}

fn parse_json(raw: &str) -> WiremapResult<ParsedPayload> {
    serde_json::from_str(raw)
        .map(ParsedPayload::Json)
        .map_err(|e| WiremapError::Parse {
            payload: raw.to_string(),
            format: WireFormat::Json,
            cause: e.to_string(),
        })
}

fn parse_xml(raw: &str) -> WiremapResult<ParsedPayload> {
    let package = sxd_document::parser::parse(raw).map_err(|e| WiremapError::Parse {
        payload: raw.to_string(),
        format: WireFormat::Xml,
        cause: format!("{e:?}"),
    })?;

    // A parse can succeed while producing no root element (e.g. only a
    // processing instruction); that is a parse failure, not an empty
    // result.
    if root_element_name(&package).is_none() {
        return Err(WiremapError::Parse {
            payload: raw.to_string(),
            format: WireFormat::Xml,
            cause: "document has no root element".to_string(),
        });
    }

    Ok(ParsedPayload::Xml(package))
}
