use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_$][A-Za-z0-9_.$-]*)\s*\}\}").unwrap());

/// Resolve `{{dot.path}}` placeholders against a JSON context.
///
/// Sources without a `{{` marker are returned unchanged; placeholders
/// whose path is missing from the context render as empty.
pub fn interpolate(source: &str, context: &Value) -> String {
    if source.is_empty() {
        return String::new();
    }
    if !source.contains("{{") {
        return source.to_string();
    }

    PLACEHOLDER
        .replace_all(source, |caps: &Captures<'_>| {
            lookup(context, &caps[1]).map(scalar_to_string).unwrap_or_default()
        })
        .into_owned()
}

fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(context, |acc, segment| acc.get(segment))
}

/// Render a JSON scalar the way it appears on the wire: strings without
/// quotes, null as empty.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpolates_a_value() {
        let result = interpolate("Value is: {{value}}", &json!({"value": 123}));
        assert_eq!(result, "Value is: 123");
    }

    #[test]
    fn returns_source_unchanged_without_markers() {
        let result = interpolate("No interpolation found", &json!({}));
        assert_eq!(result, "No interpolation found");
    }

    #[test]
    fn empty_source_yields_empty_string() {
        assert_eq!(interpolate("", &json!({"value": 1})), "");
    }

    #[test]
    fn resolves_nested_dot_paths() {
        let context = json!({"query": {"id": "abc123"}});
        assert_eq!(interpolate("/model/{{query.id}}", &context), "/model/abc123");
    }

    #[test]
    fn missing_fields_render_empty() {
        assert_eq!(interpolate("id={{missing.path}}!", &json!({})), "id=!");
    }

    #[test]
    fn multiple_placeholders_resolve_independently() {
        let context = json!({"req": {"startDate": "20150413", "endDate": "20150417"}});
        let result = interpolate(
            "StartDate eq '{{req.startDate}}' and EndDate eq '{{req.endDate}}'",
            &context,
        );
        assert_eq!(result, "StartDate eq '20150413' and EndDate eq '20150417'");
    }

    #[test]
    fn scalars_render_without_json_quoting() {
        assert_eq!(interpolate("{{flag}}", &json!({"flag": true})), "true");
        assert_eq!(interpolate("{{rate}}", &json!({"rate": 1.5})), "1.5");
        assert_eq!(interpolate("x{{nothing}}y", &json!({"nothing": null})), "xy");
    }
}
