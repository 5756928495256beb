//! Parse LLM output into classification records

use crate::error::TaxonomyParseError;
use serde_json::Value;
use taxonomist_domain::ClassificationRecord;
use tracing::warn;

/// Parse a raw model reply into classification records
///
/// Code fences around the JSON are removed first. A reply that is valid JSON
/// but not an array contributes no records. Anything that does not decode, or
/// an array element that is not an object, fails with the raw reply attached.
pub fn parse_taxonomy_response(
    raw: &str,
) -> Result<Vec<ClassificationRecord>, TaxonomyParseError> {
    let body = strip_code_fence(raw);

    let json: Value =
        serde_json::from_str(body).map_err(|e| TaxonomyParseError::new(e.to_string(), raw))?;

    let Value::Array(items) = json else {
        warn!(kind = json_kind(&json), "Model reply is not a JSON array; ignoring it");
        return Ok(Vec::new());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(TaxonomyParseError::new(
                    format!(
                        "array element {} is a {}, expected an object",
                        index,
                        json_kind(&item)
                    ),
                    raw,
                ));
            }
            serde_json::from_value(item).map_err(|e| {
                TaxonomyParseError::new(format!("array element {}: {}", index, e), raw)
            })
        })
        .collect()
}

/// Remove a leading and trailing markdown code fence
///
/// The opening fence may carry a language tag (```` ```json ````).
fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.split_once('\n') {
            Some((tag, content)) if is_language_tag(tag) => content,
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

fn is_language_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
