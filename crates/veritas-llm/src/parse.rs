//! Best-effort extraction of a verdict from free-form model output.

use veritas_core::UNKNOWN_LABEL;

pub const NO_RATIONALE: &str = "No rationale provided.";
pub const NO_VALID_JSON: &str = "No valid JSON found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClassification {
    pub label: String,
    pub rationale: String,
    /// False when the output was not a JSON object.
    pub parsed: bool,
}

/// Parse the whole of `raw` as a JSON object with `label` and `rationale`.
///
/// Never fails. Anything that is not a JSON object yields the `unknown`
/// label; missing or non-string fields take their defaults. The label is
/// kept as given even if it is not one of the candidate labels.
pub fn parse_classification(raw: &str) -> ParsedClassification {
    let object = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => {
            return ParsedClassification {
                label: UNKNOWN_LABEL.to_string(),
                rationale: NO_VALID_JSON.to_string(),
                parsed: false,
            }
        }
    };

    let field = |key: &str, default: &str| {
        object.get(key).and_then(|v| v.as_str()).unwrap_or(default).to_string()
    };

    ParsedClassification {
        label: field("label", UNKNOWN_LABEL),
        rationale: field("rationale", NO_RATIONALE),
        parsed: true,
    }
}
