//! Prompt sent to the generative backend.

use veritas_core::CANDIDATE_LABELS;

/// Instruction prompt asking for a JSON `{label, rationale}` object.
/// The snippet is embedded verbatim.
pub fn classification_prompt(text: &str) -> String {
    let quoted: Vec<String> = CANDIDATE_LABELS.iter().map(|l| format!("'{}'", l)).collect();
    format!(
        r#"You are an AI that classifies short news statements into categories:
[{quoted}].

Please analyze the following text and output valid JSON with two fields:
"label" (one of: {plain})
and "rationale" (a short explanation).

Text: "{text}"

Output format example:
{{
  "label": "fake news",
  "rationale": "Because it contradicts verified sources..."
}}
"#,
        quoted = quoted.join(", "),
        plain = CANDIDATE_LABELS.join(", "),
        text = text,
    )
}
