//! The closed candidate-label set shared by both classifier backends.

/// Single-label targets, in the order hypotheses are scored.
pub const CANDIDATE_LABELS: [&str; 4] = ["fake news", "real news", "propaganda", "satire"];

/// Label reported when a generative backend gave no usable answer.
pub const UNKNOWN_LABEL: &str = "unknown";

pub fn is_candidate(label: &str) -> bool {
    CANDIDATE_LABELS.contains(&label)
}

/// Candidate labels as owned strings, for adapters that keep their own copy.
pub fn candidate_labels() -> Vec<String> {
    CANDIDATE_LABELS.iter().map(|l| l.to_string()).collect()
}
