use thiserror::Error;

/// The only failure surface of the engine: input-shape problems in the
/// uploaded export. Every variant identifies what was wrong and where, and
/// aborts the current analysis without producing a partial report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInput {
    #[error("expected exactly 2 teams, found {}: [{}]", found.len(), found.join(", "))]
    TeamCount { found: Vec<String> },

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("line {line}: missing required field `{field}`")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: unparseable number `{value}` in `{field}`")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: unrecognized outcome `{value}` (expected WINNER or ERROR)")]
    UnknownOutcome { line: usize, value: String },

    #[error("line {line}: unreadable record: {message}")]
    UnreadableRecord { line: usize, message: String },
}
