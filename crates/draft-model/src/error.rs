use thiserror::Error;

/// Problems with the template definition itself.
///
/// These affect every row identically, so they abort the batch before any
/// row is processed.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template is not a valid document container: {0}")]
    InvalidContainer(String),

    #[error("template is missing required part: {part}")]
    MissingPart { part: String },

    #[error("template part {part} is not valid UTF-8")]
    InvalidEncoding { part: String },

    #[error("malformed placeholder in {part} at byte {offset}: {reason}")]
    MalformedPlaceholder {
        part: String,
        offset: usize,
        reason: String,
    },
}

/// A failure rendering one row.
///
/// Always recoverable at batch level: the row is recorded in the manifest
/// and the batch continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("missing value for placeholder '{0}'")]
    MissingPlaceholder(String),

    #[error("invalid substitution for placeholder '{placeholder}': {reason}")]
    InvalidSubstitution { placeholder: String, reason: String },

    #[error("render timed out after {millis} ms")]
    Timeout { millis: u128 },

    #[error("renderer failed: {0}")]
    Failed(String),
}
