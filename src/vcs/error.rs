use thiserror::Error;

/// Failure of a single version-control call.
///
/// The `Display` form is the human-readable description shown in traces.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The client program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The client ran but reported a failure.
    #[error("{message}")]
    CommandFailed { command: String, message: String },
    /// Client output was not valid XML.
    #[error("Unreadable client output: {0}")]
    Xml(#[from] roxmltree::Error),
    /// Client output could not be decoded as text.
    #[error("Undecodable client output: {0}")]
    Decode(String),
    /// A revision argument could not be parsed.
    #[error("Invalid revision: {0}")]
    Revision(String),
    /// Local filesystem failure while preparing a call.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
