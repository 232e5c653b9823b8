use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Failure kinds raised by the elimination controller and the k-optimization driver.
///
/// Library functions return `anyhow::Result`; callers that need the kind can
/// recover it with `err.downcast_ref::<SelectionError>()`.
#[derive(Debug)]
pub enum SelectionError {
    /// Invalid settings, detected before any scoring happens.
    Configuration(String),
    /// The scorer produced no usable scores for a pass.
    Scoring(String),
    /// The data set rejected an attribute removal.
    Mutation(String),
    /// A score artifact could not be written.
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SelectionError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            SelectionError::Scoring(msg) => write!(f, "Scoring failed: {}", msg),
            SelectionError::Mutation(msg) => write!(f, "Attribute removal failed: {}", msg),
            SelectionError::Io { path, source } => {
                write!(f, "Could not write {}: {}", path.display(), source)
            }
        }
    }
}

impl Error for SelectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SelectionError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SelectionError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        SelectionError::Configuration(msg.into())
    }

    pub fn scoring(msg: impl Into<String>) -> Self {
        SelectionError::Scoring(msg.into())
    }

    pub fn mutation(msg: impl Into<String>) -> Self {
        SelectionError::Mutation(msg.into())
    }
}
