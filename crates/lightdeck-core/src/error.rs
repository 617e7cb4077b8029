//! Error taxonomy shared by every lightdeck crate.

/// All error types that can occur while managing or commanding lights.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A color string was not six hexadecimal digits (optionally `#`-prefixed).
    #[error("malformed color {0:?}: expected 6 hex digits")]
    MalformedColor(String),

    /// A light could not be reached or rejected the request.
    #[error("light {id} is unreachable: {reason}")]
    DeviceUnreachable { id: String, reason: String },

    /// The light id is not in the registry.
    #[error("Light {0} not found")]
    UnknownLight(String),

    /// The scene name is not in the catalog.
    #[error("scene {0:?} not found")]
    UnknownScene(String),

    #[error("light id must not be empty")]
    EmptyId,

    /// The light id is already registered.
    #[error("Light {0} already exists")]
    DuplicateLight(String),

    /// Reading or writing the registry file failed.
    #[error("registry {action} error: {err}")]
    Io {
        action: String,
        err: std::io::Error,
    },

    /// The registry file is not valid JSON of the expected shape.
    #[error("registry json error: {0}")]
    Json(String),
}

impl Error {
    /// Create a new registry I/O error
    pub fn io(action: &str, err: std::io::Error) -> Self {
        Error::Io {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new unreachable-device error
    pub fn unreachable(id: &str, reason: impl ToString) -> Self {
        Error::DeviceUnreachable {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
