//! Error types reported by host services

use thiserror::Error;

/// Errors a host service can return for a single request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The module loader refused or failed to load a file
    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: String, message: String },

    /// The module loader refused to unload a module
    #[error("Failed to unload {target}: {message}")]
    UnloadFailed { target: String, message: String },

    /// The handle does not refer to a known module or setting
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was rejected (read-only setting, invalid value, ...)
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl HostError {
    /// Create a load failure
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LoadFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unload failure
    pub fn unload(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnloadFailed {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HostError::load("fun/a.smx", "Unable to open file");
        assert_eq!(err.to_string(), "Failed to load fun/a.smx: Unable to open file");

        let err = HostError::unload("#4", "plugin is locked");
        assert_eq!(err.to_string(), "Failed to unload #4: plugin is locked");
    }

    #[test]
    fn test_not_found_display() {
        let err = HostError::NotFound("sv_gravity".to_string());
        assert!(err.to_string().contains("sv_gravity"));
    }
}
