use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Failures reported by [`Registry`](crate::registry::Registry) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("directory '{}' is not being watched", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("directory '{}' is already being watched", .0.display())]
    DirectoryExists(PathBuf),

    #[error("remote '{0}' does not exist")]
    RemoteNotFound(String),

    #[error("remote '{url}' with username '{username}' already exists")]
    RemoteExists { url: String, username: String },

    /// Carries the rejected key and the keys that would have been accepted.
    #[error("unknown config '{key}'")]
    UnknownConfigKey { key: String, valid: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

impl RegistryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RegistryError::InvalidArgument(msg.into())
    }

    /// Duplicates leave the registry exactly as the user asked for it, so
    /// they are only warned about.
    pub fn severity(&self) -> Severity {
        match self {
            RegistryError::DirectoryExists(_) | RegistryError::RemoteExists { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            RegistryError::DirectoryNotFound(_) | RegistryError::DirectoryExists(_) => {
                Some("see 'w2u list --all'".to_string())
            }
            RegistryError::RemoteNotFound(_) | RegistryError::RemoteExists { .. } => {
                Some("see 'w2u remote list'".to_string())
            }
            RegistryError::UnknownConfigKey { valid, .. } => {
                Some(format!("valid configs are: {}", valid.join(", ")))
            }
            RegistryError::InvalidArgument(_) => None,
        }
    }
}
