//! Error types for the lock/unlock pipelines

use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// Machine-readable failure category carried by a failed [`crate::Outcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "input-error")]
    Input,
    #[serde(rename = "permission-error")]
    Permission,
    #[serde(rename = "filesystem-error")]
    Filesystem,
    #[serde(rename = "reload-error")]
    Reload,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input-error",
            Self::Permission => "permission-error",
            Self::Filesystem => "filesystem-error",
            Self::Reload => "reload-error",
        }
    }

    /// Process exit code used by the CLI for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Input => 2,
            Self::Permission => 3,
            Self::Filesystem => 4,
            Self::Reload => 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Background image {}: {reason}", .path.display())]
    Input { path: PathBuf, reason: String },

    #[error("Insufficient privilege to modify {} (run as root)", .path.display())]
    Permission { path: PathBuf },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Reload command `{command}` failed: {detail}")]
    Reload { command: String, detail: String },
}

impl LockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input { .. } => ErrorKind::Input,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Reload { .. } => ErrorKind::Reload,
        }
    }

    pub(crate) fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a closure for `map_err` that tags an I/O error with its action and path
    pub(crate) fn fs(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Filesystem {
            action,
            path,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_stable_names() {
        let err = LockError::input("/tmp/missing.png", "does not exist");
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.kind().as_str(), "input-error");

        let err = LockError::Reload {
            command: "dconf update".into(),
            detail: "exit status 1".into(),
        };
        assert_eq!(err.kind().as_str(), "reload-error");
        assert_eq!(err.kind().exit_code(), 5);
    }

    #[test]
    fn filesystem_error_names_path_and_action() {
        let err = LockError::fs("write", "/etc/dconf/profile/user")(io::Error::from(
            io::ErrorKind::PermissionDenied,
        ));
        let text = err.to_string();
        assert!(text.starts_with("Failed to write /etc/dconf/profile/user"));
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }

    #[test]
    fn kind_serializes_as_kebab_name() {
        let json = serde_json::to_string(&ErrorKind::Permission).unwrap();
        assert_eq!(json, "\"permission-error\"");
    }
}
