//! Terminal result of a lock or unlock run

use serde::Serialize;

use crate::error::{ErrorKind, LockError};

/// What a front end shows the user once a pipeline finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    /// Whether anything on the system was changed
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Outcome {
    pub fn succeeded(message: impl Into<String>, changed: bool) -> Self {
        Self {
            success: true,
            changed,
            kind: None,
            message: message.into(),
            detail: None,
        }
    }

    /// Convert a pipeline error. `modified` records whether any step had
    /// already touched the system when it failed.
    pub fn failed(message: impl Into<String>, err: &LockError, modified: bool) -> Self {
        let mut detail = err.to_string();
        if modified {
            detail.push_str(
                "\nEarlier steps were not rolled back; the image may be copied \
                 without the settings written, or the settings written without a reload.",
            );
        }
        Self {
            success: false,
            changed: modified,
            kind: Some(err.kind()),
            message: message.into(),
            detail: Some(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_mentions_partial_state() {
        let err = LockError::Reload {
            command: "dconf update".into(),
            detail: "exit status: 1".into(),
        };
        let outcome = Outcome::failed("lock failed", &err, true);
        assert!(!outcome.success);
        assert_eq!(outcome.kind, Some(ErrorKind::Reload));
        assert!(outcome.detail.as_deref().unwrap().contains("not rolled back"));

        let outcome = Outcome::failed("lock failed", &err, false);
        assert!(!outcome.detail.as_deref().unwrap().contains("not rolled back"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Outcome::succeeded("already unlocked", false)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "changed": false,
                "message": "already unlocked",
            })
        );
    }
}
