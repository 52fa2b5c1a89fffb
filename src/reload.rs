//! dconf database reload
//!
//! The controller only sees [`ReloadService`]; production runs `dconf update`.

use std::process::Command;

use crate::error::LockError;

/// Recompiles the settings database from the keyfiles on disk
pub trait ReloadService {
    fn reload(&self) -> Result<(), LockError>;
}

/// Runs an external command and fails on non-zero exit
#[derive(Debug, Clone)]
pub struct CommandReload {
    program: String,
    args: Vec<String>,
}

impl CommandReload {
    /// Build from a program followed by its arguments. `None` if `argv` is empty.
    pub fn new(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// `dconf update`
    pub fn dconf() -> Self {
        Self {
            program: "dconf".to_string(),
            args: vec!["update".to_string()],
        }
    }

    /// The command line, quoted for display
    pub fn command_line(&self) -> String {
        let parts = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shlex::try_join(parts).unwrap_or_else(|_| {
            let mut line = self.program.clone();
            for arg in &self.args {
                line.push(' ');
                line.push_str(arg);
            }
            line
        })
    }
}

impl ReloadService for CommandReload {
    fn reload(&self) -> Result<(), LockError> {
        log::debug!("Running {}", self.command_line());

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| LockError::Reload {
                command: self.command_line(),
                detail: format!("failed to spawn: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, stderr)
            };
            return Err(LockError::Reload {
                command: self.command_line(),
                detail,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{}: {}", self.program, stdout.trim());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_argv() {
        assert!(CommandReload::new(&[]).is_none());
    }

    #[test]
    fn test_command_line() {
        assert_eq!(CommandReload::dconf().command_line(), "dconf update");
        let reload = CommandReload::new(&argv(&["sh", "-c", "exit 1"])).unwrap();
        let line = reload.command_line();
        assert!(line.starts_with("sh -c "), "{line}");
        assert_eq!(shlex::split(&line).unwrap(), argv(&["sh", "-c", "exit 1"]));
    }

    #[test]
    fn test_success() {
        let reload = CommandReload::new(&argv(&["true"])).unwrap();
        assert!(reload.reload().is_ok());
    }

    #[test]
    fn test_nonzero_exit_carries_stderr() {
        let reload =
            CommandReload::new(&argv(&["sh", "-c", "echo 'database is locked' >&2; exit 3"]))
                .unwrap();
        let err = reload.reload().unwrap_err();
        match err {
            LockError::Reload { detail, .. } => {
                assert!(detail.contains("database is locked"), "{detail}");
                assert!(detail.contains('3'), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program() {
        let reload = CommandReload::new(&argv(&["/nonexistent/bglock-dconf"])).unwrap();
        let err = reload.reload().unwrap_err();
        assert!(matches!(err, LockError::Reload { .. }));
        assert!(err.to_string().contains("failed to spawn"));
    }
}
