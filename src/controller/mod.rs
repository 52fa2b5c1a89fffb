//! Lock/unlock orchestration
//!
//! Both pipelines run their steps in a fixed order, stop at the first
//! failure, and never roll back:
//!
//! ```text
//! lock:   validate → copy image → mkdir → profile → lock file → defaults → reload
//! unlock: check overrides → remove overrides → reload
//! ```
//!
//! The lock state itself is never stored; [`LockController::status`]
//! derives it from which override files exist.

mod lock;
mod outcome;
mod phase;
mod unlock;

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{ConfigError, Settings};
use crate::error::LockError;
use crate::keyfile;
use crate::reload::{CommandReload, ReloadService};
use crate::writer::{self, ConfigWriter};

pub use lock::LockPlan;
pub use outcome::Outcome;
pub use phase::Phase;

/// System state inferred from the override files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    /// Neither the default file nor the lock file exists
    Unlocked,
    /// Both exist
    Locked,
    /// Only one exists, usually after an interrupted run
    Partial,
}

impl LockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unlocked => "unlocked",
            Self::Locked => "locked",
            Self::Partial => "partial",
        }
    }
}

/// Snapshot returned by [`LockController::status`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub state: LockState,
    /// Image referenced by the default file, if it names one
    pub image: Option<PathBuf>,
    /// Whether that image exists on disk
    pub image_present: bool,
}

pub struct LockController<R: ReloadService = CommandReload> {
    settings: Settings,
    reload: R,
}

impl LockController<CommandReload> {
    /// Controller that reloads with the configured command
    ///
    /// An empty command is rejected rather than replaced with `dconf update`.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let reload = CommandReload::new(&settings.reload_command).ok_or_else(|| {
            ConfigError::InvalidCommand(settings.reload_command.join(" "))
        })?;
        Ok(Self::new(settings, reload))
    }
}

impl<R: ReloadService> LockController<R> {
    pub fn new(settings: Settings, reload: R) -> Self {
        Self { settings, reload }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn writer(&self) -> ConfigWriter<'_> {
        ConfigWriter::new(&self.settings)
    }

    /// Derive the current lock state from the filesystem
    pub fn status(&self) -> Result<LockStatus, LockError> {
        let paths = &self.settings.paths;
        let has_defaults = writer::is_present(&paths.default_file);
        let has_lock = writer::is_present(&paths.lock_file());

        let state = match (has_defaults, has_lock) {
            (true, true) => LockState::Locked,
            (false, false) => LockState::Unlocked,
            _ => LockState::Partial,
        };

        let image = if has_defaults {
            self.locked_image()?
        } else {
            None
        };
        let image_present = image.as_ref().is_some_and(|p| p.is_file());

        Ok(LockStatus {
            state,
            image,
            image_present,
        })
    }

    /// Read the image path back out of the default file's `picture-uri`
    fn locked_image(&self) -> Result<Option<PathBuf>, LockError> {
        let path = &self.settings.paths.default_file;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            // Dangling symlink
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LockError::fs("read", path)(e)),
        };

        let parsed = match keyfile::parse_file(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Could not parse {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let uri = parsed
            .get(&self.settings.schema)
            .and_then(|section| section.get("picture-uri"))
            .map(|raw| keyfile::unescape(keyfile::unquote(raw)));

        Ok(uri.and_then(|uri| uri.strip_prefix("file://").map(PathBuf::from)))
    }
}
