//! Paths and dconf settings used by the lock pipelines
//!
//! Built-in defaults target Cinnamon on Pardus ETAP boards. Any of them can be
//! overridden from `/etc/bglock.conf`:
//!
//! ```text
//! [paths]
//! background-dir=/usr/share/backgrounds
//! profile=/etc/dconf/profile/user
//! lock-dir=/etc/dconf/db/local.d/locks
//! lock-file=00-etap-background-lock
//! default-file=/etc/dconf/db/local.d/00-etap-background-default
//!
//! [dconf]
//! schema=org/cinnamon/desktop/background
//! picture-options=zoom
//!
//! [reload]
//! command=dconf update
//! ```

use std::path::{Path, PathBuf};

use crate::keyfile::{self, ParseError, ParsedFile};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/bglock.conf";

pub const BACKGROUND_DIR: &str = "/usr/share/backgrounds";
pub const DCONF_PROFILE: &str = "/etc/dconf/profile/user";
pub const DCONF_LOCK_DIR: &str = "/etc/dconf/db/local.d/locks";
pub const DCONF_LOCK_FILE_NAME: &str = "00-etap-background-lock";
pub const DCONF_DEFAULT_FILE: &str = "/etc/dconf/db/local.d/00-etap-background-default";

pub const BACKGROUND_SCHEMA: &str = "org/cinnamon/desktop/background";
pub const DEFAULT_PICTURE_OPTION: &str = "zoom";
pub const RELOAD_COMMAND: &[&str] = &["dconf", "update"];

/// Values accepted by the `picture-options` key
pub const PICTURE_OPTIONS: &[&str] = &[
    "none",
    "wallpaper",
    "centered",
    "scaled",
    "stretched",
    "zoom",
    "spanned",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Unknown config section: [{0}]")]
    UnknownSection(String),

    #[error("Unknown key '{key}' in [{section}]")]
    UnknownKey { section: String, key: String },

    #[error("'{key}' must be an absolute path, got '{value}'")]
    RelativePath { key: String, value: String },

    #[error("Invalid {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid picture-options '{0}' (expected one of {opts})", opts = PICTURE_OPTIONS.join(", "))]
    InvalidPictureOption(String),

    #[error("Invalid reload command: '{0}'")]
    InvalidCommand(String),
}

/// Filesystem locations owned by bglock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockPaths {
    /// System-wide directory images are copied into
    pub background_dir: PathBuf,
    /// dconf profile selecting the `local` system database
    pub profile: PathBuf,
    /// dconf locks directory
    pub lock_dir: PathBuf,
    /// File name of the lock file inside `lock_dir`
    pub lock_file_name: String,
    /// Keyfile holding the default background values
    pub default_file: PathBuf,
}

impl Default for LockPaths {
    fn default() -> Self {
        Self {
            background_dir: PathBuf::from(BACKGROUND_DIR),
            profile: PathBuf::from(DCONF_PROFILE),
            lock_dir: PathBuf::from(DCONF_LOCK_DIR),
            lock_file_name: DCONF_LOCK_FILE_NAME.to_string(),
            default_file: PathBuf::from(DCONF_DEFAULT_FILE),
        }
    }
}

impl LockPaths {
    /// Lay out every path under `root`, keeping the default file names
    pub fn under(root: &Path) -> Self {
        let rebase = |path: &str| root.join(path.trim_start_matches('/'));
        Self {
            background_dir: rebase(BACKGROUND_DIR),
            profile: rebase(DCONF_PROFILE),
            lock_dir: rebase(DCONF_LOCK_DIR),
            lock_file_name: DCONF_LOCK_FILE_NAME.to_string(),
            default_file: rebase(DCONF_DEFAULT_FILE),
        }
    }

    pub fn lock_file(&self) -> PathBuf {
        self.lock_dir.join(&self.lock_file_name)
    }

    /// Where an image named like `source` lands in the background directory
    pub fn destination_for(&self, source: &Path) -> Option<PathBuf> {
        source.file_name().map(|name| self.background_dir.join(name))
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub paths: LockPaths,
    /// dconf path of the background schema, without leading/trailing slashes
    pub schema: String,
    pub picture_options: String,
    /// Program and arguments that recompile the dconf database
    pub reload_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: LockPaths::default(),
            schema: BACKGROUND_SCHEMA.to_string(),
            picture_options: DEFAULT_PICTURE_OPTION.to_string(),
            reload_command: RELOAD_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Default settings with every path laid out under `root`
    pub fn under(root: &Path) -> Self {
        Self {
            paths: LockPaths::under(root),
            ..Self::default()
        }
    }

    /// Load settings from `path`, or from [`DEFAULT_CONFIG_PATH`] if it exists
    ///
    /// An explicitly requested file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !required && !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let parsed = keyfile::parse_keyfile(path).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_parsed(&parsed)
    }

    /// Apply a parsed config file on top of the defaults
    pub fn from_parsed(parsed: &ParsedFile) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        for (section, entries) in parsed {
            for (key, value) in entries {
                match (section.as_str(), key.as_str()) {
                    ("paths", "background-dir") => {
                        settings.paths.background_dir = absolute(key, value)?
                    }
                    ("paths", "profile") => settings.paths.profile = absolute(key, value)?,
                    ("paths", "lock-dir") => settings.paths.lock_dir = absolute(key, value)?,
                    ("paths", "lock-file") => {
                        if value.is_empty() || value.contains('/') {
                            return Err(ConfigError::InvalidValue {
                                key: key.clone(),
                                value: value.clone(),
                            });
                        }
                        settings.paths.lock_file_name = value.clone();
                    }
                    ("paths", "default-file") => {
                        settings.paths.default_file = absolute(key, value)?
                    }
                    ("dconf", "schema") => {
                        let schema = value.trim_matches('/');
                        if schema.is_empty() || schema.contains(char::is_whitespace) {
                            return Err(ConfigError::InvalidValue {
                                key: key.clone(),
                                value: value.clone(),
                            });
                        }
                        settings.schema = schema.to_string();
                    }
                    ("dconf", "picture-options") => {
                        let option = keyfile::unquote(value);
                        if !PICTURE_OPTIONS.contains(&option) {
                            return Err(ConfigError::InvalidPictureOption(value.clone()));
                        }
                        settings.picture_options = option.to_string();
                    }
                    ("reload", "command") => {
                        settings.reload_command = parse_command(value)?;
                    }
                    ("paths" | "dconf" | "reload", _) => {
                        return Err(ConfigError::UnknownKey {
                            section: section.clone(),
                            key: key.clone(),
                        });
                    }
                    _ => return Err(ConfigError::UnknownSection(section.clone())),
                }
            }

            if entries.is_empty() && !matches!(section.as_str(), "paths" | "dconf" | "reload") {
                return Err(ConfigError::UnknownSection(section.clone()));
            }
        }

        Ok(settings)
    }

    /// Fully-qualified dconf keys frozen by the lock file
    pub fn locked_keys(&self) -> [String; 2] {
        [
            format!("/{}/picture-uri", self.schema),
            format!("/{}/picture-options", self.schema),
        ]
    }
}

fn absolute(key: &str, value: &str) -> Result<PathBuf, ConfigError> {
    let path = PathBuf::from(value);
    if !path.is_absolute() {
        return Err(ConfigError::RelativePath {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(path)
}

/// Split a reload command using shell quoting rules
fn parse_command(raw: &str) -> Result<Vec<String>, ConfigError> {
    match shlex::split(raw) {
        Some(parts) if !parts.is_empty() => Ok(parts),
        _ => Err(ConfigError::InvalidCommand(raw.to_string())),
    }
}
