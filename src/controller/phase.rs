//! Progress phases reported while a pipeline runs

use std::fmt;

/// One step of the lock or unlock pipeline, announced before it executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Check the source image and privileges
    Validate,
    CopyImage,
    /// Source already is the destination
    SkipCopy,
    CreateDirectories,
    WriteProfile,
    WriteLockFile,
    WriteDefaults,
    /// Look for existing override files
    CheckOverrides,
    RemoveOverrides,
    Reload,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::CopyImage => "copy-image",
            Self::SkipCopy => "skip-copy",
            Self::CreateDirectories => "create-directories",
            Self::WriteProfile => "write-profile",
            Self::WriteLockFile => "write-lock-file",
            Self::WriteDefaults => "write-defaults",
            Self::CheckOverrides => "check-overrides",
            Self::RemoveOverrides => "remove-overrides",
            Self::Reload => "reload",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Validate => "Checking image and permissions",
            Self::CopyImage => "Copying image",
            Self::SkipCopy => "Image already in the system directory, skipping copy",
            Self::CreateDirectories => "Creating directories",
            Self::WriteProfile => "Writing profile file",
            Self::WriteLockFile => "Writing lock file",
            Self::WriteDefaults => "Writing default settings",
            Self::CheckOverrides => "Looking for override files",
            Self::RemoveOverrides => "Removing override files",
            Self::Reload => "Updating settings database",
        };
        f.write_str(text)
    }
}
