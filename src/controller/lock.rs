//! Lock pipeline
//!
//! Copies the chosen image into the system background directory and writes
//! the dconf profile, lock, and default files that pin it.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::sys::time::TimeVal;

use super::{LockController, Outcome, Phase};
use crate::error::LockError;
use crate::privilege;
use crate::reload::ReloadService;

/// Everything a lock run would do, computed without touching the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockPlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// False when the source already is the destination
    pub copy: bool,
    /// Files to write, in order, with their full content
    pub files: Vec<(PathBuf, String)>,
}

/// Validated source image
struct Placement {
    destination: PathBuf,
    in_place: bool,
    metadata: fs::Metadata,
}

impl<R: ReloadService> LockController<R> {
    /// Lock the background to `source`, logging each phase
    pub fn lock(&self, source: &Path) -> Outcome {
        self.lock_with(source, &mut |phase| log::info!("{}", phase))
    }

    /// Lock the background to `source`, reporting phases to `progress`
    pub fn lock_with(&self, source: &Path, progress: &mut dyn FnMut(Phase)) -> Outcome {
        let mut modified = false;
        match self.run_lock(source, progress, &mut modified) {
            Ok(()) => {
                log::info!("Background locked to {}", source.display());
                Outcome::succeeded("locked", true)
            }
            Err(e) => {
                log::error!("Lock failed: {}", e);
                Outcome::failed("lock failed", &e, modified)
            }
        }
    }

    /// Validate `source` and describe the lock run without performing it
    pub fn plan(&self, source: &Path) -> Result<LockPlan, LockError> {
        let placement = self.place(source)?;
        let writer = self.writer();
        let paths = &self.settings.paths;

        Ok(LockPlan {
            source: source.to_path_buf(),
            copy: !placement.in_place,
            files: vec![
                (paths.profile.clone(), writer.render_profile()),
                (paths.lock_file(), writer.render_lock_file()),
                (
                    paths.default_file.clone(),
                    writer.render_default_file(&placement.destination),
                ),
            ],
            destination: placement.destination,
        })
    }

    fn run_lock(
        &self,
        source: &Path,
        progress: &mut dyn FnMut(Phase),
        modified: &mut bool,
    ) -> Result<(), LockError> {
        let paths = &self.settings.paths;
        let writer = self.writer();

        progress(Phase::Validate);
        let placement = self.place(source)?;
        let mut targets = vec![
            paths.profile.clone(),
            paths.lock_file(),
            paths.default_file.clone(),
        ];
        if !placement.in_place {
            targets.push(placement.destination.clone());
        }
        privilege::ensure_writable(targets.as_slice())?;

        if placement.in_place {
            progress(Phase::SkipCopy);
            log::debug!(
                "{} is already in {}",
                source.display(),
                paths.background_dir.display()
            );
        } else {
            progress(Phase::CopyImage);
            *modified = true;
            copy_image(source, &placement.destination, &placement.metadata)?;
        }

        progress(Phase::CreateDirectories);
        *modified = true;
        writer.ensure_directories()?;

        progress(Phase::WriteProfile);
        writer.write_profile()?;

        progress(Phase::WriteLockFile);
        writer.write_lock_file()?;

        progress(Phase::WriteDefaults);
        writer.write_default_file(&placement.destination)?;

        progress(Phase::Reload);
        self.reload.reload()
    }

    /// Check the source image and work out where it goes
    fn place(&self, source: &Path) -> Result<Placement, LockError> {
        let metadata = fs::metadata(source).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LockError::input(source, "file does not exist"),
            _ => LockError::input(source, e.to_string()),
        })?;
        if !metadata.is_file() {
            return Err(LockError::input(source, "not a regular file"));
        }

        let destination = self
            .settings
            .paths
            .destination_for(source)
            .ok_or_else(|| LockError::input(source, "path has no file name"))?;
        if destination.file_name().and_then(|n| n.to_str()).is_none() {
            return Err(LockError::input(source, "file name is not valid UTF-8"));
        }
        let in_place = same_file(source, &metadata, &destination);

        Ok(Placement {
            destination,
            in_place,
            metadata,
        })
    }
}

/// True when both paths name the same inode, including hard links and symlinks
fn same_file(source: &Path, metadata: &fs::Metadata, destination: &Path) -> bool {
    if source == destination {
        return true;
    }
    match fs::metadata(destination) {
        Ok(dest) => dest.dev() == metadata.dev() && dest.ino() == metadata.ino(),
        Err(_) => false,
    }
}

/// Copy contents and permissions, then carry over access/modification times
fn copy_image(source: &Path, destination: &Path, metadata: &fs::Metadata) -> Result<(), LockError> {
    if let Some(dir) = destination.parent() {
        fs::create_dir_all(dir).map_err(LockError::fs("create directory", dir))?;
    }

    fs::copy(source, destination).map_err(LockError::fs("copy image to", destination))?;

    let atime = TimeVal::new(metadata.atime() as _, (metadata.atime_nsec() / 1000) as _);
    let mtime = TimeVal::new(metadata.mtime() as _, (metadata.mtime_nsec() / 1000) as _);
    if let Err(e) = nix::sys::stat::utimes(destination, &atime, &mtime) {
        log::warn!(
            "Copied {} but could not preserve timestamps: {}",
            destination.display(),
            e
        );
    }

    log::debug!("Copied {} -> {}", source.display(), destination.display());
    Ok(())
}
