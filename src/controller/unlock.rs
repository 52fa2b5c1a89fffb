//! Unlock pipeline

use super::{LockController, Outcome, Phase};
use crate::error::LockError;
use crate::privilege;
use crate::reload::ReloadService;
use crate::writer;

impl<R: ReloadService> LockController<R> {
    /// Remove the lock, logging each phase
    pub fn unlock(&self) -> Outcome {
        self.unlock_with(&mut |phase| log::info!("{}", phase))
    }

    /// Remove the lock, reporting phases to `progress`
    ///
    /// Copied images stay in the background directory.
    pub fn unlock_with(&self, progress: &mut dyn FnMut(Phase)) -> Outcome {
        let mut modified = false;
        match self.run_unlock(progress, &mut modified) {
            Ok(true) => {
                log::info!("Background unlocked");
                Outcome::succeeded("unlocked", true)
            }
            Ok(false) => {
                log::info!("No override files found, nothing to unlock");
                Outcome::succeeded("already unlocked", false)
            }
            Err(e) => {
                log::error!("Unlock failed: {}", e);
                Outcome::failed("unlock failed", &e, modified)
            }
        }
    }

    /// Returns whether anything was removed
    fn run_unlock(
        &self,
        progress: &mut dyn FnMut(Phase),
        modified: &mut bool,
    ) -> Result<bool, LockError> {
        let paths = &self.settings.paths;

        progress(Phase::CheckOverrides);
        let present: Vec<_> = [paths.default_file.clone(), paths.lock_file()]
            .into_iter()
            .filter(|p| writer::is_present(p))
            .collect();
        if present.is_empty() {
            return Ok(false);
        }
        privilege::ensure_writable(present.as_slice())?;

        progress(Phase::RemoveOverrides);
        let removed = self.writer().remove_overrides()?;
        *modified = removed > 0;
        log::debug!("Removed {} override file(s)", removed);

        progress(Phase::Reload);
        self.reload.reload()?;
        Ok(true)
    }
}
