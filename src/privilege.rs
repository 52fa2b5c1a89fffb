//! Privilege detection
//!
//! Runs before the pipelines touch anything so a missing `sudo` is reported
//! as a permission problem up front instead of a failed write halfway through.

use std::path::Path;

use nix::unistd::{access, geteuid, AccessFlags};

use crate::error::LockError;

pub fn is_root() -> bool {
    geteuid().is_root()
}

/// Check that this process may create, replace, or delete each of `targets`
///
/// Root always passes. Otherwise the target itself (if present) and the
/// nearest existing ancestor of its parent must be writable.
pub fn ensure_writable<P: AsRef<Path>>(targets: &[P]) -> Result<(), LockError> {
    if is_root() {
        return Ok(());
    }

    for target in targets {
        let target = target.as_ref();

        if target.exists() && access(target, AccessFlags::W_OK).is_err() {
            return Err(LockError::Permission {
                path: target.to_path_buf(),
            });
        }

        let parent = target.parent().unwrap_or(Path::new("/"));
        let dir = nearest_existing(parent);
        if access(dir, AccessFlags::W_OK).is_err() {
            return Err(LockError::Permission {
                path: dir.to_path_buf(),
            });
        }
    }

    Ok(())
}

/// Walk up from `path` to the first ancestor that exists
fn nearest_existing(path: &Path) -> &Path {
    path.ancestors()
        .find(|p| p.exists())
        .unwrap_or(Path::new("/"))
}
