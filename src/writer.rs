//! dconf override file rendering and persistence
//!
//! Every write replaces the whole file. Nothing here decides *whether* to
//! write; that is the controller's job.

use std::fs;
use std::path::Path;

use crate::config::Settings;
use crate::error::LockError;

/// Profile selecting the per-user database on top of the `local` system database
pub const PROFILE_CONTENT: &str = "user-db:user\nsystem-db:local\n";

/// Renders and writes the profile, lock, and default-value files
pub struct ConfigWriter<'a> {
    settings: &'a Settings,
}

impl<'a> ConfigWriter<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn render_profile(&self) -> String {
        PROFILE_CONTENT.to_string()
    }

    /// One fully-qualified key per line
    pub fn render_lock_file(&self) -> String {
        self.settings
            .locked_keys()
            .iter()
            .map(|key| format!("{key}\n"))
            .collect()
    }

    pub fn render_default_file(&self, destination: &Path) -> String {
        let uri = format!("file://{}", destination.display());
        format!(
            "[{}]\npicture-uri='{}'\npicture-options='{}'\n",
            self.settings.schema,
            escape_gvariant(&uri),
            escape_gvariant(&self.settings.picture_options),
        )
    }

    /// Create the lock directory and the parents of the profile and default files
    pub fn ensure_directories(&self) -> Result<(), LockError> {
        let paths = &self.settings.paths;
        let mut dirs = vec![paths.lock_dir.as_path()];
        dirs.extend(paths.profile.parent());
        dirs.extend(paths.default_file.parent());

        for dir in dirs {
            if !dir.is_dir() {
                log::debug!("Creating {}", dir.display());
            }
            fs::create_dir_all(dir).map_err(LockError::fs("create directory", dir))?;
        }
        Ok(())
    }

    pub fn write_profile(&self) -> Result<(), LockError> {
        write_file(&self.settings.paths.profile, &self.render_profile())
    }

    pub fn write_lock_file(&self) -> Result<(), LockError> {
        write_file(&self.settings.paths.lock_file(), &self.render_lock_file())
    }

    pub fn write_default_file(&self, destination: &Path) -> Result<(), LockError> {
        write_file(
            &self.settings.paths.default_file,
            &self.render_default_file(destination),
        )
    }

    /// Delete the default-value and lock files, returning how many existed
    ///
    /// The profile is left in place; without the local overrides it changes nothing.
    pub fn remove_overrides(&self) -> Result<usize, LockError> {
        let paths = &self.settings.paths;
        let mut removed = 0;

        for path in [paths.default_file.clone(), paths.lock_file()] {
            if is_present(&path) {
                fs::remove_file(&path).map_err(LockError::fs("remove", &path))?;
                log::debug!("Removed {}", path.display());
                removed += 1;
            }
        }

        Ok(removed)
    }
}

/// True for any directory entry at `path`, dangling symlinks included
pub(crate) fn is_present(path: &Path) -> bool {
    path.exists() || path.is_symlink()
}

fn write_file(path: &Path, content: &str) -> Result<(), LockError> {
    fs::write(path, content).map_err(LockError::fs("write", path))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Escape a value for use inside a single-quoted GVariant string
///
/// Control characters are escaped too, so a value always stays on one keyfile line.
fn escape_gvariant(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '\'' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn unique_root() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("bglock-writer-{}-{}", std::process::id(), id));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_render_default_file() {
        let settings = Settings::default();
        let writer = ConfigWriter::new(&settings);
        assert_eq!(
            writer.render_default_file(Path::new("/usr/share/backgrounds/pic.png")),
            "[org/cinnamon/desktop/background]\n\
             picture-uri='file:///usr/share/backgrounds/pic.png'\n\
             picture-options='zoom'\n"
        );
    }

    #[test]
    fn test_render_escapes_quotes() {
        let settings = Settings::default();
        let writer = ConfigWriter::new(&settings);
        let rendered = writer.render_default_file(Path::new("/usr/share/backgrounds/it's.png"));
        assert!(rendered.contains(r"picture-uri='file:///usr/share/backgrounds/it\'s.png'"));
    }

    #[test]
    fn test_render_keeps_control_characters_on_one_line() {
        let settings = Settings::default();
        let writer = ConfigWriter::new(&settings);
        let rendered = writer
            .render_default_file(Path::new("/usr/share/backgrounds/a\n[x]\nb=c\t\u{1b}.png"));
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered
            .contains(r"picture-uri='file:///usr/share/backgrounds/a\n[x]\nb=c\t\u001b.png'"));
    }

    #[test]
    fn test_render_lock_file() {
        let settings = Settings::default();
        let writer = ConfigWriter::new(&settings);
        assert_eq!(
            writer.render_lock_file(),
            "/org/cinnamon/desktop/background/picture-uri\n\
             /org/cinnamon/desktop/background/picture-options\n"
        );
    }

    #[test]
    fn test_write_and_remove() {
        let root = unique_root();
        let settings = Settings::under(&root);
        let writer = ConfigWriter::new(&settings);

        writer.ensure_directories().unwrap();
        // Idempotent
        writer.ensure_directories().unwrap();

        writer.write_profile().unwrap();
        writer.write_lock_file().unwrap();
        writer
            .write_default_file(Path::new("/usr/share/backgrounds/a.png"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(&settings.paths.profile).unwrap(),
            "user-db:user\nsystem-db:local\n"
        );
        assert!(settings.paths.lock_file().is_file());
        assert!(settings.paths.default_file.is_file());

        assert_eq!(writer.remove_overrides().unwrap(), 2);
        assert_eq!(writer.remove_overrides().unwrap(), 0);
        assert!(settings.paths.profile.is_file());

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let root = unique_root();
        let settings = Settings::under(&root);
        let writer = ConfigWriter::new(&settings);
        writer.ensure_directories().unwrap();

        fs::write(&settings.paths.profile, "stale content that is much longer\n").unwrap();
        writer.write_profile().unwrap();
        assert_eq!(
            fs::read_to_string(&settings.paths.profile).unwrap(),
            PROFILE_CONTENT
        );

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_remove_counts_single_file() {
        let root = unique_root();
        let settings = Settings::under(&root);
        let writer = ConfigWriter::new(&settings);
        writer.ensure_directories().unwrap();
        writer.write_lock_file().unwrap();

        assert_eq!(writer.remove_overrides().unwrap(), 1);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let root = unique_root();
        let settings = Settings::under(&root);
        let writer = ConfigWriter::new(&settings);

        let err = writer.write_profile().unwrap_err();
        match err {
            LockError::Filesystem { action, path, .. } => {
                assert_eq!(action, "write");
                assert_eq!(path, settings.paths.profile);
            }
            other => panic!("unexpected error: {other}"),
        }

        fs::remove_dir_all(&root).unwrap();
    }
}
