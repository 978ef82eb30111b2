//! Path helpers for user-supplied locations.

use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Replace a leading `~` with the user's home directory.
///
/// `~user` forms are left alone, as is everything when no home directory
/// can be determined.
pub fn expand_user(path: &str) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return PathBuf::from(path),
    };

    if path == "~" {
        return home;
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Make `path` absolute against the current directory and drop `.` and
/// `..` components lexically. Symlinks are not resolved, so `link/..` maps
/// to the directory holding `link`.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            // `pop` is a no-op at the root, so `/..` stays `/`.
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
