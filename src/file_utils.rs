use std::{
    env, fs, io,
    path::{Component, Path, PathBuf},
};

/// Expands a leading `~` in a user-supplied directory argument.
pub fn expand_path(input: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(input).to_string())
}

/// Resolves `path` to the absolute form watches are keyed by.
///
/// Existing paths are canonicalized so symlinks and relative spellings of
/// the same directory collide. Paths that no longer exist are normalized
/// lexically against the current directory.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        return fs::canonicalize(path);
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
