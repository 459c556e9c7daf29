use anyhow::{Context, Result};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and drop `.`/`..`
/// components lexically. Symlinks are not resolved.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("resolve current directory")?
            .join(path)
    };
    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                let at_normal = matches!(last, Some(Component::Normal(_)));
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                if at_normal {
                    out.pop();
                } else if !at_root {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Render `path` relative to `base` with `/` separators.
///
/// Both paths are expected to be absolute and normalized. Paths outside
/// `base` are expressed with leading `..` components.
pub fn relative_slash_path(path: &Path, base: &Path) -> String {
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(left, right)| left == right)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); base_parts.len() - common];
    parts.extend(
        path_parts[common..]
            .iter()
            .map(|part| part.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}
