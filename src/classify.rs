//! Source folder classification.
//!
//! Each top-level folder under the source root is named after the method that
//! produced it and the condition it was rendered for, e.g.
//! `force_prompting_wind_002` or `kling_motion_brush_point_change_010`.
use crate::study::{Condition, Method, METHOD_PREFIXES};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a folder name into its `(method, condition)` pair.
///
/// Returns `None` when no method prefix matches or the name carries neither a
/// `_wind_` nor a `_point_` token.
pub fn parse_folder_name(name: &str) -> Option<(Method, Condition)> {
    let method = METHOD_PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|(_, method)| *method)?;

    let base = if name.contains("_wind_") {
        Condition::Wind
    } else if name.contains("_point_") {
        Condition::Point
    } else {
        return None;
    };

    Some((method, base.with_change(name.contains("_change"))))
}

/// Method folders discovered under the source root, keyed by condition.
#[derive(Debug, Default)]
pub struct SourceLayout {
    pub folders: BTreeMap<Condition, BTreeMap<Method, PathBuf>>,
    /// Folder names that did not match the naming rules, in sorted order.
    pub unknown: Vec<String>,
}

impl SourceLayout {
    pub fn folder(&self, condition: Condition, method: Method) -> Option<&Path> {
        self.folders
            .get(&condition)
            .and_then(|methods| methods.get(&method))
            .map(PathBuf::as_path)
    }
}

/// Classify every immediate subdirectory of `source_root`.
///
/// A missing or non-directory source root is the one fatal input error.
pub fn scan_source_root(source_root: &Path) -> Result<SourceLayout> {
    if !source_root.is_dir() {
        bail!("Source directory not found: {}", source_root.display());
    }

    let mut children = Vec::new();
    for entry in
        fs::read_dir(source_root).with_context(|| format!("read {}", source_root.display()))?
    {
        let entry = entry.with_context(|| format!("read {}", source_root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            children.push(path);
        }
    }
    children.sort();

    let mut layout = SourceLayout::default();
    for child in children {
        let name = child
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some((method, condition)) = parse_folder_name(&name) else {
            tracing::warn!(folder = %name, "ignoring unrecognized source folder");
            layout.unknown.push(name);
            continue;
        };
        tracing::debug!(folder = %name, %method, %condition, "classified source folder");
        let previous = layout
            .folders
            .entry(condition)
            .or_default()
            .insert(method, child);
        if let Some(previous) = previous {
            tracing::warn!(
                %method,
                %condition,
                replaced = %previous.display(),
                "multiple source folders for the same method and condition; using the last"
            );
        }
    }
    Ok(layout)
}
