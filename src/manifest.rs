//! Study manifest document.
//!
//! The manifest is the only index the study page reads: it lists, per
//! condition, the methods compared and the fully reconciled cases with one
//! video per method. Video paths are relative to the manifest's directory.
use crate::study::{Condition, Method};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    /// Keyed in canonical condition order.
    pub conditions: BTreeMap<Condition, ConditionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub methods: Vec<Method>,
    pub cases: Vec<CaseEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEntry {
    /// Video filename shared by every method.
    pub id: String,
    pub videos: BTreeMap<Method, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            conditions: BTreeMap::new(),
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize the manifest as two-space indented JSON with a trailing newline.
pub fn render_manifest(manifest: &Manifest) -> Result<String> {
    let mut json = serde_json::to_string_pretty(manifest).context("serialize manifest")?;
    json.push('\n');
    Ok(json)
}

/// Write the manifest atomically, creating its directory if needed.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("manifest path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let json = render_manifest(manifest)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("manifest.json");
    let tmp_path = parent.join(format!(".{file_name}.tmp"));
    fs::write(&tmp_path, json).with_context(|| format!("write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Load a manifest and check its version.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let raw: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;
    if !raw.get("conditions").is_some_and(serde_json::Value::is_object) {
        bail!("manifest {} is missing 'conditions'", path.display());
    }
    let manifest: Manifest =
        serde_json::from_value(raw).with_context(|| format!("parse {}", path.display()))?;
    if manifest.version != MANIFEST_VERSION {
        bail!(
            "unsupported manifest version {} in {}",
            manifest.version,
            path.display()
        );
    }
    Ok(manifest)
}

/// Check that every case has one existing video per listed method.
///
/// Returns a description of each problem found; an empty list means the
/// manifest is consistent with the files under `manifest_dir`.
pub fn verify_manifest(manifest: &Manifest, manifest_dir: &Path) -> Vec<String> {
    let mut problems = Vec::new();
    for (condition, entry) in &manifest.conditions {
        for case in &entry.cases {
            for method in &entry.methods {
                match case.videos.get(method) {
                    None => problems.push(format!(
                        "{condition}/{}: no video for {method}",
                        case.id
                    )),
                    Some(rel) if !manifest_dir.join(rel).is_file() => problems.push(format!(
                        "{condition}/{}: {method} video not found at {rel}",
                        case.id
                    )),
                    Some(_) => {}
                }
            }
            if case.videos.len() != entry.methods.len() {
                problems.push(format!(
                    "{condition}/{}: expected {} videos, found {}",
                    case.id,
                    entry.methods.len(),
                    case.videos.len()
                ));
            }
        }
    }
    problems
}
