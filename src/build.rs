//! Study build pipeline.
//!
//! Classify source folders, reconcile each condition, copy the valid cases
//! into the videos tree, then write and verify the manifest. Only a missing
//! source root is rejected up front; every other irregularity shrinks the
//! output and is reported in the returned summary.
use crate::classify::{scan_source_root, SourceLayout};
use crate::cli::BuildArgs;
use crate::copy::copy_preserving;
use crate::manifest::{
    read_manifest, verify_manifest, write_manifest, CaseEntry, ConditionEntry, Manifest,
};
use crate::paths::{absolutize, relative_slash_path};
use crate::reconcile::{reconcile_condition, Reconciliation};
use crate::study::{Condition, Method};
use anyhow::{anyhow, bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved output locations for one build.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub source_root: PathBuf,
    pub videos_dir: PathBuf,
    pub manifest_path: PathBuf,
}

impl BuildPaths {
    pub fn resolve(args: &BuildArgs) -> Result<Self> {
        Ok(Self {
            source_root: absolutize(&args.source)?,
            videos_dir: absolutize(&args.out_videos_dir)?,
            manifest_path: absolutize(&args.out_manifest)?,
        })
    }

    fn manifest_dir(&self) -> Result<&Path> {
        self.manifest_path
            .parent()
            .ok_or_else(|| anyhow!("manifest path has no parent: {}", self.manifest_path.display()))
    }
}

/// Counters and lists reported after a build.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub cases: BTreeMap<Condition, usize>,
    /// Only conditions with at least one missing method folder.
    pub missing_method_folders: BTreeMap<Condition, Vec<Method>>,
    pub skipped_missing: BTreeMap<Condition, usize>,
    pub skipped_non_mp4: usize,
    /// `.mp4` files left out because their names are not valid UTF-8.
    pub skipped_non_utf8: usize,
    pub unknown_folders: Vec<String>,
}

/// Run the full build and return the manifest alongside its summary.
pub fn run_build(paths: &BuildPaths) -> Result<(Manifest, BuildSummary)> {
    let layout = scan_source_root(&paths.source_root)?;
    let manifest_dir = paths.manifest_dir()?;

    let mut manifest = Manifest::new();
    let mut summary = BuildSummary {
        unknown_folders: layout.unknown.clone(),
        ..BuildSummary::default()
    };

    for condition in Condition::ALL {
        let reconciliation = reconcile_condition(&layout, condition)?;
        let entry = copy_condition(&layout, &reconciliation, paths, manifest_dir)?;
        record_condition(&mut summary, reconciliation);
        manifest.conditions.insert(condition, entry);
    }

    fs::create_dir_all(&paths.videos_dir)
        .with_context(|| format!("create {}", paths.videos_dir.display()))?;
    write_manifest(&paths.manifest_path, &manifest)?;

    let written = read_manifest(&paths.manifest_path)?;
    let problems = verify_manifest(&written, manifest_dir);
    if !problems.is_empty() {
        for problem in &problems {
            tracing::error!(%problem, "manifest verification failed");
        }
        bail!(
            "manifest {} references {} missing video(s)",
            paths.manifest_path.display(),
            problems.len()
        );
    }
    Ok((manifest, summary))
}

fn copy_condition(
    layout: &SourceLayout,
    reconciliation: &Reconciliation,
    paths: &BuildPaths,
    manifest_dir: &Path,
) -> Result<ConditionEntry> {
    let condition = reconciliation.condition;
    let methods = condition.required_methods();
    let mut cases = Vec::with_capacity(reconciliation.valid_cases.len());

    for case_id in &reconciliation.valid_cases {
        let mut videos = BTreeMap::new();
        for &method in methods {
            let folder = layout.folder(condition, method).ok_or_else(|| {
                anyhow!("no {method} folder for {condition} case {case_id}")
            })?;
            let source = folder.join(case_id);
            let dest = paths
                .videos_dir
                .join(condition.as_str())
                .join(method.as_str())
                .join(case_id);
            copy_preserving(&source, &dest)?;
            tracing::debug!(
                source = %source.display(),
                dest = %dest.display(),
                "copied video"
            );
            videos.insert(method, relative_slash_path(&dest, manifest_dir));
        }
        cases.push(CaseEntry {
            id: case_id.clone(),
            videos,
        });
    }

    Ok(ConditionEntry {
        methods: methods.to_vec(),
        cases,
    })
}

fn record_condition(summary: &mut BuildSummary, reconciliation: Reconciliation) {
    let condition = reconciliation.condition;
    summary
        .cases
        .insert(condition, reconciliation.valid_cases.len());
    summary
        .skipped_missing
        .insert(condition, reconciliation.skipped_missing);
    summary.skipped_non_mp4 += reconciliation.skipped_non_mp4;
    summary.skipped_non_utf8 += reconciliation.skipped_non_utf8;
    if !reconciliation.missing_methods.is_empty() {
        summary
            .missing_method_folders
            .insert(condition, reconciliation.missing_methods);
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
