//! Case reconciliation across the methods of one condition.
//!
//! A case is a video filename; it is valid for a condition only when every
//! required method folder contains a file with that exact name.
use crate::classify::SourceLayout;
use crate::study::{Condition, Method};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// `.mp4` filenames found in one method folder.
///
/// Videos whose names are not valid UTF-8 cannot be recorded in the manifest
/// and are counted separately instead of becoming cases.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CaseListing {
    pub cases: BTreeSet<String>,
    /// Regular files that were not `.mp4` videos.
    pub skipped_non_mp4: usize,
    pub skipped_non_utf8: usize,
}

/// List the `.mp4` files directly inside `folder`.
///
/// A folder that does not exist (or is not a directory) yields an empty
/// listing. Subdirectories are not descended into.
pub fn list_mp4_files(folder: &Path) -> Result<CaseListing> {
    let mut listing = CaseListing::default();
    if !folder.is_dir() {
        return Ok(listing);
    }

    for entry in fs::read_dir(folder).with_context(|| format!("read {}", folder.display()))? {
        let entry = entry.with_context(|| format!("read {}", folder.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !is_mp4(&path) {
            listing.skipped_non_mp4 += 1;
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                listing.cases.insert(name);
            }
            Err(raw) => {
                tracing::warn!(
                    folder = %folder.display(),
                    name = %raw.to_string_lossy(),
                    "skipping video with a non-UTF-8 name"
                );
                listing.skipped_non_utf8 += 1;
            }
        }
    }
    Ok(listing)
}

fn is_mp4(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
}

/// Outcome of reconciling one condition.
#[derive(Debug)]
pub struct Reconciliation {
    pub condition: Condition,
    /// Required methods with no source folder, in required order.
    pub missing_methods: Vec<Method>,
    /// Cases present for every required method, sorted by filename.
    pub valid_cases: Vec<String>,
    /// Cases present for some but not all required methods.
    pub skipped_missing: usize,
    pub skipped_non_mp4: usize,
    pub skipped_non_utf8: usize,
}

/// Compute the valid case set for `condition` from per-method listings.
///
/// Methods absent from `listings` count as empty. `missing_methods` names the
/// required methods that had no source folder at all.
pub fn reconcile_listings(
    condition: Condition,
    listings: &BTreeMap<Method, CaseListing>,
    missing_methods: Vec<Method>,
) -> Reconciliation {
    let required = condition.required_methods();
    let empty = BTreeSet::new();
    let sets: Vec<&BTreeSet<String>> = required
        .iter()
        .map(|method| listings.get(method).map_or(&empty, |listing| &listing.cases))
        .collect();

    let union: BTreeSet<&String> = sets.iter().flat_map(|set| set.iter()).collect();

    // Any empty method collapses the condition.
    let valid_cases: Vec<String> = if sets.iter().any(|set| set.is_empty()) {
        Vec::new()
    } else {
        union
            .iter()
            .filter(|case| sets.iter().all(|set| set.contains(case.as_str())))
            .map(|case| (*case).clone())
            .collect()
    };

    Reconciliation {
        condition,
        missing_methods,
        skipped_missing: union.len() - valid_cases.len(),
        valid_cases,
        skipped_non_mp4: listings.values().map(|listing| listing.skipped_non_mp4).sum(),
        skipped_non_utf8: listings.values().map(|listing| listing.skipped_non_utf8).sum(),
    }
}

/// List and reconcile every required method folder of `condition`.
pub fn reconcile_condition(layout: &SourceLayout, condition: Condition) -> Result<Reconciliation> {
    let mut listings = BTreeMap::new();
    let mut missing_methods = Vec::new();
    for &method in condition.required_methods() {
        match layout.folder(condition, method) {
            Some(folder) => {
                listings.insert(method, list_mp4_files(folder)?);
            }
            None => missing_methods.push(method),
        }
    }

    let reconciliation = reconcile_listings(condition, &listings, missing_methods);
    tracing::info!(
        %condition,
        valid = reconciliation.valid_cases.len(),
        skipped_missing = reconciliation.skipped_missing,
        missing_methods = reconciliation.missing_methods.len(),
        "reconciled condition"
    );
    Ok(reconciliation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn listing(cases: &[&str]) -> CaseListing {
        CaseListing {
            cases: names(cases).into_iter().collect(),
            skipped_non_mp4: 0,
            skipped_non_utf8: 0,
        }
    }

    #[test]
    fn valid_cases_are_the_intersection() {
        let listings = BTreeMap::from([
            (Method::ForcePrompting, listing(&["a.mp4", "b.mp4"])),
            (Method::TextInference, listing(&["b.mp4", "c.mp4"])),
            (Method::OursAutoregressive, listing(&["b.mp4", "a.mp4", "c.mp4"])),
        ]);
        let result = reconcile_listings(Condition::Wind, &listings, Vec::new());
        assert_eq!(result.valid_cases, names(&["b.mp4"]));
        assert_eq!(result.skipped_missing, 2);
    }

    #[test]
    fn valid_cases_are_sorted() {
        let cases = ["c.mp4", "a.mp4", "b.mp4"];
        let listings = BTreeMap::from([
            (Method::ForcePrompting, listing(&cases)),
            (Method::TextInference, listing(&cases)),
            (Method::OursAutoregressive, listing(&cases)),
        ]);
        let result = reconcile_listings(Condition::WindChange, &listings, Vec::new());
        assert_eq!(result.valid_cases, names(&["a.mp4", "b.mp4", "c.mp4"]));
        assert_eq!(result.skipped_missing, 0);
    }

    #[test]
    fn missing_method_collapses_condition() {
        let listings = BTreeMap::from([
            (Method::ForcePrompting, listing(&["a.mp4"])),
            (Method::TextInference, listing(&["a.mp4"])),
            (Method::OursAutoregressive, listing(&["a.mp4"])),
        ]);
        let result =
            reconcile_listings(Condition::Point, &listings, vec![Method::KlingMotionBrush]);
        assert!(result.valid_cases.is_empty());
        assert_eq!(result.skipped_missing, 1);
        assert_eq!(result.missing_methods, vec![Method::KlingMotionBrush]);
    }

    #[test]
    fn listing_counts_non_mp4_files() {
        let dir = tempfile::tempdir().expect("create temp dir");
        for name in ["a.mp4", "B.MP4", "notes.txt", "thumb.png"] {
            fs::write(dir.path().join(name), b"x").expect("write file");
        }
        fs::create_dir(dir.path().join("nested.mp4")).expect("create dir");

        let listing = list_mp4_files(dir.path()).expect("list");
        assert_eq!(
            listing.cases.into_iter().collect::<Vec<_>>(),
            names(&["B.MP4", "a.mp4"])
        );
        assert_eq!(listing.skipped_non_mp4, 2);
    }

    #[cfg(unix)]
    #[test]
    fn listing_skips_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().expect("create temp dir");
        let raw = std::ffi::OsStr::from_bytes(b"bad\xff.mp4");
        fs::write(dir.path().join(raw), b"x").expect("write file");
        fs::write(dir.path().join("ok.mp4"), b"x").expect("write file");

        let listing = list_mp4_files(dir.path()).expect("list");
        assert_eq!(listing.cases.into_iter().collect::<Vec<_>>(), names(&["ok.mp4"]));
        assert_eq!(listing.skipped_non_utf8, 1);
        assert_eq!(listing.skipped_non_mp4, 0);
    }

    #[test]
    fn listing_missing_folder_is_empty() {
        let listing = list_mp4_files(&PathBuf::from("/nonexistent/study/folder")).expect("list");
        assert_eq!(listing, CaseListing::default());
    }

    fn layout_with(root: &Path, condition: Condition, files: &[(Method, &[&str])]) -> SourceLayout {
        let mut layout = SourceLayout::default();
        for (method, names) in files {
            let folder = root.join(method.as_str());
            fs::create_dir(&folder).expect("create folder");
            for name in *names {
                fs::write(folder.join(name), b"x").expect("write file");
            }
            layout
                .folders
                .entry(condition)
                .or_default()
                .insert(*method, folder);
        }
        layout
    }

    #[test]
    fn reconcile_condition_reports_missing_folders() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let layout = layout_with(
            dir.path(),
            Condition::Wind,
            &[
                (Method::ForcePrompting, &["a.mp4", "a.json"]),
                (Method::OursAutoregressive, &["a.mp4", "a.json"]),
            ],
        );

        let result = reconcile_condition(&layout, Condition::Wind).expect("reconcile");
        assert_eq!(result.missing_methods, vec![Method::TextInference]);
        assert!(result.valid_cases.is_empty());
        assert_eq!(result.skipped_missing, 1);
        assert_eq!(result.skipped_non_mp4, 2);
    }

    #[test]
    fn folder_without_videos_collapses_but_is_not_missing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let layout = layout_with(
            dir.path(),
            Condition::Wind,
            &[
                (Method::ForcePrompting, &["a.mp4", "b.mp4"]),
                (Method::TextInference, &["a.mp4", "b.mp4"]),
                (Method::OursAutoregressive, &["readme.txt"]),
            ],
        );

        let result = reconcile_condition(&layout, Condition::Wind).expect("reconcile");
        assert!(result.missing_methods.is_empty());
        assert!(result.valid_cases.is_empty());
        assert_eq!(result.skipped_missing, 2);
        assert_eq!(result.skipped_non_mp4, 1);
    }
}
