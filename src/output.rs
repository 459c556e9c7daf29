//! Human-readable build summary.
use crate::build::{BuildPaths, BuildSummary};
use crate::study::{Condition, Method};

/// Render the summary printed after a successful build.
pub fn render_summary(paths: &BuildPaths, summary: &BuildSummary) -> String {
    let mut out = String::new();
    push_line(&mut out, "Build summary");
    push_line(
        &mut out,
        &format!("Source root: {}", paths.source_root.display()),
    );
    push_line(
        &mut out,
        &format!("Output videos dir: {}", paths.videos_dir.display()),
    );
    push_line(
        &mut out,
        &format!("Output manifest: {}", paths.manifest_path.display()),
    );

    push_line(&mut out, "\nCases per condition:");
    for condition in Condition::ALL {
        let count = summary.cases.get(&condition).copied().unwrap_or(0);
        push_line(&mut out, &format!("- {condition}: {count}"));
    }

    push_line(&mut out, "\nMissing method folders:");
    if summary.missing_method_folders.is_empty() {
        push_line(&mut out, "- None");
    } else {
        for (condition, methods) in &summary.missing_method_folders {
            push_line(
                &mut out,
                &format!("- {condition}: {}", join_methods(methods)),
            );
        }
    }

    push_line(
        &mut out,
        "\nSkipped cases due to missing videos across required methods:",
    );
    for condition in Condition::ALL {
        let count = summary.skipped_missing.get(&condition).copied().unwrap_or(0);
        push_line(&mut out, &format!("- {condition}: {count}"));
    }

    push_line(
        &mut out,
        &format!("\nSkipped non-mp4 files: {}", summary.skipped_non_mp4),
    );
    if summary.skipped_non_utf8 > 0 {
        push_line(
            &mut out,
            &format!(
                "Skipped videos with non-UTF-8 names: {}",
                summary.skipped_non_utf8
            ),
        );
    }

    if !summary.unknown_folders.is_empty() {
        push_line(
            &mut out,
            "\nIgnored source folders that did not match naming rules:",
        );
        for name in &summary.unknown_folders {
            push_line(&mut out, &format!("- {name}"));
        }
    }
    out
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(|method| method.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
