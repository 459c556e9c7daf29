//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Method folders that make up a complete study source tree.
pub const WIND_METHODS: [&str; 3] = ["force_prompting", "text_inference", "ours_autoregressive"];
pub const POINT_METHODS: [&str; 4] = [
    "force_prompting",
    "text_inference",
    "ours_autoregressive",
    "kling_motion_brush",
];

/// Temporary workspace holding a source tree and the build outputs.
pub struct StudyFixture {
    pub temp_dir: TempDir,
}

impl Default for StudyFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        std::fs::create_dir_all(temp_dir.path().join("final")).expect("create source root");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("final")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root().join("user-study/force_user_study/videos")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("user-study/force_user_study/manifest.json")
    }

    /// Write `case` into the source folder `folder`, creating it if needed.
    pub fn add_video(&self, folder: &str, case: &str) {
        self.add_file(folder, case, format!("{folder}/{case}").as_bytes());
    }

    pub fn add_file(&self, folder: &str, name: &str, contents: &[u8]) {
        let dir = self.source().join(folder);
        std::fs::create_dir_all(&dir).expect("create source folder");
        std::fs::write(dir.join(name), contents).expect("write source file");
    }

    /// Run the binary from the fixture root with default output paths.
    pub fn run(&self) -> Output {
        Command::new(env!("CARGO_BIN_EXE_study-build"))
            .current_dir(self.root())
            .args(["--source", "final"])
            .env_remove("RUST_LOG")
            .output()
            .expect("run study-build")
    }

    pub fn manifest_json(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.manifest_path()).expect("read manifest");
        serde_json::from_str(&content).expect("parse manifest")
    }
}

/// Case ids listed for `condition`, in manifest order.
pub fn case_ids(manifest: &serde_json::Value, condition: &str) -> Vec<String> {
    manifest["conditions"][condition]["cases"]
        .as_array()
        .map(|cases| {
            cases
                .iter()
                .filter_map(|case| case["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
