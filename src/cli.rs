//! CLI argument parsing for the study build.
//!
//! Three paths are the whole configuration surface; everything else about the
//! study (methods, conditions, folder naming) is fixed in `study`.
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_SOURCE: &str = "../final";
pub const DEFAULT_OUT_VIDEOS_DIR: &str = "user-study/force_user_study/videos";
pub const DEFAULT_OUT_MANIFEST: &str = "user-study/force_user_study/manifest.json";

/// Build force user study videos and manifest from source folders.
#[derive(Parser, Debug)]
#[command(
    name = "study-build",
    version,
    about = "Build force_user_study videos and manifest",
    after_help = "Examples:\n  study-build\n  study-build --source /data/final --out_videos_dir site/videos --out_manifest site/manifest.json"
)]
pub struct BuildArgs {
    /// Source root containing method folders
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SOURCE)]
    pub source: PathBuf,

    /// Output videos directory inside repo
    #[arg(long = "out_videos_dir", value_name = "DIR", default_value = DEFAULT_OUT_VIDEOS_DIR)]
    pub out_videos_dir: PathBuf,

    /// Output manifest JSON path
    #[arg(long = "out_manifest", value_name = "PATH", default_value = DEFAULT_OUT_MANIFEST)]
    pub out_manifest: PathBuf,
}
