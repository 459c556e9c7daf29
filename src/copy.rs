use anyhow::{Context, Result};
use std::fs::{self, File, FileTimes};
use std::path::Path;

/// Copy `source` to `dest`, keeping permissions and access/modification
/// times. Missing parent directories are created and an existing `dest` is
/// replaced.
pub fn copy_preserving(source: &Path, dest: &Path) -> Result<()> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("video");
    let tmp_path = parent.join(format!(".{file_name}.tmp"));

    // A leftover from an interrupted run may be read-only.
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)
            .with_context(|| format!("remove stale {}", tmp_path.display()))?;
    }
    let result = publish_via(source, &tmp_path, dest);
    if result.is_err() && tmp_path.exists() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn publish_via(source: &Path, tmp_path: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, tmp_path)
        .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
    copy_times(source, tmp_path)?;
    fs::rename(tmp_path, dest).with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

fn copy_times(source: &Path, dest: &Path) -> Result<()> {
    let metadata = fs::metadata(source).with_context(|| format!("stat {}", source.display()))?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    // Read-only sources produce a read-only copy; timestamps can still be set
    // through a read handle on unix.
    File::options()
        .write(true)
        .open(dest)
        .or_else(|_| File::open(dest))
        .and_then(|file| file.set_times(times))
        .with_context(|| format!("set times on {}", dest.display()))?;
    Ok(())
}
