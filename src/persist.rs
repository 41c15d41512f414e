use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Window;

/// Load the previously persisted window. Any failure (missing file, stale or
/// corrupt JSON) means starting fresh, never aborting the run.
pub fn load_window(path: &Path) -> Option<Window> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<Window>(&raw).ok()
}

/// Write the window compactly via a temp file + rename so an interrupted run
/// never leaves a half-written document for the display client.
pub fn save_window(path: &Path, window: &Window) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("create output dir {}", dir.display()))?;
    }
    let json = serde_json::to_string(window).context("serialize window")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename into {}", path.display()))?;
    Ok(())
}
