use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::pattern::FramePattern;

/// Splits a pattern-bearing path like `out/DRC/frame_#######.drc` into the
/// directory and the filename pattern.
pub fn split_pattern_path(path: &Path) -> Result<(PathBuf, FramePattern)> {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .with_context(|| format!("pattern path {:?} has no file name", path))?;
    let pattern = FramePattern::parse(&name)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, pattern))
}

pub fn unix_path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
