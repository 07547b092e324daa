use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reconcile::Reconciliation;

/// Persisted description of an encoded asset, consumed by the player.
/// Constructed once after every validation passes, then never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    #[serde(rename = "DRCURLPattern")]
    pub drc_url_pattern: String,
    #[serde(rename = "KTX2URLPattern")]
    pub ktx2_url_pattern: String,
    #[serde(rename = "BatchSize")]
    pub batch_size: u32,
    #[serde(rename = "GeometryFrameCount")]
    pub geometry_frame_count: u64,
    #[serde(rename = "TextureSegmentCount")]
    pub texture_segment_count: u64,
    #[serde(rename = "GeometryFrameRate")]
    pub geometry_frame_rate: u32,
    #[serde(rename = "TextureFrameRate")]
    pub texture_frame_rate: u32,
    #[serde(rename = "AudioURL", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Error)]
#[error("{} is not under the output root {}", .path.display(), .root.display())]
pub struct OutsideOutputRoot {
    pub root: PathBuf,
    pub path: PathBuf,
}

/// The manifest and the codec directories move together as a unit, so codec
/// patterns are stored relative to the output root.
pub fn relativize(root: &Path, path: &Path) -> Result<String, OutsideOutputRoot> {
    let rel = path.strip_prefix(root).map_err(|_| OutsideOutputRoot {
        root: root.to_path_buf(),
        path: path.to_path_buf(),
    })?;
    Ok(rel.to_string_lossy().replace('\\', "/"))
}

/// Pure construction; persistence is the caller's last step.
pub fn build(
    output_root: &Path,
    drc_pattern_path: &Path,
    ktx2_pattern_path: &Path,
    batch_size: u32,
    reconciliation: &Reconciliation,
    geometry_frame_rate: u32,
    texture_frame_rate: u32,
    audio_url: Option<String>,
) -> Result<ManifestRecord, OutsideOutputRoot> {
    Ok(ManifestRecord {
        drc_url_pattern: relativize(output_root, drc_pattern_path)?,
        ktx2_url_pattern: relativize(output_root, ktx2_pattern_path)?,
        batch_size,
        geometry_frame_count: reconciliation.geometry_frames,
        texture_segment_count: reconciliation.texture_segments,
        geometry_frame_rate,
        texture_frame_rate,
        audio_url,
    })
}
