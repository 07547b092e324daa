use clap::ValueEnum;
use thiserror::Error;

use crate::count::TextureCount;

/// What to do when stream or audio durations disagree. Replaces the
/// interactive "ignore and proceed?" prompt with a pre-supplied decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum MismatchPolicy {
    Abort,
    Proceed,
}

/// Validated agreement between the geometry and texture streams.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub geometry_frames: u64,
    pub texture_frames: u64,
    pub texture_segments: u64,
    pub geometry_duration_secs: f64,
    pub texture_duration_secs: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error(
    "stream durations disagree: geometry {} frames at {} fps = {:.3}s, texture {} frames at {} fps = {:.3}s",
    .reconciliation.geometry_frames,
    .geometry_rate,
    .reconciliation.geometry_duration_secs,
    .reconciliation.texture_frames,
    .texture_rate,
    .reconciliation.texture_duration_secs
)]
pub struct RateMismatch {
    pub geometry_rate: u32,
    pub texture_rate: u32,
    pub reconciliation: Reconciliation,
}

impl RateMismatch {
    /// Explicit override: accept the computed result despite the mismatch.
    pub fn into_reconciliation(self) -> Reconciliation {
        self.reconciliation
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error(
    "audio duration {:.3}s disagrees with the reconciled streams (geometry {:.3}s, texture {:.3}s)",
    .audio_secs,
    .geometry_secs,
    .texture_secs
)]
pub struct AudioMismatch {
    pub audio_secs: f64,
    pub geometry_secs: f64,
    pub texture_secs: f64,
}

/// Proves both frame streams describe the same wall-clock duration. The
/// float durations are reporting-only; the authoritative test is the
/// cross-multiplied integer comparison, exact for integer counts and rates.
pub fn reconcile(
    geometry_frames: u64,
    geometry_rate: u32,
    texture: TextureCount,
    texture_rate: u32,
) -> Result<Reconciliation, RateMismatch> {
    let reconciliation = Reconciliation {
        geometry_frames,
        texture_frames: texture.frames,
        texture_segments: texture.segments,
        geometry_duration_secs: geometry_frames as f64 / geometry_rate as f64,
        texture_duration_secs: texture.frames as f64 / texture_rate as f64,
    };

    if geometry_frames * texture_rate as u64 == texture.frames * geometry_rate as u64 {
        Ok(reconciliation)
    } else {
        Err(RateMismatch {
            geometry_rate,
            texture_rate,
            reconciliation,
        })
    }
}

/// Frame-to-frame correspondence is unambiguous only when one rate is an
/// integer multiple of the other.
pub fn rates_divide_evenly(geometry_rate: u32, texture_rate: u32) -> bool {
    geometry_rate % texture_rate == 0 || texture_rate % geometry_rate == 0
}

/// Both reconciled durations must equal the probed audio duration. Equality
/// is exact: the durations derive from integer frame counts over integer
/// rates, so a consistently-authored asset matches bit-for-bit.
pub fn reconcile_audio(audio_secs: f64, reconciliation: &Reconciliation) -> Result<(), AudioMismatch> {
    if audio_secs == reconciliation.geometry_duration_secs
        && audio_secs == reconciliation.texture_duration_secs
    {
        Ok(())
    } else {
        Err(AudioMismatch {
            audio_secs,
            geometry_secs: reconciliation.geometry_duration_secs,
            texture_secs: reconciliation.texture_duration_secs,
        })
    }
}
