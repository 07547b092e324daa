use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::codecs;
use crate::config::ProjectConfig;
use crate::count;
use crate::manifest;
use crate::pattern::FramePattern;
use crate::reconcile::{self, MismatchPolicy};
use crate::util;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub on_mismatch: MismatchPolicy,
    /// Run the draco/basisu steps for sources that are not compressed yet.
    pub run_codecs: bool,
    pub write_manifest: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub asset_name: String,
    pub geometry_frames: u64,
    pub texture_frames: u64,
    pub texture_segments: u64,
    pub geometry_duration_secs: f64,
    pub texture_duration_secs: f64,
    pub audio_duration_secs: Option<f64>,
    pub manifest_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Runs the asset pipeline strictly in order: compress what is missing,
/// count both streams, reconcile them, cross-check audio, then build and
/// persist the manifest. The manifest write is the very last step, so a
/// failed or non-overridden stage never leaves a partial manifest behind.
pub fn run(config: &ProjectConfig, opts: PipelineOptions) -> Result<PipelineSummary> {
    let mut warnings: Vec<String> = vec![];

    if opts.run_codecs || opts.write_manifest {
        std::fs::create_dir_all(&config.output_directory)
            .with_context(|| format!("creating output directory {:?}", config.output_directory))?;
    }
    let output_root = config
        .output_directory
        .canonicalize()
        .with_context(|| format!("resolving output directory {:?}", config.output_directory))?;

    let (drc_dir, drc_pattern) = geometry_stream(config, &output_root, opts)?;
    let drc_dir = drc_dir
        .canonicalize()
        .with_context(|| format!("resolving geometry directory {:?}", drc_dir))?;

    let (ktx2_dir, ktx2_pattern) = texture_stream(config, &output_root, opts)?;
    let ktx2_dir = ktx2_dir
        .canonicalize()
        .with_context(|| format!("resolving texture directory {:?}", ktx2_dir))?;

    let geometry_frames = count::count_geometry_frames(&drc_dir, &drc_pattern)?;
    let texture = count::count_texture_frames(&ktx2_dir, &ktx2_pattern, config.ktx2_batch_size)?;
    eprintln!(
        "Counted streams: geometry={} frames, texture={} frames across {} segments",
        geometry_frames, texture.frames, texture.segments
    );

    if !reconcile::rates_divide_evenly(config.geometry_frame_rate, config.texture_frame_rate) {
        let warning = format!(
            "frame rates {} and {} are not integer multiples of one another; frame correspondence is ambiguous at playback",
            config.geometry_frame_rate, config.texture_frame_rate
        );
        eprintln!("warning: {warning}");
        warnings.push(warning);
    }

    let reconciliation = match reconcile::reconcile(
        geometry_frames,
        config.geometry_frame_rate,
        texture,
        config.texture_frame_rate,
    ) {
        Ok(reconciliation) => reconciliation,
        Err(mismatch) => match opts.on_mismatch {
            MismatchPolicy::Abort => {
                return Err(anyhow::Error::new(mismatch)
                    .context("stream reconciliation failed (pass --on-mismatch proceed to override)"))
            }
            MismatchPolicy::Proceed => {
                let warning = format!("{mismatch} (overridden)");
                eprintln!("warning: {warning}");
                warnings.push(warning);
                mismatch.into_reconciliation()
            }
        },
    };

    let mut audio_duration_secs = None;
    let mut audio_url = None;
    if let Some(audio_path) = &config.audio_path {
        let secs = codecs::probe_audio_duration(audio_path)?;
        eprintln!("Probed audio duration: {:.3}s ({})", secs, audio_path.display());
        if let Err(mismatch) = reconcile::reconcile_audio(secs, &reconciliation) {
            match opts.on_mismatch {
                MismatchPolicy::Abort => {
                    return Err(anyhow::Error::new(mismatch)
                        .context("audio reconciliation failed (pass --on-mismatch proceed to override)"))
                }
                MismatchPolicy::Proceed => {
                    let warning = format!("{mismatch} (overridden)");
                    eprintln!("warning: {warning}");
                    warnings.push(warning);
                }
            }
        }
        audio_duration_secs = Some(secs);
        audio_url = Some(util::unix_path_string(audio_path));
    }

    let record = manifest::build(
        &output_root,
        &drc_dir.join(drc_pattern.as_str()),
        &ktx2_dir.join(ktx2_pattern.as_str()),
        config.ktx2_batch_size,
        &reconciliation,
        config.geometry_frame_rate,
        config.texture_frame_rate,
        audio_url,
    )?;

    let manifest_path = output_root.join(format!("{}.manifest", config.name));
    let written = if opts.write_manifest {
        let bytes = serde_json::to_vec(&record).context("serializing manifest")?;
        std::fs::write(&manifest_path, bytes)
            .with_context(|| format!("writing manifest {:?}", manifest_path))?;
        Some(manifest_path)
    } else {
        None
    };

    Ok(PipelineSummary {
        asset_name: config.name.clone(),
        geometry_frames: reconciliation.geometry_frames,
        texture_frames: reconciliation.texture_frames,
        texture_segments: reconciliation.texture_segments,
        geometry_duration_secs: reconciliation.geometry_duration_secs,
        texture_duration_secs: reconciliation.texture_duration_secs,
        audio_duration_secs,
        manifest_path: written,
        warnings,
    })
}

fn geometry_stream(
    config: &ProjectConfig,
    output_root: &Path,
    opts: PipelineOptions,
) -> Result<(PathBuf, FramePattern)> {
    if let Some(path) = &config.draco_files_path {
        return util::split_pattern_path(path);
    }
    let obj = config
        .obj_files_path
        .as_ref()
        .context("no DRACOFilesPath or OBJFilesPath configured")?;
    if !opts.run_codecs {
        bail!("reconcile needs already-compressed geometry (DRACOFilesPath)");
    }
    let (obj_dir, obj_pattern) = util::split_pattern_path(obj)?;
    let drc_dir = output_root.join("DRC");
    eprintln!("Compressing OBJ frames into {}", drc_dir.display());
    let drc_pattern = codecs::compress_geometry(config, &obj_dir, &obj_pattern, &drc_dir)?;
    Ok((drc_dir, drc_pattern))
}

fn texture_stream(
    config: &ProjectConfig,
    output_root: &Path,
    opts: PipelineOptions,
) -> Result<(PathBuf, FramePattern)> {
    if let Some(path) = &config.ktx2_files_path {
        return util::split_pattern_path(path);
    }
    let images = config
        .images_path
        .as_ref()
        .context("no KTX2FilesPath or ImagesPath configured")?;
    if !opts.run_codecs {
        bail!("reconcile needs already-compressed texture segments (KTX2FilesPath)");
    }
    let ktx2_dir = output_root.join("KTX2");
    eprintln!("Compressing image frames into {}", ktx2_dir.display());
    let ktx2_pattern = codecs::compress_texture(config, images, &ktx2_dir)?;
    Ok((ktx2_dir, ktx2_pattern))
}
