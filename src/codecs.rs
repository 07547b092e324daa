use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ProjectConfig;
use crate::count;
use crate::pattern::FramePattern;

/// Segment naming used when this tool runs basisu itself.
const TEXTURE_SEGMENT_PATTERN: &str = "texture_#######.ktx2";

fn ensure_tool_available(tool: &str) -> Result<()> {
    match Command::new(tool)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            let _ = child.wait();
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!("'{tool}' not found in PATH")
        }
        Err(e) => Err(e).with_context(|| format!("failed to launch {tool}")),
    }
}

fn frame_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {wide_bar} {pos}/{len}").unwrap(),
    );
    pb
}

/// Compresses every OBJ frame into `drc_dir` with draco_encoder, mirroring
/// the OBJ filenames with a `.drc` suffix. Returns the resulting filename
/// pattern for the geometry stream.
pub fn compress_geometry(
    config: &ProjectConfig,
    obj_dir: &Path,
    obj_pattern: &FramePattern,
    drc_dir: &Path,
) -> Result<FramePattern> {
    ensure_tool_available("draco_encoder")?;
    std::fs::create_dir_all(drc_dir)
        .with_context(|| format!("creating geometry output directory {:?}", drc_dir))?;

    let names = count::matching_files(obj_dir, obj_pattern)
        .with_context(|| format!("listing OBJ directory {:?}", obj_dir))?;
    if names.is_empty() {
        bail!(
            "no OBJ frames matching {} in {}",
            obj_pattern,
            obj_dir.display()
        );
    }

    let pb = frame_progress(names.len() as u64);
    for name in &names {
        let status = Command::new("draco_encoder")
            .arg("-i")
            .arg(obj_dir.join(name))
            .arg("-o")
            .arg(drc_dir.join(format!("{name}.drc")))
            .arg("-qp")
            .arg(config.q_position_attr.to_string())
            .arg("-qt")
            .arg(config.q_texture_attr.to_string())
            .arg("-qn")
            .arg(config.q_normal_attr.to_string())
            .arg("-qg")
            .arg(config.q_generic_attr.to_string())
            .arg("-cl")
            .arg(config.draco_compression_level.to_string())
            .stdout(Stdio::null())
            .status()
            .context("failed to run draco_encoder")?;
        if !status.success() {
            bail!("draco_encoder failed for {:?}", name);
        }
        pb.inc(1);
    }
    pb.finish_with_message("geometry compressed");

    Ok(FramePattern::parse(&format!("{}.drc", obj_pattern.as_str()))?)
}

/// Compresses the image sequence into batched KTX2 segments with basisu.
/// basisu fills each segment with `KTX2_BATCH_SIZE` frames and pads only the
/// final one short. Returns the segment filename pattern.
pub fn compress_texture(
    config: &ProjectConfig,
    images_printf: &str,
    ktx2_dir: &Path,
) -> Result<FramePattern> {
    ensure_tool_available("basisu")?;
    std::fs::create_dir_all(ktx2_dir)
        .with_context(|| format!("creating texture output directory {:?}", ktx2_dir))?;

    let pattern = FramePattern::parse(TEXTURE_SEGMENT_PATTERN)?;
    let first = config.ktx2_first_file;
    let frame_count = config
        .ktx2_file_count
        .context("KTX2_FILE_COUNT is required to batch an image sequence")?;
    let batch = config.ktx2_batch_size;
    let end = first + frame_count;

    let pb = frame_progress(frame_count.div_ceil(batch) as u64);
    let mut segment_index = 0u64;
    let mut current = first;
    while current < end {
        let num = batch.min(end - current);
        let status = Command::new("basisu")
            .arg("-ktx2")
            .arg("-tex_type")
            .arg("video")
            .arg("-multifile_printf")
            .arg(images_printf)
            .arg("-multifile_num")
            .arg(num.to_string())
            .arg("-multifile_first")
            .arg(current.to_string())
            .arg("-y_flip")
            .arg("-output_file")
            .arg(ktx2_dir.join(pattern.expand(segment_index)))
            .stdout(Stdio::null())
            .status()
            .context("failed to run basisu")?;
        if !status.success() {
            bail!("basisu failed for frames [{}, {})", current, current + num);
        }
        pb.inc(1);
        segment_index += 1;
        current += num;
    }
    pb.finish_with_message("texture compressed");

    Ok(pattern)
}

/// Duration in seconds as reported by ffprobe. The pipeline never touches
/// audio samples, only this value.
pub fn probe_audio_duration(path: &Path) -> Result<f64> {
    let out = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("default=noprint_wrappers=1:nokey=1")
        .arg(path)
        .output()
        .context("failed to run ffprobe")?;
    if !out.status.success() {
        bail!(
            "ffprobe failed for {:?}: {}",
            path,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    let text = String::from_utf8_lossy(&out.stdout);
    text.trim()
        .parse::<f64>()
        .with_context(|| format!("unparseable ffprobe duration {:?}", text.trim()))
}
