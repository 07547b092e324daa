use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::pattern::FramePattern;

/// KTX2 container identifier, the first 12 bytes of every texture segment.
pub const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xAB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// Byte offset of the little-endian u32 layer count in a KTX2 header.
pub const LAYER_COUNT_OFFSET: usize = 32;

/// Header bytes required to recover the layer count.
pub const SEGMENT_HEADER_LEN: usize = 36;

#[derive(Debug, Error)]
pub enum ContainerParseError {
    #[error("no texture segments matching {} in {}", .pattern, .directory.display())]
    NoSegments { directory: PathBuf, pattern: String },
    #[error("segment {} is {} bytes, shorter than the 36-byte container header", .path.display(), .len)]
    TruncatedHeader { path: PathBuf, len: u64 },
    #[error("segment {} does not begin with the KTX2 identifier", .path.display())]
    NotKtx2 { path: PathBuf },
    #[error("reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Frame total and segment file count for one batched texture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureCount {
    pub frames: u64,
    pub segments: u64,
}

/// Filenames in `dir` matching `pattern`, sorted. Widths are fixed, so the
/// lexicographic sort is also the numeric sort.
pub fn matching_files(dir: &Path, pattern: &FramePattern) -> std::io::Result<Vec<String>> {
    let mut names = vec![];
    for entry in std::fs::read_dir(dir)? {
        let e = entry?;
        if !e.path().is_file() {
            continue;
        }
        let name = e.file_name().to_string_lossy().to_string();
        if pattern.matches(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Presence count of geometry frames. Gaps in the numbering are tolerated and
/// simply reduce the count.
pub fn count_geometry_frames(dir: &Path, pattern: &FramePattern) -> Result<u64> {
    let names = matching_files(dir, pattern)
        .with_context(|| format!("listing geometry directory {:?}", dir))?;
    Ok(names.len() as u64)
}

/// Counts texture frames across batched segment files. Every segment except
/// the last is full (`batch_size` frames); only the last one, which the
/// encoder may have padded short, needs its header read.
pub fn count_texture_frames(
    dir: &Path,
    pattern: &FramePattern,
    batch_size: u32,
) -> Result<TextureCount, ContainerParseError> {
    let names = matching_files(dir, pattern).map_err(|source| ContainerParseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let last = match names.last() {
        Some(name) => name,
        None => {
            return Err(ContainerParseError::NoSegments {
                directory: dir.to_path_buf(),
                pattern: pattern.to_string(),
            })
        }
    };

    let last_frames = read_layer_count(&dir.join(last))?;
    let segments = names.len() as u64;
    let frames = (segments - 1) * batch_size as u64 + last_frames as u64;
    Ok(TextureCount { frames, segments })
}

fn read_layer_count(path: &Path) -> Result<u32, ContainerParseError> {
    let file = File::open(path).map_err(|source| ContainerParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut header = Vec::with_capacity(SEGMENT_HEADER_LEN);
    file.take(SEGMENT_HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|source| ContainerParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if header.len() < SEGMENT_HEADER_LEN {
        return Err(ContainerParseError::TruncatedHeader {
            path: path.to_path_buf(),
            len: header.len() as u64,
        });
    }
    if header[..12] != KTX2_IDENTIFIER {
        return Err(ContainerParseError::NotKtx2 {
            path: path.to_path_buf(),
        });
    }

    let count = u32::from_le_bytes(
        header[LAYER_COUNT_OFFSET..LAYER_COUNT_OFFSET + 4]
            .try_into()
            .unwrap(),
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_segment(path: &Path, layer_count: u32) {
        let mut buf = vec![0u8; 64];
        buf[..12].copy_from_slice(&KTX2_IDENTIFIER);
        buf[LAYER_COUNT_OFFSET..LAYER_COUNT_OFFSET + 4]
            .copy_from_slice(&layer_count.to_le_bytes());
        fs::write(path, buf).expect("write segment");
    }

    #[test]
    fn geometry_count_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        let pattern = FramePattern::parse("frame_#######.obj").unwrap();
        fs::write(dir.path().join("frame_0000001.obj"), b"obj").unwrap();
        fs::write(dir.path().join("frame_0000002.obj"), b"obj").unwrap();
        fs::write(dir.path().join("notes.txt"), b"notes").unwrap();

        assert_eq!(count_geometry_frames(dir.path(), &pattern).unwrap(), 2);
    }

    #[test]
    fn geometry_count_tolerates_numbering_gaps() {
        let dir = TempDir::new().unwrap();
        let pattern = FramePattern::parse("frame_#######.drc").unwrap();
        for i in [1u32, 2, 9] {
            fs::write(dir.path().join(format!("frame_{i:07}.drc")), b"drc").unwrap();
        }

        assert_eq!(count_geometry_frames(dir.path(), &pattern).unwrap(), 3);
    }

    #[test]
    fn texture_count_reads_partial_last_segment() {
        let dir = TempDir::new().unwrap();
        let pattern = FramePattern::parse("texture_#######.ktx2").unwrap();
        // Three full segments of 7, plus a last segment holding 5 frames.
        for i in 0..3u32 {
            write_segment(&dir.path().join(format!("texture_{i:07}.ktx2")), 7);
        }
        write_segment(&dir.path().join("texture_0000003.ktx2"), 5);

        let counted = count_texture_frames(dir.path(), &pattern, 7).unwrap();
        assert_eq!(counted.frames, 26);
        assert_eq!(counted.segments, 4);
    }

    #[test]
    fn texture_count_with_single_segment_uses_header_only() {
        let dir = TempDir::new().unwrap();
        let pattern = FramePattern::parse("texture_#######.ktx2").unwrap();
        write_segment(&dir.path().join("texture_0000000.ktx2"), 4);

        let counted = count_texture_frames(dir.path(), &pattern, 7).unwrap();
        assert_eq!(counted.frames, 4);
        assert_eq!(counted.segments, 1);
    }

    #[test]
    fn texture_count_fails_without_segments() {
        let dir = TempDir::new().unwrap();
        let pattern = FramePattern::parse("texture_#######.ktx2").unwrap();
        fs::write(dir.path().join("notes.txt"), b"notes").unwrap();

        let err = count_texture_frames(dir.path(), &pattern, 7).unwrap_err();
        assert!(matches!(err, ContainerParseError::NoSegments { .. }));
    }

    #[test]
    fn truncated_last_segment_is_rejected() {
        let dir = TempDir::new().unwrap();
        let pattern = FramePattern::parse("texture_#######.ktx2").unwrap();
        write_segment(&dir.path().join("texture_0000000.ktx2"), 7);
        fs::write(dir.path().join("texture_0000001.ktx2"), &KTX2_IDENTIFIER).unwrap();

        let err = count_texture_frames(dir.path(), &pattern, 7).unwrap_err();
        assert!(matches!(
            err,
            ContainerParseError::TruncatedHeader { len: 12, .. }
        ));
    }

    #[test]
    fn non_ktx2_last_segment_is_rejected() {
        let dir = TempDir::new().unwrap();
        let pattern = FramePattern::parse("texture_#######.ktx2").unwrap();
        fs::write(dir.path().join("texture_0000000.ktx2"), vec![0u8; 64]).unwrap();

        let err = count_texture_frames(dir.path(), &pattern, 7).unwrap_err();
        assert!(matches!(err, ContainerParseError::NotKtx2 { .. }));
    }
}
