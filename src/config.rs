use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

fn default_compression_level() -> u32 {
    7
}
fn default_q_position() -> u32 {
    11
}
fn default_q_texture() -> u32 {
    10
}
fn default_q_normal() -> u32 {
    8
}
fn default_q_generic() -> u32 {
    8
}

/// Project configuration, the exhaustively-typed form of the JSON document
/// that drives an encode. Field keys match the document; anything the
/// document carries beyond these is an error, not an attribute bag.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,

    #[serde(rename = "OutputDirectory")]
    pub output_directory: PathBuf,

    /// OBJ frames to feed through draco_encoder when no draco directory is
    /// supplied. A pattern-bearing path like `capture/OBJ/frame_#######.obj`.
    #[serde(rename = "OBJFilesPath", default)]
    pub obj_files_path: Option<PathBuf>,

    /// Already-compressed geometry stream, e.g. `out/DRC/frame_#######.drc`.
    #[serde(rename = "DRACOFilesPath", default)]
    pub draco_files_path: Option<PathBuf>,

    /// printf-style image sequence handed verbatim to basisu, e.g.
    /// `capture/images/frame_%07u.png`.
    #[serde(rename = "ImagesPath", default)]
    pub images_path: Option<String>,

    /// Already-compressed texture stream, e.g. `out/KTX2/texture_#######.ktx2`.
    #[serde(rename = "KTX2FilesPath", default)]
    pub ktx2_files_path: Option<PathBuf>,

    #[serde(rename = "AudioPath", default)]
    pub audio_path: Option<PathBuf>,

    #[serde(rename = "GeometryFrameRate")]
    pub geometry_frame_rate: u32,

    #[serde(rename = "TextureFrameRate")]
    pub texture_frame_rate: u32,

    /// Texture frames packed per KTX2 segment; the final segment may be short.
    #[serde(rename = "KTX2_BATCH_SIZE")]
    pub ktx2_batch_size: u32,

    #[serde(rename = "KTX2_FIRST_FILE", default)]
    pub ktx2_first_file: u32,

    /// Image count for the basisu step; required with ImagesPath.
    #[serde(rename = "KTX2_FILE_COUNT", default)]
    pub ktx2_file_count: Option<u32>,

    #[serde(rename = "DRACO_COMPRESSION_LEVEL", default = "default_compression_level")]
    pub draco_compression_level: u32,
    #[serde(rename = "Q_POSITION_ATTR", default = "default_q_position")]
    pub q_position_attr: u32,
    #[serde(rename = "Q_TEXTURE_ATTR", default = "default_q_texture")]
    pub q_texture_attr: u32,
    #[serde(rename = "Q_NORMAL_ATTR", default = "default_q_normal")]
    pub q_normal_attr: u32,
    #[serde(rename = "Q_GENERIC_ATTR", default = "default_q_generic")]
    pub q_generic_attr: u32,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GeometryFrameRate must be a positive integer")]
    ZeroGeometryRate,
    #[error("TextureFrameRate must be a positive integer")]
    ZeroTextureRate,
    #[error("KTX2_BATCH_SIZE must be a positive integer")]
    ZeroBatchSize,
    #[error("one of DRACOFilesPath or OBJFilesPath must be supplied")]
    MissingGeometrySource,
    #[error("one of KTX2FilesPath or ImagesPath must be supplied")]
    MissingTextureSource,
    #[error("ImagesPath requires KTX2_FILE_COUNT")]
    MissingImageCount,
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geometry_frame_rate == 0 {
            return Err(ConfigError::ZeroGeometryRate);
        }
        if self.texture_frame_rate == 0 {
            return Err(ConfigError::ZeroTextureRate);
        }
        if self.ktx2_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.draco_files_path.is_none() && self.obj_files_path.is_none() {
            return Err(ConfigError::MissingGeometrySource);
        }
        if self.ktx2_files_path.is_none() && self.images_path.is_none() {
            return Err(ConfigError::MissingTextureSource);
        }
        if self.ktx2_files_path.is_none() && self.ktx2_file_count.is_none() {
            return Err(ConfigError::MissingImageCount);
        }
        Ok(())
    }
}

pub fn load(path: &Path) -> Result<ProjectConfig> {
    let raw = std::fs::read(path).with_context(|| format!("reading config {:?}", path))?;
    let config: ProjectConfig =
        serde_json::from_slice(&raw).with_context(|| format!("parsing config {:?}", path))?;
    config.validate()?;
    Ok(config)
}
