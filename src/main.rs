mod codecs;
mod config;
mod count;
mod manifest;
mod pattern;
mod pipeline;
mod reconcile;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pipeline::{PipelineOptions, PipelineSummary};
use reconcile::MismatchPolicy;

#[derive(Parser)]
#[command(
    name = "uvolenc",
    version,
    about = "Universal Volumetric encoder: reconcile draco/basisu frame streams into a playback manifest"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: compress sources where needed, reconcile the
    /// streams, and write the playback manifest
    Encode {
        /// Project config JSON (stream paths, frame rates, batch size, quantization)
        config: PathBuf,

        /// Behaviour when stream or audio durations disagree
        #[arg(long, value_enum, default_value_t = MismatchPolicy::Abort)]
        on_mismatch: MismatchPolicy,
    },

    /// Validate already-encoded streams without invoking codecs or writing a manifest
    Reconcile {
        /// Project config JSON (stream paths, frame rates, batch size)
        config: PathBuf,

        /// Behaviour when stream or audio durations disagree
        #[arg(long, value_enum, default_value_t = MismatchPolicy::Abort)]
        on_mismatch: MismatchPolicy,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Encode {
            config,
            on_mismatch,
        } => {
            let cfg = config::load(&config)?;
            let summary = pipeline::run(
                &cfg,
                PipelineOptions {
                    on_mismatch,
                    run_codecs: true,
                    write_manifest: true,
                },
            )?;
            print_summary(&summary);
        }

        Commands::Reconcile {
            config,
            on_mismatch,
        } => {
            let cfg = config::load(&config)?;
            let summary = pipeline::run(
                &cfg,
                PipelineOptions {
                    on_mismatch,
                    run_codecs: false,
                    write_manifest: false,
                },
            )?;
            print_summary(&summary);
        }
    }

    Ok(())
}

fn print_summary(summary: &PipelineSummary) {
    println!(
        "Asset summary: name={} geometry_frames={} texture_frames={} segments={} geometry_duration={:.3}s texture_duration={:.3}s audio_duration={} manifest={} warnings={}",
        summary.asset_name,
        summary.geometry_frames,
        summary.texture_frames,
        summary.texture_segments,
        summary.geometry_duration_secs,
        summary.texture_duration_secs,
        summary
            .audio_duration_secs
            .map(|secs| format!("{secs:.3}s"))
            .unwrap_or_else(|| "-".to_string()),
        summary
            .manifest_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string()),
        summary.warnings.len(),
    );
    for warning in &summary.warnings {
        println!("  warning: {}", warning);
    }
}
