use std::env;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::error::PipelineError;

/// Extracts the audio track of a video to a 16 kHz mono WAV in the system
/// temp directory by invoking the external `ffmpeg` binary.
///
/// The success contract is that the expected output file exists afterwards;
/// a run that exits cleanly without producing it is a `MissingArtifact`.
/// The file is left in place on downstream failure and removed by the
/// analysis orchestrator once the transcript has been obtained.
pub async fn extract_audio(input_path: &Path) -> Result<PathBuf, PipelineError> {
    let stem = input_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("input");
    let wav_path = env::temp_dir().join(format!("filmloom-{}-{}.wav", stem, std::process::id()));

    info!("extracting audio track to {}", wav_path.display());
    let status = Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input_path)
        .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
        .arg(&wav_path)
        .status()
        .await
        .map_err(|source| PipelineError::stage("failed to run ffmpeg for audio extraction", source))?;

    if !status.success() {
        return Err(PipelineError::stage(
            "audio extraction failed",
            anyhow::anyhow!("ffmpeg exited with {status}"),
        ));
    }
    if !wav_path.exists() {
        return Err(PipelineError::MissingArtifact { path: wav_path });
    }
    Ok(wav_path)
}
