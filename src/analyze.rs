use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::ai::Transcriber;
use crate::audio;
use crate::decode::{self, RgbFrame};
use crate::error::PipelineError;

/// Everything the analysis pipeline produces for one video. All fields are
/// filled together; on failure none of them exist.
#[derive(Debug)]
pub struct Analysis {
    pub frames: Vec<RgbFrame>,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
    pub transcript: String,
}

/// Runs the analysis pipeline: decode every frame in order, extract the
/// audio track, transcribe it. Strictly sequential, no retries.
pub async fn analyze_film(
    input_path: &Path,
    transcriber: &Transcriber,
) -> Result<Analysis, PipelineError> {
    info!("decoding frames from {}", input_path.display());
    let decoded = decode::decode_frames(input_path).map_err(|source| {
        PipelineError::stage(
            format!("cannot open or decode {}", input_path.display()),
            source,
        )
    })?;
    info!(
        "decoded {} frames at {} fps ({}x{})",
        decoded.frames.len(),
        decoded.frame_rate,
        decoded.width,
        decoded.height
    );

    let wav_path = audio::extract_audio(input_path).await?;
    let transcript = transcriber
        .transcribe(&wav_path)
        .await
        .map_err(|source| PipelineError::stage("speech recognition failed", source))?;

    // the scratch WAV survives any failure above for inspection
    if let Err(err) = fs::remove_file(&wav_path) {
        warn!(
            "could not remove scratch audio file {}: {err}",
            wav_path.display()
        );
    }

    Ok(Analysis {
        frames: decoded.frames,
        frame_rate: decoded.frame_rate,
        width: decoded.width,
        height: decoded.height,
        transcript,
    })
}
