use std::path::Path;

use async_openai::Client;
use image::RgbImage;

use filmloom::ai::{GenerateSceneImage, Transcriber};
use filmloom::analyze::analyze_film;
use filmloom::decode;
use filmloom::error::PipelineError;
use filmloom::synthesize::synthesize_film;

/// Deterministic stand-in for the image model: one solid-color frame per
/// prompt, shaded by prompt length so frames are distinguishable.
struct SolidColorGenerator;

impl GenerateSceneImage for SolidColorGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<RgbImage> {
        let shade = (prompt.len() % 256) as u8;
        Ok(RgbImage::from_pixel(320, 240, image::Rgb([shade, 64, 128])))
    }
}

#[tokio::test]
async fn two_scene_script_yields_two_frame_video_at_24_fps() {
    decode::init();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.mp4");

    let report = synthesize_film(
        &SolidColorGenerator,
        "A dark forest.\n\nA lightning battle.",
        &output,
        None,
    )
    .await
    .unwrap();
    assert_eq!(report.scene_count, 2);

    let decoded = decode::decode_frames(&output).unwrap();
    assert_eq!(decoded.frames.len(), 2);
    assert_eq!(decoded.frame_rate, 24);
    assert_eq!((decoded.width, decoded.height), (320, 240));
}

#[tokio::test]
async fn scene_count_matches_frame_count() {
    decode::init();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.mp4");

    let script = "One.\n\nTwo.\n\nThree.\n\n   \n\nFour.";
    let report = synthesize_film(&SolidColorGenerator, script, &output, None)
        .await
        .unwrap();
    assert_eq!(report.scene_count, 4);

    let decoded = decode::decode_frames(&output).unwrap();
    assert_eq!(decoded.frames.len(), 4);
}

#[tokio::test]
async fn blank_only_script_is_rejected_up_front() {
    decode::init();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.mp4");

    let err = synthesize_film(&SolidColorGenerator, "\n\n   \n\t\n", &output, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyScript));
    assert!(!output.exists());
}

#[tokio::test]
async fn nonexistent_input_video_yields_typed_failure() {
    decode::init();
    let transcriber = Transcriber::new(Client::new(), "whisper-1");

    let err = analyze_film(Path::new("/nonexistent/input_movie.mkv"), &transcriber)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Stage { .. }));
    assert!(err.to_string().contains("cannot open or decode"));
}

#[tokio::test]
async fn analysis_frame_count_and_rate_are_idempotent() {
    decode::init();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("probe.mp4");

    synthesize_film(&SolidColorGenerator, "A.\n\nB.\n\nC.", &output, None)
        .await
        .unwrap();

    let first = decode::decode_frames(&output).unwrap();
    let second = decode::decode_frames(&output).unwrap();
    assert_eq!(first.frames.len(), second.frames.len());
    assert_eq!(first.frame_rate, second.frame_rate);
}
