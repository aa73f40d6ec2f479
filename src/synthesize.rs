use std::fs;
use std::path::Path;

use tracing::info;

use crate::ai::GenerateSceneImage;
use crate::decode::RgbFrame;
use crate::encode;
use crate::error::PipelineError;
use crate::overlay;
use crate::script;

/// Texts burned over the finished video: the caption along the bottom and
/// the prompt banner along the top, both for the full duration.
pub struct Overlays {
    pub caption: String,
    pub prompt: String,
}

#[derive(Debug)]
pub struct SynthesisReport {
    pub scene_count: usize,
    pub width: u32,
    pub height: u32,
}

/// Runs the synthesis pipeline: split the script into scenes, generate one
/// image per scene in order, encode them at the fixed frame rate, and
/// optionally burn the overlays in a second pass.
///
/// Scene `i` always maps to frame `i`; a script with no non-blank scenes is
/// rejected before any generation happens.
pub async fn synthesize_film<G: GenerateSceneImage>(
    generator: &G,
    script_text: &str,
    output_path: &Path,
    overlays: Option<&Overlays>,
) -> Result<SynthesisReport, PipelineError> {
    let scenes = script::parse_scenes(script_text);
    if scenes.is_empty() {
        return Err(PipelineError::EmptyScript);
    }

    let mut frames = Vec::with_capacity(scenes.len());
    for (index, scene) in scenes.iter().enumerate() {
        info!("generating frame {}/{}: {scene}", index + 1, scenes.len());
        let image = generator.generate(scene).await.map_err(|source| {
            PipelineError::stage(
                format!("image generation failed for scene {}", index + 1),
                source,
            )
        })?;
        frames.push(RgbFrame::from_image(&image));
    }

    match overlays {
        None => {
            encode::write_video(&frames, output_path).map_err(|source| {
                PipelineError::stage(format!("cannot encode {}", output_path.display()), source)
            })?;
        }
        Some(overlays) => {
            let raw_path = output_path.with_extension("raw.mp4");
            encode::write_video(&frames, &raw_path).map_err(|source| {
                PipelineError::stage(format!("cannot encode {}", raw_path.display()), source)
            })?;
            overlay::burn_overlays(&raw_path, output_path, &overlays.caption, &overlays.prompt)
                .map_err(|source| PipelineError::stage("caption compositing failed", source))?;
            let _ = fs::remove_file(&raw_path);
        }
    }

    let report = SynthesisReport {
        scene_count: scenes.len(),
        width: frames[0].width,
        height: frames[0].height,
    };
    info!(
        "wrote {} frames at {} fps to {}",
        report.scene_count,
        encode::SYNTHESIS_FRAME_RATE,
        output_path.display()
    );
    Ok(report)
}
