use std::future::Future;
use std::path::Path;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    CreateImageRequestArgs, CreateTranscriptionRequestArgs, Image, ImageModel,
    ImageResponseFormat, ImageSize,
};
use async_openai::Client;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use image::RgbImage;

/// Seam for the text-prompt-to-image capability, so orchestration and tests
/// can substitute the model.
pub trait GenerateSceneImage {
    fn generate(&self, prompt: &str) -> impl Future<Output = anyhow::Result<RgbImage>>;
}

/// Speech-to-text capability: one transcript string for a whole audio file.
///
/// Constructed once by the caller and reused across calls; the transcript
/// text may vary between runs of a non-deterministic model.
pub struct Transcriber {
    client: Client<OpenAIConfig>,
    model: String,
}

impl Transcriber {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn transcribe(&self, audio_path: &Path) -> anyhow::Result<String> {
        let request = CreateTranscriptionRequestArgs::default()
            .file(audio_path)
            .model(self.model.as_str())
            .build()?;

        let response = tokio::time::timeout(
            tokio::time::Duration::from_secs(300),
            self.client.audio().transcribe(request),
        )
        .await??;
        Ok(response.text)
    }
}

/// Image generation capability: one image per scene prompt.
pub struct SceneImageGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl SceneImageGenerator {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl GenerateSceneImage for SceneImageGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<RgbImage> {
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(ImageModel::Other(self.model.clone()))
            .n(1)
            .response_format(ImageResponseFormat::B64Json)
            .size(ImageSize::S1024x1024)
            .build()?;

        let response = tokio::time::timeout(
            tokio::time::Duration::from_secs(300),
            self.client.images().create(request),
        )
        .await??;

        let first = response
            .data
            .first()
            .ok_or(anyhow::anyhow!("no image in response"))?;
        let bytes = match first.as_ref() {
            Image::B64Json { b64_json, .. } => BASE64_STANDARD.decode(b64_json.as_bytes())?,
            Image::Url { .. } => anyhow::bail!("expected base64 image data in response"),
        };
        Ok(image::load_from_memory(&bytes)?.to_rgb8())
    }
}
