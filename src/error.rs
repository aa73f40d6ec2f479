use std::path::PathBuf;

use thiserror::Error;

/// Failure value shared by both pipelines. A pipeline either produces every
/// declared output or returns one of these; there are no partial results.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage ran to completion but the intermediate file it was expected
    /// to leave behind is not on disk.
    #[error("missing expected artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// The script contains no non-blank scene paragraphs, so there is no
    /// frame to take the output dimensions from.
    #[error("script contains no scenes")]
    EmptyScript,

    /// Any other failure while decoding, extracting, transcribing,
    /// generating or encoding.
    #[error("{context}")]
    Stage {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn stage(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Stage {
            context: context.into(),
            source: source.into(),
        }
    }
}
