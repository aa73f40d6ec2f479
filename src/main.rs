use std::fs;
use std::path::PathBuf;

use async_openai::Client;
use clap::{Parser, Subcommand};
use tracing::error;

use filmloom::ai::{SceneImageGenerator, Transcriber};
use filmloom::analyze;
use filmloom::decode;
use filmloom::synthesize::{self, Overlays};

#[derive(Parser)]
#[command(name = "filmloom")]
#[command(about = "Analyze an existing film and weave a new one from a scene script", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a video, extract its audio track and print the transcript
    Analyze {
        input_file: PathBuf,
        #[arg(long, default_value = "whisper-1")]
        transcription_model: String,
    },
    /// Generate a video from a scene script, one frame per paragraph
    Create {
        /// Scene script text; paragraphs separated by blank lines
        #[arg(short, long)]
        script: Option<String>,
        /// Read the scene script from a file instead
        #[arg(long, conflicts_with = "script")]
        script_file: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "dall-e-3")]
        image_model: String,
        /// Burn this caption over the bottom of the video, plus the prompt
        /// banner over the top
        #[arg(long)]
        caption: Option<String>,
    },
    /// Analyze a film, then synthesize a new one with its transcript burned
    /// in as the caption
    Remake {
        input_file: PathBuf,
        #[arg(short, long)]
        script: Option<String>,
        #[arg(long, conflicts_with = "script")]
        script_file: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "whisper-1")]
        transcription_model: String,
        #[arg(long, default_value = "dall-e-3")]
        image_model: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    decode::init();

    if let Err(err) = run(Cli::parse()).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Analyze {
            input_file,
            transcription_model,
        } => {
            let transcriber = Transcriber::new(Client::new(), transcription_model);
            let analysis = analyze::analyze_film(&input_file, &transcriber).await?;
            println!("frames: {}", analysis.frames.len());
            println!("frame rate: {} fps", analysis.frame_rate);
            println!("dimensions: {}x{}", analysis.width, analysis.height);
            println!("transcript: {}", analysis.transcript);
        }
        Command::Create {
            script,
            script_file,
            output,
            image_model,
            caption,
        } => {
            let script_text = load_script(script, script_file)?;
            let generator = SceneImageGenerator::new(Client::new(), image_model);
            let overlays = caption.map(|caption| Overlays {
                prompt: first_scene(&script_text),
                caption,
            });
            synthesize::synthesize_film(&generator, &script_text, &output, overlays.as_ref())
                .await?;
        }
        Command::Remake {
            input_file,
            script,
            script_file,
            output,
            transcription_model,
            image_model,
        } => {
            let script_text = load_script(script, script_file)?;
            let client = Client::new();
            let transcriber = Transcriber::new(client.clone(), transcription_model);
            let generator = SceneImageGenerator::new(client, image_model);

            let analysis = analyze::analyze_film(&input_file, &transcriber).await?;
            let overlays = Overlays {
                prompt: first_scene(&script_text),
                caption: analysis.transcript,
            };
            synthesize::synthesize_film(&generator, &script_text, &output, Some(&overlays))
                .await?;
        }
    }
    Ok(())
}

fn load_script(script: Option<String>, script_file: Option<PathBuf>) -> anyhow::Result<String> {
    match (script, script_file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(fs::read_to_string(path)?),
        (None, None) => Err(anyhow::anyhow!(
            "either --script or --script-file is required"
        )),
    }
}

fn first_scene(script_text: &str) -> String {
    filmloom::script::parse_scenes(script_text)
        .into_iter()
        .next()
        .unwrap_or_default()
}
