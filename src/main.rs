use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use writing_coach::WritingSession;
use writing_coach::config::Config;
use writing_coach::models::{
    AnalysisReport, AnalysisRequest, ContentKind, GenerationRequest, ImagePayload, ModelResult,
};
use writing_coach::topics::suggested_topics;

#[derive(Parser, Debug)]
#[command(name = "writing-coach", version, about = "AI feedback and content generation for student writing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze typed text read from a file, or stdin when the path is `-`
    Analyze {
        #[arg(long, default_value = "essay")]
        kind: String,
        input: PathBuf,
    },
    /// Generate content on a topic
    Generate {
        #[arg(long, default_value = "essay")]
        kind: String,
        topic: String,
    },
    /// Analyze a photo of handwriting, given as a file path or a `data:` URL
    Handwriting { image: String },
    /// List suggested topics, optionally filtered
    Topics { query: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Topics { query } => {
            for topic in suggested_topics(query.as_deref().unwrap_or_default()) {
                println!("{topic}");
            }
            return Ok(());
        }
        command => command,
    };

    let config = Config::load();
    let session = WritingSession::new(&config).context("Failed to start writing session")?;

    let outcome = match command {
        Commands::Analyze { kind, input } => {
            let text = read_input(&input)?;
            let request = AnalysisRequest::text(text, ContentKind::parse(&kind));
            session.improve(&request).await.map(print_result)
        }
        Commands::Handwriting { image } => {
            let request = AnalysisRequest::image(load_image(&image)?);
            session.improve(&request).await.map(print_result)
        }
        Commands::Generate { kind, topic } => {
            let request = GenerationRequest::new(topic, ContentKind::parse(&kind));
            session.generate(&request).await.map(|text| println!("{text}"))
        }
        Commands::Topics { .. } => Ok(()),
    };

    for toast in session.notifications().list() {
        tracing::info!(severity = ?toast.severity, "{}", toast.title);
    }

    match outcome {
        Ok(()) => Ok(()),
        Err(message) => bail!(message),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_image(source: &str) -> Result<ImagePayload> {
    if source.starts_with("data:") {
        return ImagePayload::from_data_url(source).context("Failed to decode image data URL");
    }
    let bytes =
        std::fs::read(source).with_context(|| format!("Failed to read image {source}"))?;
    Ok(ImagePayload::from_bytes(bytes))
}

fn print_result(result: ModelResult) {
    let Some(report) = AnalysisReport::from_result(&result) else {
        println!("{}", result.as_raw_text().unwrap_or_default());
        return;
    };
    for name in AnalysisReport::KNOWN_FIELDS {
        let Some(value) = report.field(name) else {
            continue;
        };
        println!("{name}:");
        for line in value.lines() {
            println!("  - {line}");
        }
    }
    for (name, value) in &report.extra {
        println!("{name}: {value}");
    }
    if let Some(score) = report.numeric_score() {
        println!("\nScore: {score}/10");
    }
}
