//! voicehub CLI - Management tool for the voice engine coordinator
//!
//! Operator commands for inspecting, validating and exercising the engine
//! registry: list engines, run deep validation, show resolution status,
//! and smoke-test speech, transcription and playback.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use voicehub::{Detection, EngineRole, VoiceHub};

/// Role selector for status/reload style commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoleArg {
    Stt,
    Tts,
    Wakeword,
    Soundfx,
    AudioBackend,
}

impl From<RoleArg> for EngineRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Stt => EngineRole::Stt,
            RoleArg::Tts => EngineRole::Tts,
            RoleArg::Wakeword => EngineRole::WakeWord,
            RoleArg::Soundfx => EngineRole::SoundFx,
            RoleArg::AudioBackend => EngineRole::AudioBackend,
        }
    }
}

/// voicehub - engine registry, validation and fallback resolution
#[derive(Parser, Debug)]
#[command(name = "voicehub")]
#[command(author, version, about, long_about = "
voicehub coordinates interchangeable voice engines (STT, TTS, wake word,
sound effects, audio playback) and resolves at runtime which installed
engine services each request.

Examples:
  # list every registered engine and whether it is available
  voicehub engines

  # run deep validation over all engines
  voicehub validate

  # why did TTS resolve the way it did?
  voicehub status --role tts

  # speak through the first healthy TTS engine
  voicehub speak --text \"Halo, ini adalah tes suara\"

  # transcribe five seconds of microphone audio
  voicehub transcribe --live --duration 5
")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered engines per role
    Engines,
    /// Run deep validation over every registered engine
    Validate,
    /// Show the last resolution record per role
    Status {
        /// Limit to one role
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },
    /// Synthesize and play text
    Speak {
        /// Text to speak
        #[arg(short, long)]
        text: String,
        /// Language code override
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Transcribe an audio file or live microphone input
    Transcribe {
        /// Audio file to transcribe
        #[arg(short, long, conflicts_with = "live")]
        file: Option<PathBuf>,
        /// Record from the microphone instead
        #[arg(long)]
        live: bool,
        /// Recording duration in seconds (live mode)
        #[arg(short, long, default_value_t = 5)]
        duration: u64,
    },
    /// Play an audio file through the backend probe chain
    Play {
        /// Audio file to play
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Listen for wake words for a bounded time
    Listen {
        /// How long to listen, in seconds
        #[arg(short, long, default_value_t = 30)]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let hub = VoiceHub::builder()
        .with_default_engines()
        .build()
        .context("failed to initialize voice hub")?;

    match cli.command {
        Commands::Engines => cmd_engines(&hub),
        Commands::Validate => cmd_validate(&hub),
        Commands::Status { role } => cmd_status(&hub, role),
        Commands::Speak { text, lang } => cmd_speak(&hub, &text, lang.as_deref()).await,
        Commands::Transcribe {
            file,
            live,
            duration,
        } => cmd_transcribe(&hub, file, live, duration).await,
        Commands::Play { file } => cmd_play(&hub, &file).await,
        Commands::Listen { duration } => cmd_listen(&hub, duration).await,
    }
}

fn cmd_engines(hub: &VoiceHub) -> Result<()> {
    for role in EngineRole::ALL {
        let names = hub.registry().list_names(role);
        if names.is_empty() {
            continue;
        }
        println!("{role}:");
        for name in names {
            let Some(provider) = hub.registry().lookup(role, &name) else {
                continue;
            };
            let descriptor = provider.descriptor();
            let available = provider.as_engine().check_availability();
            println!(
                "  {:<20} v{:<8} [{}] {}",
                descriptor.name,
                descriptor.version,
                if available { "available" } else { "unavailable" },
                descriptor.description,
            );
        }
    }
    Ok(())
}

fn cmd_validate(hub: &VoiceHub) -> Result<()> {
    println!("{:=<60}", "");
    println!("ENGINE VALIDATION REPORT");
    println!("{:=<60}", "");

    let mut failures = 0usize;
    for entry in hub.validate_all() {
        let mark = if entry.result.valid { "ok " } else { "FAIL" };
        if !entry.result.valid {
            failures += 1;
        }
        println!(
            "  [{mark}] {:<14} {:<20} {}",
            entry.role.to_string(),
            entry.name,
            entry.result.message,
        );
    }

    println!("{:=<60}", "");
    if failures > 0 {
        println!("{failures} engine(s) failed validation");
    } else {
        println!("all engines validated successfully");
    }
    Ok(())
}

fn cmd_status(hub: &VoiceHub, role: Option<RoleArg>) -> Result<()> {
    let roles: Vec<EngineRole> = match role {
        Some(role) => vec![role.into()],
        None => EngineRole::ALL.to_vec(),
    };

    for role in roles {
        match hub.status(role) {
            Some(record) => {
                println!(
                    "{role}: selected={} (attempted {:?} at {})",
                    record.selected.as_deref().unwrap_or("<none>"),
                    record.attempted,
                    record.resolved_at.format("%H:%M:%S"),
                );
                for (name, reason) in &record.failures {
                    println!("    {name}: {reason}");
                }
            }
            None => println!("{role}: not resolved yet"),
        }
    }
    Ok(())
}

async fn cmd_speak(hub: &VoiceHub, text: &str, lang: Option<&str>) -> Result<()> {
    match lang {
        Some(lang) => hub.speech().speak_in(text, lang).await?,
        None => hub.speech().speak(text).await?,
    }
    println!(
        "spoken via '{}'",
        hub.speech().bound_engine().await.unwrap_or_default()
    );
    Ok(())
}

async fn cmd_transcribe(
    hub: &VoiceHub,
    file: Option<PathBuf>,
    live: bool,
    duration: u64,
) -> Result<()> {
    let text = if live {
        println!("listening for {duration} seconds...");
        hub.transcriber()
            .transcribe_live(Duration::from_secs(duration))
            .await?
    } else {
        let file = file.context("either --file or --live is required")?;
        hub.transcriber().transcribe_file(&file).await?
    };
    println!("{text}");
    Ok(())
}

async fn cmd_play(hub: &VoiceHub, file: &PathBuf) -> Result<()> {
    hub.playback().play_file(file).await?;
    println!(
        "played via '{}'",
        hub.playback().bound_backend().await.unwrap_or_default()
    );
    Ok(())
}

async fn cmd_listen(hub: &VoiceHub, duration: u64) -> Result<()> {
    let callback = Arc::new(|detection: Detection| {
        println!("wake word detected: '{}'", detection.keyword);
    });

    hub.wakeword().start(callback).await?;
    println!(
        "listening for {:?} for {duration}s (engine '{}')",
        hub.wakeword().keywords(),
        hub.wakeword().bound_engine().await.unwrap_or_default(),
    );

    tokio::time::sleep(Duration::from_secs(duration)).await;
    hub.wakeword().stop().await?;
    Ok(())
}
