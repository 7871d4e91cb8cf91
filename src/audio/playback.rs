//! Audio playback backends
//!
//! Two families of [`AudioBackend`] implementations:
//! - [`CpalBackend`] plays decoded WAV data through the default output
//!   device via cpal.
//! - [`CommandBackend`] shells out to an installed command-line player.
//!
//! Both validate by existence check only (device present / binary on
//! PATH); probing never produces sound.

use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::debug;

use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{Capability, EngineDescriptor, EngineRole};
use crate::engine::traits::{AudioBackend, Engine, ProbeError, ProbeResult};
use crate::utils::find_executable;

/// Native playback through cpal.
pub struct CpalBackend {
    descriptor: EngineDescriptor,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            descriptor: EngineDescriptor::new("cpal", EngineRole::AudioBackend)
                .with_description("Native audio output via the cpal mixer library")
                .with_capability(Capability::Offline)
                .with_capability(Capability::LowLatency),
        }
    }

    fn read_wav(path: &Path) -> Result<(Vec<f32>, u32, u16)> {
        let mut reader = hound::WavReader::open(path).map_err(|e| {
            VoiceError::runtime("cpal", "play_file", format!("cannot read WAV: {e}"))
        })?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>(),
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()
            }
        }
        .map_err(|e| VoiceError::runtime("cpal", "play_file", format!("corrupt WAV: {e}")))?;

        Ok((samples, spec.sample_rate, spec.channels))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for CpalBackend {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        match cpal::default_host().default_output_device() {
            Some(_) => Ok(()),
            None => Err(ProbeError::dependency("audio output device")),
        }
    }
}

impl AudioBackend for CpalBackend {
    fn play_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(VoiceError::ResourceMissing {
                path: path.to_path_buf(),
            });
        }

        let (samples, sample_rate, src_channels) = Self::read_wav(path)?;
        if samples.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VoiceError::runtime_fault("cpal", "play_file", "no output device"))?;
        let config = device.default_output_config().map_err(|e| {
            VoiceError::runtime_fault("cpal", "play_file", format!("no output config: {e}"))
        })?;

        let out_channels = config.channels() as usize;
        let out_rate = config.sample_rate().0;
        let src_channels = src_channels as usize;

        // Nearest-frame resample to the device rate; playback quality is
        // not a goal of this backend, correctness of the frame count is.
        let frames = samples.len() / src_channels;
        let out_frames = (frames as u64 * out_rate as u64 / sample_rate as u64) as usize;

        let cursor = Arc::new(AtomicUsize::new(0));
        let writer_cursor = Arc::clone(&cursor);

        let stream = device
            .build_output_stream(
                &config.config(),
                move |data: &mut [f32], _| {
                    for frame in data.chunks_mut(out_channels) {
                        let i = writer_cursor.fetch_add(1, Ordering::Relaxed);
                        let value = if i < out_frames {
                            let src_frame = (i as u64 * sample_rate as u64 / out_rate as u64)
                                as usize;
                            let base = src_frame * src_channels;
                            // downmix by averaging source channels
                            let sum: f32 = samples[base..base + src_channels].iter().sum();
                            sum / src_channels as f32
                        } else {
                            0.0
                        };
                        for out in frame.iter_mut() {
                            *out = value;
                        }
                    }
                },
                |err| debug!(error = %err, "cpal stream error"),
                None,
            )
            .map_err(|e| {
                VoiceError::runtime_fault("cpal", "play_file", format!("stream build failed: {e}"))
            })?;

        stream
            .play()
            .map_err(|e| VoiceError::runtime_fault("cpal", "play_file", e.to_string()))?;

        let total = Duration::from_secs_f64(out_frames as f64 / out_rate as f64);
        let deadline = Instant::now() + total + Duration::from_millis(250);
        while cursor.load(Ordering::Relaxed) < out_frames && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }

        Ok(())
    }
}

/// Playback by shelling out to an installed command-line player.
///
/// The argument template substitutes `{file}` with the audio path.
pub struct CommandBackend {
    descriptor: EngineDescriptor,
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(name: &str, program: &str, args: &[&str], description: &str) -> Self {
        Self {
            descriptor: EngineDescriptor::new(name, EngineRole::AudioBackend)
                .with_description(description)
                .with_capability(Capability::Offline)
                .with_capability(Capability::Subprocess),
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn ffplay() -> Self {
        Self::new(
            "ffplay",
            "ffplay",
            &["-nodisp", "-autoexit", "-loglevel", "error", "{file}"],
            "Playback via the ffplay command-line player",
        )
    }

    pub fn aplay() -> Self {
        Self::new(
            "aplay",
            "aplay",
            &["-q", "{file}"],
            "Playback via the ALSA aplay command-line player",
        )
    }

    pub fn paplay() -> Self {
        Self::new(
            "paplay",
            "paplay",
            &["{file}"],
            "Playback via the PulseAudio paplay command-line player",
        )
    }

    pub fn mpg123() -> Self {
        Self::new(
            "mpg123",
            "mpg123",
            &["-q", "{file}"],
            "Playback via the mpg123 command-line player",
        )
    }

    #[cfg(target_os = "macos")]
    pub fn platform_player() -> Self {
        Self::new(
            "afplay",
            "afplay",
            &["{file}"],
            "Playback via the macOS afplay system player",
        )
    }

    #[cfg(target_os = "windows")]
    pub fn platform_player() -> Self {
        Self::new(
            "powershell",
            "powershell",
            &["-c", "(New-Object Media.SoundPlayer '{file}').PlaySync()"],
            "Playback via the Windows Media.SoundPlayer",
        )
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    pub fn platform_player() -> Self {
        Self::new(
            "sox",
            "play",
            &["-q", "{file}"],
            "Playback via the SoX play command-line player",
        )
    }

    fn render_args(&self, path: &Path) -> Vec<String> {
        let file = path.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{file}", &file))
            .collect()
    }
}

impl Engine for CommandBackend {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        match find_executable(&self.program) {
            Some(_) => Ok(()),
            None => Err(ProbeError::dependency(self.program.clone())),
        }
    }
}

impl AudioBackend for CommandBackend {
    fn play_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(VoiceError::ResourceMissing {
                path: path.to_path_buf(),
            });
        }

        let name = self.descriptor.name.clone();
        let status = Command::new(&self.program)
            .args(self.render_args(path))
            .status()
            .map_err(|e| {
                VoiceError::runtime_fault(&name, "play_file", format!("spawn failed: {e}"))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(VoiceError::runtime_fault(
                &name,
                "play_file",
                format!("{} exited with {status}", self.program),
            ))
        }
    }
}
