//! whisper.cpp STT adapter
//!
//! Offline transcription by shelling out to the `whisper-cli` executable
//! with a local GGML model. The model and inference internals belong to
//! whisper.cpp; this adapter only owns the process boundary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::audio::capture::AudioRecorder;
use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{Capability, EngineDescriptor, EngineRole};
use crate::engine::traits::{DeepValidation, Engine, ProbeError, ProbeResult, SttEngine};
use crate::utils::{find_executable, temp_wav_path};

/// whisper.cpp adapter settings.
#[derive(Debug, Clone)]
pub struct WhisperCppConfig {
    /// CLI executable, bare name (searched on PATH) or full path
    pub executable: PathBuf,
    /// GGML model file
    pub model: PathBuf,
}

impl Default for WhisperCppConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("whisper-cli"),
            model: PathBuf::from("models/ggml-base.bin"),
        }
    }
}

/// Offline speech-to-text via whisper.cpp.
pub struct WhisperCppStt {
    descriptor: EngineDescriptor,
    config: WhisperCppConfig,
    recorder: AudioRecorder,
}

impl WhisperCppStt {
    pub fn new(config: WhisperCppConfig, recorder: AudioRecorder) -> Self {
        Self {
            descriptor: EngineDescriptor::new("whisper_cpp", EngineRole::Stt)
                .with_description("Offline speech-to-text via the whisper.cpp CLI")
                .with_capability(Capability::Offline)
                .with_capability(Capability::MultiLanguage)
                .with_capability(Capability::Subprocess),
            config,
            recorder,
        }
    }

    async fn run_transcription(&self, audio: &Path, language: &str) -> Result<String> {
        let output = Command::new(&self.config.executable)
            .arg("-m")
            .arg(&self.config.model)
            .arg("-f")
            .arg(audio)
            .arg("-l")
            .arg(language)
            .arg("--no-timestamps")
            .output()
            .await
            .map_err(|e| {
                VoiceError::runtime_fault("whisper_cpp", "transcribe", format!("spawn failed: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::runtime_fault(
                "whisper_cpp",
                "transcribe",
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(VoiceError::runtime(
                "whisper_cpp",
                "transcribe",
                "no speech recognized",
            ));
        }

        info!(chars = text.len(), "whisper.cpp transcription complete");
        Ok(text)
    }
}

impl Engine for WhisperCppStt {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        if find_executable(&self.config.executable).is_none() {
            return Err(ProbeError::dependency(
                self.config.executable.display().to_string(),
            ));
        }
        if !self.config.model.is_file() {
            return Err(ProbeError::resource(self.config.model.clone()));
        }
        Ok(())
    }

    fn validate_deep(&self) -> DeepValidation {
        if let Err(err) = self.probe() {
            return DeepValidation::invalid(format!("{err:?}"));
        }
        // actually execute the binary, unlike the fast probe
        match std::process::Command::new(&self.config.executable)
            .arg("--help")
            .output()
        {
            Ok(out) if out.status.success() => {
                DeepValidation::ok("executable runs, model file present")
            }
            Ok(out) => DeepValidation::invalid(format!("--help exited with {}", out.status)),
            Err(e) => DeepValidation::invalid(format!("cannot execute: {e}")),
        }
    }
}

#[async_trait]
impl SttEngine for WhisperCppStt {
    async fn transcribe_file(&self, path: &Path, language: &str) -> Result<String> {
        if !path.exists() {
            return Err(VoiceError::ResourceMissing {
                path: path.to_path_buf(),
            });
        }
        debug!(file = %path.display(), language, "transcribing file with whisper.cpp");
        self.run_transcription(path, language).await
    }

    async fn transcribe_live(&self, duration: Duration, language: &str) -> Result<String> {
        let clip = temp_wav_path("stt");
        let recorder = self.recorder.clone();
        let record_path = clip.clone();

        tokio::task::spawn_blocking(move || recorder.record_to_wav(duration, &record_path))
            .await
            .map_err(|e| VoiceError::internal(format!("recording task failed: {e}")))??;

        let result = self.run_transcription(&clip, language).await;
        let _ = std::fs::remove_file(&clip);
        result
    }
}
