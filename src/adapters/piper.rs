//! Piper TTS adapter
//!
//! Fast neural text-to-speech by shelling out to the `piper` executable
//! with per-language ONNX voice models. Text is fed on stdin; the
//! synthesized WAV lands wherever `--output_file` points.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{Capability, EngineDescriptor, EngineRole};
use crate::engine::traits::{AudioHandle, Engine, ProbeError, ProbeResult, TtsEngine, VoiceParams};
use crate::utils::{find_executable, temp_wav_path};

/// Piper adapter settings.
#[derive(Debug, Clone)]
pub struct PiperConfig {
    pub executable: PathBuf,
    /// Directory holding `<voice>.onnx` model files
    pub models_dir: PathBuf,
}

impl Default for PiperConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("piper"),
            models_dir: PathBuf::from("models/piper"),
        }
    }
}

/// Neural text-to-speech via the piper CLI.
pub struct PiperTts {
    descriptor: EngineDescriptor,
    config: PiperConfig,
}

impl PiperTts {
    pub fn new(config: PiperConfig) -> Self {
        Self {
            descriptor: EngineDescriptor::new("piper_tts", EngineRole::Tts)
                .with_description("Fast neural text-to-speech via the piper CLI")
                .with_capability(Capability::Offline)
                .with_capability(Capability::MultiLanguage)
                .with_capability(Capability::Subprocess),
            config,
        }
    }

    fn voice_file(language: &str) -> &'static str {
        match language {
            "id" => "id_ID-fgl-medium.onnx",
            "en" => "en_US-lessac-medium.onnx",
            "es" => "es_ES-mls_10246-low.onnx",
            "fr" => "fr_FR-mls_1840-low.onnx",
            "de" => "de_DE-thorsten_emotional-medium.onnx",
            "it" => "it_IT-riccardo_fasol-x_low.onnx",
            "nl" => "nl_NL-mls_5809-low.onnx",
            _ => "en_US-lessac-medium.onnx",
        }
    }

    /// Model path for a synthesis request: an explicit `voice` parameter
    /// wins over the per-language default.
    fn model_for(&self, language: &str, params: &VoiceParams) -> Result<PathBuf> {
        let file = match &params.voice {
            Some(voice) => format!("{voice}.onnx"),
            None => Self::voice_file(language).to_string(),
        };
        let path = self.config.models_dir.join(file);
        if path.is_file() {
            Ok(path)
        } else {
            Err(VoiceError::ResourceMissing { path })
        }
    }
}

impl Engine for PiperTts {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        if find_executable(&self.config.executable).is_none() {
            return Err(ProbeError::dependency(
                self.config.executable.display().to_string(),
            ));
        }
        if !self.config.models_dir.is_dir() {
            return Err(ProbeError::resource(self.config.models_dir.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl TtsEngine for PiperTts {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        params: &VoiceParams,
    ) -> Result<AudioHandle> {
        let model = self.model_for(language, params)?;
        let output = temp_wav_path("piper");

        debug!(model = %model.display(), chars = text.len(), "synthesizing with piper");

        let mut child = Command::new(&self.config.executable)
            .arg("--model")
            .arg(&model)
            .arg("--output_file")
            .arg(&output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                VoiceError::runtime_fault("piper_tts", "synthesize", format!("spawn failed: {e}"))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(|e| {
                VoiceError::runtime_fault("piper_tts", "synthesize", e.to_string())
            })?;
        }

        let result = child.wait_with_output().await.map_err(|e| {
            VoiceError::runtime_fault("piper_tts", "synthesize", e.to_string())
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VoiceError::runtime_fault(
                "piper_tts",
                "synthesize",
                format!("exited with {}: {}", result.status, stderr.trim()),
            ));
        }

        Ok(AudioHandle::File(output))
    }
}
