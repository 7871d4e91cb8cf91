//! eSpeak NG TTS adapter
//!
//! Formant synthesis via the `espeak-ng` executable. Robotic but
//! dependency-light; its place in the fallback list is "always have
//! something that can speak".

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{Capability, EngineDescriptor, EngineRole};
use crate::engine::traits::{AudioHandle, Engine, ProbeError, ProbeResult, TtsEngine, VoiceParams};
use crate::utils::{find_executable, temp_wav_path};

const DEFAULT_WPM: f32 = 175.0;

/// Formant text-to-speech via eSpeak NG.
pub struct EspeakNgTts {
    descriptor: EngineDescriptor,
    executable: PathBuf,
}

impl EspeakNgTts {
    pub fn new() -> Self {
        Self::with_executable(PathBuf::from("espeak-ng"))
    }

    pub fn with_executable(executable: PathBuf) -> Self {
        Self {
            descriptor: EngineDescriptor::new("espeak_ng", EngineRole::Tts)
                .with_description("Formant text-to-speech via eSpeak NG")
                .with_capability(Capability::Offline)
                .with_capability(Capability::MultiLanguage)
                .with_capability(Capability::LowLatency)
                .with_capability(Capability::Subprocess),
            executable,
        }
    }
}

impl Default for EspeakNgTts {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for EspeakNgTts {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        match find_executable(&self.executable) {
            Some(_) => Ok(()),
            None => Err(ProbeError::dependency(
                self.executable.display().to_string(),
            )),
        }
    }
}

#[async_trait]
impl TtsEngine for EspeakNgTts {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        params: &VoiceParams,
    ) -> Result<AudioHandle> {
        let output = temp_wav_path("espeak");
        let voice = params.voice.as_deref().unwrap_or(language);
        let wpm = (params.speed.unwrap_or(1.0) * DEFAULT_WPM).round() as u32;

        let mut command = Command::new(&self.executable);
        command
            .arg("-v")
            .arg(voice)
            .arg("-s")
            .arg(wpm.to_string())
            .arg("-w")
            .arg(&output);
        if let Some(volume) = params.volume {
            // espeak amplitude range is 0..=200 with 100 as the default
            let amplitude = (volume.clamp(0.0, 1.0) * 200.0).round() as u32;
            command.arg("-a").arg(amplitude.to_string());
        }

        let result = command.arg(text).output().await.map_err(|e| {
            VoiceError::runtime_fault("espeak_ng", "synthesize", format!("spawn failed: {e}"))
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VoiceError::runtime_fault(
                "espeak_ng",
                "synthesize",
                format!("exited with {}: {}", result.status, stderr.trim()),
            ));
        }

        Ok(AudioHandle::File(output))
    }
}
