//! Google Web Speech STT adapter
//!
//! Online transcription through the Google web speech endpoint. The
//! request carries raw LINEAR16 audio; the response is a stream of JSON
//! lines of which the first non-empty one holds the transcript.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::audio::capture::AudioRecorder;
use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{Capability, EngineDescriptor, EngineRole};
use crate::engine::traits::{Engine, ProbeError, ProbeResult, SttEngine};

const DEFAULT_ENDPOINT: &str = "http://www.google.com/speech-api/v2/recognize";

/// Google STT adapter settings.
#[derive(Debug, Clone)]
pub struct GoogleSttConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GoogleSttConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Online speech-to-text via the Google web speech API.
pub struct GoogleStt {
    descriptor: EngineDescriptor,
    config: GoogleSttConfig,
    client: reqwest::Client,
    recorder: AudioRecorder,
}

impl GoogleStt {
    pub fn new(config: GoogleSttConfig, recorder: AudioRecorder) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self {
            descriptor: EngineDescriptor::new("google_stt", EngineRole::Stt)
                .with_description("Online speech-to-text via the Google web speech API")
                .with_capability(Capability::Online)
                .with_capability(Capability::MultiLanguage),
            config,
            client,
            recorder,
        }
    }

    fn wav_to_linear16(path: &Path) -> Result<(Vec<u8>, u32)> {
        let mut reader = hound::WavReader::open(path).map_err(|e| {
            VoiceError::runtime("google_stt", "transcribe", format!("cannot read WAV: {e}"))
        })?;
        let spec = reader.spec();

        let mut bytes = Vec::with_capacity(reader.len() as usize * 2);
        match spec.sample_format {
            hound::SampleFormat::Int => {
                for sample in reader.samples::<i16>() {
                    let sample = sample.map_err(|e| {
                        VoiceError::runtime("google_stt", "transcribe", e.to_string())
                    })?;
                    bytes.extend_from_slice(&sample.to_le_bytes());
                }
            }
            hound::SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    let sample = sample.map_err(|e| {
                        VoiceError::runtime("google_stt", "transcribe", e.to_string())
                    })?;
                    let scaled = (sample.clamp(-1.0, 1.0) * 32_767.0) as i16;
                    bytes.extend_from_slice(&scaled.to_le_bytes());
                }
            }
        }
        Ok((bytes, spec.sample_rate))
    }

    /// Responses are JSON lines; the transcript lives at
    /// `result[0].alternative[0].transcript` of the first line that has one.
    fn parse_response(body: &str) -> Option<String> {
        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
                continue;
            };
            if let Some(transcript) = value
                .get("result")
                .and_then(|r| r.get(0))
                .and_then(|r| r.get("alternative"))
                .and_then(|a| a.get(0))
                .and_then(|a| a.get("transcript"))
                .and_then(|t| t.as_str())
            {
                return Some(transcript.to_string());
            }
        }
        None
    }

    async fn recognize(&self, audio: Vec<u8>, sample_rate: u32, language: &str) -> Result<String> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| VoiceError::DependencyMissing {
                name: "google_stt api key".to_string(),
            })?;

        let url = format!(
            "{}?client=chromium&lang={}&key={}",
            self.config.endpoint, language, key
        );

        debug!(bytes = audio.len(), sample_rate, "sending audio to google stt");

        let response = self
            .client
            .post(&url)
            .header(
                "Content-Type",
                format!("audio/l16; rate={sample_rate}"),
            )
            .body(audio)
            .send()
            .await
            .map_err(|e| {
                VoiceError::runtime_fault("google_stt", "transcribe", format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(VoiceError::runtime_fault(
                "google_stt",
                "transcribe",
                format!("endpoint returned {}", response.status()),
            ));
        }

        let body = response.text().await.map_err(|e| {
            VoiceError::runtime_fault("google_stt", "transcribe", e.to_string())
        })?;

        Self::parse_response(&body).ok_or_else(|| {
            VoiceError::runtime("google_stt", "transcribe", "no speech recognized")
        })
    }
}

impl Engine for GoogleStt {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        // no network traffic during probing; key presence is the check
        match self.config.api_key {
            Some(_) => Ok(()),
            None => Err(ProbeError::dependency("google_stt api key")),
        }
    }
}

#[async_trait]
impl SttEngine for GoogleStt {
    async fn transcribe_file(&self, path: &Path, language: &str) -> Result<String> {
        if !path.exists() {
            return Err(VoiceError::ResourceMissing {
                path: path.to_path_buf(),
            });
        }
        let (audio, sample_rate) = Self::wav_to_linear16(path)?;
        self.recognize(audio, sample_rate, language).await
    }

    async fn transcribe_live(&self, duration: Duration, language: &str) -> Result<String> {
        let recorder = self.recorder.clone();
        let clip = tokio::task::spawn_blocking(move || recorder.record(duration))
            .await
            .map_err(|e| VoiceError::internal(format!("recording task failed: {e}")))??;

        let mut bytes = Vec::with_capacity(clip.samples.len() * 2);
        for &sample in &clip.samples {
            let scaled = (sample.clamp(-1.0, 1.0) * 32_767.0) as i16;
            bytes.extend_from_slice(&scaled.to_le_bytes());
        }
        self.recognize(bytes, clip.sample_rate, language).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_requires_api_key() {
        let engine = GoogleStt::new(GoogleSttConfig::default(), AudioRecorder::default());
        assert_eq!(
            engine.probe(),
            Err(ProbeError::dependency("google_stt api key"))
        );

        let with_key = GoogleStt::new(
            GoogleSttConfig {
                api_key: Some("k".to_string()),
                ..GoogleSttConfig::default()
            },
            AudioRecorder::default(),
        );
        assert!(with_key.probe().is_ok());
    }

    #[test]
    fn test_parse_response_skips_empty_lines() {
        let body = concat!(
            "{\"result\":[]}\n",
            "{\"result\":[{\"alternative\":[{\"transcript\":\"halo asisten\",",
            "\"confidence\":0.92}],\"final\":true}],\"result_index\":0}\n",
        );
        assert_eq!(
            GoogleStt::parse_response(body),
            Some("halo asisten".to_string())
        );
    }

    #[test]
    fn test_parse_response_without_transcript() {
        assert_eq!(GoogleStt::parse_response("{\"result\":[]}"), None);
        assert_eq!(GoogleStt::parse_response(""), None);
    }
}
