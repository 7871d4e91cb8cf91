//! Microphone capture primitive
//!
//! Bounded-duration recording from the default input device, consumed by
//! live transcription and the wake word loop. Recording blocks the calling
//! thread for the requested duration; cancellation mid-flight is not part
//! of the contract.

use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use tracing::debug;

use crate::core::config::CaptureConfig;
use crate::core::error::{Result, VoiceError};

/// Captured audio, mono, normalized to [-1, 1].
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl RecordedAudio {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Records bounded clips from the default input device.
#[derive(Debug, Clone, Default)]
pub struct AudioRecorder {
    config: CaptureConfig,
}

impl AudioRecorder {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Record for `duration`, downmixed to mono.
    ///
    /// The device's native rate is used when it cannot be opened at the
    /// configured one; the returned [`RecordedAudio`] carries the actual
    /// rate.
    pub fn record(&self, duration: Duration) -> Result<RecordedAudio> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| VoiceError::audio("capture", "no input device available"))?;

        let supported = device
            .default_input_config()
            .map_err(|e| VoiceError::audio("capture", format!("no input config: {e}")))?;

        let channels = supported.channels() as usize;
        let sample_rate = supported.sample_rate().0;
        let format = supported.sample_format();

        debug!(
            requested_rate = self.config.sample_rate,
            device_rate = sample_rate,
            channels,
            "recording from default input device"
        );

        let (tx, rx) = mpsc::channel::<Vec<f32>>();
        let err_fn = |err| debug!(error = %err, "input stream error");

        let stream = match format {
            SampleFormat::F32 => device.build_input_stream(
                &supported.config(),
                move |data: &[f32], _| {
                    let _ = tx.send(data.to_vec());
                },
                err_fn,
                None,
            ),
            SampleFormat::I16 => device.build_input_stream(
                &supported.config(),
                move |data: &[i16], _| {
                    let _ = tx.send(data.iter().map(|&s| s as f32 / 32_768.0).collect());
                },
                err_fn,
                None,
            ),
            SampleFormat::U16 => device.build_input_stream(
                &supported.config(),
                move |data: &[u16], _| {
                    let _ = tx.send(
                        data.iter()
                            .map(|&s| (s as f32 - 32_768.0) / 32_768.0)
                            .collect(),
                    );
                },
                err_fn,
                None,
            ),
            other => {
                return Err(VoiceError::audio(
                    "capture",
                    format!("unsupported input sample format {other:?}"),
                ))
            }
        }
        .map_err(|e| VoiceError::audio("capture", format!("input stream build failed: {e}")))?;

        stream
            .play()
            .map_err(|e| VoiceError::audio("capture", e.to_string()))?;

        let mut interleaved = Vec::with_capacity(sample_rate as usize * channels);
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => interleaved.extend(chunk),
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        drop(stream);

        let samples = if channels > 1 {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        } else {
            interleaved
        };

        Ok(RecordedAudio {
            samples,
            sample_rate,
        })
    }

    /// Record for `duration` and write the clip to a 16-bit WAV file.
    pub fn record_to_wav(&self, duration: Duration, path: &Path) -> Result<()> {
        let recorded = self.record(duration)?;
        write_wav(&recorded.samples, recorded.sample_rate, path)
    }
}

/// Write mono f32 samples to a 16-bit PCM WAV file.
pub fn write_wav(samples: &[f32], sample_rate: u32, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| VoiceError::audio("save", format!("cannot create {}: {e}", path.display())))?;

    for &sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * 32_767.0) as i16;
        writer
            .write_sample(scaled)
            .map_err(|e| VoiceError::audio("save", e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| VoiceError::audio("save", e.to_string()))?;
    Ok(())
}
