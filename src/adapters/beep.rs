//! Beep sound effects adapter
//!
//! Synthesizes short sine-tone patterns (with fade envelopes so segment
//! edges don't click) and routes them through the playback facade. Each
//! named effect maps to a fixed tone sequence:
//!
//! - `beep` / `start` / `stop` / `welcome` / `goodbye` — single tone
//! - `success` — ascending triple
//! - `error` — descending triple
//! - `notification` — double beep

use std::sync::Arc;

use async_trait::async_trait;

use crate::audio::capture::write_wav;
use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{Capability, EngineDescriptor, EngineRole};
use crate::engine::traits::{Engine, ProbeResult, SoundFxEngine};
use crate::services::Playback;
use crate::utils::temp_wav_path;

const SAMPLE_RATE: u32 = 22_050;
const FADE_SECS: f32 = 0.01;

/// One tone in an effect pattern.
#[derive(Debug, Clone, Copy)]
struct Tone {
    frequency: f32,
    duration: f32,
}

/// Generate a faded sine tone, normalized to [-1, 1].
fn synthesize_tone(tone: Tone, volume: f32, sample_rate: u32) -> Vec<f32> {
    let count = (sample_rate as f32 * tone.duration) as usize;
    let mut samples: Vec<f32> = (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * tone.frequency * t).sin() * volume
        })
        .collect();

    let fade = ((sample_rate as f32 * FADE_SECS) as usize).min(count / 2);
    for i in 0..fade {
        let gain = i as f32 / fade as f32;
        samples[i] *= gain;
        samples[count - 1 - i] *= gain;
    }
    samples
}

/// Tone-pattern sound effects played through the audio backend chain.
pub struct BeepSoundFx {
    descriptor: EngineDescriptor,
    playback: Arc<Playback>,
    volume: f32,
}

impl BeepSoundFx {
    pub fn new(playback: Arc<Playback>, volume: f32) -> Self {
        Self {
            descriptor: EngineDescriptor::new("beep", EngineRole::SoundFx)
                .with_description("Synthesized beep patterns for audio feedback")
                .with_capability(Capability::Offline)
                .with_capability(Capability::LowLatency),
            playback,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    fn pattern(effect: &str) -> Option<(Vec<Tone>, f32)> {
        let single = |frequency, duration| {
            (
                vec![Tone {
                    frequency,
                    duration,
                }],
                0.0,
            )
        };
        let run = |frequencies: &[f32], duration, gap| {
            (
                frequencies
                    .iter()
                    .map(|&frequency| Tone {
                        frequency,
                        duration,
                    })
                    .collect(),
                gap,
            )
        };

        match effect {
            "beep" => Some(single(800.0, 0.3)),
            "start" => Some(single(600.0, 0.3)),
            "stop" => Some(single(400.0, 0.5)),
            "welcome" => Some(single(800.0, 0.3)),
            "goodbye" => Some(single(500.0, 0.4)),
            "success" => Some(run(&[600.0, 800.0, 1000.0], 0.15, 0.05)),
            "error" => Some(run(&[1000.0, 800.0, 600.0], 0.2, 0.1)),
            "notification" => Some(run(&[800.0, 800.0], 0.2, 0.1)),
            _ => None,
        }
    }

    fn render(effect: &str, volume: f32) -> Option<Vec<f32>> {
        let (tones, gap) = Self::pattern(effect)?;
        let gap_samples = (SAMPLE_RATE as f32 * gap) as usize;

        let mut samples = Vec::new();
        for (i, tone) in tones.iter().enumerate() {
            if i > 0 {
                samples.extend(std::iter::repeat(0.0).take(gap_samples));
            }
            samples.extend(synthesize_tone(*tone, volume, SAMPLE_RATE));
        }
        Some(samples)
    }

    /// Effect names this engine understands.
    pub fn available_effects() -> &'static [&'static str] {
        &[
            "beep",
            "start",
            "stop",
            "welcome",
            "goodbye",
            "success",
            "error",
            "notification",
        ]
    }
}

impl Engine for BeepSoundFx {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        // tone synthesis has no external dependencies; playback
        // availability is the probe chain's question, not this engine's
        Ok(())
    }
}

#[async_trait]
impl SoundFxEngine for BeepSoundFx {
    async fn play(&self, effect: &str) -> Result<()> {
        let samples = Self::render(effect, self.volume).ok_or_else(|| {
            VoiceError::runtime("beep", "play", format!("unknown effect '{effect}'"))
        })?;

        let path = temp_wav_path("fx");
        write_wav(&samples, SAMPLE_RATE, &path)?;
        let played = self.playback.play_file(&path).await;
        let _ = std::fs::remove_file(&path);
        played
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_is_faded_and_clamped() {
        let samples = synthesize_tone(
            Tone {
                frequency: 800.0,
                duration: 0.3,
            },
            0.7,
            SAMPLE_RATE,
        );
        assert!(!samples.is_empty());
        // fade envelope: edges start near silence
        assert!(samples[0].abs() < 0.01);
        assert!(samples[samples.len() - 1].abs() < 0.01);
        assert!(samples.iter().all(|s| s.abs() <= 0.7 + f32::EPSILON));
        // the body actually rings
        assert!(samples.iter().any(|s| s.abs() > 0.5));
    }

    #[test]
    fn test_patterns_cover_all_named_effects() {
        for effect in BeepSoundFx::available_effects() {
            assert!(
                BeepSoundFx::render(effect, 0.5).is_some(),
                "no pattern for '{effect}'"
            );
        }
        assert!(BeepSoundFx::render("airhorn", 0.5).is_none());
    }

    #[test]
    fn test_multi_tone_patterns_include_gaps() {
        let single = BeepSoundFx::render("beep", 0.5).unwrap();
        let triple = BeepSoundFx::render("success", 0.5).unwrap();
        // three 0.15s tones plus two 0.05s gaps outlast one 0.3s beep
        assert!(triple.len() > single.len());
    }
}
