//! Transcription-loop wake word adapter
//!
//! Fallback wake word detection without a dedicated detector library:
//! a background thread records short chunks, transcribes them through the
//! STT chain, and matches the configured keywords in the text. Dedicated
//! detectors (Porcupine and friends) plug in by implementing
//! [`WakeWordEngine`] directly; this adapter keeps wake word detection
//! functional when none of them is installed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::error::{Result, VoiceError};
use crate::engine::descriptor::{Capability, EngineDescriptor, EngineRole};
use crate::engine::traits::{
    Detection, DetectionCallback, Engine, ProbeResult, WakeWordEngine, WakeWordOptions,
    WakeWordSession,
};
use crate::services::Transcriber;

/// Seconds of audio per detection chunk.
const DEFAULT_CHUNK: Duration = Duration::from_secs(2);
/// Backoff after a transcription error, so a dead STT chain is not
/// hammered in a tight loop.
const ERROR_BACKOFF: Duration = Duration::from_secs(2);

/// STT-loop wake word detection.
pub struct TranscriberLoopWakeWord {
    descriptor: EngineDescriptor,
    transcriber: Arc<Transcriber>,
    chunk: Duration,
}

impl TranscriberLoopWakeWord {
    pub fn new(transcriber: Arc<Transcriber>) -> Self {
        Self::with_chunk(transcriber, DEFAULT_CHUNK)
    }

    pub fn with_chunk(transcriber: Arc<Transcriber>, chunk: Duration) -> Self {
        Self {
            descriptor: EngineDescriptor::new("transcriber_loop", EngineRole::WakeWord)
                .with_description("Wake word detection by matching keywords in STT output")
                .with_capability(Capability::Offline),
            transcriber,
            chunk,
        }
    }

    /// Match a keyword in transcribed text.
    ///
    /// The full phrase always matches. At loose sensitivities (> 0.7) a
    /// single distinctive word of the phrase is enough.
    fn matches(transcript: &str, keyword: &str, sensitivity: f32) -> bool {
        let transcript = transcript.to_lowercase();
        let keyword = keyword.to_lowercase();

        if transcript.contains(&keyword) {
            return true;
        }
        if sensitivity > 0.7 {
            return keyword
                .split_whitespace()
                .filter(|word| word.len() > 3)
                .any(|word| transcript.contains(word));
        }
        false
    }
}

impl Engine for TranscriberLoopWakeWord {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        // no dependencies of its own; whether the STT chain can resolve is
        // answered at runtime by the transcriber facade
        Ok(())
    }
}

impl WakeWordEngine for TranscriberLoopWakeWord {
    fn start(
        &self,
        options: &WakeWordOptions,
        on_detect: DetectionCallback,
    ) -> Result<Box<dyn WakeWordSession>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            VoiceError::internal("transcriber_loop requires a running tokio runtime")
        })?;

        let running = Arc::new(AtomicBool::new(true));
        let loop_flag = Arc::clone(&running);
        let transcriber = Arc::clone(&self.transcriber);
        let chunk = self.chunk;
        let keywords = options.keywords.clone();
        let sensitivity = options.sensitivity;

        let handle = std::thread::Builder::new()
            .name("wakeword-loop".to_string())
            .spawn(move || {
                while loop_flag.load(Ordering::Relaxed) {
                    match runtime.block_on(transcriber.transcribe_live(chunk)) {
                        Ok(transcript) => {
                            debug!(transcript = %transcript, "wake word chunk transcribed");
                            for (index, keyword) in keywords.iter().enumerate() {
                                if TranscriberLoopWakeWord::matches(
                                    &transcript,
                                    keyword,
                                    sensitivity,
                                ) {
                                    on_detect(Detection {
                                        keyword: keyword.clone(),
                                        index,
                                    });
                                    break;
                                }
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "wake word transcription failed, backing off");
                            std::thread::sleep(ERROR_BACKOFF);
                        }
                    }
                }
            })
            .map_err(|e| VoiceError::internal(format!("failed to spawn listener: {e}")))?;

        Ok(Box::new(ThreadedSession {
            running,
            handle: Some(handle),
        }))
    }
}

/// Session backed by a joinable listener thread.
///
/// Reusable by any [`WakeWordEngine`] whose listener is a thread loop.
pub struct ThreadedSession {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedSession {
    pub fn new(running: Arc<AtomicBool>, handle: JoinHandle<()>) -> Self {
        Self {
            running,
            handle: Some(handle),
        }
    }
}

impl WakeWordSession for ThreadedSession {
    fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| VoiceError::internal("wake word listener panicked"))?;
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ThreadedSession {
    fn drop(&mut self) {
        // signal only; joining in drop could block an async context
        self.running.store(false, Ordering::Relaxed);
    }
}
