//! Shared mock engines for integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use voicehub::adapters::ThreadedSession;
use voicehub::{
    AudioBackend, Detection, DetectionCallback, Engine, EngineDescriptor, EngineProvider,
    EngineRole, ProbeError, ProbeResult, Result, SttEngine, VoiceError, WakeWordEngine,
    WakeWordOptions, WakeWordSession,
};

/// Probe behavior for scripted engines.
#[derive(Debug, Clone)]
pub enum ProbeScript {
    Ok,
    MissingDependency(&'static str),
    MissingResource(&'static str),
    Hang(Duration),
}

fn run_probe(script: &ProbeScript) -> ProbeResult {
    match script {
        ProbeScript::Ok => Ok(()),
        ProbeScript::MissingDependency(name) => Err(ProbeError::dependency(*name)),
        ProbeScript::MissingResource(path) => Err(ProbeError::resource(*path)),
        ProbeScript::Hang(duration) => {
            std::thread::sleep(*duration);
            Ok(())
        }
    }
}

/// STT engine with scripted probe and call behavior.
pub struct ScriptedStt {
    descriptor: EngineDescriptor,
    probe: ProbeScript,
    /// 1-based call number at which the engine starts faulting
    fail_from_call: Option<u32>,
    /// 1-based call number that fails once with a transient error
    transient_on_call: Option<u32>,
    calls: Arc<AtomicU32>,
}

impl ScriptedStt {
    pub fn provider(name: &str, probe: ProbeScript) -> EngineProvider {
        Self::faulty_provider(name, probe, None).0
    }

    /// Returns the provider plus its shared call counter.
    pub fn faulty_provider(
        name: &str,
        probe: ProbeScript,
        fail_from_call: Option<u32>,
    ) -> (EngineProvider, Arc<AtomicU32>) {
        Self::scripted(name, probe, fail_from_call, None)
    }

    /// Provider whose nth call fails once with a transient (non-fault) error.
    pub fn transient_provider(
        name: &str,
        probe: ProbeScript,
        transient_on_call: u32,
    ) -> (EngineProvider, Arc<AtomicU32>) {
        Self::scripted(name, probe, None, Some(transient_on_call))
    }

    fn scripted(
        name: &str,
        probe: ProbeScript,
        fail_from_call: Option<u32>,
        transient_on_call: Option<u32>,
    ) -> (EngineProvider, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let provider = EngineProvider::Stt(Arc::new(ScriptedStt {
            descriptor: EngineDescriptor::new(name, EngineRole::Stt),
            probe,
            fail_from_call,
            transient_on_call,
            calls: Arc::clone(&calls),
        }));
        (provider, calls)
    }

    fn answer(&self) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(threshold) = self.fail_from_call {
            if call >= threshold {
                return Err(VoiceError::runtime_fault(
                    &self.descriptor.name,
                    "transcribe",
                    format!("scripted fault on call {call}"),
                ));
            }
        }
        if self.transient_on_call == Some(call) {
            return Err(VoiceError::runtime(
                &self.descriptor.name,
                "transcribe",
                "scripted transient failure",
            ));
        }
        Ok(format!("text from {}", self.descriptor.name))
    }
}

impl Engine for ScriptedStt {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        run_probe(&self.probe)
    }
}

#[async_trait]
impl SttEngine for ScriptedStt {
    async fn transcribe_file(&self, _path: &Path, _language: &str) -> Result<String> {
        self.answer()
    }

    async fn transcribe_live(&self, _duration: Duration, _language: &str) -> Result<String> {
        self.answer()
    }
}

/// Playback backend with counted probes and plays.
pub struct CountingBackend {
    descriptor: EngineDescriptor,
    available: bool,
    fail_plays: bool,
    pub probes: Arc<AtomicU32>,
    pub plays: Arc<AtomicU32>,
}

pub struct BackendCounters {
    pub probes: Arc<AtomicU32>,
    pub plays: Arc<AtomicU32>,
}

impl CountingBackend {
    pub fn provider(name: &str, available: bool, fail_plays: bool) -> (EngineProvider, BackendCounters) {
        let probes = Arc::new(AtomicU32::new(0));
        let plays = Arc::new(AtomicU32::new(0));
        let provider = EngineProvider::AudioBackend(Arc::new(CountingBackend {
            descriptor: EngineDescriptor::new(name, EngineRole::AudioBackend),
            available,
            fail_plays,
            probes: Arc::clone(&probes),
            plays: Arc::clone(&plays),
        }));
        (provider, BackendCounters { probes, plays })
    }
}

impl Engine for CountingBackend {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.available {
            Ok(())
        } else {
            Err(ProbeError::dependency(self.descriptor.name.clone()))
        }
    }
}

impl AudioBackend for CountingBackend {
    fn play_file(&self, _path: &Path) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail_plays {
            Err(VoiceError::runtime_fault(
                &self.descriptor.name,
                "play_file",
                "scripted playback failure",
            ))
        } else {
            Ok(())
        }
    }
}

/// Wake word engine whose listener is a plain loop thread.
pub struct LoopingWake {
    descriptor: EngineDescriptor,
    /// Exit immediately instead of looping (self-terminating listener)
    exit_immediately: bool,
    /// Fire one detection as soon as the listener starts
    detect_once: bool,
}

impl LoopingWake {
    pub fn provider(name: &str, exit_immediately: bool, detect_once: bool) -> EngineProvider {
        EngineProvider::WakeWord(Arc::new(LoopingWake {
            descriptor: EngineDescriptor::new(name, EngineRole::WakeWord),
            exit_immediately,
            detect_once,
        }))
    }
}

impl Engine for LoopingWake {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn probe(&self) -> ProbeResult {
        Ok(())
    }
}

impl WakeWordEngine for LoopingWake {
    fn start(
        &self,
        options: &WakeWordOptions,
        on_detect: DetectionCallback,
    ) -> Result<Box<dyn WakeWordSession>> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let keyword = options.keywords.first().cloned().unwrap_or_default();
        let exit_immediately = self.exit_immediately;
        let detect_once = self.detect_once;

        let handle = std::thread::spawn(move || {
            if detect_once {
                on_detect(Detection { keyword, index: 0 });
            }
            if exit_immediately {
                return;
            }
            while flag.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(5));
            }
        });

        Ok(Box::new(ThreadedSession::new(running, handle)))
    }
}
