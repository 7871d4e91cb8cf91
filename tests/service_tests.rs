//! Integration tests for the per-role facades: failover, demotion,
//! reload, the wake word session lifecycle and the audio backend probe
//! chain.

mod common;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use common::{CountingBackend, LoopingWake, ProbeScript, ScriptedStt};
use voicehub::{
    Detection, EngineRegistry, EngineRole, EngineSelection, FailureReason, FallbackResolver,
    Playback, Transcriber, VoiceError, VoiceHub, WakeWord, WakeWordConfig,
};

fn selection(primary: &str, fallbacks: &[&str]) -> EngineSelection {
    EngineSelection {
        primary_engine: primary.to_string(),
        fallback_engines: fallbacks.iter().map(|s| s.to_string()).collect(),
        language: "en".to_string(),
        extra: HashMap::new(),
    }
}

fn resolver_over(registry: &Arc<EngineRegistry>) -> Arc<FallbackResolver> {
    Arc::new(FallbackResolver::new(Arc::clone(registry)))
}

#[tokio::test]
async fn test_facade_binds_primary_and_reuses_it() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider("primary", ProbeScript::Ok))
        .unwrap();
    registry
        .register(ScriptedStt::provider("backup", ProbeScript::Ok))
        .unwrap();

    let transcriber = Transcriber::new(
        &selection("primary", &["backup"]),
        resolver_over(&registry),
    );

    for _ in 0..3 {
        let text = transcriber
            .transcribe_file(Path::new("clip.wav"))
            .await
            .unwrap();
        assert_eq!(text, "text from primary");
    }
    assert_eq!(transcriber.bound_engine().await.as_deref(), Some("primary"));
}

/// A provider faulting on its third call is demoted for the rest of the
/// process; the same call is retried once against the next candidate and
/// later calls go straight to it.
#[tokio::test]
async fn test_provider_fault_demotes_and_retries_next_candidate() {
    let registry = Arc::new(EngineRegistry::new());
    let (flaky, flaky_calls) =
        ScriptedStt::faulty_provider("flaky", ProbeScript::Ok, Some(3));
    registry.register(flaky).unwrap();
    registry
        .register(ScriptedStt::provider("backup", ProbeScript::Ok))
        .unwrap();

    let resolver = resolver_over(&registry);
    let transcriber = Transcriber::new(&selection("flaky", &["backup"]), Arc::clone(&resolver));

    // two healthy calls against the primary
    for _ in 0..2 {
        assert_eq!(
            transcriber
                .transcribe_file(Path::new("clip.wav"))
                .await
                .unwrap(),
            "text from flaky"
        );
    }

    // the third call faults, is demoted, and the retry lands on the backup
    assert_eq!(
        transcriber
            .transcribe_file(Path::new("clip.wav"))
            .await
            .unwrap(),
        "text from backup"
    );

    // the flaky engine is never tried again in this process lifetime
    assert_eq!(
        transcriber
            .transcribe_file(Path::new("clip.wav"))
            .await
            .unwrap(),
        "text from backup"
    );
    assert_eq!(flaky_calls.load(Ordering::SeqCst), 3);
    assert_eq!(transcriber.bound_engine().await.as_deref(), Some("backup"));

    // demotion is visible in the resolution record
    let record = transcriber.status().unwrap();
    assert_eq!(
        record.failure_reason("flaky"),
        Some(&FailureReason::Demoted)
    );
}

/// Transient errors surface to the caller without demoting the provider;
/// the same engine serves the next call.
#[tokio::test]
async fn test_transient_error_does_not_demote() {
    let registry = Arc::new(EngineRegistry::new());
    let (primary, _) = ScriptedStt::transient_provider("primary", ProbeScript::Ok, 2);
    registry.register(primary).unwrap();
    registry
        .register(ScriptedStt::provider("backup", ProbeScript::Ok))
        .unwrap();

    let transcriber = Transcriber::new(&selection("primary", &["backup"]), resolver_over(&registry));

    assert_eq!(
        transcriber
            .transcribe_file(Path::new("clip.wav"))
            .await
            .unwrap(),
        "text from primary"
    );

    // the second call fails with bad-input semantics and is not retried
    let err = transcriber
        .transcribe_file(Path::new("clip.wav"))
        .await
        .unwrap_err();
    assert!(!err.is_provider_fault());

    // no demotion happened: the primary still serves the next call
    assert_eq!(
        transcriber
            .transcribe_file(Path::new("clip.wav"))
            .await
            .unwrap(),
        "text from primary"
    );
    assert_eq!(transcriber.bound_engine().await.as_deref(), Some("primary"));
}

/// With no usable candidate the facade fails with the full audit trail,
/// keeps failing fast without re-probing, and recovers after reload once
/// an engine appears.
#[tokio::test]
async fn test_unavailable_until_reload() {
    let registry = Arc::new(EngineRegistry::new());
    let resolver = resolver_over(&registry);
    let transcriber = Transcriber::new(
        &selection("whisper_cpp", &["google_stt"]),
        Arc::clone(&resolver),
    );

    let err = transcriber
        .transcribe_file(Path::new("clip.wav"))
        .await
        .unwrap_err();
    match &err {
        VoiceError::EngineUnavailable { role, record } => {
            assert_eq!(*role, EngineRole::Stt);
            assert_eq!(record.failures.len(), 2);
            assert_eq!(
                record.failure_reason("whisper_cpp"),
                Some(&FailureReason::NotRegistered)
            );
        }
        other => panic!("expected EngineUnavailable, got {other:?}"),
    }

    // still unavailable, reported from the cached record
    assert!(matches!(
        transcriber
            .transcribe_file(Path::new("clip.wav"))
            .await
            .unwrap_err(),
        VoiceError::EngineUnavailable { .. }
    ));

    // an engine gets installed; only reload makes it eligible
    registry
        .register(ScriptedStt::provider("google_stt", ProbeScript::Ok))
        .unwrap();
    let record = transcriber.reload().await;
    assert_eq!(record.selected.as_deref(), Some("google_stt"));
    assert_eq!(
        transcriber
            .transcribe_file(Path::new("clip.wav"))
            .await
            .unwrap(),
        "text from google_stt"
    );
}

fn wake_config(primary: &str) -> WakeWordConfig {
    WakeWordConfig {
        enabled: true,
        primary_engine: primary.to_string(),
        fallback_engines: Vec::new(),
        keywords: vec!["hey assistant".to_string()],
        sensitivity: 0.5,
    }
}

#[tokio::test]
async fn test_wakeword_detection_fires_callback() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(LoopingWake::provider("looping", false, true))
        .unwrap();

    let wakeword = WakeWord::new(&wake_config("looping"), resolver_over(&registry));

    let (tx, rx) = mpsc::channel();
    let callback = Arc::new(move |detection: Detection| {
        let _ = tx.send(detection);
    });

    wakeword.start(callback).await.unwrap();
    let detection = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(detection.keyword, "hey assistant");
    assert_eq!(detection.index, 0);

    wakeword.stop().await.unwrap();
    assert!(!wakeword.is_listening().await);
}

/// stop() is idempotent: twice in a row, and after the listener already
/// exited on its own, it returns cleanly.
#[tokio::test]
async fn test_wakeword_stop_is_idempotent() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(LoopingWake::provider("looping", false, false))
        .unwrap();

    let wakeword = WakeWord::new(&wake_config("looping"), resolver_over(&registry));
    let callback = Arc::new(|_: Detection| {});

    wakeword.start(callback).await.unwrap();
    assert!(wakeword.is_listening().await);

    wakeword.stop().await.unwrap();
    wakeword.stop().await.unwrap();
    assert!(!wakeword.is_listening().await);
}

#[tokio::test]
async fn test_wakeword_stop_after_listener_self_terminated() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(LoopingWake::provider("self_exit", true, false))
        .unwrap();

    let wakeword = WakeWord::new(&wake_config("self_exit"), resolver_over(&registry));
    wakeword.start(Arc::new(|_: Detection| {})).await.unwrap();

    // give the listener time to exit on its own
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!wakeword.is_listening().await);

    wakeword.stop().await.unwrap();
    wakeword.stop().await.unwrap();
}

/// Probe chain: with only the third backend present, playback resolves
/// through it, and subsequent calls reuse the binding without re-probing
/// entries one and two.
#[tokio::test]
async fn test_probe_chain_caches_resolution() {
    let registry = Arc::new(EngineRegistry::new());
    let (cpal, cpal_counters) = CountingBackend::provider("cpal", false, false);
    let (ffplay, ffplay_counters) = CountingBackend::provider("ffplay", false, false);
    let (aplay, aplay_counters) = CountingBackend::provider("aplay", true, false);
    registry.register(cpal).unwrap();
    registry.register(ffplay).unwrap();
    registry.register(aplay).unwrap();

    let playback = Playback::new(resolver_over(&registry));

    playback.play_file(Path::new("chime.wav")).await.unwrap();
    assert_eq!(playback.bound_backend().await.as_deref(), Some("aplay"));
    assert_eq!(cpal_counters.probes.load(Ordering::SeqCst), 1);
    assert_eq!(ffplay_counters.probes.load(Ordering::SeqCst), 1);
    assert_eq!(aplay_counters.plays.load(Ordering::SeqCst), 1);

    playback.play_file(Path::new("chime.wav")).await.unwrap();
    playback.play_file(Path::new("chime.wav")).await.unwrap();

    // no re-probing of the earlier entries once the chain is bound
    assert_eq!(cpal_counters.probes.load(Ordering::SeqCst), 1);
    assert_eq!(ffplay_counters.probes.load(Ordering::SeqCst), 1);
    assert_eq!(aplay_counters.plays.load(Ordering::SeqCst), 3);
}

/// A backend that fails at playback time is demoted for the rest of the
/// process and the next candidate takes over within the same call.
#[tokio::test]
async fn test_probe_chain_demotes_failing_backend() {
    let registry = Arc::new(EngineRegistry::new());
    let (aplay, aplay_counters) = CountingBackend::provider("aplay", true, true);
    let (paplay, paplay_counters) = CountingBackend::provider("paplay", true, false);
    registry.register(aplay).unwrap();
    registry.register(paplay).unwrap();

    let playback = Playback::new(resolver_over(&registry));

    playback.play_file(Path::new("chime.wav")).await.unwrap();
    assert_eq!(aplay_counters.plays.load(Ordering::SeqCst), 1);
    assert_eq!(paplay_counters.plays.load(Ordering::SeqCst), 1);
    assert_eq!(playback.bound_backend().await.as_deref(), Some("paplay"));

    let record = playback.status().unwrap();
    assert_eq!(
        record.failure_reason("aplay"),
        Some(&FailureReason::Demoted)
    );
}

/// The hub wires every built-in engine; deep validation covers each
/// registered (role, name) pair and resolution state starts empty.
#[tokio::test]
async fn test_hub_default_wiring() {
    let hub = VoiceHub::builder().with_default_engines().build().unwrap();

    // nothing resolved before the first call or reload
    for role in EngineRole::ALL {
        assert!(hub.status(role).is_none());
    }

    let entries = hub.validate_all();
    let registered: usize = EngineRole::ALL
        .iter()
        .map(|&role| hub.registry().count(role))
        .sum();
    assert_eq!(entries.len(), registered);
    assert!(entries
        .iter()
        .any(|e| e.role == EngineRole::Stt && e.name == "whisper_cpp"));
    assert!(entries
        .iter()
        .any(|e| e.role == EngineRole::AudioBackend && e.name == "cpal"));
}
