//! Integration tests for registry + validator + resolver ordering,
//! audit records and determinism.

mod common;

use std::sync::Arc;

use common::{ProbeScript, ScriptedStt};
use voicehub::{
    candidate_order, EngineRegistry, EngineRole, FailureReason, FallbackResolver, VoiceError,
};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// If the primary is registered and valid, it wins regardless of fallback
/// validity.
#[test]
fn test_valid_primary_always_selected() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider("primary", ProbeScript::Ok))
        .unwrap();
    registry
        .register(ScriptedStt::provider(
            "fallback_bad",
            ProbeScript::MissingDependency("libfoo"),
        ))
        .unwrap();
    registry
        .register(ScriptedStt::provider("fallback_good", ProbeScript::Ok))
        .unwrap();

    let resolver = FallbackResolver::new(registry);
    let (record, provider) = resolver.resolve(
        EngineRole::Stt,
        &names(&["primary", "fallback_bad", "fallback_good"]),
    );

    assert_eq!(record.selected.as_deref(), Some("primary"));
    assert_eq!(provider.unwrap().name(), "primary");
    assert!(record.failures.is_empty());
}

/// An invalid primary falls through to the first valid fallback, and the
/// record shows why the primary was skipped.
#[test]
fn test_invalid_primary_falls_back() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider(
            "primary",
            ProbeScript::MissingResource("models/ggml-base.bin"),
        ))
        .unwrap();
    registry
        .register(ScriptedStt::provider("fallback", ProbeScript::Ok))
        .unwrap();

    let resolver = FallbackResolver::new(registry);
    let (record, provider) = resolver.resolve(EngineRole::Stt, &names(&["primary", "fallback"]));

    assert_eq!(record.selected.as_deref(), Some("fallback"));
    assert_eq!(provider.unwrap().name(), "fallback");
    assert!(matches!(
        record.failure_reason("primary"),
        Some(FailureReason::ResourceMissing(path)) if path.contains("ggml-base.bin")
    ));
}

/// When every candidate fails, the record holds exactly one failure per
/// candidate, in attempted order.
#[test]
fn test_exhausted_resolution_records_all_failures_in_order() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider(
            "p",
            ProbeScript::MissingDependency("libp"),
        ))
        .unwrap();
    registry
        .register(ScriptedStt::provider(
            "f1",
            ProbeScript::MissingDependency("libf1"),
        ))
        .unwrap();
    registry
        .register(ScriptedStt::provider(
            "f2",
            ProbeScript::MissingResource("voice.onnx"),
        ))
        .unwrap();

    let resolver = FallbackResolver::new(registry);
    let (record, provider) = resolver.resolve(EngineRole::Stt, &names(&["p", "f1", "f2"]));

    assert!(provider.is_none());
    assert!(record.is_failure());
    assert_eq!(record.failures.len(), 3);
    let attempted: Vec<&str> = record.failures.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(attempted, vec!["p", "f1", "f2"]);
}

/// Unregistered candidates are skipped, not fatal, unless all candidates
/// are exhausted. Mirrors the mms_tts/coqui_tts/piper_tts scenario.
#[test]
fn test_unregistered_candidates_are_skipped() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider("piper_tts", ProbeScript::Ok))
        .unwrap();

    let resolver = FallbackResolver::new(registry);
    let (record, provider) = resolver.resolve(
        EngineRole::Stt,
        &names(&["mms_tts", "coqui_tts", "piper_tts"]),
    );

    assert_eq!(record.selected.as_deref(), Some("piper_tts"));
    assert_eq!(provider.unwrap().name(), "piper_tts");
    assert_eq!(
        record.failure_reason("mms_tts"),
        Some(&FailureReason::NotRegistered)
    );
    assert_eq!(
        record.failure_reason("coqui_tts"),
        Some(&FailureReason::NotRegistered)
    );
}

/// Resolving the same configuration twice over an unchanged environment
/// yields an identical record.
#[test]
fn test_resolution_is_deterministic() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider(
            "p",
            ProbeScript::MissingDependency("libp"),
        ))
        .unwrap();
    registry
        .register(ScriptedStt::provider("f1", ProbeScript::Ok))
        .unwrap();

    let resolver = FallbackResolver::new(registry);
    let candidates = names(&["p", "f1"]);
    let (first, _) = resolver.resolve(EngineRole::Stt, &candidates);
    let (second, _) = resolver.resolve(EngineRole::Stt, &candidates);

    assert_eq!(first, second);
}

/// A primary repeated in the fallback list is tolerated; the duplicate is
/// collapsed keeping the first occurrence.
#[test]
fn test_duplicate_candidates_collapsed() {
    let ordered = candidate_order(
        "whisper_cpp",
        &names(&["google_stt", "whisper_cpp", "google_stt"]),
    );
    assert_eq!(ordered, names(&["whisper_cpp", "google_stt"]));

    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider(
            "whisper_cpp",
            ProbeScript::MissingDependency("whisper-cli"),
        ))
        .unwrap();

    let resolver = FallbackResolver::new(registry);
    let (record, _) = resolver.resolve(
        EngineRole::Stt,
        &names(&["whisper_cpp", "whisper_cpp", "google_stt"]),
    );

    // each candidate appears once in the audit trail
    assert_eq!(record.attempted, names(&["whisper_cpp", "google_stt"]));
    assert_eq!(record.failures.len(), 2);
}

/// Hung probes are cut off by the validator budget and recorded as
/// timeouts; resolution proceeds to the next candidate.
#[test]
fn test_hung_probe_does_not_block_resolution() {
    use std::time::Duration;
    use voicehub::Validator;

    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider(
            "hung",
            ProbeScript::Hang(Duration::from_secs(30)),
        ))
        .unwrap();
    registry
        .register(ScriptedStt::provider("healthy", ProbeScript::Ok))
        .unwrap();

    let resolver = FallbackResolver::with_validator(
        registry,
        Validator::with_timeout(Duration::from_millis(100)),
    );

    let start = std::time::Instant::now();
    let (record, provider) = resolver.resolve(EngineRole::Stt, &names(&["hung", "healthy"]));

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(record.selected.as_deref(), Some("healthy"));
    assert!(provider.is_some());
    assert_eq!(record.failure_reason("hung"), Some(&FailureReason::Timeout));
}

/// DuplicateName is fatal to the registration, not to the process, and
/// the original entry keeps working.
#[test]
fn test_duplicate_registration_preserves_original() {
    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider("whisper_cpp", ProbeScript::Ok))
        .unwrap();

    let err = registry
        .register(ScriptedStt::provider(
            "whisper_cpp",
            ProbeScript::MissingDependency("impostor"),
        ))
        .unwrap_err();
    assert!(matches!(err, VoiceError::DuplicateName { .. }));

    let resolver = FallbackResolver::new(registry);
    let (record, _) = resolver.resolve(EngineRole::Stt, &names(&["whisper_cpp"]));
    assert_eq!(record.selected.as_deref(), Some("whisper_cpp"));
}

/// The resolver keeps a bounded history and `last_record` tracks the most
/// recent attempt.
#[test]
fn test_record_history_is_bounded() {
    use voicehub::RECORD_HISTORY_LIMIT;

    let registry = Arc::new(EngineRegistry::new());
    registry
        .register(ScriptedStt::provider("only", ProbeScript::Ok))
        .unwrap();

    let resolver = FallbackResolver::new(registry);
    for _ in 0..(RECORD_HISTORY_LIMIT + 4) {
        resolver.resolve(EngineRole::Stt, &names(&["only"]));
    }

    assert_eq!(resolver.history(EngineRole::Stt).len(), RECORD_HISTORY_LIMIT);
    assert_eq!(
        resolver
            .last_record(EngineRole::Stt)
            .unwrap()
            .selected
            .as_deref(),
        Some("only")
    );
}
