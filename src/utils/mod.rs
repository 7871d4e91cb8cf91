//! Small shared helpers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Locate an executable on the search path.
///
/// Absolute or relative paths are checked directly; bare names are
/// searched through `PATH` (with `PATHEXT` extensions on Windows).
pub fn find_executable(program: impl AsRef<Path>) -> Option<PathBuf> {
    let program = program.as_ref();

    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique scratch-file path under the system temp directory.
pub fn temp_wav_path(label: &str) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("voicehub-{}-{}-{}.wav", label, std::process::id(), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_executable_missing() {
        assert!(find_executable("definitely-not-a-real-binary-7f3a").is_none());
    }

    #[test]
    fn test_find_executable_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fake-player");
        std::fs::write(&file, b"#!/bin/sh\n").unwrap();
        assert_eq!(find_executable(&file), Some(file));
    }

    #[test]
    fn test_temp_paths_unique() {
        assert_ne!(temp_wav_path("rec"), temp_wav_path("rec"));
    }
}
