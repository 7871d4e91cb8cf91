//! Audio primitives: playback backends, the backend probe chain, and the
//! bounded microphone capture primitive.

pub mod capture;
pub mod chain;
pub mod playback;

pub use capture::{write_wav, AudioRecorder, RecordedAudio};
pub use chain::{backend_candidates, register_default_backends, BACKEND_PRIORITY};
pub use playback::{CommandBackend, CpalBackend};
