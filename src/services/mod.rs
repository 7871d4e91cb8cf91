//! Per-role service facades
//!
//! The only objects application code depends on. Each facade owns zero or
//! one bound provider through a shared [`binding::RoleBinding`], so the
//! resolution, demotion and retry behavior is identical across roles.

pub mod binding;
pub mod hub;
pub mod playback;
pub mod soundfx;
pub mod speech;
pub mod transcriber;
pub mod wakeword;

pub use binding::RoleBinding;
pub use hub::{ValidationEntry, VoiceHub, VoiceHubBuilder};
pub use playback::Playback;
pub use soundfx::SoundFx;
pub use speech::Speech;
pub use transcriber::Transcriber;
pub use wakeword::WakeWord;
