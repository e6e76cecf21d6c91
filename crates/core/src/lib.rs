//! Core library for the Limbo key-shuffle puzzle.
//!
//! Eight identical keys sit in a 4x2 grid. A scripted [`Timeline`] plays
//! [`Effect`]s back to back; each effect animates the keys and, when it
//! finishes, commits a [`Permutation`] to the scene's identity→slot map. The
//! audience follows one key and picks it at the end.
//!
//! Rendering, audio and textures are host concerns reached through the
//! [`render::Canvas`], [`audio::AudioBackend`] and [`assets::TextureLoader`]
//! traits, so the whole show can run headless.

pub mod assets;
pub mod audio;
pub mod config;
pub mod easing;
pub mod effect;
pub mod error;
pub mod input;
pub mod permutation;
pub mod render;
pub mod scene;
pub mod script;
pub mod show;
pub mod timeline;

pub use assets::{AssetStore, TextureHandle, TextureLoader};
pub use audio::{AudioBackend, Cue, SilentAudio, SoundBank};
pub use config::{AppConfig, AudioConfig, ShowConfig};
pub use effect::{Effect, EffectKind, Outcome, Spin, Stage};
pub use error::{LimboError, Result};
pub use input::{Action, InputState, PointerButton};
pub use permutation::{FourCycle, Permutation, SlotMap, KEY_COUNT};
pub use render::{Canvas, RecordingCanvas};
pub use scene::{Scene, Tone};
pub use script::{Script, Tempo};
pub use show::Show;
pub use timeline::{PlaybackClock, Timeline};
