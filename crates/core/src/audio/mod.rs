use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{config::AudioConfig, LimboError, Result};

/// Opaque sound id handed out by the host's audio engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub u32);

/// Host audio engine. Every call is fire-and-forget.
pub trait AudioBackend {
    fn load(&mut self, path: &str) -> Result<SoundId>;
    fn play(&mut self, sound: SoundId);
    fn stop(&mut self, sound: SoundId);
    fn set_pitch(&mut self, sound: SoundId, pitch: f32);
    fn seek(&mut self, sound: SoundId, sample: u64);
}

/// Named sounds the show triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Music,
    Tick,
    Go,
    Reveal,
}

/// High level audio façade: resolves cues to loaded sounds. Cues whose sound
/// failed to load are silent.
pub struct SoundBank {
    backend: Box<dyn AudioBackend>,
    cues: HashMap<Cue, SoundId>,
    sample_rate: u32,
}

impl SoundBank {
    pub fn load(mut backend: Box<dyn AudioBackend>, config: &AudioConfig) -> Self {
        let mut cues = HashMap::new();
        let paths = [
            (Cue::Music, &config.music),
            (Cue::Tick, &config.tick),
            (Cue::Go, &config.go),
            (Cue::Reveal, &config.reveal),
        ];
        for (cue, path) in paths {
            match backend.load(path) {
                Ok(sound) => {
                    cues.insert(cue, sound);
                }
                Err(err) => tracing::warn!(%err, ?cue, "sound unavailable, cue will be silent"),
            }
        }
        Self {
            backend,
            cues,
            sample_rate: config.sample_rate,
        }
    }

    /// Bank with no sounds at all.
    pub fn silent() -> Self {
        Self {
            backend: Box::new(SilentAudio::default()),
            cues: HashMap::new(),
            sample_rate: 48_000,
        }
    }

    pub fn has(&self, cue: Cue) -> bool {
        self.cues.contains_key(&cue)
    }

    pub fn play(&mut self, cue: Cue) {
        if let Some(&sound) = self.cues.get(&cue) {
            self.backend.play(sound);
        }
    }

    pub fn stop(&mut self, cue: Cue) {
        if let Some(&sound) = self.cues.get(&cue) {
            self.backend.stop(sound);
        }
    }

    pub fn set_pitch(&mut self, cue: Cue, pitch: f32) {
        if let Some(&sound) = self.cues.get(&cue) {
            self.backend.set_pitch(sound, pitch);
        }
    }

    /// Seeks `cue` to a time offset, converted to a sample index.
    pub fn seek_seconds(&mut self, cue: Cue, seconds: f32) {
        let sample = (seconds.max(0.0) as f64 * self.sample_rate as f64).round() as u64;
        if let Some(&sound) = self.cues.get(&cue) {
            self.backend.seek(sound, sample);
        }
    }
}

impl std::fmt::Debug for SoundBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundBank")
            .field("cues", &self.cues)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// Calls received by [`SilentAudio`].
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Load(String),
    Play(SoundId),
    Stop(SoundId),
    Pitch(SoundId, f32),
    Seek(SoundId, u64),
}

/// Shared, thread-safe view over the calls a [`SilentAudio`] received.
#[derive(Debug, Clone, Default)]
pub struct AudioLog {
    shared: Arc<Mutex<Vec<AudioEvent>>>,
}

impl AudioLog {
    pub fn events(&self) -> Result<Vec<AudioEvent>> {
        Ok(self.lock()?.clone())
    }

    fn push(&self, event: AudioEvent) {
        if let Ok(mut events) = self.lock() {
            events.push(event);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<AudioEvent>>> {
        self.shared
            .lock()
            .map_err(|_| LimboError::msg("audio log has been poisoned"))
    }
}

/// Backend that produces no sound and records every call. Loads of paths
/// listed in `unavailable` fail.
#[derive(Debug, Default)]
pub struct SilentAudio {
    log: AudioLog,
    unavailable: Vec<String>,
    next_id: u32,
}

impl SilentAudio {
    pub fn with_log() -> (Self, AudioLog) {
        let audio = Self::default();
        let log = audio.log.clone();
        (audio, log)
    }

    pub fn without(mut self, path: impl Into<String>) -> Self {
        self.unavailable.push(path.into());
        self
    }
}

impl AudioBackend for SilentAudio {
    fn load(&mut self, path: &str) -> Result<SoundId> {
        if self.unavailable.iter().any(|p| p == path) {
            return Err(LimboError::asset(path, "sound file unavailable"));
        }
        self.log.push(AudioEvent::Load(path.to_string()));
        self.next_id += 1;
        Ok(SoundId(self.next_id))
    }

    fn play(&mut self, sound: SoundId) {
        tracing::trace!(?sound, "play");
        self.log.push(AudioEvent::Play(sound));
    }

    fn stop(&mut self, sound: SoundId) {
        self.log.push(AudioEvent::Stop(sound));
    }

    fn set_pitch(&mut self, sound: SoundId, pitch: f32) {
        self.log.push(AudioEvent::Pitch(sound, pitch));
    }

    fn seek(&mut self, sound: SoundId, sample: u64) {
        self.log.push(AudioEvent::Seek(sound, sample));
    }
}
