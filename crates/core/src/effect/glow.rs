use super::Stage;
use crate::{easing::flash, scene::Tone};

/// Flashes one key between its main and highlight tone. Moves nothing.
#[derive(Debug)]
pub struct GlowAnim {
    identity: usize,
    flashes: u32,
}

impl GlowAnim {
    pub fn new(identity: usize, flashes: u32) -> Self {
        assert!(identity < crate::KEY_COUNT, "glow target {identity} out of range");
        Self { identity, flashes }
    }

    /// Pulse strength at normalized time `t`.
    pub fn intensity(&self, t: f32) -> f32 {
        flash(t.clamp(0.0, 1.0), self.flashes)
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32) {
        let strength = self.intensity(t);
        let tones = stage.scene.palette().tones(self.identity);
        let key = stage.scene.key_mut(self.identity);
        key.glow = strength;
        key.scale = 1.0 + 0.08 * strength;
        key.colors[Tone::Main as usize] =
            tones[Tone::Main as usize].lerp(tones[Tone::Highlight as usize], strength);
    }

    pub(super) fn finish(&mut self, stage: &mut Stage<'_>) {
        let tones = stage.scene.palette().tones(self.identity);
        let key = stage.scene.key_mut(self.identity);
        key.glow = 0.0;
        key.scale = 1.0;
        key.colors = tones;
    }
}
