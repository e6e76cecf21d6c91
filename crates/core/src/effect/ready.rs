use glam::Vec2;

use super::Stage;
use crate::{audio::Cue, easing::bounce_in, scene::Rgba};

/// Countdown words and the share of the effect each one occupies.
const PHASES: [(&str, f32); 5] = [
    ("Ready", 0.36),
    ("3", 0.16),
    ("2", 0.16),
    ("1", 0.16),
    ("Go!", 0.16),
];

/// Parts of a phase spent bouncing in and fading out.
const ENTER: f32 = 0.3;
const FADE: f32 = 0.75;

const TEXT_SIZE: f32 = 140.0;
const TEXT_RISE: f32 = 320.0;

/// Countdown text at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub phase: usize,
    pub text: &'static str,
    pub scale: f32,
    pub alpha: f32,
}

/// "Ready, 3, 2, 1, Go!" overlay, ticking on every number.
#[derive(Debug, Default)]
pub struct ReadyAnim {
    overlay: Option<Overlay>,
}

impl ReadyAnim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay for normalized time `t`, `None` outside `[0, 1)`.
    pub fn overlay_at(t: f32) -> Option<Overlay> {
        if !(0.0..1.0).contains(&t) {
            return None;
        }
        let mut start = 0.0;
        for (phase, &(text, share)) in PHASES.iter().enumerate() {
            let end = start + share;
            if t < end || phase == PHASES.len() - 1 {
                let u = ((t - start) / share).clamp(0.0, 1.0);
                let scale = if u < ENTER { bounce_in(u / ENTER) } else { 1.0 };
                let alpha = if u > FADE { 1.0 - (u - FADE) / (1.0 - FADE) } else { 1.0 };
                return Some(Overlay {
                    phase,
                    text,
                    scale,
                    alpha,
                });
            }
            start = end;
        }
        None
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32) {
        let next = Self::overlay_at(t);
        let entered = match (self.overlay, next) {
            (None, Some(now)) => Some(now.phase),
            (Some(before), Some(now)) if before.phase != now.phase => Some(now.phase),
            _ => None,
        };
        match entered {
            Some(phase) if phase == PHASES.len() - 1 => stage.sounds.play(Cue::Go),
            Some(phase) if phase > 0 => stage.sounds.play(Cue::Tick),
            _ => {}
        }
        self.overlay = next;
    }

    pub(super) fn late_anim(&mut self, stage: &mut Stage<'_>) {
        let Some(overlay) = self.overlay else {
            return;
        };
        let position = stage.scene.layout.origin - Vec2::new(0.0, TEXT_RISE);
        stage.canvas.draw_text(
            overlay.text,
            position,
            TEXT_SIZE * overlay.scale,
            Rgba::WHITE.with_alpha(overlay.alpha),
        );
    }
}
