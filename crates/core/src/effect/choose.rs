use std::f32::consts::TAU;

use glam::Vec2;

use super::Stage;
use crate::{
    audio::Cue,
    easing::{lerp, smoothstep},
    scene::{HitRegion, Rgba, Scene, Tone, Z_CENTER},
    KEY_COUNT,
};

const ORBIT_RADIUS: f32 = 520.0;
/// Vertical squash of the orbit ellipse.
const ORBIT_TILT: f32 = 0.35;
const ORBIT_DEPTH: f32 = 0.45;
/// Radians per second.
const ORBIT_SPEED: f32 = 0.35;
const HOVER_SCALE: f32 = 1.12;
const WRONG_SHAKE: f32 = 18.0;

/// How the pick compares to the key the audience was following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Wrong,
    NoChoice,
}

impl Outcome {
    pub fn judge(scene: &Scene) -> Self {
        match scene.chosen_key {
            Some(chosen) if chosen == scene.tracked_key => Outcome::Correct,
            Some(_) => Outcome::Wrong,
            None => Outcome::NoChoice,
        }
    }

    fn caption(self) -> &'static str {
        match self {
            Outcome::Correct => "Correct!",
            Outcome::Wrong => "Not quite...",
            Outcome::NoChoice => "Time's up",
        }
    }
}

/// Keys orbit the centre of the screen until one is clicked.
#[derive(Debug, Default)]
pub struct ChooseKeyAnim {
    starts: [Vec2; KEY_COUNT],
    angle: f32,
    intro: f32,
    hovered: Option<usize>,
    chosen: Option<usize>,
}

impl ChooseKeyAnim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    pub(super) fn init(&mut self, stage: &mut Stage<'_>) {
        let scene = &mut *stage.scene;
        self.starts = std::array::from_fn(|identity| scene.key(identity).position);
        scene.chosen_key = None;
        scene.hit_regions.clear();
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32, dt: f32) {
        self.intro = smoothstep(t);
        self.angle += ORBIT_SPEED * dt * self.intro;
        let scene = &mut *stage.scene;
        let origin = scene.layout.origin;

        for identity in 0..KEY_COUNT {
            let slot = scene.mapping().slot_of(identity);
            let phase = self.angle + TAU * slot as f32 / KEY_COUNT as f32;
            let orbit = origin
                + Vec2::new(ORBIT_RADIUS * phase.cos(), ORBIT_RADIUS * ORBIT_TILT * phase.sin());
            let start = self.starts[identity];
            let key = scene.key_mut(identity);
            key.position = start.lerp(orbit, self.intro);
            key.z = lerp(Z_CENTER, Z_CENTER + ORBIT_DEPTH * phase.sin(), self.intro);
            key.scale = 1.0;
            key.hovered = false;
        }

        register_hit_regions(scene);
        self.hovered = scene.hit_regions.hit(stage.input.pointer);
        if let Some(identity) = self.hovered {
            let key = scene.key_mut(identity);
            key.hovered = true;
            key.scale = HOVER_SCALE;
        }

        if self.chosen.is_none() && stage.input.clicked() {
            if let Some(identity) = self.hovered {
                self.chosen = Some(identity);
                stage.sounds.play(Cue::Tick);
                tracing::info!(identity, "key chosen");
            }
        }
    }

    pub(super) fn late_anim(&mut self, stage: &mut Stage<'_>) {
        let position = stage.scene.layout.origin - Vec2::new(0.0, 380.0);
        stage.canvas.draw_text(
            "Which key was it?",
            position,
            90.0,
            Rgba::WHITE.with_alpha(self.intro),
        );
    }

    pub(super) fn finish(&mut self, stage: &mut Stage<'_>) {
        stage.scene.hit_regions.clear();
        stage.scene.chosen_key = self.chosen;
    }
}

/// Registers one screen-space box per key, farthest first so nearer keys win.
fn register_hit_regions(scene: &mut Scene) {
    let mut order: [usize; KEY_COUNT] = std::array::from_fn(|i| i);
    order.sort_by(|&a, &b| scene.key(b).z.total_cmp(&scene.key(a).z));
    for identity in order {
        let key = *scene.key(identity);
        let (projected, factor) = scene.layout.project(key.position, key.z);
        let centre = scene.to_screen(projected);
        let size = scene.layout.key_size * factor * key.scale * scene.globals.scale;
        scene
            .hit_regions
            .register(HitRegion::around(identity, centre, size));
    }
}

/// Final screen: the followed key lights up green, a wrong pick turns red.
/// Never finishes.
#[derive(Debug)]
pub struct EndAnim {
    outcome: Outcome,
    reveal: f32,
}

impl EndAnim {
    pub fn new() -> Self {
        Self {
            outcome: Outcome::NoChoice,
            reveal: 0.0,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub(super) fn init(&mut self, stage: &mut Stage<'_>) {
        self.outcome = Outcome::judge(stage.scene);
        stage.sounds.play(Cue::Reveal);
        if self.outcome == Outcome::Wrong {
            stage.scene.shake(WRONG_SHAKE);
        }
        tracing::info!(outcome = ?self.outcome, tracked = stage.scene.tracked_key, "revealing");
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32) {
        self.reveal = smoothstep(t);
        let scene = &mut *stage.scene;
        let tracked = scene.tracked_key;
        let main = Tone::Main as usize;

        let base = scene.palette().tones(tracked)[main];
        let key = scene.key_mut(tracked);
        key.colors[main] = base.lerp(Rgba::CORRECT, self.reveal);
        key.glow = self.reveal;
        key.scale = 1.0 + 0.25 * self.reveal;
        key.z = Z_CENTER - 0.2 * self.reveal;

        if let (Outcome::Wrong, Some(chosen)) = (self.outcome, scene.chosen_key) {
            let base = scene.palette().tones(chosen)[main];
            scene.key_mut(chosen).colors[main] = base.lerp(Rgba::WRONG, self.reveal);
        }
    }

    pub(super) fn late_anim(&mut self, stage: &mut Stage<'_>) {
        let position = stage.scene.layout.origin + Vec2::new(0.0, 360.0);
        stage.canvas.draw_text(
            self.outcome.caption(),
            position,
            110.0,
            Rgba::WHITE.with_alpha(self.reveal),
        );
    }
}

impl Default for EndAnim {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{testing::Rig, Effect};
    use super::*;
    use crate::{input::PointerButton, render::Canvas};

    fn orbit_until_settled(rig: &mut Rig, effect: &mut Effect) {
        effect.init(&mut rig.stage());
        for _ in 0..70 {
            effect.anim(&mut rig.stage(), 1.0 / 60.0);
        }
    }

    #[test]
    fn never_done_without_a_click() {
        let mut rig = Rig::new();
        let mut effect = Effect::choose_key(1.0);
        orbit_until_settled(&mut rig, &mut effect);
        for _ in 0..600 {
            effect.anim(&mut rig.stage(), 1.0 / 60.0);
        }
        assert!(!effect.done());
        assert_eq!(effect.extra_time(), 0.0);
        assert_eq!(rig.scene.hit_regions.iter().count(), KEY_COUNT);
    }

    #[test]
    fn clicking_a_hovered_key_chooses_it() {
        let mut rig = Rig::new();
        let mut effect = Effect::choose_key(1.0);
        orbit_until_settled(&mut rig, &mut effect);

        let key = *rig.scene.key(5);
        let (projected, _) = rig.scene.layout.project(key.position, key.z);
        rig.input.move_pointer(rig.scene.to_screen(projected));
        effect.anim(&mut rig.stage(), 0.0);
        assert!(rig.scene.key(5).hovered);
        assert!(!effect.done());

        rig.input.pointer_down(PointerButton::Primary);
        effect.anim(&mut rig.stage(), 0.0);
        assert!(effect.done());

        effect.finish(&mut rig.stage());
        assert_eq!(rig.scene.chosen_key, Some(5));
        assert!(rig.scene.hit_regions.is_empty());
    }

    #[test]
    fn clicking_empty_space_chooses_nothing() {
        let mut rig = Rig::new();
        let mut effect = Effect::choose_key(1.0);
        orbit_until_settled(&mut rig, &mut effect);
        rig.input.move_pointer(Vec2::new(5.0, 5.0));
        rig.input.pointer_down(PointerButton::Primary);
        effect.anim(&mut rig.stage(), 1.0 / 60.0);
        assert!(!effect.done());
    }

    #[test]
    fn end_reveals_wrong_pick_in_red() {
        let mut rig = Rig::new();
        rig.scene.tracked_key = 2;
        rig.scene.chosen_key = Some(6);
        let mut effect = Effect::end(1.0);
        effect.init(&mut rig.stage());
        assert!(rig.scene.globals.shake_amplitude > 0.0);
        effect.anim(&mut rig.stage(), 1.5);

        assert_eq!(rig.scene.key(2).color(Tone::Main), Rgba::CORRECT);
        assert_eq!(rig.scene.key(6).color(Tone::Main), Rgba::WRONG);
        assert!(!effect.done());

        rig.canvas.begin_frame();
        effect.late_anim(&mut rig.stage(), 0.0);
        assert_eq!(rig.canvas.texts().collect::<Vec<_>>(), ["Not quite..."]);
    }

    #[test]
    fn judge_compares_with_tracked_key() {
        let mut scene = Scene::default();
        scene.tracked_key = 3;
        assert_eq!(Outcome::judge(&scene), Outcome::NoChoice);
        scene.chosen_key = Some(3);
        assert_eq!(Outcome::judge(&scene), Outcome::Correct);
        scene.chosen_key = Some(1);
        assert_eq!(Outcome::judge(&scene), Outcome::Wrong);
    }
}
