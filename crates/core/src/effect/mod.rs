//! Timed animation units.
//!
//! An [`Effect`] owns a normalized local clock: `time` runs from 0 (or a
//! small negative lead-in) to 1 over `duration` seconds and may overshoot
//! past 1 on the frame it finishes. The overshoot is reported by
//! [`Effect::extra_time`] so the next effect can start exactly where this
//! one left off.
//!
//! The roster of behaviours is fixed, so dispatch is a `match` over
//! [`EffectKind`] rather than trait objects.

mod choose;
mod glow;
mod perms;
mod ready;

use serde::Serialize;

pub use choose::{ChooseKeyAnim, EndAnim, Outcome};
pub use glow::GlowAnim;
pub use perms::{CyclicPerm, DepthSwapPerm, RotatePerm, ShufflePerm, Spin};
pub use ready::{Overlay, ReadyAnim};

use crate::{audio::SoundBank, input::InputState, render::Canvas, Permutation, Scene};

/// Everything an effect may touch during a frame.
pub struct Stage<'a> {
    pub scene: &'a mut Scene,
    pub input: &'a InputState,
    pub sounds: &'a mut SoundBank,
    pub canvas: &'a mut dyn Canvas,
}

#[derive(Debug)]
pub enum EffectKind {
    /// Holds the board still.
    Hold,
    Shuffle(ShufflePerm),
    Cyclic(CyclicPerm),
    Rotate(RotatePerm),
    DepthSwap(DepthSwapPerm),
    Glow(GlowAnim),
    Ready(ReadyAnim),
    ChooseKey(ChooseKeyAnim),
    End(EndAnim),
    /// Two effects run in lockstep. They must not write the same state.
    Compound(Box<Effect>, Box<Effect>),
}

#[derive(Debug)]
pub struct Effect {
    time: f32,
    duration: f32,
    kind: EffectKind,
}

impl Effect {
    /// # Panics
    /// Panics when `duration` is not strictly positive.
    pub fn new(duration: f32, kind: EffectKind) -> Self {
        assert!(
            duration > 0.0 && duration.is_finite(),
            "effect duration must be positive, got {duration}"
        );
        Self {
            time: 0.0,
            duration,
            kind,
        }
    }

    pub fn hold(duration: f32) -> Self {
        Self::new(duration, EffectKind::Hold)
    }

    pub fn shuffle(duration: f32, perm: Permutation) -> Self {
        Self::new(duration, EffectKind::Shuffle(ShufflePerm::new(perm)))
    }

    pub fn cyclic(duration: f32, spin: Spin) -> Self {
        Self::new(duration, EffectKind::Cyclic(CyclicPerm::new(spin)))
    }

    pub fn rotate(duration: f32) -> Self {
        Self::new(duration, EffectKind::Rotate(RotatePerm::new()))
    }

    pub fn depth_swap(duration: f32) -> Self {
        Self::new(duration, EffectKind::DepthSwap(DepthSwapPerm::new()))
    }

    pub fn glow(duration: f32, identity: usize, flashes: u32) -> Self {
        Self::new(duration, EffectKind::Glow(GlowAnim::new(identity, flashes)))
    }

    pub fn ready(duration: f32) -> Self {
        Self::new(duration, EffectKind::Ready(ReadyAnim::new()))
    }

    /// Interactive pick. `duration` only paces the intro orbit.
    pub fn choose_key(duration: f32) -> Self {
        Self::new(duration, EffectKind::ChooseKey(ChooseKeyAnim::new()))
    }

    /// Terminal reveal. `duration` only paces the reveal animation.
    pub fn end(duration: f32) -> Self {
        Self::new(duration, EffectKind::End(EndAnim::new()))
    }

    /// Runs `a` and `b` together for the longer of their durations.
    pub fn compound(a: Effect, b: Effect) -> Self {
        let duration = a.duration.max(b.duration);
        Self::new(duration, EffectKind::Compound(Box::new(a), Box::new(b)))
    }

    /// Starts the clock `seconds` early so the first frame is held still.
    /// Compound children are delayed by the same amount.
    pub fn with_lead_in(mut self, seconds: f32) -> Self {
        self.set_lead_in(seconds.max(0.0));
        self
    }

    fn set_lead_in(&mut self, seconds: f32) {
        self.time = -seconds / self.duration;
        if let EffectKind::Compound(a, b) = &mut self.kind {
            a.set_lead_in(seconds);
            b.set_lead_in(seconds);
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn label(&self) -> &'static str {
        match &self.kind {
            EffectKind::Hold => "hold",
            EffectKind::Shuffle(_) => "shuffle",
            EffectKind::Cyclic(_) => "cyclic",
            EffectKind::Rotate(_) => "rotate",
            EffectKind::DepthSwap(_) => "depth-swap",
            EffectKind::Glow(_) => "glow",
            EffectKind::Ready(_) => "ready",
            EffectKind::ChooseKey(_) => "choose-key",
            EffectKind::End(_) => "end",
            EffectKind::Compound(..) => "compound",
        }
    }

    /// Whether the effect waits for input rather than its clock.
    pub fn is_interactive(&self) -> bool {
        match &self.kind {
            EffectKind::ChooseKey(_) | EffectKind::End(_) => true,
            EffectKind::Compound(a, b) => a.is_interactive() || b.is_interactive(),
            _ => false,
        }
    }

    /// Advances the clock by `dt` seconds without running any behaviour.
    /// Compound children advance with it.
    pub fn add_time(&mut self, dt: f32) {
        self.tick_clock(dt);
        if let EffectKind::Compound(a, b) = &mut self.kind {
            a.add_time(dt);
            b.add_time(dt);
        }
    }

    fn tick_clock(&mut self, dt: f32) {
        self.time += dt / self.duration;
    }

    pub fn done(&self) -> bool {
        match &self.kind {
            EffectKind::ChooseKey(choose) => choose.chosen().is_some(),
            EffectKind::End(_) => false,
            EffectKind::Compound(a, b) => self.time >= 1.0 && a.done() && b.done(),
            _ => self.time >= 1.0,
        }
    }

    /// Seconds spent past the end of the clock. Zero for input-driven effects.
    pub fn extra_time(&self) -> f32 {
        if self.is_interactive() {
            return 0.0;
        }
        ((self.time - 1.0) * self.duration).max(0.0)
    }

    /// Permutation committed to the slot map when the effect finishes.
    pub fn resulting_permutation(&self) -> Permutation {
        match &self.kind {
            EffectKind::Shuffle(shuffle) => shuffle.permutation(),
            EffectKind::Cyclic(cyclic) => cyclic.permutation(),
            EffectKind::Rotate(_) => RotatePerm::permutation(),
            EffectKind::DepthSwap(_) => DepthSwapPerm::permutation(),
            EffectKind::Compound(a, b) => a.resulting_permutation().then(&b.resulting_permutation()),
            _ => Permutation::IDENTITY,
        }
    }

    pub fn init(&mut self, stage: &mut Stage<'_>) {
        match &mut self.kind {
            EffectKind::Hold => {}
            EffectKind::Shuffle(shuffle) => shuffle.init(stage),
            EffectKind::Cyclic(cyclic) => cyclic.init(stage),
            EffectKind::Rotate(rotate) => rotate.init(stage),
            EffectKind::DepthSwap(swap) => swap.init(stage),
            EffectKind::Glow(_) => {}
            EffectKind::Ready(_) => {}
            EffectKind::ChooseKey(choose) => choose.init(stage),
            EffectKind::End(end) => end.init(stage),
            EffectKind::Compound(a, b) => {
                a.init(stage);
                b.init(stage);
            }
        }
    }

    /// Advances the clock and poses the scene for the new time. Safe to call
    /// after the clock has passed 1; the pose then stays at the end state.
    pub fn anim(&mut self, stage: &mut Stage<'_>, dt: f32) {
        // Compound children tick their own clocks in their `anim`.
        self.tick_clock(dt);
        let t = self.time;
        match &mut self.kind {
            EffectKind::Hold => {}
            EffectKind::Shuffle(shuffle) => shuffle.anim(stage, t),
            EffectKind::Cyclic(cyclic) => cyclic.anim(stage, t),
            EffectKind::Rotate(rotate) => rotate.anim(stage, t),
            EffectKind::DepthSwap(swap) => swap.anim(stage, t),
            EffectKind::Glow(glow) => glow.anim(stage, t),
            EffectKind::Ready(ready) => ready.anim(stage, t),
            EffectKind::ChooseKey(choose) => choose.anim(stage, t, dt),
            EffectKind::End(end) => end.anim(stage, t),
            EffectKind::Compound(a, b) => {
                a.anim(stage, dt);
                b.anim(stage, dt);
            }
        }
    }

    /// Overlay pass, drawn after the keys.
    pub fn late_anim(&mut self, stage: &mut Stage<'_>, dt: f32) {
        match &mut self.kind {
            EffectKind::Ready(ready) => ready.late_anim(stage),
            EffectKind::ChooseKey(choose) => choose.late_anim(stage),
            EffectKind::End(end) => end.late_anim(stage),
            EffectKind::Compound(a, b) => {
                a.late_anim(stage, dt);
                b.late_anim(stage, dt);
            }
            _ => {}
        }
    }

    /// Commits the effect's permanent changes and cleans up after it.
    pub fn finish(&mut self, stage: &mut Stage<'_>) {
        match &mut self.kind {
            EffectKind::Compound(a, b) => {
                a.finish(stage);
                b.finish(stage);
                return;
            }
            EffectKind::Rotate(rotate) => rotate.finish(stage),
            EffectKind::Glow(glow) => glow.finish(stage),
            EffectKind::ChooseKey(choose) => choose.finish(stage),
            _ => {}
        }
        let perm = self.resulting_permutation();
        stage.scene.commit(&perm);
    }

    pub fn summary(&self) -> EffectSummary {
        let children = match &self.kind {
            EffectKind::Compound(a, b) => vec![a.summary(), b.summary()],
            _ => Vec::new(),
        };
        EffectSummary {
            kind: self.label(),
            duration: self.duration,
            permutation: self.resulting_permutation(),
            interactive: self.is_interactive(),
            children,
        }
    }
}

/// Serializable description of an effect, used for script listings.
#[derive(Debug, Clone, Serialize)]
pub struct EffectSummary {
    pub kind: &'static str,
    pub duration: f32,
    pub permutation: Permutation,
    pub interactive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EffectSummary>,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::render::RecordingCanvas;

    /// Owns everything a [`Stage`] borrows.
    pub struct Rig {
        pub scene: Scene,
        pub input: InputState,
        pub sounds: SoundBank,
        pub canvas: RecordingCanvas,
    }

    impl Rig {
        pub fn new() -> Self {
            Self {
                scene: Scene::default(),
                input: InputState::new(),
                sounds: SoundBank::silent(),
                canvas: RecordingCanvas::new(),
            }
        }

        pub fn stage(&mut self) -> Stage<'_> {
            Stage {
                scene: &mut self.scene,
                input: &self.input,
                sounds: &mut self.sounds,
                canvas: &mut self.canvas,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Rig;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clock_reaches_one_after_duration() {
        let mut rig = Rig::new();
        let mut effect = Effect::hold(0.5);
        for _ in 0..4 {
            effect.anim(&mut rig.stage(), 0.1);
            assert!(!effect.done());
        }
        effect.anim(&mut rig.stage(), 0.1);
        assert!((effect.time() - 1.0).abs() < 1e-5);
        effect.anim(&mut rig.stage(), 0.1);
        assert!(effect.done());
    }

    #[test]
    fn lead_in_starts_the_clock_negative() {
        let effect = Effect::hold(2.0).with_lead_in(1.0 / 60.0);
        assert!((effect.time() + 1.0 / 120.0).abs() < 1e-6);
        assert!(!effect.done());
    }

    #[test]
    fn extra_time_reports_overshoot_in_seconds() {
        let mut effect = Effect::hold(0.5);
        effect.add_time(0.65);
        assert!(effect.done());
        assert!((effect.extra_time() - 0.15).abs() < 1e-5);
    }

    #[test]
    #[should_panic]
    fn zero_duration_is_rejected() {
        let _ = Effect::hold(0.0);
    }

    #[test]
    fn compound_waits_for_the_longer_child() {
        let mut rig = Rig::new();
        let mut effect = Effect::compound(Effect::hold(1.0), Effect::glow(2.0, 3, 2));
        assert_eq!(effect.duration(), 2.0);
        effect.init(&mut rig.stage());
        for _ in 0..19 {
            effect.anim(&mut rig.stage(), 0.1);
            assert!(!effect.done());
        }
        effect.anim(&mut rig.stage(), 0.1);
        effect.anim(&mut rig.stage(), 0.01);
        assert!(effect.done());
    }

    #[test]
    fn compound_children_share_carried_time_and_lead_in() {
        let children = |effect: &Effect| match effect.kind() {
            EffectKind::Compound(a, b) => (a.time(), b.time()),
            _ => unreachable!(),
        };
        let mut carried = Effect::compound(Effect::hold(0.5), Effect::glow(1.0, 1, 2));
        carried.add_time(0.05);
        let (a, b) = children(&carried);
        assert!((a - 0.1).abs() < 1e-6);
        assert!((b - 0.05).abs() < 1e-6);

        let delayed = Effect::compound(Effect::hold(0.5), Effect::hold(1.0)).with_lead_in(0.1);
        let (a, b) = children(&delayed);
        assert!((a + 0.2).abs() < 1e-6);
        assert!((b + 0.1).abs() < 1e-6);
        assert!((delayed.time() + 0.1).abs() < 1e-6);
    }

    #[test]
    fn compound_finishes_both_children_once() {
        let mut rig = Rig::new();
        let swap = Permutation::literal("10234567");
        let cycle = Permutation::cycle(&[4, 5, 6]);
        let mut effect = Effect::compound(Effect::shuffle(1.0, swap), Effect::shuffle(2.0, cycle));
        effect.init(&mut rig.stage());
        effect.anim(&mut rig.stage(), 2.5);
        assert!(effect.done());
        effect.finish(&mut rig.stage());

        let mapping = rig.scene.mapping();
        assert_eq!(mapping.key_at(0), 1);
        assert_eq!(mapping.key_at(1), 0);
        assert_eq!(mapping.key_at(5), 4);
        assert_eq!(mapping.key_at(6), 5);
        assert_eq!(mapping.key_at(4), 6);
        assert_eq!(effect.resulting_permutation(), swap.then(&cycle));
    }

    #[test]
    fn summary_lists_compound_children() {
        let effect = Effect::compound(Effect::rotate(1.0), Effect::glow(1.0, 0, 3));
        let summary = effect.summary();
        assert_eq!(summary.kind, "compound");
        assert_eq!(summary.children.len(), 2);
        assert_eq!(summary.permutation, Permutation::literal("76543210"));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["children"][0]["kind"], "rotate");
    }

    proptest! {
        #[test]
        fn any_timestep_drives_clock_to_one(duration in 0.05f32..5.0, steps in 2usize..200) {
            let mut effect = Effect::hold(duration);
            let dt = duration / steps as f32;
            for _ in 0..steps {
                effect.add_time(dt);
            }
            prop_assert!((effect.time() - 1.0).abs() < 1e-3);
            effect.add_time(dt);
            prop_assert!(effect.done());
            prop_assert!(effect.extra_time() >= 0.0);
            prop_assert!(effect.extra_time() < duration);
        }
    }
}
