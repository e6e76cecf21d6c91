//! Back-to-back player for a fixed script of effects.
//!
//! Per frame the host calls [`Timeline::anim`], renders the base pass, then
//! calls [`Timeline::late_anim`]; the switch to the next effect happens at the
//! end of `late_anim`, so an effect's final pose is always drawn before it is
//! finished. At most one switch happens per frame.

use std::collections::VecDeque;

use crate::effect::{Effect, Stage};

/// Running count of real seconds played.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub time_seconds: f32,
}

impl PlaybackClock {
    pub fn advance(&mut self, delta: f32) {
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }

    pub fn jump_to(&mut self, seconds: f32) {
        self.time_seconds = seconds.max(0.0);
    }
}

#[derive(Debug, Default)]
pub struct Timeline {
    pending: VecDeque<Effect>,
    current: Option<Effect>,
    /// Index of the next effect to activate.
    frame: usize,
    durations: Vec<f32>,
    total_duration: f32,
    lead_in: f32,
    clock: PlaybackClock,
}

impl Timeline {
    pub fn new(effects: Vec<Effect>) -> Self {
        let durations: Vec<f32> = effects.iter().map(Effect::duration).collect();
        Self {
            total_duration: durations.iter().sum(),
            durations,
            pending: effects.into(),
            ..Self::default()
        }
    }

    /// Seconds the first effect waits before its clock reaches zero.
    pub fn with_lead_in(mut self, seconds: f32) -> Self {
        self.lead_in = seconds.max(0.0);
        self
    }

    /// Sum of all scripted durations.
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    /// Real seconds played since the first effect started.
    pub fn elapsed(&self) -> f32 {
        self.clock.time_seconds
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn current(&self) -> Option<&Effect> {
        self.current.as_ref()
    }

    /// Script index of the active effect.
    pub fn current_index(&self) -> Option<usize> {
        self.current.as_ref().map(|_| self.frame - 1)
    }

    pub fn has_next(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Scripted start time of the effect at `index`.
    pub fn start_of(&self, index: usize) -> f32 {
        self.durations.iter().take(index).sum()
    }

    /// Advances the active effect. The very first call only activates the
    /// first effect; its `dt` is dropped to swallow the startup frame.
    pub fn anim(&mut self, stage: &mut Stage<'_>, dt: f32) {
        match self.current.as_mut() {
            Some(effect) => {
                effect.anim(stage, dt);
                self.clock.advance(dt);
            }
            None => {
                self.activate_next(stage, None);
            }
        }
    }

    /// Overlay pass for the active effect, then the advance decision.
    pub fn late_anim(&mut self, stage: &mut Stage<'_>, dt: f32) {
        let Some(effect) = self.current.as_mut() else {
            return;
        };
        effect.late_anim(stage, dt);
        if effect.done() && self.has_next() {
            self.advance(stage);
        }
    }

    /// Finishes the active effect right away and starts the next one.
    /// Returns `false` when there is nothing left to advance to.
    pub fn skip(&mut self, stage: &mut Stage<'_>) -> bool {
        if !self.has_next() {
            tracing::warn!("skip requested on the last effect");
            return false;
        }
        self.advance(stage);
        if let Some(index) = self.current_index() {
            self.clock.jump_to(self.start_of(index));
        }
        true
    }

    /// Skips forward until the effect at `index` is active.
    pub fn skip_to(&mut self, stage: &mut Stage<'_>, index: usize) {
        while self.current_index().map_or(true, |current| current < index) {
            if !self.skip(stage) {
                break;
            }
        }
    }

    fn advance(&mut self, stage: &mut Stage<'_>) {
        let carry = match self.current.take() {
            Some(mut outgoing) => {
                let carry = outgoing.extra_time();
                outgoing.finish(stage);
                Some(carry)
            }
            None => None,
        };
        stage.scene.reset_key_positions();
        self.activate_next(stage, carry);
    }

    /// `carry` is the outgoing effect's overshoot; `None` means cold start.
    fn activate_next(&mut self, stage: &mut Stage<'_>, carry: Option<f32>) {
        let Some(mut effect) = self.pending.pop_front() else {
            return;
        };
        effect = match carry {
            Some(seconds) => {
                effect.add_time(seconds);
                effect
            }
            None => effect.with_lead_in(self.lead_in),
        };
        tracing::info!(
            index = self.frame,
            kind = effect.label(),
            duration = effect.duration(),
            "effect started"
        );
        effect.init(stage);
        self.current = Some(effect);
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        effect::{testing::Rig, EffectKind},
        Permutation,
    };
    use proptest::prelude::*;

    fn tick(timeline: &mut Timeline, rig: &mut Rig, dt: f32) {
        timeline.anim(&mut rig.stage(), dt);
        timeline.late_anim(&mut rig.stage(), dt);
    }

    fn local_seconds(timeline: &Timeline) -> f32 {
        let effect = timeline.current().unwrap();
        effect.time() * effect.duration()
    }

    #[test]
    fn first_tick_only_activates() {
        let mut rig = Rig::new();
        let mut timeline = Timeline::new(vec![Effect::hold(1.0)]);
        assert!(timeline.current().is_none());
        tick(&mut timeline, &mut rig, 0.1);
        assert_eq!(timeline.current_index(), Some(0));
        assert_eq!(timeline.current().unwrap().time(), 0.0);
    }

    #[test]
    fn three_effect_script_at_fixed_step() {
        let mut rig = Rig::new();
        let mut timeline = Timeline::new(vec![
            Effect::hold(0.5),
            Effect::hold(0.3),
            Effect::hold(0.2),
        ]);
        assert!((timeline.total_duration() - 1.0).abs() < 1e-6);

        for _ in 0..10 {
            tick(&mut timeline, &mut rig, 0.1);
        }
        assert_eq!(timeline.current_index(), Some(2));
        assert!((local_seconds(&timeline) - 0.1).abs() < 1e-4);
        assert!((timeline.elapsed() - 0.9).abs() < 1e-4);
    }

    #[test]
    fn lead_in_delays_the_first_effect_only() {
        let mut rig = Rig::new();
        let mut timeline =
            Timeline::new(vec![Effect::hold(0.5), Effect::hold(1.0)]).with_lead_in(0.05);
        tick(&mut timeline, &mut rig, 0.1);
        assert!((local_seconds(&timeline) + 0.05).abs() < 1e-5);
        for _ in 0..6 {
            tick(&mut timeline, &mut rig, 0.1);
        }
        assert_eq!(timeline.current_index(), Some(1));
        assert!((local_seconds(&timeline) - 0.05).abs() < 1e-4);
    }

    #[test]
    fn last_effect_stays_active() {
        let mut rig = Rig::new();
        let mut timeline = Timeline::new(vec![Effect::hold(0.1), Effect::hold(0.1)]);
        for _ in 0..20 {
            tick(&mut timeline, &mut rig, 0.05);
        }
        assert_eq!(timeline.current_index(), Some(1));
        assert!(timeline.current().unwrap().done());
        assert!(!timeline.skip(&mut rig.stage()));
        assert_eq!(timeline.current_index(), Some(1));
    }

    #[test]
    fn finish_commits_before_next_init() {
        let first = Permutation::literal("10234567");
        let second = Permutation::literal("12034567");
        let mut rig = Rig::new();
        let mut timeline = Timeline::new(vec![
            Effect::shuffle(1.0, first),
            Effect::shuffle(1.0, second),
        ]);
        tick(&mut timeline, &mut rig, 0.0);
        tick(&mut timeline, &mut rig, 0.2);
        assert!(!timeline.current().unwrap().done());

        assert!(timeline.skip(&mut rig.stage()));
        assert_eq!(rig.scene.mapping().key_at(0), 1);
        assert_eq!(timeline.current_index(), Some(1));
        assert_eq!(timeline.current().unwrap().time(), 0.0);
        assert!((timeline.elapsed() - 1.0).abs() < 1e-6);

        for _ in 0..6 {
            tick(&mut timeline, &mut rig, 0.2);
        }
        let expected = first.then(&second);
        for identity in 0..crate::KEY_COUNT {
            let slot = expected.target(identity);
            let position = rig.scene.key(identity).position;
            assert!((position - rig.scene.layout.slot_position(slot)).length() < 1e-2);
        }
    }

    #[test]
    fn compound_after_overshoot_switches_on_schedule() {
        let mut rig = Rig::new();
        let mut timeline = Timeline::new(vec![
            Effect::hold(0.25),
            Effect::compound(Effect::hold(0.52), Effect::glow(0.52, 3, 2)),
            Effect::hold(5.0),
        ]);
        for _ in 0..8 {
            tick(&mut timeline, &mut rig, 0.1);
        }
        assert_eq!(timeline.current_index(), Some(1));
        let compound = timeline.current().unwrap();
        let EffectKind::Compound(a, b) = compound.kind() else {
            panic!("expected a compound effect");
        };
        assert!((a.time() - compound.time()).abs() < 1e-5);
        assert!((b.time() - compound.time()).abs() < 1e-5);

        // 0.8s played against 0.77s scripted.
        tick(&mut timeline, &mut rig, 0.1);
        assert_eq!(timeline.current_index(), Some(2));
        assert!((local_seconds(&timeline) - 0.03).abs() < 1e-4);
    }

    #[test]
    fn skip_to_reaches_the_requested_effect() {
        let mut rig = Rig::new();
        let mut timeline = Timeline::new(vec![
            Effect::hold(1.0),
            Effect::rotate(2.0),
            Effect::hold(4.0),
            Effect::end(1.0),
        ]);
        tick(&mut timeline, &mut rig, 0.0);
        timeline.skip_to(&mut rig.stage(), 3);
        assert_eq!(timeline.current_index(), Some(3));
        assert!((timeline.elapsed() - 7.0).abs() < 1e-6);
        assert_eq!(rig.scene.mapping().key_at(7), 0);
    }

    proptest! {
        #[test]
        fn boundaries_neither_lose_nor_gain_time(
            durations in prop::collection::vec(0.2f32..1.5, 2..6),
            dt in 0.005f32..0.1,
        ) {
            let mut rig = Rig::new();
            let mut effects: Vec<Effect> = durations.iter().map(|&d| Effect::hold(d)).collect();
            effects.push(Effect::end(1.0));
            let mut timeline = Timeline::new(effects);
            let scripted: f32 = durations.iter().sum();

            tick(&mut timeline, &mut rig, dt);
            let mut played = 0.0f32;
            while timeline.current_index() != Some(durations.len()) {
                tick(&mut timeline, &mut rig, dt);
                played += dt;
            }
            let into_last = local_seconds(&timeline);
            prop_assert!((played - (scripted + into_last)).abs() < 1e-3);
            prop_assert!(into_last >= 0.0 && into_last < dt + 1e-4);
        }
    }
}
