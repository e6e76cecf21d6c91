//! The authored show: a fixed list of effects timed in beats.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    config::ShowConfig,
    effect::{Effect, Spin},
    permutation::random_start,
    Permutation, KEY_COUNT,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    pub bpm: f32,
}

impl Tempo {
    pub fn new(bpm: f32) -> Self {
        assert!(bpm > 0.0, "tempo must be positive, got {bpm}");
        Self { bpm }
    }

    pub fn beats(&self, count: f32) -> f32 {
        count * 60.0 / self.bpm
    }
}

/// A built script plus the facts the show needs about it.
#[derive(Debug)]
pub struct Script {
    pub effects: Vec<Effect>,
    /// Starting identity→slot permutation.
    pub start: Permutation,
    pub tracked_key: usize,
    /// Index of the interactive pick, the target of a skip.
    pub choose_index: usize,
}

/// Builds the show. The starting layout and the tracked key come from
/// `config.seed`, or from entropy when no seed is set.
pub fn build(config: &ShowConfig, tempo: Tempo) -> Script {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let start = random_start(&mut rng);
    let tracked_key = config
        .tracked_key
        .unwrap_or_else(|| rng.gen_range(0..KEY_COUNT));
    let flashes = config.flash_count;
    let beat = |count: f32| tempo.beats(count);

    let mut effects = vec![
        Effect::ready(beat(8.0)),
        Effect::glow(beat(4.0), tracked_key, flashes),
        Effect::hold(beat(1.0)),
        Effect::shuffle(beat(2.0), Permutation::literal("10325476")),
        Effect::cyclic(beat(2.0), Spin::Clockwise),
        Effect::shuffle(beat(2.0), Permutation::literal("45670123")),
        Effect::compound(
            Effect::depth_swap(beat(2.0)),
            Effect::glow(beat(2.0), tracked_key, 1),
        ),
        Effect::rotate(beat(4.0)),
        Effect::cyclic(beat(1.0), Spin::CounterClockwise),
        Effect::cyclic(beat(1.0), Spin::CounterClockwise),
        Effect::shuffle(beat(1.0), Permutation::literal("fbgdhcea")),
        Effect::depth_swap(beat(1.0)),
        Effect::shuffle(beat(1.0), Permutation::literal("30127456")),
        Effect::rotate(beat(2.0)),
    ];
    effects.extend(
        config
            .extra_shuffles
            .iter()
            .map(|perm| Effect::shuffle(beat(1.0), *perm)),
    );
    effects.push(Effect::hold(beat(2.0)));

    let choose_index = effects.len();
    effects.push(Effect::choose_key(beat(4.0)));
    effects.push(Effect::end(beat(4.0)));

    Script {
        effects,
        start,
        tracked_key,
        choose_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> ShowConfig {
        ShowConfig {
            seed: Some(42),
            ..ShowConfig::default()
        }
    }

    #[test]
    fn beats_follow_tempo() {
        let tempo = Tempo::new(120.0);
        assert_eq!(tempo.beats(1.0), 0.5);
        assert_eq!(tempo.beats(8.0), 4.0);
    }

    #[test]
    fn seed_fixes_start_and_tracked_key() {
        let a = build(&seeded(), Tempo::new(120.0));
        let b = build(&seeded(), Tempo::new(120.0));
        assert_eq!(a.start, b.start);
        assert_eq!(a.tracked_key, b.tracked_key);
        assert!(a.tracked_key < KEY_COUNT);
    }

    #[test]
    fn script_ends_in_choose_then_end() {
        let script = build(&seeded(), Tempo::new(120.0));
        let labels: Vec<_> = script.effects.iter().map(Effect::label).collect();
        assert_eq!(labels[0], "ready");
        assert_eq!(labels[script.choose_index], "choose-key");
        assert_eq!(labels.last(), Some(&"end"));
        assert_eq!(script.choose_index, script.effects.len() - 2);
        assert!(script.effects[..script.choose_index]
            .iter()
            .all(|e| !e.is_interactive()));
    }

    #[test]
    fn extra_shuffles_are_inserted_before_the_pick() {
        let extra = Permutation::literal("76543210");
        let config = ShowConfig {
            extra_shuffles: vec![extra],
            tracked_key: Some(4),
            ..seeded()
        };
        let base = build(&seeded(), Tempo::new(120.0));
        let script = build(&config, Tempo::new(120.0));
        assert_eq!(script.tracked_key, 4);
        assert_eq!(script.choose_index, base.choose_index + 1);
        let inserted = &script.effects[script.choose_index - 2];
        assert_eq!(inserted.resulting_permutation(), extra);
    }
}
