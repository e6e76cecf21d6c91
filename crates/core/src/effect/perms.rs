//! Effects that physically move keys and commit a permutation when done.
//!
//! Every effect snapshots the keys' positions in `init`; at `t >= 1` each key
//! sits exactly on the slot the committed permutation sends it to.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::Stage;
use crate::{
    easing::{linear_hop, settled_sigmoid, smoothstep},
    scene::Z_CENTER,
    Permutation, KEY_COUNT,
};

const HINGE_HOP: f32 = 60.0;
const HINGE_LIFT: f32 = 0.2;
const SWAP_DEPTH: f32 = 0.35;
const ROTATE_SHAKE: f32 = 8.0;

/// Straight-line travel of one key.
#[derive(Debug, Clone, Copy)]
struct Travel {
    identity: usize,
    from: Vec2,
    to: Vec2,
}

fn plan_travels(stage: &Stage<'_>, perm: &Permutation) -> Vec<Travel> {
    let scene = &*stage.scene;
    (0..KEY_COUNT)
        .filter_map(|identity| {
            let slot = scene.mapping().slot_of(identity);
            let target = perm.target(slot);
            (target != slot).then(|| Travel {
                identity,
                from: scene.key(identity).position,
                to: scene.layout.slot_position(target),
            })
        })
        .collect()
}

/// Arbitrary authored permutation; keys glide straight to their new slot.
#[derive(Debug)]
pub struct ShufflePerm {
    perm: Permutation,
    travels: Vec<Travel>,
}

impl ShufflePerm {
    pub fn new(perm: Permutation) -> Self {
        Self {
            perm,
            travels: Vec::new(),
        }
    }

    pub fn permutation(&self) -> Permutation {
        self.perm
    }

    pub(super) fn init(&mut self, stage: &mut Stage<'_>) {
        self.travels = plan_travels(stage, &self.perm);
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32) {
        let eased = settled_sigmoid(t);
        for travel in &self.travels {
            stage.scene.key_mut(travel.identity).position = travel.from.lerp(travel.to, eased);
        }
    }
}

/// Turning direction of the left block; the right block turns the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Spin {
    /// Rotation sign for the block holding `slot`, in y-down screen space.
    fn sign_for(self, slot: usize) -> f32 {
        let left = slot % 4 < 2;
        match (self, left) {
            (Spin::Clockwise, true) | (Spin::CounterClockwise, false) => 1.0,
            _ => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Orbit {
    identity: usize,
    centre: Vec2,
    offset: Vec2,
    sign: f32,
}

/// Quarter turn of both 2×2 halves of the board, in opposite directions.
#[derive(Debug)]
pub struct CyclicPerm {
    spin: Spin,
    orbits: Vec<Orbit>,
}

impl CyclicPerm {
    pub fn new(spin: Spin) -> Self {
        Self {
            spin,
            orbits: Vec::new(),
        }
    }

    pub fn permutation(&self) -> Permutation {
        match self.spin {
            Spin::Clockwise => {
                Permutation::cycle(&[0, 1, 5, 4]).then(&Permutation::cycle(&[2, 6, 7, 3]))
            }
            Spin::CounterClockwise => {
                Permutation::cycle(&[0, 4, 5, 1]).then(&Permutation::cycle(&[2, 3, 7, 6]))
            }
        }
    }

    pub(super) fn init(&mut self, stage: &mut Stage<'_>) {
        let scene = &*stage.scene;
        self.orbits = (0..KEY_COUNT)
            .map(|identity| {
                let slot = scene.mapping().slot_of(identity);
                let centre = scene.layout.block_centre(slot);
                Orbit {
                    identity,
                    centre,
                    offset: scene.key(identity).position - centre,
                    sign: self.spin.sign_for(slot),
                }
            })
            .collect();
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32) {
        let turn = FRAC_PI_2 * smoothstep(t);
        for orbit in &self.orbits {
            let rotated = Vec2::from_angle(orbit.sign * turn).rotate(orbit.offset);
            stage.scene.key_mut(orbit.identity).position = orbit.centre + rotated;
        }
    }
}

/// Half turn of the whole board. The two keys on the inner diagonal hop
/// away from the axis on the way round.
#[derive(Debug)]
pub struct RotatePerm {
    starts: [Vec2; KEY_COUNT],
    hinges: [usize; 2],
}

impl RotatePerm {
    pub fn new() -> Self {
        Self {
            starts: [Vec2::ZERO; KEY_COUNT],
            hinges: [1, 6],
        }
    }

    pub fn permutation() -> Permutation {
        Permutation::new([7, 6, 5, 4, 3, 2, 1, 0])
    }

    pub(super) fn init(&mut self, stage: &mut Stage<'_>) {
        let scene = &*stage.scene;
        self.starts = std::array::from_fn(|identity| scene.key(identity).position);
        self.hinges = [scene.mapping().key_at(1), scene.mapping().key_at(6)];
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32) {
        let origin = stage.scene.layout.origin;
        let turn = Vec2::from_angle(PI * smoothstep(t));
        let hop = linear_hop(t);
        for (identity, start) in self.starts.iter().enumerate() {
            let mut position = origin + turn.rotate(*start - origin);
            let key = stage.scene.key_mut(identity);
            if self.hinges.contains(&identity) {
                position += (position - origin).normalize_or_zero() * HINGE_HOP * hop;
                key.z = Z_CENTER - HINGE_LIFT * hop;
            }
            key.position = position;
        }
    }

    pub(super) fn finish(&mut self, stage: &mut Stage<'_>) {
        stage.scene.shake(ROTATE_SHAKE);
    }
}

impl Default for RotatePerm {
    fn default() -> Self {
        Self::new()
    }
}

/// Neighbouring columns inside each half trade places; keys moving right
/// pass in front, keys moving left pass behind.
#[derive(Debug)]
pub struct DepthSwapPerm {
    travels: Vec<Travel>,
}

impl DepthSwapPerm {
    pub fn new() -> Self {
        Self {
            travels: Vec::new(),
        }
    }

    pub fn permutation() -> Permutation {
        Permutation::new([1, 0, 3, 2, 5, 4, 7, 6])
    }

    pub(super) fn init(&mut self, stage: &mut Stage<'_>) {
        self.travels = plan_travels(stage, &Self::permutation());
    }

    pub(super) fn anim(&mut self, stage: &mut Stage<'_>, t: f32) {
        let eased = settled_sigmoid(t);
        let envelope = (PI * t.clamp(0.0, 1.0)).sin();
        for travel in &self.travels {
            let depth = if travel.to.x > travel.from.x {
                -SWAP_DEPTH
            } else {
                SWAP_DEPTH
            };
            let key = stage.scene.key_mut(travel.identity);
            key.position = travel.from.lerp(travel.to, eased);
            key.z = Z_CENTER + depth * envelope;
        }
    }
}

impl Default for DepthSwapPerm {
    fn default() -> Self {
        Self::new()
    }
}
