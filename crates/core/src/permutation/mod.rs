//! Slot permutations and the identity→slot mapping they act on.
//!
//! A [`Permutation`] describes where every slot's occupant ends up: the key
//! sitting in slot `s` moves to slot `p[s]`. A [`SlotMap`] records, for every
//! logical key, the slot it currently occupies. Committing a permutation
//! recomposes the map, so it stays a bijection on `0..8` for its whole life.

use std::{fmt, str::FromStr};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{LimboError, Result};

/// Number of keys (and slots) on the board.
pub const KEY_COUNT: usize = 8;

/// Horizontal and vertical neighbours on the 2×4 slot grid.
/// Slots 0..4 form the top row, 4..8 the bottom row.
const NEIGHBOURS: [&[usize]; KEY_COUNT] = [
    &[1, 4],
    &[0, 2, 5],
    &[1, 3, 6],
    &[2, 7],
    &[0, 5],
    &[4, 6, 1],
    &[5, 7, 2],
    &[6, 3],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permutation([u8; KEY_COUNT]);

impl Permutation {
    pub const IDENTITY: Self = Self([0, 1, 2, 3, 4, 5, 6, 7]);

    /// Builds a permutation from explicit targets.
    ///
    /// # Panics
    /// Panics when `targets` is not a bijection on `0..8`.
    pub fn new(targets: [u8; KEY_COUNT]) -> Self {
        match Self::try_new(targets) {
            Ok(perm) => perm,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(targets: [u8; KEY_COUNT]) -> Result<Self> {
        let mut seen = [false; KEY_COUNT];
        for &target in &targets {
            let index = target as usize;
            if index >= KEY_COUNT || seen[index] {
                return Err(LimboError::InvalidPermutation(format!("{targets:?}")));
            }
            seen[index] = true;
        }
        Ok(Self(targets))
    }

    /// Parses an authored permutation literal.
    ///
    /// # Panics
    /// Panics on malformed input; authored scripts must be valid.
    pub fn literal(text: &str) -> Self {
        match text.parse() {
            Ok(perm) => perm,
            Err(err) => panic!("{err}"),
        }
    }

    /// Cyclic permutation moving `slots[0] → slots[1] → … → slots[0]`.
    ///
    /// # Panics
    /// Panics when a slot repeats or is out of range.
    pub fn cycle(slots: &[usize]) -> Self {
        let mut targets = Self::IDENTITY.0;
        for (i, &from) in slots.iter().enumerate() {
            let to = slots[(i + 1) % slots.len()];
            assert!(from < KEY_COUNT && to < KEY_COUNT, "slot out of range in {slots:?}");
            targets[from] = to as u8;
        }
        Self::new(targets)
    }

    /// Slot that the occupant of `slot` moves to.
    pub fn target(&self, slot: usize) -> usize {
        self.0[slot] as usize
    }

    pub fn targets(&self) -> [u8; KEY_COUNT] {
        self.0
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn inverse(&self) -> Self {
        let mut out = [0u8; KEY_COUNT];
        for (slot, &target) in self.0.iter().enumerate() {
            out[target as usize] = slot as u8;
        }
        Self(out)
    }

    /// Permutation equivalent to applying `self` first and `next` second.
    pub fn then(&self, next: &Permutation) -> Self {
        let mut out = [0u8; KEY_COUNT];
        for (slot, &mid) in self.0.iter().enumerate() {
            out[slot] = next.0[mid as usize];
        }
        Self(out)
    }
}

impl Default for Permutation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FromStr for Permutation {
    type Err = LimboError;

    /// Accepts 8 symbols, each either a digit `0`–`7` or a letter `a`–`h`.
    fn from_str(text: &str) -> Result<Self> {
        let invalid = || LimboError::InvalidPermutation(text.to_string());
        let symbols: Vec<char> = text.trim().chars().collect();
        if symbols.len() != KEY_COUNT {
            return Err(invalid());
        }

        let mut targets = [0u8; KEY_COUNT];
        for (slot, symbol) in symbols.into_iter().enumerate() {
            targets[slot] = match symbol.to_ascii_lowercase() {
                c @ '0'..='7' => c as u8 - b'0',
                c @ 'a'..='h' => c as u8 - b'a',
                _ => return Err(invalid()),
            };
        }
        Self::try_new(targets).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Permutation {
    type Error = LimboError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Permutation> for String {
    fn from(value: Permutation) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for target in self.0 {
            write!(f, "{target}")?;
        }
        Ok(())
    }
}

/// Identity→slot bijection: which slot every logical key occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMap {
    slots: [u8; KEY_COUNT],
}

impl SlotMap {
    pub fn new() -> Self {
        Self {
            slots: Permutation::IDENTITY.0,
        }
    }

    /// Map where key `i` starts in slot `start[i]`.
    pub fn seeded(start: Permutation) -> Self {
        let mut map = Self::new();
        map.apply(&start);
        map
    }

    pub fn slot_of(&self, identity: usize) -> usize {
        self.slots[identity] as usize
    }

    /// Logical key currently sitting in `slot`.
    pub fn key_at(&self, slot: usize) -> usize {
        self.slots
            .iter()
            .position(|&s| s as usize == slot)
            .unwrap_or(slot)
    }

    /// Moves every key along `perm`.
    pub fn apply(&mut self, perm: &Permutation) {
        for slot in &mut self.slots {
            *slot = perm.0[*slot as usize];
        }
    }

    /// Undoes a previous [`SlotMap::apply`] with the same permutation.
    pub fn apply_inverse(&mut self, perm: &Permutation) {
        self.apply(&perm.inverse());
    }

    pub fn as_permutation(&self) -> Permutation {
        Permutation(self.slots)
    }
}

impl Default for SlotMap {
    fn default() -> Self {
        Self::new()
    }
}

/// A path of four distinct, consecutively adjacent slots on the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCycle(pub [u8; 4]);

impl FourCycle {
    pub fn permutation(&self) -> Permutation {
        let slots = self.0.map(usize::from);
        Permutation::cycle(&slots)
    }
}

impl fmt::Display for FourCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "0x{a}{b}{c}{d}")
    }
}

/// Every four-slot walk `i → j → k → l` on the grid with distinct slots.
pub fn four_cycles() -> Vec<FourCycle> {
    let mut cycles = Vec::new();
    for i in 0..KEY_COUNT {
        for &j in NEIGHBOURS[i] {
            for &k in NEIGHBOURS[j] {
                if k == i {
                    continue;
                }
                for &l in NEIGHBOURS[k] {
                    if l == j || l == i {
                        continue;
                    }
                    cycles.push(FourCycle([i as u8, j as u8, k as u8, l as u8]));
                }
            }
        }
    }
    cycles
}

/// Picks a starting permutation from the four-cycle table.
pub fn random_start<R: Rng + ?Sized>(rng: &mut R) -> Permutation {
    four_cycles()
        .choose(rng)
        .map(FourCycle::permutation)
        .unwrap_or_default()
}
