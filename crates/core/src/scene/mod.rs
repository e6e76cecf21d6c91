//! Shared scene state: the eight keys, their slot mapping and the global
//! transform every effect writes into.

use glam::Vec2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{config::DisplayConfig, Permutation, SlotMap, KEY_COUNT};

/// Depth at which a key is drawn at its nominal size.
pub const Z_CENTER: f32 = 1.0;

/// Shake amplitude halves roughly every 0.1s.
const SHAKE_DECAY: f32 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const CORRECT: Self = Self::new(0.30, 0.85, 0.40, 1.0);
    pub const WRONG: Self = Self::new(0.90, 0.25, 0.25, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        let s = 1.0 - t;
        Self {
            r: self.r * s + other.r * t,
            g: self.g * s + other.g * t,
            b: self.b * s + other.b * t,
            a: self.a * s + other.a * t,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// The three tinted layers of a key sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Main = 0,
    Highlight = 1,
    Shadow = 2,
}

/// Per-identity colour table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette([[Rgba; 3]; KEY_COUNT]);

impl Palette {
    pub fn tones(&self, identity: usize) -> [Rgba; 3] {
        self.0[identity]
    }
}

impl Default for Palette {
    fn default() -> Self {
        const HUES: [(f32, f32, f32); KEY_COUNT] = [
            (0.93, 0.33, 0.31),
            (0.96, 0.62, 0.23),
            (0.98, 0.85, 0.29),
            (0.47, 0.80, 0.36),
            (0.27, 0.73, 0.80),
            (0.31, 0.47, 0.89),
            (0.58, 0.38, 0.86),
            (0.89, 0.42, 0.71),
        ];
        Self(HUES.map(|(r, g, b)| {
            [
                Rgba::new(r, g, b, 1.0),
                Rgba::new(r + (1.0 - r) * 0.5, g + (1.0 - g) * 0.5, b + (1.0 - b) * 0.5, 1.0),
                Rgba::new(r * 0.55, g * 0.55, b * 0.55, 1.0),
            ]
        }))
    }
}

/// One animated key, indexed by logical identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub position: Vec2,
    pub z: f32,
    pub scale: f32,
    pub glow: f32,
    pub colors: [Rgba; 3],
    pub hovered: bool,
}

impl Key {
    pub fn color(&self, tone: Tone) -> Rgba {
        self.colors[tone as usize]
    }
}

/// Fixed board geometry: 2 rows by 4 columns around the screen centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub origin: Vec2,
    pub pitch: f32,
    pub key_size: f32,
}

impl Layout {
    pub fn from_display(display: &DisplayConfig) -> Self {
        Self {
            width: display.width,
            height: display.height,
            origin: Vec2::new(display.width * 0.5, display.height * 0.5),
            pitch: display.slot_pitch,
            key_size: display.key_size,
        }
    }

    pub fn slot_position(&self, slot: usize) -> Vec2 {
        let column = (slot % 4) as f32;
        let row = (slot / 4) as f32;
        self.origin + Vec2::new(column - 1.5, row - 0.5) * self.pitch
    }

    /// Centre of the 2×2 block (left or right half) containing `slot`.
    pub fn block_centre(&self, slot: usize) -> Vec2 {
        let side = if slot % 4 < 2 { -1.0 } else { 1.0 };
        self.origin + Vec2::new(side * self.pitch, 0.0)
    }

    /// Perspective projection: offsets from the origin shrink as `z` grows.
    /// Returns the projected position and the size factor.
    pub fn project(&self, position: Vec2, z: f32) -> (Vec2, f32) {
        let factor = Z_CENTER / z.max(0.05);
        (self.origin + (position - self.origin) * factor, factor)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::from_display(&DisplayConfig::default())
    }
}

/// Camera-like state applied to the whole board when drawing and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneGlobals {
    /// Rotation of the whole board about the screen origin, radians. Set by
    /// the host only; effects move keys in board space instead.
    pub rotation: f32,
    /// Board zoom, set by the host only.
    pub scale: f32,
    pub shake_offset: Vec2,
    pub shake_amplitude: f32,
    pub show_hitboxes: bool,
}

impl Default for SceneGlobals {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale: 1.0,
            shake_offset: Vec2::ZERO,
            shake_amplitude: 0.0,
            show_hitboxes: false,
        }
    }
}

/// Axis-aligned interactive rectangle in screen space, tagged with a key identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub identity: usize,
    pub min: Vec2,
    pub max: Vec2,
}

impl HitRegion {
    pub fn around(identity: usize, centre: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size * 0.5);
        Self {
            identity,
            min: centre - half,
            max: centre + half,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HitRegions {
    regions: Vec<HitRegion>,
}

impl HitRegions {
    /// Registers or replaces the region for `region.identity`.
    pub fn register(&mut self, region: HitRegion) {
        self.regions.retain(|r| r.identity != region.identity);
        self.regions.push(region);
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitRegion> {
        self.regions.iter()
    }

    /// Identity of the most recently registered region under `point`.
    pub fn hit(&self, point: Vec2) -> Option<usize> {
        self.regions
            .iter()
            .rev()
            .find(|r| r.contains(point))
            .map(|r| r.identity)
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub layout: Layout,
    pub globals: SceneGlobals,
    pub hit_regions: HitRegions,
    /// Identity the audience is asked to follow.
    pub tracked_key: usize,
    /// Identity picked during the interactive phase.
    pub chosen_key: Option<usize>,
    keys: [Key; KEY_COUNT],
    mapping: SlotMap,
    palette: Palette,
    jitter: StdRng,
}

impl Scene {
    pub fn new(layout: Layout, start: Permutation, palette: Palette) -> Self {
        let blank = Key {
            position: layout.origin,
            z: Z_CENTER,
            scale: 1.0,
            glow: 0.0,
            colors: [Rgba::WHITE; 3],
            hovered: false,
        };
        let mut scene = Self {
            layout,
            globals: SceneGlobals::default(),
            hit_regions: HitRegions::default(),
            tracked_key: 0,
            chosen_key: None,
            keys: [blank; KEY_COUNT],
            mapping: SlotMap::seeded(start),
            palette,
            jitter: StdRng::seed_from_u64(0x11b0),
        };
        scene.reset_key_positions();
        scene
    }

    pub fn keys(&self) -> &[Key; KEY_COUNT] {
        &self.keys
    }

    pub fn key(&self, identity: usize) -> &Key {
        &self.keys[identity]
    }

    pub fn key_mut(&mut self, identity: usize) -> &mut Key {
        &mut self.keys[identity]
    }

    pub fn mapping(&self) -> &SlotMap {
        &self.mapping
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Canonical position of the slot `identity` currently occupies.
    pub fn home_position(&self, identity: usize) -> Vec2 {
        self.layout.slot_position(self.mapping.slot_of(identity))
    }

    /// Permanently moves keys along `perm`.
    pub fn commit(&mut self, perm: &Permutation) {
        if perm.is_identity() {
            return;
        }
        self.mapping.apply(perm);
        tracing::debug!(%perm, mapping = %self.mapping.as_permutation(), "committed permutation");
    }

    /// Snaps every key back onto its slot with default depth, scale and colour.
    pub fn reset_key_positions(&mut self) {
        for identity in 0..KEY_COUNT {
            let position = self.home_position(identity);
            let colors = self.palette.tones(identity);
            let key = &mut self.keys[identity];
            key.position = position;
            key.z = Z_CENTER;
            key.scale = 1.0;
            key.glow = 0.0;
            key.colors = colors;
            key.hovered = false;
        }
    }

    pub fn shake(&mut self, amplitude: f32) {
        self.globals.shake_amplitude = self.globals.shake_amplitude.max(amplitude);
    }

    pub fn update_shake(&mut self, dt: f32) {
        let amplitude = self.globals.shake_amplitude;
        if amplitude < 0.01 {
            self.globals.shake_amplitude = 0.0;
            self.globals.shake_offset = Vec2::ZERO;
            return;
        }
        self.globals.shake_offset = Vec2::new(
            self.jitter.gen_range(-1.0..=1.0),
            self.jitter.gen_range(-1.0..=1.0),
        ) * amplitude;
        self.globals.shake_amplitude = amplitude * (-SHAKE_DECAY * dt).exp();
    }

    /// Applies the global rotation, scale and shake to a board-space point.
    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        let origin = self.layout.origin;
        let rotated = Vec2::from_angle(self.globals.rotation).rotate(point - origin);
        origin + rotated * self.globals.scale + self.globals.shake_offset
    }

    /// Inverse of [`Scene::to_screen`].
    pub fn to_board(&self, point: Vec2) -> Vec2 {
        let origin = self.layout.origin;
        let local = (point - origin - self.globals.shake_offset) / self.globals.scale.max(1e-4);
        origin + Vec2::from_angle(-self.globals.rotation).rotate(local)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Layout::default(), Permutation::IDENTITY, Palette::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_form_a_square_grid() {
        let layout = Layout::default();
        assert_eq!(layout.slot_position(0), Vec2::new(960.0 - 390.0, 540.0 - 130.0));
        assert_eq!(layout.slot_position(7), Vec2::new(960.0 + 390.0, 540.0 + 130.0));
        let left = layout.block_centre(5);
        assert_eq!(left, Vec2::new(700.0, 540.0));
        assert_eq!(layout.block_centre(6), Vec2::new(1220.0, 540.0));
    }

    #[test]
    fn reset_places_keys_by_mapping() {
        let start = Permutation::cycle(&[0, 1, 5, 4]);
        let scene = Scene::new(Layout::default(), start, Palette::default());
        assert_eq!(scene.key(0).position, scene.layout.slot_position(1));
        assert_eq!(scene.key(2).position, scene.layout.slot_position(2));
        assert_eq!(scene.key(3).colors, Palette::default().tones(3));
    }

    #[test]
    fn commit_then_reset_moves_keys() {
        let mut scene = Scene::default();
        scene.commit(&Permutation::literal("76543210"));
        scene.reset_key_positions();
        assert_eq!(scene.mapping().key_at(7), 0);
        assert_eq!(scene.key(0).position, scene.layout.slot_position(7));
    }

    #[test]
    fn projection_shrinks_towards_origin() {
        let layout = Layout::default();
        let point = layout.origin + Vec2::new(100.0, 0.0);
        let (near, near_size) = layout.project(point, Z_CENTER);
        let (far, far_size) = layout.project(point, 2.0);
        assert_eq!(near, point);
        assert_eq!(near_size, 1.0);
        assert_eq!(far, layout.origin + Vec2::new(50.0, 0.0));
        assert_eq!(far_size, 0.5);
    }

    #[test]
    fn screen_transform_round_trips() {
        let mut scene = Scene::default();
        scene.globals.rotation = 0.7;
        scene.globals.scale = 1.3;
        scene.globals.shake_offset = Vec2::new(4.0, -2.0);
        let point = Vec2::new(321.0, 654.0);
        let back = scene.to_board(scene.to_screen(point));
        assert!((back - point).length() < 1e-2);
    }

    #[test]
    fn shake_decays_to_rest() {
        let mut scene = Scene::default();
        scene.shake(20.0);
        scene.update_shake(1.0 / 60.0);
        assert!(scene.globals.shake_offset.length() <= 20.0 * 2f32.sqrt());
        for _ in 0..300 {
            scene.update_shake(1.0 / 60.0);
        }
        assert_eq!(scene.globals.shake_amplitude, 0.0);
        assert_eq!(scene.globals.shake_offset, Vec2::ZERO);
    }

    #[test]
    fn hit_regions_prefer_latest() {
        let mut regions = HitRegions::default();
        regions.register(HitRegion::around(1, Vec2::new(100.0, 100.0), 50.0));
        regions.register(HitRegion::around(2, Vec2::new(110.0, 100.0), 50.0));
        assert_eq!(regions.hit(Vec2::new(105.0, 100.0)), Some(2));
        assert_eq!(regions.hit(Vec2::new(80.0, 100.0)), Some(1));
        assert_eq!(regions.hit(Vec2::new(0.0, 0.0)), None);
        regions.clear();
        assert!(regions.is_empty());
    }
}
