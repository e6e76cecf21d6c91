//! Drawing seam. The host implements [`Canvas`]; this module decides what to
//! draw for the base pass.

use glam::Vec2;

use crate::{
    assets::{AssetStore, KeyLayer, Sprite},
    scene::{Rgba, Scene},
    KEY_COUNT,
};

/// Global transform applied to subsequent draws: rotate and scale about
/// `pivot`, then translate by `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pivot: Vec2,
    pub offset: Vec2,
    pub scale: f32,
    pub rotation: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        pivot: Vec2::ZERO,
        offset: Vec2::ZERO,
        scale: 1.0,
        rotation: 0.0,
    };

    pub fn of_scene(scene: &Scene) -> Self {
        Self {
            pivot: scene.layout.origin,
            offset: scene.globals.shake_offset,
            scale: scene.globals.scale,
            rotation: scene.globals.rotation,
        }
    }
}

/// Render surface provided by the host.
pub trait Canvas {
    fn begin_frame(&mut self);
    fn end_frame(&mut self);
    fn set_transform(&mut self, transform: Transform);
    /// Draws `sprite` centred on `position` as a `size` pixel square.
    fn draw_textured_quad(&mut self, sprite: Sprite, position: Vec2, size: f32, tint: Rgba);
    fn draw_rect_outline(&mut self, min: Vec2, max: Vec2, color: Rgba);
    fn draw_text(&mut self, text: &str, position: Vec2, size: f32, color: Rgba);
}

/// Base pass: every key, back to front, through the scene transform.
pub fn draw_scene(scene: &Scene, assets: &AssetStore, canvas: &mut dyn Canvas) {
    canvas.set_transform(Transform::of_scene(scene));

    let keys = scene.keys();
    let mut order: [usize; KEY_COUNT] = std::array::from_fn(|i| i);
    order.sort_by(|&a, &b| keys[b].z.total_cmp(&keys[a].z));

    for identity in order {
        let key = &keys[identity];
        let (position, factor) = scene.layout.project(key.position, key.z);
        let size = scene.layout.key_size * key.scale * factor;
        for layer in KeyLayer::ALL {
            let Some(sprite) = assets.layer(layer) else {
                continue;
            };
            let tint = match layer.tone() {
                Some(tone) => key.color(tone).lerp(Rgba::WHITE, key.glow * 0.5),
                None if key.hovered => Rgba::new(1.0, 0.95, 0.4, 1.0),
                None => Rgba::WHITE,
            };
            canvas.draw_textured_quad(sprite, position, size, tint);
        }
    }

    if scene.globals.show_hitboxes {
        canvas.set_transform(Transform::IDENTITY);
        for region in scene.hit_regions.iter() {
            canvas.draw_rect_outline(region.min, region.max, Rgba::new(1.0, 0.0, 1.0, 1.0));
        }
    }
}

/// Draw calls captured by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Transform(Transform),
    Quad {
        sprite: Sprite,
        position: Vec2,
        size: f32,
        tint: Rgba,
    },
    Outline {
        min: Vec2,
        max: Vec2,
    },
    Text {
        text: String,
        position: Vec2,
        size: f32,
        color: Rgba,
    },
}

/// Canvas that keeps the calls of the current frame instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    calls: Vec<DrawCall>,
    frames: u64,
    in_frame: bool,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn quad_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Quad { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn begin_frame(&mut self) {
        self.calls.clear();
        self.in_frame = true;
    }

    fn end_frame(&mut self) {
        if self.in_frame {
            self.frames += 1;
        }
        self.in_frame = false;
    }

    fn set_transform(&mut self, transform: Transform) {
        self.calls.push(DrawCall::Transform(transform));
    }

    fn draw_textured_quad(&mut self, sprite: Sprite, position: Vec2, size: f32, tint: Rgba) {
        self.calls.push(DrawCall::Quad {
            sprite,
            position,
            size,
            tint,
        });
    }

    fn draw_rect_outline(&mut self, min: Vec2, max: Vec2, _color: Rgba) {
        self.calls.push(DrawCall::Outline { min, max });
    }

    fn draw_text(&mut self, text: &str, position: Vec2, size: f32, color: Rgba) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            position,
            size,
            color,
        });
    }
}
