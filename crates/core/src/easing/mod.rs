//! Easing curves shared by the effects. All take normalized time.

use std::f32::consts::TAU;

/// Logistic ease: `1 / (1 + e^(-10(t - 0.5)))`.
pub fn sigmoid(t: f32) -> f32 {
    1.0 / (1.0 + (-10.0 * (t - 0.5)).exp())
}

/// [`sigmoid`] rescaled so `t = 0` maps to exactly 0 and `t = 1` to exactly 1.
/// Input is clamped to `[0, 1]`.
pub fn settled_sigmoid(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let low = sigmoid(0.0);
    let high = sigmoid(1.0);
    ((sigmoid(t) - low) / (high - low)).clamp(0.0, 1.0)
}

/// Cubic smoothstep on `t` clamped to `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// `flashes` pulses across `[0, 1]`, each peaking at 1 in the middle of its period.
pub fn flash(t: f32, flashes: u32) -> f32 {
    let wave = 0.5 + 0.5 * (TAU * flashes as f32 * t).cos();
    1.0 - wave * wave
}

/// Triangle envelope: 0 at both ends, 1 at `t = 0.5`.
pub fn linear_hop(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (2.0 * t - 1.0).abs()
}

/// Overshooting entrance used by the countdown text.
pub fn bounce_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let c1 = 1.70158;
    let c3 = c1 + 1.0;
    1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
