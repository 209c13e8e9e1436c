//! A single falling petal.

use glam::Vec2;

use crate::api::surface::Viewport;
use crate::renderer::instance::PetalInstance;

/// Kinematic state of one petal. Positions in px, speeds in px/tick,
/// angles in degrees, swing in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub opacity: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub swing_phase: f32,
    pub swing_speed: f32,
}

impl Particle {
    /// A still petal at `pos`. Mostly useful for placing petals by hand.
    pub fn new(pos: Vec2, size: f32) -> Self {
        Particle {
            pos,
            velocity: Vec2::ZERO,
            size,
            opacity: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            swing_phase: 0.0,
            swing_speed: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_rotation(mut self, rotation: f32, rotation_speed: f32) -> Self {
        self.rotation = rotation;
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_swing(mut self, phase: f32, speed: f32) -> Self {
        self.swing_phase = phase;
        self.swing_speed = speed;
        self
    }

    /// Horizontal swing offset for the current phase. |offset| <= amplitude.
    pub fn swing_offset(&self, amplitude: f32) -> f32 {
        self.swing_phase.sin() * amplitude
    }

    /// Advance one tick. Returns the swing offset that was applied.
    pub fn tick(&mut self, amplitude: f32) -> f32 {
        self.swing_phase += self.swing_speed;
        let swing = self.swing_offset(amplitude);
        self.pos.x += self.velocity.x + swing;
        self.pos.y += self.velocity.y;
        self.rotation += self.rotation_speed;
        swing
    }

    /// True when the petal has left the viewport by more than
    /// `margin_factor × size` below, left or right. Petals above the top
    /// edge are still falling in.
    pub fn is_outside(&self, viewport: Viewport, margin_factor: f32) -> bool {
        let margin = self.size * margin_factor;
        self.pos.y > viewport.height + margin
            || self.pos.x < -margin
            || self.pos.x > viewport.width + margin
    }

    pub fn to_instance(&self, aspect: f32) -> PetalInstance {
        PetalInstance {
            x: self.pos.x,
            y: self.pos.y,
            width: self.size,
            height: self.size * aspect,
            rotation: self.rotation,
            opacity: self.opacity,
        }
    }
}
