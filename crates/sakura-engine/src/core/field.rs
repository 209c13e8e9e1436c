//! The petal field: a fixed-size pool of falling petals.
//!
//! Petals that leave the viewport are recycled in place: the replacement
//! takes over the exited petal's slot, so the pool never changes size and a
//! pass over the slots never skips or revisits a petal.

use std::f32::consts::TAU;

use glam::Vec2;

use super::particle::Particle;
use super::rng::Rng;
use crate::api::config::{FieldConfig, MIN_FALL_SPEED};
use crate::api::surface::Viewport;
use crate::renderer::instance::InstanceBuffer;

pub struct ParticleField {
    config: FieldConfig,
    viewport: Viewport,
    particles: Vec<Particle>,
    rng: Rng,
    /// Slots replaced during the last `tick` or `resize`.
    recycled: Vec<usize>,
}

impl ParticleField {
    /// Create a field and spawn `config.count` petals into it.
    pub fn new(config: FieldConfig, viewport: Viewport) -> Self {
        let config = config.normalized();
        let count = config.count;
        let mut field = ParticleField {
            rng: Rng::new(config.seed),
            config,
            viewport,
            particles: Vec::with_capacity(count),
            recycled: Vec::with_capacity(count),
        };
        for _ in 0..count {
            let particle = field.spawn();
            field.particles.push(particle);
        }
        field
    }

    /// Roll a fresh petal above the viewport.
    pub fn spawn(&mut self) -> Particle {
        let c = &self.config;
        let rng = &mut self.rng;

        let size = rng.in_range(c.size_range);
        let x = rng.range(0.0, self.viewport.width);
        let y = rng.in_range(c.spawn_y_range);
        let opacity = rng.in_range(c.opacity_range);
        let rotation = rng.range(0.0, 360.0);

        let factor = c.speed_factor(size);
        let vx = rng.in_range(c.drift_range) * factor;
        let vy = (rng.in_range(c.fall_range) * factor).max(MIN_FALL_SPEED);

        let rotation_speed = rng.in_range(c.spin_range);
        let swing_phase = rng.range(0.0, TAU);
        let swing_speed = rng.in_range(c.swing_speed_range);

        Particle {
            pos: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            size,
            opacity,
            rotation,
            rotation_speed,
            swing_phase,
            swing_speed,
        }
    }

    /// Advance every petal one step, then recycle those that fell out.
    /// Returns the recycled slot indices.
    pub fn tick(&mut self) -> &[usize] {
        self.recycled.clear();
        let amplitude = self.config.swing_amplitude;
        let margin = self.config.exit_margin;

        for i in 0..self.particles.len() {
            self.particles[i].tick(amplitude);
            if self.particles[i].is_outside(self.viewport, margin) {
                self.particles[i] = self.spawn();
                self.recycled.push(i);
            }
        }

        if !self.recycled.is_empty() {
            log::debug!("recycled {} petals", self.recycled.len());
        }
        &self.recycled
    }

    /// Update the bounds used by later spawns and ticks. Nothing is recycled.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Adopt a new viewport and recycle every petal now outside it
    /// (using `resize_margin`). Returns the recycled slot indices.
    pub fn resize(&mut self, viewport: Viewport) -> &[usize] {
        self.viewport = viewport;
        self.recycled.clear();
        let margin = self.config.resize_margin;

        for i in 0..self.particles.len() {
            if self.particles[i].is_outside(viewport, margin) {
                self.particles[i] = self.spawn();
                self.recycled.push(i);
            }
        }

        log::debug!(
            "viewport {}x{}: recycled {} petals",
            viewport.width,
            viewport.height,
            self.recycled.len()
        );
        &self.recycled
    }

    /// Rebuild `buffer` with one instance per slot, in slot order.
    pub fn write_instances(&self, buffer: &mut InstanceBuffer) {
        buffer.clear();
        for p in &self.particles {
            buffer.push(p.to_instance(self.config.aspect));
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Slots replaced by the most recent `tick` or `resize`.
    pub fn recycled(&self) -> &[usize] {
        &self.recycled
    }

    pub fn particle_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}
