pub mod api;
pub mod core;
pub mod renderer;

// Re-export key types at crate root for convenience
pub use api::config::{FieldConfig, MAX_COUNT, MIN_FALL_SPEED, MIN_SWING_SPEED};
pub use api::surface::{Surface, Viewport};
pub use crate::core::field::ParticleField;
pub use crate::core::particle::Particle;
pub use crate::core::rng::{lerp, Rng};
pub use renderer::instance::{InstanceBuffer, PetalInstance};
