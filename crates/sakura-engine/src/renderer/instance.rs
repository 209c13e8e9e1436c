//! Flat per-petal render records for hosts that draw from WASM memory.

use bytemuck::{Pod, Zeroable};

/// Per-petal render data, rebuilt every frame.
/// Read directly from WASM memory by canvas hosts: 6 floats = 24 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PetalInstance {
    /// Left edge in px.
    pub x: f32,
    /// Top edge in px.
    pub y: f32,
    /// Rendered width in px (the petal size).
    pub width: f32,
    /// Rendered height in px (size × aspect).
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub opacity: f32,
}

impl PetalInstance {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Flat buffer of petal instances, one per field slot.
pub struct InstanceBuffer {
    pub instances: Vec<PetalInstance>,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(64),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: PetalInstance) {
        self.instances.push(instance);
    }

    pub fn get(&self, index: usize) -> Option<&PetalInstance> {
        self.instances.get(index)
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// The buffer as raw floats.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Raw pointer to instance data for direct memory reads from JS.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::new()
    }
}
