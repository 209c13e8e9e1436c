//! Host boundary for drawing petals.
//!
//! The engine never touches browser globals. A host (the DOM bridge, a canvas
//! renderer, a test double) implements `Surface` and hands it to the runner.

use crate::renderer::instance::PetalInstance;

/// Visible area in px.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Something petals can be attached to and drawn on.
///
/// Each live particle owns one `Handle`. When a particle is recycled the old
/// handle is detached and a fresh one attached in its slot.
pub trait Surface {
    /// Per-petal visual element (e.g. a DOM node).
    type Handle;
    /// Host-side failure (e.g. `JsValue` for DOM calls).
    type Error;

    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Create a visual element for a new petal.
    fn attach(&mut self, petal: &PetalInstance) -> Result<Self::Handle, Self::Error>;

    /// Remove a petal's visual element.
    fn detach(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;

    /// Move/rotate an attached element to match the petal's state.
    fn draw(&mut self, handle: &Self::Handle, petal: &PetalInstance) -> Result<(), Self::Error>;
}
