//! Rendering boundary
//!
//! The core knows nothing about pixels or draw calls. Components receive an
//! opaque [`RenderContext`] during the render pass and downcast it to the
//! backend type they were written for.

use std::any::Any;

/// Opaque rendering-context handle passed through `Entity::render`
pub trait RenderContext {
    /// Access the concrete backend context
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> RenderContext for T {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
