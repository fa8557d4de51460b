//! Seams between a shader material and the renderer that owns it.
//!
//! The material calls out through these traits instead of holding a concrete
//! renderer type, so the same lifecycle code serves real drivers and the
//! simulated one.

use std::rc::Rc;

use glapi::Material;

use crate::types::BaseMaterialKind;

/// Identifier returned when material creation fails.
pub const NO_MATERIAL: i32 = -1;

/// Hooks the renderer drives over a registered material.
pub trait MaterialRenderer {
    /// The scene switched to this material (or forced a full state reset).
    fn on_set_material(&self, material: &Material, last_material: &Material, reset_all: bool);

    /// About to draw with this material. Returns whether drawing may proceed.
    fn on_render(&self) -> bool;

    /// The scene is leaving this material.
    fn on_unset_material(&self);

    /// Whether geometry drawn with this material needs blending order.
    fn is_transparent(&self) -> bool;
}

/// Fixed-function material a shader material layers itself over.
pub trait BaseMaterial {
    fn apply(&self, material: &Material);
    fn restore(&self);
    fn is_transparent(&self) -> bool;
}

/// Owner of the material table and the fixed-function delegates.
pub trait MaterialRegistry {
    /// Adds a renderer and returns its public material identifier.
    fn register_material(&mut self, renderer: Rc<dyn MaterialRenderer>) -> i32;

    /// Looks up the fixed-function delegate for a blending kind.
    fn base_material(&self, kind: BaseMaterialKind) -> Option<Rc<dyn BaseMaterial>>;
}
