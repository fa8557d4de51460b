//! GLSL material management over a generation-split driver interface.
//!
//! The crate turns stage sources into registered materials and drives them
//! around draws. The overall flow is:
//!
//! ```text
//!   ShaderMaterialDesc
//!          │ ShaderMaterial::create
//!          ▼
//!   GlslProgram (compile ─▶ attach ─▶ link) ──▶ UniformTable (introspect)
//!          │                                          ▲
//!          ▼                                          │ set_floats / set_ints
//!   MaterialRegistry::register_material ──▶ material id
//!          │
//!          ▼
//!   on_set_material ─▶ on_render ─▶ ShaderConstantCallback ─▶ on_unset_material
//! ```
//!
//! `GlslProgram` picks the legacy or modern driver entry points once at
//! creation; everything above it is family-agnostic. A material whose program
//! fails anywhere along the pipeline is handed back inert under
//! [`NO_MATERIAL`].

mod error;
mod material;
mod program;
mod registry;
mod types;
mod uniforms;

pub use error::MaterialError;
pub use glapi::Material;
pub use material::ShaderMaterial;
pub use program::GlslProgram;
pub use registry::{BaseMaterial, MaterialRegistry, MaterialRenderer, NO_MATERIAL};
pub use types::{
    BaseMaterialKind, GeometryStage, ShaderConstantCallback, ShaderMaterialDesc, StageSource,
};
pub use uniforms::{UniformDescriptor, UniformTable};
