//! Driver abstraction for the GLSL material workspace.
//!
//! The crate defines the handle and capability vocabulary shared by the
//! material layer and whatever graphics context ultimately executes the
//! calls:
//!
//! - `types` holds the handle newtypes, the stage/primitive/feature enums,
//!   and the closed [`UniformType`] set the write dispatch understands.
//! - `driver` declares [`VideoDriver`], the two-generation call surface a
//!   context implements.
//! - `sim` ships [`sim::SimDriver`], a journaling in-memory implementation
//!   used by the material tests and the `matprobe` dry-run tool.
//! - `consts` carries the raw values that cross the boundary untyped.

pub mod consts;
pub mod sim;

mod driver;
mod types;

pub use driver::{ActiveUniform, VideoDriver};
pub use types::{
    DriverFeature, GeometryParam, GlObject, GlProgram, GlShader, Material, PrimitiveKind,
    StageKind, UniformLocation, UniformType, UnknownUniformType, MAX_ATTACHED_STAGES,
    PROGRAM_API_VERSION,
};
