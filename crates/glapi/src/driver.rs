//! The capability seam between material code and the graphics context.
//!
//! `VideoDriver` carries two parallel call families because the two
//! generations of the driver's program model are genuinely different APIs:
//! the modern one distinguishes program and stage names, the legacy
//! extension one pools everything into `GlObject` handles behind a single
//! delete entry point. Material code picks exactly one family per program
//! at construction time and never mixes them.
//!
//! Implementations are expected to be context-bound and single-threaded;
//! every method takes `&self` and mutation stays behind interior
//! mutability, mirroring how the underlying context behaves.

use crate::consts;
use crate::types::{
    DriverFeature, GeometryParam, GlObject, GlProgram, GlShader, Material, PrimitiveKind,
    StageKind, UniformLocation,
};

/// One active uniform as the driver enumerates it after a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveUniform {
    pub name: String,
    /// Raw type tag; see [`UniformType::from_tag`](crate::UniformType::from_tag).
    pub type_tag: u32,
    /// Array element count, 1 for non-arrays.
    pub size: u32,
}

pub trait VideoDriver {
    // Capabilities.

    /// Context version encoded as `major * 100 + minor`.
    fn api_version(&self) -> u32;
    fn has_feature(&self, feature: DriverFeature) -> bool;
    fn max_geometry_output_vertices(&self) -> u32;
    /// Applies the fixed-function state shared by all materials.
    fn set_basic_render_states(&self, material: &Material, last_material: &Material, reset_all: bool);

    /// Translates an abstract primitive kind into the driver's value.
    fn gl_primitive(&self, kind: PrimitiveKind) -> u32 {
        match kind {
            PrimitiveKind::Points => consts::POINTS,
            PrimitiveKind::Lines => consts::LINES,
            PrimitiveKind::LineLoop => consts::LINE_LOOP,
            PrimitiveKind::LineStrip => consts::LINE_STRIP,
            PrimitiveKind::Triangles => consts::TRIANGLES,
            PrimitiveKind::TriangleStrip => consts::TRIANGLE_STRIP,
            PrimitiveKind::TriangleFan => consts::TRIANGLE_FAN,
        }
    }

    // Program-object API (contexts at or above PROGRAM_API_VERSION).

    fn create_program(&self) -> GlProgram;
    fn create_shader(&self, stage: StageKind) -> GlShader;
    fn shader_source(&self, shader: GlShader, source: &str);
    fn compile_shader(&self, shader: GlShader);
    fn shader_compile_status(&self, shader: GlShader) -> bool;
    fn shader_info_log_length(&self, shader: GlShader) -> u32;
    /// Fetches at most `max_length` bytes of compile log.
    fn shader_info_log(&self, shader: GlShader, max_length: u32) -> String;
    fn attach_shader(&self, program: GlProgram, shader: GlShader);
    fn program_parameter(&self, program: GlProgram, param: GeometryParam, value: i32);
    fn link_program(&self, program: GlProgram);
    fn program_link_status(&self, program: GlProgram) -> bool;
    fn program_info_log_length(&self, program: GlProgram) -> u32;
    fn program_info_log(&self, program: GlProgram, max_length: u32) -> String;
    fn active_uniform_count(&self, program: GlProgram) -> u32;
    /// Longest active uniform name, including the terminator.
    fn active_uniform_max_length(&self, program: GlProgram) -> u32;
    /// Fetches one active uniform; the name is truncated to `name_capacity`
    /// bytes including the terminator.
    fn active_uniform(&self, program: GlProgram, index: u32, name_capacity: u32) -> ActiveUniform;
    fn uniform_location(&self, program: GlProgram, name: &str) -> UniformLocation;
    /// Enumerates attached stages, asking the driver for at most `max`.
    fn attached_shaders(&self, program: GlProgram, max: usize) -> Vec<GlShader>;
    fn use_program(&self, program: GlProgram);
    fn delete_shader(&self, shader: GlShader);
    fn delete_program(&self, program: GlProgram);

    // Shader-object extension API (older contexts). Programs and stages
    // share the GlObject name space; delete_object tears down either.

    fn create_program_object(&self) -> GlObject;
    fn create_shader_object(&self, stage: StageKind) -> GlObject;
    fn object_source(&self, object: GlObject, source: &str);
    fn compile_object(&self, object: GlObject);
    fn object_compile_status(&self, object: GlObject) -> bool;
    fn object_link_status(&self, object: GlObject) -> bool;
    fn object_info_log_length(&self, object: GlObject) -> u32;
    /// One log fetch serves compile and link diagnostics alike.
    fn object_info_log(&self, object: GlObject, max_length: u32) -> String;
    fn attach_object(&self, program: GlObject, attachment: GlObject);
    fn object_parameter(&self, program: GlObject, param: GeometryParam, value: i32);
    fn link_program_object(&self, program: GlObject);
    fn object_active_uniform_count(&self, program: GlObject) -> u32;
    fn object_active_uniform_max_length(&self, program: GlObject) -> u32;
    fn object_active_uniform(&self, program: GlObject, index: u32, name_capacity: u32) -> ActiveUniform;
    fn object_uniform_location(&self, program: GlObject, name: &str) -> UniformLocation;
    fn attached_objects(&self, program: GlObject, max: usize) -> Vec<GlObject>;
    fn use_program_object(&self, program: GlObject);
    fn delete_object(&self, object: GlObject);

    // Uniform uploads. Locations are plain slots in both generations, so
    // one family serves both. `count` is the element count; the driver
    // reads exactly `count` times the element width from `values`.

    fn uniform1fv(&self, location: UniformLocation, count: usize, values: &[f32]);
    fn uniform2fv(&self, location: UniformLocation, count: usize, values: &[f32]);
    fn uniform3fv(&self, location: UniformLocation, count: usize, values: &[f32]);
    fn uniform4fv(&self, location: UniformLocation, count: usize, values: &[f32]);
    fn uniform_matrix2fv(&self, location: UniformLocation, count: usize, transpose: bool, values: &[f32]);
    fn uniform_matrix3fv(&self, location: UniformLocation, count: usize, transpose: bool, values: &[f32]);
    fn uniform_matrix4fv(&self, location: UniformLocation, count: usize, transpose: bool, values: &[f32]);
    fn uniform1iv(&self, location: UniformLocation, count: usize, values: &[i32]);
    fn uniform2iv(&self, location: UniformLocation, count: usize, values: &[i32]);
    fn uniform3iv(&self, location: UniformLocation, count: usize, values: &[i32]);
    fn uniform4iv(&self, location: UniformLocation, count: usize, values: &[i32]);
}

