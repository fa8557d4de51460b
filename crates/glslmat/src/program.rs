//! Program object lifecycle over the two driver API generations.
//!
//! The generation is picked once at creation time from the driver's reported
//! version; every later call goes through the same family of entry points.

use std::rc::Rc;

use glapi::{
    ActiveUniform, GeometryParam, GlObject, GlProgram, StageKind, UniformLocation, VideoDriver,
    MAX_ATTACHED_STAGES, PROGRAM_API_VERSION,
};

use crate::error::MaterialError;
use crate::types::GeometryStage;

enum ProgramObject {
    Legacy(GlObject),
    Modern(GlProgram),
}

/// A container for compiled stages, owned for the lifetime of one material.
pub struct GlslProgram {
    driver: Rc<dyn VideoDriver>,
    object: ProgramObject,
}

impl GlslProgram {
    /// Creates an empty program, choosing the driver API family by version.
    pub fn create(driver: Rc<dyn VideoDriver>) -> Self {
        let object = if driver.api_version() >= PROGRAM_API_VERSION {
            ProgramObject::Modern(driver.create_program())
        } else {
            ProgramObject::Legacy(driver.create_program_object())
        };
        Self { driver, object }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self.object, ProgramObject::Legacy(_))
    }

    /// Compiles one stage and attaches it on success.
    ///
    /// A stage that fails to compile stays unattached; teardown only walks
    /// attached stages.
    pub fn attach_stage(&self, kind: StageKind, source: &str) -> Result<(), MaterialError> {
        match &self.object {
            ProgramObject::Modern(program) => {
                let shader = self.driver.create_shader(kind);
                self.driver.shader_source(shader, source);
                self.driver.compile_shader(shader);
                if !self.driver.shader_compile_status(shader) {
                    let length = self.driver.shader_info_log_length(shader);
                    let log =
                        (length > 0).then(|| self.driver.shader_info_log(shader, length));
                    report_compile_failure(kind, &log);
                    return Err(MaterialError::Compile { stage: kind, log });
                }
                self.driver.attach_shader(*program, shader);
            }
            ProgramObject::Legacy(program) => {
                let shader = self.driver.create_shader_object(kind);
                self.driver.object_source(shader, source);
                self.driver.compile_object(shader);
                if !self.driver.object_compile_status(shader) {
                    let log = self.object_log(shader);
                    report_compile_failure(kind, &log);
                    return Err(MaterialError::Compile { stage: kind, log });
                }
                self.driver.attach_object(*program, shader);
            }
        }
        Ok(())
    }

    /// Applies the geometry stage's input, output, and vertex-count
    /// parameters through whichever call family owns the program.
    pub fn configure_geometry(&self, geometry: &GeometryStage) {
        let input = self.driver.gl_primitive(geometry.input_kind) as i32;
        let output = self.driver.gl_primitive(geometry.output_kind) as i32;
        let limit = self.driver.max_geometry_output_vertices();
        let vertices_out = if geometry.max_output_vertices == 0 {
            limit
        } else {
            geometry.max_output_vertices.min(limit)
        };
        match &self.object {
            ProgramObject::Modern(program) => {
                self.driver
                    .program_parameter(*program, GeometryParam::InputKind, input);
                self.driver
                    .program_parameter(*program, GeometryParam::OutputKind, output);
                self.driver
                    .program_parameter(*program, GeometryParam::VerticesOut, vertices_out as i32);
            }
            ProgramObject::Legacy(program) => {
                self.driver
                    .object_parameter(*program, GeometryParam::InputKind, input);
                self.driver
                    .object_parameter(*program, GeometryParam::OutputKind, output);
                self.driver
                    .object_parameter(*program, GeometryParam::VerticesOut, vertices_out as i32);
            }
        }
    }

    pub fn link(&self) -> Result<(), MaterialError> {
        let linked = match &self.object {
            ProgramObject::Modern(program) => {
                self.driver.link_program(*program);
                self.driver.program_link_status(*program)
            }
            ProgramObject::Legacy(program) => {
                self.driver.link_program_object(*program);
                self.driver.object_link_status(*program)
            }
        };
        if !linked {
            let log = self.program_log();
            report_link_failure(&log);
            return Err(MaterialError::Link { log });
        }
        Ok(())
    }

    /// Makes this program current on the driver.
    pub fn bind(&self) {
        match &self.object {
            ProgramObject::Modern(program) => self.driver.use_program(*program),
            ProgramObject::Legacy(program) => self.driver.use_program_object(*program),
        }
    }

    /// Restores the fixed-function pipeline.
    pub fn unbind(&self) {
        match &self.object {
            ProgramObject::Modern(_) => self.driver.use_program(GlProgram::NONE),
            ProgramObject::Legacy(_) => self.driver.use_program_object(GlObject::NONE),
        }
    }

    pub(crate) fn active_uniform_count(&self) -> u32 {
        match &self.object {
            ProgramObject::Modern(program) => self.driver.active_uniform_count(*program),
            ProgramObject::Legacy(program) => self.driver.object_active_uniform_count(*program),
        }
    }

    pub(crate) fn active_uniform_max_length(&self) -> u32 {
        match &self.object {
            ProgramObject::Modern(program) => self.driver.active_uniform_max_length(*program),
            ProgramObject::Legacy(program) => {
                self.driver.object_active_uniform_max_length(*program)
            }
        }
    }

    pub(crate) fn active_uniform(&self, index: u32, name_capacity: u32) -> ActiveUniform {
        match &self.object {
            ProgramObject::Modern(program) => {
                self.driver.active_uniform(*program, index, name_capacity)
            }
            ProgramObject::Legacy(program) => {
                self.driver.object_active_uniform(*program, index, name_capacity)
            }
        }
    }

    pub(crate) fn uniform_location(&self, name: &str) -> UniformLocation {
        match &self.object {
            ProgramObject::Modern(program) => self.driver.uniform_location(*program, name),
            ProgramObject::Legacy(program) => self.driver.object_uniform_location(*program, name),
        }
    }

    fn object_log(&self, object: GlObject) -> Option<String> {
        let length = self.driver.object_info_log_length(object);
        (length > 0).then(|| self.driver.object_info_log(object, length))
    }

    fn program_log(&self) -> Option<String> {
        match &self.object {
            ProgramObject::Modern(program) => {
                let length = self.driver.program_info_log_length(*program);
                (length > 0).then(|| self.driver.program_info_log(*program, length))
            }
            ProgramObject::Legacy(program) => self.object_log(*program),
        }
    }
}

impl Drop for GlslProgram {
    fn drop(&mut self) {
        // Some drivers report more attachments than a program can hold, so
        // the walk is capped on both the query and the reply.
        match &self.object {
            ProgramObject::Modern(program) => {
                let shaders = self.driver.attached_shaders(*program, MAX_ATTACHED_STAGES);
                for shader in shaders.into_iter().take(MAX_ATTACHED_STAGES) {
                    self.driver.delete_shader(shader);
                }
                self.driver.delete_program(*program);
            }
            ProgramObject::Legacy(program) => {
                let attached = self.driver.attached_objects(*program, MAX_ATTACHED_STAGES);
                for stage in attached.into_iter().take(MAX_ATTACHED_STAGES) {
                    self.driver.delete_object(stage);
                }
                self.driver.delete_object(*program);
            }
        }
    }
}

fn report_compile_failure(stage: StageKind, log: &Option<String>) {
    tracing::error!(stage = %stage, "GLSL shader failed to compile");
    if let Some(log) = log {
        tracing::error!("{log}");
    }
}

fn report_link_failure(log: &Option<String>) {
    tracing::error!("GLSL shader program failed to link");
    if let Some(log) = log {
        tracing::error!("{log}");
    }
}
