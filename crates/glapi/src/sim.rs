//! In-memory stand-in for a real graphics context.
//!
//! `SimDriver` honours the full [`VideoDriver`] surface without touching a
//! GPU: handles come from a counter, compile and link verdicts come from
//! [`SimConfig`], and every call lands in an ordered [`SimEvent`] journal
//! that callers can read back. Material tests assert against the journal,
//! and the `matprobe` binary uses the same driver to dry-run manifests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::driver::{ActiveUniform, VideoDriver};
use crate::types::{
    DriverFeature, GeometryParam, GlObject, GlProgram, GlShader, Material, StageKind,
    UniformLocation,
};

/// One uniform the simulated context reports for a linked program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimUniform {
    pub name: String,
    pub type_tag: u32,
    /// Array element count, 1 for non-arrays.
    pub size: u32,
    pub location: i32,
}

impl SimUniform {
    pub fn new(name: impl Into<String>, type_tag: u32, location: i32) -> Self {
        Self {
            name: name.into(),
            type_tag,
            size: 1,
            location,
        }
    }
}

/// Behaviour knobs for [`SimDriver`].
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Context version encoded as `major * 100 + minor`.
    pub version: u32,
    pub glsl_supported: bool,
    pub geometry_supported: bool,
    pub max_geometry_output_vertices: u32,
    /// Stages whose compilation the context rejects.
    pub fail_compile: Vec<StageKind>,
    /// Info log reported for rejected stages; empty means length zero.
    pub compile_log: String,
    pub fail_link: bool,
    pub link_log: String,
    /// Active uniforms reported once a program links.
    pub uniforms: Vec<SimUniform>,
    /// Overrides the reported max uniform name length.
    pub uniform_name_max: Option<u32>,
    /// Report every attachment even when the caller asked for fewer.
    pub ignore_attachment_cap: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            version: 200,
            glsl_supported: true,
            geometry_supported: true,
            max_geometry_output_vertices: 1024,
            fail_compile: Vec::new(),
            compile_log: String::new(),
            fail_link: false,
            link_log: String::new(),
            uniforms: Vec::new(),
            uniform_name_max: None,
            ignore_attachment_cap: false,
        }
    }
}

/// Everything the simulated context was asked to do, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    ProgramCreated { handle: u32, legacy: bool },
    StageCreated { handle: u32, stage: StageKind, legacy: bool },
    SourceLoaded { handle: u32 },
    Compiled { handle: u32, ok: bool },
    Attached { program: u32, stage: u32 },
    ParameterSet { program: u32, param: GeometryParam, value: i32 },
    Linked { program: u32, ok: bool },
    ProgramBound { handle: u32, legacy: bool },
    StageDeleted { handle: u32 },
    ProgramDeleted { handle: u32 },
    ObjectDeleted { handle: u32 },
    StatesApplied { reset_all: bool },
    FloatsWritten { location: i32, width: usize, count: usize, values: Vec<f32> },
    MatrixWritten { location: i32, dimension: usize, count: usize, transpose: bool, values: Vec<f32> },
    IntsWritten { location: i32, width: usize, count: usize, values: Vec<i32> },
}

struct StageRecord {
    stage: StageKind,
    compiled_ok: bool,
}

#[derive(Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    linked_ok: bool,
}

#[derive(Default)]
struct SimState {
    next_handle: u32,
    stages: HashMap<u32, StageRecord>,
    programs: HashMap<u32, ProgramRecord>,
}

pub struct SimDriver {
    config: SimConfig,
    state: RefCell<SimState>,
    journal: RefCell<Vec<SimEvent>>,
}

impl SimDriver {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            state: RefCell::new(SimState::default()),
            journal: RefCell::new(Vec::new()),
        }
    }

    /// A context from before the program-object API.
    pub fn legacy() -> Self {
        Self::with_config(SimConfig {
            version: 110,
            ..SimConfig::default()
        })
    }

    pub fn journal(&self) -> Vec<SimEvent> {
        self.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    /// Handle of the most recent use-program call, if any was made.
    pub fn last_bound(&self) -> Option<u32> {
        self.journal
            .borrow()
            .iter()
            .rev()
            .find_map(|event| match event {
                SimEvent::ProgramBound { handle, .. } => Some(*handle),
                _ => None,
            })
    }

    fn record(&self, event: SimEvent) {
        tracing::trace!(?event, "sim driver call");
        self.journal.borrow_mut().push(event);
    }

    fn allocate(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        state.next_handle
    }

    fn compile(&self, handle: u32) {
        let ok = {
            let mut state = self.state.borrow_mut();
            match state.stages.get_mut(&handle) {
                Some(record) => {
                    record.compiled_ok = !self.config.fail_compile.contains(&record.stage);
                    record.compiled_ok
                }
                None => false,
            }
        };
        self.record(SimEvent::Compiled { handle, ok });
    }

    fn stage_failed(&self, handle: u32) -> bool {
        self.state
            .borrow()
            .stages
            .get(&handle)
            .map(|record| !record.compiled_ok)
            .unwrap_or(false)
    }

    fn program_failed(&self, handle: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&handle)
            .map(|record| !record.linked_ok)
            .unwrap_or(false)
    }

    fn link(&self, handle: u32) {
        let ok = !self.config.fail_link;
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&handle) {
            record.linked_ok = ok;
        }
        self.record(SimEvent::Linked { program: handle, ok });
    }

    fn reported_uniforms(&self, program: u32) -> usize {
        let state = self.state.borrow();
        match state.programs.get(&program) {
            Some(record) if record.linked_ok => self.config.uniforms.len(),
            _ => 0,
        }
    }

    fn name_max(&self) -> u32 {
        if let Some(max) = self.config.uniform_name_max {
            return max;
        }
        self.config
            .uniforms
            .iter()
            .map(|uniform| uniform.name.len() as u32 + 1)
            .max()
            .unwrap_or(0)
    }

    fn uniform_at(&self, index: u32, name_capacity: u32) -> ActiveUniform {
        match self.config.uniforms.get(index as usize) {
            Some(uniform) => {
                let keep = (name_capacity as usize).saturating_sub(1);
                ActiveUniform {
                    name: uniform.name.chars().take(keep).collect(),
                    type_tag: uniform.type_tag,
                    size: uniform.size,
                }
            }
            None => ActiveUniform {
                name: String::new(),
                type_tag: 0,
                size: 0,
            },
        }
    }

    fn location_of(&self, name: &str) -> UniformLocation {
        self.config
            .uniforms
            .iter()
            .find(|uniform| uniform.name == name)
            .map(|uniform| UniformLocation(uniform.location))
            .unwrap_or(UniformLocation::UNUSED)
    }

    fn attachments(&self, program: u32, max: usize) -> Vec<u32> {
        let state = self.state.borrow();
        let attached = state
            .programs
            .get(&program)
            .map(|record| record.attached.clone())
            .unwrap_or_default();
        if self.config.ignore_attachment_cap {
            attached
        } else {
            attached.into_iter().take(max).collect()
        }
    }

    fn truncated(log: &str, max_length: u32) -> String {
        let keep = (max_length as usize).saturating_sub(1);
        log.chars().take(keep).collect()
    }

    fn log_length(log: &str) -> u32 {
        if log.is_empty() {
            0
        } else {
            log.len() as u32 + 1
        }
    }

    fn record_floats(&self, location: UniformLocation, width: usize, count: usize, values: &[f32]) {
        let taken = values[..(count * width).min(values.len())].to_vec();
        self.record(SimEvent::FloatsWritten {
            location: location.0,
            width,
            count,
            values: taken,
        });
    }

    fn record_matrix(
        &self,
        location: UniformLocation,
        dimension: usize,
        count: usize,
        transpose: bool,
        values: &[f32],
    ) {
        let taken = values[..(count * dimension * dimension).min(values.len())].to_vec();
        self.record(SimEvent::MatrixWritten {
            location: location.0,
            dimension,
            count,
            transpose,
            values: taken,
        });
    }

    fn record_ints(&self, location: UniformLocation, width: usize, count: usize, values: &[i32]) {
        let taken = values[..(count * width).min(values.len())].to_vec();
        self.record(SimEvent::IntsWritten {
            location: location.0,
            width,
            count,
            values: taken,
        });
    }
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoDriver for SimDriver {
    fn api_version(&self) -> u32 {
        self.config.version
    }

    fn has_feature(&self, feature: DriverFeature) -> bool {
        match feature {
            DriverFeature::GlslPrograms => self.config.glsl_supported,
            DriverFeature::GeometryShaders => self.config.geometry_supported,
        }
    }

    fn max_geometry_output_vertices(&self) -> u32 {
        self.config.max_geometry_output_vertices
    }

    fn set_basic_render_states(&self, _material: &Material, _last_material: &Material, reset_all: bool) {
        self.record(SimEvent::StatesApplied { reset_all });
    }

    fn create_program(&self) -> GlProgram {
        let handle = self.allocate();
        self.state
            .borrow_mut()
            .programs
            .insert(handle, ProgramRecord::default());
        self.record(SimEvent::ProgramCreated { handle, legacy: false });
        GlProgram(handle)
    }

    fn create_shader(&self, stage: StageKind) -> GlShader {
        let handle = self.allocate();
        self.state.borrow_mut().stages.insert(
            handle,
            StageRecord {
                stage,
                compiled_ok: false,
            },
        );
        self.record(SimEvent::StageCreated { handle, stage, legacy: false });
        GlShader(handle)
    }

    fn shader_source(&self, shader: GlShader, _source: &str) {
        self.record(SimEvent::SourceLoaded { handle: shader.0 });
    }

    fn compile_shader(&self, shader: GlShader) {
        self.compile(shader.0);
    }

    fn shader_compile_status(&self, shader: GlShader) -> bool {
        !self.stage_failed(shader.0)
    }

    fn shader_info_log_length(&self, shader: GlShader) -> u32 {
        if self.stage_failed(shader.0) {
            Self::log_length(&self.config.compile_log)
        } else {
            0
        }
    }

    fn shader_info_log(&self, shader: GlShader, max_length: u32) -> String {
        if self.stage_failed(shader.0) {
            Self::truncated(&self.config.compile_log, max_length)
        } else {
            String::new()
        }
    }

    fn attach_shader(&self, program: GlProgram, shader: GlShader) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program.0) {
            record.attached.push(shader.0);
        }
        self.record(SimEvent::Attached {
            program: program.0,
            stage: shader.0,
        });
    }

    fn program_parameter(&self, program: GlProgram, param: GeometryParam, value: i32) {
        self.record(SimEvent::ParameterSet {
            program: program.0,
            param,
            value,
        });
    }

    fn link_program(&self, program: GlProgram) {
        self.link(program.0);
    }

    fn program_link_status(&self, program: GlProgram) -> bool {
        !self.program_failed(program.0)
    }

    fn program_info_log_length(&self, program: GlProgram) -> u32 {
        if self.program_failed(program.0) {
            Self::log_length(&self.config.link_log)
        } else {
            0
        }
    }

    fn program_info_log(&self, program: GlProgram, max_length: u32) -> String {
        if self.program_failed(program.0) {
            Self::truncated(&self.config.link_log, max_length)
        } else {
            String::new()
        }
    }

    fn active_uniform_count(&self, program: GlProgram) -> u32 {
        self.reported_uniforms(program.0) as u32
    }

    fn active_uniform_max_length(&self, program: GlProgram) -> u32 {
        if self.reported_uniforms(program.0) == 0 {
            return 0;
        }
        self.name_max()
    }

    fn active_uniform(&self, _program: GlProgram, index: u32, name_capacity: u32) -> ActiveUniform {
        self.uniform_at(index, name_capacity)
    }

    fn uniform_location(&self, _program: GlProgram, name: &str) -> UniformLocation {
        self.location_of(name)
    }

    fn attached_shaders(&self, program: GlProgram, max: usize) -> Vec<GlShader> {
        self.attachments(program.0, max)
            .into_iter()
            .map(GlShader)
            .collect()
    }

    fn use_program(&self, program: GlProgram) {
        self.record(SimEvent::ProgramBound {
            handle: program.0,
            legacy: false,
        });
    }

    fn delete_shader(&self, shader: GlShader) {
        self.state.borrow_mut().stages.remove(&shader.0);
        self.record(SimEvent::StageDeleted { handle: shader.0 });
    }

    fn delete_program(&self, program: GlProgram) {
        self.state.borrow_mut().programs.remove(&program.0);
        self.record(SimEvent::ProgramDeleted { handle: program.0 });
    }

    fn create_program_object(&self) -> GlObject {
        let handle = self.allocate();
        self.state
            .borrow_mut()
            .programs
            .insert(handle, ProgramRecord::default());
        self.record(SimEvent::ProgramCreated { handle, legacy: true });
        GlObject(handle)
    }

    fn create_shader_object(&self, stage: StageKind) -> GlObject {
        let handle = self.allocate();
        self.state.borrow_mut().stages.insert(
            handle,
            StageRecord {
                stage,
                compiled_ok: false,
            },
        );
        self.record(SimEvent::StageCreated { handle, stage, legacy: true });
        GlObject(handle)
    }

    fn object_source(&self, object: GlObject, _source: &str) {
        self.record(SimEvent::SourceLoaded { handle: object.0 });
    }

    fn compile_object(&self, object: GlObject) {
        self.compile(object.0);
    }

    fn object_compile_status(&self, object: GlObject) -> bool {
        !self.stage_failed(object.0)
    }

    fn object_link_status(&self, object: GlObject) -> bool {
        !self.program_failed(object.0)
    }

    fn object_info_log_length(&self, object: GlObject) -> u32 {
        if self.stage_failed(object.0) {
            Self::log_length(&self.config.compile_log)
        } else if self.program_failed(object.0) {
            Self::log_length(&self.config.link_log)
        } else {
            0
        }
    }

    fn object_info_log(&self, object: GlObject, max_length: u32) -> String {
        if self.stage_failed(object.0) {
            Self::truncated(&self.config.compile_log, max_length)
        } else if self.program_failed(object.0) {
            Self::truncated(&self.config.link_log, max_length)
        } else {
            String::new()
        }
    }

    fn attach_object(&self, program: GlObject, attachment: GlObject) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program.0) {
            record.attached.push(attachment.0);
        }
        self.record(SimEvent::Attached {
            program: program.0,
            stage: attachment.0,
        });
    }

    fn object_parameter(&self, program: GlObject, param: GeometryParam, value: i32) {
        self.record(SimEvent::ParameterSet {
            program: program.0,
            param,
            value,
        });
    }

    fn link_program_object(&self, program: GlObject) {
        self.link(program.0);
    }

    fn object_active_uniform_count(&self, program: GlObject) -> u32 {
        self.reported_uniforms(program.0) as u32
    }

    fn object_active_uniform_max_length(&self, program: GlObject) -> u32 {
        if self.reported_uniforms(program.0) == 0 {
            return 0;
        }
        self.name_max()
    }

    fn object_active_uniform(&self, _program: GlObject, index: u32, name_capacity: u32) -> ActiveUniform {
        self.uniform_at(index, name_capacity)
    }

    fn object_uniform_location(&self, _program: GlObject, name: &str) -> UniformLocation {
        self.location_of(name)
    }

    fn attached_objects(&self, program: GlObject, max: usize) -> Vec<GlObject> {
        self.attachments(program.0, max)
            .into_iter()
            .map(GlObject)
            .collect()
    }

    fn use_program_object(&self, program: GlObject) {
        self.record(SimEvent::ProgramBound {
            handle: program.0,
            legacy: true,
        });
    }

    fn delete_object(&self, object: GlObject) {
        let mut state = self.state.borrow_mut();
        state.stages.remove(&object.0);
        state.programs.remove(&object.0);
        drop(state);
        self.record(SimEvent::ObjectDeleted { handle: object.0 });
    }

    fn uniform1fv(&self, location: UniformLocation, count: usize, values: &[f32]) {
        self.record_floats(location, 1, count, values);
    }

    fn uniform2fv(&self, location: UniformLocation, count: usize, values: &[f32]) {
        self.record_floats(location, 2, count, values);
    }

    fn uniform3fv(&self, location: UniformLocation, count: usize, values: &[f32]) {
        self.record_floats(location, 3, count, values);
    }

    fn uniform4fv(&self, location: UniformLocation, count: usize, values: &[f32]) {
        self.record_floats(location, 4, count, values);
    }

    fn uniform_matrix2fv(&self, location: UniformLocation, count: usize, transpose: bool, values: &[f32]) {
        self.record_matrix(location, 2, count, transpose, values);
    }

    fn uniform_matrix3fv(&self, location: UniformLocation, count: usize, transpose: bool, values: &[f32]) {
        self.record_matrix(location, 3, count, transpose, values);
    }

    fn uniform_matrix4fv(&self, location: UniformLocation, count: usize, transpose: bool, values: &[f32]) {
        self.record_matrix(location, 4, count, transpose, values);
    }

    fn uniform1iv(&self, location: UniformLocation, count: usize, values: &[i32]) {
        self.record_ints(location, 1, count, values);
    }

    fn uniform2iv(&self, location: UniformLocation, count: usize, values: &[i32]) {
        self.record_ints(location, 2, count, values);
    }

    fn uniform3iv(&self, location: UniformLocation, count: usize, values: &[i32]) {
        self.record_ints(location, 3, count, values);
    }

    fn uniform4iv(&self, location: UniformLocation, count: usize, values: &[i32]) {
        self.record_ints(location, 4, count, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts;

    #[test]
    fn modern_lifecycle_is_journaled_in_order() {
        let driver = SimDriver::new();
        let program = driver.create_program();
        let shader = driver.create_shader(StageKind::Vertex);
        driver.shader_source(shader, "void main() {}");
        driver.compile_shader(shader);
        driver.attach_shader(program, shader);
        driver.link_program(program);

        assert_eq!(
            driver.journal(),
            vec![
                SimEvent::ProgramCreated { handle: 1, legacy: false },
                SimEvent::StageCreated { handle: 2, stage: StageKind::Vertex, legacy: false },
                SimEvent::SourceLoaded { handle: 2 },
                SimEvent::Compiled { handle: 2, ok: true },
                SimEvent::Attached { program: 1, stage: 2 },
                SimEvent::Linked { program: 1, ok: true },
            ]
        );
    }

    #[test]
    fn uniform_name_is_truncated_to_capacity() {
        let driver = SimDriver::with_config(SimConfig {
            uniforms: vec![SimUniform::new("uLightDirection", consts::FLOAT_VEC3, 0)],
            ..SimConfig::default()
        });
        let program = driver.create_program();
        driver.link_program(program);

        let uniform = driver.active_uniform(program, 0, 7);
        assert_eq!(uniform.name, "uLight");
        assert_eq!(uniform.type_tag, consts::FLOAT_VEC3);
    }

    #[test]
    fn writes_copy_exactly_count_times_width() {
        let driver = SimDriver::new();
        driver.uniform3fv(UniformLocation(4), 1, &[1.0, 2.0, 3.0, 9.0, 9.0]);

        assert_eq!(
            driver.journal(),
            vec![SimEvent::FloatsWritten {
                location: 4,
                width: 3,
                count: 1,
                values: vec![1.0, 2.0, 3.0],
            }]
        );
    }

    #[test]
    fn attachment_listing_respects_caller_cap() {
        let driver = SimDriver::new();
        let program = driver.create_program();
        for _ in 0..12 {
            let shader = driver.create_shader(StageKind::Vertex);
            driver.attach_shader(program, shader);
        }

        assert_eq!(driver.attached_shaders(program, 8).len(), 8);
    }

    #[test]
    fn attachment_cap_can_be_ignored_to_model_buggy_drivers() {
        let driver = SimDriver::with_config(SimConfig {
            ignore_attachment_cap: true,
            ..SimConfig::default()
        });
        let program = driver.create_program();
        for _ in 0..12 {
            let shader = driver.create_shader(StageKind::Fragment);
            driver.attach_shader(program, shader);
        }

        assert_eq!(driver.attached_shaders(program, 8).len(), 12);
    }

    #[test]
    fn delete_object_clears_either_name_kind() {
        let driver = SimDriver::legacy();
        let program = driver.create_program_object();
        let stage = driver.create_shader_object(StageKind::Fragment);
        driver.attach_object(program, stage);
        driver.delete_object(stage);
        driver.delete_object(program);

        let journal = driver.journal();
        assert!(journal.contains(&SimEvent::ObjectDeleted { handle: stage.0 }));
        assert!(journal.contains(&SimEvent::ObjectDeleted { handle: program.0 }));
    }

    #[test]
    fn failed_link_reports_no_active_uniforms() {
        let driver = SimDriver::with_config(SimConfig {
            fail_link: true,
            uniforms: vec![SimUniform::new("uTime", consts::FLOAT, 0)],
            ..SimConfig::default()
        });
        let program = driver.create_program();
        driver.link_program(program);

        assert!(!driver.program_link_status(program));
        assert_eq!(driver.active_uniform_count(program), 0);
    }
}
