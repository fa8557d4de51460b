//! Active uniform enumeration and type-dispatched value writes.
//!
//! The table is built once per linked program and is the only path between
//! application-supplied buffers and the driver's uniform entry points. Writes
//! never touch the driver unless the descriptor, the location, and the buffer
//! all line up.

use glapi::{UniformLocation, UniformType, VideoDriver};

use crate::error::MaterialError;
use crate::program::GlslProgram;

/// One active uniform as the linker reported it.
#[derive(Clone, Debug)]
pub struct UniformDescriptor {
    pub name: String,
    pub type_tag: u32,
    pub location: UniformLocation,
}

/// A linked program's active uniforms, in driver enumeration order.
///
/// The position of a descriptor in this table is its public index; indices
/// stay stable for the life of the material.
#[derive(Debug, Default)]
pub struct UniformTable {
    entries: Vec<UniformDescriptor>,
}

impl UniformTable {
    /// Enumerates the program's active uniforms into a fresh table.
    pub fn introspect(program: &GlslProgram) -> Result<Self, MaterialError> {
        let count = program.active_uniform_count();
        if count == 0 {
            return Ok(Self::default());
        }
        let max_length = program.active_uniform_max_length();
        if max_length == 0 {
            tracing::error!("GLSL: failed to retrieve uniform information");
            return Err(MaterialError::Introspection { count });
        }
        // Some implementations want room for an extra terminator.
        let name_capacity = max_length + 1;
        let mut entries = Vec::with_capacity(count as usize);
        for index in 0..count {
            let uniform = program.active_uniform(index, name_capacity);
            let location = program.uniform_location(&uniform.name);
            entries.push(UniformDescriptor {
                name: uniform.name,
                type_tag: uniform.type_tag,
                location,
            });
        }
        Ok(Self { entries })
    }

    /// Index of the named uniform, or -1 when the linker kept none by that
    /// name. Pure table scan.
    pub fn index_of(&self, name: &str) -> i32 {
        self.entries
            .iter()
            .position(|entry| entry.name == name)
            .map_or(-1, |index| index as i32)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[UniformDescriptor] {
        &self.entries
    }

    fn entry(&self, index: i32) -> Option<&UniformDescriptor> {
        if index < 0 {
            return None;
        }
        self.entries.get(index as usize)
    }

    /// Writes a float buffer to the uniform at `index`.
    ///
    /// The element count is the buffer length divided by the uniform's
    /// component width; a buffer shorter than one element succeeds without a
    /// driver call. Sampler uniforms take the first float as a texture layer.
    pub fn write_floats(&self, driver: &dyn VideoDriver, index: i32, values: &[f32]) -> bool {
        let Some(entry) = self.entry(index) else {
            return false;
        };
        if !entry.location.is_valid() {
            return false;
        }
        let Some(kind) = UniformType::from_tag(entry.type_tag) else {
            return false;
        };
        let location = entry.location;
        match kind {
            UniformType::Float => {
                let count = values.len();
                if count > 0 {
                    driver.uniform1fv(location, count, values);
                }
            }
            UniformType::FloatVec2 => {
                let count = values.len() / 2;
                if count > 0 {
                    driver.uniform2fv(location, count, values);
                }
            }
            UniformType::FloatVec3 => {
                let count = values.len() / 3;
                if count > 0 {
                    driver.uniform3fv(location, count, values);
                }
            }
            UniformType::FloatVec4 => {
                let count = values.len() / 4;
                if count > 0 {
                    driver.uniform4fv(location, count, values);
                }
            }
            UniformType::FloatMat2 => {
                let count = values.len() / 4;
                if count > 0 {
                    driver.uniform_matrix2fv(location, count, false, values);
                }
            }
            UniformType::FloatMat3 => {
                let count = values.len() / 9;
                if count > 0 {
                    driver.uniform_matrix3fv(location, count, false, values);
                }
            }
            UniformType::FloatMat4 => {
                let count = values.len() / 16;
                if count > 0 {
                    driver.uniform_matrix4fv(location, count, false, values);
                }
            }
            UniformType::Sampler1d
            | UniformType::Sampler2d
            | UniformType::Sampler3d
            | UniformType::SamplerCube
            | UniformType::Sampler1dShadow
            | UniformType::Sampler2dShadow => match values.first() {
                Some(value) => driver.uniform1iv(location, 1, &[*value as i32]),
                None => return false,
            },
            _ => return false,
        }
        true
    }

    /// Writes an integer buffer to the uniform at `index`.
    ///
    /// Integer and boolean uniforms share this path; sampler uniforms take
    /// the first value as a texture layer.
    pub fn write_ints(&self, driver: &dyn VideoDriver, index: i32, values: &[i32]) -> bool {
        let Some(entry) = self.entry(index) else {
            return false;
        };
        if !entry.location.is_valid() {
            return false;
        }
        let Some(kind) = UniformType::from_tag(entry.type_tag) else {
            return false;
        };
        let location = entry.location;
        match kind {
            UniformType::Int | UniformType::Bool => {
                let count = values.len();
                if count > 0 {
                    driver.uniform1iv(location, count, values);
                }
            }
            UniformType::IntVec2 | UniformType::BoolVec2 => {
                let count = values.len() / 2;
                if count > 0 {
                    driver.uniform2iv(location, count, values);
                }
            }
            UniformType::IntVec3 | UniformType::BoolVec3 => {
                let count = values.len() / 3;
                if count > 0 {
                    driver.uniform3iv(location, count, values);
                }
            }
            UniformType::IntVec4 | UniformType::BoolVec4 => {
                let count = values.len() / 4;
                if count > 0 {
                    driver.uniform4iv(location, count, values);
                }
            }
            UniformType::Sampler1d
            | UniformType::Sampler2d
            | UniformType::Sampler3d
            | UniformType::SamplerCube
            | UniformType::Sampler1dShadow
            | UniformType::Sampler2dShadow => {
                if values.is_empty() {
                    return false;
                }
                driver.uniform1iv(location, 1, values);
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glapi::consts;
    use glapi::sim::{SimConfig, SimDriver, SimEvent, SimUniform};
    use glapi::StageKind;
    use std::rc::Rc;

    const STAGE_SRC: &str = "void main() {}";

    fn linked_program(driver: &Rc<SimDriver>) -> GlslProgram {
        let program = GlslProgram::create(driver.clone());
        program
            .attach_stage(StageKind::Vertex, STAGE_SRC)
            .expect("vertex stage");
        program
            .attach_stage(StageKind::Fragment, STAGE_SRC)
            .expect("fragment stage");
        program.link().expect("link");
        program
    }

    fn linked_table(uniforms: Vec<SimUniform>) -> (Rc<SimDriver>, GlslProgram, UniformTable) {
        let driver = Rc::new(SimDriver::with_config(SimConfig {
            uniforms,
            ..SimConfig::default()
        }));
        let program = linked_program(&driver);
        let table = UniformTable::introspect(&program).expect("introspect");
        driver.clear_journal();
        (driver, program, table)
    }

    #[test]
    fn program_without_uniforms_yields_an_empty_table() {
        let (_driver, _program, table) = linked_table(vec![]);
        assert!(table.is_empty());
        assert_eq!(table.index_of("uAnything"), -1);
    }

    #[test]
    fn missing_name_length_fails_introspection() {
        let driver = Rc::new(SimDriver::with_config(SimConfig {
            uniforms: vec![
                SimUniform::new("uTime", consts::FLOAT, 0),
                SimUniform::new("uScale", consts::FLOAT, 1),
            ],
            uniform_name_max: Some(0),
            ..SimConfig::default()
        }));
        let program = linked_program(&driver);
        let err = UniformTable::introspect(&program).expect_err("introspection should fail");
        match err {
            MaterialError::Introspection { count } => assert_eq!(count, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn table_preserves_enumeration_order() {
        let (_driver, _program, table) = linked_table(vec![
            SimUniform::new("uTime", consts::FLOAT, 3),
            SimUniform::new("uResolution", consts::FLOAT_VEC2, 1),
            SimUniform::new("uTexture", consts::SAMPLER_2D, 7),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.entries()[0].name, "uTime");
        assert_eq!(table.index_of("uTime"), 0);
        assert_eq!(table.index_of("uResolution"), 1);
        assert_eq!(table.index_of("uTexture"), 2);
        assert_eq!(table.index_of("uMissing"), -1);
        assert_eq!(table.entries()[1].location, UniformLocation(1));
    }

    #[test]
    fn lookups_never_touch_the_driver() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uTime", consts::FLOAT, 0)]);
        table.index_of("uTime");
        table.index_of("uMissing");
        assert!(driver.journal().is_empty());
    }

    #[test]
    fn short_vector_write_succeeds_without_a_driver_call() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uColor", consts::FLOAT_VEC4, 2)]);
        assert!(table.write_floats(driver.as_ref(), 0, &[1.0, 0.5, 0.25]));
        assert!(driver.journal().is_empty());
    }

    #[test]
    fn vector_write_forwards_whole_elements() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uColor", consts::FLOAT_VEC4, 2)]);
        assert!(table.write_floats(driver.as_ref(), 0, &[1.0, 0.5, 0.25, 1.0]));
        assert_eq!(
            driver.journal(),
            vec![SimEvent::FloatsWritten {
                location: 2,
                width: 4,
                count: 1,
                values: vec![1.0, 0.5, 0.25, 1.0],
            }]
        );
    }

    #[test]
    fn sampler_float_write_collapses_to_one_integer() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uTexture", consts::SAMPLER_2D, 7)]);
        assert!(table.write_floats(driver.as_ref(), 0, &[3.0, 9.0]));
        assert_eq!(
            driver.journal(),
            vec![SimEvent::IntsWritten {
                location: 7,
                width: 1,
                count: 1,
                values: vec![3],
            }]
        );
    }

    #[test]
    fn sampler_writes_need_at_least_one_value() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uTexture", consts::SAMPLER_2D, 7)]);
        assert!(!table.write_floats(driver.as_ref(), 0, &[]));
        assert!(!table.write_ints(driver.as_ref(), 0, &[]));
        assert!(driver.journal().is_empty());
    }

    #[test]
    fn writes_reject_the_wrong_value_kind() {
        let (driver, _program, table) = linked_table(vec![
            SimUniform::new("uTime", consts::FLOAT, 0),
            SimUniform::new("uFrame", consts::INT, 1),
        ]);
        assert!(!table.write_ints(driver.as_ref(), 0, &[1]));
        assert!(!table.write_floats(driver.as_ref(), 1, &[1.0]));
        assert!(driver.journal().is_empty());
    }

    #[test]
    fn unknown_type_tags_are_rejected() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uMystery", 0x9999, 1)]);
        assert!(!table.write_floats(driver.as_ref(), 0, &[1.0]));
        assert!(!table.write_ints(driver.as_ref(), 0, &[1]));
        assert!(driver.journal().is_empty());
    }

    #[test]
    fn unused_locations_are_rejected() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uGone", consts::FLOAT, -1)]);
        assert!(!table.write_floats(driver.as_ref(), 0, &[1.0]));
        assert!(driver.journal().is_empty());
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uTime", consts::FLOAT, 0)]);
        assert!(!table.write_floats(driver.as_ref(), -1, &[1.0]));
        assert!(!table.write_floats(driver.as_ref(), 99, &[1.0]));
        assert!(driver.journal().is_empty());
    }

    #[test]
    fn matrix_writes_carry_no_transpose() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uBones", consts::FLOAT_MAT4, 0)]);
        let values: Vec<f32> = (0..32).map(|v| v as f32).collect();
        assert!(table.write_floats(driver.as_ref(), 0, &values));
        match driver.journal().as_slice() {
            [SimEvent::MatrixWritten {
                location,
                dimension,
                count,
                transpose,
                values: written,
            }] => {
                assert_eq!(*location, 0);
                assert_eq!(*dimension, 4);
                assert_eq!(*count, 2);
                assert!(!*transpose);
                assert_eq!(written.len(), 32);
            }
            other => panic!("unexpected journal: {other:?}"),
        }
    }

    #[test]
    fn bool_vectors_take_integer_buffers() {
        let (driver, _program, table) =
            linked_table(vec![SimUniform::new("uFlags", consts::BOOL_VEC2, 4)]);
        assert!(table.write_ints(driver.as_ref(), 0, &[1, 0, 0, 1]));
        assert_eq!(
            driver.journal(),
            vec![SimEvent::IntsWritten {
                location: 4,
                width: 2,
                count: 2,
                values: vec![1, 0, 0, 1],
            }]
        );
    }
}
