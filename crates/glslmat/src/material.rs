//! Material orchestration: build a program from stage sources, register it
//! with the renderer, and drive it through the material hooks.

use std::rc::Rc;

use glapi::{DriverFeature, Material, StageKind, VideoDriver};

use crate::error::MaterialError;
use crate::program::GlslProgram;
use crate::registry::{BaseMaterial, MaterialRegistry, MaterialRenderer, NO_MATERIAL};
use crate::types::{ShaderConstantCallback, ShaderMaterialDesc};
use crate::uniforms::UniformTable;

/// A GLSL material: one program, its uniform table, and the hooks that
/// activate it around draws.
///
/// Everything is fixed at creation time. A material whose program failed to
/// build stays inert: it is never registered, the renderer hooks skip the
/// program, and every uniform write reports failure.
pub struct ShaderMaterial {
    driver: Rc<dyn VideoDriver>,
    program: Option<GlslProgram>,
    uniforms: UniformTable,
    callback: Option<Rc<dyn ShaderConstantCallback>>,
    base: Option<Rc<dyn BaseMaterial>>,
    user_data: i32,
}

impl ShaderMaterial {
    /// Builds the program described by `desc` and registers the material.
    ///
    /// Returns the registry identifier and the material itself. On any
    /// compile, link, or introspection failure the identifier is
    /// [`NO_MATERIAL`], nothing is registered, and the partial program is
    /// released before this returns.
    pub fn create(
        driver: Rc<dyn VideoDriver>,
        registry: &mut dyn MaterialRegistry,
        desc: ShaderMaterialDesc,
    ) -> (i32, Rc<ShaderMaterial>) {
        let base = desc
            .base_material
            .delegates_blending()
            .then(|| registry.base_material(desc.base_material))
            .flatten();
        let (program, uniforms) = match build(&driver, &desc) {
            Ok((program, uniforms)) => (Some(program), uniforms),
            Err(_) => (None, UniformTable::default()),
        };
        let registered = program.is_some();
        let material = Rc::new(Self {
            driver,
            program,
            uniforms,
            callback: desc.callback,
            base,
            user_data: desc.user_data,
        });
        let id = if registered {
            let renderer: Rc<dyn MaterialRenderer> = material.clone();
            let id = registry.register_material(renderer);
            tracing::debug!(id, uniforms = material.uniforms.len(), "GLSL material registered");
            id
        } else {
            NO_MATERIAL
        };
        (id, material)
    }

    /// Whether the program behind this material linked.
    pub fn is_linked(&self) -> bool {
        self.program.is_some()
    }

    /// Table index of the named uniform, or -1 when absent.
    pub fn uniform_index(&self, name: &str) -> i32 {
        self.uniforms.index_of(name)
    }

    /// Writes a float buffer to the uniform at `index`.
    pub fn set_floats(&self, index: i32, values: &[f32]) -> bool {
        self.uniforms.write_floats(self.driver.as_ref(), index, values)
    }

    /// Writes an integer buffer to the uniform at `index`.
    pub fn set_ints(&self, index: i32, values: &[i32]) -> bool {
        self.uniforms.write_ints(self.driver.as_ref(), index, values)
    }

    pub fn set_floats_by_name(&self, name: &str, values: &[f32]) -> bool {
        self.set_floats(self.uniform_index(name), values)
    }

    pub fn set_ints_by_name(&self, name: &str, values: &[i32]) -> bool {
        self.set_ints(self.uniform_index(name), values)
    }

    /// Register-style constant writes have no GLSL counterpart.
    pub fn set_raw_constants(&self, _values: &[f32], _start_register: u32) {
        tracing::warn!("cannot set raw shader constants, use the named uniform interface instead");
    }

    /// Forwards fixed-function state changes to the driver.
    pub fn set_basic_render_states(
        &self,
        material: &Material,
        last_material: &Material,
        reset_all: bool,
    ) {
        self.driver
            .set_basic_render_states(material, last_material, reset_all);
    }

    pub fn driver(&self) -> &dyn VideoDriver {
        self.driver.as_ref()
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }
}

impl MaterialRenderer for ShaderMaterial {
    fn on_set_material(&self, material: &Material, last_material: &Material, reset_all: bool) {
        if material.material_type != last_material.material_type || reset_all {
            if let Some(program) = &self.program {
                program.bind();
            }
            if let Some(base) = &self.base {
                base.apply(material);
            }
        }
        // The callback hears about every activation, bound or not.
        if let Some(callback) = &self.callback {
            callback.on_set_material(material);
        }
        self.driver
            .set_basic_render_states(material, last_material, reset_all);
    }

    fn on_render(&self) -> bool {
        if self.program.is_some() {
            if let Some(callback) = &self.callback {
                callback.on_set_constants(self, self.user_data);
            }
        }
        true
    }

    fn on_unset_material(&self) {
        if let Some(program) = &self.program {
            program.unbind();
        }
        if let Some(base) = &self.base {
            base.restore();
        }
    }

    fn is_transparent(&self) -> bool {
        self.base.as_ref().map_or(false, |base| base.is_transparent())
    }
}

fn build(
    driver: &Rc<dyn VideoDriver>,
    desc: &ShaderMaterialDesc,
) -> Result<(GlslProgram, UniformTable), MaterialError> {
    if !driver.has_feature(DriverFeature::GlslPrograms) {
        tracing::error!("GLSL shader materials are not available on this driver");
        return Err(MaterialError::ShadingUnsupported);
    }
    let program = GlslProgram::create(Rc::clone(driver));
    program.attach_stage(StageKind::Vertex, &desc.vertex.source)?;
    program.attach_stage(StageKind::Fragment, &desc.fragment.source)?;
    if let Some(geometry) = &desc.geometry {
        if driver.has_feature(DriverFeature::GeometryShaders) {
            program.attach_stage(StageKind::Geometry, &geometry.stage.source)?;
            program.configure_geometry(geometry);
        }
    }
    program.link()?;
    let uniforms = UniformTable::introspect(&program)?;
    Ok((program, uniforms))
}
