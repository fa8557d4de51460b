use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use glapi::sim::{SimConfig, SimDriver};
use glapi::{Material, PROGRAM_API_VERSION};
use glslmat::{
    BaseMaterial, BaseMaterialKind, GeometryStage, MaterialRegistry, MaterialRenderer,
    ShaderMaterial, ShaderMaterialDesc, StageSource,
};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::manifest::{map_manifest_base, map_manifest_primitive, MaterialManifest};
use crate::report;
use crate::scan;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let (name, desc) = resolve_input(&args)?;
    let mut stage_sources = vec![desc.vertex.source.as_str(), desc.fragment.source.as_str()];
    if let Some(geometry) = &desc.geometry {
        stage_sources.push(geometry.stage.source.as_str());
    }
    let scanned = scan::scan_uniforms(&stage_sources);
    tracing::debug!(
        stages = stage_sources.len(),
        uniforms = scanned.len(),
        "scanned stage sources"
    );

    tracing::info!(
        legacy = args.legacy,
        geometry = !args.no_geometry,
        "probing material against simulated driver"
    );
    // Anything below the program API version selects the legacy family.
    let driver = Rc::new(SimDriver::with_config(SimConfig {
        version: if args.legacy { 110 } else { PROGRAM_API_VERSION },
        geometry_supported: !args.no_geometry,
        uniforms: scan::to_sim_uniforms(&scanned),
        ..SimConfig::default()
    }));
    let mut registry = ProbeRegistry::default();
    let (id, material) = ShaderMaterial::create(driver.clone(), &mut registry, desc);

    report::print_summary(name.as_deref(), id, &material);
    if args.list_calls {
        report::print_journal(&driver.journal());
    }
    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_input(args: &Args) -> Result<(Option<String>, ShaderMaterialDesc)> {
    let Some(manifest_path) = &args.manifest else {
        return resolve_from_flags(args);
    };
    let manifest = MaterialManifest::load(manifest_path)
        .with_context(|| format!("failed to load manifest from {}", manifest_path.display()))?;
    let root = manifest_root(manifest_path);

    let vertex_path = args
        .vertex
        .clone()
        .unwrap_or_else(|| root.join(&manifest.vertex.source));
    let fragment_path = args
        .fragment
        .clone()
        .unwrap_or_else(|| root.join(&manifest.fragment.source));

    let mut desc = ShaderMaterialDesc::new(
        StageSource {
            source: read_stage(&vertex_path)?,
            entry_point: manifest.vertex.entry_point.clone(),
            profile: None,
        },
        StageSource {
            source: read_stage(&fragment_path)?,
            entry_point: manifest.fragment.entry_point.clone(),
            profile: None,
        },
    );
    desc.base_material = args
        .base
        .unwrap_or_else(|| map_manifest_base(manifest.base));
    desc.user_data = manifest.user_data;

    if let Some(geometry_path) = &args.geometry {
        desc.geometry = Some(GeometryStage::new(StageSource::new(read_stage(
            geometry_path,
        )?)));
    } else if let Some(geometry) = &manifest.geometry {
        desc.geometry = Some(GeometryStage {
            stage: StageSource {
                source: read_stage(&root.join(&geometry.source))?,
                entry_point: geometry.entry_point.clone(),
                profile: None,
            },
            input_kind: map_manifest_primitive(geometry.input),
            output_kind: map_manifest_primitive(geometry.output),
            max_output_vertices: geometry.vertices_out,
        });
    }

    Ok((manifest.name.clone(), desc))
}

fn resolve_from_flags(args: &Args) -> Result<(Option<String>, ShaderMaterialDesc)> {
    let (Some(vertex_path), Some(fragment_path)) = (&args.vertex, &args.fragment) else {
        bail!("provide a manifest path or both --vertex and --fragment");
    };
    let mut desc = ShaderMaterialDesc::new(
        StageSource::new(read_stage(vertex_path)?),
        StageSource::new(read_stage(fragment_path)?),
    );
    desc.base_material = args.base.unwrap_or_default();
    if let Some(geometry_path) = &args.geometry {
        desc.geometry = Some(GeometryStage::new(StageSource::new(read_stage(
            geometry_path,
        )?)));
    }
    Ok((None, desc))
}

fn manifest_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn read_stage(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read shader source {}", path.display()))
}

// The probe never draws, so the registry only hands out identifiers and a
// stand-in blending delegate.
#[derive(Default)]
struct ProbeRegistry {
    renderers: Vec<Rc<dyn MaterialRenderer>>,
}

impl MaterialRegistry for ProbeRegistry {
    fn register_material(&mut self, renderer: Rc<dyn MaterialRenderer>) -> i32 {
        let id = self.renderers.len() as i32;
        self.renderers.push(renderer);
        id
    }

    fn base_material(&self, _kind: BaseMaterialKind) -> Option<Rc<dyn BaseMaterial>> {
        Some(Rc::new(ProbeBase))
    }
}

struct ProbeBase;

impl BaseMaterial for ProbeBase {
    fn apply(&self, _material: &Material) {}

    fn restore(&self) {}

    fn is_transparent(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT_SRC: &str = "uniform mat4 uModel;\nvoid main() { gl_Position = vec4(0.0); }";
    const FRAG_SRC: &str = "uniform float uTime;\nvoid main() {}";

    fn probe_args() -> Args {
        Args {
            manifest: None,
            vertex: None,
            fragment: None,
            geometry: None,
            base: None,
            legacy: false,
            no_geometry: false,
            list_calls: false,
        }
    }

    fn write_pack(dir: &Path) {
        fs::write(
            dir.join("material.toml"),
            r#"
            name = "Demo"
            base = "transparent-add-color"

            [vertex]
            source = "shader.vert"

            [fragment]
            source = "shader.frag"
            "#,
        )
        .expect("write manifest");
        fs::write(dir.join("shader.vert"), VERT_SRC).expect("write vertex");
        fs::write(dir.join("shader.frag"), FRAG_SRC).expect("write fragment");
    }

    #[test]
    fn manifest_sources_resolve_relative_to_its_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_pack(dir.path());

        let mut args = probe_args();
        args.manifest = Some(dir.path().to_path_buf());
        let (name, desc) = resolve_input(&args).expect("resolve input");

        assert_eq!(name.as_deref(), Some("Demo"));
        assert!(desc.vertex.source.contains("gl_Position"));
        assert_eq!(desc.base_material, BaseMaterialKind::TransparentAddColor);
    }

    #[test]
    fn base_flag_overrides_the_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_pack(dir.path());

        let mut args = probe_args();
        args.manifest = Some(dir.path().to_path_buf());
        args.base = Some(BaseMaterialKind::Solid);
        let (_name, desc) = resolve_input(&args).expect("resolve input");

        assert_eq!(desc.base_material, BaseMaterialKind::Solid);
    }

    #[test]
    fn flag_input_requires_both_required_stages() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("shader.vert"), VERT_SRC).expect("write vertex");

        let mut args = probe_args();
        args.vertex = Some(dir.path().join("shader.vert"));
        assert!(resolve_input(&args).is_err());
    }
}
