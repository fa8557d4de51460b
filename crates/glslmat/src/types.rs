use std::rc::Rc;

use glapi::{Material, PrimitiveKind};

use crate::material::ShaderMaterial;

/// Source text for one programmable stage.
#[derive(Clone, Debug)]
pub struct StageSource {
    pub source: String,
    /// Entry point name. Accepted for interface parity; the driver always
    /// compiles against its own canonical entry convention.
    pub entry_point: String,
    /// Requested target profile. Accepted for interface parity, ignored.
    pub profile: Option<String>,
}

impl StageSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entry_point: "main".to_string(),
            profile: None,
        }
    }
}

/// Geometry stage source plus the program parameters it declares.
#[derive(Clone, Debug)]
pub struct GeometryStage {
    pub stage: StageSource,
    pub input_kind: PrimitiveKind,
    pub output_kind: PrimitiveKind,
    /// Zero requests the driver maximum; larger values are clamped to it.
    pub max_output_vertices: u32,
}

impl GeometryStage {
    pub fn new(stage: StageSource) -> Self {
        Self {
            stage,
            input_kind: PrimitiveKind::Triangles,
            output_kind: PrimitiveKind::TriangleStrip,
            max_output_vertices: 0,
        }
    }
}

/// Fixed-function material a program layers its non-programmable state on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseMaterialKind {
    Solid,
    OneTextureBlend,
    TransparentAddColor,
    TransparentVertexAlpha,
    TransparentAlphaChannel,
    TransparentAlphaChannelRef,
}

impl BaseMaterialKind {
    /// Whether materials of this kind pick up a fixed-function delegate.
    /// Only the blending kinds do.
    pub fn delegates_blending(self) -> bool {
        matches!(
            self,
            Self::OneTextureBlend
                | Self::TransparentAddColor
                | Self::TransparentVertexAlpha
                | Self::TransparentAlphaChannel
                | Self::TransparentAlphaChannelRef
        )
    }
}

impl Default for BaseMaterialKind {
    fn default() -> Self {
        Self::Solid
    }
}

impl std::fmt::Display for BaseMaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Solid => f.write_str("solid"),
            Self::OneTextureBlend => f.write_str("one-texture-blend"),
            Self::TransparentAddColor => f.write_str("transparent-add-color"),
            Self::TransparentVertexAlpha => f.write_str("transparent-vertex-alpha"),
            Self::TransparentAlphaChannel => f.write_str("transparent-alpha-channel"),
            Self::TransparentAlphaChannelRef => f.write_str("transparent-alpha-channel-ref"),
        }
    }
}

/// Per-draw hook through which application code supplies uniform values.
///
/// The material never sources defaults itself; if no callback is attached,
/// uniforms keep whatever the driver last stored.
pub trait ShaderConstantCallback {
    /// Observes the material being activated.
    fn on_set_material(&self, _material: &Material) {}

    /// Invoked before each draw; write uniforms through `services`.
    fn on_set_constants(&self, services: &ShaderMaterial, user_data: i32);
}

/// Everything needed to create one shader material.
pub struct ShaderMaterialDesc {
    pub vertex: StageSource,
    pub fragment: StageSource,
    pub geometry: Option<GeometryStage>,
    pub callback: Option<Rc<dyn ShaderConstantCallback>>,
    pub base_material: BaseMaterialKind,
    /// Opaque tag handed back to the callback on every draw.
    pub user_data: i32,
}

impl ShaderMaterialDesc {
    pub fn new(vertex: StageSource, fragment: StageSource) -> Self {
        Self {
            vertex,
            fragment,
            geometry: None,
            callback: None,
            base_material: BaseMaterialKind::Solid,
            user_data: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_blending_kinds_delegate() {
        assert!(!BaseMaterialKind::Solid.delegates_blending());
        for kind in [
            BaseMaterialKind::OneTextureBlend,
            BaseMaterialKind::TransparentAddColor,
            BaseMaterialKind::TransparentVertexAlpha,
            BaseMaterialKind::TransparentAlphaChannel,
            BaseMaterialKind::TransparentAlphaChannelRef,
        ] {
            assert!(kind.delegates_blending(), "{kind} should delegate");
        }
    }

    #[test]
    fn stage_source_defaults_to_main_entry() {
        let stage = StageSource::new("void main() {}");
        assert_eq!(stage.entry_point, "main");
        assert!(stage.profile.is_none());
    }

    #[test]
    fn geometry_defaults_request_driver_maximum() {
        let geometry = GeometryStage::new(StageSource::new("void main() {}"));
        assert_eq!(geometry.input_kind, PrimitiveKind::Triangles);
        assert_eq!(geometry.output_kind, PrimitiveKind::TriangleStrip);
        assert_eq!(geometry.max_output_vertices, 0);
    }
}
