use thiserror::Error;

use crate::consts;

/// Driver versions at or above this expose the program-object API; older
/// contexts fall back to the shader-object extension API.
///
/// Versions are encoded as `major * 100 + minor`, so 2.0 is `200`.
pub const PROGRAM_API_VERSION: u32 = 200;

/// Upper bound on the attached stages enumerated during program teardown.
/// Some drivers report more attachments than they actually hold, so callers
/// clamp to this many regardless of the reported count.
pub const MAX_ATTACHED_STAGES: usize = 8;

/// Program name under the program-object API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlProgram(pub u32);

impl GlProgram {
    /// The neutral program; binding it disables programmable shading.
    pub const NONE: GlProgram = GlProgram(0);
}

/// Stage name under the program-object API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlShader(pub u32);

/// Handle under the shader-object extension API, where programs and stages
/// share a single name space and a single delete entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlObject(pub u32);

impl GlObject {
    pub const NONE: GlObject = GlObject(0);
}

/// Driver-assigned slot for one active uniform. Negative means the driver
/// optimized the uniform away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    pub const UNUSED: UniformLocation = UniformLocation(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

/// Programmable pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
    Geometry,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
            StageKind::Geometry => f.write_str("geometry"),
        }
    }
}

/// Abstract primitive kind, translated to a driver value via
/// [`VideoDriver::gl_primitive`](crate::VideoDriver::gl_primitive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::Points => f.write_str("points"),
            PrimitiveKind::Lines => f.write_str("lines"),
            PrimitiveKind::LineLoop => f.write_str("line-loop"),
            PrimitiveKind::LineStrip => f.write_str("line-strip"),
            PrimitiveKind::Triangles => f.write_str("triangles"),
            PrimitiveKind::TriangleStrip => f.write_str("triangle-strip"),
            PrimitiveKind::TriangleFan => f.write_str("triangle-fan"),
        }
    }
}

/// Driver capabilities queried before touching the shader pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverFeature {
    /// Programmable shading is available at all.
    GlslPrograms,
    /// Geometry stages may be attached and configured.
    GeometryShaders,
}

/// Program parameters configured for an attached geometry stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryParam {
    InputKind,
    OutputKind,
    VerticesOut,
}

/// Render state snapshot the pipeline hands to material renderers when the
/// active material changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Registry identifier of the renderer driving this material.
    pub material_type: i32,
    /// Free-form parameter interpreted by blending base materials.
    pub type_param: f32,
}

impl Material {
    pub fn with_type(material_type: i32) -> Self {
        Self {
            material_type,
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            material_type: 0,
            type_param: 0.0,
        }
    }
}

/// The closed set of uniform value types the write dispatch understands.
///
/// Introspection stores the raw tag it got from the driver; conversion
/// happens at write time so a program carrying an exotic uniform still
/// links and only the writes against that uniform fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformType {
    Float,
    FloatVec2,
    FloatVec3,
    FloatVec4,
    Int,
    IntVec2,
    IntVec3,
    IntVec4,
    Bool,
    BoolVec2,
    BoolVec3,
    BoolVec4,
    FloatMat2,
    FloatMat3,
    FloatMat4,
    Sampler1d,
    Sampler2d,
    Sampler3d,
    SamplerCube,
    Sampler1dShadow,
    Sampler2dShadow,
}

/// Raw type tag outside the supported set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown uniform type tag {0:#06x}")]
pub struct UnknownUniformType(pub u32);

impl UniformType {
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            consts::FLOAT => Some(Self::Float),
            consts::FLOAT_VEC2 => Some(Self::FloatVec2),
            consts::FLOAT_VEC3 => Some(Self::FloatVec3),
            consts::FLOAT_VEC4 => Some(Self::FloatVec4),
            consts::INT => Some(Self::Int),
            consts::INT_VEC2 => Some(Self::IntVec2),
            consts::INT_VEC3 => Some(Self::IntVec3),
            consts::INT_VEC4 => Some(Self::IntVec4),
            consts::BOOL => Some(Self::Bool),
            consts::BOOL_VEC2 => Some(Self::BoolVec2),
            consts::BOOL_VEC3 => Some(Self::BoolVec3),
            consts::BOOL_VEC4 => Some(Self::BoolVec4),
            consts::FLOAT_MAT2 => Some(Self::FloatMat2),
            consts::FLOAT_MAT3 => Some(Self::FloatMat3),
            consts::FLOAT_MAT4 => Some(Self::FloatMat4),
            consts::SAMPLER_1D => Some(Self::Sampler1d),
            consts::SAMPLER_2D => Some(Self::Sampler2d),
            consts::SAMPLER_3D => Some(Self::Sampler3d),
            consts::SAMPLER_CUBE => Some(Self::SamplerCube),
            consts::SAMPLER_1D_SHADOW => Some(Self::Sampler1dShadow),
            consts::SAMPLER_2D_SHADOW => Some(Self::Sampler2dShadow),
            _ => None,
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            Self::Float => consts::FLOAT,
            Self::FloatVec2 => consts::FLOAT_VEC2,
            Self::FloatVec3 => consts::FLOAT_VEC3,
            Self::FloatVec4 => consts::FLOAT_VEC4,
            Self::Int => consts::INT,
            Self::IntVec2 => consts::INT_VEC2,
            Self::IntVec3 => consts::INT_VEC3,
            Self::IntVec4 => consts::INT_VEC4,
            Self::Bool => consts::BOOL,
            Self::BoolVec2 => consts::BOOL_VEC2,
            Self::BoolVec3 => consts::BOOL_VEC3,
            Self::BoolVec4 => consts::BOOL_VEC4,
            Self::FloatMat2 => consts::FLOAT_MAT2,
            Self::FloatMat3 => consts::FLOAT_MAT3,
            Self::FloatMat4 => consts::FLOAT_MAT4,
            Self::Sampler1d => consts::SAMPLER_1D,
            Self::Sampler2d => consts::SAMPLER_2D,
            Self::Sampler3d => consts::SAMPLER_3D,
            Self::SamplerCube => consts::SAMPLER_CUBE,
            Self::Sampler1dShadow => consts::SAMPLER_1D_SHADOW,
            Self::Sampler2dShadow => consts::SAMPLER_2D_SHADOW,
        }
    }

    /// Scalars per written element: vector width, or the full element count
    /// for matrices. Samplers take a single texture-unit index.
    pub fn component_count(self) -> usize {
        match self {
            Self::Float | Self::Int | Self::Bool => 1,
            Self::FloatVec2 | Self::IntVec2 | Self::BoolVec2 => 2,
            Self::FloatVec3 | Self::IntVec3 | Self::BoolVec3 => 3,
            Self::FloatVec4 | Self::IntVec4 | Self::BoolVec4 => 4,
            Self::FloatMat2 => 4,
            Self::FloatMat3 => 9,
            Self::FloatMat4 => 16,
            Self::Sampler1d
            | Self::Sampler2d
            | Self::Sampler3d
            | Self::SamplerCube
            | Self::Sampler1dShadow
            | Self::Sampler2dShadow => 1,
        }
    }

    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            Self::Sampler1d
                | Self::Sampler2d
                | Self::Sampler3d
                | Self::SamplerCube
                | Self::Sampler1dShadow
                | Self::Sampler2dShadow
        )
    }
}

impl TryFrom<u32> for UniformType {
    type Error = UnknownUniformType;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        Self::from_tag(tag).ok_or(UnknownUniformType(tag))
    }
}

impl std::fmt::Display for UniformType {
    /// GLSL source spelling of the type.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Float => "float",
            Self::FloatVec2 => "vec2",
            Self::FloatVec3 => "vec3",
            Self::FloatVec4 => "vec4",
            Self::Int => "int",
            Self::IntVec2 => "ivec2",
            Self::IntVec3 => "ivec3",
            Self::IntVec4 => "ivec4",
            Self::Bool => "bool",
            Self::BoolVec2 => "bvec2",
            Self::BoolVec3 => "bvec3",
            Self::BoolVec4 => "bvec4",
            Self::FloatMat2 => "mat2",
            Self::FloatMat3 => "mat3",
            Self::FloatMat4 => "mat4",
            Self::Sampler1d => "sampler1D",
            Self::Sampler2d => "sampler2D",
            Self::Sampler3d => "sampler3D",
            Self::SamplerCube => "samplerCube",
            Self::Sampler1dShadow => "sampler1DShadow",
            Self::Sampler2dShadow => "sampler2DShadow",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in [
            UniformType::Float,
            UniformType::IntVec3,
            UniformType::BoolVec4,
            UniformType::FloatMat3,
            UniformType::SamplerCube,
        ] {
            assert_eq!(UniformType::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(UniformType::from_tag(0xDEAD), None);
        assert_eq!(UniformType::try_from(0xDEAD), Err(UnknownUniformType(0xDEAD)));
    }

    #[test]
    fn component_counts_match_glsl_widths() {
        assert_eq!(UniformType::Float.component_count(), 1);
        assert_eq!(UniformType::FloatVec3.component_count(), 3);
        assert_eq!(UniformType::FloatMat4.component_count(), 16);
        assert_eq!(UniformType::Sampler2d.component_count(), 1);
    }

    #[test]
    fn negative_locations_are_unused() {
        assert!(!UniformLocation::UNUSED.is_valid());
        assert!(!UniformLocation(-7).is_valid());
        assert!(UniformLocation(0).is_valid());
        assert!(UniformLocation(3).is_valid());
    }
}
