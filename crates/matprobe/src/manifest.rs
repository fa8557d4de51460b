//! Defines the `material.toml` schema a probe run consumes, mirroring the
//! descriptor the material library takes: two required stages, an optional
//! geometry stage with primitive parameters, and the base material choice.
//!
//! Types:
//!
//! - `MaterialManifest` is the top-level document with stage entries and
//!   presentation options.
//! - `StageEntry` and `GeometryEntry` store per-stage source paths and entry
//!   points; geometry adds primitive kinds and the vertices-out request.
//! - `BaseKind` and `PrimitiveName` encode the manifest spellings of library
//!   enums; `map_manifest_base` and `map_manifest_primitive` convert them.
//!
//! Functions:
//!
//! - `MaterialManifest::validate` returns human-readable issues so the probe
//!   can surface misconfigurations without panicking.

use std::fs;
use std::path::{Path, PathBuf};

use glapi::PrimitiveKind;
use glslmat::BaseMaterialKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    #[error("manifest validation failed: {0:?}")]
    ManifestValidation(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MaterialManifest {
    pub name: Option<String>,
    #[serde(default)]
    pub base: BaseKind,
    #[serde(default)]
    pub user_data: i32,
    pub vertex: StageEntry,
    pub fragment: StageEntry,
    #[serde(default)]
    pub geometry: Option<GeometryEntry>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StageEntry {
    pub source: PathBuf,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

fn default_entry_point() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeometryEntry {
    pub source: PathBuf,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    #[serde(default = "default_input")]
    pub input: PrimitiveName,
    #[serde(default = "default_output")]
    pub output: PrimitiveName,
    /// Zero requests the driver maximum.
    #[serde(default)]
    pub vertices_out: u32,
}

fn default_input() -> PrimitiveName {
    PrimitiveName::Triangles
}

fn default_output() -> PrimitiveName {
    PrimitiveName::TriangleStrip
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BaseKind {
    Solid,
    OneTextureBlend,
    TransparentAddColor,
    TransparentVertexAlpha,
    TransparentAlphaChannel,
    TransparentAlphaChannelRef,
}

impl Default for BaseKind {
    fn default() -> Self {
        Self::Solid
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveName {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl MaterialManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let manifest_path = if path.is_dir() {
            path.join("material.toml")
        } else {
            path.to_path_buf()
        };
        if !manifest_path.exists() {
            return Err(ManifestError::ManifestMissing(manifest_path));
        }

        let manifest_raw = fs::read_to_string(&manifest_path)?;
        let manifest: MaterialManifest = toml::from_str(&manifest_raw)?;
        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(ManifestError::ManifestValidation(issues));
        }

        Ok(manifest)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (stage, entry) in [("vertex", &self.vertex), ("fragment", &self.fragment)] {
            if entry.source.as_os_str().is_empty() {
                issues.push(format!("{stage} stage declares an empty source path"));
            }
            if entry.entry_point.is_empty() {
                issues.push(format!("{stage} stage declares an empty entry point"));
            }
        }
        if let Some(geometry) = &self.geometry {
            if geometry.source.as_os_str().is_empty() {
                issues.push("geometry stage declares an empty source path".to_string());
            }
            if geometry.entry_point.is_empty() {
                issues.push("geometry stage declares an empty entry point".to_string());
            }
        }
        issues
    }
}

pub fn map_manifest_base(kind: BaseKind) -> BaseMaterialKind {
    match kind {
        BaseKind::Solid => BaseMaterialKind::Solid,
        BaseKind::OneTextureBlend => BaseMaterialKind::OneTextureBlend,
        BaseKind::TransparentAddColor => BaseMaterialKind::TransparentAddColor,
        BaseKind::TransparentVertexAlpha => BaseMaterialKind::TransparentVertexAlpha,
        BaseKind::TransparentAlphaChannel => BaseMaterialKind::TransparentAlphaChannel,
        BaseKind::TransparentAlphaChannelRef => BaseMaterialKind::TransparentAlphaChannelRef,
    }
}

pub fn map_manifest_primitive(name: PrimitiveName) -> PrimitiveKind {
    match name {
        PrimitiveName::Points => PrimitiveKind::Points,
        PrimitiveName::Lines => PrimitiveKind::Lines,
        PrimitiveName::LineLoop => PrimitiveKind::LineLoop,
        PrimitiveName::LineStrip => PrimitiveKind::LineStrip,
        PrimitiveName::Triangles => PrimitiveKind::Triangles,
        PrimitiveName::TriangleStrip => PrimitiveKind::TriangleStrip,
        PrimitiveName::TriangleFan => PrimitiveKind::TriangleFan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, contents: &str) {
        fs::write(dir.join("material.toml"), contents).expect("write manifest");
    }

    #[test]
    fn loads_a_minimal_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_manifest(
            dir.path(),
            r#"
            [vertex]
            source = "shader.vert"

            [fragment]
            source = "shader.frag"
            "#,
        );
        let manifest = MaterialManifest::load(dir.path()).expect("load manifest");
        assert_eq!(manifest.base, BaseKind::Solid);
        assert_eq!(manifest.vertex.entry_point, "main");
        assert!(manifest.geometry.is_none());
    }

    #[test]
    fn resolves_kebab_case_base_kinds() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_manifest(
            dir.path(),
            r#"
            base = "transparent-add-color"

            [vertex]
            source = "shader.vert"

            [fragment]
            source = "shader.frag"
            "#,
        );
        let manifest = MaterialManifest::load(dir.path()).expect("load manifest");
        assert_eq!(manifest.base, BaseKind::TransparentAddColor);
        assert_eq!(
            map_manifest_base(manifest.base),
            BaseMaterialKind::TransparentAddColor
        );
    }

    #[test]
    fn geometry_defaults_follow_the_triangle_pipeline() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_manifest(
            dir.path(),
            r#"
            [vertex]
            source = "shader.vert"

            [fragment]
            source = "shader.frag"

            [geometry]
            source = "shader.geom"
            "#,
        );
        let manifest = MaterialManifest::load(dir.path()).expect("load manifest");
        let geometry = manifest.geometry.expect("geometry entry");
        assert_eq!(geometry.input, PrimitiveName::Triangles);
        assert_eq!(geometry.output, PrimitiveName::TriangleStrip);
        assert_eq!(geometry.vertices_out, 0);
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = MaterialManifest::load(dir.path()).expect_err("load should fail");
        assert!(matches!(err, ManifestError::ManifestMissing(_)));
        assert!(err.to_string().starts_with("manifest not found at "));
    }

    #[test]
    fn empty_entry_point_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_manifest(
            dir.path(),
            r#"
            [vertex]
            source = "shader.vert"
            entry_point = ""

            [fragment]
            source = "shader.frag"
            "#,
        );
        let err = MaterialManifest::load(dir.path()).expect_err("load should fail");
        match err {
            ManifestError::ManifestValidation(issues) => {
                assert_eq!(issues.len(), 1);
                assert!(issues[0].contains("vertex"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
