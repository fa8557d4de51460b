use std::path::PathBuf;

use clap::Parser;
use glslmat::BaseMaterialKind;

#[derive(Parser, Debug)]
#[command(
    name = "matprobe",
    author,
    version,
    about = "Dry-runs GLSL material manifests against a simulated driver",
    arg_required_else_help = false
)]
pub struct Args {
    /// Material manifest (`material.toml`) or a directory containing one.
    #[arg(value_name = "MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Vertex stage source; overrides the manifest entry.
    #[arg(long, value_name = "PATH")]
    pub vertex: Option<PathBuf>,

    /// Fragment stage source; overrides the manifest entry.
    #[arg(long, value_name = "PATH")]
    pub fragment: Option<PathBuf>,

    /// Geometry stage source; overrides the manifest entry.
    #[arg(long, value_name = "PATH")]
    pub geometry: Option<PathBuf>,

    /// Base material to layer on; overrides the manifest. `solid` or one of
    /// the transparent kinds.
    #[arg(long, value_name = "KIND", value_parser = parse_base_material)]
    pub base: Option<BaseMaterialKind>,

    /// Probe against the legacy shader-object driver generation.
    #[arg(long)]
    pub legacy: bool,

    /// Probe against a driver without geometry shader support.
    #[arg(long)]
    pub no_geometry: bool,

    /// Print every driver call the probe issued.
    #[arg(long)]
    pub list_calls: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

pub fn parse_base_material(value: &str) -> Result<BaseMaterialKind, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("base material must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "solid" => Ok(BaseMaterialKind::Solid),
        "one-texture-blend" | "blend" => Ok(BaseMaterialKind::OneTextureBlend),
        "transparent-add-color" | "add-color" => Ok(BaseMaterialKind::TransparentAddColor),
        "transparent-vertex-alpha" | "vertex-alpha" => {
            Ok(BaseMaterialKind::TransparentVertexAlpha)
        }
        "transparent-alpha-channel" | "alpha-channel" => {
            Ok(BaseMaterialKind::TransparentAlphaChannel)
        }
        "transparent-alpha-channel-ref" | "alpha-ref" => {
            Ok(BaseMaterialKind::TransparentAlphaChannelRef)
        }
        other => Err(format!(
            "unknown base material '{other}'; expected solid or a transparent kind"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_material_accepts_short_aliases() {
        assert_eq!(
            parse_base_material("add-color"),
            Ok(BaseMaterialKind::TransparentAddColor)
        );
        assert_eq!(
            parse_base_material(" SOLID "),
            Ok(BaseMaterialKind::Solid)
        );
    }

    #[test]
    fn base_material_rejects_unknown_kinds() {
        assert!(parse_base_material("glassy").is_err());
        assert!(parse_base_material("").is_err());
    }
}
