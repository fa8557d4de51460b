//! Lexical scan of GLSL sources for uniform declarations.
//!
//! The simulated driver reports whatever uniform table it is configured with,
//! so a probe has to supply one. This scan recovers it from the stage sources
//! without a real compiler: it strips comments, walks `uniform` declarations
//! with their declarator lists, and resolves GLSL type names to driver type
//! tags. Declarations it cannot type are skipped, matching a linker that
//! optimized them away.

use glapi::sim::SimUniform;
use glapi::UniformType;

/// Largest array bound the scan honors; locations advance by element count
/// and must stay within `i32`.
const MAX_ARRAY_ELEMENTS: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedUniform {
    pub name: String,
    pub type_tag: u32,
    pub size: u32,
}

/// Collects uniform declarations across all stage sources, first occurrence
/// wins. The result order is the enumeration order the driver will report.
pub fn scan_uniforms(sources: &[&str]) -> Vec<ScannedUniform> {
    let mut found: Vec<ScannedUniform> = Vec::new();
    for source in sources {
        let stripped = strip_comments(source);
        for declaration in stripped.split(';') {
            collect_declaration(declaration, &mut found);
        }
    }
    found
}

/// Assigns sequential locations, arrays advancing by their element count.
pub fn to_sim_uniforms(scanned: &[ScannedUniform]) -> Vec<SimUniform> {
    let mut next_location = 0;
    scanned
        .iter()
        .map(|uniform| {
            let location = next_location;
            next_location += uniform.size as i32;
            SimUniform {
                name: uniform.name.clone(),
                type_tag: uniform.type_tag,
                size: uniform.size,
                location,
            }
        })
        .collect()
}

fn collect_declaration(declaration: &str, found: &mut Vec<ScannedUniform>) {
    let mut tokens = declaration.split_whitespace();
    loop {
        match tokens.next() {
            Some("uniform") => break,
            Some(_) => continue,
            None => return,
        }
    }
    let mut type_name = match tokens.next() {
        Some(token) => token,
        None => return,
    };
    if matches!(type_name, "highp" | "mediump" | "lowp") {
        type_name = match tokens.next() {
            Some(token) => token,
            None => return,
        };
    }
    let Some(type_tag) = glsl_type_tag(type_name) else {
        return;
    };
    let declarators = tokens.collect::<Vec<_>>().join(" ");
    for declarator in declarators.split(',') {
        let declarator = declarator.split('=').next().unwrap_or("").trim();
        if declarator.is_empty() {
            continue;
        }
        // Arrays are reported the way drivers report them: first element
        // name, full element count.
        let (name, size) = match declarator.split_once('[') {
            Some((name, rest)) => {
                let count = rest
                    .trim_end_matches(']')
                    .trim()
                    .parse::<u32>()
                    .unwrap_or(1);
                (format!("{}[0]", name.trim()), count.clamp(1, MAX_ARRAY_ELEMENTS))
            }
            None => (declarator.to_string(), 1),
        };
        if found.iter().all(|existing| existing.name != name) {
            found.push(ScannedUniform {
                name,
                type_tag,
                size,
            });
        }
    }
}

fn glsl_type_tag(name: &str) -> Option<u32> {
    let kind = match name {
        "float" => UniformType::Float,
        "vec2" => UniformType::FloatVec2,
        "vec3" => UniformType::FloatVec3,
        "vec4" => UniformType::FloatVec4,
        "int" => UniformType::Int,
        "ivec2" => UniformType::IntVec2,
        "ivec3" => UniformType::IntVec3,
        "ivec4" => UniformType::IntVec4,
        "bool" => UniformType::Bool,
        "bvec2" => UniformType::BoolVec2,
        "bvec3" => UniformType::BoolVec3,
        "bvec4" => UniformType::BoolVec4,
        "mat2" => UniformType::FloatMat2,
        "mat3" => UniformType::FloatMat3,
        "mat4" => UniformType::FloatMat4,
        "sampler1D" => UniformType::Sampler1d,
        "sampler2D" => UniformType::Sampler2d,
        "sampler3D" => UniformType::Sampler3d,
        "samplerCube" => UniformType::SamplerCube,
        "sampler1DShadow" => UniformType::Sampler1dShadow,
        "sampler2DShadow" => UniformType::Sampler2dShadow,
        _ => return None,
    };
    Some(kind.tag())
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glapi::consts;

    fn names(uniforms: &[ScannedUniform]) -> Vec<&str> {
        uniforms.iter().map(|uniform| uniform.name.as_str()).collect()
    }

    #[test]
    fn finds_declarations_across_stages() {
        let vertex = "uniform mat4 uModel;\nvoid main() { gl_Position = uModel * vec4(0.0); }";
        let fragment = "uniform sampler2D uTexture;\nuniform float uTime;\nvoid main() {}";
        let uniforms = scan_uniforms(&[vertex, fragment]);
        assert_eq!(names(&uniforms), vec!["uModel", "uTexture", "uTime"]);
        assert_eq!(uniforms[0].type_tag, consts::FLOAT_MAT4);
        assert_eq!(uniforms[1].type_tag, consts::SAMPLER_2D);
    }

    #[test]
    fn shared_names_are_reported_once() {
        let vertex = "uniform float uTime;";
        let fragment = "uniform float uTime;\nuniform vec2 uResolution;";
        let uniforms = scan_uniforms(&[vertex, fragment]);
        assert_eq!(names(&uniforms), vec!["uTime", "uResolution"]);
    }

    #[test]
    fn commented_declarations_are_ignored() {
        let source = "// uniform float uGone;\n/* uniform vec2 uAlso;\n   uniform vec3 uMore; */\nuniform float uKept;";
        let uniforms = scan_uniforms(&[source]);
        assert_eq!(names(&uniforms), vec!["uKept"]);
    }

    #[test]
    fn arrays_report_the_first_element_and_their_size() {
        let uniforms = scan_uniforms(&["uniform vec4 uLights[4];"]);
        assert_eq!(uniforms.len(), 1);
        assert_eq!(uniforms[0].name, "uLights[0]");
        assert_eq!(uniforms[0].size, 4);
    }

    #[test]
    fn multi_declarator_statements_yield_each_name() {
        let uniforms = scan_uniforms(&["uniform float uFade, uSpeed;"]);
        assert_eq!(names(&uniforms), vec!["uFade", "uSpeed"]);
    }

    #[test]
    fn unknown_types_are_skipped() {
        let source = "uniform LightBlock uBlock;\nuniform float uOk;";
        let uniforms = scan_uniforms(&[source]);
        assert_eq!(names(&uniforms), vec!["uOk"]);
    }

    #[test]
    fn precision_qualifiers_are_tolerated() {
        let uniforms = scan_uniforms(&["uniform highp float uTime;"]);
        assert_eq!(names(&uniforms), vec!["uTime"]);
        assert_eq!(uniforms[0].type_tag, consts::FLOAT);
    }

    #[test]
    fn locations_advance_by_array_size() {
        let scanned = scan_uniforms(&["uniform vec4 uLights[4];\nuniform float uTime;"]);
        let sim = to_sim_uniforms(&scanned);
        assert_eq!(sim[0].location, 0);
        assert_eq!(sim[1].location, 4);
    }

    #[test]
    fn oversized_array_bounds_are_clamped() {
        let scanned =
            scan_uniforms(&["uniform float uHuge[3000000000];\nuniform float uAfter;"]);
        assert_eq!(scanned[0].size, MAX_ARRAY_ELEMENTS);
        let sim = to_sim_uniforms(&scanned);
        assert_eq!(sim[0].location, 0);
        assert_eq!(sim[1].location, MAX_ARRAY_ELEMENTS as i32);
    }
}
