use glapi::StageKind;
use thiserror::Error;

/// Failures on the compile, link, and introspection path.
///
/// Each is logged where it occurs; material creation collapses them into
/// the `NO_MATERIAL` sentinel, so pipeline callers usually only see the
/// log lines. Per-draw write failures are plain boolean returns and never
/// surface here.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("driver does not support programmable shading")]
    ShadingUnsupported,

    #[error("{stage} shader failed to compile")]
    Compile {
        stage: StageKind,
        log: Option<String>,
    },

    #[error("shader program failed to link")]
    Link { log: Option<String> },

    #[error("failed to retrieve uniform information ({count} active uniforms reported)")]
    Introspection { count: u32 },
}
