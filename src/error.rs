use std::path::PathBuf;

use thiserror::Error;

/// Which injected subsystem a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorKind {
    Camera,
    Movement,
    CenterEyeAnchor,
}

impl std::fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CollaboratorKind::Camera => "camera rig",
            CollaboratorKind::Movement => "movement controller",
            CollaboratorKind::CenterEyeAnchor => "center-eye anchor",
        };
        f.write_str(name)
    }
}

/// Lookup problems found while resolving collaborators. These are never
/// propagated; each one becomes a single warning and a degraded session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("no {0} attached, dependent updates are disabled")]
    Missing(CollaboratorKind),
    #[error("{count} {kind}s attached, using the first one")]
    Multiple { kind: CollaboratorKind, count: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
