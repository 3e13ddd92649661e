//! Error taxonomy for the sandbox launcher core.
//!
//! Every non-supervision error surfaces to the caller and becomes a fatal,
//! one-line diagnostic. Variants are grouped the way the spec groups them
//! (preflight, policy compilation, docker, self-binary, supervision) rather
//! than by the module that raises them.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum SandboxError {
    // ---- Preflight (§4.6) ----
    #[error("agent-sandbox only runs on Linux hosts")]
    NotLinux,

    #[error("refusing to run as root (uid 0)")]
    RunningAsRoot,

    #[error(
        "bwrap not found on PATH; install bubblewrap (e.g. `apt install bubblewrap`, \
         `dnf install bubblewrap`, or `brew install bubblewrap` on Linuxbrew)"
    )]
    BwrapNotFound,

    #[error("home directory {0} does not exist")]
    HomeNotFound(PathBuf),

    #[error("home directory {0} is not a directory")]
    HomeNotDir(PathBuf),

    // ---- Policy compilation (§4.1, §4.2) ----
    #[error("empty path pattern")]
    EmptyPattern,

    #[error("no command given to run inside the sandbox")]
    EmptyCommand,

    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlobPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("unknown command preset {0:?}")]
    UnknownPreset(String),

    #[error(
        "working directory {cwd} is excluded by path policy and cannot be used as cwd"
    )]
    WorkDirExcluded { cwd: PathBuf },

    #[error("failed to stat {path}: {source}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ---- Docker (§4.3) ----
    #[error("docker was requested but no socket was found at {0}")]
    DockerSocketNotFound(PathBuf),

    // ---- Self-binary (§4.4) ----
    #[error("could not locate or resolve the launcher's own executable: {0}")]
    SelfBinaryNotFound(String),

    // ---- Config/CLI (§6.2) ----
    #[error("invalid --cmd flag {0:?}: expected KEY=VALUE")]
    InvalidCmdFlag(String),

    #[error("config file {0} was explicitly requested but does not exist")]
    MissingExplicitConfig(PathBuf),

    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ---- Supervision (§4.7) ----
    #[error("failed to spawn bwrap: {0}")]
    SpawnFailed(std::io::Error),

    #[error("failed to wait for child: {0}")]
    WaitFailed(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SandboxError>;

impl SandboxError {
    /// A stable, lowercase kind tag matching the names used in spec.md §7,
    /// useful for tests and for callers that want to match on error class
    /// without depending on message text.
    pub fn kind(&self) -> &'static str {
        match self {
            SandboxError::NotLinux => "NotLinux",
            SandboxError::RunningAsRoot => "RunningAsRoot",
            SandboxError::BwrapNotFound => "BwrapNotFound",
            SandboxError::HomeNotFound(_) => "HomeNotFound",
            SandboxError::HomeNotDir(_) => "HomeNotDir",
            SandboxError::EmptyPattern => "EmptyPattern",
            SandboxError::EmptyCommand => "EmptyCommand",
            SandboxError::InvalidGlobPattern { .. } => "InvalidGlobPattern",
            SandboxError::UnknownPreset(_) => "UnknownPreset",
            SandboxError::WorkDirExcluded { .. } => "WorkDirExcluded",
            SandboxError::StatFailed { .. } => "StatFailed",
            SandboxError::DockerSocketNotFound(_) => "DockerSocketNotFound",
            SandboxError::SelfBinaryNotFound(_) => "SelfBinaryNotFound",
            SandboxError::InvalidCmdFlag(_) => "InvalidCmdFlag",
            SandboxError::MissingExplicitConfig(_) => "MissingExplicitConfig",
            SandboxError::ParseConfig { .. } => "ParseConfig",
            SandboxError::SpawnFailed(_) => "SpawnFailed",
            SandboxError::WaitFailed(_) => "WaitFailed",
        }
    }
}
