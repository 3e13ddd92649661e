//! Self-Binary Mounter (§4.4): exposes the launcher's own executable at a
//! stable in-sandbox path so in-sandbox wrappers and nested invocations can
//! find it.

use std::path::PathBuf;

use crate::constants::paths::SELF_BINARY;
use crate::error::{Result, SandboxError};

/// A single bind-mount directive: host source to sandbox destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfBinaryMount {
    pub host_path: PathBuf,
    pub sandbox_path: &'static str,
}

/// Locate the launcher's own executable (resolving any symlinks, e.g. a
/// `PATH` shim) and produce the bind-mount directive for §4.5 category 7.
pub fn locate() -> Result<SelfBinaryMount> {
    let exe =
        std::env::current_exe().map_err(|e| SandboxError::SelfBinaryNotFound(e.to_string()))?;
    let real = std::fs::canonicalize(&exe)
        .map_err(|e| SandboxError::SelfBinaryNotFound(e.to_string()))?;
    Ok(SelfBinaryMount {
        host_path: real,
        sandbox_path: SELF_BINARY,
    })
}

/// Detect whether this process is itself running inside a sandbox created
/// by this launcher (§4.8): the sentinel self-binary exists at the
/// well-known in-sandbox location.
pub fn is_nested() -> bool {
    std::path::Path::new(SELF_BINARY).exists()
}
