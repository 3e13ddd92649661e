//! Docker-Socket Policy (§4.3): bind/mask/skip decision for
//! `/var/run/docker.sock`.

use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use crate::constants::paths::DOCKER_SOCKET;
use crate::error::{Result, SandboxError};

/// What the argument builder should do about the Docker socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerAction {
    /// Nothing to do (§4.3 rows 2 and 3).
    Skip,
    /// Bind the resolved real socket to the resolved destination (row 1).
    Bind { real: PathBuf, dest: PathBuf },
    /// Mask the path with a read-only bind of `/dev/null` (row 4).
    Mask { dest: PathBuf },
}

/// Decide the docker socket action per the table in §4.3.
pub fn decide(docker_enabled: bool) -> Result<DockerAction> {
    let socket_path = Path::new(DOCKER_SOCKET);
    let present = socket_exists(socket_path);

    if docker_enabled {
        if !present {
            return Err(SandboxError::DockerSocketNotFound(socket_path.to_path_buf()));
        }
        let real = std::fs::canonicalize(socket_path)
            .map_err(|source| SandboxError::StatFailed { path: socket_path.to_path_buf(), source })?;
        let parent = socket_path.parent().unwrap_or(Path::new("/"));
        let real_parent = std::fs::canonicalize(parent)
            .map_err(|source| SandboxError::StatFailed { path: parent.to_path_buf(), source })?;
        let dest = real_parent.join(real.file_name().unwrap_or_default());
        return Ok(DockerAction::Bind { real, dest });
    }

    if !present {
        return Ok(DockerAction::Skip);
    }

    if resolves_under_run(parent_of(socket_path)) {
        // `/run` is replaced wholesale by tmpfs (§4.5 step 5); the socket
        // disappears naturally, nothing to mask.
        Ok(DockerAction::Skip)
    } else {
        Ok(DockerAction::Mask {
            dest: socket_path.to_path_buf(),
        })
    }
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("/"))
}

fn socket_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_socket() || m.file_type().is_symlink())
        .unwrap_or(false)
}

/// True if `dir`, once symlinks are fully resolved, is `/run` itself or a
/// path beneath it (covers both `/var/run -> /run` and `/var/run/sub`).
fn resolves_under_run(dir: &Path) -> bool {
    match std::fs::canonicalize(dir) {
        Ok(real) => real == Path::new("/run") || real.starts_with("/run"),
        Err(_) => false,
    }
}
