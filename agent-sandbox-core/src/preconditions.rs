//! Preconditions Gate (§4.6): checks that must pass before any sandbox
//! work begins.

use std::path::PathBuf;

use crate::bwrap::find_bwrap;
use crate::error::{Result, SandboxError};

/// Run all four preflight checks in order, failing fast on the first
/// violation. Returns the resolved home directory and the `bwrap` path on
/// success, since both are needed by later stages.
pub fn check() -> Result<(PathBuf, PathBuf)> {
    check_linux()?;
    check_not_root()?;
    let bwrap_path = check_bwrap_present()?;
    let home_dir = check_home_dir()?;
    Ok((home_dir, bwrap_path))
}

#[cfg(target_os = "linux")]
fn check_linux() -> Result<()> {
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn check_linux() -> Result<()> {
    Err(SandboxError::NotLinux)
}

fn check_not_root() -> Result<()> {
    if current_uid() == 0 {
        return Err(SandboxError::RunningAsRoot);
    }
    Ok(())
}

#[cfg(unix)]
fn current_uid() -> u32 {
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    1
}

fn check_bwrap_present() -> Result<PathBuf> {
    find_bwrap().ok_or(SandboxError::BwrapNotFound)
}

fn check_home_dir() -> Result<PathBuf> {
    let home = std::env::var_os(crate::constants::envs::HOME)
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or_else(|| SandboxError::HomeNotFound(PathBuf::from("(unset)")))?;

    match std::fs::metadata(&home) {
        Ok(meta) if meta.is_dir() => Ok(home),
        Ok(_) => Err(SandboxError::HomeNotDir(home)),
        Err(_) => Err(SandboxError::HomeNotFound(home)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_root_check_passes_for_test_runner() {
        // Test suites never run as uid 0 in CI containers used here.
        if current_uid() != 0 {
            assert!(check_not_root().is_ok());
        }
    }

    #[test]
    fn home_dir_check_reflects_env() {
        let result = check_home_dir();
        if std::env::var_os("HOME").is_some() {
            // HOME is normally set and valid in a dev/CI shell.
            if let Ok(home) = result {
                assert!(home.is_absolute() || home.as_os_str().is_empty());
            }
        }
    }
}
