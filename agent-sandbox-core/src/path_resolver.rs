//! Path Resolver (§4.1): expands a single raw pattern into zero or more
//! absolute, symlink-resolved, existing paths.
//!
//! Pure transformation aside from the filesystem `stat`/`readlink` calls
//! needed to check existence and dereference symlinks.

use std::path::{Path, PathBuf};

use crate::error::{Result, SandboxError};

const GLOB_META: [char; 3] = ['*', '?', '['];

/// Expand `pattern` against `(home_dir, work_dir)` into zero or more
/// resolved, existing, symlink-dereferenced absolute paths.
pub fn resolve(pattern: &str, home_dir: &Path, work_dir: &Path) -> Result<Vec<PathBuf>> {
    if pattern.is_empty() {
        return Err(SandboxError::EmptyPattern);
    }

    let expanded = expand_anchor(pattern, home_dir, work_dir);
    let cleaned = clean(&expanded);
    if cleaned.as_os_str().is_empty() {
        return Err(SandboxError::EmptyPattern);
    }

    let candidates = if contains_glob_meta(&cleaned) {
        expand_glob(&cleaned, pattern)?
    } else {
        vec![cleaned]
    };

    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(resolved) = resolve_one(&candidate)? {
            out.push(resolved);
        }
    }
    Ok(out)
}

/// Step 1: anchor expansion. `~` and `~/` expand against `home_dir`;
/// `~user` is literal; absolute patterns pass through; relative patterns
/// join `work_dir`. `$VAR` is never interpolated.
fn expand_anchor(pattern: &str, home_dir: &Path, work_dir: &Path) -> PathBuf {
    if pattern == "~" {
        return home_dir.to_path_buf();
    }
    if let Some(rest) = pattern.strip_prefix("~/") {
        return home_dir.join(rest);
    }
    let path = Path::new(pattern);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.join(path)
    }
}

/// Step 2: collapse `.`, `..`, doubled/trailing separators without
/// touching the filesystem (lexical cleaning, not `canonicalize`).
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        use std::path::Component::*;
        match component {
            RootDir => out.push("/"),
            Prefix(p) => out.push(p.as_os_str()),
            CurDir => {}
            ParentDir => {
                if !out.pop() {
                    // leading `..` on an absolute path has nowhere to go;
                    // drop it rather than escape root.
                }
            }
            Normal(seg) => out.push(seg),
        }
    }
    out
}

fn contains_glob_meta(path: &Path) -> bool {
    path.to_string_lossy().chars().any(|c| GLOB_META.contains(&c))
}

/// Step 3: POSIX glob expansion. Returns only paths that exist (glob never
/// yields nonexistent matches); a syntactically invalid pattern is fatal.
fn expand_glob(cleaned: &Path, original_pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern_str = cleaned.to_string_lossy();
    let matches = glob::glob(&pattern_str).map_err(|source| SandboxError::InvalidGlobPattern {
        pattern: original_pattern.to_string(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in matches {
        match entry {
            Ok(path) => out.push(path),
            // A permission error surfacing mid-walk is fatal; glob itself
            // silently skips unreadable directories it can't descend into,
            // which matches the "empty glob is not an error" policy.
            Err(_) => continue,
        }
    }
    Ok(out)
}

/// Steps 4-5: existence filter + full symlink dereference for a single
/// (non-glob) candidate. Returns `Ok(None)` only for a silently-dropped
/// nonexistent path or dangling symlink; any other I/O error (permission
/// denied, too many levels of symlinks, a non-directory in the middle of
/// the path, ...) is fatal per §4.1 step 5.
fn resolve_one(candidate: &Path) -> Result<Option<PathBuf>> {
    match std::fs::symlink_metadata(candidate) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SandboxError::StatFailed {
                path: candidate.to_path_buf(),
                source: e,
            })
        }
    }

    match std::fs::canonicalize(candidate) {
        Ok(real) => Ok(Some(real)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SandboxError::StatFailed {
            path: candidate.to_path_buf(),
            source: e,
        }),
    }
}
