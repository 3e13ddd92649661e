//! Policy Compiler (§4.2): merges four path layers into a deterministically
//! ordered, deduplicated mount list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SandboxError};
use crate::path_resolver;

use super::types::{Layers, PathAccess, PathLayer, PathSource, ResolvedPath};

/// Stage 1: resolve every pattern in every layer, tagging each output with
/// its source and access.
fn resolve_all(layers: &Layers, home_dir: &Path, work_dir: &Path) -> Result<Vec<ResolvedPath>> {
    let mut out = Vec::new();
    for (source, layer) in [
        (PathSource::Preset, &layers.preset),
        (PathSource::Global, &layers.global),
        (PathSource::Project, &layers.project),
        (PathSource::Cli, &layers.cli),
    ] {
        resolve_layer(layer, source, home_dir, work_dir, &mut out)?;
    }
    Ok(out)
}

fn resolve_layer(
    layer: &PathLayer,
    source: PathSource,
    home_dir: &Path,
    work_dir: &Path,
    out: &mut Vec<ResolvedPath>,
) -> Result<()> {
    for (access, patterns) in [
        (PathAccess::Ro, &layer.ro),
        (PathAccess::Rw, &layer.rw),
        (PathAccess::Exclude, &layer.exclude),
    ] {
        for pattern in patterns {
            let resolved_paths = path_resolver::resolve(pattern, home_dir, work_dir)?;
            for resolved in resolved_paths {
                out.push(ResolvedPath {
                    original: pattern.clone(),
                    resolved,
                    access,
                    source,
                });
            }
        }
    }
    Ok(())
}

/// Stage 2: within each group of entries sharing a `resolved` path, pick
/// the single winner via the total order: exact-beats-glob, then
/// access-priority, then source-priority.
fn pick_winner(candidates: Vec<ResolvedPath>) -> ResolvedPath {
    candidates
        .into_iter()
        .max_by(|a, b| {
            let exact_a = !a.is_glob();
            let exact_b = !b.is_glob();
            exact_a
                .cmp(&exact_b)
                .then_with(|| a.access.priority().cmp(&b.access.priority()))
                .then_with(|| a.source.priority().cmp(&b.source.priority()))
        })
        .expect("group is never empty")
}

fn deduplicate(resolved: Vec<ResolvedPath>) -> Vec<ResolvedPath> {
    let mut groups: HashMap<PathBuf, Vec<ResolvedPath>> = HashMap::new();
    for rp in resolved {
        groups.entry(rp.resolved.clone()).or_default().push(rp);
    }
    let mut winners: Vec<ResolvedPath> = groups.into_values().map(pick_winner).collect();
    // Stable, deterministic intermediate order before stage 3's explicit
    // sort; sorting here too keeps dedup itself order-independent.
    winners.sort_by(|a, b| a.resolved.cmp(&b.resolved));
    winners
}

/// Stage 3: sort by ascending depth, then lexicographically on `resolved`.
fn sort_for_mount_order(mut entries: Vec<ResolvedPath>) -> Vec<ResolvedPath> {
    entries.sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.resolved.cmp(&b.resolved)));
    entries
}

/// Stage 4: fail if any `exclude` entry's subtree contains `effective_cwd`.
fn check_cwd_not_excluded(entries: &[ResolvedPath], effective_cwd: &Path) -> Result<()> {
    for entry in entries {
        if entry.access == PathAccess::Exclude && effective_cwd.starts_with(&entry.resolved) {
            return Err(SandboxError::WorkDirExcluded {
                cwd: effective_cwd.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Run the full four-stage compilation pipeline (§4.2).
pub fn compile(
    layers: &Layers,
    home_dir: &Path,
    work_dir: &Path,
    effective_cwd: &Path,
) -> Result<Vec<ResolvedPath>> {
    let resolved = resolve_all(layers, home_dir, work_dir)?;
    let deduped = deduplicate(resolved);
    let sorted = sort_for_mount_order(deduped);
    check_cwd_not_excluded(&sorted, effective_cwd)?;
    Ok(sorted)
}
