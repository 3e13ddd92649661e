//! Built-in filesystem presets (`@base`, `@git`, `@caches`, `@lint/<lang>`,
//! `@all`). Their internals are explicitly out of the core's scope (§1);
//! the core only ever sees the `PathLayer` entries this module produces.
//!
//! Shaped after the declarative preset-expansion pattern: a preset name
//! matches to a fixed list of path entries, expanded against a small
//! context of known directories.

use agent_sandbox_core::policy::PathLayer;

/// Context the preset table expands patterns against.
pub struct PresetContext {
    pub home_dir: String,
    pub work_dir: String,
}

/// Expand a preset name (without the leading `@`) into the `PathLayer`
/// entries it contributes. Unknown names return `None`; the caller
/// surfaces that as `UnknownPreset` further down the pipeline if the name
/// came from a `--cmd @name` command rule, or silently skips it if it came
/// from `filesystem.presets` (config-layer presets are validated by the
/// config collaborator, not the core).
pub fn expand(name: &str, ctx: &PresetContext) -> Option<PathLayer> {
    match name {
        "base" => Some(PathLayer {
            ro: vec!["/usr".to_string(), "/lib".to_string(), "/lib64".to_string(), "/bin".to_string()],
            rw: vec!["/tmp".to_string()],
            exclude: vec![],
        }),
        "git" => Some(PathLayer {
            ro: vec![format!("{}/.gitconfig", ctx.home_dir)],
            rw: vec![format!("{}/.git", ctx.work_dir)],
            exclude: vec![format!("{}/.ssh", ctx.home_dir)],
        }),
        "caches" => Some(PathLayer {
            ro: vec![],
            rw: vec![
                format!("{}/.cache", ctx.home_dir),
                "/tmp".to_string(),
            ],
            exclude: vec![],
        }),
        "lint/python" => Some(PathLayer {
            ro: vec![format!("{}/.cache/pip", ctx.home_dir)],
            rw: vec![ctx.work_dir.clone()],
            exclude: vec![format!("{}/.aws", ctx.home_dir), format!("{}/.netrc", ctx.home_dir)],
        }),
        "all" => {
            let mut merged = PathLayer::default();
            for sub in ["base", "git", "caches"] {
                if let Some(layer) = expand(sub, ctx) {
                    merged.ro.extend(layer.ro);
                    merged.rw.extend(layer.rw);
                    merged.exclude.extend(layer.exclude);
                }
            }
            Some(merged)
        }
        _ => None,
    }
}

/// Known preset names, used by the nested-sandbox filter's
/// `UnknownPreset` validation (§4.8).
pub const KNOWN_PRESETS: &[&str] = &["base", "git", "caches", "lint/python", "all"];

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PresetContext {
        PresetContext {
            home_dir: "/home/u".to_string(),
            work_dir: "/home/u/project".to_string(),
        }
    }

    #[test]
    fn base_preset_exposes_system_dirs() {
        let layer = expand("base", &ctx()).unwrap();
        assert!(layer.ro.contains(&"/usr".to_string()));
    }

    #[test]
    fn unknown_preset_returns_none() {
        assert!(expand("nonexistent", &ctx()).is_none());
    }

    #[test]
    fn all_preset_merges_sub_presets() {
        let layer = expand("all", &ctx()).unwrap();
        assert!(layer.ro.contains(&"/usr".to_string()));
        assert!(layer.rw.iter().any(|p| p.contains(".cache")));
    }

    #[test]
    fn git_preset_excludes_ssh_keys() {
        let layer = expand("git", &ctx()).unwrap();
        assert!(layer.exclude.iter().any(|p| p.ends_with(".ssh")));
    }
}
