//! Core data model (§3): closed sum types and the central `ResolvedPath`.

use std::path::PathBuf;

/// Access mode for a path (§3). Closed set, native tagged union per §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathAccess {
    Ro,
    Rw,
    Exclude,
}

impl PathAccess {
    /// Priority used in dedup tie-break rule 2 (§4.2): `exclude > ro > rw`.
    /// Higher number wins.
    pub fn priority(self) -> u8 {
        match self {
            PathAccess::Exclude => 2,
            PathAccess::Ro => 1,
            PathAccess::Rw => 0,
        }
    }
}

/// Provenance of a path entry (§3). Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSource {
    Preset,
    Global,
    Project,
    Cli,
}

impl PathSource {
    /// Priority used in dedup tie-break rule 3 (§4.2): `cli > project >
    /// global > preset`. Higher number wins.
    pub fn priority(self) -> u8 {
        match self {
            PathSource::Cli => 3,
            PathSource::Project => 2,
            PathSource::Global => 1,
            PathSource::Preset => 0,
        }
    }
}

/// Three ordered lists of raw pattern strings for one source layer (§3).
#[derive(Debug, Clone, Default)]
pub struct PathLayer {
    pub ro: Vec<String>,
    pub rw: Vec<String>,
    pub exclude: Vec<String>,
}

impl PathLayer {
    pub fn is_empty(&self) -> bool {
        self.ro.is_empty() && self.rw.is_empty() && self.exclude.is_empty()
    }
}

/// The central resolved entity (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// The pattern as written, including glob metacharacters / `~` prefix.
    pub original: String,
    /// Absolute, symlink-dereferenced, cleaned filesystem path.
    pub resolved: PathBuf,
    pub access: PathAccess,
    pub source: PathSource,
}

impl ResolvedPath {
    /// Whether `original` contains glob metacharacters (used by the
    /// exact-beats-glob tie-break rule).
    pub fn is_glob(&self) -> bool {
        self.original.contains(['*', '?', '['])
    }

    /// Mount depth: number of `/` separators beyond the root (root is 0).
    pub fn depth(&self) -> usize {
        self.resolved
            .components()
            .filter(|c| !matches!(c, std::path::Component::RootDir))
            .count()
    }
}

/// A per-command wrapper rule (§3, §4.8). Closed sum type with ≤4 variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRule {
    /// Command runs unrestricted.
    Raw,
    /// Command is blocked entirely.
    Block,
    /// Command is filtered by a named preset policy.
    Preset(String),
    /// Command is filtered by an external wrapper script at this path.
    Script(String),
}

impl CommandRule {
    /// A coarse strictness ordering used by the nested-sandbox monotonicity
    /// rule (§4.8): `Block` is maximally restrictive, `Raw` is minimally
    /// restrictive. `Preset`/`Script` are incomparable to each other (both
    /// rank strictly between `Raw` and `Block`) since their effective
    /// restrictiveness depends on external policy content the core treats
    /// as opaque.
    fn strictness(&self) -> u8 {
        match self {
            CommandRule::Raw => 0,
            CommandRule::Preset(_) | CommandRule::Script(_) => 1,
            CommandRule::Block => 2,
        }
    }

    /// True if `self` (the inner/nested rule) is at least as restrictive as
    /// `outer`. `Raw` vs `Raw` and identical non-Raw/non-Block rules both
    /// count as "at least as restrictive" (no relaxation occurred).
    pub fn is_at_least_as_restrictive_as(&self, outer: &CommandRule) -> bool {
        if self == outer {
            return true;
        }
        self.strictness() >= outer.strictness()
    }

    /// Encode as the same compact string form used in `--cmd KEY=VALUE`
    /// and the config file's `commands` map, for carrying rules across the
    /// sandbox boundary via environment (§4.8, §6.4).
    pub fn to_wire(&self) -> String {
        match self {
            CommandRule::Raw => "true".to_string(),
            CommandRule::Block => "false".to_string(),
            CommandRule::Preset(name) => format!("@{name}"),
            CommandRule::Script(path) => path.clone(),
        }
    }

    /// Inverse of [`CommandRule::to_wire`].
    pub fn from_wire(s: &str) -> CommandRule {
        match s {
            "true" => CommandRule::Raw,
            "false" => CommandRule::Block,
            v if v.starts_with('@') => CommandRule::Preset(v.trim_start_matches('@').to_string()),
            v => CommandRule::Script(v.to_string()),
        }
    }
}

/// The external input to the core (§3, §6.1). The core does not care how
/// this was produced; the CLI crate owns parsing/merging.
#[derive(Debug, Clone)]
pub struct Config {
    pub network: bool,
    pub docker: bool,
    pub layers: Layers,
    pub commands: std::collections::BTreeMap<String, CommandRule>,
    pub effective_cwd: PathBuf,
}

/// The four path layers in fixed precedence order (§4.2 input).
#[derive(Debug, Clone, Default)]
pub struct Layers {
    pub preset: PathLayer,
    pub global: PathLayer,
    pub project: PathLayer,
    pub cli: PathLayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_priority_order() {
        assert!(PathAccess::Exclude.priority() > PathAccess::Ro.priority());
        assert!(PathAccess::Ro.priority() > PathAccess::Rw.priority());
    }

    #[test]
    fn source_priority_order() {
        assert!(PathSource::Cli.priority() > PathSource::Project.priority());
        assert!(PathSource::Project.priority() > PathSource::Global.priority());
        assert!(PathSource::Global.priority() > PathSource::Preset.priority());
    }

    #[test]
    fn depth_counts_separators_past_root() {
        let rp = ResolvedPath {
            original: "/home/u/project".to_string(),
            resolved: PathBuf::from("/home/u/project"),
            access: PathAccess::Ro,
            source: PathSource::Cli,
        };
        assert_eq!(rp.depth(), 3);

        let root = ResolvedPath {
            original: "/".to_string(),
            resolved: PathBuf::from("/"),
            access: PathAccess::Ro,
            source: PathSource::Cli,
        };
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn is_glob_detects_metacharacters() {
        let rp = ResolvedPath {
            original: "~/.config/*".to_string(),
            resolved: PathBuf::from("/home/u/.config/foo"),
            access: PathAccess::Ro,
            source: PathSource::Preset,
        };
        assert!(rp.is_glob());

        let exact = ResolvedPath {
            original: "~/.config/foo".to_string(),
            resolved: PathBuf::from("/home/u/.config/foo"),
            access: PathAccess::Ro,
            source: PathSource::Preset,
        };
        assert!(!exact.is_glob());
    }

    #[test]
    fn command_rule_wire_round_trips() {
        for rule in [
            CommandRule::Raw,
            CommandRule::Block,
            CommandRule::Preset("base".to_string()),
            CommandRule::Script("/opt/wrap.sh".to_string()),
        ] {
            assert_eq!(CommandRule::from_wire(&rule.to_wire()), rule);
        }
    }

    #[test]
    fn command_rule_monotonicity() {
        assert!(CommandRule::Block.is_at_least_as_restrictive_as(&CommandRule::Raw));
        assert!(!CommandRule::Raw.is_at_least_as_restrictive_as(&CommandRule::Block));
        assert!(CommandRule::Raw.is_at_least_as_restrictive_as(&CommandRule::Raw));
        assert!(CommandRule::Block.is_at_least_as_restrictive_as(&CommandRule::Block));
    }
}
