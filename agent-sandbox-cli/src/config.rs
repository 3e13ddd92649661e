//! Config file loading, JSON-with-comments parsing, and four-layer merge.
//!
//! Explicitly out of the core's scope (§1): the core only ever consumes an
//! already-merged `agent_sandbox_core::policy::Config`. This module is the
//! boundary collaborator that produces one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agent_sandbox_core::error::{Result, SandboxError};
use agent_sandbox_core::policy::{CommandRule, PathLayer};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFilesystem {
    presets: Vec<String>,
    ro: Vec<String>,
    rw: Vec<String>,
    exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    network: Option<bool>,
    docker: Option<bool>,
    filesystem: RawFilesystem,
    commands: BTreeMap<String, serde_json::Value>,
    effective_cwd: Option<PathBuf>,
}

impl RawConfig {
    pub fn presets(&self) -> &[String] {
        &self.filesystem.presets
    }

    pub fn path_layer(&self) -> PathLayer {
        PathLayer {
            ro: self.filesystem.ro.clone(),
            rw: self.filesystem.rw.clone(),
            exclude: self.filesystem.exclude.clone(),
        }
    }

    pub fn command_rules(&self) -> Result<BTreeMap<String, CommandRule>> {
        self.commands
            .iter()
            .map(|(k, v)| Ok((k.clone(), command_rule_from_value(v)?)))
            .collect()
    }

    pub fn network(&self) -> Option<bool> {
        self.network
    }

    pub fn docker(&self) -> Option<bool> {
        self.docker
    }

    pub fn effective_cwd(&self) -> Option<&Path> {
        self.effective_cwd.as_deref()
    }
}

/// Strip `//` line comments and `/* */` block comments from a JSONC
/// document without disturbing comment-like sequences inside string
/// literals.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    let mut in_string = false;

    while let Some((_, c)) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some((_, next)) = chars.next() {
                    out.push(next);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                chars.next();
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn command_rule_from_value(value: &serde_json::Value) -> Result<CommandRule> {
    match value {
        serde_json::Value::Bool(true) => Ok(CommandRule::Raw),
        serde_json::Value::Bool(false) => Ok(CommandRule::Block),
        serde_json::Value::String(s) if s.starts_with('@') => {
            Ok(CommandRule::Preset(s.trim_start_matches('@').to_string()))
        }
        serde_json::Value::String(s) => Ok(CommandRule::Script(s.clone())),
        other => Err(SandboxError::InvalidCmdFlag(other.to_string())),
    }
}

/// Parse a single `--cmd KEY=VALUE` entry (§6.2). `"true"` -> raw,
/// `"false"` -> block, leading `@` -> preset, anything else -> script path.
pub fn parse_cmd_flag(entry: &str) -> Result<(String, CommandRule)> {
    let (key, value) = entry
        .split_once('=')
        .ok_or_else(|| SandboxError::InvalidCmdFlag(entry.to_string()))?;
    if key.is_empty() {
        return Err(SandboxError::InvalidCmdFlag(entry.to_string()));
    }
    let rule = match value {
        "true" => CommandRule::Raw,
        "false" => CommandRule::Block,
        v if v.starts_with('@') => CommandRule::Preset(v.trim_start_matches('@').to_string()),
        v => CommandRule::Script(v.to_string()),
    };
    Ok((key.to_string(), rule))
}

/// Load and parse a config file at `path`. `explicit` distinguishes a
/// `--config` flag (missing file is fatal) from implicit discovery
/// (missing file is silently absent).
pub fn load_file(path: &Path, explicit: bool) -> Result<Option<RawConfig>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if explicit {
                return Err(SandboxError::MissingExplicitConfig(path.to_path_buf()));
            }
            return Ok(None);
        }
        Err(_) => {
            if explicit {
                return Err(SandboxError::MissingExplicitConfig(path.to_path_buf()));
            }
            return Ok(None);
        }
    };
    let stripped = strip_jsonc_comments(&raw);
    let parsed: RawConfig = serde_json::from_str(&stripped).map_err(|source| {
        SandboxError::ParseConfig {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(Some(parsed))
}

/// Locate the global config file via `XDG_CONFIG_HOME`, falling back to
/// `$HOME/.config` (§6.4).
pub fn discover_global_config(home_dir: &Path) -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir.join(".config"));
    base.join("agent-sandbox").join("config.jsonc")
}

/// Locate the project-local config file under the working directory.
pub fn discover_project_config(work_dir: &Path) -> PathBuf {
    work_dir.join(".agent-sandbox.jsonc")
}
