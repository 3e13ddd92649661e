//! Core library: policy compilation and process supervision for a launcher
//! that runs a command inside a `bwrap` sandbox.
//!
//! This crate implements THE CORE only (path resolution, policy
//! compilation, docker-socket policy, self-binary mounting, bwrap argument
//! assembly, preconditions, process supervision, the nested-sandbox
//! filter, and dry-run rendering). Config-file loading, CLI flag parsing,
//! and preset-table expansion are boundary concerns owned by the
//! `agent-sandbox-cli` binary crate.

pub mod bwrap;
pub mod constants;
pub mod docker;
pub mod dryrun;
pub mod error;
pub mod nested;
pub mod path_resolver;
pub mod policy;
pub mod preconditions;
pub mod selfbin;
pub mod supervisor;

use std::path::PathBuf;

use error::{Result, SandboxError};
use policy::{Config, ResolvedPath};

/// Everything needed to run one invocation, after CLI/config boundary
/// parsing has produced a `Config` and expanded path layers.
pub struct LaunchPlan {
    pub compiled_paths: Vec<ResolvedPath>,
    pub docker_action: docker::DockerAction,
    pub self_binary: selfbin::SelfBinaryMount,
    pub network_enabled: bool,
    pub effective_cwd: PathBuf,
    pub user_argv: Vec<String>,
}

/// Run the policy compilation pipeline (§4.1-§4.4) producing everything
/// the bwrap argument builder needs. Does not touch `bwrap` or spawn
/// anything.
pub fn plan(config: &Config, home_dir: &PathBuf, user_argv: Vec<String>) -> Result<LaunchPlan> {
    let work_dir = config.effective_cwd.clone();
    let compiled_paths =
        policy::compile(&config.layers, home_dir, &work_dir, &config.effective_cwd)?;
    let docker_action = docker::decide(config.docker)?;
    let self_binary = selfbin::locate()?;

    Ok(LaunchPlan {
        compiled_paths,
        docker_action,
        self_binary,
        network_enabled: config.network,
        effective_cwd: config.effective_cwd.clone(),
        user_argv,
    })
}

/// Assemble the bwrap argument vector for a `LaunchPlan` (§4.5).
pub fn assemble(plan: &LaunchPlan) -> std::io::Result<bwrap::Assembled> {
    bwrap::assemble(
        &plan.compiled_paths,
        plan.network_enabled,
        &plan.docker_action,
        &plan.self_binary,
        &plan.effective_cwd,
    )
}

/// Build the `tokio::process::Command` that the supervisor will run:
/// `bwrap <assembled args> -- <user argv>`.
pub fn build_command(
    bwrap_path: &std::path::Path,
    assembled: &bwrap::Assembled,
    user_argv: &[String],
) -> Result<tokio::process::Command> {
    let (program, rest) = user_argv
        .split_first()
        .ok_or(SandboxError::EmptyCommand)?;
    let mut cmd = tokio::process::Command::new(bwrap_path);
    cmd.args(&assembled.args);
    cmd.arg("--");
    cmd.arg(program);
    cmd.args(rest);
    Ok(cmd)
}
