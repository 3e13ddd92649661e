//! CLI flag surface (§6.2). Flag parsing, help/version formatting are
//! explicitly out of the core's scope (§1); this module owns them.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "agent-sandbox",
    about = "Run a command inside a bubblewrap filesystem sandbox",
    version,
    trailing_var_arg = true
)]
pub struct Cli {
    /// Override the effective working directory for the sandboxed child.
    #[arg(short = 'C', long = "cwd", value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Explicit config file path. Missing-when-explicit is fatal;
    /// missing-when-implicit is silent.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable the shared network namespace (default: on).
    #[arg(long = "network", action = clap::ArgAction::SetTrue)]
    pub network: bool,

    /// Disable the shared network namespace.
    #[arg(long = "no-network", action = clap::ArgAction::SetTrue, conflicts_with = "network")]
    pub no_network: bool,

    /// Bind-mount the host's Docker socket into the sandbox.
    #[arg(long = "docker", action = clap::ArgAction::SetTrue)]
    pub docker: bool,

    /// Explicitly keep the Docker socket masked (default).
    #[arg(long = "no-docker", action = clap::ArgAction::SetTrue, conflicts_with = "docker")]
    pub no_docker: bool,

    /// Additional read-only path, repeatable.
    #[arg(long = "ro", value_name = "PATH")]
    pub ro: Vec<String>,

    /// Additional read-write path, repeatable.
    #[arg(long = "rw", value_name = "PATH")]
    pub rw: Vec<String>,

    /// Additional excluded path, repeatable.
    #[arg(long = "exclude", value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Per-command wrapper rule(s), `KEY=VALUE`, comma-separated groups
    /// allowed (`--cmd git=true,rm=false`).
    #[arg(long = "cmd", value_name = "KEY=VALUE", value_delimiter = ',')]
    pub cmd: Vec<String>,

    /// Print the assembled command instead of running it.
    #[arg(long = "dry-run", action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Enable debug-level logging.
    #[arg(long = "debug", action = clap::ArgAction::SetTrue)]
    pub debug: bool,

    /// Print whether this process is running inside one of this
    /// launcher's sandboxes and exit.
    #[arg(long = "check", action = clap::ArgAction::SetTrue)]
    pub check: bool,

    /// The user command and its arguments, uninterpreted.
    #[arg(value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    pub fn network_override(&self) -> Option<bool> {
        if self.network {
            Some(true)
        } else if self.no_network {
            Some(false)
        } else {
            None
        }
    }

    pub fn docker_override(&self) -> Option<bool> {
        if self.docker {
            Some(true)
        } else if self.no_docker {
            Some(false)
        } else {
            None
        }
    }
}
