//! `agent-sandbox`: runs a command inside a bubblewrap filesystem sandbox.

mod cli;
mod config;
mod presets;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agent_sandbox_core::error::SandboxError;
use agent_sandbox_core::policy::{CommandRule, Config, Layers, PathLayer};
use agent_sandbox_core::{constants, dryrun, nested, preconditions};
use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    init_logging(cli.debug);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("agent-sandbox: error: {e}");
            std::process::exit(constants::exit_codes::LAUNCHER_ERROR);
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: cli::Cli) -> Result<i32, SandboxError> {
    let (home_dir, bwrap_path) = preconditions::check()?;

    if cli.check {
        if nested::running_nested() {
            println!("inside sandbox");
            return Ok(0);
        } else {
            println!("outside sandbox");
            return Ok(1);
        }
    }

    let work_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

    let global_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config::discover_global_config(&home_dir));
    let explicit = cli.config.is_some();
    let global_raw = config::load_file(&global_path, explicit)?;

    let project_path = config::discover_project_config(&work_dir);
    let project_raw = config::load_file(&project_path, false)?;

    let preset_ctx = presets::PresetContext {
        home_dir: home_dir.to_string_lossy().to_string(),
        work_dir: work_dir.to_string_lossy().to_string(),
    };

    let mut preset_layer = PathLayer::default();
    let preset_names: Vec<String> = global_raw
        .iter()
        .flat_map(|c| c.presets().to_vec())
        .chain(project_raw.iter().flat_map(|c| c.presets().to_vec()))
        .collect();
    for name in &preset_names {
        if let Some(layer) = presets::expand(name, &preset_ctx) {
            preset_layer.ro.extend(layer.ro);
            preset_layer.rw.extend(layer.rw);
            preset_layer.exclude.extend(layer.exclude);
        }
    }

    let global_layer = global_raw.as_ref().map(|c| c.path_layer()).unwrap_or_default();
    let project_layer = project_raw.as_ref().map(|c| c.path_layer()).unwrap_or_default();

    let cli_layer = PathLayer {
        ro: cli.ro.clone(),
        rw: cli.rw.clone(),
        exclude: cli.exclude.clone(),
    };

    let mut commands: BTreeMap<String, CommandRule> = BTreeMap::new();
    if let Some(c) = &global_raw {
        commands.extend(c.command_rules()?);
    }
    if let Some(c) = &project_raw {
        commands.extend(c.command_rules()?);
    }
    for entry in &cli.cmd {
        let (key, rule) = config::parse_cmd_flag(entry)?;
        commands.insert(key, rule);
    }

    // Precedence for scalar overrides: cli > project > global > default.
    let network = cli
        .network_override()
        .or_else(|| project_raw.as_ref().and_then(|c| c.network()))
        .or_else(|| global_raw.as_ref().and_then(|c| c.network()))
        .unwrap_or(true);
    let docker = cli
        .docker_override()
        .or_else(|| project_raw.as_ref().and_then(|c| c.docker()))
        .or_else(|| global_raw.as_ref().and_then(|c| c.docker()))
        .unwrap_or(false);

    let effective_cwd = cli
        .cwd
        .clone()
        .or_else(|| project_raw.as_ref().and_then(|c| c.effective_cwd().map(Path::to_path_buf)))
        .or_else(|| global_raw.as_ref().and_then(|c| c.effective_cwd().map(Path::to_path_buf)))
        .unwrap_or_else(|| work_dir.clone());

    let outer_commands = nested::running_nested()
        .then(outer_commands_from_env)
        .flatten();
    let filter_outcome = nested::filter(&commands, outer_commands.as_ref(), presets::KNOWN_PRESETS)?;
    for blocked in &filter_outcome.relaxation_attempts {
        eprintln!("agent-sandbox: blocked attempt to relax wrapper for {blocked:?}");
    }

    let config = Config {
        network,
        docker,
        layers: Layers {
            preset: preset_layer,
            global: global_layer,
            project: project_layer,
            cli: cli_layer,
        },
        commands: filter_outcome.effective,
        effective_cwd,
    };

    if cli.command.is_empty() {
        return Err(SandboxError::EmptyCommand);
    }

    let plan = agent_sandbox_core::plan(&config, &home_dir, cli.command.clone())?;
    let assembled =
        agent_sandbox_core::assemble(&plan).map_err(SandboxError::SpawnFailed)?;

    // Forward this invocation's effective command rules to any nested
    // invocation through the environment (§4.8, §6.4): the whole
    // environment is inherited unmodified by the child.
    std::env::set_var(constants::envs::OUTER_COMMANDS, encode_outer_commands(&config.commands));

    if cli.dry_run {
        let rendered = dryrun::render(
            &bwrap_path.to_string_lossy(),
            &assembled.args,
            &plan.user_argv,
        );
        println!("{rendered}");
        return Ok(0);
    }

    let command = agent_sandbox_core::build_command(&bwrap_path, &assembled, &plan.user_argv)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to start async runtime");
    runtime.block_on(agent_sandbox_core::supervisor::supervise(command))
}

fn encode_outer_commands(commands: &BTreeMap<String, CommandRule>) -> String {
    let wire: BTreeMap<&str, String> = commands
        .iter()
        .map(|(k, v)| (k.as_str(), v.to_wire()))
        .collect();
    serde_json::to_string(&wire).unwrap_or_default()
}

fn outer_commands_from_env() -> Option<BTreeMap<String, CommandRule>> {
    let raw = std::env::var(constants::envs::OUTER_COMMANDS).ok()?;
    let wire: BTreeMap<String, String> = serde_json::from_str(&raw).ok()?;
    Some(
        wire.into_iter()
            .map(|(k, v)| (k, CommandRule::from_wire(&v)))
            .collect(),
    )
}
