//! Multi-component integration tests: policy compilation through bwrap
//! argument assembly and dry-run rendering, without ever spawning `bwrap`
//! itself (covered separately by `supervisor`'s own process-level tests).

use std::collections::BTreeMap;

use agent_sandbox_core::docker::DockerAction;
use agent_sandbox_core::policy::{CommandRule, Config, Layers, PathLayer};
use agent_sandbox_core::selfbin::SelfBinaryMount;
use agent_sandbox_core::{assemble, dryrun, nested, plan};
use tempfile::tempdir;

fn self_binary() -> SelfBinaryMount {
    SelfBinaryMount {
        host_path: std::path::PathBuf::from("/usr/bin/agent-sandbox"),
        sandbox_path: "/run/agent-sandbox",
    }
}

#[test]
fn cli_rw_path_flows_through_to_rendered_dry_run() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("project");
    std::fs::create_dir_all(&project).unwrap();

    let config = Config {
        network: true,
        docker: false,
        layers: Layers {
            preset: PathLayer::default(),
            global: PathLayer::default(),
            project: PathLayer::default(),
            cli: PathLayer {
                ro: vec![],
                rw: vec![project.to_string_lossy().to_string()],
                exclude: vec![],
            },
        },
        commands: BTreeMap::new(),
        effective_cwd: project.clone(),
    };

    let launch = plan(&config, &dir.path().to_path_buf(), vec!["echo".to_string(), "hi".to_string()])
        .unwrap();
    assert_eq!(launch.compiled_paths.len(), 1);

    let assembled = assemble(&launch).unwrap();
    assert!(assembled.args.contains(&"--bind-try".to_string()));

    let rendered = dryrun::render("/usr/bin/bwrap", &assembled.args, &launch.user_argv);
    assert!(rendered.contains("--bind-try"));
    assert!(rendered.contains(&project.to_string_lossy().to_string()));
    assert!(rendered.ends_with("hi"));
}

#[test]
fn excluded_directory_under_cwd_is_rejected_before_assembly() {
    let dir = tempdir().unwrap();
    let excluded = dir.path().join("secret");
    std::fs::create_dir_all(excluded.join("inner")).unwrap();
    let cwd = excluded.join("inner");

    let config = Config {
        network: true,
        docker: false,
        layers: Layers {
            preset: PathLayer::default(),
            global: PathLayer::default(),
            project: PathLayer::default(),
            cli: PathLayer {
                ro: vec![],
                rw: vec![],
                exclude: vec![excluded.to_string_lossy().to_string()],
            },
        },
        commands: BTreeMap::new(),
        effective_cwd: cwd,
    };

    let err = plan(&config, &dir.path().to_path_buf(), vec!["echo".to_string()]).unwrap_err();
    assert_eq!(err.kind(), "WorkDirExcluded");
}

#[test]
fn docker_mask_action_is_reflected_in_assembled_args() {
    let action = DockerAction::Mask {
        dest: std::path::PathBuf::from("/var/run/docker.sock"),
    };
    let assembled = assemble_with_docker(action);
    let args = &assembled.args;
    let pos = args
        .windows(3)
        .position(|w| w[0] == "--ro-bind" && w[1] == "/dev/null")
        .expect("docker socket masked with /dev/null");
    assert_eq!(args[pos + 2], "/var/run/docker.sock");
}

fn assemble_with_docker(action: DockerAction) -> agent_sandbox_core::bwrap::Assembled {
    agent_sandbox_core::bwrap::assemble(
        &[],
        true,
        &action,
        &self_binary(),
        std::path::Path::new("/"),
    )
    .unwrap()
}

#[test]
fn nested_monotonicity_rule_survives_the_wire_round_trip() {
    // Simulates the outer invocation's effective rules crossing the sandbox
    // boundary through the environment-variable channel (§4.8, §6.4): encode
    // as the CLI crate would, decode as a nested invocation would, then run
    // the same filter the core exposes.
    let mut outer = BTreeMap::new();
    outer.insert("rm".to_string(), CommandRule::Block);
    outer.insert("git".to_string(), CommandRule::Raw);

    let wire: BTreeMap<&str, String> =
        outer.iter().map(|(k, v)| (k.as_str(), v.to_wire())).collect();
    let encoded = serde_json::to_string(&wire).unwrap();

    let decoded_wire: BTreeMap<String, String> = serde_json::from_str(&encoded).unwrap();
    let decoded_outer: BTreeMap<String, CommandRule> = decoded_wire
        .into_iter()
        .map(|(k, v)| (k, CommandRule::from_wire(&v)))
        .collect();

    let mut inner = BTreeMap::new();
    inner.insert("rm".to_string(), CommandRule::Raw); // attempted relaxation
    inner.insert("git".to_string(), CommandRule::Block); // legitimate tightening

    let outcome = nested::filter(&inner, Some(&decoded_outer), &[]).unwrap();
    assert_eq!(outcome.effective.get("rm"), Some(&CommandRule::Block));
    assert_eq!(outcome.effective.get("git"), Some(&CommandRule::Block));
    assert_eq!(outcome.relaxation_attempts, vec!["rm".to_string()]);
}
