//! Bwrap Argument Builder (§4.5): emits the `bwrap` argument vector in the
//! strict category order required for correct overlay semantics.
//!
//! The builder itself (`BwrapCommand`) is a non-consuming `&mut self`
//! fluent builder, the same shape the sandboxing layer of this workspace's
//! ancestor used for its own `bwrap` invocations.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;

use crate::docker::DockerAction;
use crate::policy::{PathAccess, ResolvedPath};
use crate::selfbin::SelfBinaryMount;

/// Builder for constructing bwrap command arguments.
#[derive(Debug, Default)]
pub struct BwrapCommand {
    args: Vec<String>,
}

impl BwrapCommand {
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    pub fn with_die_with_parent(&mut self) -> &mut Self {
        self.args.push("--die-with-parent".to_string());
        self
    }

    pub fn with_unshare_all(&mut self) -> &mut Self {
        self.args.push("--unshare-all".to_string());
        self
    }

    pub fn with_share_net(&mut self) -> &mut Self {
        self.args.push("--share-net".to_string());
        self
    }

    pub fn with_dev(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.args.push("--dev".to_string());
        self.args.push(path.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn with_proc(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.args.push("--proc".to_string());
        self.args.push(path.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn ro_bind(&mut self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> &mut Self {
        self.args.push("--ro-bind".to_string());
        self.args.push(src.as_ref().to_string_lossy().to_string());
        self.args.push(dest.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn ro_bind_try(&mut self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> &mut Self {
        self.args.push("--ro-bind-try".to_string());
        self.args.push(src.as_ref().to_string_lossy().to_string());
        self.args.push(dest.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn bind_try(&mut self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> &mut Self {
        self.args.push("--bind-try".to_string());
        self.args.push(src.as_ref().to_string_lossy().to_string());
        self.args.push(dest.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn bind(&mut self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> &mut Self {
        self.args.push("--bind".to_string());
        self.args.push(src.as_ref().to_string_lossy().to_string());
        self.args.push(dest.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn tmpfs(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.args.push("--tmpfs".to_string());
        self.args.push(path.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn chdir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.args.push("--chdir".to_string());
        self.args.push(path.as_ref().to_string_lossy().to_string());
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Build a `std::process::Command` invoking `bwrap_path` with the
    /// accumulated arguments, `--`, then the user's executable and args.
    pub fn build(&self, bwrap_path: &Path, executable: &str, user_args: &[String]) -> Command {
        let mut cmd = Command::new(bwrap_path);
        cmd.args(&self.args);
        cmd.arg("--");
        cmd.arg(executable);
        cmd.args(user_args);
        cmd
    }
}

/// A scoped empty, mode-000 temp file used to mask an excluded file (§4.5
/// step 8, §9 open question). Kept alive for the process lifetime; dropped
/// (and thus deleted) once the child has exited, per the cleanup contract
/// in §4.7.
pub struct ExcludeFileGuard(#[allow(dead_code)] NamedTempFile);

fn make_exclude_file_guard() -> std::io::Result<ExcludeFileGuard> {
    use std::os::unix::fs::PermissionsExt;
    let file = NamedTempFile::new()?;
    let mut perms = file.as_file().metadata()?.permissions();
    perms.set_mode(0o000);
    file.as_file().set_permissions(perms)?;
    Ok(ExcludeFileGuard(file))
}

/// The fully assembled argument vector plus any scoped resources (mode-000
/// masker files) that must outlive the spawned child.
pub struct Assembled {
    pub args: Vec<String>,
    pub guards: Vec<ExcludeFileGuard>,
}

/// Assemble the full bwrap argument vector per the §4.5 category order.
pub fn assemble(
    compiled: &[ResolvedPath],
    network_enabled: bool,
    docker_action: &DockerAction,
    self_binary: &SelfBinaryMount,
    effective_cwd: &Path,
) -> std::io::Result<Assembled> {
    let mut bwrap = BwrapCommand::new();
    let mut guards = Vec::new();

    // 1. Process lifecycle.
    bwrap.with_die_with_parent().with_unshare_all();

    // 2. Network.
    if network_enabled {
        bwrap.with_share_net();
    }

    // 3. Virtual filesystems.
    bwrap.with_dev("/dev").with_proc("/proc");

    // 4. Root bind.
    bwrap.ro_bind("/", "/");

    // 5. Tmpfs for /run.
    bwrap.tmpfs("/run");

    // 6. Docker socket.
    match docker_action {
        DockerAction::Skip => {}
        DockerAction::Bind { real, dest } => {
            bwrap.bind(real, dest);
        }
        DockerAction::Mask { dest } => {
            bwrap.ro_bind("/dev/null", dest);
        }
    }

    // 7. Self-binary.
    bwrap.ro_bind(&self_binary.host_path, self_binary.sandbox_path);

    // 8. Per-path mounts, in the already-sorted order from the compiler.
    for entry in compiled {
        match entry.access {
            PathAccess::Ro => {
                bwrap.ro_bind_try(&entry.resolved, &entry.resolved);
            }
            PathAccess::Rw => {
                bwrap.bind_try(&entry.resolved, &entry.resolved);
            }
            PathAccess::Exclude => {
                if is_directory(&entry.resolved) {
                    bwrap.tmpfs(&entry.resolved);
                } else {
                    let guard = make_exclude_file_guard()?;
                    bwrap.ro_bind(guard.0.path(), &entry.resolved);
                    guards.push(guard);
                }
            }
        }
    }

    // 9. Working directory.
    bwrap.chdir(effective_cwd);

    Ok(Assembled {
        args: bwrap.get_args().to_vec(),
        guards,
    })
}

fn is_directory(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Locate `bwrap` on `PATH`. Returns `None` if not found.
pub fn find_bwrap() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let candidate = dir.join("bwrap");
        if candidate.is_file() {
            Some(candidate)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PathSource;

    #[test]
    fn category_order_is_strict() {
        let self_binary = SelfBinaryMount {
            host_path: PathBuf::from("/usr/bin/agent-sandbox"),
            sandbox_path: "/run/agent-sandbox",
        };
        let assembled = assemble(
            &[],
            true,
            &DockerAction::Skip,
            &self_binary,
            Path::new("/"),
        )
        .unwrap();
        let args = assembled.args;

        let idx = |needle: &str| args.iter().position(|a| a == needle);

        let root_bind_positions: Vec<usize> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "--ro-bind")
            .map(|(i, _)| i)
            .collect();
        // First --ro-bind pair is "/ /" for the root bind.
        let first_ro_bind = root_bind_positions[0];
        assert_eq!(args[first_ro_bind + 1], "/");
        assert_eq!(args[first_ro_bind + 2], "/");

        let tmpfs_run = idx("--tmpfs").expect("tmpfs present");
        assert_eq!(args[tmpfs_run + 1], "/run");
        assert!(tmpfs_run > first_ro_bind, "tmpfs /run must come after root bind");

        let chdir = idx("--chdir").expect("chdir present");
        assert_eq!(chdir, args.len() - 2, "--chdir must be the last policy token pair");
    }

    #[test]
    fn network_true_emits_share_net() {
        let self_binary = SelfBinaryMount {
            host_path: PathBuf::from("/usr/bin/agent-sandbox"),
            sandbox_path: "/run/agent-sandbox",
        };
        let assembled =
            assemble(&[], true, &DockerAction::Skip, &self_binary, Path::new("/")).unwrap();
        assert!(assembled.args.contains(&"--share-net".to_string()));

        let assembled_off =
            assemble(&[], false, &DockerAction::Skip, &self_binary, Path::new("/")).unwrap();
        assert!(!assembled_off.args.contains(&"--share-net".to_string()));
    }

    #[test]
    fn ro_and_rw_paths_use_try_variants() {
        let self_binary = SelfBinaryMount {
            host_path: PathBuf::from("/usr/bin/agent-sandbox"),
            sandbox_path: "/run/agent-sandbox",
        };
        let compiled = vec![
            ResolvedPath {
                original: "/home".to_string(),
                resolved: PathBuf::from("/home"),
                access: PathAccess::Ro,
                source: PathSource::Preset,
            },
            ResolvedPath {
                original: "/home/u/project".to_string(),
                resolved: PathBuf::from("/home/u/project"),
                access: PathAccess::Rw,
                source: PathSource::Cli,
            },
        ];
        let assembled = assemble(
            &compiled,
            true,
            &DockerAction::Skip,
            &self_binary,
            Path::new("/"),
        )
        .unwrap();
        assert!(assembled.args.contains(&"--ro-bind-try".to_string()));
        assert!(assembled.args.contains(&"--bind-try".to_string()));
    }

    #[test]
    fn docker_mask_emits_dev_null_ro_bind() {
        let self_binary = SelfBinaryMount {
            host_path: PathBuf::from("/usr/bin/agent-sandbox"),
            sandbox_path: "/run/agent-sandbox",
        };
        let action = DockerAction::Mask {
            dest: PathBuf::from("/var/run/docker.sock"),
        };
        let assembled =
            assemble(&[], true, &action, &self_binary, Path::new("/")).unwrap();
        let args = &assembled.args;
        let pos = args
            .windows(3)
            .position(|w| w[0] == "--ro-bind" && w[1] == "/dev/null")
            .expect("dev/null mask present");
        assert_eq!(args[pos + 2], "/var/run/docker.sock");
    }

    #[test]
    fn non_consuming_builder_can_be_reused() {
        let mut bwrap = BwrapCommand::new();
        bwrap.with_die_with_parent();
        bwrap.with_unshare_all();
        bwrap.ro_bind("/", "/");
        let args = bwrap.get_args();
        assert!(args.contains(&"--die-with-parent".to_string()));
        assert!(args.contains(&"--unshare-all".to_string()));
    }
}
