//! Centralized constants: fixed paths, env var names, timeouts.

/// In-sandbox paths that are guaranteed to exist at child start (§6.5).
pub mod paths {
    /// Where the launcher's own executable is re-exposed inside the sandbox
    /// (§4.4). Lives under `/run` because `/run` is tmpfs: a writable mount
    /// point where a new file can appear after `/` is bound read-only.
    pub const SELF_BINARY: &str = "/run/agent-sandbox";

    /// Conventional Docker daemon socket path (§4.3).
    pub const DOCKER_SOCKET: &str = "/var/run/docker.sock";

    pub const RUN: &str = "/run";
    pub const DEV: &str = "/dev";
    pub const PROC: &str = "/proc";
    pub const ROOT: &str = "/";
}

/// Environment variable names consulted by the launcher (§6.4).
pub mod envs {
    pub const HOME: &str = "HOME";
    pub const XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";
    pub const TMPDIR: &str = "TMPDIR";
    pub const PATH: &str = "PATH";

    /// Carries the outer invocation's effective command-wrapper rules
    /// (JSON-encoded `{name: wire_value}`) across the sandbox boundary so a
    /// nested invocation can enforce the monotonicity rule (§4.8). Set by
    /// the launcher itself before spawning; reaches the child because the
    /// whole environment is forwarded unmodified (§6.4).
    pub const OUTER_COMMANDS: &str = "AGENT_SANDBOX_OUTER_COMMANDS";
}

/// Shutdown timing (§4.7, §5).
pub mod timing {
    use std::time::Duration;

    /// Grace window between SIGTERM and SIGKILL escalation.
    pub const GRACE_PERIOD: Duration = Duration::from_secs(10);
}

/// Exit codes (§6.3).
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const LAUNCHER_ERROR: i32 = 1;
    pub const INTERRUPTED: i32 = 130;
}
