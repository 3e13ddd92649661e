//! Process Supervisor (§4.7, §5): launches `bwrap`, forwards stdio by
//! inheritance, and propagates signals through a two-stage shutdown.
//!
//! The supervisor owns two nested cancellation scopes, `term` nested
//! inside `kill` (§5): the first interrupt cancels `term` (SIGTERM +
//! 10s grace), a second interrupt or grace-window timeout cancels `kill`
//! (SIGKILL). Modeled directly on the `tokio::select!`-based multi-branch
//! wait loop this workspace's terminal/stream manager uses to multiplex
//! child-exit, signal, and timeout events.

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio_util::sync::CancellationToken;

use crate::constants::{exit_codes, timing::GRACE_PERIOD};
use crate::error::{Result, SandboxError};

/// Run `command` to completion, forwarding stdio and handling the
/// two-stage interrupt shutdown. Returns the exit code to propagate to
/// the launcher's own caller (§6.3).
pub async fn supervise(mut command: Command) -> Result<i32> {
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let mut child = command.spawn().map_err(SandboxError::SpawnFailed)?;
    let pid = child.id();

    let kill = CancellationToken::new();
    let term = kill.child_token();

    let mut sigint = unix_signal(SignalKind::interrupt()).map_err(SandboxError::SpawnFailed)?;

    // Stage 0: race the child's natural exit against the first interrupt.
    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(SandboxError::WaitFailed)?;
            return Ok(exit_code_from_status(status));
        }
        _ = sigint.recv() => {
            tracing::info!("interrupted, sending SIGTERM, cleaning up (up to 10s)");
            send_signal(pid, Signal::SIGTERM);
            term.cancel();
        }
    }

    // Stage 1 (post-first-interrupt): race clean reap, grace timeout, and
    // a second interrupt. Any of the three leads to exit code 130.
    tokio::select! {
        status = child.wait() => {
            let _ = status;
            tracing::info!("cleanup complete");
        }
        _ = tokio::time::sleep(GRACE_PERIOD) => {
            tracing::warn!("grace period elapsed, forcing SIGKILL");
            send_signal(pid, Signal::SIGKILL);
            let _ = child.wait().await;
        }
        _ = sigint.recv() => {
            tracing::warn!("second interrupt, forcing SIGKILL");
            send_signal(pid, Signal::SIGKILL);
            let _ = child.wait().await;
        }
    }

    // `kill` cancellation also ends `term` (they are nested per §5); there
    // are no outstanding waiters on either token by this point, so this is
    // bookkeeping for any future collaborator that observes the tokens.
    kill.cancel();

    Ok(exit_codes::INTERRUPTED)
}

fn send_signal(pid: Option<u32>, sig: Signal) {
    if let Some(pid) = pid {
        if let Err(e) = signal::kill(Pid::from_raw(pid as i32), sig) {
            tracing::warn!(error = %e, "failed to send signal to child");
        }
    }
}

/// Map a `std::process::ExitStatus` to the launcher's exit code. A normal
/// exit passes its code through (0-255); a status with no exit code (the
/// child was killed by a signal we did not initiate) maps to the
/// conventional `128 + signal` value.
fn exit_code_from_status(status: std::process::ExitStatus) -> i32 {
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}
