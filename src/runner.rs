use anyhow::{Context, Result};
use std::process::{Command, ExitStatus, Stdio};

/// Run a command and inherit stdio (shows output in real-time).
///
/// `env` pairs are set on the child only, which is how the Packer
/// debug toggle (PACKER_LOG=1) gets through without touching our own
/// environment.
pub fn run(cmd: &str, args: &[&str], env: &[(&str, &str)]) -> Result<ExitStatus> {
    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    for (key, value) in env {
        command.env(key, value);
    }
    command
        .status()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))
}

/// Check if a command can be spawned.
pub fn command_exists(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}
