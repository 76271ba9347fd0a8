use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;

/// Runs a command and returns its stdout.
///
/// Non-zero exit and timeouts are errors; stderr is folded into the message.
pub async fn run_cmd_capture(program: &str, args: &[&str], limit: Duration) -> anyhow::Result<String> {
    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let out = tokio::time::timeout(limit, child)
        .await
        .with_context(|| format!("{program} timed out after {}ms", limit.as_millis()))?
        .with_context(|| format!("failed to spawn {program}"))?;

    if !out.status.success() {
        anyhow::bail!(
            "command failed: {} {:?}: {}",
            program,
            args,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}
