use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use runm_core::errors::{ErrorInfo, RunmError};

use crate::env::EnvMap;

/// Exit code of a nonzero submission, written only when nonzero.
pub const RETURN_CODE_FILE: &str = "runm_submit_returncode";
/// Captured stdout, written only when nonempty.
pub const STDOUT_FILE: &str = "runm_submit_stdout";
/// Captured stderr, written only when nonempty.
pub const STDERR_FILE: &str = "runm_submit_stderr";

/// Result of one shell invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code; `-signal` when killed by a signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// True for a zero exit code.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

fn shell(command: &str) -> Command {
    #[cfg(unix)]
    {
        let mut shell = Command::new("sh");
        shell.arg("-c").arg(command);
        shell
    }
    #[cfg(not(unix))]
    {
        let mut shell = Command::new("cmd");
        shell.arg("/C").arg(command);
        shell
    }
}

/// Runs `command` through the system shell in `cwd` with exactly `env`.
pub fn run_shell_command(
    command: &str,
    cwd: &Path,
    env: &EnvMap,
) -> Result<CommandOutput, RunmError> {
    let output = shell(command)
        .current_dir(cwd)
        .env_clear()
        .envs(env)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| {
            RunmError::Submission(
                ErrorInfo::new("shell_spawn", err.to_string())
                    .with_context("command", command)
                    .with_context("cwd", cwd.display().to_string()),
            )
        })?;
    Ok(CommandOutput {
        exit_code: exit_code(output.status),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Runs the submit command for one run and records its artifacts in the run
/// directory.
pub fn run_submit_command(
    command: &str,
    run_path: &Path,
    env: &EnvMap,
) -> Result<CommandOutput, RunmError> {
    let output = run_shell_command(command, run_path, env)?;
    if !output.success() {
        let path = run_path.join(RETURN_CODE_FILE);
        fs::write(&path, format!("{}\n", output.exit_code))
            .map_err(|err| RunmError::io("returncode_write", &path, err))?;
    }
    for (name, data) in [(STDOUT_FILE, &output.stdout), (STDERR_FILE, &output.stderr)] {
        if !data.is_empty() {
            let path = run_path.join(name);
            fs::write(&path, data).map_err(|err| RunmError::io("capture_write", &path, err))?;
        }
    }
    Ok(output)
}

/// Removes submission artifacts left by a previous attempt.
pub fn clear_submit_artifacts(run_path: &Path) -> Result<(), RunmError> {
    for name in [RETURN_CODE_FILE, STDOUT_FILE, STDERR_FILE] {
        let path = run_path.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(RunmError::io("artifact_remove", &path, err)),
        }
    }
    Ok(())
}
