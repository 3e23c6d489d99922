//! External tool execution.

use crate::release::{Error, Result};
use std::{
    ffi::OsStr,
    path::Path,
    process::{Output, Stdio},
};
use tokio::process::Command;

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout followed by stderr, trimmed.
    pub fn diagnostics(&self) -> String {
        join_streams(&self.stdout, &self.stderr)
    }
}

fn join_streams(stdout: &str, stderr: &str) -> String {
    match (stdout.trim(), stderr.trim()) {
        ("", err) => err.to_string(),
        (out, "") => out.to_string(),
        (out, err) => format!("{out}\n{err}"),
    }
}

/// Renders a command line for logs and error messages.
pub fn display_command<I, S>(program: &Path, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Runs `program` with `args` to completion, capturing its output.
///
/// A non-zero exit becomes [`Error::ToolInvocation`] carrying the captured
/// diagnostics; a spawn failure becomes [`Error::CommandFailed`].
pub async fn run_tool<I, S>(program: &Path, args: I, cwd: Option<&Path>) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S> + Clone,
    S: AsRef<OsStr>,
{
    let command_line = display_command(program, args.clone());
    log::debug!("Running: {}", command_line);

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|error| Error::CommandFailed {
        command: command_line.clone(),
        error,
    })?;

    check_output(command_line, output)
}

fn check_output(command: String, output: Output) -> Result<ToolOutput> {
    let captured = ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !output.status.success() {
        return Err(Error::ToolInvocation {
            command,
            status: match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            },
            diagnostics: captured.diagnostics(),
        });
    }

    Ok(captured)
}
