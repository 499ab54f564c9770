use rivalbat_core::Source;
use std::future::Future;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

// Exit statuses `env` and shells use when the command itself never ran.
const NOT_EXECUTABLE: i32 = 126;
const NOT_FOUND: i32 = 127;

/// Interpreter for plain command lines.
pub const SHELL: &str = "/bin/sh";
/// Interpreter that sources the user's profile (`-l`) first.
pub const LOGIN_SHELL: &str = "/bin/bash";

/// One way of obtaining a status line, in resolver priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `rivalcfg` looked up through `PATH`.
    RivalcfgPath,
    /// `rivalcfg` inside a login shell.
    RivalcfgLoginShell,
    /// `rivalcfg` at an absolute location inside an `extra-path` directory.
    RivalcfgExtraPath,
    /// `python -m rivalcfg`.
    PythonModule,
    /// The user script executed directly.
    Script,
    /// The user script handed to a shell as a command line.
    ScriptShell,
}

impl Strategy {
    pub fn source(self) -> Source {
        match self {
            Self::Script | Self::ScriptShell => Source::Script,
            _ => Source::Rivalcfg,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RivalcfgPath       => "rivalcfg-path",
            Self::RivalcfgLoginShell => "rivalcfg-login-shell",
            Self::RivalcfgExtraPath  => "rivalcfg-extra-path",
            Self::PythonModule       => "python-module",
            Self::Script             => "script",
            Self::ScriptShell        => "script-shell",
        }
    }
}

/// A single command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAttempt {
    pub strategy: Strategy,
    /// Program followed by its arguments.  For shell attempts this is
    /// `[shell, flag, command_line]`.
    pub argv: Vec<String>,
    /// Whether `argv` goes through a command interpreter.
    pub uses_shell: bool,
    /// Replacement `PATH` for the child, if any.
    pub path_override: Option<String>,
}

impl CommandAttempt {
    /// Run `argv` as-is.
    pub fn direct<I, S>(strategy: Strategy, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategy,
            argv: argv.into_iter().map(Into::into).collect(),
            uses_shell: false,
            path_override: None,
        }
    }

    /// Run `line` through `shell flag line`.
    pub fn shell(strategy: Strategy, shell: &str, flag: &str, line: impl Into<String>) -> Self {
        Self {
            strategy,
            argv: vec![shell.to_string(), flag.to_string(), line.into()],
            uses_shell: true,
            path_override: None,
        }
    }

    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path_override = path;
        self
    }
}

/// Captured output of one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_succeeded: bool,
}

impl CommandResult {
    /// Trimmed stdout if non-blank, else trimmed stderr if non-blank.
    ///
    /// The exit status is not consulted.
    pub fn output(&self) -> Option<&str> {
        let out = self.stdout.trim();
        if !out.is_empty() {
            return Some(out);
        }
        let err = self.stderr.trim();
        (!err.is_empty()).then_some(err)
    }
}

/// Executes [`CommandAttempt`]s.  Never fails: any problem is an empty result.
pub trait CommandRunner {
    fn run(
        &self,
        attempt: &CommandAttempt,
        timeout: Duration,
    ) -> impl Future<Output = CommandResult> + Send;
}

/// Runs attempts as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, attempt: &CommandAttempt, timeout: Duration) -> CommandResult {
        run_process(attempt, timeout).await
    }
}

/// Spawn `attempt`, wait up to `timeout`, and capture its output.
///
/// Exit status 126 or 127 counts as a spawn failure, so `env` or a shell
/// reporting a missing program yields an empty result.  The child is killed if the timeout elapses or the returned future is
/// dropped before completion.
pub async fn run_process(attempt: &CommandAttempt, timeout: Duration) -> CommandResult {
    let Some((program, args)) = attempt.argv.split_first() else {
        return CommandResult::default();
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(path) = &attempt.path_override {
        cmd.env("PATH", path);
    }

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!(
                strategy = attempt.strategy.as_str(),
                "cannot spawn '{program}': {}",
                classify_spawn_error(&e)
            );
            return CommandResult::default();
        }
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => match output.status.code() {
            // The interpreter's "command not found" message is not tool output.
            Some(code @ (NOT_EXECUTABLE | NOT_FOUND)) => {
                debug!(
                    strategy = attempt.strategy.as_str(),
                    "'{program}' could not launch its command (exit {code})"
                );
                CommandResult::default()
            }
            _ => CommandResult {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_succeeded: output.status.success(),
            },
        },
        Ok(Err(e)) => {
            warn!(strategy = attempt.strategy.as_str(), "waiting on '{program}' failed: {e}");
            CommandResult::default()
        }
        Err(_) => {
            warn!(
                strategy = attempt.strategy.as_str(),
                "'{program}' timed out after {} ms; killed",
                timeout.as_millis()
            );
            CommandResult::default()
        }
    }
}

/// Short description of why a process could not be started.
fn classify_spawn_error(error: &std::io::Error) -> String {
    match error.kind() {
        ErrorKind::NotFound         => "not found".to_string(),
        ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => error.to_string(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn sh(line: &str) -> CommandAttempt {
        CommandAttempt::shell(Strategy::ScriptShell, SHELL, "-c", line)
    }

    #[test]
    fn output_prefers_stdout() {
        let result = CommandResult {
            stdout: "  40 %\n".into(),
            stderr: "warning".into(),
            exit_succeeded: true,
        };
        assert_eq!(result.output(), Some("40 %"));
    }

    #[test]
    fn output_falls_back_to_stderr() {
        let result = CommandResult {
            stdout: " \n".into(),
            stderr: "Battery level: 90%\n".into(),
            exit_succeeded: false,
        };
        assert_eq!(result.output(), Some("Battery level: 90%"));
        assert_eq!(CommandResult::default().output(), None);
    }

    #[test]
    fn strategy_sources() {
        assert_eq!(Strategy::PythonModule.source(), Source::Rivalcfg);
        assert_eq!(Strategy::ScriptShell.source(), Source::Script);
    }

    #[tokio::test]
    async fn captures_both_streams() {
        let result = run_process(&sh("echo out; echo err >&2"), TIMEOUT).await;
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
        assert!(result.exit_succeeded);
    }

    #[tokio::test]
    async fn failing_exit_still_yields_output() {
        let result = run_process(&sh("echo 'Charging 55%' >&2; exit 3"), TIMEOUT).await;
        assert!(!result.exit_succeeded);
        assert_eq!(result.output(), Some("Charging 55%"));
    }

    #[tokio::test]
    async fn missing_binary_is_empty_output() {
        let attempt = CommandAttempt::direct(
            Strategy::RivalcfgExtraPath,
            ["/nonexistent/dir/rivalcfg", "--battery-level"],
        );
        let result = run_process(&attempt, TIMEOUT).await;
        assert_eq!(result, CommandResult::default());
    }

    #[tokio::test]
    async fn command_not_found_through_env_is_empty_output() {
        let attempt = CommandAttempt::direct(
            Strategy::RivalcfgPath,
            ["/usr/bin/env", "rivalbat-no-such-tool", "--battery-level"],
        );
        assert_eq!(run_process(&attempt, TIMEOUT).await, CommandResult::default());
    }

    #[tokio::test]
    async fn command_not_found_in_shell_is_empty_output() {
        let result = run_process(&sh("rivalbat-no-such-tool --battery-level"), TIMEOUT).await;
        assert_eq!(result.output(), None);

        let result = run_process(&sh("echo 'sh: denied' >&2; exit 126"), TIMEOUT).await;
        assert_eq!(result, CommandResult::default());
    }

    #[tokio::test]
    async fn hung_command_is_killed() {
        let started = Instant::now();
        let result = run_process(&sh("sleep 5"), Duration::from_millis(200)).await;
        assert_eq!(result.output(), None);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn path_override_reaches_child() {
        let attempt = sh("echo \"$PATH\"").with_path(Some("/opt/custom/bin:/usr/bin:/bin".into()));
        let result = run_process(&attempt, TIMEOUT).await;
        assert_eq!(result.output(), Some("/opt/custom/bin:/usr/bin:/bin"));
    }

    #[tokio::test]
    async fn empty_argv_is_empty_output() {
        let attempt = CommandAttempt::direct(Strategy::Script, Vec::<String>::new());
        assert_eq!(run_process(&attempt, TIMEOUT).await, CommandResult::default());
    }
}
