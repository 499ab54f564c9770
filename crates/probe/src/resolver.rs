use crate::command::{CommandAttempt, CommandRunner, Strategy, LOGIN_SHELL, SHELL};
use rivalbat_core::ResolveConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// Executable name looked up in `PATH` and in `extra-path` directories.
pub const RIVALCFG: &str = "rivalcfg";
/// Argument that makes `rivalcfg` print the battery level and exit.
pub const BATTERY_LEVEL_ARG: &str = "--battery-level";

/// Outcome of walking the attempt plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// First non-blank output, already trimmed.
    Found { text: String, strategy: Strategy },
    /// Every attempt produced blank output.
    Unavailable,
}

/// Ordered list of attempts for `config`.
///
/// Directory checks for `extra-path` happen here, so the plan only contains
/// absolute `rivalcfg` executables that existed when it was built.  This
/// touches the filesystem; async callers go through [`resolve`].
pub fn plan(config: &ResolveConfig) -> Vec<CommandAttempt> {
    let path = augmented_path(&config.extra_path_dirs);
    let rivalcfg_line = format!("{RIVALCFG} {BATTERY_LEVEL_ARG}");
    let mut attempts = Vec::new();

    attempts.push(
        CommandAttempt::direct(
            Strategy::RivalcfgPath,
            ["/usr/bin/env", RIVALCFG, BATTERY_LEVEL_ARG],
        )
        .with_path(path.clone()),
    );

    attempts.push(
        CommandAttempt::shell(Strategy::RivalcfgLoginShell, LOGIN_SHELL, "-lc", rivalcfg_line)
            .with_path(path.clone()),
    );

    for dir in &config.extra_path_dirs {
        let candidate = Path::new(dir).join(RIVALCFG);
        if is_executable(&candidate) {
            attempts.push(CommandAttempt::direct(
                Strategy::RivalcfgExtraPath,
                [candidate.to_string_lossy().into_owned(), BATTERY_LEVEL_ARG.to_string()],
            ));
        }
    }

    attempts.push(
        CommandAttempt::shell(
            Strategy::PythonModule,
            LOGIN_SHELL,
            "-lc",
            // A missing module must stay silent, not print an ImportError.
            format!(
                "python -c 'import {RIVALCFG}' 2>/dev/null && python -m {RIVALCFG} {BATTERY_LEVEL_ARG}"
            ),
        )
        .with_path(path.clone()),
    );

    if let Some(script) = config.script_path.as_deref().map(str::trim) {
        if !script.is_empty() {
            if looks_like_path(script) {
                attempts.push(
                    CommandAttempt::direct(Strategy::Script, [expand_home(script)])
                        .with_path(path.clone()),
                );
            }
            attempts.push(
                CommandAttempt::shell(Strategy::ScriptShell, SHELL, "-c", script)
                    .with_path(path),
            );
        }
    }

    attempts
}

/// Walk [`plan`] and return the first non-blank output.
pub async fn resolve<R: CommandRunner>(runner: &R, config: &ResolveConfig) -> Resolution {
    let attempts = {
        let config = config.clone();
        match tokio::task::spawn_blocking(move || plan(&config)).await {
            Ok(attempts) => attempts,
            Err(e) => {
                warn!("Building the command plan failed: {e}");
                return Resolution::Unavailable;
            }
        }
    };

    for attempt in attempts {
        debug!(
            strategy = attempt.strategy.as_str(),
            argv = ?attempt.argv,
            "Trying battery command"
        );

        let result = runner.run(&attempt, config.command_timeout).await;
        if let Some(text) = result.output() {
            info!(
                strategy = attempt.strategy.as_str(),
                exit_ok = result.exit_succeeded,
                "Battery command output: {text}"
            );
            return Resolution::Found {
                text: text.to_string(),
                strategy: attempt.strategy,
            };
        }
    }

    debug!("All battery commands produced no output");
    Resolution::Unavailable
}

/// Ask a shell where `rivalcfg` lives, using the same `PATH` as [`plan`].
pub async fn locate_rivalcfg<R: CommandRunner>(runner: &R, config: &ResolveConfig) -> Option<String> {
    let attempt = CommandAttempt::shell(
        Strategy::RivalcfgPath,
        SHELL,
        "-c",
        format!("command -v {RIVALCFG} 2>/dev/null || true"),
    )
    .with_path(augmented_path(&config.extra_path_dirs));

    let result = runner.run(&attempt, config.command_timeout).await;
    let found = result.stdout.trim();
    (!found.is_empty()).then(|| found.to_string())
}

/// `extra` joined with `:` in front of the current `PATH`; `None` if `extra`
/// is empty.
pub fn augmented_path(extra: &[String]) -> Option<String> {
    if extra.is_empty() {
        return None;
    }
    let mut path = extra.join(":");
    if let Ok(current) = std::env::var("PATH") {
        if !current.is_empty() {
            path.push(':');
            path.push_str(&current);
        }
    }
    Some(path)
}

/// A regular file with at least one execute bit set.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// `~/x`, `./x` or `/x` with no whitespace anywhere.
fn looks_like_path(s: &str) -> bool {
    (s.starts_with("~/") || s.starts_with("./") || s.starts_with('/'))
        && !s.chars().any(char::is_whitespace)
}

fn expand_home(s: &str) -> String {
    match (s.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{rest}", home.trim_end_matches('/')),
        _ => s.to_string(),
    }
}
