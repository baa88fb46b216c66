use crate::azure::error_catalog;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Stderr words that promote stderr to an error section even on exit code 0.
const STDERR_FAILURE_WORDS: &[&str] = &[
    "error",
    "failed",
    "exception",
    "cannot",
    "unauthorized",
    "forbidden",
    "not found",
];

const SCRIPT_HOSTS: &[&str] = &["pwsh", "powershell"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("{0}")]
    Spawn(#[from] std::io::Error),
    #[error("timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
    #[error("empty command")]
    EmptyCommand,
}

/// Spawns a process and collects its output. The seam every external call
/// goes through, so tests can script command results.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, ExecError>;
}

pub struct TokioProcessExecutor;

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, ExecError> {
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the wait future on timeout kills the child.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ExecError::Timeout(timeout))??;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Result of one command: the rendered text handed to the agent, plus the raw
/// output when the process actually ran to completion.
#[derive(Debug, Clone)]
pub struct Execution {
    pub text: String,
    pub output: Option<ProcessOutput>,
}

#[derive(Clone)]
pub struct CommandRunner {
    executor: Arc<dyn ProcessExecutor>,
    script_host: String,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(
        executor: Arc<dyn ProcessExecutor>,
        script_host: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            executor,
            script_host: script_host.into(),
            timeout,
        }
    }

    pub fn script_host(&self) -> &str {
        &self.script_host
    }

    pub async fn run_raw<S: AsRef<str> + Sync>(
        &self,
        command: &[S],
    ) -> Result<ProcessOutput, ExecError> {
        let Some((program, rest)) = command.split_first() else {
            return Err(ExecError::EmptyCommand);
        };
        let args: Vec<String> = rest.iter().map(|a| a.as_ref().to_string()).collect();

        log::debug!("Running: {} {}", program.as_ref(), args.join(" "));
        let result = self
            .executor
            .execute(program.as_ref(), &args, self.timeout)
            .await;
        match &result {
            Ok(out) => log::debug!("Exit code: {:?}", out.exit_code),
            Err(e) => log::warn!("Command {} failed: {}", program.as_ref(), e),
        }
        result
    }

    pub async fn run_detailed<S: AsRef<str> + Sync>(&self, command: &[S]) -> Execution {
        let result = self.run_raw(command).await;
        let text = render_output(command, &result);
        Execution {
            text,
            output: result.ok(),
        }
    }

    /// Runs a command and returns its output rendered as agent-readable text.
    /// Failures are part of the text; nothing is raised to the caller.
    pub async fn run<S: AsRef<str> + Sync>(&self, command: &[S]) -> String {
        self.run_detailed(command).await.text
    }

    /// Builds `<host> -ExecutionPolicy Bypass -File <script> -Key value ...`,
    /// dropping parameters whose value is empty.
    pub fn script_command(&self, script: &Path, params: &[(&str, String)]) -> Vec<String> {
        let mut command = vec![
            self.script_host.clone(),
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-File".to_string(),
            script.display().to_string(),
        ];
        for (key, value) in params {
            if !value.is_empty() {
                command.push(format!("-{}", key));
                command.push(value.clone());
            }
        }
        command
    }

    pub async fn run_script_detailed(&self, script: &Path, params: &[(&str, String)]) -> Execution {
        let command = self.script_command(script, params);
        self.run_detailed(&command).await
    }

    pub async fn run_script(&self, script: &Path, params: &[(&str, String)]) -> String {
        self.run_script_detailed(script, params).await.text
    }
}

pub fn render_output<S: AsRef<str>>(
    command: &[S],
    result: &Result<ProcessOutput, ExecError>,
) -> String {
    let command_line = command
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(" ");

    let output = match result {
        Ok(output) => output,
        Err(ExecError::Timeout(limit)) => {
            return format!(
                "✗ ERROR: Command timed out after {} seconds\n\nCommand: {}\n\nThis usually indicates a hanging process or very slow operation.",
                limit.as_secs(),
                command_line
            );
        }
        Err(e) => {
            return format!(
                "✗ EXECUTION ERROR:\n\nCommand: {}\n\nError: {}",
                command_line, e
            );
        }
    };

    let failed = !output.success();
    let mut parts = Vec::new();

    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        parts.push(stdout.to_string());
    }

    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        let lowered = stderr.to_lowercase();
        if failed || STDERR_FAILURE_WORDS.iter().any(|w| lowered.contains(w)) {
            let rule = "═".repeat(59);
            parts.push(format!(
                "\n{rule}\n✗ ERROR DETAILS:\n{rule}\n{stderr}",
                rule = rule,
                stderr = stderr
            ));
        } else {
            parts.push(stderr.to_string());
        }
    }

    let combined = format!("{}\n{}", output.stdout, output.stderr);
    if let Some(known) = error_catalog::detect(&combined) {
        parts.push(known.render());
    }

    if failed {
        match output.exit_code {
            Some(code) => parts.push(format!("\n[Exit Code: {}]", code)),
            None => parts.push("\n[Exit Code: terminated by signal]".to_string()),
        }
    }

    if parts.is_empty() {
        "Command completed with no output".to_string()
    } else {
        parts.join("\n")
    }
}

/// Picks the PowerShell host, preferring `pwsh` over Windows PowerShell.
pub fn detect_script_host() -> String {
    SCRIPT_HOSTS
        .iter()
        .find(|host| find_in_path(host).is_some())
        .map(|host| host.to_string())
        .unwrap_or_else(|| {
            log::warn!("Neither pwsh nor powershell found on PATH, defaulting to powershell");
            "powershell".to_string()
        })
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|dir| {
            let candidate = dir.join(program);
            [candidate.with_extension("exe"), candidate]
        })
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(stdout: &str, stderr: &str, code: i32) -> Result<ProcessOutput, ExecError> {
        Ok(ProcessOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: Some(code),
        })
    }

    #[test]
    fn clean_success_is_just_stdout() {
        let text = render_output(&["az", "group", "list"], &out("  [\"rg\"]\n", "", 0));
        assert_eq!(text, "[\"rg\"]");
    }

    #[test]
    fn stderr_with_failure_word_is_tagged_even_on_success() {
        let text = render_output(&["az"], &out("ok", "WARNING: resource not found", 0));
        assert!(text.contains("✗ ERROR DETAILS:"));
        assert!(!text.contains("[Exit Code"));
    }

    #[test]
    fn benign_stderr_is_appended_plain() {
        let text = render_output(&["az"], &out("ok", "WARNING: preview command", 0));
        assert_eq!(text, "ok\nWARNING: preview command");
    }

    #[test]
    fn non_zero_exit_reports_code_and_known_error() {
        let text = render_output(
            &["az"],
            &out("", "ERROR: (QuotaExceeded) limit reached", 1),
        );
        assert!(text.contains("✗ ERROR DETAILS:"));
        assert!(text.contains("QUOTA EXCEEDED"));
        assert!(text.ends_with("[Exit Code: 1]"));
    }

    #[test]
    fn empty_output_has_placeholder() {
        assert_eq!(
            render_output(&["az"], &out("", "  ", 0)),
            "Command completed with no output"
        );
    }

    #[test]
    fn timeout_and_spawn_failures_render_as_text() {
        let timeout = render_output(
            &["pwsh", "-File", "slow.ps1"],
            &Err(ExecError::Timeout(DEFAULT_TIMEOUT)),
        );
        assert!(timeout.contains("timed out after 600 seconds"));
        assert!(timeout.contains("pwsh -File slow.ps1"));

        let spawn = render_output(
            &["missing-binary"],
            &Err(ExecError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No such file or directory",
            ))),
        );
        assert!(spawn.starts_with("✗ EXECUTION ERROR:"));
        assert!(spawn.contains("No such file or directory"));
    }

    #[test]
    fn script_command_skips_empty_parameters() {
        let runner = CommandRunner::new(
            Arc::new(TokioProcessExecutor),
            "pwsh",
            DEFAULT_TIMEOUT,
        );
        let command = runner.script_command(
            Path::new("/opt/scripts/update-tags.ps1"),
            &[
                ("Tags", "env=dev".to_string()),
                ("ResourceType", String::new()),
            ],
        );
        assert_eq!(
            command,
            vec![
                "pwsh",
                "-ExecutionPolicy",
                "Bypass",
                "-File",
                "/opt/scripts/update-tags.ps1",
                "-Tags",
                "env=dev"
            ]
        );
    }

    #[tokio::test]
    async fn runner_passes_program_args_and_timeout_to_executor() {
        let mut executor = MockProcessExecutor::new();
        executor
            .expect_execute()
            .withf(|program, args, timeout| {
                program == "az"
                    && args == ["account", "show"]
                    && *timeout == Duration::from_secs(5)
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(ProcessOutput {
                    stdout: "{}".to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                })
            });

        let runner = CommandRunner::new(Arc::new(executor), "pwsh", Duration::from_secs(5));
        assert_eq!(runner.run(&["az", "account", "show"]).await, "{}");
    }

    #[tokio::test]
    async fn empty_command_never_reaches_the_executor() {
        let executor = MockProcessExecutor::new();
        let runner = CommandRunner::new(Arc::new(executor), "pwsh", DEFAULT_TIMEOUT);
        let empty: [&str; 0] = [];
        assert!(runner.run(&empty).await.contains("empty command"));
    }

    #[tokio::test]
    async fn real_executor_enforces_timeout() {
        if find_in_path("sleep").is_none() {
            return;
        }
        let result = TokioProcessExecutor
            .execute("sleep", &["5".to_string()], Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(ExecError::Timeout(_))));
    }
}
