//! Command execution on nodes
//!
//! Items never talk to a node directly; they go through a [`CommandRunner`].
//! [`LocalRunner`] runs commands on this machine, [`SshRunner`] through the
//! `ssh` client. Tests substitute a recording runner.

use std::io::Write;
use std::process::{Child, Command, Output, Stdio};

use super::shell::quote;
use crate::error::{BwError, Result};

/// Outcome of a command run on a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

/// Runs shell commands on one node
pub trait CommandRunner {
    /// Name of the node commands are run on
    fn node_name(&self) -> &str;

    /// Run a shell command, optionally feeding `input` to its stdin
    fn execute(&self, command: &str, input: Option<&[u8]>) -> Result<RunResult>;

    /// Run a command that is expected to succeed
    fn run(&self, command: &str) -> Result<RunResult> {
        let result = self.execute(command, None)?;
        if !result.success() {
            return Err(BwError::CommandFailed {
                node: self.node_name().to_string(),
                command: command.to_string(),
                code: result.return_code,
                stderr: result.stderr.trim().to_string(),
            });
        }
        Ok(result)
    }

    /// Run a command whose exit code is inspected by the caller
    fn run_may_fail(&self, command: &str) -> Result<RunResult> {
        self.execute(command, None)
    }

    /// Write `content` to `path` on the node, replacing it atomically
    fn upload(&self, content: &[u8], path: &str) -> Result<()> {
        let temp_path = format!("{path}.bw_upload");
        let result = self.execute(&format!("cat > {}", quote(&temp_path)), Some(content))?;
        if !result.success() {
            return Err(BwError::CommandFailed {
                node: self.node_name().to_string(),
                command: format!("upload {path}"),
                code: result.return_code,
                stderr: result.stderr.trim().to_string(),
            });
        }
        self.run(&format!("mv -f -- {} {}", quote(&temp_path), quote(path)))?;
        Ok(())
    }
}

fn spawn_with_input(mut command: Command, input: Option<&[u8]>) -> std::io::Result<Output> {
    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    communicate(command.spawn()?, input)
}

/// Feed `input` to the child's stdin while collecting its output
///
/// The input is written from a separate thread so a child that produces
/// output before reading all of its input cannot deadlock against us.
pub(crate) fn communicate(mut child: Child, input: Option<&[u8]>) -> std::io::Result<Output> {
    let stdin = child.stdin.take();
    std::thread::scope(|scope| {
        let writer = scope.spawn(move || -> std::io::Result<()> {
            if let (Some(input), Some(mut stdin)) = (input, stdin) {
                match stdin.write_all(input) {
                    // the command may exit without reading its input
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            Ok(())
        });
        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| std::io::Error::other("stdin writer panicked"))??;
        Ok(output)
    })
}

fn to_run_result(output: &Output) -> RunResult {
    RunResult {
        return_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

/// Runs commands through `sh -c` on this machine
#[derive(Debug, Clone)]
pub struct LocalRunner {
    node_name: String,
}

impl LocalRunner {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }
}

impl CommandRunner for LocalRunner {
    fn node_name(&self) -> &str {
        &self.node_name
    }

    fn execute(&self, command: &str, input: Option<&[u8]>) -> Result<RunResult> {
        tracing::debug!(node = %self.node_name, command, "running locally");
        let mut sh = Command::new("sh");
        sh.arg("-c").arg(command);
        let output = spawn_with_input(sh, input)
            .map_err(|e| crate::error::node::transport_failed(&self.node_name, e.to_string()))?;
        Ok(to_run_result(&output))
    }
}

/// Exit code of the ssh client when the connection itself failed
const SSH_CONNECTION_ERROR: i32 = 255;

/// Runs commands over ssh, optionally through sudo
#[derive(Debug, Clone)]
pub struct SshRunner {
    node_name: String,
    hostname: String,
    use_sudo: bool,
}

impl SshRunner {
    pub fn new(node_name: impl Into<String>, hostname: impl Into<String>, use_sudo: bool) -> Self {
        Self {
            node_name: node_name.into(),
            hostname: hostname.into(),
            use_sudo,
        }
    }

    /// Remote command line for `command`
    fn wrap(&self, command: &str) -> String {
        if self.use_sudo {
            format!("sudo sh -c {}", quote(command))
        } else {
            format!("sh -c {}", quote(command))
        }
    }
}

impl CommandRunner for SshRunner {
    fn node_name(&self) -> &str {
        &self.node_name
    }

    fn execute(&self, command: &str, input: Option<&[u8]>) -> Result<RunResult> {
        tracing::debug!(node = %self.node_name, host = %self.hostname, command, "running via ssh");
        let mut ssh = Command::new("ssh");
        ssh.args(["-o", "BatchMode=yes", self.hostname.as_str(), "--"])
            .arg(self.wrap(command));
        let output = spawn_with_input(ssh, input)
            .map_err(|e| crate::error::node::transport_failed(&self.node_name, e.to_string()))?;
        let result = to_run_result(&output);
        if result.return_code == SSH_CONNECTION_ERROR {
            return Err(crate::error::node::transport_failed(
                &self.node_name,
                result.stderr.trim(),
            ));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_local_run_captures_output() {
        let runner = LocalRunner::new("localhost");
        let result = runner.run("echo out; echo err >&2").unwrap();
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(result.success());
    }

    #[test]
    fn test_local_run_failure_is_error() {
        let runner = LocalRunner::new("localhost");
        let err = runner.run("exit 4").unwrap_err();
        assert!(matches!(err, BwError::CommandFailed { code: 4, .. }));
    }

    #[test]
    fn test_local_run_may_fail() {
        let runner = LocalRunner::new("localhost");
        let result = runner.run_may_fail("exit 4").unwrap();
        assert_eq!(result.return_code, 4);
    }

    #[test]
    fn test_local_input() {
        let runner = LocalRunner::new("localhost");
        let result = runner.execute("tr a-z A-Z", Some(b"hello")).unwrap();
        assert_eq!(result.stdout, "HELLO");
    }

    #[test]
    fn test_local_large_input_round_trips() {
        let runner = LocalRunner::new("localhost");
        let input = "x".repeat(2 * 1024 * 1024);
        let result = runner.execute("cat", Some(input.as_bytes())).unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.len(), input.len());
    }

    #[test]
    fn test_local_input_ignored_by_command() {
        let runner = LocalRunner::new("localhost");
        let input = vec![b'x'; 1024 * 1024];
        let result = runner.execute("true", Some(&input)).unwrap();
        assert!(result.success());
    }

    #[test]
    fn test_local_upload() {
        let temp = create_temp_dir();
        let path = temp.path().join("uploaded file");
        let runner = LocalRunner::new("localhost");
        runner
            .upload(b"content\n", &path.display().to_string())
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content\n");
    }

    #[test]
    fn test_ssh_wrap() {
        let runner = SshRunner::new("node1", "10.0.0.1", true);
        assert_eq!(runner.wrap("ls /"), "sudo sh -c 'ls /'");
        let runner = SshRunner::new("node1", "10.0.0.1", false);
        assert_eq!(runner.wrap("true"), "sh -c true");
    }
}
