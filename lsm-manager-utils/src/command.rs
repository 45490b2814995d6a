use std::ffi::OsStr;
use std::io::Seek;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// A thin wrapper around [`Command`] that logs what it runs and captures
/// output only when the command fails, mirroring the pattern used
/// throughout this project's privileged, rare, must-serialize external
/// invocations (compiler, policy store tooling).
#[derive(Debug)]
pub struct Task {
    description: String,
    cmd: Command,
}

impl Task {
    pub fn new(description: impl AsRef<str>, exe: impl AsRef<str>) -> Self {
        let mut cmd = Command::new(exe.as_ref());
        cmd.stdin(Stdio::null());
        Self {
            description: description.as_ref().to_string(),
            cmd,
        }
    }

    pub fn args<S: AsRef<OsStr>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    /// Run the command to completion, capturing stdout/stderr only to
    /// surface them in the error if it fails.
    pub fn run(self) -> Result<()> {
        let description = self.description;
        let mut cmd = self.cmd;
        tracing::debug!("exec: {cmd:?}");
        let tmpf = tempfile::tempfile()?;
        cmd.stdout(Stdio::from(tmpf.try_clone()?));
        cmd.stderr(Stdio::from(tmpf.try_clone()?));
        let st = cmd
            .status()
            .with_context(|| format!("spawning {description}"))?;
        if !st.success() {
            let mut output = tmpf;
            output.seek(std::io::SeekFrom::Start(0))?;
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut output, &mut buf).ok();
            anyhow::bail!("{description} failed: {st:?}\n{buf}");
        }
        Ok(())
    }

    /// Like [`Self::run`], but returns captured stdout instead of discarding
    /// it. Used for enumeration-style commands (e.g. listing loaded policy
    /// modules) rather than fire-and-forget ones.
    pub fn read(self) -> Result<String> {
        let description = self.description;
        let mut cmd = self.cmd;
        tracing::debug!("exec: {cmd:?}");
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let child = cmd
            .spawn()
            .with_context(|| format!("spawning {description}"))?;
        let output = child
            .wait_with_output()
            .with_context(|| format!("running {description}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{description} failed: {:?}\n{stderr}", output.status);
        }
        String::from_utf8(output.stdout).with_context(|| format!("{description} produced non-UTF-8 output"))
    }

    /// Returns `true` if the executable can be located and invoked at all
    /// (used as a connectivity probe, not to run any real work).
    pub fn probe_invocable(exe: &str) -> bool {
        Command::new(exe)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        Task::new("true", "true").run().unwrap();
    }

    #[test]
    fn test_run_failure_reports_output() {
        let err = Task::new("false", "sh")
            .args(["-c", "echo boom >&2; exit 1"])
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_read_captures_stdout() {
        let out = Task::new("echo", "sh")
            .args(["-c", "echo hello"])
            .read()
            .unwrap();
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn test_probe_invocable() {
        assert!(Task::probe_invocable("sh"));
        assert!(!Task::probe_invocable("definitely-not-a-real-binary-xyz"));
    }
}
