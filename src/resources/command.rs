//! ST-012: `Local::Command` — run a script locally, expose its output.

use crate::core::error::{ErrorKind, Result, StackError};
use crate::core::resource::{Properties, Resource};
use crate::core::value::Value;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Output from running a script.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Execute a script via `bash`, feeding it on stdin.
///
/// The script is written from a separate thread while stdout and stderr are
/// drained, so neither side can fill its pipe and stall the other.
pub fn exec_local(script: &str) -> io::Result<ExecOutput> {
    let mut child = Command::new("bash")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let writer = child.stdin.take().map(|mut stdin| {
        let script = script.to_owned();
        thread::spawn(move || match stdin.write_all(script.as_bytes()) {
            // bash may exit before reading the rest of the script
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        })
    });

    let output = child.wait_with_output()?;
    if let Some(writer) = writer {
        writer
            .join()
            .map_err(|_| io::Error::other("stdin writer panicked"))??;
    }
    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Runs `Command` once at creation. Exposes trimmed stdout.
#[derive(Debug, Default)]
pub struct CommandResource {
    properties: Properties,
    stdout: String,
}

impl Resource for CommandResource {
    fn set_properties(&mut self, properties: Properties) {
        self.properties = properties;
    }

    fn create(&mut self) -> Result<()> {
        let script = self.properties.require::<String>("Command")?;
        let out = exec_local(&script).map_err(|e| {
            StackError::new(ErrorKind::CreateFailed, format!("failed to run bash: {}", e))
        })?;
        debug!(exit_code = out.exit_code, "command finished");
        if !out.success() {
            return Err(StackError::new(
                ErrorKind::CreateFailed,
                format!(
                    "command exited with {}: {}",
                    out.exit_code,
                    out.stderr.trim()
                ),
            ));
        }
        self.stdout = out.stdout.trim().to_string();
        Ok(())
    }

    fn get(&self) -> Value {
        Value::from(self.stdout.clone())
    }
}
