//! VirtualBox guest-property probe.
//!
//! Shells out to `VBoxManage guestproperty get <vm> <property>`, which prints
//! either `Value: <value>` or `No value set!`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use vela_core::{ProbeError, ProbeReading, PropertyProbe};

/// Default `VBoxManage` program, resolved through `PATH`.
pub const VBOXMANAGE: &str = "VBoxManage";

const VALUE_PREFIX: &str = "Value:";

/// Extracts the value from `VBoxManage guestproperty get` output.
///
/// # Errors
/// Returns [`ProbeError::UnexpectedOutput`] when no `Value:` line is present,
/// which includes `No value set!`.
pub fn parse_guestproperty_output(stdout: &str) -> ProbeReading {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix(VALUE_PREFIX))
        .map(|value| value.trim().to_string())
        .ok_or_else(|| ProbeError::UnexpectedOutput(stdout.trim().to_string()))
}

/// Reads guest properties through the `VBoxManage` CLI.
#[derive(Debug, Clone)]
pub struct VBoxManageProbe {
    program: PathBuf,
}

impl Default for VBoxManageProbe {
    fn default() -> Self {
        Self {
            program: PathBuf::from(VBOXMANAGE),
        }
    }
}

impl VBoxManageProbe {
    /// Probe using `VBoxManage` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `program` instead of `VBoxManage`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Program invoked for each read.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl PropertyProbe for VBoxManageProbe {
    async fn read(&self, resource: &str, property: &str) -> ProbeReading {
        let output = Command::new(&self.program)
            .args(["guestproperty", "get", resource, property])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(
                program = %self.program.display(),
                vm = resource,
                property,
                status = ?output.status,
                "guestproperty get failed"
            );
            return Err(ProbeError::Command {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        parse_guestproperty_output(&String::from_utf8_lossy(&output.stdout))
    }
}
