use super::runner::CommandExecute;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Privilege-escalation mechanism detected on the host.
///
/// Advisory only: the escalation chain still walks its full fallback list on
/// every privileged action. Detection exists so the operator can be told
/// up front what the host looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Direct,
    Gksu,
    Pkexec,
    Sudo,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Direct => "direct",
            AuthMethod::Gksu => "gksu",
            AuthMethod::Pkexec => "pkexec",
            AuthMethod::Sudo => "sudo",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probes the host once at startup for the best available escalation
/// mechanism. Every check is fail-soft: a probe error counts as
/// "unavailable" and detection moves on.
pub struct AuthMethodDetector {
    script: PathBuf,
    runner: Arc<dyn CommandExecute>,
    probe_timeout: Duration,
}

impl AuthMethodDetector {
    pub fn new(script: PathBuf, runner: Arc<dyn CommandExecute>, probe_timeout: Duration) -> Self {
        Self {
            script,
            runner,
            probe_timeout,
        }
    }

    pub async fn detect(&self) -> AuthMethod {
        if self.script_executable() {
            debug!(script = %self.script.display(), "control script is directly executable");
            return AuthMethod::Direct;
        }

        for (tool, method) in [
            ("gksu", AuthMethod::Gksu),
            ("pkexec", AuthMethod::Pkexec),
            ("sudo", AuthMethod::Sudo),
        ] {
            if self.tool_available(tool).await {
                debug!(tool, "escalation tool available");
                return method;
            }
        }

        // Nothing probed as available; sudo is the least surprising guess.
        AuthMethod::Sudo
    }

    #[cfg(unix)]
    fn script_executable(&self) -> bool {
        use std::os::unix::ffi::OsStrExt;

        let Ok(path) = std::ffi::CString::new(self.script.as_os_str().as_bytes()) else {
            return false;
        };
        unsafe { libc::access(path.as_ptr(), libc::X_OK) == 0 }
    }

    #[cfg(not(unix))]
    fn script_executable(&self) -> bool {
        self.script.exists()
    }

    async fn tool_available(&self, tool: &str) -> bool {
        let argv = vec!["which".to_string(), tool.to_string()];
        self.runner
            .execute(&argv, self.probe_timeout, true)
            .await
            .succeeded
    }
}
