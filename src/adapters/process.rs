//! Process-level adapters: the host shutdown command and `daemon(3)`.

use std::process::Command;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::ShutdownAction;

/// Runs an external command to power the host down.
///
/// The child is spawned and left running; it is never waited on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandShutdown {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CommandShutdown {
    fn default() -> Self {
        Self {
            program: "shutdown".into(),
            args: vec!["-h".into(), "now".into()],
        }
    }
}

impl CommandShutdown {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ShutdownAction for CommandShutdown {
    fn trigger(&mut self) {
        match Command::new(&self.program).args(&self.args).spawn() {
            Ok(child) => info!("shutdown: started `{}` (pid {})", self.command_line(), child.id()),
            Err(e) => error!("shutdown: could not start `{}`: {e}", self.command_line()),
        }
    }
}

/// Detach from the controlling terminal, chdir to `/` and point the
/// standard streams at `/dev/null`.
pub fn daemonize() -> std::io::Result<()> {
    // SAFETY: daemon(3) only forks and redirects descriptors; the process is
    // still single-threaded at this point.
    let rc = unsafe { libc::daemon(0, 0) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}
