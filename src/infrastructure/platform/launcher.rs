#[cfg(test)]
#[path = "launcher_test.rs"]
mod tests;

use std::io;
use std::process::Stdio;

use tokio::process::Command;

use crate::domain::models::Launcher;
use crate::domain::models::PlatformError;

/// Hands URLs and deep links (`tel:`, `sms:`, `spotify://`) to the OS
/// opener.
pub struct SystemLauncher {
    program: String,
    args: Vec<String>,
}

impl Default for SystemLauncher {
    fn default() -> SystemLauncher {
        #[cfg(target_os = "macos")]
        return SystemLauncher::new("open", vec![]);

        #[cfg(target_os = "windows")]
        return SystemLauncher::new("cmd", vec!["/C", "start", ""]);

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        return SystemLauncher::new("xdg-open", vec![]);
    }
}

impl SystemLauncher {
    pub fn new(program: &str, args: Vec<&str>) -> SystemLauncher {
        return SystemLauncher {
            program: program.to_string(),
            args: args.iter().map(|e| return e.to_string()).collect(),
        };
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, url: &str) -> Result<(), PlatformError> {
        // Openers exit quickly. Tokio reaps the dropped child in the background.
        Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                tracing::error!(error = ?err, program = self.program, url, "Failed to launch URL");
                if err.kind() == io::ErrorKind::NotFound {
                    return PlatformError::Unavailable("url launcher");
                }
                return PlatformError::failed("url launcher", err);
            })?;

        return Ok(());
    }
}
