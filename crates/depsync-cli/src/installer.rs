//! Running the package installer after a sync

use crate::errors::CliError;
use depsync_logger as logger;
use std::path::Path;
use std::process::Command;

/// Run `<installer> install` in `project_dir`
///
/// Output is captured into the log file rather than shown on the console.
pub fn run_install(installer: &Path, project_dir: &Path) -> Result<(), CliError> {
    let command_name = format!("{} install", installer.display());
    logger::step(&format!("Running {} in {}", command_name, project_dir.display()));
    logger::spinner_start("Installing frontend dependencies...");

    let output = match Command::new(installer)
        .arg("install")
        .current_dir(project_dir)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            logger::spinner_error(&format!("Failed to start {}", command_name));
            return Err(e.into());
        }
    };
    logger::capture_output(&command_name, &output);

    if !output.status.success() {
        logger::spinner_error(&format!("{} failed", command_name));
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().rev().take(5).collect::<Vec<_>>().into_iter().rev() {
            logger::warn(line);
        }
        return Err(CliError::CommandFailed {
            command: command_name,
            code: output.status.code(),
        });
    }

    logger::spinner_success("Frontend dependencies installed");
    Ok(())
}
