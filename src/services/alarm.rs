//! Alarm sound playback through an external player

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// External command that plays the alarm file once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmPlayer {
    pub program: String,
    pub file: PathBuf,
}

impl AlarmPlayer {
    pub fn new(program: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            file: file.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Start one playback of the alarm file
    pub fn spawn(&self) -> Result<Child, String> {
        debug!("Spawning {} {}", self.program, self.file.display());

        Command::new(&self.program)
            .arg(&self.file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("Failed to execute {}: {}", self.program, e))
    }
}

/// Check that the alarm file exists and the player can be launched
pub async fn check_player_available(player: &AlarmPlayer) -> Result<(), String> {
    if !tokio::fs::try_exists(player.file()).await.unwrap_or(false) {
        return Err(format!("Alarm file {} does not exist", player.file().display()));
    }

    Command::new(&player.program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|_| format!("{} is not available. Alarms will not be audible.", player.program))?;

    info!("{} is available", player.program);
    Ok(())
}
