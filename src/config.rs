//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::{
    error::TimerError,
    services::AlarmPlayer,
    state::{preset::MAX_PRESET_MINUTES, PresetKey, Presets},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-clock")]
#[command(about = "A local Pomodoro countdown daemon with preset, edit and alarm control over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20525")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Pomodoro duration in minutes
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..=MAX_PRESET_MINUTES))]
    pub pomodoro: u64,

    /// Short break duration in minutes
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..=MAX_PRESET_MINUTES))]
    pub short_break: u64,

    /// Long break duration in minutes
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..=MAX_PRESET_MINUTES))]
    pub long_break: u64,

    /// Preset selected at startup (pomodoro, shortBreak or longBreak)
    #[arg(long, default_value = "pomodoro", value_parser = parse_preset_key)]
    pub preset: PresetKey,

    /// Program used to play the alarm file, run once per loop
    #[arg(long, default_value = "paplay")]
    pub alarm_player: String,

    /// Sound played when a countdown expires
    #[arg(long, default_value = "assets/alarm-clock.wav")]
    pub alarm_file: PathBuf,

    /// Do not play any sound when a countdown expires
    #[arg(long)]
    pub no_alarm: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_preset_key(key: &str) -> Result<PresetKey, TimerError> {
    PresetKey::parse(key)
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// The preset table described by the duration flags
    pub fn presets(&self) -> Presets {
        Presets::new(self.pomodoro, self.short_break, self.long_break)
    }

    /// The alarm player, unless playback is disabled
    pub fn alarm_player(&self) -> Option<AlarmPlayer> {
        (!self.no_alarm).then(|| AlarmPlayer::new(self.alarm_player.clone(), self.alarm_file.clone()))
    }
}
