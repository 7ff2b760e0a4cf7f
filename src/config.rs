//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "timer-board")]
#[command(about = "A local multi-timer service with persistent countdowns and shared expiry alarms")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted timers
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Keep timers in memory only
    #[arg(long, conflicts_with = "data_dir")]
    pub ephemeral: bool,

    /// Shell command played in a loop while any timer has expired
    #[arg(short, long)]
    pub alarm_command: Option<String>,

    /// Length of one countdown second in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_millis: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
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

    /// Data directory from the flag, else the platform data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("timer-board")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["timer-board"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick_millis, 1000);
        assert_eq!(config.log_level(), "info");
        assert!(config.data_dir().ends_with("timer-board"));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config =
            Config::try_parse_from(["timer-board", "--data-dir", "/tmp/timers", "-v"]).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/timers"));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_zero_tick_length() {
        assert!(Config::try_parse_from(["timer-board", "--tick-millis", "0"]).is_err());
    }
}
