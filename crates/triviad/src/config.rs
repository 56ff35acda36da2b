//! Configuration management

use crate::error::SetupError;
use crate::game::GameSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub max_players: usize,
    /// Read operator commands from stdin during admission
    pub console: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub round_time_seconds: u64,
    /// Defaults to the round time when absent
    pub answer_timeout_seconds: Option<u64>,
    pub max_points: u32,
    pub max_rounds: usize,
    pub questions_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the values a game cannot run without
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.server.max_players == 0 {
            return Err(SetupError::InvalidConfig(
                "max_players must be at least 1".to_string(),
            ));
        }
        if self.game.max_rounds == 0 {
            return Err(SetupError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.game.max_points == 0 {
            return Err(SetupError::InvalidConfig(
                "max_points must be at least 1".to_string(),
            ));
        }
        if self.game.round_time_seconds == 0 {
            return Err(SetupError::InvalidConfig(
                "round_time must be at least 1 second".to_string(),
            ));
        }
        if self.game.answer_timeout_seconds == Some(0) {
            return Err(SetupError::InvalidConfig(
                "answer_timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Address string handed to the listener, e.g. `127.0.0.1:5600`
    pub fn bind_address(&self) -> String {
        if self.server.address.contains(':') && !self.server.address.starts_with('[') {
            // Bare IPv6 literal
            format!("[{}]:{}", self.server.address, self.server.port)
        } else {
            format!("{}:{}", self.server.address, self.server.port)
        }
    }

    /// Timing and round limits for the orchestrator
    pub fn game_settings(&self) -> GameSettings {
        let round_time = Duration::from_secs(self.game.round_time_seconds);
        let answer_timeout = self
            .game
            .answer_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(round_time);

        GameSettings {
            round_time,
            answer_timeout,
            max_rounds: self.game.max_rounds,
            max_points: self.game.max_points,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                address: "127.0.0.1".to_string(),
                port: triviacore::protocol::DEFAULT_PORT,
                max_players: 4,
                console: true,
            },
            game: GameConfig {
                round_time_seconds: 10,
                answer_timeout_seconds: None,
                max_points: 10,
                max_rounds: 5,
                questions_path: PathBuf::from("./trivia.json"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_zero_players() {
        let mut config = Config::default();
        config.server.max_players = 0;
        assert!(matches!(
            config.validate(),
            Err(SetupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_answer_timeout_defaults_to_round_time() {
        let mut config = Config::default();
        config.game.round_time_seconds = 7;
        assert_eq!(
            config.game_settings().answer_timeout,
            Duration::from_secs(7)
        );

        config.game.answer_timeout_seconds = Some(3);
        assert_eq!(
            config.game_settings().answer_timeout,
            Duration::from_secs(3)
        );
        assert_eq!(config.game_settings().round_time, Duration::from_secs(7));
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.port = 9000;
        assert_eq!(config.bind_address(), "127.0.0.1:9000");

        config.server.address = "::1".to_string();
        assert_eq!(config.bind_address(), "[::1]:9000");

        config.server.address = "localhost".to_string();
        assert_eq!(config.bind_address(), "localhost:9000");
    }

    #[test]
    fn test_save_and_load() {
        let path =
            std::env::temp_dir().join(format!("triviad_config_{}.json", std::process::id()));
        let mut config = Config::default();
        config.game.max_rounds = 3;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.game.max_rounds, 3);
        assert_eq!(loaded.server.port, config.server.port);

        std::fs::remove_file(&path).ok();
    }
}
