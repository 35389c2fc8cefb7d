use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::world::{World, WorldDirectory};

/// Uid of the world used when the config names none
pub const DEFAULT_WORLD_UID: Uuid = Uuid::from_u128(0x6865_6164_7377_6565_7065_725f_776f_726c);
pub const DEFAULT_WORLD_NAME: &str = "world";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the registry is saved
    pub save_file: PathBuf,
    /// Minimum gap between two accepted flags on one board
    pub debounce_ms: u64,
    /// Ticks between a reveal and its re-render
    pub render_delay_ticks: u64,
    /// How often a freshly created board is drawn
    pub render_passes: u32,
    pub worlds: Vec<WorldConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    pub name: String,
    pub uid: Uuid,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_file: PathBuf::from("sweeperGames.json"),
            debounce_ms: 250,
            render_delay_ticks: 2,
            render_passes: 2,
            worlds: Vec::new(),
        }
    }
}

impl Config {
    /// Read a TOML config. A missing file means all defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse config at {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Never below one: a board has to be drawn at least once
    pub fn render_passes(&self) -> u32 {
        self.render_passes.max(1)
    }

    /// Configured worlds, or the single default world when there are none
    pub fn world_directory(&self) -> WorldDirectory {
        if self.worlds.is_empty() {
            return WorldDirectory::new().with(World::new(DEFAULT_WORLD_UID, DEFAULT_WORLD_NAME));
        }
        self.worlds
            .iter()
            .fold(WorldDirectory::new(), |dir, w| dir.with(World::new(w.uid, w.name.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::world::WorldLookup;

    #[test]
    fn empty_config_is_all_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.save_file, PathBuf::from("sweeperGames.json"));
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.render_delay_ticks, 2);
        assert_eq!(config.render_passes(), 2);
        assert!(config.world_directory().by_name(DEFAULT_WORLD_NAME).is_some());
    }

    #[test]
    fn parses_worlds_and_clamps_passes() {
        let config = Config::parse(
            r#"
            save_file = "data/games.json"
            render_passes = 0

            [[worlds]]
            name = "arena"
            uid = "3f0c2c1e-4d5b-4f55-9c61-0d2a8e7f9b10"
            "#,
        )
        .unwrap();
        assert_eq!(config.render_passes(), 1);
        let worlds = config.world_directory();
        assert_eq!(worlds.len(), 1);
        assert!(worlds.by_name("arena").is_some());
        assert!(worlds.by_name(DEFAULT_WORLD_NAME).is_none());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("headsweeper.toml")).unwrap();
        assert_eq!(config.debounce_ms, 250);
    }

    #[test]
    fn bad_toml_is_reported() {
        assert!(Config::parse("debounce_ms = \"soon\"").is_err());
    }
}
