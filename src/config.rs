// Engine configuration
// Playback speed, pathfinding grid and structure size limits supplied by the host

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::{InputError, InputResult};
use crate::player::Speed;
use crate::recorders::{Cell, Grid};

/// Top-level configuration. Every field is optional in JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub playback: PlaybackConfig,
    pub grid: GridConfig,
    pub structures: StructureConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Speed new sessions start at, clamped to 1..=100 when used
    pub default_speed: u8,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig { default_speed: 50 }
    }
}

/// Pathfinding grid dimensions and endpoints, as `(row, col)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: 15,
            cols: 25,
            start: (5, 5),
            end: (5, 15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Largest size any mutator structure may grow to
    pub max_len: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        StructureConfig { max_len: 64 }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document
    pub fn from_json(json: &str) -> InputResult<Self> {
        serde_json::from_str(json).map_err(|e| InputError::Config(e.to_string()))
    }

    /// Read a JSON config file
    pub fn load(path: &Path) -> InputResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| InputError::Config(format!("{}: {}", path.display(), e)))?;
        let config = EngineConfig::from_json(&contents)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn default_speed(&self) -> Speed {
        Speed::new(i64::from(self.playback.default_speed))
    }

    /// Fresh empty grid with the configured endpoints
    pub fn grid(&self) -> InputResult<Grid> {
        let GridConfig {
            rows,
            cols,
            start,
            end,
        } = self.grid;
        Grid::new(rows, cols, Cell::new(start.0, start.1), Cell::new(end.0, end.1))
    }

    pub fn max_len(&self) -> usize {
        self.structures.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_speed(), Speed::new(50));
        assert_eq!(config.max_len(), 64);

        let grid = config.grid().unwrap();
        assert_eq!((grid.rows(), grid.cols()), (15, 25));
        assert_eq!(grid.start(), Cell::new(5, 5));
        assert_eq!(grid.end(), Cell::new(5, 15));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"playback": {"default_speed": 300}, "grid": {"rows": 3}}"#);
        // 300 does not fit a u8 speed field
        assert!(matches!(config, Err(InputError::Config(_))));

        let config = EngineConfig::from_json(r#"{"playback": {"default_speed": 100}, "grid": {"rows": 8}}"#)
            .unwrap();
        assert_eq!(config.default_speed().get(), 100);
        assert_eq!(config.grid.rows, 8);
        assert_eq!(config.grid.cols, 25);
        assert_eq!(config.structures, StructureConfig::default());
    }

    #[test]
    fn test_zero_speed_is_clamped() {
        let config = EngineConfig::from_json(r#"{"playback": {"default_speed": 0}}"#).unwrap();
        assert_eq!(config.default_speed().get(), 1);
    }

    #[test]
    fn test_grid_outside_bounds_is_refused() {
        let config = EngineConfig::from_json(r#"{"grid": {"rows": 4, "cols": 4}}"#).unwrap();
        assert!(matches!(config.grid(), Err(InputError::CellOutOfGrid { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("algoscope.json");
        std::fs::write(&path, r#"{"structures": {"max_len": 8}}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_len(), 8);
        assert!(EngineConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
