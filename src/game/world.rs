//! Level loading and content lookup
//!
//! The simulation itself lives elsewhere; the operator layer only needs to
//! ask whether a level exists, load it, and switch the content directory.

use std::path::{Path, PathBuf};

use tracing::info;

/// Content every gamedir falls back to
pub const BASE_GAME: &str = "qw";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("Failed to load level {level}: {reason}")]
    LoadFailed { level: String, reason: String },
}

/// Game-state subsystem that owns the running level
pub trait World: Send {
    /// Tear down the current world and load `level`
    fn spawn_level(&mut self, level: &str) -> Result<(), WorldError>;
}

/// Content lookup
pub trait GameFs: Send {
    fn map_exists(&self, level: &str) -> bool;
    /// Levels whose name starts with `prefix`, sorted
    fn list_maps(&self, prefix: &str) -> Vec<String>;
    fn gamedir(&self) -> &str;
    fn set_gamedir(&mut self, dir: &str);
}

/// Default world: records the loaded level and a spawn counter
#[derive(Debug, Default)]
pub struct LevelWorld {
    pub level: Option<String>,
    pub spawn_count: u32,
}

impl World for LevelWorld {
    fn spawn_level(&mut self, level: &str) -> Result<(), WorldError> {
        self.spawn_count += 1;
        self.level = Some(level.to_string());
        info!("Spawned level {} (spawn {})", level, self.spawn_count);
        Ok(())
    }
}

/// Directory-backed content: `<base>/<gamedir>/maps/<level>.bsp`, falling
/// back to the base game directory.
#[derive(Debug, Clone)]
pub struct DiskFs {
    base_dir: PathBuf,
    base_game: String,
    gamedir: String,
}

impl DiskFs {
    pub fn new(base_dir: impl Into<PathBuf>, base_game: &str) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_game: base_game.to_string(),
            gamedir: base_game.to_string(),
        }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.base_dir.join(&self.gamedir).join("maps")];
        if self.gamedir != self.base_game {
            dirs.push(self.base_dir.join(&self.base_game).join("maps"));
        }
        dirs
    }
}

impl GameFs for DiskFs {
    fn map_exists(&self, level: &str) -> bool {
        let file = format!("{}.bsp", level);
        self.search_dirs().iter().any(|dir| dir.join(&file).is_file())
    }

    fn list_maps(&self, prefix: &str) -> Vec<String> {
        let mut maps = Vec::new();
        for dir in self.search_dirs() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("bsp") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if stem.starts_with(prefix) && !maps.iter().any(|m| m == stem) {
                        maps.push(stem.to_string());
                    }
                }
            }
        }
        maps.sort();
        maps
    }

    fn gamedir(&self) -> &str {
        &self.gamedir
    }

    fn set_gamedir(&mut self, dir: &str) {
        if dir != self.gamedir {
            info!(
                "Content directory now {}",
                Path::new(&self.base_dir).join(dir).display()
            );
        }
        self.gamedir = dir.to_string();
    }
}
