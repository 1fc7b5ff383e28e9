use std::{
    error::Error,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{file, spinner::SpinSettings, time_format::DEFAULT_DIGITS};

const APP_DIR: &str = "spinboard";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store_path: PathBuf,
    pub log_path: PathBuf,
    pub input_poll_ms: u64,
    pub default_digits: String,
    pub title: String,
    pub mirror_title: bool,
    pub spin: SpinConfig,
    pub bingo: BingoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    pub full_rotations: u32,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BingoConfig {
    pub asset_dir: PathBuf,
    pub catalog: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR);

        Self {
            store_path: data_dir.join("storage.json"),
            log_path: data_dir.join("spinboard.log"),
            input_poll_ms: 100,
            default_digits: String::from(DEFAULT_DIGITS),
            title: String::from("spinboard"),
            mirror_title: true,
            spin: SpinConfig::default(),
            bingo: BingoConfig::default(),
        }
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        let settings = SpinSettings::default();
        Self {
            full_rotations: settings.full_rotations,
            duration_secs: settings.duration_secs,
        }
    }
}

impl Default for BingoConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets/bingo"),
            catalog: (1..=24).map(|i| format!("bingo-{:02}.png", i)).collect(),
        }
    }
}

impl SpinConfig {
    pub fn settings(&self) -> SpinSettings {
        SpinSettings {
            full_rotations: self.full_rotations.max(1),
            duration_secs: self.duration_secs.max(0.0),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Reads the config at `path`, or the default location when none is
    /// given. A missing file yields the defaults.
    pub fn read(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        file::read_json::<Config>(&path)
    }
}
