//! 設定ファイル（TOML）
//!
//! ```toml
//! data_dir = "./data"
//! log_level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// `--config` 省略時に探すファイル
pub const DEFAULT_CONFIG_FILE: &str = "rmahjong.toml";
/// データディレクトリの既定値
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// 明示されたファイルは必須、省略時は既定ファイルがあれば読む。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() { Self::from_file(path) } else { Ok(Self::default()) }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// コマンドライン指定 > 設定ファイル > 既定値
    pub fn data_dir(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn log_level(&self, debug: bool) -> &str {
        if debug {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or("info")
        }
    }
}
