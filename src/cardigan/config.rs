use crate::error::{CardError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DECK_FILE_SUFFIX: &str = "-cards.db";

/// Configuration for cardigan, stored in `<config dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardiganConfig {
    /// Directory holding one database per deck. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Leading words that mean "add a prompt card".
    #[serde(default = "default_prompt_synonyms")]
    pub prompt_synonyms: Vec<String>,

    /// Leading words that mean "add a fill card".
    #[serde(default = "default_fill_synonyms")]
    pub fill_synonyms: Vec<String>,
}

fn default_prompt_synonyms() -> Vec<String> {
    [
        ":black_square:",
        ":black_small_square:",
        ":black_medium_small_square:",
        ":black_medium_square:",
        ":black_large_square:",
        ":black_circle:",
        "black",
        "prompt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_fill_synonyms() -> Vec<String> {
    [
        ":white_square:",
        ":white_small_square:",
        ":white_medium_small_square:",
        ":white_medium_square:",
        ":white_large_square:",
        ":white_circle:",
        "white",
        "fill",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for CardiganConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            prompt_synonyms: default_prompt_synonyms(),
            fill_synonyms: default_fill_synonyms(),
        }
    }
}

impl CardiganConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: CardiganConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Default location of `config.json`.
    pub fn default_dir() -> Result<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Resolves where deck databases live.
    pub fn store_options(&self) -> Result<StoreOptions> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()?.data_dir().to_path_buf(),
        };
        Ok(StoreOptions::new(data_dir))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "cardigan", "cardigan")
        .ok_or_else(|| CardError::Config("could not determine home directory".into()))
}

/// Everything a deck store needs to find its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub data_dir: PathBuf,
}

impl StoreOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Database path for a deck. Deck ids come from outside, so anything but
    /// ASCII letters and digits is refused before touching the filesystem.
    pub fn deck_path(&self, deck_id: &str) -> Result<PathBuf> {
        validate_deck_id(deck_id)?;
        Ok(self.data_dir.join(format!("{deck_id}{DECK_FILE_SUFFIX}")))
    }
}

pub fn validate_deck_id(deck_id: &str) -> Result<()> {
    if deck_id.is_empty() || !deck_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CardError::InvalidDeckId(deck_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CardiganConfig::default();
        assert_eq!(config.data_dir, None);
        assert!(config.prompt_synonyms.contains(&"black".to_string()));
        assert!(config.fill_synonyms.contains(&":white_square:".to_string()));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = CardiganConfig::load(dir.path()).unwrap();
        assert_eq!(config, CardiganConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config = CardiganConfig {
            data_dir: Some(PathBuf::from("/var/lib/cardigan")),
            prompt_synonyms: vec!["q".into()],
            ..CardiganConfig::default()
        };
        config.save(dir.path().join("nested")).unwrap();

        let loaded = CardiganConfig::load(dir.path().join("nested")).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"data_dir": "/tmp/decks"}"#,
        )
        .unwrap();
        let loaded = CardiganConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.data_dir, Some(PathBuf::from("/tmp/decks")));
        assert_eq!(loaded.fill_synonyms, default_fill_synonyms());
    }

    #[test]
    fn test_deck_path_validation() {
        let options = StoreOptions::new("/data");
        assert_eq!(
            options.deck_path("T024BE7LD").unwrap(),
            PathBuf::from("/data/T024BE7LD-cards.db")
        );
        for bad in ["", "../etc", "team one", "deck-1", "dé"] {
            assert!(matches!(
                options.deck_path(bad),
                Err(CardError::InvalidDeckId(_))
            ));
        }
    }
}
