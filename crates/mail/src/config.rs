//! Configuration for the mail workspace
//!
//! The backend URL is resolved from (in order of priority):
//! 1. An explicit value (e.g. a command-line flag)
//! 2. The `OCEAN_API_URL` environment variable
//! 3. `ocean.json` in the Ocean config directory
//! 4. The local development default
//!
//! Custom prompts are persisted as a single JSON blob.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::models::PromptSet;

/// Settings filename in the Ocean config directory
const CONFIG_FILE: &str = "ocean.json";

/// Filename of the persisted prompt set
pub const PROMPTS_FILE: &str = "custom_prompts.json";

/// Environment variable overriding the backend URL
pub const API_URL_ENV: &str = "OCEAN_API_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Where the AI backend lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(alias = "apiUrl")]
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Resolve the backend configuration, `explicit` taking precedence
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let file = if config::config_exists(CONFIG_FILE) {
            Some(config::load_json::<Self>(CONFIG_FILE)?)
        } else {
            None
        };
        let env = std::env::var(API_URL_ENV).ok();
        Ok(Self::resolve(explicit, env.as_deref(), file))
    }

    /// Load the configuration from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    fn resolve(explicit: Option<&str>, env: Option<&str>, file: Option<Self>) -> Self {
        let non_blank = |s: &&str| !s.trim().is_empty();
        if let Some(url) = explicit.filter(non_blank) {
            return Self::new(url.trim());
        }
        if let Some(url) = env.filter(non_blank) {
            debug!("Using backend URL from {}", API_URL_ENV);
            return Self::new(url.trim());
        }
        file.filter(|c| !c.base_url.trim().is_empty())
            .unwrap_or_default()
    }

    /// Get the default settings file path (~/.config/ocean/ocean.json)
    pub fn default_config_path() -> Option<PathBuf> {
        config::config_path(CONFIG_FILE)
    }
}

/// Persistence for the custom prompt set
pub trait PromptStorage: Send + Sync {
    /// The persisted prompts, or `None` if nothing was saved yet
    fn load(&self) -> Result<Option<PromptSet>>;

    fn save(&self, prompts: &PromptSet) -> Result<()>;

    /// Forget the persisted prompts
    fn clear(&self) -> Result<()>;
}

/// Prompt storage backed by a JSON file
#[derive(Debug, Clone)]
pub struct FilePromptStorage {
    path: PathBuf,
}

impl FilePromptStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at ~/.config/ocean/custom_prompts.json
    pub fn default_location() -> Result<Self> {
        let path = config::config_path(PROMPTS_FILE)
            .context("Could not determine the config directory")?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PromptStorage for FilePromptStorage {
    fn load(&self) -> Result<Option<PromptSet>> {
        if !self.path.exists() {
            return Ok(None);
        }
        config::load_json_file(&self.path).map(Some)
    }

    fn save(&self, prompts: &PromptSet) -> Result<()> {
        config::save_json_file(&self.path, prompts)
            .with_context(|| format!("Failed to save prompts to {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        config::remove_file(&self.path)
    }
}

/// Prompt storage kept in memory
#[derive(Debug, Default)]
pub struct InMemoryPromptStorage {
    prompts: Mutex<Option<PromptSet>>,
}

impl InMemoryPromptStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompts(prompts: PromptSet) -> Self {
        Self {
            prompts: Mutex::new(Some(prompts)),
        }
    }
}

impl PromptStorage for InMemoryPromptStorage {
    fn load(&self) -> Result<Option<PromptSet>> {
        Ok(self
            .prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, prompts: &PromptSet) -> Result<()> {
        *self.prompts.lock().unwrap_or_else(PoisonError::into_inner) = Some(prompts.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.prompts.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PromptTemplate;
    use tempfile::TempDir;

    fn sample_prompts() -> PromptSet {
        PromptSet {
            categorization: PromptTemplate::new("Categorization", "Sorts mail", "Categorize"),
            action_extraction: PromptTemplate::new("Actions", "Finds tasks", "Extract"),
            auto_reply: PromptTemplate::new("Auto reply", "Drafts replies", "Reply"),
        }
    }

    #[test]
    fn test_resolve_priority() {
        let file = Some(BackendConfig::new("http://file:1"));

        let explicit = BackendConfig::resolve(Some("http://flag:1"), Some("http://env:1"), file.clone());
        assert_eq!(explicit.base_url, "http://flag:1");

        let env = BackendConfig::resolve(None, Some("http://env:1"), file.clone());
        assert_eq!(env.base_url, "http://env:1");

        let from_file = BackendConfig::resolve(Some("  "), None, file);
        assert_eq!(from_file.base_url, "http://file:1");

        assert_eq!(BackendConfig::resolve(None, None, None), BackendConfig::default());
    }

    #[test]
    fn test_config_file_accepts_api_url_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"apiUrl": "https://ocean.example.com"}"#).unwrap();

        let config = BackendConfig::from_file(&path).unwrap();
        assert_eq!(config.base_url, "https://ocean.example.com");
    }

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilePromptStorage::new(temp_dir.path().join("nested").join(PROMPTS_FILE));

        assert_eq!(storage.load().unwrap(), None);

        storage.save(&sample_prompts()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(sample_prompts()));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        // clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_file_storage_rejects_corrupt_blob() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(PROMPTS_FILE);
        std::fs::write(&path, "not json").unwrap();

        assert!(FilePromptStorage::new(path).load().is_err());
    }

    #[test]
    fn test_in_memory_storage() {
        let storage = InMemoryPromptStorage::with_prompts(sample_prompts());
        assert!(storage.load().unwrap().is_some());
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
