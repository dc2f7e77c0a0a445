// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: String,
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default = "default_rate_limit_calls")]
    pub rate_limit_max_calls: u32,
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rate_limit_max_calls: 100,
            rate_limit_window_secs: 60,
            provider_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub enabled: bool,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

fn default_rate_limit_calls() -> u32 { 100 }
fn default_rate_limit_window() -> u64 { 60 }
fn default_provider_timeout() -> u64 { 10 }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("satyacheck"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &PathBuf, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Sort by modification time (oldest first)
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        // Remove oldest entries
        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Get provider API key from config file
    pub fn get_api_key(&self, provider: &str) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.api_keys.get(provider).cloned())
    }

    /// Store provider API key in config file
    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.insert(provider.to_string(), key.to_string());
        self.save(&config)
    }

    /// Delete provider API key from config file
    pub fn delete_api_key(&self, provider: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.remove(provider);
        self.save(&config)
    }

    /// Get provider base URL from config file
    pub fn get_provider_url(&self, provider: &str) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.providers.get(provider).and_then(|p| p.base_url.clone()))
    }

    /// Set provider base URL in config file
    pub fn set_provider_url(&self, provider: &str, url: &str) -> Result<(), String> {
        let mut config = self.load()?;
        let provider_config = config.providers.entry(provider.to_string()).or_default();
        provider_config.base_url = Some(url.to_string());
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("satyacheck-config-{}-{}", tag, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.rate_limit_max_calls, 100);
        assert_eq!(config.analysis.rate_limit_window_secs, 60);
        assert_eq!(config.analysis.provider_timeout_secs, 10);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig {
            version: "1.0.0".to_string(),
            analysis: AnalysisConfig::default(),
            providers: HashMap::new(),
            api_keys: HashMap::new(),
        };
        config.api_keys.insert("gemini".to_string(), "key".to_string());

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "1.0.0");
        assert_eq!(parsed.api_keys.get("gemini").map(String::as_str), Some("key"));
    }

    #[test]
    fn test_setters_persist_to_disk() {
        let dir = scratch_dir("setters");
        let store = ConfigStore::new(dir.clone());

        store.set_api_key("gemini", "key-123").unwrap();
        store.set_provider_url("ollama", "http://127.0.0.1:11434").unwrap();

        // A fresh store over the same directory sees the written values.
        let reopened = ConfigStore::new(dir.clone());
        assert_eq!(
            reopened.get_api_key("gemini").unwrap().as_deref(),
            Some("key-123")
        );
        assert_eq!(
            reopened.get_provider_url("ollama").unwrap().as_deref(),
            Some("http://127.0.0.1:11434")
        );

        store.delete_api_key("gemini").unwrap();
        assert_eq!(store.get_api_key("gemini").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_backup_retention_cap() {
        let dir = scratch_dir("backups");
        let store = ConfigStore::new(dir.clone());
        let backup_dir = dir.join("backups");

        let mut config = AppConfig::default();
        config.version = "1.0.0".to_string();
        // First save has nothing to back up.
        store.save(&config).unwrap();
        assert!(!backup_dir.exists());

        // Seed stale backups with staggered mtimes, oldest first.
        fs::create_dir_all(&backup_dir).unwrap();
        for i in 0..15u64 {
            let path = backup_dir.join(format!("config_stale_{:02}.json", i));
            fs::write(&path, "{}").unwrap();
            let file = fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(UNIX_EPOCH + Duration::from_secs(i)).unwrap();
        }

        config.version = "1.1.0".to_string();
        store.save(&config).unwrap();

        let survivors: Vec<String> = fs::read_dir(&backup_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".json"))
            .collect();
        assert_eq!(survivors.len(), 10);
        for i in 0..6 {
            assert!(!survivors.contains(&format!("config_stale_{:02}.json", i)));
        }

        // The copy made during the second save holds the pre-write config.
        let fresh = survivors
            .iter()
            .find(|n| !n.starts_with("config_stale_"))
            .unwrap();
        let backed: AppConfig =
            serde_json::from_str(&fs::read_to_string(backup_dir.join(fresh)).unwrap()).unwrap();
        assert_eq!(backed.version, "1.0.0");
        assert_eq!(store.load().unwrap().version, "1.1.0");

        let _ = fs::remove_dir_all(dir);
    }
}
