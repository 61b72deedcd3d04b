//! Knowledge base configuration and on-disk layout.
//!
//! Every base lives under `<workspace>/.sift/knowledge/<base>/`:
//! `config.yaml`, `vectors.json` and `stats.json`.

use crate::types::{KnowledgeBaseConfig, LearnStats};
use sift_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Load knowledge base configuration.
///
/// Reads `config.yaml` if it exists, otherwise returns the defaults for
/// `base_name`.
pub fn load_config(workspace: &Path, base_name: &str) -> AppResult<KnowledgeBaseConfig> {
    let config_path = get_config_path(workspace, base_name);

    if !config_path.exists() {
        tracing::debug!(
            "Using default knowledge base config for '{}' (no config file found)",
            base_name
        );
        return Ok(KnowledgeBaseConfig::named(base_name));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let mut config: KnowledgeBaseConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Knowledge(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;

    // The directory name wins over whatever the file says.
    config.name = base_name.to_string();

    tracing::debug!("Loaded knowledge base config for '{}'", base_name);
    Ok(config)
}

/// Save knowledge base configuration.
pub fn save_config(workspace: &Path, config: &KnowledgeBaseConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace, &config.name);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Knowledge(format!("Failed to create config directory: {}", e))
        })?;
    }

    let yaml = serde_yaml::to_string(config)
        .map_err(|e| AppError::Knowledge(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Knowledge(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved knowledge base config for '{}'", config.name);
    Ok(())
}

/// Read the stats written by the last learn, if any.
pub fn load_learn_stats(workspace: &Path, base_name: &str) -> AppResult<Option<LearnStats>> {
    let stats_path = get_stats_path(workspace, base_name);
    if !stats_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&stats_path)?;
    let stats = serde_json::from_str(&content).map_err(|e| {
        AppError::Knowledge(format!("Failed to parse stats at {:?}: {}", stats_path, e))
    })?;
    Ok(Some(stats))
}

/// Write the stats of a learn operation.
pub fn save_learn_stats(workspace: &Path, base_name: &str, stats: &LearnStats) -> AppResult<()> {
    let stats_path = get_stats_path(workspace, base_name);
    if let Some(parent) = stats_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&stats_path, serde_json::to_string_pretty(stats)?)?;
    Ok(())
}

/// Get the base directory for a knowledge base.
pub fn get_base_dir(workspace: &Path, base_name: &str) -> PathBuf {
    workspace.join(".sift").join("knowledge").join(base_name)
}

/// Get the path to a base's config file.
pub fn get_config_path(workspace: &Path, base_name: &str) -> PathBuf {
    get_base_dir(workspace, base_name).join("config.yaml")
}

/// Get the persisted vector file for a base.
pub fn get_index_path(workspace: &Path, base_name: &str) -> PathBuf {
    get_base_dir(workspace, base_name).join("vectors.json")
}

/// Get the stats JSON path for a base.
pub fn get_stats_path(workspace: &Path, base_name: &str) -> PathBuf {
    get_base_dir(workspace, base_name).join("stats.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path(), "test-base").unwrap();

        assert_eq!(config.name, "test-base");
        assert_eq!(config.embedding.provider, "trigram");
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let mut config = KnowledgeBaseConfig::named("my-base");
        config.chunk_size = 1024;
        config.embedding.dimensions = 64;

        save_config(temp.path(), &config).unwrap();
        assert!(get_config_path(temp.path(), "my-base").exists());

        let loaded = load_config(temp.path(), "my-base").unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config_is_knowledge_error() {
        let temp = TempDir::new().unwrap();
        let path = get_config_path(temp.path(), "broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "chunk_size: [not, a, number]").unwrap();

        let err = load_config(temp.path(), "broken").unwrap_err();
        assert!(matches!(err, AppError::Knowledge(_)));
    }

    #[test]
    fn test_learn_stats_round_trip() {
        let temp = TempDir::new().unwrap();
        assert!(load_learn_stats(temp.path(), "docs").unwrap().is_none());

        let stats = LearnStats {
            sources_count: 2,
            chunks_count: 5,
            records_count: 5,
            bytes_processed: 1200,
            duration_secs: 0.5,
            learned_at: Utc::now(),
        };
        save_learn_stats(temp.path(), "docs", &stats).unwrap();

        let loaded = load_learn_stats(temp.path(), "docs").unwrap().unwrap();
        assert_eq!(loaded.chunks_count, 5);
        assert_eq!(loaded.learned_at, stats.learned_at);
    }

    #[test]
    fn test_layout() {
        let ws = Path::new("/ws");
        assert_eq!(
            get_index_path(ws, "docs"),
            PathBuf::from("/ws/.sift/knowledge/docs/vectors.json")
        );
        assert_eq!(
            get_stats_path(ws, "docs"),
            PathBuf::from("/ws/.sift/knowledge/docs/stats.json")
        );
    }
}
