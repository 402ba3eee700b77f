use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use qrtools_config::Config;
use tokio::sync::RwLock;

pub struct AppState {
    pub config_path: PathBuf,
    pub config: Arc<RwLock<Config>>,
}

impl AppState {
    /// Create the config file with defaults if needed, then load it
    pub fn load(config_path: PathBuf) -> Self {
        if let Err(e) = qrtools_config::ensure_exists(&config_path, &Config::default()) {
            tracing::error!(
                "Failed to create default config at {}: {}",
                config_path.display(),
                e
            );
        }

        let config = qrtools_config::load(&config_path);
        tracing::debug!("Loaded config from {}", config_path.display());

        Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub async fn snapshot(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Re-read the file from disk, replacing the in-memory copy
    pub async fn reload(&self) -> Config {
        let fresh = qrtools_config::load(&self.config_path);
        *self.config.write().await = fresh.clone();
        fresh
    }

    /// Write `config` to disk and adopt it
    pub async fn store(&self, config: Config) -> Result<(), qrtools_config::ConfigError> {
        qrtools_config::try_save(&self.config_path, &config)?;
        *self.config.write().await = config;
        Ok(())
    }

    /// Last modification time of the config file, if it can be read
    pub fn config_modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.config_path)
            .and_then(|meta| meta.modified())
            .ok()
    }
}
