use anyhow::Result;
use std::sync::Arc;

use crate::error::PreferenceError;
use crate::theme::{Theme, ThemeStore};
use crate::Config;

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    theme: ThemeStore,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    /// Create an application around an already loaded configuration.
    ///
    /// The theme preference is read here, once, from the config directory.
    pub fn with_config(config: Config) -> Self {
        let theme = ThemeStore::open(&config.config_dir);
        Self {
            config: Arc::new(config),
            theme,
        }
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the config for services
    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    /// Flip the theme and persist it
    pub fn toggle_theme(&mut self) -> Result<Theme, PreferenceError> {
        self.theme.toggle()
    }
}
