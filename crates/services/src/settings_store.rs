//! Settings store: in-memory preferences kept in sync with local storage.
//!
//! Readers subscribe to the settings and theme values; only the store
//! publishes. Saving always goes persist, then publish, then apply theme,
//! so a rejected write leaves every observer untouched.

use shared::error::SettingsError;
use shared::observable::Observable;
use shared::settings::{Settings, DEFAULT_THEME};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::presentation::THEME_ATTRIBUTE;
use crate::Environment;

/// Storage key of the persisted settings blob.
pub const SETTINGS_KEY: &str = "charles-settings";

pub struct SettingsStore {
    env: Option<Environment>,
    settings: Observable<Settings>,
    theme: Observable<String>,
}

impl SettingsStore {
    /// Starts from defaults. Nothing is read until [`SettingsStore::load`].
    pub fn new(env: Option<Environment>) -> Self {
        Self {
            env,
            settings: Observable::new(Settings::default()),
            theme: Observable::new(DEFAULT_THEME.to_string()),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.env.is_some()
    }

    pub fn current(&self) -> Settings {
        self.settings.get()
    }

    pub fn theme(&self) -> String {
        self.theme.get()
    }

    pub fn subscribe_settings(&self) -> watch::Receiver<Settings> {
        self.settings.subscribe()
    }

    pub fn subscribe_theme(&self) -> watch::Receiver<String> {
        self.theme.subscribe()
    }

    /// Read persisted settings, merged over defaults.
    ///
    /// A missing or unreadable blob yields the defaults and applies the
    /// default theme; the published settings are left as they were.
    pub fn load(&self) -> Settings {
        let Some(env) = &self.env else {
            return Settings::default();
        };

        match Self::read_persisted(env) {
            Some(loaded) => {
                self.settings.set(loaded.clone());
                self.apply_theme(&loaded.preferred_theme);
                loaded
            }
            None => {
                self.apply_theme(DEFAULT_THEME);
                Settings::default()
            }
        }
    }

    fn read_persisted(env: &Environment) -> Option<Settings> {
        let raw = match env.storage.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved settings, using defaults");
                return None;
            }
            Err(e) => {
                warn!("Error loading settings: {}", e);
                return None;
            }
        };

        match Settings::from_persisted(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Error loading settings: {}", e);
                None
            }
        }
    }

    /// Replace the whole record.
    pub fn save(&self, new_settings: Settings) -> Result<(), SettingsError> {
        let Some(env) = &self.env else {
            return Ok(());
        };

        let json = new_settings.to_persisted().map_err(|e| {
            error!("Error saving settings: {}", e);
            SettingsError::from(e)
        })?;
        if let Err(e) = env.storage.set(SETTINGS_KEY, &json) {
            error!("Error saving settings: {}", e);
            return Err(e.into());
        }

        let theme = new_settings.preferred_theme.clone();
        self.settings.set(new_settings);
        self.apply_theme(&theme);
        Ok(())
    }

    /// Set the active theme on the presentation target and the theme value.
    /// An empty name means the default theme.
    pub fn apply_theme(&self, theme_name: &str) {
        let Some(env) = &self.env else {
            return;
        };

        let theme_name = if theme_name.is_empty() {
            DEFAULT_THEME
        } else {
            theme_name
        };
        env.presentation.set_attribute(THEME_ATTRIBUTE, theme_name);
        self.theme.set(theme_name.to_string());
    }

    /// Drop the persisted entry and go back to defaults.
    pub fn reset(&self) -> Result<(), SettingsError> {
        let Some(env) = &self.env else {
            return Ok(());
        };

        if let Err(e) = env.storage.remove(SETTINGS_KEY) {
            error!("Error resetting settings: {}", e);
            return Err(e.into());
        }
        self.settings.set(Settings::default());
        self.apply_theme(DEFAULT_THEME);
        Ok(())
    }

    /// Edit a copy of the current settings and save it.
    pub fn update(&self, edit: impl FnOnce(&mut Settings)) -> Result<Settings, SettingsError> {
        let mut next = self.current();
        edit(&mut next);
        self.save(next.clone())?;
        Ok(next)
    }

    pub fn add_custom_message(&self, message: impl Into<String>) -> Result<Settings, SettingsError> {
        let message = message.into();
        self.update(|s| s.custom_messages.push(message))
    }

    pub fn remove_custom_message(&self, index: usize) -> Result<Settings, SettingsError> {
        let len = self.settings.get().custom_messages.len();
        if index >= len {
            return Err(SettingsError::MessageIndex { index, len });
        }
        self.update(|s| {
            s.custom_messages.remove(index);
        })
    }
}
