//! Ticker enable setting with change callbacks and persistent user config.
//!
//! The toggle is resolved per user from `~/.config/tickerlane/config.toml`
//! (overridable via `TICKERLANE_CONFIG_DIR`). Hosts register callbacks to
//! learn about changes; a user switch re-reads the resolved value.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "TICKERLANE_CONFIG_DIR";

/// Persistent user preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Default ticker toggle when no per-user entry exists.
    pub enabled: Option<bool>,
    /// Per-user overrides keyed by user id.
    pub users: HashMap<String, bool>,
}

impl UserConfig {
    /// Resolved toggle for `user_id`: per-user override, then the default,
    /// then on.
    #[must_use]
    pub fn enabled_for(&self, user_id: u32) -> bool {
        self.users
            .get(&user_id.to_string())
            .copied()
            .or(self.enabled)
            .unwrap_or(true)
    }
}

/// Resolve the config directory path.
fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join("tickerlane"))
}

/// Resolve the full config file path.
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Load the persistent config. Returns defaults if the file is missing or
/// unparseable; the ticker never fails over a bad preferences file.
#[must_use]
pub fn load_user_config() -> UserConfig {
    let Some(path) = config_file_path() else {
        return UserConfig::default();
    };
    let Ok(contents) = fs::read_to_string(&path) else {
        return UserConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            debug!(target: "tickerlane::settings", %err, "ignoring unparseable config");
            UserConfig::default()
        }
    }
}

/// Runtime toggle with change callbacks, resolved per active user.
pub struct TickerSettings {
    config: UserConfig,
    user_id: u32,
    enabled: bool,
    callbacks: Vec<Box<dyn FnMut(bool)>>,
}

impl TickerSettings {
    #[must_use]
    pub fn new(config: UserConfig, user_id: u32) -> Self {
        let enabled = config.enabled_for(user_id);
        Self {
            config,
            user_id,
            enabled,
            callbacks: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Register a change callback. Fired with the new value on every
    /// effective change.
    pub fn add_callback(&mut self, callback: impl FnMut(bool) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Runtime override of the toggle, e.g. from a quick setting.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.apply(enabled);
    }

    /// Re-resolve the toggle after a user switch.
    pub fn user_switched(&mut self, user_id: u32) {
        self.user_id = user_id;
        let enabled = self.config.enabled_for(user_id);
        self.apply(enabled);
    }

    fn apply(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        debug!(target: "tickerlane::settings", enabled, user = self.user_id, "ticker toggle changed");
        for callback in &mut self.callbacks {
            callback(enabled);
        }
    }
}

impl std::fmt::Debug for TickerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerSettings")
            .field("user_id", &self.user_id)
            .field("enabled", &self.enabled)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn toggle_defaults_to_on() {
        let config = UserConfig::default();
        assert!(config.enabled_for(0));
        assert!(config.enabled_for(10));
    }

    #[test]
    fn per_user_override_beats_the_default() {
        let config: UserConfig = toml::from_str(
            r#"
            enabled = true

            [users]
            "10" = false
            "#,
        )
        .unwrap();
        assert!(config.enabled_for(0));
        assert!(!config.enabled_for(10));
    }

    #[test]
    fn unparseable_toml_falls_back_to_defaults() {
        let config: Result<UserConfig, _> = toml::from_str("enabled = \"maybe\"");
        assert!(config.is_err());
        // load_user_config swallows this into the default.
        assert!(UserConfig::default().enabled_for(0));
    }

    #[test]
    fn callbacks_fire_on_effective_change_only() {
        let fired = Rc::new(Cell::new(0));
        let mut settings = TickerSettings::new(UserConfig::default(), 0);
        let counter = Rc::clone(&fired);
        settings.add_callback(move |_| counter.set(counter.get() + 1));

        settings.set_enabled(true); // already on
        assert_eq!(fired.get(), 0);
        settings.set_enabled(false);
        assert_eq!(fired.get(), 1);
        settings.set_enabled(false);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn user_switch_re_resolves_the_toggle() {
        let config: UserConfig = toml::from_str(
            r#"
            [users]
            "10" = false
            "#,
        )
        .unwrap();
        let mut settings = TickerSettings::new(config, 0);
        assert!(settings.is_enabled());
        settings.user_switched(10);
        assert!(!settings.is_enabled());
        settings.user_switched(0);
        assert!(settings.is_enabled());
    }
}
