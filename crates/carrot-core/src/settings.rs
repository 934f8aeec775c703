use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

pub const THEME_KEY: &str = "carrot-theme";
pub const FONT_KEY: &str = "carrot-font";
pub const FONT_SIZE_KEY: &str = "carrot-font-size";

pub const DEFAULT_THEME: &str = "dark";
pub const DEFAULT_FONT: &str = "Consolas, 'Courier New', monospace";
pub const DEFAULT_FONT_SIZE: u16 = 14;
pub const MAX_FONT_SIZE: u16 = 72;

pub const THEME_NAMES: [&str; 3] = ["dark", "light", "high-contrast"];

pub const FONT_OPTIONS: [&str; 8] = [
    "Consolas, 'Courier New', monospace",
    "Monaco, 'Courier New', monospace",
    "'Fira Code', 'Courier New', monospace",
    "'Source Code Pro', 'Courier New', monospace",
    "'JetBrains Mono', 'Courier New', monospace",
    "'Cascadia Code', 'Courier New', monospace",
    "Menlo, 'Courier New', monospace",
    "'Courier New', monospace",
];

/// String key-value storage for preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> std::io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown theme {0:?}")]
    UnknownTheme(String),
    #[error("font size {0} is outside 1..=72")]
    FontSizeOutOfRange(i64),
    #[error("font family must not be empty")]
    EmptyFont,
    #[error("failed to persist {key}: {reason}")]
    Persist { key: String, reason: String },
}

/// Display preferences backed by a [`PreferenceStore`].
///
/// Each value is loaded independently: a missing or invalid entry falls back
/// to its default without affecting the others. Setters validate, write
/// through to the store, and only then change the in-memory value.
pub struct Settings {
    store: Box<dyn PreferenceStore>,
    theme_name: String,
    font: String,
    font_size: u16,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("theme_name", &self.theme_name)
            .field("font", &self.font)
            .field("font_size", &self.font_size)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let theme_name = store
            .get(THEME_KEY)
            .filter(|name| is_known_theme(name))
            .unwrap_or_else(|| DEFAULT_THEME.to_string());
        let font = store
            .get(FONT_KEY)
            .filter(|font| !font.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FONT.to_string());
        let font_size = store
            .get(FONT_SIZE_KEY)
            .and_then(|raw| parse_font_size(&raw).ok())
            .unwrap_or(DEFAULT_FONT_SIZE);

        debug!(theme = %theme_name, font_size, "settings loaded");
        Self {
            store,
            theme_name,
            font,
            font_size,
        }
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn set_theme(&mut self, name: &str) -> Result<(), SettingsError> {
        if !is_known_theme(name) {
            return Err(SettingsError::UnknownTheme(name.to_string()));
        }
        self.persist(THEME_KEY, name)?;
        self.theme_name = name.to_string();
        Ok(())
    }

    pub fn set_font(&mut self, font: &str) -> Result<(), SettingsError> {
        if font.trim().is_empty() {
            return Err(SettingsError::EmptyFont);
        }
        self.persist(FONT_KEY, font)?;
        self.font = font.to_string();
        Ok(())
    }

    pub fn set_font_size(&mut self, size: i64) -> Result<(), SettingsError> {
        let size = validate_font_size(size)?;
        self.persist(FONT_SIZE_KEY, &size.to_string())?;
        self.font_size = size;
        Ok(())
    }

    pub fn cycle_theme(&mut self) -> Result<(), SettingsError> {
        let next = next_after(&THEME_NAMES, &self.theme_name);
        self.set_theme(next)
    }

    /// A custom font not in [`FONT_OPTIONS`] cycles to the first option.
    pub fn cycle_font(&mut self) -> Result<(), SettingsError> {
        let next = next_after(&FONT_OPTIONS, &self.font);
        self.set_font(next)
    }

    /// Step the font size, clamped to the valid range.
    pub fn step_font_size(&mut self, delta: i64) -> Result<(), SettingsError> {
        let target = (i64::from(self.font_size) + delta).clamp(1, i64::from(MAX_FONT_SIZE));
        if target == i64::from(self.font_size) {
            return Ok(());
        }
        self.set_font_size(target)
    }

    fn persist(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.store.set(key, value).map_err(|err| {
            warn!("settings_persist_failed: key={key} error={err}");
            SettingsError::Persist {
                key: key.to_string(),
                reason: err.to_string(),
            }
        })
    }
}

pub fn is_known_theme(name: &str) -> bool {
    THEME_NAMES.contains(&name)
}

pub fn parse_font_size(raw: &str) -> Result<u16, SettingsError> {
    let parsed: i64 = raw
        .trim()
        .parse()
        .map_err(|_| SettingsError::FontSizeOutOfRange(0))?;
    validate_font_size(parsed)
}

fn validate_font_size(size: i64) -> Result<u16, SettingsError> {
    if (1..=i64::from(MAX_FONT_SIZE)).contains(&size) {
        u16::try_from(size).map_err(|_| SettingsError::FontSizeOutOfRange(size))
    } else {
        Err(SettingsError::FontSizeOutOfRange(size))
    }
}

fn next_after<'a>(options: &[&'a str], current: &str) -> &'a str {
    let next = options
        .iter()
        .position(|option| *option == current)
        .map(|index| (index + 1) % options.len())
        .unwrap_or(0);
    options[next]
}

/// Short label for a CSS-style font family list: first family, unquoted.
pub fn font_label(font: &str) -> String {
    font.split(',')
        .next()
        .unwrap_or(font)
        .trim()
        .replace(|c: char| c == '\'' || c == '"', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct ReadOnlyStore;

    impl PreferenceStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn empty_store_yields_defaults() {
        let settings = Settings::load(Box::new(MemoryStore::new()));
        assert_eq!(settings.theme_name(), DEFAULT_THEME);
        assert_eq!(settings.font(), DEFAULT_FONT);
        assert_eq!(settings.font_size(), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn invalid_values_default_independently() {
        let store = MemoryStore::new()
            .with(THEME_KEY, "solarized")
            .with(FONT_KEY, "'Fira Code', monospace")
            .with(FONT_SIZE_KEY, "huge");
        let settings = Settings::load(Box::new(store));
        assert_eq!(settings.theme_name(), DEFAULT_THEME);
        assert_eq!(settings.font(), "'Fira Code', monospace");
        assert_eq!(settings.font_size(), DEFAULT_FONT_SIZE);

        let store = MemoryStore::new()
            .with(THEME_KEY, "light")
            .with(FONT_SIZE_KEY, "0");
        let settings = Settings::load(Box::new(store));
        assert_eq!(settings.theme_name(), "light");
        assert_eq!(settings.font_size(), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn setters_validate_before_changing_anything() {
        let mut settings = Settings::load(Box::new(MemoryStore::new()));
        assert_eq!(
            settings.set_theme("neon"),
            Err(SettingsError::UnknownTheme("neon".to_string()))
        );
        assert_eq!(
            settings.set_font_size(73),
            Err(SettingsError::FontSizeOutOfRange(73))
        );
        assert_eq!(settings.set_font("  "), Err(SettingsError::EmptyFont));
        assert_eq!(settings.theme_name(), DEFAULT_THEME);
        assert_eq!(settings.font_size(), DEFAULT_FONT_SIZE);

        settings.set_theme("high-contrast").expect("known theme");
        settings.set_font_size(72).expect("upper bound");
        assert_eq!(settings.theme_name(), "high-contrast");
        assert_eq!(settings.font_size(), 72);
    }

    #[test]
    fn failed_persist_keeps_old_value() {
        let mut settings = Settings::load(Box::new(ReadOnlyStore));
        let err = settings.set_theme("light").expect_err("store rejects writes");
        assert!(matches!(err, SettingsError::Persist { ref key, .. } if key == THEME_KEY));
        assert_eq!(settings.theme_name(), DEFAULT_THEME);
    }

    #[test]
    fn cycling_wraps_and_steps_clamp() {
        let mut settings = Settings::load(Box::new(MemoryStore::new().with(THEME_KEY, "high-contrast")));
        settings.cycle_theme().expect("cycle");
        assert_eq!(settings.theme_name(), "dark");
        settings.cycle_theme().expect("cycle");
        assert_eq!(settings.theme_name(), "light");

        settings.cycle_font().expect("cycle");
        assert_eq!(settings.font(), FONT_OPTIONS[1]);

        settings.set_font_size(71).expect("size");
        settings.step_font_size(5).expect("step");
        assert_eq!(settings.font_size(), 72);
        settings.set_font_size(1).expect("size");
        settings.step_font_size(-1).expect("step");
        assert_eq!(settings.font_size(), 1);
    }

    #[test]
    fn font_label_takes_first_family() {
        assert_eq!(font_label("'Fira Code', 'Courier New', monospace"), "Fira Code");
        assert_eq!(font_label(DEFAULT_FONT), "Consolas");
    }
}
