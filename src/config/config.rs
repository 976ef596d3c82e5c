use crate::columns::DisplayTokens;
use crate::preferences::{
    ColumnDisplayPreferenceStore, FilePreferenceStore, InMemoryPreferenceStore,
};
use crate::utils::app_paths::AppPaths;
use crate::utils::debouncer::FILTER_DEBOUNCE_MS;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub filter: FilterConfig,
    pub preferences: PreferencesConfig,
    /// Label overrides handed to the translator, e.g. `"Search" = "Suchen"`
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub true_token: String,
    pub false_token: String,
    pub null_token: String,

    /// Render string cells as (sanitized) HTML markup
    pub allow_html: bool,

    /// Show row numbers in the results view
    pub show_row_numbers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Quiet period after the last keystroke before rows are re-filtered
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    pub backend: PreferenceBackend,

    /// Preference file; defaults to the data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let tokens = DisplayTokens::default();
        Self {
            true_token: tokens.true_token,
            false_token: tokens.false_token,
            null_token: tokens.null_token,
            allow_html: true,
            show_row_numbers: false,
        }
    }
}

impl DisplayConfig {
    pub fn tokens(&self) -> DisplayTokens {
        DisplayTokens {
            true_token: self.true_token.clone(),
            false_token: self.false_token.clone(),
            null_token: self.null_token.clone(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: FILTER_DEBOUNCE_MS,
        }
    }
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            backend: PreferenceBackend::File,
            path: None,
        }
    }
}

impl PreferencesConfig {
    /// Build the configured preference store
    pub fn open_store(&self) -> Result<Arc<dyn ColumnDisplayPreferenceStore>> {
        let store: Arc<dyn ColumnDisplayPreferenceStore> = match self.backend {
            PreferenceBackend::Memory => Arc::new(InMemoryPreferenceStore::new()),
            PreferenceBackend::File => {
                let path = match &self.path {
                    Some(path) => path.clone(),
                    None => AppPaths::column_display_file()?,
                };
                Arc::new(FilePreferenceStore::new(path))
            }
        };
        Ok(store)
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# table-columns configuration file
# Location: ~/.config/table-columns/config.toml (Linux)
#           ~/Library/Application Support/table-columns/config.toml (macOS)
#           %APPDATA%\table-columns\config.toml (Windows)

[display]
# Fixed tokens for boolean and null cells. The null token is looked up in
# [labels] and is also what the filter matches null values against.
true_token = "True"
false_token = "False"
null_token = "N/A"

# Render string cells as HTML (tags are sanitized, inline emphasis kept)
allow_html = true

# Show row numbers in the results view
show_row_numbers = false

[filter]
# Milliseconds of quiet typing before the filter is applied
debounce_ms = 250

[preferences]
# Where "original value" choices for temporal columns are kept: "file" or "memory"
backend = "file"

# Preference file (leave commented to use the data directory)
# path = "/path/to/column_display.json"

[labels]
# Override UI labels
# "Search" = "Search"
# "Copy" = "Copy"
# "Column Formatting" = "Column Formatting"
# "Formatted date" = "Formatted date"
# "Original value" = "Original value"
# "N/A" = "N/A"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.display.allow_html);
        assert_eq!(config.filter.debounce_ms, FILTER_DEBOUNCE_MS);
        assert_eq!(config.preferences.backend, PreferenceBackend::File);
    }

    #[test]
    fn test_commented_template_parses_to_defaults() {
        let config = Config::from_toml(&Config::create_default_with_comments()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.display.tokens(), defaults.display.tokens());
        assert_eq!(config.filter.debounce_ms, defaults.filter.debounce_ms);
        assert!(config.labels.is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml(
            r#"
[display]
null_token = "-"

[preferences]
backend = "memory"

[labels]
"Search" = "Filter"
"#,
        )
        .unwrap();
        assert_eq!(config.display.null_token, "-");
        assert_eq!(config.display.true_token, "True");
        assert_eq!(config.preferences.backend, PreferenceBackend::Memory);
        assert_eq!(config.labels.get("Search").map(String::as_str), Some("Filter"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.display.allow_html, parsed.display.allow_html);
        assert_eq!(config.preferences.backend, parsed.preferences.backend);
    }
}
