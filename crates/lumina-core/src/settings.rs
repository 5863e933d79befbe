use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

const SETTINGS_TOML_PATH: &str = "settings.toml";

/// Upstream chat-completion services the adapter knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google's OpenAI-compatible surface, served under `/v1beta`.
    #[default]
    Google,
    OpenRouter,
    OpenAI,
    Custom,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Google,
        Provider::OpenRouter,
        Provider::OpenAI,
        Provider::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenRouter => "openrouter",
            Provider::OpenAI => "openai",
            Provider::Custom => "custom",
        }
    }

    /// Host fragment that identifies this provider in an endpoint URL.
    pub fn domain(&self) -> Option<&'static str> {
        match self {
            Provider::Google => Some("generativelanguage.googleapis.com"),
            Provider::OpenRouter => Some("openrouter.ai"),
            Provider::OpenAI => Some("api.openai.com"),
            Provider::Custom => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| ConfigError::UnknownProvider(s.to_string()))
    }
}

/// Connection settings consumed by the provider adapter.
///
/// The api key is private: it is only read back in full by request
/// construction through [`Settings::api_key`]. Everything user-facing goes
/// through [`Settings::masked`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: Provider,
    api_key: String,
    pub model: String,
    pub endpoint: String,
    pub auto_detect_endpoint: bool,
    pub system_instructions: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::Google,
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auto_detect_endpoint: true,
            system_instructions: String::new(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("api_key", &mask_api_key(&self.api_key))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("auto_detect_endpoint", &self.auto_detect_endpoint)
            .field("system_instructions", &self.system_instructions)
            .finish()
    }
}

/// Read-back view of [`Settings`] with the key masked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaskedSettings {
    pub provider: Provider,
    pub model: String,
    pub endpoint: String,
    pub auto_detect_endpoint: bool,
    pub system_instructions: String,
    pub api_key_masked: String,
    pub has_api_key: bool,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub provider: Option<Provider>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub auto_detect_endpoint: Option<bool>,
    pub system_instructions: Option<String>,
}

impl Settings {
    pub fn new(
        provider: Provider,
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_auto_detect(mut self, enabled: bool) -> Self {
        self.auto_detect_endpoint = enabled;
        self
    }

    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = instructions.into();
        self
    }

    /// Full api key, for building the authorization header only.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn masked(&self) -> MaskedSettings {
        MaskedSettings {
            provider: self.provider,
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            auto_detect_endpoint: self.auto_detect_endpoint,
            system_instructions: self.system_instructions.clone(),
            api_key_masked: if self.has_api_key() {
                mask_api_key(&self.api_key)
            } else {
                String::new()
            },
            has_api_key: self.has_api_key(),
        }
    }

    /// Reject settings that cannot produce a request before any network call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.has_api_key() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField("model"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("endpoint"));
        }
        Ok(())
    }

    /// An empty api key in the update keeps the existing key.
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(provider) = update.provider {
            self.provider = provider;
        }
        if let Some(api_key) = update.api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = api_key;
        }
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(endpoint) = update.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(auto_detect) = update.auto_detect_endpoint {
            self.auto_detect_endpoint = auto_detect;
        }
        if let Some(instructions) = update.system_instructions {
            self.system_instructions = instructions;
        }
    }

    /// Load from the data dir, then `settings.toml`, then the environment.
    pub fn load() -> Self {
        Self::load_from(&paths::settings_json_path())
    }

    /// [`Settings::load`] with an explicit JSON settings file.
    pub fn load_from(json_path: &Path) -> Self {
        let mut settings = Self::load_from_files(json_path, Path::new(SETTINGS_TOML_PATH));
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// The JSON file wins; the TOML file is only read when the JSON file is
    /// absent or unreadable. Missing fields fall back to defaults.
    pub fn load_from_files(json_path: &Path, toml_path: &Path) -> Self {
        if json_path.exists() {
            match std::fs::read_to_string(json_path) {
                Ok(content) => match serde_json::from_str::<Settings>(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Failed to parse {}: {}", json_path.display(), e),
                },
                Err(e) => log::warn!("Failed to read {}: {}", json_path.display(), e),
            }
        }

        if toml_path.exists() {
            if let Ok(content) = std::fs::read_to_string(toml_path) {
                match toml::from_str::<Settings>(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Failed to parse {}: {}", toml_path.display(), e),
                }
            }
        }

        Self::default()
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("LUMINA_PROVIDER") {
            match provider.parse() {
                Ok(provider) => self.provider = provider,
                Err(e) => log::warn!("Ignoring LUMINA_PROVIDER: {}", e),
            }
        }
        if let Some(api_key) = lookup("LUMINA_API_KEY") {
            self.api_key = api_key;
        }
        if let Some(model) = lookup("LUMINA_MODEL") {
            self.model = model;
        }
        if let Some(endpoint) = lookup("LUMINA_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(auto_detect) = lookup("LUMINA_AUTO_DETECT_ENDPOINT") {
            self.auto_detect_endpoint = parse_bool_env(&auto_detect);
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&paths::settings_json_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// First 8 and last 4 characters; keys too short to keep both are fully starred.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}
