use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use simplehasher_core::{HashAlgorithm, HasherConfig, WorkerLimit};
use std::fs;
use std::path::PathBuf;

/// Keys accepted by `config set`
const KNOWN_KEYS: [&str; 6] = [
    "hasher.workers",
    "hasher.read_buffer_size",
    "output.default_format",
    "output.default_algorithms",
    "output.color_enabled",
    "output.progress_enabled",
];

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub hasher: HasherConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub default_format: String,
    pub default_algorithms: Vec<String>,
    pub color_enabled: bool,
    pub progress_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            default_algorithms: vec![HashAlgorithm::SHA256.name().to_string()],
            color_enabled: true,
            progress_enabled: true,
        }
    }
}

impl AppConfig {
    /// Apply CLI argument overrides to the configuration
    pub fn apply_cli_overrides(&mut self, workers: Option<usize>) {
        if let Some(count) = workers {
            self.hasher.workers = WorkerLimit::from_count(count);
        }
    }

    /// Algorithms used when none are given on the command line
    pub fn default_algorithms(&self) -> Result<Vec<HashAlgorithm>> {
        self.output
            .default_algorithms
            .iter()
            .map(|name| {
                name.parse::<HashAlgorithm>()
                    .with_context(|| format!("Invalid output.default_algorithms entry '{name}'"))
            })
            .collect()
    }
}

/// Configuration manager that handles XDG-compliant paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with default XDG-compliant paths
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path (for testing)
    #[cfg(test)]
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    /// `$XDG_CONFIG_HOME/simplehasher/config.toml`, else the platform config dir
    fn default_config_path() -> PathBuf {
        if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(xdg_config).join("simplehasher").join("config.toml");
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("simplehasher")
            .join("config.toml")
    }

    /// Load configuration with layered priority: ENV > File > Defaults.
    /// Command-line flags are applied on top by the caller.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new();

        // Layer 1: Defaults
        figment = figment.merge(Serialized::defaults(AppConfig::default()));

        // Layer 2: Config file (if exists)
        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        // Layer 3: Environment variables
        figment = figment.merge(Env::prefixed("SIMPLEHASHER_").split("__"));

        let config: AppConfig = figment.extract().context("Failed to load configuration")?;
        config
            .hasher
            .validate()
            .with_context(|| format!("Invalid configuration in {}", self.config_path.display()))?;
        Ok(config)
    }

    /// Get a configuration value by key (dot notation)
    pub fn get(&self, key: &str) -> Result<String> {
        let value = Self::to_toml(&self.load()?)?;
        let mut current = &value;

        for part in key.split('.') {
            match current {
                toml::Value::Table(table) => {
                    current = table
                        .get(part)
                        .ok_or_else(|| anyhow::anyhow!("Key '{}' not found", key))?;
                }
                _ => anyhow::bail!("Invalid key path: {}", key),
            }
        }

        Self::render(current).ok_or_else(|| anyhow::anyhow!("Value at '{}' is not a simple type", key))
    }

    /// Set a configuration value by key (dot notation)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parsed_value = Self::parse_config_value(key, value)?;

        // Load existing config or create new
        let mut config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path).with_context(|| {
                format!("Failed to read {}", self.config_path.display())
            })?;
            toml::from_str(&content).context("Config file is not valid TOML")?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid key path: {}", key))?;

        let toml::Value::Table(root) = &mut config else {
            anyhow::bail!("Config file root must be a table");
        };
        let section_value = root
            .entry(section.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
        let toml::Value::Table(table) = section_value else {
            anyhow::bail!("Invalid key path: expected table at '{}'", section);
        };
        table.insert(field.to_string(), parsed_value);

        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write the updated config
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(&self.config_path, toml_string)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;

        Ok(())
    }

    /// List all configuration values
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let value = Self::to_toml(&self.load()?)?;

        let mut items = Vec::new();
        Self::collect_values(&value, String::new(), &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }

    fn to_toml(config: &AppConfig) -> Result<toml::Value> {
        let toml_string = toml::to_string(config)?;
        Ok(toml::from_str(&toml_string)?)
    }

    fn render(value: &toml::Value) -> Option<String> {
        match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            toml::Value::Array(items) => {
                let rendered: Option<Vec<String>> = items.iter().map(Self::render).collect();
                rendered.map(|parts| parts.join(","))
            }
            _ => None,
        }
    }

    /// Recursively collect all key-value pairs from TOML
    fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
        if let toml::Value::Table(table) = value {
            for (key, val) in table {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                Self::collect_values(val, new_prefix, items);
            }
        } else if let Some(rendered) = Self::render(value) {
            items.push((prefix, rendered));
        }
    }

    /// Validate a value and convert it to its TOML type
    fn parse_config_value(key: &str, value: &str) -> Result<toml::Value> {
        match key {
            "hasher.workers" => {
                let workers: usize = value
                    .parse()
                    .context("workers must be a non-negative integer (0 = one per core)")?;
                Ok(toml::Value::Integer(i64::try_from(workers)?))
            }
            "hasher.read_buffer_size" => {
                let size: usize = value
                    .parse()
                    .context("read_buffer_size must be a positive integer")?;
                HasherConfig {
                    read_buffer_size: size,
                    ..HasherConfig::default()
                }
                .validate()?;
                Ok(toml::Value::Integer(i64::try_from(size)?))
            }
            "output.default_format" => {
                let format = value.to_lowercase();
                if !matches!(format.as_str(), "text" | "json" | "csv") {
                    anyhow::bail!("default_format must be one of: text, json, csv");
                }
                Ok(toml::Value::String(format))
            }
            "output.default_algorithms" => {
                let names = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| {
                        name.parse::<HashAlgorithm>()
                            .map(|algorithm| toml::Value::String(algorithm.name().to_string()))
                            .map_err(anyhow::Error::from)
                    })
                    .collect::<Result<Vec<_>>>()?;
                if names.is_empty() {
                    anyhow::bail!("default_algorithms needs at least one algorithm");
                }
                Ok(toml::Value::Array(names))
            }
            "output.color_enabled" | "output.progress_enabled" => {
                let enabled: bool = value
                    .parse()
                    .context("Expected boolean value (true/false)")?;
                Ok(toml::Value::Boolean(enabled))
            }
            _ => anyhow::bail!(
                "Unknown configuration key '{}'. Known keys: {}",
                key,
                KNOWN_KEYS.join(", ")
            ),
        }
    }
}
