use serde::{Deserialize, Serialize};
use stateweave_parser::{Quote, SerializerOptions};
use stateweave_synth::{Mode, TransformOptions, DEFAULT_EXTENSIONS};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "stateweave.config.json";

/// Stateweave configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Source directory containing the reducer tree
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Aggregate module, relative to `srcDir`
    #[serde(default = "default_target")]
    pub target: String,

    /// Glob matching child modules, relative to `srcDir`
    #[serde(default = "default_child_pattern")]
    pub child_pattern: String,

    #[serde(default)]
    pub mode: Mode,

    /// Extensions stripped from import specifiers
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub quote: Quote,
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_target() -> String {
    "state.js".to_string()
}

fn default_child_pattern() -> String {
    "**/reducer.js".to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", config_path.display(), e))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.src_dir)
    }

    pub fn get_target_path(&self, cwd: &Path) -> PathBuf {
        self.get_src_dir(cwd).join(&self.target)
    }

    pub fn transform_options(&self, child: impl Into<PathBuf>, mode: Option<Mode>) -> TransformOptions {
        TransformOptions::new(child)
            .with_mode(mode.unwrap_or(self.mode))
            .with_extensions(self.extensions.clone())
    }

    pub fn serializer_options(&self) -> SerializerOptions {
        SerializerOptions {
            quote: self.quote,
            ..SerializerOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            target: default_target(),
            child_pattern: default_child_pattern(),
            mode: Mode::default(),
            extensions: default_extensions(),
            quote: Quote::default(),
        }
    }
}
