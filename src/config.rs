//! Loader configuration.
//!
//! Defaults load an image the way a host would on auto-detection: pick the
//! architecture from the chip id, queue the entry point and run the chip's
//! post-processing. Hosts can override the architecture through the
//! `loader.esp.architecture` setting.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{EspAppError, Result};
use crate::host::SettingsSource;
use crate::io::IOLimits;
use crate::resolve::ArchOverride;

/// Setting key of the architecture override.
pub const ARCHITECTURE_SETTING: &str = "loader.esp.architecture";

/// Options for a single image load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Architecture to disassemble with.
    pub architecture: ArchOverride,
    /// Build the memory map and pick the architecture, but schedule no
    /// analysis and skip chip post-processing.
    pub parse_only: bool,
    /// Name of the function symbol defined at the entry point.
    pub entry_symbol: String,
    /// Limits for file-based loading.
    pub io: IOLimits,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            architecture: ArchOverride::Auto,
            parse_only: false,
            entry_symbol: "_entry".to_string(),
            io: IOLimits::default(),
        }
    }
}

impl LoaderConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| EspAppError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EspAppError::Config(e.to_string()))
    }

    /// Defaults, with the architecture taken from `settings` when present.
    pub fn from_settings(settings: &dyn SettingsSource) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = settings.get_string(ARCHITECTURE_SETTING) {
            config.architecture = value.parse()?;
        }
        Ok(config)
    }

    pub fn with_architecture(mut self, architecture: ArchOverride) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn parse_only(mut self, parse_only: bool) -> Self {
        self.parse_only = parse_only;
        self
    }
}

/// Description of the architecture setting for host registration.
pub fn settings_schema() -> Value {
    let names: Vec<&str> = ArchOverride::ALL.iter().map(|a| a.as_str()).collect();
    let descriptions: Vec<&str> = ArchOverride::ALL.iter().map(|a| a.description()).collect();
    json!({
        "title": "Architecture",
        "type": "string",
        "enum": names,
        "enumDescriptions": descriptions,
        "default": ArchOverride::Auto.as_str(),
        "description": "Select Xtensa architecture variant for disassembly",
    })
}
