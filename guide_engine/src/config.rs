//! Guide configuration file support.
//!
//! Layout constants (prefetch margin, single-channel paging, time zone,
//! refresh cadence) are read from a TOML file instead of living in module
//! level state. Every field has a default so an empty file is valid.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{GuideError, GuideResult};

/// Virtualization policy for the culler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideMode {
    /// Culling disabled, every cell always visible.
    All,
    /// Cells are revealed once and never hidden again until the grid is rebuilt.
    #[default]
    Sequential,
    /// Full bidirectional show/hide.
    Minimum,
}

impl GuideMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideMode::All => "all",
            GuideMode::Sequential => "sequential",
            GuideMode::Minimum => "minimum",
        }
    }

    /// Read the mode from the `GUIDE_MODE` environment variable, if set and valid.
    pub fn from_env() -> Option<Self> {
        std::env::var("GUIDE_MODE").ok().and_then(|v| v.parse().ok())
    }
}

impl fmt::Display for GuideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuideMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "sequential" => Ok(Self::Sequential),
            "minimum" => Ok(Self::Minimum),
            _ => Err(format!("Unknown guide mode: {}", s)),
        }
    }
}

/// Guide configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideConfig {
    #[serde(default)]
    pub guide: GuideSettings,
    #[serde(default)]
    pub settings: ModeSettings,
}

/// Layout and refresh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideSettings {
    /// Fraction of the viewport size pre-rendered on each side.
    #[serde(default = "default_margin_ratio")]
    pub margin_ratio: f64,
    #[serde(default = "default_length_hours")]
    pub default_length_hours: u32,
    #[serde(default = "default_page_hours")]
    pub single_channel_page_hours: u32,
    #[serde(default = "default_single_channel_days")]
    pub single_channel_days: u32,
    /// Offset of the broadcast time zone from UTC, in minutes.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_reservation_refresh_secs")]
    pub reservation_refresh_secs: u64,
}

/// Settings normally owned by the settings provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeSettings {
    #[serde(default)]
    pub guide_mode: GuideMode,
}

fn default_margin_ratio() -> f64 {
    0.5
}

fn default_length_hours() -> u32 {
    24
}

fn default_page_hours() -> u32 {
    24
}

fn default_single_channel_days() -> u32 {
    8
}

fn default_utc_offset_minutes() -> i32 {
    9 * 60
}

fn default_reservation_refresh_secs() -> u64 {
    60
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            margin_ratio: default_margin_ratio(),
            default_length_hours: default_length_hours(),
            single_channel_page_hours: default_page_hours(),
            single_channel_days: default_single_channel_days(),
            utc_offset_minutes: default_utc_offset_minutes(),
            reservation_refresh_secs: default_reservation_refresh_secs(),
        }
    }
}

impl GuideConfig {
    /// Load guide configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(GuideConfig)` if the file was read, parsed and validated
    /// * `Err(GuideError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> GuideResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GuideError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> GuideResult<Self> {
        let config: GuideConfig = toml::from_str(content).map_err(|e| {
            GuideError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `guide.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> GuideResult<Self> {
        let search_paths = [
            PathBuf::from("guide.toml"),
            PathBuf::from("config/guide.toml"),
            PathBuf::from("../guide.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(GuideError::configuration(
            "No guide.toml found in standard locations",
        ))
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> GuideResult<()> {
        let g = &self.guide;
        if !g.margin_ratio.is_finite() || g.margin_ratio < 0.0 {
            return Err(GuideError::configuration(format!(
                "margin_ratio must be a non-negative number, got {}",
                g.margin_ratio
            )));
        }
        if g.default_length_hours == 0 {
            return Err(GuideError::configuration("default_length_hours must be positive"));
        }
        if g.single_channel_page_hours == 0 {
            return Err(GuideError::configuration(
                "single_channel_page_hours must be positive",
            ));
        }
        if g.single_channel_days == 0 {
            return Err(GuideError::configuration("single_channel_days must be positive"));
        }
        if g.reservation_refresh_secs == 0 {
            return Err(GuideError::configuration(
                "reservation_refresh_secs must be positive",
            ));
        }
        self.utc_offset()?;
        Ok(())
    }

    /// Broadcast time zone offset.
    pub fn utc_offset(&self) -> GuideResult<FixedOffset> {
        self.guide
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                GuideError::configuration(format!(
                    "utc_offset_minutes out of range: {}",
                    self.guide.utc_offset_minutes
                ))
            })
    }

    pub fn margin_ratio(&self) -> f64 {
        self.guide.margin_ratio
    }

    pub fn reservation_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.guide.reservation_refresh_secs)
    }

    /// Configured guide mode, overridden by `GUIDE_MODE` when set.
    pub fn effective_guide_mode(&self) -> GuideMode {
        GuideMode::from_env().unwrap_or(self.settings.guide_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GuideConfig::from_toml_str("").unwrap();
        assert_eq!(config.guide.default_length_hours, 24);
        assert_eq!(config.guide.single_channel_page_hours, 24);
        assert_eq!(config.guide.single_channel_days, 8);
        assert_eq!(config.settings.guide_mode, GuideMode::Sequential);
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[guide]
margin_ratio = 0.25
default_length_hours = 12
single_channel_page_hours = 24
single_channel_days = 7
utc_offset_minutes = 0
reservation_refresh_secs = 30

[settings]
guide_mode = "minimum"
"#;

        let config = GuideConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.margin_ratio(), 0.25);
        assert_eq!(config.guide.default_length_hours, 12);
        assert_eq!(config.guide.single_channel_days, 7);
        assert_eq!(config.settings.guide_mode, GuideMode::Minimum);
        assert_eq!(config.reservation_refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let toml = r#"
[settings]
guide_mode = "lazy"
"#;
        let err = GuideConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, GuideError::Configuration { .. }));
    }

    #[test]
    fn test_negative_margin_rejected() {
        let toml = r#"
[guide]
margin_ratio = -0.1
"#;
        assert!(GuideConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let toml = r#"
[guide]
utc_offset_minutes = 100000
"#;
        assert!(GuideConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_offset_too_large_to_convert_is_configuration_error() {
        let toml = r#"
[guide]
utc_offset_minutes = 40000000
"#;
        assert!(matches!(
            GuideConfig::from_toml_str(toml),
            Err(GuideError::Configuration { .. })
        ));

        let mut config = GuideConfig::default();
        config.guide.utc_offset_minutes = i32::MIN;
        assert!(matches!(
            config.utc_offset(),
            Err(GuideError::Configuration { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[guide]\ndefault_length_hours = 6").unwrap();

        let config = GuideConfig::from_file(file.path()).unwrap();
        assert_eq!(config.guide.default_length_hours, 6);
    }

    #[test]
    fn test_from_missing_file() {
        let err = GuideConfig::from_file("/nonexistent/guide.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_guide_mode_parse() {
        assert_eq!("ALL".parse::<GuideMode>().unwrap(), GuideMode::All);
        assert_eq!(" minimum ".parse::<GuideMode>().unwrap(), GuideMode::Minimum);
        assert!("fast".parse::<GuideMode>().is_err());
    }
}
