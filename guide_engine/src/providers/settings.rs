//! Settings provider trait and simple implementations.

use crate::config::{GuideConfig, GuideMode};

/// Source of the user's guide mode.
pub trait SettingsProvider: Send + Sync {
    fn guide_mode(&self) -> GuideMode;
}

/// Fixed guide mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSettings(pub GuideMode);

impl SettingsProvider for StaticSettings {
    fn guide_mode(&self) -> GuideMode {
        self.0
    }
}

/// Guide mode taken from a [`GuideConfig`], honoring the `GUIDE_MODE` override.
#[derive(Debug, Clone)]
pub struct ConfigSettings {
    mode: GuideMode,
}

impl ConfigSettings {
    pub fn new(config: &GuideConfig) -> Self {
        Self {
            mode: config.effective_guide_mode(),
        }
    }
}

impl SettingsProvider for ConfigSettings {
    fn guide_mode(&self) -> GuideMode {
        self.mode
    }
}
