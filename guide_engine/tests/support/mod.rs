#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use epg_guide::config::{GuideConfig, GuideMode};
use epg_guide::layout::Viewport;
use epg_guide::models::{Channel, ChannelType, Program, MS_PER_HOUR, MS_PER_MINUTE};
use epg_guide::providers::{LocalProvider, StaticSettings};
use epg_guide::services::GuideOrchestrator;

/// 2023-11-15 07:00 +09:00, the start of the sample fixture.
pub const T0: i64 = 1_699_999_200_000;

pub const SAMPLE_FIXTURE: &str = include_str!("../../fixtures/sample_guide.json");

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to process-global
/// env vars so parallel tests do not observe each other's changes.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Provider with `channels` GR channels, each carrying `hours` one-hour
/// programs from [`T0`]. Program ids are `channel * 100 + hour`.
pub fn hourly_provider(channels: i64, hours: i64) -> LocalProvider {
    let provider = LocalProvider::new();
    for c in 1..=channels {
        let programs = (0..hours)
            .map(|h| {
                Program::new(c * 100 + h, c, T0 + h * MS_PER_HOUR, T0 + (h + 1) * MS_PER_HOUR)
                    .with_name(format!("CH{} {:02}:00", c, h))
            })
            .collect();
        provider.add_channel(Channel::new(c, format!("CH{}", c), ChannelType::GR), programs);
    }
    provider
}

/// A program of `minutes` length starting `offset_minutes` after [`T0`].
pub fn program_at(id: i64, channel: i64, offset_minutes: i64, minutes: i64) -> Program {
    let start = T0 + offset_minutes * MS_PER_MINUTE;
    Program::new(id, channel, start, start + minutes * MS_PER_MINUTE)
}

pub fn guide(provider: &LocalProvider, mode: GuideMode) -> GuideOrchestrator {
    GuideOrchestrator::new(
        GuideConfig::default(),
        Arc::new(provider.clone()),
        Arc::new(StaticSettings(mode)),
    )
    .unwrap()
}

/// 150 px columns, 3 px minutes, 1280x720 screen.
pub fn screen(offset_width: f64, offset_height: f64) -> Viewport {
    Viewport {
        offset_width,
        offset_height,
        base_column_width: 150.0,
        base_row_height_per_minute: 3.0,
        max_width: 1280.0,
        max_height: 720.0,
    }
}
