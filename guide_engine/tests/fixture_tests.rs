//! Tests driven by the bundled sample fixture and configuration handling.

mod support;

use std::sync::Arc;

use epg_guide::api::ProgramId;
use epg_guide::config::{GuideConfig, GuideMode};
use epg_guide::models::{GuideRequest, ReservationStatus};
use epg_guide::providers::{ConfigSettings, LocalProvider, SettingsProvider};
use epg_guide::services::GuideOrchestrator;
use support::{screen, with_scoped_env, SAMPLE_FIXTURE, T0};

fn sample_guide(config: GuideConfig) -> GuideOrchestrator {
    let provider = LocalProvider::from_json_str(SAMPLE_FIXTURE).unwrap();
    let settings = Arc::new(ConfigSettings::new(&config));
    GuideOrchestrator::new(config, Arc::new(provider), settings).unwrap()
}

#[tokio::test]
async fn test_sample_fixture_lays_out() {
    let mut guide = with_scoped_env(&[("GUIDE_MODE", None)], || {
        sample_guide(GuideConfig::default())
    });
    let request = GuideRequest::from_time_string("23111507", guide.config()).unwrap();
    guide.load(request).await.unwrap();

    assert_eq!(guide.columns().len(), 3);
    assert_eq!(guide.cells().len(), 79);
    assert_eq!(guide.guide_mode(), GuideMode::Sequential);

    // every column is covered without gaps or overlaps
    for column in guide.columns() {
        let mut cells: Vec<_> = guide
            .cells()
            .iter()
            .filter(|c| c.left() == column.index)
            .collect();
        cells.sort_by_key(|c| c.top());
        assert_eq!(cells[0].top(), 0);
        for pair in cells.windows(2) {
            assert_eq!(pair[0].top() + pair[0].height(), pair[1].top());
        }
        let last = cells[cells.len() - 1];
        assert_eq!(last.top() + last.height(), 24 * 60);
    }

    assert_eq!(
        guide.reservation_status(ProgramId::new(1003)),
        ReservationStatus::Reserved
    );
    assert_eq!(
        guide.reservation_status(ProgramId::new(101002)),
        ReservationStatus::Conflict
    );
    assert_eq!(
        guide.reservation_status(ProgramId::new(1010)),
        ReservationStatus::Skip
    );
}

#[tokio::test]
async fn test_sample_fixture_single_channel_week() {
    let mut guide = with_scoped_env(&[("GUIDE_MODE", None)], || {
        sample_guide(GuideConfig::default())
    });
    guide
        .load(GuideRequest::single_channel(2, T0, 8))
        .await
        .unwrap();

    assert_eq!(guide.columns().len(), 1);
    assert_eq!(guide.time_labels().unwrap().len(), 8 * 24);
    // the fixture only covers the first day
    assert!(guide.cells().iter().all(|c| c.page() == 0));
}

#[tokio::test]
async fn test_snapshot_of_sample_fixture() {
    let mut guide = with_scoped_env(&[("GUIDE_MODE", Some("minimum"))], || {
        sample_guide(GuideConfig::default())
    });
    guide.load(GuideRequest::multi_channel(T0, 24)).await.unwrap();
    guide.update_viewport(screen(0.0, 0.0));

    let snapshot = guide.snapshot().unwrap();
    assert_eq!(snapshot.guide_mode, GuideMode::Minimum);
    assert_eq!(snapshot.time_labels.len(), 24);
    assert_eq!(snapshot.time_labels[0], 7);
    assert!(snapshot.nodes.iter().any(|n| n.is_visible));
    assert!(snapshot.nodes.iter().any(|n| !n.is_visible));

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"state\":\"ready\""));
}

#[test]
fn test_guide_mode_env_override() {
    let config = GuideConfig::from_toml_str("[settings]\nguide_mode = \"all\"\n").unwrap();

    let overridden = with_scoped_env(&[("GUIDE_MODE", Some("minimum"))], || {
        ConfigSettings::new(&config).guide_mode()
    });
    assert_eq!(overridden, GuideMode::Minimum);

    let invalid = with_scoped_env(&[("GUIDE_MODE", Some("bogus"))], || {
        ConfigSettings::new(&config).guide_mode()
    });
    assert_eq!(invalid, GuideMode::All);

    let unset = with_scoped_env(&[("GUIDE_MODE", None)], || {
        ConfigSettings::new(&config).guide_mode()
    });
    assert_eq!(unset, GuideMode::All);
}

#[test]
fn test_example_config_parses() {
    let content = include_str!("../guide.example.toml");
    let config = GuideConfig::from_toml_str(content).unwrap();
    assert_eq!(config, GuideConfig::default());
}

#[test]
fn test_config_file_round_trip_through_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.toml");
    std::fs::write(
        &path,
        "[guide]\nmargin_ratio = 0.25\nutc_offset_minutes = 0\n",
    )
    .unwrap();

    let config = GuideConfig::from_file(&path).unwrap();
    assert_eq!(config.margin_ratio(), 0.25);
    assert_eq!(config.guide.utc_offset_minutes, 0);
    assert_eq!(config.guide.default_length_hours, 24);
}
