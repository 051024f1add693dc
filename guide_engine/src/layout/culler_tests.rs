use super::*;
use crate::layout::registry::CellRegistry;
use crate::models::{
    Channel, ChannelSchedule, ChannelType, Program, TimeWindow, WindowLayout, MS_PER_HOUR,
    MS_PER_MINUTE,
};
use proptest::prelude::*;

const MIN: i64 = MS_PER_MINUTE;

/// 10 channels, each with 24 one-hour programs.
fn grid() -> CellRegistry {
    let layout = WindowLayout::continuous(TimeWindow::new(0, 24 * MS_PER_HOUR).unwrap());
    let schedules = (0..10)
        .map(|c| ChannelSchedule {
            channel: Channel::new(c, format!("CH{}", c), ChannelType::GR),
            programs: (0..24)
                .map(|h| Program::new(c * 100 + h, c, h * 60 * MIN, (h + 1) * 60 * MIN))
                .collect(),
        })
        .collect();
    CellRegistry::rebuild(&layout, schedules, false)
}

/// 3 columns of 100px and 2 hours at 1px per minute, no scroll.
fn viewport_at(offset_width: f64, offset_height: f64) -> Viewport {
    Viewport {
        offset_width,
        offset_height,
        base_column_width: 100.0,
        base_row_height_per_minute: 1.0,
        max_width: 300.0,
        max_height: 120.0,
    }
}

fn visible_count(registry: &CellRegistry) -> usize {
    registry.cells().iter().filter(|c| c.is_visible()).count()
}

#[test]
fn test_minimum_mode_shows_viewport_cells() {
    let mut registry = grid();
    let toggled = cull(registry.cells_mut(), &viewport_at(0.0, 0.0), 0.0, GuideMode::Minimum);

    // columns 0..3, hours 0..2
    assert_eq!(toggled.len(), 6);
    assert_eq!(visible_count(&registry), 6);
}

#[test]
fn test_margin_prerenders_neighbours() {
    let mut registry = grid();
    cull(registry.cells_mut(), &viewport_at(0.0, 0.0), 0.5, GuideMode::Minimum);

    // width end = 300 * 1.5 = 450px -> columns 0..=4, height end = 180 min -> hours 0..3
    assert_eq!(visible_count(&registry), 5 * 3);
}

#[test]
fn test_cull_is_idempotent() {
    let mut registry = grid();
    let viewport = viewport_at(150.0, 200.0);

    let first = cull(registry.cells_mut(), &viewport, 0.25, GuideMode::Minimum);
    assert!(!first.is_empty());
    let second = cull(registry.cells_mut(), &viewport, 0.25, GuideMode::Minimum);
    assert!(second.is_empty());
}

#[test]
fn test_minimum_mode_hides_cells_scrolled_away() {
    let mut registry = grid();
    cull(registry.cells_mut(), &viewport_at(0.0, 0.0), 0.0, GuideMode::Minimum);

    let toggled = cull(registry.cells_mut(), &viewport_at(0.0, 600.0), 0.0, GuideMode::Minimum);

    // 6 hidden, 6 shown
    assert_eq!(toggled.len(), 12);
    assert_eq!(visible_count(&registry), 6);
}

#[test]
fn test_sequential_mode_never_hides() {
    let mut registry = grid();
    cull(registry.cells_mut(), &viewport_at(0.0, 0.0), 0.0, GuideMode::Sequential);
    let first: Vec<_> = registry
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_visible())
        .map(|(i, _)| i)
        .collect();

    let toggled = cull(
        registry.cells_mut(),
        &viewport_at(700.0, 1000.0),
        0.0,
        GuideMode::Sequential,
    );
    assert!(!toggled.is_empty());
    for i in first {
        assert!(registry.cells()[i].is_visible());
    }
    assert_eq!(visible_count(&registry), 6 + toggled.len());
}

#[test]
fn test_all_mode_reveals_everything() {
    let mut registry = grid();
    let toggled = cull(registry.cells_mut(), &viewport_at(0.0, 0.0), 0.0, GuideMode::All);
    assert_eq!(toggled.len(), registry.len());

    let again = cull(registry.cells_mut(), &viewport_at(900.0, 900.0), 0.0, GuideMode::All);
    assert!(again.is_empty());
    assert_eq!(visible_count(&registry), registry.len());
}

#[test]
fn test_unusable_viewport_is_noop() {
    let mut registry = grid();
    let mut viewport = viewport_at(0.0, 0.0);
    viewport.base_row_height_per_minute = 0.0;

    assert!(cull(registry.cells_mut(), &viewport, 0.0, GuideMode::Minimum).is_empty());
    assert_eq!(visible_count(&registry), 0);
}

#[test]
fn test_edge_touching_cells_are_hidden() {
    let mut registry = grid();
    // scrolled exactly one column and one hour
    cull(registry.cells_mut(), &viewport_at(100.0, 60.0), 0.0, GuideMode::Minimum);

    let visible: Vec<_> = registry
        .cells()
        .iter()
        .filter(|c| c.is_visible())
        .map(|c| (c.left(), c.top()))
        .collect();
    assert!(visible.iter().all(|(left, _)| *left >= 1 && *left <= 3));
    assert!(visible.iter().all(|(_, top)| *top >= 60 && *top < 180));
    assert_eq!(visible.len(), 6);
}

proptest! {
    #[test]
    fn prop_cull_twice_is_stable(
        offset_width in 0.0f64..1000.0,
        offset_height in 0.0f64..1440.0,
        margin in 0.0f64..1.0,
        minimum in any::<bool>(),
    ) {
        let mode = if minimum { GuideMode::Minimum } else { GuideMode::Sequential };
        let mut registry = grid();
        let viewport = viewport_at(offset_width, offset_height);

        cull(registry.cells_mut(), &viewport, margin, mode);
        let second = cull(registry.cells_mut(), &viewport, margin, mode);
        prop_assert!(second.is_empty());
    }
}
