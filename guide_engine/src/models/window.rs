//! Time windows and the windowing step that turns a guide request into pages.
//!
//! A multi-channel request lays out one continuous window. A single-channel
//! request lays out N days as contiguous fixed-length pages that share one
//! column; every page gets a fresh vertical origin.

use chrono::{FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::api::ChannelId;
use crate::config::GuideConfig;
use crate::error::{GuideError, GuideResult};
use crate::models::channel::{ChannelFilter, ChannelType};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Half-open `[start, end)` range of millisecond timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Create a window, rejecting empty or inverted ranges.
    pub fn new(start: i64, end: i64) -> GuideResult<Self> {
        if end <= start {
            return Err(GuideError::invalid_window(format!(
                "window end ({}) must be after start ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a window of `hours` hours starting at `start`.
    pub fn from_hours(start: i64, hours: u32) -> GuideResult<Self> {
        let end = i64::from(hours)
            .checked_mul(MS_PER_HOUR)
            .and_then(|length| start.checked_add(length))
            .ok_or_else(|| {
                GuideError::invalid_window(format!(
                    "{} hours from {} is out of range",
                    hours, start
                ))
            })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Length of the window in whole minutes, rounded up.
    pub fn minutes(&self) -> i64 {
        ceil_units(self.duration_ms(), MS_PER_MINUTE)
    }

    /// Whether `[start, end)` intersects this window.
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        start < self.end && end > self.start
    }
}

fn ceil_units(value: i64, unit: i64) -> i64 {
    value / unit + i64::from(value % unit != 0)
}

/// Truncate a timestamp to the top of its hour in the given offset.
///
/// Fails with [`GuideError::InvalidWindow`] when the result is not representable.
pub fn truncate_to_hour(timestamp: i64, offset: FixedOffset) -> GuideResult<i64> {
    let offset_ms = i64::from(offset.local_minus_utc()) * MS_PER_SECOND;
    timestamp
        .checked_add(offset_ms)
        .and_then(|local| local.checked_sub(local.rem_euclid(MS_PER_HOUR)))
        .and_then(|hour| hour.checked_sub(offset_ms))
        .ok_or_else(|| {
            GuideError::invalid_window(format!("timestamp {} is out of range", timestamp))
        })
}

/// Parse a start-hour string (`YYMMDDhh` or `YYYYMMDDhh`) in the given offset.
///
/// Returns the millisecond timestamp of the start of that hour.
pub fn parse_start_time(value: &str, offset: FixedOffset) -> GuideResult<i64> {
    let malformed = || GuideError::invalid_window(format!("malformed time string: {:?}", value));

    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let (year, rest) = match value.len() {
        8 => (2000 + parse_digits(&value[0..2]).ok_or_else(malformed)?, &value[2..]),
        10 => (parse_digits(&value[0..4]).ok_or_else(malformed)?, &value[4..]),
        _ => return Err(malformed()),
    };
    let month = parse_digits(&rest[0..2]).ok_or_else(malformed)?;
    let day = parse_digits(&rest[2..4]).ok_or_else(malformed)?;
    let hour = parse_digits(&rest[4..6]).ok_or_else(malformed)?;

    let naive = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .ok_or_else(malformed)?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(malformed)
}

fn parse_digits(s: &str) -> Option<u32> {
    s.parse().ok()
}

/// What the host asks the guide to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GuideRequest {
    /// Every channel (optionally of one wave type) for `length_hours` from `start`.
    MultiChannel {
        start: i64,
        length_hours: u32,
        #[serde(default)]
        channel_type: Option<ChannelType>,
    },
    /// One channel for `days` pages starting at `start`.
    SingleChannel {
        channel_id: ChannelId,
        start: i64,
        days: u32,
    },
}

impl GuideRequest {
    pub fn multi_channel(start: i64, length_hours: u32) -> Self {
        GuideRequest::MultiChannel {
            start,
            length_hours,
            channel_type: None,
        }
    }

    pub fn single_channel(channel_id: i64, start: i64, days: u32) -> Self {
        GuideRequest::SingleChannel {
            channel_id: ChannelId::new(channel_id),
            start,
            days,
        }
    }

    /// Build a multi-channel request from a start-hour string, using the
    /// configured default length.
    pub fn from_time_string(value: &str, config: &GuideConfig) -> GuideResult<Self> {
        let start = parse_start_time(value, config.utc_offset()?)?;
        Ok(Self::multi_channel(start, config.guide.default_length_hours))
    }

    pub fn with_channel_type(self, channel_type: ChannelType) -> Self {
        match self {
            GuideRequest::MultiChannel {
                start,
                length_hours,
                ..
            } => GuideRequest::MultiChannel {
                start,
                length_hours,
                channel_type: Some(channel_type),
            },
            single => single,
        }
    }

    pub fn channel_filter(&self) -> ChannelFilter {
        match self {
            GuideRequest::MultiChannel {
                channel_type: Some(t),
                ..
            } => ChannelFilter::Type(*t),
            GuideRequest::MultiChannel { .. } => ChannelFilter::All,
            GuideRequest::SingleChannel { channel_id, .. } => ChannelFilter::Single(*channel_id),
        }
    }

    /// Resolve this request into a concrete window layout.
    pub fn layout(&self, config: &GuideConfig) -> GuideResult<WindowLayout> {
        let offset = config.utc_offset()?;
        match *self {
            GuideRequest::MultiChannel {
                start,
                length_hours,
                ..
            } => {
                if length_hours == 0 {
                    return Err(GuideError::invalid_window("length must be at least one hour"));
                }
                let window = TimeWindow::from_hours(truncate_to_hour(start, offset)?, length_hours)?;
                Ok(WindowLayout::continuous(window))
            }
            GuideRequest::SingleChannel { start, days, .. } => {
                if days == 0 {
                    return Err(GuideError::invalid_window("day count must be at least one"));
                }
                let page_hours = config.guide.single_channel_page_hours;
                let window = TimeWindow::from_hours(
                    truncate_to_hour(start, offset)?,
                    page_hours.saturating_mul(days),
                )?;
                WindowLayout::paged(window, i64::from(page_hours) * MS_PER_HOUR)
            }
        }
    }
}

/// One vertical page of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    /// Window used for the vertical offset of cells on this page.
    pub window: TimeWindow,
    /// Minutes from the top of the grid to the top of this page.
    pub origin_minutes: i64,
}

/// Result of the windowing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLayout {
    window: TimeWindow,
    pages: Vec<Page>,
    page_minutes: i64,
    paged: bool,
}

impl WindowLayout {
    /// A single page covering the whole window.
    pub fn continuous(window: TimeWindow) -> Self {
        Self {
            window,
            pages: vec![Page {
                index: 0,
                window,
                origin_minutes: 0,
            }],
            page_minutes: window.minutes(),
            paged: false,
        }
    }

    /// Partition `window` into contiguous pages of `page_ms` milliseconds.
    ///
    /// The last page is shortened if the window is not a whole number of pages.
    pub fn paged(window: TimeWindow, page_ms: i64) -> GuideResult<Self> {
        if page_ms <= 0 {
            return Err(GuideError::invalid_window("page length must be positive"));
        }
        let page_minutes = ceil_units(page_ms, MS_PER_MINUTE);

        let mut pages = Vec::new();
        let mut start = window.start();
        while start < window.end() {
            let end = start.saturating_add(page_ms).min(window.end());
            let index = pages.len();
            pages.push(Page {
                index,
                window: TimeWindow::new(start, end)?,
                origin_minutes: index as i64 * page_minutes,
            });
            start = end;
        }

        Ok(Self {
            window,
            pages,
            page_minutes,
            paged: true,
        })
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn is_paged(&self) -> bool {
        self.paged
    }

    pub fn page_minutes(&self) -> i64 {
        self.page_minutes
    }

    /// Pages that `[start, end)` intersects, found by binary search over the
    /// contiguous, ordered pages.
    pub fn pages_overlapping(&self, start: i64, end: i64) -> &[Page] {
        let first = self.pages.partition_point(|p| p.window.end() <= start);
        let last = self.pages.partition_point(|p| p.window.start() < end);
        if first < last {
            &self.pages[first..last]
        } else {
            &[]
        }
    }

    /// Height of the whole grid in minutes.
    pub fn total_minutes(&self) -> i64 {
        self.pages
            .last()
            .map(|p| p.origin_minutes + p.window.minutes())
            .unwrap_or(0)
    }

    /// Hour-of-day labels, one per hour row, page after page.
    pub fn time_labels(&self, offset: FixedOffset) -> Vec<u32> {
        let offset_ms = i64::from(offset.local_minus_utc()) * MS_PER_SECOND;
        let mut labels = Vec::new();
        for page in &self.pages {
            let hours = ceil_units(page.window.duration_ms(), MS_PER_HOUR);
            let first = page.window.start().rem_euclid(MS_PER_DAY) + offset_ms;
            for h in 0..hours {
                let local = first + h.rem_euclid(24) * MS_PER_HOUR;
                labels.push(local.div_euclid(MS_PER_HOUR).rem_euclid(24) as u32);
            }
        }
        labels
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod window_tests;
