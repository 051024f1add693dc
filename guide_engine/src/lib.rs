//! # EPG Guide Engine
//!
//! Layout and virtualization engine for an electronic program guide.
//!
//! Given broadcast channels, their programs and the user's reservations, the
//! engine lays every program out as a cell on a channel × time grid, keeps a
//! reservation-status overlay on those cells, and decides which cells a
//! presentation layer should keep painted for the current scroll position.
//! The engine never renders anything itself; it hands out [`api::RenderNode`]s.
//!
//! ## Architecture
//!
//! - [`models`]: Channels, programs, reservations and time windows
//! - [`layout`]: Time geometry, the cell registry and the visibility culler
//! - [`providers`]: Schedule, reservation and settings provider traits plus an in-memory provider
//! - [`services`]: The guide orchestrator, reservation index and periodic refresh
//! - [`config`]: TOML configuration
//! - [`api`]: Identifier types and presentation-facing value objects
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use epg_guide::config::{GuideConfig, GuideMode};
//! use epg_guide::layout::Viewport;
//! use epg_guide::models::{Channel, ChannelType, GuideRequest, Program};
//! use epg_guide::providers::{LocalProvider, StaticSettings};
//! use epg_guide::services::GuideOrchestrator;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = LocalProvider::new();
//! provider.add_channel(
//!     Channel::new(1, "NHK", ChannelType::GR),
//!     vec![Program::new(10, 1, 0, 60 * 60_000).with_name("News")],
//! );
//!
//! let mut guide = GuideOrchestrator::new(
//!     GuideConfig::default(),
//!     Arc::new(provider),
//!     Arc::new(StaticSettings(GuideMode::Minimum)),
//! )?;
//! guide.load(GuideRequest::multi_channel(0, 24)).await?;
//! guide.update_viewport(Viewport {
//!     offset_width: 0.0,
//!     offset_height: 0.0,
//!     base_column_width: 150.0,
//!     base_row_height_per_minute: 3.0,
//!     max_width: 1200.0,
//!     max_height: 800.0,
//! });
//!
//! let nodes = guide.visible_render_nodes()?;
//! assert_eq!(nodes.len(), 1);
//! assert_eq!(nodes[0].height, 180.0);
//! # Ok(())
//! # }
//! ```

// Allow large error types - ProviderError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod config;
pub mod error;

pub mod layout;
pub mod models;

pub mod providers;

pub mod services;

pub use error::{GuideError, GuideResult};
