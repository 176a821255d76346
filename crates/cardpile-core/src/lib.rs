//! Cardpile core engine: host-agnostic layout of card nodes along a curved pile.

mod config;
mod engine;
pub mod layout;
mod snapshot;

pub use config::{ConfigError, PileConfig, PileControls, PileSettings};
pub use engine::PileEngine;
pub use layout::PileLayout;
pub use snapshot::{instance_bytes, CardInstance, PileSnapshot};

pub use cardpile_platform::{NodeTransform, PileListener, VisualFactory};
