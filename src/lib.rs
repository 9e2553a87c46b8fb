//! Rebuilds a second-by-second match timeline from a raw telemetry log and derives the
//! per-frame territory field and invasion shapes used during playback.

pub mod classify;
pub mod config;
pub mod dominance;
pub mod error;
pub mod frame_cache;
pub mod geometry;
pub mod invasion;
pub mod model;
pub mod parse;
pub mod playback;
pub mod reconstruct;
pub mod synthetic_log;
pub mod timeline;
pub mod wards;
pub mod windows;

pub use error::{TimelineError, TimelineResult};
pub use timeline::{Timeline, TimelineAssembler, assemble_timeline};
