use std::sync::Arc;

use crate::config::TimelineConfig;
use crate::dominance::{DominanceCache, DominanceCalculator, DominanceField};
use crate::frame_cache::FrameCache;
use crate::invasion::{InvasionPolygon, invasion_polygons};
use crate::model::{BLUE_TEAM, ChannelInterval, Frame, RED_TEAM};
use crate::timeline::Timeline;

/// Everything the host needs to draw one playback tick.
#[derive(Debug, Clone)]
pub struct PlaybackView<'t> {
    pub frame: &'t Frame,
    pub field: Arc<DominanceField>,
    pub blue_invasions: Vec<InvasionPolygon>,
    pub red_invasions: Vec<InvasionPolygon>,
}

/// Owns an assembled timeline and the per-tick caches. The host drives `current time`; this
/// type only answers "what does the match look like at t".
pub struct PlaybackSession {
    timeline: Timeline,
    frames: FrameCache,
    fields: DominanceCache,
}

impl PlaybackSession {
    pub fn new(timeline: Timeline, config: &TimelineConfig) -> Self {
        Self {
            timeline,
            frames: FrameCache::new(config.frame_cache_window),
            fields: DominanceCache::new(
                DominanceCalculator::new(config.grid_resolution),
                config.field_cache_window,
            ),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn frame_at(&mut self, time_secs: f64) -> Option<&Frame> {
        self.frames.get(&self.timeline.frames, time_secs)
    }

    pub fn view_at(&mut self, time_secs: f64) -> Option<PlaybackView<'_>> {
        let frame = self.frames.get(&self.timeline.frames, time_secs)?;
        Some(PlaybackView {
            frame,
            field: self.fields.field_for(frame),
            blue_invasions: invasion_polygons(frame, BLUE_TEAM),
            red_invasions: invasion_polygons(frame, RED_TEAM),
        })
    }

    /// Random-access channel state, independent of the frame sequence.
    pub fn channels_at(&self, second: u32) -> Vec<ChannelInterval> {
        self.timeline.channel_index.active_at(second)
    }
}
