use std::env;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CACHE_WINDOW: u32 = 100;
pub const DEFAULT_GRID_RESOLUTION: usize = 100;
pub const DEFAULT_KILL_WINDOW_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Lines handled between two progress reports / cancellation checks.
    pub chunk_size: usize,
    pub frame_cache_window: u32,
    pub field_cache_window: u32,
    pub grid_resolution: usize,
    pub kill_window_secs: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            frame_cache_window: DEFAULT_CACHE_WINDOW,
            field_cache_window: DEFAULT_CACHE_WINDOW,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            kill_window_secs: DEFAULT_KILL_WINDOW_SECS,
        }
    }
}

impl TimelineConfig {
    pub fn from_env() -> Self {
        Self {
            chunk_size: env_parse("TIMELINE_CHUNK_SIZE")
                .unwrap_or(DEFAULT_CHUNK_SIZE)
                .clamp(1, 1_000_000),
            frame_cache_window: env_parse("TIMELINE_CACHE_WINDOW")
                .unwrap_or(DEFAULT_CACHE_WINDOW)
                .clamp(2, 100_000),
            field_cache_window: env_parse("TIMELINE_FIELD_CACHE_WINDOW")
                .unwrap_or(DEFAULT_CACHE_WINDOW)
                .clamp(2, 100_000),
            grid_resolution: env_parse("TIMELINE_GRID_RESOLUTION")
                .unwrap_or(DEFAULT_GRID_RESOLUTION)
                .clamp(2, 1000),
            kill_window_secs: env_parse("TIMELINE_KILL_WINDOW_SECS")
                .unwrap_or(DEFAULT_KILL_WINDOW_SECS)
                .min(600),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}
