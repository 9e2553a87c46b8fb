use std::collections::HashMap;

use crate::model::Frame;

/// Keyed cache that, on every write, drops entries more than half a window away from the key
/// just written. Tuned for scrubbing back and forth around one point, not a general LRU.
#[derive(Debug, Clone)]
pub struct WindowedCache<V> {
    entries: HashMap<i64, V>,
    window: u32,
    center: Option<i64>,
}

impl<V> WindowedCache<V> {
    pub fn new(window: u32) -> Self {
        Self {
            entries: HashMap::new(),
            window,
            center: None,
        }
    }

    pub fn insert(&mut self, key: i64, value: V) {
        self.entries.insert(key, value);
        self.evict_around(key);
    }

    pub fn get(&self, key: i64) -> Option<&V> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: i64) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.center = None;
    }

    /// Key of the most recent write.
    pub fn center(&self) -> Option<i64> {
        self.center
    }

    fn evict_around(&mut self, key: i64) {
        self.center = Some(key);
        let half = u64::from(self.window / 2);
        self.entries.retain(|cached, _| cached.abs_diff(key) <= half);
    }
}

/// Index of the frame whose timestamp is closest to `second`; the earlier frame wins a tie.
pub fn nearest_frame_index(frames: &[Frame], second: i64) -> Option<usize> {
    if frames.is_empty() {
        return None;
    }
    let upper = frames.partition_point(|frame| i64::from(frame.timestamp_sec) < second);
    if upper == 0 {
        return Some(0);
    }
    if upper == frames.len() {
        return Some(frames.len() - 1);
    }
    let before = second - i64::from(frames[upper - 1].timestamp_sec);
    let after = i64::from(frames[upper].timestamp_sec) - second;
    if after < before {
        Some(upper)
    } else {
        Some(upper - 1)
    }
}

/// Floored second, saturating at the `i64` range. NaN maps to 0.
fn cache_key(time_secs: f64) -> i64 {
    if time_secs.is_nan() {
        0
    } else {
        time_secs.floor() as i64
    }
}

/// Time-to-frame lookup over a sorted frame slice with a windowed memo of recent answers.
#[derive(Debug, Clone)]
pub struct FrameCache {
    cache: WindowedCache<usize>,
}

impl FrameCache {
    pub fn new(window: u32) -> Self {
        Self {
            cache: WindowedCache::new(window),
        }
    }

    pub fn get<'f>(&mut self, frames: &'f [Frame], time_secs: f64) -> Option<&'f Frame> {
        let key = cache_key(time_secs);
        if let Some(&idx) = self.cache.get(key) {
            if let Some(frame) = frames.get(idx) {
                return Some(frame);
            }
        }
        let idx = nearest_frame_index(frames, key)?;
        self.cache.insert(key, idx);
        frames.get(idx)
    }

    pub fn is_cached(&self, time_secs: f64) -> bool {
        self.cache.contains(cache_key(time_secs))
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
