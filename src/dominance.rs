use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_GRID_RESOLUTION;
use crate::frame_cache::WindowedCache;
use crate::geometry::{FIELD_PROJECTION, MapProjection, Point};
use crate::model::{BLUE_TEAM, Frame, RED_TEAM};

const CHAMPION_VISION_RANGE: f64 = 1400.0;
const WARD_VISION_RANGE: f64 = 900.0;
const MAP_SPAN: f64 = 14820.0;

const CHAMPION_WEIGHT: f64 = 1.5;
const WARD_WEIGHT: f64 = 1.2;
const WARD_TEAM_FACTOR: f64 = 0.8;
const DYNAMIC_SCALE: f64 = 2.0;

const BIAS_SLOPE: f64 = 2.0;
const BIAS_OFFSET: f64 = 0.5;
const BIAS_MAX: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluenceCell {
    pub x: f64,
    pub y: f64,
    pub blue: f64,
    pub red: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominanceField {
    pub timestamp_sec: u32,
    pub cells: Vec<InfluenceCell>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub blue_cells: usize,
    pub red_cells: usize,
    pub contested_cells: usize,
}

impl DominanceField {
    pub fn summary(&self) -> FieldSummary {
        let mut summary = FieldSummary::default();
        for cell in &self.cells {
            if cell.blue > cell.red {
                summary.blue_cells += 1;
            } else if cell.red > cell.blue {
                summary.red_cells += 1;
            } else {
                summary.contested_cells += 1;
            }
        }
        summary
    }

    /// Cell nearest to a normalized point, assuming the square layout `calculate` produces.
    pub fn cell_at(&self, point: Point) -> Option<&InfluenceCell> {
        let side = (self.cells.len() as f64).sqrt().round() as usize;
        if side < 2 || side * side != self.cells.len() {
            return None;
        }
        let span = (side - 1) as f64;
        let i = (point.x.clamp(0.0, 1.0) * span).round() as usize;
        let j = (point.y.clamp(0.0, 1.0) * span).round() as usize;
        self.cells.get(i * side + j)
    }
}

/// Static lean towards a team's own half of the map, split along the x = y diagonal.
pub fn diagonal_bias(point: Point, team_id: u32) -> f64 {
    let distance_from_diagonal = if team_id == BLUE_TEAM {
        point.y - point.x
    } else {
        point.x - point.y
    };
    (distance_from_diagonal * BIAS_SLOPE + BIAS_OFFSET).clamp(0.0, 1.0) * BIAS_MAX
}

/// `(1 - d/range)^2` inside the range, zero outside.
pub fn aura_strength(distance: f64, range: f64) -> f64 {
    if distance > range {
        return 0.0;
    }
    (1.0 - distance / range).powi(2)
}

#[derive(Debug, Clone, Copy)]
pub struct DominanceCalculator {
    resolution: usize,
    champion_range: f64,
    ward_range: f64,
    projection: MapProjection,
}

impl Default for DominanceCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_RESOLUTION)
    }
}

impl DominanceCalculator {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(2),
            champion_range: CHAMPION_VISION_RANGE / MAP_SPAN,
            ward_range: WARD_VISION_RANGE / MAP_SPAN,
            projection: FIELD_PROJECTION,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn calculate(&self, frame: &Frame) -> DominanceField {
        let Some(snapshot) = frame.snapshot.as_ref() else {
            return DominanceField {
                timestamp_sec: frame.timestamp_sec,
                cells: Vec::new(),
            };
        };

        let champions: Vec<(Point, bool)> = snapshot
            .participants
            .iter()
            .filter_map(|p| {
                let position = p.position.as_ref()?;
                Some((self.projection.project(position), p.team_id == BLUE_TEAM))
            })
            .collect();
        let wards: Vec<(Point, bool)> = frame
            .active_wards
            .iter()
            .filter_map(|w| {
                let position = w.position.as_ref()?;
                Some((self.projection.project(position), w.team_id == BLUE_TEAM))
            })
            .collect();

        let span = (self.resolution - 1) as f64;
        let mut cells = Vec::with_capacity(self.resolution * self.resolution);
        for i in 0..self.resolution {
            for j in 0..self.resolution {
                let point = Point::new(i as f64 / span, j as f64 / span);
                let (blue, red) = self.dynamic_influence(point, &champions, &wards);
                cells.push(InfluenceCell {
                    x: point.x,
                    y: point.y,
                    blue: diagonal_bias(point, BLUE_TEAM) + blue * DYNAMIC_SCALE,
                    red: diagonal_bias(point, RED_TEAM) + red * DYNAMIC_SCALE,
                });
            }
        }

        DominanceField {
            timestamp_sec: frame.timestamp_sec,
            cells,
        }
    }

    /// Fields for a whole frame slice, computed in parallel; output order matches input.
    pub fn calculate_all(&self, frames: &[Frame]) -> Vec<DominanceField> {
        frames.par_iter().map(|frame| self.calculate(frame)).collect()
    }

    fn dynamic_influence(
        &self,
        point: Point,
        champions: &[(Point, bool)],
        wards: &[(Point, bool)],
    ) -> (f64, f64) {
        let mut blue = 0.0;
        let mut red = 0.0;
        for (champion, is_blue) in champions {
            let influence =
                aura_strength(point.distance(champion), self.champion_range) * CHAMPION_WEIGHT;
            if *is_blue {
                blue += influence;
            } else {
                red += influence;
            }
        }
        for (ward, is_blue) in wards {
            let influence = aura_strength(point.distance(ward), self.ward_range) * WARD_WEIGHT;
            if *is_blue {
                blue += influence * WARD_TEAM_FACTOR;
            } else {
                red += influence * WARD_TEAM_FACTOR;
            }
        }
        (blue, red)
    }
}

/// Memo of computed fields keyed by frame second, evicted like the frame cache.
#[derive(Debug, Clone)]
pub struct DominanceCache {
    calculator: DominanceCalculator,
    cache: WindowedCache<Arc<DominanceField>>,
}

impl DominanceCache {
    pub fn new(calculator: DominanceCalculator, window: u32) -> Self {
        Self {
            calculator,
            cache: WindowedCache::new(window),
        }
    }

    pub fn field_for(&mut self, frame: &Frame) -> Arc<DominanceField> {
        let key = i64::from(frame.timestamp_sec);
        if let Some(field) = self.cache.get(key) {
            return Arc::clone(field);
        }
        let field = Arc::new(self.calculator.calculate(frame));
        self.cache.insert(key, Arc::clone(&field));
        field
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
