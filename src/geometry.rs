use serde::{Deserialize, Serialize};

use crate::model::Position;

/// Point in normalized map space: both axes in `[0, 1]`, y grows downwards (screen order).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Moves `fraction` of the way towards `target`.
    pub fn towards(&self, target: &Point, fraction: f64) -> Point {
        Point::new(
            self.x + (target.x - self.x) * fraction,
            self.y + (target.y - self.y) * fraction,
        )
    }
}

/// Z-component of `(b - a) x (c - a)`; positive when `a -> b -> c` turns left.
pub fn cross(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Maps world x/z coordinates into normalized map space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
    /// Fraction of the unit square reserved on every side.
    pub padding: f64,
    pub clamp: bool,
}

/// Projection used by the dominance field.
pub const FIELD_PROJECTION: MapProjection = MapProjection {
    min_x: 0.0,
    max_x: 14820.0,
    min_z: 0.0,
    max_z: 14881.0,
    padding: 0.03,
    clamp: false,
};

/// Projection used for invasion geometry; covers the whole minimap image.
pub const MINIMAP_PROJECTION: MapProjection = MapProjection {
    min_x: -170.0,
    max_x: 16220.0,
    min_z: -1850.0,
    max_z: 14980.0,
    padding: 0.0,
    clamp: true,
};

impl MapProjection {
    pub fn project(&self, position: &Position) -> Point {
        let mut raw_x = (position.x - self.min_x) / (self.max_x - self.min_x);
        let mut raw_z = (position.z - self.min_z) / (self.max_z - self.min_z);
        if self.clamp {
            raw_x = raw_x.clamp(0.0, 1.0);
            raw_z = raw_z.clamp(0.0, 1.0);
        }
        let playable = 1.0 - 2.0 * self.padding;
        Point::new(
            self.padding + raw_x * playable,
            self.padding + (1.0 - raw_z) * playable,
        )
    }
}

/// Andrew's monotone chain. Collinear points are dropped; inputs of two or fewer points are
/// returned unchanged.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for point in &sorted {
        while lower.len() >= 2
            && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], point) <= 0.0
        {
            lower.pop();
        }
        lower.push(*point);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for point in sorted.iter().rev() {
        while upper.len() >= 2
            && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], point) <= 0.0
        {
            upper.pop();
        }
        upper.push(*point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Indices of the two points farthest apart; the first pair found wins ties.
pub fn farthest_pair(points: &[Point]) -> Option<(usize, usize)> {
    if points.len() < 2 {
        return None;
    }
    let mut best = (0, 1);
    let mut best_dist = points[0].distance_sq(&points[1]);
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let dist = points[i].distance_sq(&points[j]);
            if dist > best_dist {
                best_dist = dist;
                best = (i, j);
            }
        }
    }
    Some(best)
}
