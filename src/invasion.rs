use serde::{Deserialize, Serialize};

use crate::geometry::{MINIMAP_PROJECTION, Point, convex_hull, cross, farthest_pair};
use crate::model::{BLUE_TEAM, Frame};

const INVASION_THRESHOLD: f64 = 1.0;
const GROUP_JOIN_DISTANCE: f64 = 0.2;

const WEDGE_REACH: f64 = 0.4;
const WEDGE_SPREAD: f64 = 0.35;
const FRONT_PROJECTION: f64 = 0.8;

const BLUE_BASE: Point = Point::new(0.0, 1.0);
const RED_BASE: Point = Point::new(1.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invader {
    pub participant_id: u32,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvasionPolygon {
    pub team_id: u32,
    pub participant_ids: Vec<u32>,
    pub points: Vec<Point>,
}

pub fn base_corner(team_id: u32) -> Point {
    if team_id == BLUE_TEAM { BLUE_BASE } else { RED_BASE }
}

/// Whether a normalized position lies past the map diagonal on the enemy's side.
pub fn is_invading(point: Point, team_id: u32) -> bool {
    let diagonal = point.x + point.y;
    if team_id == BLUE_TEAM {
        diagonal > INVASION_THRESHOLD
    } else {
        diagonal < INVASION_THRESHOLD
    }
}

/// Positioned members of `team_id` standing in enemy territory, in snapshot order.
pub fn invaders(frame: &Frame, team_id: u32) -> Vec<Invader> {
    frame
        .participants()
        .iter()
        .filter(|p| p.team_id == team_id)
        .filter_map(|p| {
            let point = MINIMAP_PROJECTION.project(p.position.as_ref()?);
            is_invading(point, team_id).then_some(Invader {
                participant_id: p.participant_id,
                point,
            })
        })
        .collect()
}

/// Connected components of the "closer than the join distance" graph, found by depth-first
/// search in input order.
pub fn group_invaders(invaders: &[Invader]) -> Vec<Vec<Invader>> {
    let join_sq = GROUP_JOIN_DISTANCE * GROUP_JOIN_DISTANCE;
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); invaders.len()];
    for i in 0..invaders.len() {
        for j in (i + 1)..invaders.len() {
            if invaders[i].point.distance_sq(&invaders[j].point) < join_sq {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let mut visited = vec![false; invaders.len()];
    let mut groups = Vec::new();
    for start in 0..invaders.len() {
        if visited[start] {
            continue;
        }
        let mut group = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            group.push(invaders[idx]);
            // Reversed so neighbours are visited in adjacency order.
            for &next in adjacency[idx].iter().rev() {
                if !visited[next] {
                    stack.push(next);
                }
            }
        }
        groups.push(group);
    }
    groups
}

fn wedge(anchor: Point, base: Point) -> Vec<Point> {
    let to_base = Point::new(base.x - anchor.x, base.y - anchor.y);
    let perp = Point::new(-to_base.y, to_base.x);
    let reach = Point::new(
        anchor.x + to_base.x * WEDGE_REACH,
        anchor.y + to_base.y * WEDGE_REACH,
    );
    vec![
        anchor,
        Point::new(
            reach.x - perp.x * WEDGE_SPREAD,
            reach.y - perp.y * WEDGE_SPREAD,
        ),
        Point::new(
            reach.x + perp.x * WEDGE_SPREAD,
            reach.y + perp.y * WEDGE_SPREAD,
        ),
    ]
}

fn front_quad(points: &[Point], base: Point, team_id: u32) -> Option<Vec<Point>> {
    let hull = convex_hull(points);
    let (a, b) = farthest_pair(&hull)?;
    let (mut p1, mut p2) = (hull[a], hull[b]);

    let turn = cross(&p1.midpoint(&p2), &p1, &base);
    let flip = if team_id == BLUE_TEAM { turn < 0.0 } else { turn > 0.0 };
    if flip {
        std::mem::swap(&mut p1, &mut p2);
    }

    let p3 = p1.towards(&base, FRONT_PROJECTION);
    let p4 = p2.towards(&base, FRONT_PROJECTION);
    Some(vec![p1, p2, p4, p3])
}

/// One polygon per invader group: a wedge for a lone unit, a front quadrilateral otherwise.
pub fn build_polygons(invaders: &[Invader], team_id: u32) -> Vec<InvasionPolygon> {
    let base = base_corner(team_id);
    group_invaders(invaders)
        .into_iter()
        .filter_map(|group| {
            let points: Vec<Point> = group.iter().map(|inv| inv.point).collect();
            let shape = match points.as_slice() {
                [] => None,
                [single] => Some(wedge(*single, base)),
                _ => front_quad(&points, base, team_id),
            }?;
            Some(InvasionPolygon {
                team_id,
                participant_ids: group.iter().map(|inv| inv.participant_id).collect(),
                points: shape,
            })
        })
        .collect()
}

pub fn invasion_polygons(frame: &Frame, team_id: u32) -> Vec<InvasionPolygon> {
    build_polygons(&invaders(frame, team_id), team_id)
}
