use std::collections::HashMap;

use crate::model::{Participant, Position, RED_TEAM, Ward, WardExpiry, WardType, ms_to_second};

const YELLOW_TRINKET_SECS: u32 = 120;
const SIGHT_WARD_SECS: u32 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct WardPlacement {
    pub game_time_ms: u64,
    pub placer_id: u32,
    pub position: Option<Position>,
    pub ward_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WardDestruction {
    pub game_time_ms: u64,
    pub position: Option<Position>,
}

impl WardType {
    /// Case-insensitive substring match on the free-text type; anything unrecognised is a
    /// stealth (yellow) ward.
    pub fn normalize(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if ["control", "pink", "jammer"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            WardType::Control
        } else if ["bluetrinket", "blue_trinket", "farsight", "blue"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            WardType::BlueTrinket
        } else if lower.contains("sight") {
            WardType::Sight
        } else {
            WardType::YellowTrinket
        }
    }

    /// `None` means the ward only disappears when destroyed.
    pub fn default_duration_secs(self) -> Option<u32> {
        match self {
            WardType::YellowTrinket => Some(YELLOW_TRINKET_SECS),
            WardType::Sight => Some(SIGHT_WARD_SECS),
            WardType::Control | WardType::BlueTrinket => None,
        }
    }

    pub fn default_expiry(self, placed_at: u32) -> WardExpiry {
        match self.default_duration_secs() {
            Some(secs) => WardExpiry::At(placed_at.saturating_add(secs)),
            None => WardExpiry::Never,
        }
    }
}

struct TrackedWard {
    ward: Ward,
    resolved: bool,
}

/// Pairs each destruction with the nearest live, unresolved ward and shortens its lifetime.
/// Destructions that match nothing are dropped.
pub fn resolve_ward_lifecycles(
    placements: &[WardPlacement],
    destructions: &[WardDestruction],
    roster: &HashMap<u32, Participant>,
) -> Vec<Ward> {
    let mut placements: Vec<&WardPlacement> = placements.iter().collect();
    placements.sort_by_key(|p| p.game_time_ms);
    let mut destructions: Vec<&WardDestruction> = destructions.iter().collect();
    destructions.sort_by_key(|d| d.game_time_ms);

    let mut tracked: Vec<TrackedWard> = placements
        .into_iter()
        .map(|placement| {
            let placed_at = ms_to_second(placement.game_time_ms);
            let ward_type = WardType::normalize(&placement.ward_type);
            let team_id = roster
                .get(&placement.placer_id)
                .map(|p| p.team_id)
                .unwrap_or(RED_TEAM);
            TrackedWard {
                ward: Ward {
                    id: format!("ward-{}-{}", placement.game_time_ms, placement.placer_id),
                    team_id,
                    position: placement.position,
                    placed_at,
                    expires_at: ward_type.default_expiry(placed_at),
                    ward_type,
                },
                resolved: false,
            }
        })
        .collect();

    let mut discarded = 0usize;
    for destruction in destructions {
        let Some(target) = destruction.position else {
            discarded += 1;
            continue;
        };
        let destroyed_at = ms_to_second(destruction.game_time_ms);

        let mut closest: Option<(usize, f64)> = None;
        for (idx, candidate) in tracked.iter().enumerate() {
            if candidate.resolved || !candidate.ward.is_active_at(destroyed_at) {
                continue;
            }
            let Some(position) = candidate.ward.position else {
                continue;
            };
            let distance_sq = position.distance_sq(&target);
            if closest.is_none_or(|(_, best)| distance_sq < best) {
                closest = Some((idx, distance_sq));
            }
        }

        match closest {
            Some((idx, _)) => {
                let matched = &mut tracked[idx];
                matched.ward.expires_at = WardExpiry::At(destroyed_at);
                matched.resolved = true;
            }
            None => discarded += 1,
        }
    }
    if discarded > 0 {
        tracing::debug!(discarded, "ward destructions without a matching ward");
    }

    tracked.into_iter().map(|t| t.ward).collect()
}

pub fn active_wards_at(wards: &[Ward], second: u32) -> Vec<Ward> {
    wards
        .iter()
        .filter(|ward| ward.is_active_at(second))
        .cloned()
        .collect()
}
