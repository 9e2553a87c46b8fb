use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use crate::model::{BLUE_TEAM, Position, RED_TEAM};

const MAP_MAX: f64 = 14_800.0;
const STEP: f64 = 350.0;

struct SimPlayer {
    id: u32,
    name: &'static str,
    champion: &'static str,
    team_id: u32,
    position: Position,
    gold: f64,
    xp: f64,
}

fn seed_roster() -> Vec<SimPlayer> {
    let rows = [
        (1, "BLU Top", "Aatrox"),
        (2, "BLU Jungle", "LeeSin"),
        (3, "BLU Mid", "Ahri"),
        (4, "BLU Bot", "Jinx"),
        (5, "BLU Support", "Thresh"),
        (6, "RED Top", "Ornn"),
        (7, "RED Jungle", "Vi"),
        (8, "RED Mid", "Syndra"),
        (9, "RED Bot", "Kaisa"),
        (10, "RED Support", "Nautilus"),
    ];
    rows.into_iter()
        .map(|(id, name, champion)| {
            let team_id = if id <= 5 { BLUE_TEAM } else { RED_TEAM };
            let position = if team_id == BLUE_TEAM {
                Position::new(560.0, 560.0)
            } else {
                Position::new(14_200.0, 14_200.0)
            };
            SimPlayer {
                id,
                name,
                champion,
                team_id,
                position,
                gold: 500.0,
                xp: 0.0,
            }
        })
        .collect()
}

/// A well-formed telemetry log: one snapshot per second plus random kills, wards and recalls.
/// Same `seed`, same output.
pub fn generate_log(seconds: u32, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut players = seed_roster();
    let mut wards: Vec<Position> = Vec::new();
    let mut recalling: Vec<u32> = Vec::new();
    let mut lines: Vec<Value> = Vec::new();

    for second in 0..=seconds {
        let base_ms = u64::from(second) * 1000;

        for player in &mut players {
            player.position.x = (player.position.x + rng.gen_range(-STEP..STEP)).clamp(0.0, MAP_MAX);
            player.position.z = (player.position.z + rng.gen_range(-STEP..STEP)).clamp(0.0, MAP_MAX);
            player.gold += rng.gen_range(1.0..6.0);
            player.xp += rng.gen_range(2.0..8.0);
        }

        if second > 0 && rng.gen_bool(0.04) {
            let killer = rng.gen_range(0..players.len());
            let victim = pick_enemy(&players, killer, &mut rng);
            let assistants: Vec<u32> = players
                .iter()
                .filter(|p| p.team_id == players[killer].team_id && p.id != players[killer].id)
                .filter(|_| rng.gen_bool(0.3))
                .map(|p| p.id)
                .collect();
            lines.push(json!({
                "rfc461Schema": "champion_kill",
                "gameTime": base_ms + rng.gen_range(0..1000),
                "killer": players[killer].id,
                "victim": players[victim].id,
                "assistants": assistants,
                "position": position_json(players[victim].position),
            }));
        }

        // Only wards from earlier seconds, so a kill never precedes its placement.
        if !wards.is_empty() && rng.gen_bool(0.03) {
            let ward = wards.swap_remove(rng.gen_range(0..wards.len()));
            lines.push(json!({
                "rfc461Schema": "ward_killed",
                "gameTime": base_ms + 999,
                "killer": players[rng.gen_range(0..players.len())].id,
                "position": position_json(ward),
            }));
        }

        if rng.gen_bool(0.08) {
            let placer = &players[rng.gen_range(0..players.len())];
            let ward_type = match rng.gen_range(0..4) {
                0 => "control",
                1 => "sight",
                2 => "blueTrinket",
                _ => "yellowTrinket",
            };
            let placed_at_ms = base_ms + rng.gen_range(0..1000);
            wards.push(placer.position);
            lines.push(json!({
                "rfc461Schema": "ward_placed",
                "gameTime": placed_at_ms,
                "placer": placer.id,
                "wardType": ward_type,
                "position": position_json(placer.position),
            }));
        }

        if rng.gen_bool(0.05) {
            let id = players[rng.gen_range(0..players.len())].id;
            let schema = if recalling.contains(&id) {
                recalling.retain(|r| *r != id);
                "channeling_ended"
            } else {
                recalling.push(id);
                "channeling_started"
            };
            lines.push(json!({
                "rfc461Schema": schema,
                "gameTime": base_ms + rng.gen_range(0..1000),
                "participantID": id,
                "channelingType": "recall",
            }));
        }

        lines.push(snapshot_json(&players, base_ms));
    }

    let mut out = String::new();
    out.push_str(&json!({ "rfc461Schema": "game_info", "gameTime": 0, "gameID": seed }).to_string());
    out.push('\n');
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

fn pick_enemy(players: &[SimPlayer], killer: usize, rng: &mut impl Rng) -> usize {
    let enemies: Vec<usize> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.team_id != players[killer].team_id)
        .map(|(idx, _)| idx)
        .collect();
    enemies[rng.gen_range(0..enemies.len())]
}

fn position_json(position: Position) -> Value {
    json!({ "x": position.x.round(), "z": position.z.round() })
}

fn snapshot_json(players: &[SimPlayer], game_time_ms: u64) -> Value {
    let participants: Vec<Value> = players
        .iter()
        .map(|p| {
            json!({
                "participantID": p.id,
                "teamID": p.team_id,
                "summonerName": p.name,
                "championName": p.champion,
                "position": position_json(p.position),
                "level": (1.0 + p.xp / 400.0).min(18.0).floor(),
                "currentGold": p.gold.round(),
                "totalGold": p.gold.round(),
                "XP": p.xp.round(),
                "stats": [
                    { "name": "VISION_SCORE", "value": (p.xp / 300.0).round() },
                    { "name": "TOTAL_DAMAGE_DEALT_TO_CHAMPIONS", "value": (p.xp * 1.7).round() },
                ],
                "items": [ { "itemID": 1055, "inventorySlot": 0, "itemStacks": 1 } ],
            })
        })
        .collect();
    let teams: Vec<Value> = [BLUE_TEAM, RED_TEAM]
        .into_iter()
        .map(|team_id| {
            let gold: f64 = players
                .iter()
                .filter(|p| p.team_id == team_id)
                .map(|p| p.gold.round())
                .sum();
            json!({ "teamID": team_id, "totalGold": gold })
        })
        .collect();
    json!({
        "rfc461Schema": "stats_update",
        "gameTime": game_time_ms,
        "gameID": 4_242_001,
        "platformID": "SYNTH1",
        "gameMode": "CLASSIC",
        "participants": participants,
        "teams": teams,
    })
}
