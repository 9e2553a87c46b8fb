use anyhow::{Context, Result, anyhow};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::classify::{ClassifiedEvent, EventType, GAME_TIME_FIELD, RawEvent};
use crate::model::{
    ItemSlot, KillEvent, MatchMetadata, Participant, ParticipantFrameState, Position, Snapshot,
    TeamAggregate,
};
use crate::wards::{WardDestruction, WardPlacement};
use crate::windows::{ChannelEvent, ChannelPhase};

const DEFAULT_CHANNELING_TYPE: &str = "recall";
const DEFAULT_WARD_TYPE: &str = "yellowTrinket";

pub fn parse_line(line: &str) -> Result<RawEvent> {
    let trimmed = line.trim();
    let fields: Value = serde_json::from_str(trimmed).context("invalid telemetry json")?;
    if !fields.is_object() {
        return Err(anyhow!("telemetry record is not a json object"));
    }
    let game_time_ms = fields
        .get(GAME_TIME_FIELD)
        .and_then(Value::as_f64)
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| ms.floor() as u64)
        .unwrap_or(0);
    Ok(RawEvent {
        game_time_ms,
        fields,
    })
}

#[derive(Debug, Default, Deserialize)]
struct RawPosition {
    #[serde(default, deserialize_with = "opt_f64")]
    x: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    z: Option<f64>,
}

impl RawPosition {
    fn into_position(self) -> Option<Position> {
        Some(Position::new(self.x?, self.z?))
    }
}

#[derive(Debug, Deserialize)]
struct RawStat {
    name: String,
    #[serde(default, deserialize_with = "f64_or_zero")]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "itemID", default, deserialize_with = "u32_or_zero")]
    item_id: u32,
    #[serde(rename = "inventorySlot", default, deserialize_with = "u32_or_zero")]
    inventory_slot: u32,
    #[serde(rename = "itemStacks", default, deserialize_with = "opt_u32")]
    item_stacks: Option<u32>,
}

/// Only `participantID` can reject a row; every other field falls back to a default.
#[derive(Debug, Deserialize)]
struct RawSnapshotParticipant {
    #[serde(rename = "participantID", alias = "participantId", deserialize_with = "required_u32")]
    participant_id: u32,
    #[serde(rename = "teamID", alias = "teamId", default, deserialize_with = "u32_or_zero")]
    team_id: u32,
    #[serde(rename = "championName", default, deserialize_with = "lenient")]
    champion_name: Option<String>,
    #[serde(rename = "championID", default, deserialize_with = "opt_u32")]
    champion_id: Option<u32>,
    #[serde(rename = "summonerName", default, deserialize_with = "lenient")]
    summoner_name: Option<String>,
    #[serde(rename = "playerName", default, deserialize_with = "lenient")]
    player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    position: Option<RawPosition>,
    #[serde(default, deserialize_with = "opt_f64")]
    level: Option<f64>,
    #[serde(rename = "currentGold", default, deserialize_with = "opt_f64")]
    current_gold: Option<f64>,
    #[serde(rename = "totalGold", default, deserialize_with = "opt_f64")]
    total_gold: Option<f64>,
    #[serde(rename = "XP", default, deserialize_with = "opt_f64")]
    xp: Option<f64>,
    #[serde(rename = "totalDamageDealtToChampions", default, deserialize_with = "opt_f64")]
    total_damage_dealt: Option<f64>,
    #[serde(rename = "totalDamageTaken", default, deserialize_with = "opt_f64")]
    total_damage_taken: Option<f64>,
    #[serde(rename = "visionScore", default, deserialize_with = "opt_f64")]
    vision_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    stats: Vec<RawStat>,
    #[serde(default, deserialize_with = "lenient_list")]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde(rename = "teamID", alias = "teamId", default, deserialize_with = "u32_or_zero")]
    team_id: u32,
    #[serde(rename = "totalGold", default, deserialize_with = "f64_or_zero")]
    total_gold: f64,
    #[serde(alias = "championsKills", default, deserialize_with = "u32_or_zero")]
    kills: u32,
    #[serde(default, deserialize_with = "u32_or_zero")]
    deaths: u32,
    #[serde(default, deserialize_with = "u32_or_zero")]
    assists: u32,
    #[serde(alias = "towerKills", default, deserialize_with = "u32_or_zero")]
    towers: u32,
    #[serde(alias = "inhibKills", default, deserialize_with = "u32_or_zero")]
    inhibitors: u32,
    #[serde(alias = "dragonKills", default, deserialize_with = "u32_or_zero")]
    dragons: u32,
    #[serde(alias = "baronKills", default, deserialize_with = "u32_or_zero")]
    barons: u32,
}

fn required_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_as_u32(&value).ok_or_else(|| D::Error::custom(format!("not an id: {value}")))
}

fn opt_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(value_as_u32(&Value::deserialize(deserializer)?))
}

fn u32_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(opt_u32(deserializer)?.unwrap_or(0))
}

fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?
        .as_f64()
        .filter(|n| n.is_finite()))
}

fn f64_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(opt_f64(deserializer)?.unwrap_or(0.0))
}

/// A value of the wrong shape reads as absent instead of failing the enclosing record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

/// Keeps the well-formed elements of an array and drops the rest.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(rows) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect())
}

impl RawSnapshotParticipant {
    fn stat(&self, name: &str) -> Option<f64> {
        self.stats
            .iter()
            .find(|stat| stat.name == name)
            .map(|stat| stat.value)
    }

    fn display_name(&self) -> String {
        self.summoner_name
            .clone()
            .or_else(|| self.player_name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Player {}", self.participant_id))
    }

    fn champion(&self) -> (u32, String) {
        let name = self
            .champion_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let id = self
            .champion_id
            .unwrap_or_else(|| champion_id_from_name(&name));
        (id, name)
    }

    fn into_identity(self) -> Participant {
        let (champion_id, champion_name) = self.champion();
        Participant {
            participant_id: self.participant_id,
            summoner_name: self.display_name(),
            team_id: self.team_id,
            champion_id,
            champion_name,
        }
    }

    fn into_frame_state(self) -> ParticipantFrameState {
        let (champion_id, champion_name) = self.champion();
        let summoner_name = self.display_name();
        let xp = self.xp.or_else(|| self.stat("XP")).unwrap_or(0.0);
        let total_damage_dealt = self
            .stat("TOTAL_DAMAGE_DEALT_TO_CHAMPIONS")
            .or(self.total_damage_dealt)
            .unwrap_or(0.0);
        let total_damage_taken = self
            .stat("TOTAL_DAMAGE_TAKEN")
            .or(self.total_damage_taken)
            .unwrap_or(0.0);
        let total_heal = self.stat("TOTAL_HEAL_ON_TEAMMATES").unwrap_or(0.0);
        let vision_score = self
            .stat("VISION_SCORE")
            .or(self.vision_score)
            .unwrap_or(0.0);
        let items = self
            .items
            .into_iter()
            .filter(|item| item.item_id > 0)
            .map(|item| ItemSlot {
                item_id: item.item_id,
                slot: item.inventory_slot,
                stacks: item.item_stacks.unwrap_or(1),
            })
            .collect();

        ParticipantFrameState {
            participant_id: self.participant_id,
            summoner_name,
            team_id: self.team_id,
            champion_id,
            champion_name,
            position: self.position.and_then(RawPosition::into_position),
            level: self.level.map(|lvl| lvl.max(1.0) as u32).unwrap_or(1),
            current_gold: self.current_gold.unwrap_or(0.0),
            total_gold: self.total_gold.unwrap_or(0.0),
            xp,
            kills: 0,
            deaths: 0,
            assists: 0,
            total_damage_dealt,
            total_damage_taken,
            total_heal,
            vision_score,
            items,
        }
    }
}

/// Stable fallback id when a record only names the champion.
pub fn champion_id_from_name(name: &str) -> u32 {
    name.chars().map(|c| c as u32).sum()
}

fn snapshot_participants(details: &Value) -> Vec<RawSnapshotParticipant> {
    let Some(rows) = details.get("participants").and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| match RawSnapshotParticipant::deserialize(row) {
            Ok(participant) => Some(participant),
            Err(err) => {
                tracing::trace!(error = %err, "skipping malformed snapshot participant");
                None
            }
        })
        .collect()
}

fn snapshot_teams(details: &Value) -> Vec<TeamAggregate> {
    let Some(rows) = details.get("teams").and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| RawTeam::deserialize(row).ok())
        .map(|team| TeamAggregate {
            team_id: team.team_id,
            total_gold: team.total_gold,
            kills: team.kills,
            deaths: team.deaths,
            assists: team.assists,
            towers: team.towers,
            inhibitors: team.inhibitors,
            dragons: team.dragons,
            barons: team.barons,
        })
        .collect()
}

pub fn parse_snapshot(event: &ClassifiedEvent) -> Snapshot {
    Snapshot {
        game_time_ms: event.game_time_ms,
        participants: snapshot_participants(&event.details)
            .into_iter()
            .map(RawSnapshotParticipant::into_frame_state)
            .collect(),
        teams: snapshot_teams(&event.details),
    }
}

pub fn parse_roster(details: &Value) -> Vec<Participant> {
    snapshot_participants(details)
        .into_iter()
        .map(RawSnapshotParticipant::into_identity)
        .collect()
}

/// Builds match metadata from the first snapshot record. `None` when it lists nobody.
pub fn parse_metadata(details: &Value) -> Option<MatchMetadata> {
    let participants = parse_roster(details);
    if participants.is_empty() {
        return None;
    }
    Some(MatchMetadata {
        game_id: pick_string(details, &["gameID", "gameId"]).unwrap_or_else(|| "unknown".into()),
        game_mode: pick_string(details, &["gameMode"]).unwrap_or_else(|| "CLASSIC".into()),
        platform_id: pick_string(details, &["platformID", "platformId"])
            .unwrap_or_else(|| "unknown".into()),
        participants,
        duration_secs: 0,
    })
}

pub fn parse_kill(event: &ClassifiedEvent) -> KillEvent {
    let details = &event.details;
    KillEvent {
        game_time_ms: event.game_time_ms,
        killer_id: pick_u32(details, &["killer", "killerId"]).unwrap_or(0),
        victim_id: pick_u32(details, &["victim", "victimId"]).unwrap_or(0),
        position: pick_position(details).unwrap_or_default(),
        assist_ids: pick_id_list(details, &["assistants", "assistIds"]),
    }
}

pub fn parse_ward_placement(event: &ClassifiedEvent) -> WardPlacement {
    let details = &event.details;
    WardPlacement {
        game_time_ms: event.game_time_ms,
        placer_id: pick_u32(details, &["placer", "participantID"]).unwrap_or(0),
        position: pick_position(details),
        ward_type: pick_string(details, &["wardType"])
            .unwrap_or_else(|| DEFAULT_WARD_TYPE.to_string()),
    }
}

pub fn parse_ward_destruction(event: &ClassifiedEvent) -> WardDestruction {
    WardDestruction {
        game_time_ms: event.game_time_ms,
        position: pick_position(&event.details),
    }
}

pub fn parse_channel(event: &ClassifiedEvent) -> Option<ChannelEvent> {
    let phase = match event.event_type {
        EventType::ChannelingStarted => ChannelPhase::Started,
        EventType::ChannelingEnded => ChannelPhase::Ended,
        _ => return None,
    };
    let details = &event.details;
    Some(ChannelEvent {
        game_time_ms: event.game_time_ms,
        participant_id: pick_u32(details, &["participantID", "participantId"])?,
        phase,
        channeling_type: pick_string(details, &["channelingType"])
            .unwrap_or_else(|| DEFAULT_CHANNELING_TYPE.to_string()),
    })
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(value_as_u32)
}

fn value_as_u32(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u32)
}

fn pick_id_list(value: &Value, keys: &[&str]) -> Vec<u32> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_array))
        .next()
        .map(|ids| ids.iter().filter_map(value_as_u32).collect())
        .unwrap_or_default()
}

fn pick_position(value: &Value) -> Option<Position> {
    let raw = value.get("position")?;
    if !raw.is_object() {
        return None;
    }
    RawPosition::deserialize(raw).ok()?.into_position()
}
