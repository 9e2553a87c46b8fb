use serde::{Deserialize, Serialize};

use crate::classify::ClassifiedEvent;

pub const BLUE_TEAM: u32 = 100;
pub const RED_TEAM: u32 = 200;

/// World-space position. The map plane is x/z; y is height and never used.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance_sq(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub participant_id: u32,
    pub summoner_name: String,
    pub team_id: u32,
    pub champion_id: u32,
    pub champion_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSlot {
    pub item_id: u32,
    pub slot: u32,
    pub stacks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantFrameState {
    pub participant_id: u32,
    pub summoner_name: String,
    pub team_id: u32,
    pub champion_id: u32,
    pub champion_name: String,
    pub position: Option<Position>,
    pub level: u32,
    pub current_gold: f64,
    pub total_gold: f64,
    pub xp: f64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub total_damage_dealt: f64,
    pub total_damage_taken: f64,
    pub total_heal: f64,
    pub vision_score: f64,
    #[serde(default)]
    pub items: Vec<ItemSlot>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAggregate {
    pub team_id: u32,
    pub total_gold: f64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub towers: u32,
    pub inhibitors: u32,
    pub dragons: u32,
    pub barons: u32,
}

/// One full-state event covering every participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub game_time_ms: u64,
    pub participants: Vec<ParticipantFrameState>,
    pub teams: Vec<TeamAggregate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WardType {
    Control,
    YellowTrinket,
    BlueTrinket,
    Sight,
}

/// End of a ward's life. `Never` sorts after every bounded second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WardExpiry {
    At(u32),
    Never,
}

impl WardExpiry {
    pub fn is_after(&self, second: u32) -> bool {
        match self {
            WardExpiry::At(at) => *at > second,
            WardExpiry::Never => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    pub id: String,
    pub team_id: u32,
    pub position: Option<Position>,
    pub placed_at: u32,
    pub expires_at: WardExpiry,
    pub ward_type: WardType,
}

impl Ward {
    /// Half-open lifetime: visible from `placed_at` up to, not including, `expires_at`.
    pub fn is_active_at(&self, second: u32) -> bool {
        self.placed_at <= second && self.expires_at.is_after(second)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInterval {
    pub game_time_ms: u64,
    pub participant_id: u32,
    pub channeling_type: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillEvent {
    pub game_time_ms: u64,
    pub killer_id: u32,
    pub victim_id: u32,
    pub position: Position,
    pub assist_ids: Vec<u32>,
}

impl KillEvent {
    pub fn second(&self) -> u32 {
        ms_to_second(self.game_time_ms)
    }
}

/// Reconstructed match state for one integer second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub timestamp_sec: u32,
    pub snapshot: Option<Snapshot>,
    pub events: Vec<ClassifiedEvent>,
    pub active_wards: Vec<Ward>,
    pub active_channels: Vec<ChannelInterval>,
    pub recent_kills: Vec<KillEvent>,
}

impl Frame {
    pub fn participants(&self) -> &[ParticipantFrameState] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.participants.as_slice())
            .unwrap_or(&[])
    }

    pub fn team_aggregates(&self) -> &[TeamAggregate] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.teams.as_slice())
            .unwrap_or(&[])
    }

    pub fn participant(&self, participant_id: u32) -> Option<&ParticipantFrameState> {
        self.participants()
            .iter()
            .find(|p| p.participant_id == participant_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub game_id: String,
    pub game_mode: String,
    pub platform_id: String,
    pub participants: Vec<Participant>,
    pub duration_secs: u32,
}

pub fn ms_to_second(game_time_ms: u64) -> u32 {
    u32::try_from(game_time_ms / 1000).unwrap_or(u32::MAX)
}
