use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_FIELD: &str = "rfc461Schema";
pub const GAME_TIME_FIELD: &str = "gameTime";

/// One parsed telemetry line: its game time plus the untouched record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub game_time_ms: u64,
    pub fields: Value,
}

impl RawEvent {
    pub fn schema(&self) -> Option<&str> {
        self.fields.get(SCHEMA_FIELD).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    StateSnapshot,
    ItemPurchased,
    ItemDestroyed,
    SkillLevelUp,
    SkillUsed,
    WardPlaced,
    WardKilled,
    ChampionKill,
    BuildingDestroyed,
    EpicMonsterKill,
    SummonerSpellUsed,
    ChannelingStarted,
    ChannelingEnded,
    /// Tags this crate does not know yet. Kept verbatim.
    Other(String),
}

impl EventType {
    pub fn from_schema(schema: Option<&str>) -> Self {
        match schema {
            Some("stats_update") => EventType::StateSnapshot,
            Some("item_purchased") => EventType::ItemPurchased,
            Some("item_destroyed") => EventType::ItemDestroyed,
            Some("skill_level_up") => EventType::SkillLevelUp,
            Some("skill_used") => EventType::SkillUsed,
            Some("ward_placed") => EventType::WardPlaced,
            Some("ward_killed") => EventType::WardKilled,
            Some("champion_kill") => EventType::ChampionKill,
            Some("building_destroyed") => EventType::BuildingDestroyed,
            Some("epic_monster_kill") => EventType::EpicMonsterKill,
            Some("summoner_spell_used") => EventType::SummonerSpellUsed,
            Some("channeling_started") => EventType::ChannelingStarted,
            Some("channeling_ended") => EventType::ChannelingEnded,
            Some(other) if !other.is_empty() => EventType::Other(other.to_string()),
            _ => EventType::Other("Unknown".to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EventType::StateSnapshot => "StateSnapshot",
            EventType::ItemPurchased => "ItemPurchased",
            EventType::ItemDestroyed => "ItemDestroyed",
            EventType::SkillLevelUp => "SkillLevelUp",
            EventType::SkillUsed => "SkillUsed",
            EventType::WardPlaced => "WardPlaced",
            EventType::WardKilled => "WardKilled",
            EventType::ChampionKill => "ChampionKill",
            EventType::BuildingDestroyed => "BuildingDestroyed",
            EventType::EpicMonsterKill => "EpicMonsterKill",
            EventType::SummonerSpellUsed => "SummonerSpellUsed",
            EventType::ChannelingStarted => "ChannelingStarted",
            EventType::ChannelingEnded => "ChannelingEnded",
            EventType::Other(tag) => tag.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedEvent {
    pub game_time_ms: u64,
    pub event_type: EventType,
    pub details: Value,
}

pub fn classify(raw: RawEvent) -> ClassifiedEvent {
    let event_type = EventType::from_schema(raw.schema());
    ClassifiedEvent {
        game_time_ms: raw.game_time_ms,
        event_type,
        details: raw.fields,
    }
}
