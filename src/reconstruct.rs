use std::collections::BTreeMap;

use crate::classify::ClassifiedEvent;
use crate::model::{ChannelInterval, Frame, KillEvent, Participant, Snapshot, Ward};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatCounters {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

/// Carries the most recent full snapshot forward and overlays live kill/death/assist counts.
///
/// Counters exist only for roster members and are only ever incremented, so the values written
/// into frames never go down even while the rest of the carried snapshot is stale.
#[derive(Debug, Default)]
pub struct Reconstructor {
    counters: BTreeMap<u32, CombatCounters>,
    last_snapshot: Option<Snapshot>,
    roster_locked: bool,
}

impl Reconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds zeroed counters for the fixed roster. Later calls are ignored.
    pub fn register_roster(&mut self, roster: &[Participant]) {
        if self.roster_locked {
            return;
        }
        for participant in roster {
            self.counters
                .insert(participant.participant_id, CombatCounters::default());
        }
        self.roster_locked = true;
    }

    pub fn apply_kill(&mut self, kill: &KillEvent) {
        if let Some(killer) = self.counters.get_mut(&kill.killer_id) {
            killer.kills += 1;
        }
        if let Some(victim) = self.counters.get_mut(&kill.victim_id) {
            victim.deaths += 1;
        }
        for assist_id in &kill.assist_ids {
            if let Some(assistant) = self.counters.get_mut(assist_id) {
                assistant.assists += 1;
            }
        }
    }

    /// Replaces the carried snapshot; the reconstructor owns its copy from here on.
    pub fn observe_snapshot(&mut self, snapshot: Snapshot) {
        self.last_snapshot = Some(snapshot);
    }

    pub fn counters(&self, participant_id: u32) -> Option<CombatCounters> {
        self.counters.get(&participant_id).copied()
    }

    /// A fresh copy of the carried snapshot with live counters written over it.
    pub fn current_snapshot(&self) -> Option<Snapshot> {
        let mut snapshot = self.last_snapshot.clone()?;
        for participant in &mut snapshot.participants {
            if let Some(live) = self.counters.get(&participant.participant_id) {
                participant.kills = live.kills;
                participant.deaths = live.deaths;
                participant.assists = live.assists;
            }
        }
        Some(snapshot)
    }

    pub fn build_frame(
        &self,
        timestamp_sec: u32,
        events: Vec<ClassifiedEvent>,
        active_wards: Vec<Ward>,
        active_channels: Vec<ChannelInterval>,
        recent_kills: Vec<KillEvent>,
    ) -> Frame {
        Frame {
            timestamp_sec,
            snapshot: self.current_snapshot(),
            events,
            active_wards,
            active_channels,
            recent_kills,
        }
    }
}
