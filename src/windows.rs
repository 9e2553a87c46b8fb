use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{ChannelInterval, KillEvent, ms_to_second};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelPhase {
    Started,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEvent {
    pub game_time_ms: u64,
    pub participant_id: u32,
    pub phase: ChannelPhase,
    pub channeling_type: String,
}

impl ChannelEvent {
    pub fn second(&self) -> u32 {
        ms_to_second(self.game_time_ms)
    }

    fn open_interval(&self) -> ChannelInterval {
        ChannelInterval {
            game_time_ms: self.game_time_ms,
            participant_id: self.participant_id,
            channeling_type: self.channeling_type.clone(),
            active: true,
        }
    }
}

/// Kills whose second lies in `[second - window_secs, second]`, in log order.
pub fn recent_kills_at(kills: &[KillEvent], second: u32, window_secs: u32) -> Vec<KillEvent> {
    let earliest = second.saturating_sub(window_secs);
    kills
        .iter()
        .filter(|kill| {
            let at = kill.second();
            at >= earliest && at <= second
        })
        .cloned()
        .collect()
}

/// Replays every channel event up to `second`. Linear in the history, so only meant for the
/// single assembly pass; use [`ChannelIndex`] for random access.
pub fn active_channels_at(events: &[ChannelEvent], second: u32) -> Vec<ChannelInterval> {
    let mut open: BTreeMap<u32, &ChannelEvent> = BTreeMap::new();
    for event in events {
        if event.second() > second {
            continue;
        }
        match event.phase {
            ChannelPhase::Started => {
                open.insert(event.participant_id, event);
            }
            ChannelPhase::Ended => {
                open.remove(&event.participant_id);
            }
        }
    }
    open.values().map(|event| event.open_interval()).collect()
}

/// Per-participant channel transitions sorted by second, answering point queries with a
/// binary search instead of a replay.
#[derive(Debug, Clone, Default)]
pub struct ChannelIndex {
    transitions: BTreeMap<u32, Vec<(u32, Option<ChannelInterval>)>>,
}

impl ChannelIndex {
    pub fn build(events: &[ChannelEvent]) -> Self {
        let mut grouped: HashMap<u32, Vec<&ChannelEvent>> = HashMap::new();
        for event in events {
            grouped.entry(event.participant_id).or_default().push(event);
        }

        let transitions = grouped
            .into_iter()
            .map(|(participant_id, mut history)| {
                // Stable, so same-second events keep their log order.
                history.sort_by_key(|event| event.second());
                let steps = history
                    .into_iter()
                    .map(|event| {
                        let state = match event.phase {
                            ChannelPhase::Started => Some(event.open_interval()),
                            ChannelPhase::Ended => None,
                        };
                        (event.second(), state)
                    })
                    .collect();
                (participant_id, steps)
            })
            .collect();

        Self { transitions }
    }

    pub fn active_at(&self, second: u32) -> Vec<ChannelInterval> {
        self.transitions
            .values()
            .filter_map(|steps| {
                let upto = steps.partition_point(|(at, _)| *at <= second);
                let (_, state) = steps.get(upto.checked_sub(1)?)?;
                state.clone()
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
