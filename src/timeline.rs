use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use serde::Serialize;

use crate::classify::{ClassifiedEvent, EventType, classify};
use crate::config::TimelineConfig;
use crate::error::{TimelineError, TimelineResult};
use crate::model::{Frame, KillEvent, MatchMetadata, Participant, Ward, ms_to_second};
use crate::parse::{
    parse_channel, parse_kill, parse_line, parse_metadata, parse_snapshot, parse_ward_destruction,
    parse_ward_placement,
};
use crate::reconstruct::Reconstructor;
use crate::wards::{WardDestruction, WardPlacement, active_wards_at, resolve_ward_lifecycles};
use crate::windows::{ChannelEvent, ChannelIndex, active_channels_at, recent_kills_at};

/// The fully assembled match: metadata plus one frame per second from 0 to the end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub metadata: MatchMetadata,
    pub frames: Vec<Frame>,
    pub wards: Vec<Ward>,
    pub kills: Vec<KillEvent>,
    #[serde(skip)]
    pub channel_index: ChannelIndex,
}

impl Timeline {
    pub fn frame(&self, second: u32) -> Option<&Frame> {
        self.frames.get(second as usize)
    }

    pub fn duration_secs(&self) -> u32 {
        self.metadata.duration_secs
    }
}

#[derive(Default)]
struct LogDigest {
    metadata: Option<MatchMetadata>,
    buckets: BTreeMap<u32, Vec<ClassifiedEvent>>,
    placements: Vec<WardPlacement>,
    destructions: Vec<WardDestruction>,
    channels: Vec<ChannelEvent>,
    kills: Vec<KillEvent>,
    max_time_ms: u64,
    usable: usize,
    skipped: usize,
}

impl LogDigest {
    fn ingest(&mut self, line: &str) {
        let raw = match parse_line(line) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::trace!(error = %err, "skipping unparseable telemetry line");
                self.skipped += 1;
                return;
            }
        };
        self.usable += 1;

        let event = classify(raw);
        self.max_time_ms = self.max_time_ms.max(event.game_time_ms);

        match event.event_type {
            EventType::StateSnapshot if self.metadata.is_none() => {
                self.metadata = parse_metadata(&event.details);
            }
            EventType::WardPlaced => self.placements.push(parse_ward_placement(&event)),
            EventType::WardKilled => self.destructions.push(parse_ward_destruction(&event)),
            EventType::ChannelingStarted | EventType::ChannelingEnded => {
                if let Some(channel) = parse_channel(&event) {
                    self.channels.push(channel);
                }
            }
            EventType::ChampionKill => self.kills.push(parse_kill(&event)),
            _ => {}
        }

        self.buckets
            .entry(ms_to_second(event.game_time_ms))
            .or_default()
            .push(event);
    }
}

pub struct TimelineAssembler<'a> {
    config: TimelineConfig,
    on_progress: Box<dyn FnMut(f64) + 'a>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> TimelineAssembler<'a> {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            on_progress: Box::new(|_| {}),
            cancel: None,
        }
    }

    /// Called after every chunk with the fraction of lines read so far.
    pub fn with_progress(mut self, on_progress: impl FnMut(f64) + 'a) -> Self {
        self.on_progress = Box::new(on_progress);
        self
    }

    /// Checked before each chunk; once set, assembly stops with [`TimelineError::Cancelled`].
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn assemble_file(&mut self, path: &Path) -> TimelineResult<Timeline> {
        let text = fs::read_to_string(path).map_err(|source| TimelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.assemble_str(&text)
    }

    pub fn assemble_str(&mut self, text: &str) -> TimelineResult<Timeline> {
        let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
        if lines.is_empty() {
            return Err(TimelineError::no_data("telemetry log has no records"));
        }

        let total = lines.len();
        let mut processed = 0usize;
        let mut digest = LogDigest::default();
        for chunk in lines.chunks(self.config.chunk_size.max(1)) {
            self.check_cancelled(processed)?;
            for line in chunk {
                digest.ingest(line);
            }
            processed += chunk.len();
            (self.on_progress)(processed as f64 / total as f64);
        }

        if digest.usable == 0 {
            return Err(TimelineError::no_data(format!(
                "none of the {total} telemetry lines could be parsed"
            )));
        }
        let Some(metadata) = digest.metadata.take() else {
            return Err(TimelineError::no_data(
                "no snapshot record carried a participant roster",
            ));
        };
        self.check_cancelled(processed)?;

        Ok(self.build(metadata, digest))
    }

    fn check_cancelled(&self, processed_lines: usize) -> TimelineResult<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                Err(TimelineError::Cancelled { processed_lines })
            }
            _ => Ok(()),
        }
    }

    fn build(&self, mut metadata: MatchMetadata, digest: LogDigest) -> Timeline {
        let LogDigest {
            mut buckets,
            placements,
            destructions,
            channels,
            kills,
            max_time_ms,
            skipped,
            ..
        } = digest;

        let end_sec = ms_to_second(max_time_ms);
        let roster: HashMap<u32, Participant> = metadata
            .participants
            .iter()
            .map(|p| (p.participant_id, p.clone()))
            .collect();
        let wards = resolve_ward_lifecycles(&placements, &destructions, &roster);

        let mut reconstructor = Reconstructor::new();
        reconstructor.register_roster(&metadata.participants);

        let mut frames = Vec::with_capacity(end_sec as usize + 1);
        for second in 0..=end_sec {
            let events = buckets.remove(&second).unwrap_or_default();
            for event in &events {
                if event.event_type == EventType::ChampionKill {
                    reconstructor.apply_kill(&parse_kill(event));
                }
            }
            // Several snapshots in one second: the last one in log order wins.
            if let Some(snapshot) = events
                .iter()
                .rev()
                .find(|event| event.event_type == EventType::StateSnapshot)
            {
                reconstructor.observe_snapshot(parse_snapshot(snapshot));
            }

            frames.push(reconstructor.build_frame(
                second,
                events,
                active_wards_at(&wards, second),
                active_channels_at(&channels, second),
                recent_kills_at(&kills, second, self.config.kill_window_secs),
            ));
        }

        metadata.duration_secs = end_sec;
        tracing::info!(
            game_id = %metadata.game_id,
            frames = frames.len(),
            wards = wards.len(),
            kills = kills.len(),
            skipped_lines = skipped,
            "timeline assembled"
        );

        Timeline {
            metadata,
            frames,
            wards,
            channel_index: ChannelIndex::build(&channels),
            kills,
        }
    }
}

pub fn assemble_timeline(text: &str) -> TimelineResult<Timeline> {
    TimelineAssembler::new(TimelineConfig::default()).assemble_str(text)
}

#[derive(Debug)]
pub enum AssemblyUpdate {
    Progress(f64),
    Finished(Box<TimelineResult<Timeline>>),
}

/// Runs an assembly on its own thread, streaming progress and the final result.
pub fn spawn_assembly(
    text: String,
    config: TimelineConfig,
    cancel: Arc<AtomicBool>,
) -> Receiver<AssemblyUpdate> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let progress_tx = tx.clone();
        let result = TimelineAssembler::new(config)
            .with_progress(move |fraction| {
                let _ = progress_tx.send(AssemblyUpdate::Progress(fraction));
            })
            .with_cancel_flag(cancel)
            .assemble_str(&text);
        let _ = tx.send(AssemblyUpdate::Finished(Box::new(result)));
    });
    rx
}
