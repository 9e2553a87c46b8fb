use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use telemetry_timeline::classify::EventType;
use telemetry_timeline::config::TimelineConfig;
use telemetry_timeline::model::{KillEvent, Participant, Position};
use telemetry_timeline::reconstruct::{CombatCounters, Reconstructor};
use telemetry_timeline::timeline::{AssemblyUpdate, TimelineAssembler, spawn_assembly};
use telemetry_timeline::{Timeline, TimelineError, assemble_timeline};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn sample_timeline() -> Timeline {
    assemble_timeline(&read_fixture("sample_match.jsonl")).expect("fixture should assemble")
}

fn kda(timeline: &Timeline, second: u32, participant_id: u32) -> (u32, u32, u32) {
    let p = timeline
        .frame(second)
        .and_then(|f| f.participant(participant_id))
        .expect("participant should be in frame");
    (p.kills, p.deaths, p.assists)
}

fn snapshot_line(game_time_ms: u64, ids: &[(u32, u32)]) -> String {
    let participants: Vec<String> = ids
        .iter()
        .map(|(id, team)| {
            format!(
                r#"{{"participantID":{id},"teamID":{team},"championName":"Champ{id}","position":{{"x":{x},"z":{x}}}}}"#,
                x = 1000 * id
            )
        })
        .collect();
    format!(
        r#"{{"rfc461Schema":"stats_update","gameTime":{game_time_ms},"gameID":1,"participants":[{}]}}"#,
        participants.join(",")
    )
}

#[test]
fn frames_are_dense_and_cover_the_whole_match() {
    let timeline = sample_timeline();
    assert_eq!(timeline.frames.len(), 61);
    for (idx, frame) in timeline.frames.iter().enumerate() {
        assert_eq!(frame.timestamp_sec as usize, idx);
    }
    assert_eq!(timeline.metadata.duration_secs, 60);
}

#[test]
fn metadata_comes_from_first_snapshot() {
    let timeline = sample_timeline();
    let meta = &timeline.metadata;
    assert_eq!(meta.game_id, "987654");
    assert_eq!(meta.platform_id, "EUW1");
    assert_eq!(meta.game_mode, "CLASSIC");
    assert_eq!(meta.participants.len(), 4);
    assert_eq!(meta.participants[1].summoner_name, "BLU Bravo");
    assert_eq!(meta.participants[2].team_id, 200);
}

#[test]
fn kill_counts_apply_from_the_kill_second() {
    let timeline = sample_timeline();
    assert_eq!(kda(&timeline, 4, 1), (0, 0, 0));
    assert_eq!(kda(&timeline, 5, 1), (1, 0, 0));
    assert_eq!(kda(&timeline, 5, 3), (0, 1, 0));
    assert_eq!(kda(&timeline, 5, 2), (0, 0, 1));
    assert_eq!(kda(&timeline, 45, 1), (1, 1, 0));
    assert_eq!(kda(&timeline, 45, 4), (1, 0, 0));
    assert_eq!(kda(&timeline, 45, 3), (0, 1, 1));
}

#[test]
fn counters_survive_a_stale_snapshot() {
    // The snapshot at 30s carries zeroed combat stats; live counters must win.
    let timeline = sample_timeline();
    assert_eq!(kda(&timeline, 30, 1), (1, 0, 0));
    assert_eq!(kda(&timeline, 30, 3), (0, 1, 0));
}

#[test]
fn combat_counters_never_decrease() {
    let timeline = sample_timeline();
    for id in 1..=4 {
        let mut prev = (0, 0, 0);
        for frame in &timeline.frames {
            let p = frame.participant(id).expect("participant present");
            let now = (p.kills, p.deaths, p.assists);
            assert!(now.0 >= prev.0 && now.1 >= prev.1 && now.2 >= prev.2);
            prev = now;
        }
    }
}

#[test]
fn snapshot_is_carried_forward_until_replaced() {
    let timeline = sample_timeline();
    let at = |second: u32| {
        timeline
            .frame(second)
            .and_then(|f| f.participant(1))
            .and_then(|p| p.position)
            .expect("position present")
    };
    assert_eq!(at(0).x, 600.0);
    assert_eq!(at(29).x, 600.0);
    assert_eq!(at(30).x, 7000.0);
    assert_eq!(at(60).x, 7000.0);

    let frame = timeline.frame(12).expect("frame 12");
    assert_eq!(frame.team_aggregates().len(), 2);
    assert_eq!(frame.participant(1).map(|p| p.items.len()), Some(1));
}

#[test]
fn frames_without_any_snapshot_carry_no_payload() {
    let log = [
        r#"{"rfc461Schema":"skill_used","gameTime":1000,"participantID":1}"#.to_string(),
        snapshot_line(3000, &[(1, 100), (2, 200)]),
    ]
    .join("\n");
    let timeline = assemble_timeline(&log).expect("assembles");
    assert_eq!(timeline.frames.len(), 4);
    assert!(timeline.frames[0].snapshot.is_none());
    assert!(timeline.frames[2].snapshot.is_none());
    assert!(timeline.frames[3].snapshot.is_some());
    assert!(timeline.frames[1].participants().is_empty());
}

#[test]
fn last_snapshot_in_a_second_wins() {
    let mut later = snapshot_line(2400, &[(1, 100), (2, 200)]);
    later = later.replace(r#""x":1000"#, r#""x":4321"#);
    let log = [snapshot_line(2100, &[(1, 100), (2, 200)]), later].join("\n");
    let timeline = assemble_timeline(&log).expect("assembles");
    let p = timeline.frames[2].participant(1).expect("participant");
    assert_eq!(p.position.map(|pos| pos.x), Some(4321.0));
}

#[test]
fn scenario_kill_at_five_seconds() {
    let log = [
        snapshot_line(0, &[(1, 100), (2, 200)]),
        r#"{"rfc461Schema":"champion_kill","gameTime":5000,"killer":1,"victim":2}"#.to_string(),
    ]
    .join("\n");
    let timeline = assemble_timeline(&log).expect("assembles");
    assert_eq!(timeline.frames.len(), 6);
    assert_eq!(kda(&timeline, 5, 1).0, 1);
    assert_eq!(kda(&timeline, 5, 2).1, 1);
    assert_eq!(kda(&timeline, 4, 1).0, 0);
}

#[test]
fn kills_by_unknown_participants_are_ignored() {
    let log = [
        snapshot_line(0, &[(1, 100), (2, 200)]),
        r#"{"rfc461Schema":"champion_kill","gameTime":1000,"killer":0,"victim":2,"assistants":[9]}"#
            .to_string(),
    ]
    .join("\n");
    let timeline = assemble_timeline(&log).expect("assembles");
    assert_eq!(kda(&timeline, 1, 1), (0, 0, 0));
    assert_eq!(kda(&timeline, 1, 2), (0, 1, 0));
}

#[test]
fn reconstructor_counts_only_roster_members() {
    let roster: Vec<Participant> = [(1, 100), (2, 200)]
        .into_iter()
        .map(|(id, team_id)| Participant {
            participant_id: id,
            summoner_name: format!("Player {id}"),
            team_id,
            champion_id: id,
            champion_name: format!("Champ{id}"),
        })
        .collect();
    let mut reconstructor = Reconstructor::new();
    reconstructor.register_roster(&roster);
    // A second roster is ignored once identities are fixed.
    reconstructor.register_roster(&[Participant {
        participant_id: 7,
        ..roster[0].clone()
    }]);

    reconstructor.apply_kill(&KillEvent {
        game_time_ms: 1_000,
        killer_id: 1,
        victim_id: 2,
        position: Position::default(),
        assist_ids: vec![7, 2],
    });
    assert_eq!(
        reconstructor.counters(1),
        Some(CombatCounters {
            kills: 1,
            deaths: 0,
            assists: 0
        })
    );
    assert_eq!(
        reconstructor.counters(2),
        Some(CombatCounters {
            kills: 0,
            deaths: 1,
            assists: 1
        })
    );
    assert_eq!(reconstructor.counters(7), None);
    assert!(reconstructor.current_snapshot().is_none());
}

#[test]
fn events_are_classified_into_their_frame() {
    let timeline = sample_timeline();
    let kinds = |second: u32| -> Vec<EventType> {
        timeline.frames[second as usize]
            .events
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    };
    assert_eq!(kinds(5), vec![EventType::ChampionKill]);
    assert_eq!(kinds(47), vec![EventType::BuildingDestroyed]);
    assert_eq!(kinds(60), vec![EventType::Other("queue_epic_monster".to_string())]);
    assert!(kinds(6).is_empty());
}

#[test]
fn malformed_lines_are_skipped() {
    let timeline = sample_timeline();
    let total_events: usize = timeline.frames.iter().map(|f| f.events.len()).sum();
    assert_eq!(total_events, 13);
}

#[test]
fn empty_input_is_no_data() {
    let err = assemble_timeline("\n   \n").expect_err("empty log must fail");
    assert!(matches!(err, TimelineError::NoData { .. }));

    let err = assemble_timeline("garbage\n{oops").expect_err("unparseable log must fail");
    assert!(matches!(err, TimelineError::NoData { .. }));
}

#[test]
fn log_without_roster_is_no_data() {
    let log = r#"{"rfc461Schema":"skill_used","gameTime":1000}"#;
    let err = assemble_timeline(log).expect_err("no snapshot means no metadata");
    assert!(matches!(err, TimelineError::NoData { .. }));
}

#[test]
fn missing_file_reports_io_error() {
    let err = TimelineAssembler::new(TimelineConfig::default())
        .assemble_file(&PathBuf::from("/definitely/not/here.jsonl"))
        .expect_err("missing file");
    match err {
        TimelineError::Io { path, .. } => assert!(path.ends_with("here.jsonl")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn progress_is_increasing_and_finishes_at_one() {
    let log = read_fixture("sample_match.jsonl");
    let config = TimelineConfig {
        chunk_size: 3,
        ..TimelineConfig::default()
    };
    let mut reports = Vec::new();
    TimelineAssembler::new(config)
        .with_progress(|fraction| reports.push(fraction))
        .assemble_str(&log)
        .expect("assembles");

    assert_eq!(reports.len(), 5);
    assert!(reports.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(reports.last().copied(), Some(1.0));
}

#[test]
fn cancelled_assembly_returns_no_partial_timeline() {
    let log = read_fixture("sample_match.jsonl");
    let cancel = Arc::new(AtomicBool::new(true));
    let err = TimelineAssembler::new(TimelineConfig::default())
        .with_cancel_flag(cancel)
        .assemble_str(&log)
        .expect_err("cancelled");
    assert!(matches!(err, TimelineError::Cancelled { processed_lines: 0 }));
}

#[test]
fn background_assembly_streams_progress_then_result() {
    let log = read_fixture("sample_match.jsonl");
    let rx = spawn_assembly(
        log,
        TimelineConfig {
            chunk_size: 4,
            ..TimelineConfig::default()
        },
        Arc::new(AtomicBool::new(false)),
    );

    let mut progress = Vec::new();
    let mut finished = None;
    for update in rx {
        match update {
            AssemblyUpdate::Progress(fraction) => progress.push(fraction),
            AssemblyUpdate::Finished(result) => finished = Some(*result),
        }
    }
    assert_eq!(progress.len(), 4);
    let timeline = finished.expect("finished").expect("assembled");
    assert_eq!(timeline.frames.len(), 61);
}
