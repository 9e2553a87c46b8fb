use std::collections::HashMap;

use telemetry_timeline::assemble_timeline;
use telemetry_timeline::model::{Participant, Position, Ward, WardExpiry, WardType};
use telemetry_timeline::wards::{
    WardDestruction, WardPlacement, active_wards_at, resolve_ward_lifecycles,
};

fn roster() -> HashMap<u32, Participant> {
    [(1, 100), (2, 100), (6, 200)]
        .into_iter()
        .map(|(id, team_id)| {
            (
                id,
                Participant {
                    participant_id: id,
                    summoner_name: format!("Player {id}"),
                    team_id,
                    champion_id: id * 10,
                    champion_name: format!("Champ{id}"),
                },
            )
        })
        .collect()
}

fn placed(ms: u64, placer_id: u32, ward_type: &str, x: f64, z: f64) -> WardPlacement {
    WardPlacement {
        game_time_ms: ms,
        placer_id,
        position: Some(Position::new(x, z)),
        ward_type: ward_type.to_string(),
    }
}

fn killed(ms: u64, at: Option<(f64, f64)>) -> WardDestruction {
    WardDestruction {
        game_time_ms: ms,
        position: at.map(|(x, z)| Position::new(x, z)),
    }
}

fn active_ids(wards: &[Ward], second: u32) -> Vec<String> {
    active_wards_at(wards, second)
        .into_iter()
        .map(|ward| ward.id)
        .collect()
}

#[test]
fn yellow_trinket_lives_for_two_minutes() {
    let wards = resolve_ward_lifecycles(
        &[placed(10_000, 1, "yellowTrinket", 1000.0, 1000.0)],
        &[],
        &roster(),
    );
    assert_eq!(wards.len(), 1);
    assert_eq!(wards[0].expires_at, WardExpiry::At(130));
    assert_eq!(active_ids(&wards, 9), Vec::<String>::new());
    assert_eq!(active_ids(&wards, 10), vec!["ward-10000-1".to_string()]);
    assert_eq!(active_ids(&wards, 129).len(), 1);
    assert!(active_ids(&wards, 130).is_empty());
}

#[test]
fn destruction_ends_the_nearest_ward_early() {
    let wards = resolve_ward_lifecycles(
        &[
            placed(10_000, 1, "yellowTrinket", 3000.0, 3000.0),
            placed(11_000, 2, "yellowTrinket", 6000.0, 6000.0),
        ],
        &[killed(40_000, Some((3010.0, 2990.0)))],
        &roster(),
    );
    assert_eq!(wards[0].expires_at, WardExpiry::At(40));
    assert_eq!(wards[1].expires_at, WardExpiry::At(131));
    assert!(wards[0].is_active_at(39));
    assert!(!wards[0].is_active_at(40));
}

#[test]
fn control_wards_never_expire_on_their_own() {
    let wards = resolve_ward_lifecycles(
        &[placed(5_000, 6, "controlWard", 9000.0, 9000.0)],
        &[],
        &roster(),
    );
    assert_eq!(wards[0].ward_type, WardType::Control);
    assert_eq!(wards[0].expires_at, WardExpiry::Never);
    assert_eq!(wards[0].team_id, 200);
    assert!(wards[0].is_active_at(u32::MAX - 1));
}

#[test]
fn unmatched_destructions_are_discarded() {
    let wards = resolve_ward_lifecycles(
        &[placed(60_000, 1, "sightWard", 2000.0, 2000.0)],
        &[
            // Before the ward exists.
            killed(30_000, Some((2000.0, 2000.0))),
            // No position to match on.
            killed(61_000, None),
            // After the ward already expired on its own.
            killed(70_000, Some((2000.0, 2000.0))),
        ],
        &roster(),
    );
    assert_eq!(wards.len(), 1);
    assert_eq!(wards[0].expires_at, WardExpiry::At(67));
}

#[test]
fn a_ward_is_destroyed_at_most_once() {
    let wards = resolve_ward_lifecycles(
        &[
            placed(1_000, 1, "control", 4000.0, 4000.0),
            placed(2_000, 2, "control", 8000.0, 8000.0),
        ],
        &[
            killed(20_000, Some((4000.0, 4000.0))),
            killed(25_000, Some((4000.0, 4000.0))),
        ],
        &roster(),
    );
    assert_eq!(wards[0].expires_at, WardExpiry::At(20));
    // The second destruction falls through to the only remaining live ward.
    assert_eq!(wards[1].expires_at, WardExpiry::At(25));
}

#[test]
fn equidistant_wards_resolve_to_the_earliest_placement() {
    let wards = resolve_ward_lifecycles(
        &[
            placed(2_000, 2, "control", 5000.0, 6000.0),
            placed(1_000, 1, "control", 5000.0, 4000.0),
        ],
        &[killed(10_000, Some((5000.0, 5000.0)))],
        &roster(),
    );
    let by_id = |id: &str| {
        wards
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.expires_at)
            .expect("ward present")
    };
    assert_eq!(by_id("ward-1000-1"), WardExpiry::At(10));
    assert_eq!(by_id("ward-2000-2"), WardExpiry::Never);
}

#[test]
fn unknown_placer_defaults_to_red_side() {
    let wards = resolve_ward_lifecycles(
        &[placed(1_000, 42, "yellowTrinket", 1.0, 1.0)],
        &[],
        &roster(),
    );
    assert_eq!(wards[0].team_id, 200);
}

#[test]
fn ward_type_normalization() {
    assert_eq!(WardType::normalize("controlWard"), WardType::Control);
    assert_eq!(WardType::normalize("PINK"), WardType::Control);
    assert_eq!(WardType::normalize("jammerDevice"), WardType::Control);
    assert_eq!(WardType::normalize("blueTrinket"), WardType::BlueTrinket);
    assert_eq!(WardType::normalize("farsightAlteration"), WardType::BlueTrinket);
    assert_eq!(WardType::normalize("sightWard"), WardType::Sight);
    assert_eq!(WardType::normalize("yellowTrinket"), WardType::YellowTrinket);
    assert_eq!(WardType::normalize("teemoMushroom"), WardType::YellowTrinket);
    assert_eq!(WardType::normalize(""), WardType::YellowTrinket);
}

#[test]
fn fixture_ward_lifecycles() {
    let text = std::fs::read_to_string(
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_match.jsonl"),
    )
    .expect("fixture readable");
    let timeline = assemble_timeline(&text).expect("assembles");
    assert_eq!(timeline.wards.len(), 3);

    let count = |second: u32| {
        timeline
            .frame(second)
            .map(|f| f.active_wards.len())
            .expect("frame present")
    };
    assert_eq!(count(9), 0);
    assert_eq!(count(10), 1);
    assert_eq!(count(15), 3);
    assert_eq!(count(21), 3);
    assert_eq!(count(22), 2);
    assert_eq!(count(39), 2);
    assert_eq!(count(40), 1);
    assert_eq!(count(60), 1);

    let frame = timeline.frame(60).expect("last frame");
    assert_eq!(frame.active_wards[0].ward_type, WardType::Control);
    assert_eq!(frame.active_wards[0].team_id, 200);
}
