use std::path::PathBuf;

use anyhow::{Context, anyhow};
use telemetry_timeline::config::TimelineConfig;
use telemetry_timeline::model::{BLUE_TEAM, Frame, RED_TEAM};
use telemetry_timeline::playback::PlaybackSession;
use telemetry_timeline::timeline::TimelineAssembler;

const USAGE: &str = "usage: timeline_inspect <log.jsonl> [--at SECONDS]";

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<(PathBuf, Option<f64>)> {
    let path = args.next().map(PathBuf::from).ok_or_else(|| anyhow!(USAGE))?;
    let mut at: Option<f64> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--at" => {
                let raw = args.next().context("--at needs a value")?;
                at = Some(raw.parse().with_context(|| format!("invalid --at value '{raw}'"))?);
            }
            other => anyhow::bail!("unknown argument '{other}'\n{USAGE}"),
        }
    }
    Ok((path, at))
}

fn event_labels(frame: &Frame) -> String {
    if frame.events.is_empty() {
        return "none".to_string();
    }
    frame
        .events
        .iter()
        .map(|event| event.event_type.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let (path, at) = parse_args(std::env::args().skip(1))?;

    let config = TimelineConfig::from_env();
    let mut last_decile = 0u32;
    let timeline = TimelineAssembler::new(config)
        .with_progress(|fraction| {
            let decile = (fraction * 10.0).floor() as u32;
            if decile > last_decile {
                last_decile = decile;
                tracing::debug!("read {:.0}%", fraction * 100.0);
            }
        })
        .assemble_file(&path)
        .with_context(|| format!("assembling {}", path.display()))?;

    let meta = &timeline.metadata;
    println!("Game: {} ({}, {})", meta.game_id, meta.game_mode, meta.platform_id);
    println!("Duration: {}s, frames: {}", timeline.duration_secs(), timeline.frames.len());
    println!("Wards: {}, kills: {}", timeline.wards.len(), timeline.kills.len());
    for p in &meta.participants {
        println!(
            "  #{:<2} team {} {:<16} {}",
            p.participant_id, p.team_id, p.summoner_name, p.champion_name
        );
    }

    let Some(at) = at else {
        return Ok(());
    };
    let mut session = PlaybackSession::new(timeline, &config);
    let Some(view) = session.view_at(at) else {
        return Err(anyhow!("no frame near {at}s"));
    };

    println!();
    println!("Frame {}s", view.frame.timestamp_sec);
    match view.frame.snapshot.as_ref() {
        Some(_) => {
            for p in view.frame.participants() {
                println!(
                    "  #{:<2} {:<12} {}/{}/{}  gold {:.0}",
                    p.participant_id, p.champion_name, p.kills, p.deaths, p.assists, p.total_gold
                );
            }
        }
        None => println!("  (no snapshot yet)"),
    }
    println!("  events: {}", event_labels(view.frame));
    println!(
        "  wards active: {}, channels: {}, recent kills: {}",
        view.frame.active_wards.len(),
        view.frame.active_channels.len(),
        view.frame.recent_kills.len()
    );

    let summary = view.field.summary();
    println!(
        "  field: blue leads {} cells, red leads {} cells, {} even",
        summary.blue_cells, summary.red_cells, summary.contested_cells
    );
    println!(
        "  invasions: team {} x{}, team {} x{}",
        BLUE_TEAM,
        view.blue_invasions.len(),
        RED_TEAM,
        view.red_invasions.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_timeline::assemble_timeline;

    fn args(list: &[&str]) -> std::vec::IntoIter<String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn reads_path_and_optional_time() {
        let (path, at) = parse_args(args(&["match.jsonl", "--at", "42.5"])).expect("valid");
        assert_eq!(path, PathBuf::from("match.jsonl"));
        assert_eq!(at, Some(42.5));

        let (_, at) = parse_args(args(&["match.jsonl"])).expect("valid");
        assert_eq!(at, None);
    }

    #[test]
    fn rejects_unknown_or_incomplete_arguments() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["match.jsonl", "--a", "42"])).is_err());
        assert!(parse_args(args(&["match.jsonl", "--at"])).is_err());
        assert!(parse_args(args(&["match.jsonl", "--at", "soon"])).is_err());
    }

    #[test]
    fn frame_events_are_listed_by_label() {
        let log = [
            r#"{"rfc461Schema":"stats_update","gameTime":0,"participants":[{"participantID":1,"teamID":100}]}"#,
            r#"{"rfc461Schema":"champion_kill","gameTime":2000,"killer":1,"victim":1}"#,
            r#"{"rfc461Schema":"turret_plate_destroyed","gameTime":2500}"#,
        ]
        .join("\n");
        let timeline = assemble_timeline(&log).expect("assembles");
        let frame = timeline.frame(2).expect("frame 2");
        assert_eq!(event_labels(frame), "ChampionKill, turret_plate_destroyed");
        assert_eq!(event_labels(timeline.frame(1).expect("frame 1")), "none");
    }
}
