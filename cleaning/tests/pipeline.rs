mod support;

use std::collections::BTreeSet;

use cleaning::{
    diagnostics::{Diagnostic, DropReason, RemovalReason},
    invariants,
    schema::SchemaProblem,
    CleanConfig, DemoCleaner, Diagnostics, Error, ParserConfig, Stage,
};
use common::Side;
use pretty_assertions::assert_eq;
use support::{realistic_match, regular_round, FRAMES_PER_ROUND};
use tracing_test::traced_test;

#[test]
#[traced_test]
fn cleans_realistic_match() {
    let mut record = realistic_match();
    let mut diagnostics = Diagnostics::new();
    cleaning::clean_record(&mut record, &CleanConfig::default(), &mut diagnostics);

    assert_eq!(16, record.game_rounds.len());
    assert_eq!(
        (1..=16).collect::<Vec<i64>>(),
        record.game_rounds.iter().map(|r| r.round_num).collect::<Vec<_>>()
    );
    assert_eq!(
        (0..16 * FRAMES_PER_ROUND as i64).collect::<Vec<_>>(),
        record.frames().map(|f| f.global_frame_id).collect::<Vec<_>>()
    );
    assert_eq!(Vec::<invariants::Violation>::new(), invariants::check(&record));

    let reasons: Vec<&DropReason> = diagnostics.dropped_rounds().map(|(_, _, r)| r).collect();
    assert_eq!(
        vec![
            &DropReason::NoFrames,
            &DropReason::Warmup,
            &DropReason::KnifeRound,
            &DropReason::BadEndReason("Draw".to_owned()),
            &DropReason::ScoreNotIncreasing {
                total: 15,
                next_total: 15,
            },
        ],
        reasons
    );
    assert_eq!(
        vec![(3, 99, RemovalReason::CoachAtOrigin)],
        diagnostics.removed_players().collect::<Vec<_>>()
    );
    assert!(logs_contain("Cleaned match"));
}

#[test]
fn cleaning_twice_changes_nothing() {
    let mut record = realistic_match();
    let mut diagnostics = Diagnostics::new();
    cleaning::clean_record(&mut record, &CleanConfig::default(), &mut diagnostics);

    let once = record.clone();
    let mut diagnostics = Diagnostics::new();
    cleaning::clean_record(&mut record, &CleanConfig::default(), &mut diagnostics);

    assert_eq!(once, record);
    assert_eq!(0, diagnostics.modifications());
}

#[test]
fn disabled_stages_do_not_run() {
    let mut record = realistic_match();
    let rounds_before = record.game_rounds.len();
    let config = CleanConfig::only([Stage::Warmup]);

    let mut diagnostics = Diagnostics::new();
    cleaning::clean_record(&mut record, &config, &mut diagnostics);

    assert_eq!(rounds_before - 1, record.game_rounds.len());
    assert_eq!(
        vec![Stage::Warmup],
        diagnostics
            .dropped_rounds()
            .map(|(_, stage, _)| stage)
            .collect::<Vec<_>>()
    );
    // Renumbering always runs.
    assert_eq!(Some(1), record.game_rounds.first().map(|r| r.round_num));
}

#[test]
fn operations_need_a_record() {
    let mut diagnostics = Diagnostics::new();
    let mut cleaner = DemoCleaner::new(ParserConfig::default(), CleanConfig::default(), &mut diagnostics);

    assert!(matches!(cleaner.clean(&mut diagnostics), Err(Error::MissingRecord)));
    assert!(matches!(cleaner.tables(), Err(Error::MissingRecord)));

    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        cleaner.write_json(&dir.path().join("out.json")),
        Err(Error::MissingRecord)
    ));
}

#[test]
fn invalid_parser_config_is_corrected() {
    let parser = ParserConfig {
        parse_rate: 0,
        trade_time: -2,
        buy_style: "faceit".to_owned(),
        ..Default::default()
    };

    let mut diagnostics = Diagnostics::new();
    let cleaner = DemoCleaner::new(parser, CleanConfig::default(), &mut diagnostics);

    assert_eq!(128, cleaner.parser_config().parse_rate);
    assert_eq!(5, cleaner.parser_config().trade_time);
    assert_eq!("hltv", cleaner.parser_config().buy_style);
    assert_eq!(3, diagnostics.len());
    assert!(diagnostics
        .entries()
        .iter()
        .all(|d| matches!(d, Diagnostic::ConfigCorrected(_))));
}

#[test]
fn frames_not_parsed_skips_frame_stages() {
    let parser = ParserConfig {
        parse_frames: false,
        ..Default::default()
    };

    let mut diagnostics = Diagnostics::new();
    let mut cleaner = DemoCleaner::new(parser, CleanConfig::default(), &mut diagnostics);
    assert!(!cleaner.clean_config().frames_parsed);

    let mut empty = regular_round(1);
    empty.frames.clear();
    cleaner.set_record(support::match_record("de_nuke", vec![empty, regular_round(2)]));
    cleaner.clean(&mut diagnostics).unwrap();

    let skipped: BTreeSet<Stage> = diagnostics
        .entries()
        .iter()
        .filter_map(|d| match d {
            Diagnostic::StageSkipped { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(BTreeSet::from([Stage::NoFrames, Stage::ExcessPlayers]), skipped);
}

#[test]
fn write_then_read_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cleaned.json");

    let parser = ParserConfig {
        json_indentation: true,
        ..Default::default()
    };
    let mut diagnostics = Diagnostics::new();
    let mut cleaner = DemoCleaner::new(parser, CleanConfig::default(), &mut diagnostics);

    let mut record = realistic_match();
    record
        .extra
        .insert("serverName".to_owned(), serde_json::json!("Valve CS:GO EU West"));
    cleaner.set_record(record);
    cleaner.clean(&mut diagnostics).unwrap();
    cleaner.write_json(&path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\n  \"matchID\""));

    let mut reread = DemoCleaner::new(ParserConfig::default(), CleanConfig::default(), &mut diagnostics);
    let mut diagnostics = Diagnostics::new();
    let loaded = reread.read_json(&path, &mut diagnostics).unwrap();

    assert_eq!(cleaner.record(), Some(loaded));
    assert_eq!(
        Some(&serde_json::json!("Valve CS:GO EU West")),
        loaded.extra.get("serverName")
    );
    assert!(diagnostics.is_empty());
}

#[test]
#[traced_test]
fn schema_problems_are_reported_not_fatal() {
    let document = serde_json::json!({
        "matchID": "partial",
        "mapName": "de_nuke",
        "gameRounds": [{
            "roundNum": 1,
            "isWarmup": false,
            "frames": null,
            "kills": null
        }]
    });

    let mut diagnostics = Diagnostics::new();
    let mut cleaner = DemoCleaner::new(ParserConfig::default(), CleanConfig::default(), &mut diagnostics);
    let record = cleaner.load_value(document, &mut diagnostics).unwrap();

    assert_eq!(1, record.game_rounds.len());
    assert!(record.game_rounds[0].frames.is_empty());
    assert!(diagnostics
        .entries()
        .iter()
        .any(|d| matches!(d, Diagnostic::Schema(w) if w.path == "/tickRate")));
    assert!(logs_contain("does not have correct fields"));
}

#[test]
#[traced_test]
fn incomplete_players_still_load() {
    let player = |id: u64| serde_json::json!({ "steamID": id, "x": 1.0, "y": 2.0, "z": 3.0, "isAlive": true });
    let document = serde_json::json!({
        "matchID": "incomplete",
        "mapName": "de_nuke",
        "tickRate": 128,
        "gameRounds": [
            {
                "roundNum": 1,
                "frames": [{
                    "tick": 10,
                    "t": { "players": [
                        { "steamID": 1, "side": "T", "x": "far", "y": 2.0, "z": 3.0, "isAlive": true },
                        { "side": "T", "x": 1.0, "y": 2.0, "z": 3.0, "isAlive": true }
                    ] },
                    "ct": { "players": [player(6)] }
                }]
            },
            {
                "roundNum": 2,
                "kills": [{ "attackerSteamID": "nobody", "weapon": "AK-47" }]
            }
        ]
    });

    let mut diagnostics = Diagnostics::new();
    let mut cleaner = DemoCleaner::new(ParserConfig::default(), CleanConfig::default(), &mut diagnostics);
    let record = cleaner.load_value(document, &mut diagnostics).unwrap();

    assert_eq!(vec![1], record.game_rounds.iter().map(|r| r.round_num).collect::<Vec<_>>());
    let frame = &record.game_rounds[0].frames[0];
    assert_eq!(vec![1], frame.t.players.iter().map(|p| p.steam_id).collect::<Vec<_>>());
    assert_eq!(0.0, frame.t.players[0].x);
    assert_eq!(Side::CT, frame.ct.players[0].side);
    assert_eq!(Some((Side::CT, &frame.ct.players[0])), frame.find_player(6));

    let schema_paths: Vec<&str> = diagnostics
        .entries()
        .iter()
        .filter_map(|d| match d {
            Diagnostic::Schema(w) => Some(w.path.as_str()),
            _ => None,
        })
        .collect();
    assert!(schema_paths.contains(&"/gameRounds/0/frames/0/ct/players/0/side"));
    assert!(schema_paths.contains(&"/gameRounds/0/frames/0/t/players/1/steamID"));
    assert!(schema_paths.contains(&"/gameRounds/0/frames/0/t/players/0/x"));
    assert!(diagnostics.entries().iter().any(|d| matches!(
        d,
        Diagnostic::Schema(w) if w.path == "/gameRounds/1"
            && matches!(w.problem, SchemaProblem::Unreadable { .. })
    )));
    assert!(logs_contain("Dropped player without a steam id"));
}

#[test]
fn malformed_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"matchID\": ").unwrap();

    let mut diagnostics = Diagnostics::new();
    let mut cleaner = DemoCleaner::new(ParserConfig::default(), CleanConfig::default(), &mut diagnostics);

    assert!(matches!(
        cleaner.read_json(&path, &mut diagnostics),
        Err(Error::Json(_))
    ));
    assert!(matches!(
        cleaner.read_json(&dir.path().join("missing.json"), &mut diagnostics),
        Err(Error::Io(_))
    ));
}

#[test]
fn tables_follow_cleaned_record() {
    let mut diagnostics = Diagnostics::new();
    let mut cleaner = DemoCleaner::new(ParserConfig::default(), CleanConfig::default(), &mut diagnostics);
    cleaner.set_record(realistic_match());
    cleaner.clean(&mut diagnostics).unwrap();

    let tables = cleaner.tables().unwrap();

    assert_eq!("test-match", tables.match_id);
    assert_eq!("GOTV Demo", tables.client_name);
    assert_eq!("de_dust2", tables.map_name);
    assert_eq!(128, tables.tick_rate);
    assert_eq!(200_000, tables.playback_ticks);
    assert_eq!(16, tables.rounds.len());
    assert_eq!(16, tables.kills.len());
    assert_eq!(16 * FRAMES_PER_ROUND, tables.frames.len());
    assert_eq!(16 * FRAMES_PER_ROUND * 10, tables.player_frames.len());
    assert!(tables.rounds.iter().all(|r| r.match_id == "test-match"));
    assert!(tables
        .player_frames
        .iter()
        .all(|p| p.side == Side::T || p.side == Side::CT));

    let named = tables.named().unwrap();
    assert_eq!(
        vec![
            "match",
            "rounds",
            "kills",
            "damages",
            "grenades",
            "flashes",
            "weaponFires",
            "bombEvents",
            "frames",
            "playerFrames"
        ],
        named.iter().map(|(name, _)| *name).collect::<Vec<_>>()
    );

    assert_eq!(serde_json::json!(128), named[0].1["tickRate"]);
    assert_eq!(serde_json::json!("GOTV Demo"), named[0].1["clientName"]);

    let first_kill = &named[2].1[0];
    assert_eq!(serde_json::json!(1), first_kill["roundNum"]);
    assert_eq!(serde_json::json!("de_dust2"), first_kill["mapName"]);
    assert_eq!(serde_json::json!(1), first_kill["attackerSteamID"]);
}
