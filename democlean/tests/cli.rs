use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use clap::Parser;
use cleaning::Stage;
use common::{FrameRecord, MatchRecord, PlayerState, Position, RosterEntry, RoundRecord, Side};
use democlean::{Cli, Command};
use pretty_assertions::assert_eq;

fn five(first: u64, side: Side, frame: usize) -> Vec<PlayerState> {
    (first..first + 5)
        .map(|id| {
            PlayerState::new(
                id,
                format!("p{}", id),
                side,
                Position::new(id as f64 * 10.0, frame as f64 * 5.0, 0.0),
            )
        })
        .collect()
}

fn round(n: i64, reason: &str) -> RoundRecord {
    let mut round = RoundRecord {
        round_num: n,
        start_tick: n * 1000,
        freeze_time_end_tick: n * 1000 + 10,
        end_tick: n * 1000 + 500,
        end_official_tick: n * 1000 + 600,
        t_score: n - 1,
        end_t_score: n,
        round_end_reason: reason.to_owned(),
        frames: (0..2)
            .map(|f| FrameRecord::new(n * 1000 + 20 + f as i64, five(1, Side::T, f), five(6, Side::CT, f)))
            .collect(),
        ..Default::default()
    };
    round.t_side.players = (1..=5).map(|id| RosterEntry::new(id, format!("p{}", id))).collect();
    round.ct_side.players = (6..=10).map(|id| RosterEntry::new(id, format!("p{}", id))).collect();
    round
}

fn write_match(dir: &Path) -> PathBuf {
    let record = MatchRecord {
        match_id: "cli-match".to_owned(),
        map_name: "de_dust2".to_owned(),
        tick_rate: 128,
        game_rounds: vec![round(1, "TerroristsWin"), round(2, "Draw"), round(2, "TargetBombed")],
        ..Default::default()
    };

    let path = dir.join("cli-match.json");
    std::fs::write(&path, serde_json::to_vec(&record).unwrap()).unwrap();
    path
}

#[test]
fn parse_clean_arguments() {
    let cli = Cli::try_parse_from([
        "democlean",
        "-vv",
        "clean",
        "match.json",
        "--skip",
        "knife",
        "--skip",
        "bad-scoring",
        "--bad-end-reason",
        "Draw",
        "--tables",
        "out/",
    ])
    .unwrap();

    assert_eq!(tracing::Level::TRACE, cli.log_level());
    match cli.command {
        Command::Clean {
            input,
            output,
            cleaning,
        } => {
            assert_eq!(PathBuf::from("match.json"), input);
            assert_eq!(None, output);
            assert_eq!(vec![Stage::Knife, Stage::BadScoring], cleaning.skip);
            assert_eq!(Some(PathBuf::from("out/")), cleaning.tables);

            let config = cleaning.clean_config();
            assert!(!config.is_enabled(Stage::Knife));
            assert!(config.is_enabled(Stage::Warmup));
            assert_eq!(vec!["Draw".to_owned()], config.bad_end_reasons);
        }
        other => panic!("expected clean, got {:?}", other),
    }
}

#[test]
fn unknown_stage_is_rejected() {
    let result = Cli::try_parse_from(["democlean", "clean", "match.json", "--skip", "everything"]);
    assert!(result.is_err());
}

#[test]
fn parse_decoder_arguments() {
    let cli = Cli::try_parse_from([
        "democlean",
        "parse",
        "final.dem",
        "--decoder",
        "go",
        "--decoder-arg",
        "run",
        "--decoder-arg",
        "parse_demo.go",
        "--parse-rate=-4",
        "--buy-style",
        "csgo",
        "--no-clean",
    ])
    .unwrap();

    assert_eq!(tracing::Level::INFO, cli.log_level());
    match cli.command {
        Command::Parse {
            demo,
            decoder_args,
            parse_rate,
            trade_time,
            buy_style,
            out,
            no_clean,
            no_frames,
            ..
        } => {
            assert_eq!(PathBuf::from("final.dem"), demo);
            assert_eq!(vec!["run".to_owned(), "parse_demo.go".to_owned()], decoder_args);
            assert_eq!(-4, parse_rate);
            assert_eq!(5, trade_time);
            assert_eq!("csgo", buy_style);
            assert_eq!(PathBuf::from("."), out);
            assert!(no_clean);
            assert!(!no_frames);
        }
        other => panic!("expected parse, got {:?}", other),
    }
}

#[test]
fn default_output_name() {
    assert_eq!(
        PathBuf::from("/data/match.clean.json"),
        democlean::default_output(Path::new("/data/match.json"))
    );
}

#[test]
fn clean_writes_record_and_tables() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_match(dir.path());
    let tables_dir = dir.path().join("tables");

    let args: Vec<OsString> = vec![
        "democlean".into(),
        "clean".into(),
        input.into_os_string(),
        "--tables".into(),
        tables_dir.clone().into_os_string(),
    ];
    let cli = Cli::try_parse_from(args).unwrap();

    let summary = democlean::run(&cli.command).unwrap();

    assert_eq!("cli-match", summary.match_id);
    assert_eq!(2, summary.rounds);
    assert_eq!(4, summary.frames);
    assert_eq!(1, summary.dropped_rounds);
    assert_eq!(dir.path().join("cli-match.clean.json"), summary.output);
    assert_eq!(10, summary.tables.len());

    let cleaned: MatchRecord =
        serde_json::from_slice(&std::fs::read(&summary.output).unwrap()).unwrap();
    assert_eq!(
        vec![(1, "TerroristsWin"), (2, "TargetBombed")],
        cleaned
            .game_rounds
            .iter()
            .map(|r| (r.round_num, r.round_end_reason.as_str()))
            .collect::<Vec<_>>()
    );

    let player_frames: Vec<serde_json::Value> =
        serde_json::from_slice(&std::fs::read(tables_dir.join("playerFrames.json")).unwrap()).unwrap();
    assert_eq!(2 * 2 * 10, player_frames.len());
    assert_eq!(serde_json::json!("cli-match"), player_frames[0]["matchID"]);

    let match_info: serde_json::Value =
        serde_json::from_slice(&std::fs::read(tables_dir.join("match.json")).unwrap()).unwrap();
    assert_eq!(serde_json::json!(128), match_info["tickRate"]);
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nope.json");

    let command = Command::Clean {
        input,
        output: None,
        cleaning: democlean::CleaningArgs {
            skip: Vec::new(),
            bad_end_reasons: Vec::new(),
            pretty: false,
            tables: None,
        },
    };

    assert!(matches!(democlean::run(&command), Err(cleaning::Error::Io(_))));
}
