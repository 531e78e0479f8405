#![allow(dead_code)]

use common::{
    Extra, FrameRecord, Kill, MatchRecord, PlayerState, Position, RosterEntry, RoundRecord, Side,
};

pub const FRAMES_PER_ROUND: usize = 3;

/// A player that walks a little every frame, starting on their own half.
pub fn moving(steam_id: u64, side: Side, frame: usize) -> PlayerState {
    let base_x = match side {
        Side::T => -1000.0,
        Side::CT => 1000.0,
    };

    PlayerState::new(
        steam_id,
        format!("player{}", steam_id),
        side,
        Position::new(
            base_x + steam_id as f64 * 10.0,
            frame as f64 * 25.0 + steam_id as f64,
            64.0,
        ),
    )
}

pub fn kill(attacker: u64, attacker_side: Side, victim: u64, weapon: &str) -> Kill {
    Kill {
        attacker_steam_id: Some(attacker),
        attacker_side: Some(attacker_side),
        victim_steam_id: Some(victim),
        victim_side: Some(attacker_side.opposite()),
        weapon: weapon.to_owned(),
        extra: Extra::new(),
    }
}

/// A regular round `n` the T side wins, with sane timings and three frames.
pub fn round(n: i64, t_ids: &[u64], ct_ids: &[u64]) -> RoundRecord {
    let start = n * 10_000;

    let frames = (0..FRAMES_PER_ROUND)
        .map(|f| {
            let mut frame = FrameRecord::new(
                start + 200 + f as i64 * 128,
                t_ids.iter().map(|id| moving(*id, Side::T, f)).collect(),
                ct_ids.iter().map(|id| moving(*id, Side::CT, f)).collect(),
            );
            frame.seconds = f as f64;
            frame.t.team_name = "Terrorists".to_owned();
            frame.ct.team_name = "Counter".to_owned();
            frame
        })
        .collect();

    let mut round = RoundRecord {
        round_num: n,
        is_warmup: false,
        start_tick: start,
        freeze_time_end_tick: start + 100,
        end_tick: start + 900,
        end_official_tick: start + 950,
        t_score: n - 1,
        ct_score: 0,
        end_t_score: n,
        end_ct_score: 0,
        t_team: "Terrorists".to_owned(),
        ct_team: "Counter".to_owned(),
        winning_side: "T".to_owned(),
        round_end_reason: "TerroristsWin".to_owned(),
        frames,
        ..Default::default()
    };
    round.t_side.players = t_ids.iter().map(|id| RosterEntry::new(*id, format!("player{}", id))).collect();
    round.ct_side.players = ct_ids.iter().map(|id| RosterEntry::new(*id, format!("player{}", id))).collect();

    if let (Some(t), Some(ct)) = (t_ids.first(), ct_ids.first()) {
        round.kills.push(kill(*t, Side::T, *ct, "AK-47"));
    }

    round
}

pub const T_IDS: [u64; 5] = [1, 2, 3, 4, 5];
pub const CT_IDS: [u64; 5] = [6, 7, 8, 9, 10];

pub fn regular_round(n: i64) -> RoundRecord {
    round(n, &T_IDS, &CT_IDS)
}

pub fn match_record(map_name: &str, game_rounds: Vec<RoundRecord>) -> MatchRecord {
    let mut record = MatchRecord {
        match_id: "test-match".to_owned(),
        client_name: "GOTV Demo".to_owned(),
        map_name: map_name.to_owned(),
        tick_rate: 128,
        playback_ticks: 200_000,
        game_rounds,
        ..Default::default()
    };
    record
        .match_phases
        .insert("warmupChanged".to_owned(), serde_json::json!([0, 9000]));
    record
}

/// Scores set up so that the start plus end totals equal `total`, without any
/// round being a terminal win.
pub fn round_with_total(n: i64, total: i64) -> RoundRecord {
    RoundRecord {
        round_num: n,
        t_score: 0,
        ct_score: 0,
        end_t_score: total,
        end_ct_score: 0,
        ..regular_round(n)
    }
}

/// A 16:0 match with the usual noise around it: a warmup, a knife round, a
/// coach in spawn, a round without frames, a drawn round and a restarted round.
pub fn realistic_match() -> MatchRecord {
    let mut rounds = Vec::new();

    let mut warmup = regular_round(0);
    warmup.is_warmup = true;
    warmup.t_score = 0;
    warmup.end_t_score = 0;
    warmup.round_end_reason = String::new();
    rounds.push(warmup);

    let mut knife = regular_round(0);
    knife.t_score = 0;
    knife.end_t_score = 0;
    knife.kills = vec![kill(1, Side::T, 6, "Knife"), kill(2, Side::T, 7, "Knife")];
    rounds.push(knife);

    for n in 1..=16 {
        if n == 3 {
            let mut coached = regular_round(n);
            for frame in coached.frames.iter_mut() {
                frame
                    .t
                    .players
                    .push(PlayerState::new(99, "coach", Side::T, Position::ORIGIN));
            }
            coached.t_side.players.push(RosterEntry::new(99, "coach"));
            rounds.push(coached);
            continue;
        }

        if n == 8 {
            rounds.push(regular_round(8));
        }

        if n == 11 {
            let mut empty = regular_round(10);
            empty.frames.clear();
            rounds.push(empty);
        }

        rounds.push(regular_round(n));

        if n == 5 {
            let mut draw = regular_round(5);
            draw.round_end_reason = "Draw".to_owned();
            rounds.push(draw);
        }
    }

    match_record("de_dust2", rounds)
}

/// Sorts every player list so that records can be compared regardless of
/// insertion order.
pub fn canonical(mut round: RoundRecord) -> RoundRecord {
    round.t_side.players.sort_by_key(|p| p.steam_id);
    round.ct_side.players.sort_by_key(|p| p.steam_id);
    for frame in round.frames.iter_mut() {
        frame.t.players.sort_by_key(|p| p.steam_id);
        frame.ct.players.sort_by_key(|p| p.steam_id);
    }
    round
}
