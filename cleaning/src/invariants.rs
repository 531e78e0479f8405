//! Consistency checks for a cleaned record.

use std::collections::{BTreeMap, BTreeSet};

use common::{MatchRecord, RoundRecord, Side};

use crate::roster::{MAX_PLAYERS, MIN_PLAYERS};

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    RoundNumber { index: usize, round_num: i64 },
    FrameId { index: usize, global_frame_id: i64 },
    RosterSize { round_num: i64, side: Side, players: usize },
    SideMismatch { round_num: i64, steam_id: u64 },
    TickOrder { round_num: i64, tick: i64, previous: i64 },
}

/// Every side label a player carries anywhere in the round.
fn side_labels(round: &RoundRecord) -> BTreeMap<u64, BTreeSet<Side>> {
    let mut labels: BTreeMap<u64, BTreeSet<Side>> = BTreeMap::new();

    for side in Side::BOTH {
        for entry in round.roster(side).players.iter() {
            labels.entry(entry.steam_id).or_default().insert(side);
        }
    }

    for frame in round.frames.iter() {
        for (list_side, player) in frame.players() {
            let entry = labels.entry(player.steam_id).or_default();
            entry.insert(list_side);
            entry.insert(player.side);
        }
    }

    for event in round.events() {
        for (steam_id, side) in event.participants() {
            if let (Some(steam_id), Some(side)) = (steam_id, side) {
                labels.entry(steam_id).or_default().insert(side);
            }
        }
    }

    labels
}

pub fn check(record: &MatchRecord) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (index, round) in record.game_rounds.iter().enumerate() {
        if round.round_num != index as i64 + 1 {
            violations.push(Violation::RoundNumber {
                index,
                round_num: round.round_num,
            });
        }

        for side in Side::BOTH {
            let players = round.player_count(side);
            if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
                violations.push(Violation::RosterSize {
                    round_num: round.round_num,
                    side,
                    players,
                });
            }
        }

        for (steam_id, sides) in side_labels(round) {
            if sides.len() > 1 {
                violations.push(Violation::SideMismatch {
                    round_num: round.round_num,
                    steam_id,
                });
            }
        }

        for pair in round.frames.windows(2) {
            if pair[1].tick < pair[0].tick {
                violations.push(Violation::TickOrder {
                    round_num: round.round_num,
                    tick: pair[1].tick,
                    previous: pair[0].tick,
                });
            }
        }
    }

    for (index, frame) in record.frames().enumerate() {
        if frame.global_frame_id != index as i64 {
            violations.push(Violation::FrameId {
                index,
                global_frame_id: frame.global_frame_id,
            });
        }
    }

    violations
}
