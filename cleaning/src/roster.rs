//! Repairs rounds whose first frame has more than five players on a side.
//!
//! The steps run in a fixed order: coaches standing at the origin, players
//! that never move (only while a side is still oversized), players listed on
//! the wrong side of the map, and finally the players that died first.

use common::{MatchRecord, PlayerState, RoundRecord, Side};

use crate::{
    diagnostics::{Diagnostic, Diagnostics, DropReason, RemovalReason},
    filters::retain_rounds,
    pipeline::Stage,
};

pub const MAX_PLAYERS: usize = 5;
pub const MIN_PLAYERS: usize = 3;

/// Upper bound on earliest-death eliminations per side and round.
pub const MAX_ELIMINATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// How the spawn half of a map tells the T side apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideRule {
    TBelowZero(Axis),
    TAboveZero(Axis),
}

impl SideRule {
    pub fn side_of(&self, player: &PlayerState) -> Side {
        let coordinate = |axis: &Axis| match axis {
            Axis::X => player.x,
            Axis::Y => player.y,
        };

        let is_t = match self {
            Self::TBelowZero(axis) => coordinate(axis) < 0.0,
            Self::TAboveZero(axis) => coordinate(axis) > 0.0,
        };

        if is_t {
            Side::T
        } else {
            Side::CT
        }
    }
}

pub static MAP_SIDE_RULES: phf::Map<&'static str, SideRule> = phf::phf_map! {
    "de_ancient" => SideRule::TBelowZero(Axis::Y),
    "de_anubis" => SideRule::TBelowZero(Axis::Y),
    "de_inferno" => SideRule::TBelowZero(Axis::X),
    "de_mirage" => SideRule::TAboveZero(Axis::X),
    "de_nuke" => SideRule::TBelowZero(Axis::X),
    "de_overpass" => SideRule::TBelowZero(Axis::Y),
    "de_vertigo" => SideRule::TBelowZero(Axis::Y),
};

/// The side a player should be on judging by where they stand. Maps without a
/// rule trust the reported side.
pub fn inferred_side(map_name: &str, player: &PlayerState) -> Side {
    match MAP_SIDE_RULES.get(map_name) {
        Some(rule) => rule.side_of(player),
        None => player.side,
    }
}

pub fn is_oversized(round: &RoundRecord) -> bool {
    Side::BOTH
        .into_iter()
        .any(|side| round.player_count(side) > MAX_PLAYERS)
}

pub fn has_acceptable_roster(round: &RoundRecord) -> bool {
    let t = round.player_count(Side::T);
    let ct = round.player_count(Side::CT);

    let in_range = |count: usize| (MIN_PLAYERS..=MAX_PLAYERS).contains(&count);
    in_range(t) && in_range(ct) && (t > 0 || ct > 0)
}

fn remove_all(
    round: &mut RoundRecord,
    steam_ids: Vec<u64>,
    reason: RemovalReason,
    diagnostics: &mut Diagnostics,
) -> usize {
    let mut removed = 0;
    for steam_id in steam_ids {
        if round.remove_player(steam_id) {
            removed += 1;
            diagnostics.record(Diagnostic::PlayerRemoved {
                round_num: round.round_num,
                steam_id,
                reason,
            });
        }
    }
    removed
}

/// Observers and coaches are parked at (0,0,0) at the start of a round.
pub fn remove_coaches_at_origin(round: &mut RoundRecord, diagnostics: &mut Diagnostics) -> usize {
    let coaches: Vec<u64> = match round.first_frame() {
        Some(frame) => frame
            .players()
            .filter(|(_, p)| p.is_at_origin())
            .map(|(_, p)| p.steam_id)
            .collect(),
        None => return 0,
    };

    remove_all(round, coaches, RemovalReason::CoachAtOrigin, diagnostics)
}

/// Removes players that stay at their first frame position for the whole round.
pub fn remove_stationary_players(round: &mut RoundRecord, diagnostics: &mut Diagnostics) -> usize {
    let (first, rest) = match round.frames.split_first() {
        Some(f) => f,
        None => return 0,
    };

    let stationary: Vec<u64> = first
        .players()
        .filter(|(_, player)| {
            let start = player.position();
            !rest.iter().any(|frame| {
                frame
                    .find_player(player.steam_id)
                    .map(|(_, p)| p.position() != start)
                    .unwrap_or(false)
            })
        })
        .map(|(_, p)| p.steam_id)
        .collect();

    remove_all(round, stationary, RemovalReason::Stationary, diagnostics)
}

/// Switches every player whose reported side in the first frame disagrees with
/// the side their position implies.
pub fn correct_sides(round: &mut RoundRecord, map_name: &str, diagnostics: &mut Diagnostics) -> usize {
    let mut misplaced: Vec<(u64, Side)> = match round.first_frame() {
        Some(frame) => frame
            .players()
            .filter_map(|(_, p)| {
                let side = inferred_side(map_name, p);
                (side != p.side).then_some((p.steam_id, side))
            })
            .collect(),
        None => return 0,
    };
    misplaced.sort_unstable();
    misplaced.dedup_by_key(|(id, _)| *id);

    for (steam_id, side) in misplaced.iter().copied() {
        round.switch_player_side(steam_id);
        diagnostics.record(Diagnostic::PlayerSwitched {
            round_num: round.round_num,
            steam_id,
            to: side,
        });
    }

    misplaced.len()
}

/// The player on `side` that died first: in the earliest frame that has any
/// dead player on that side, the one with the lowest steam id.
pub fn first_dead_player(round: &RoundRecord, side: Side) -> Option<u64> {
    round.frames.iter().find_map(|frame| {
        frame
            .team(side)
            .players
            .iter()
            .filter(|p| !p.is_alive)
            .map(|p| p.steam_id)
            .min()
    })
}

pub fn eliminate_earliest_deaths(round: &mut RoundRecord, side: Side, diagnostics: &mut Diagnostics) -> usize {
    let mut removed = 0;

    for _ in 0..MAX_ELIMINATIONS {
        if round.player_count(side) <= MAX_PLAYERS {
            break;
        }

        let steam_id = match first_dead_player(round, side) {
            Some(id) => id,
            None => {
                tracing::debug!(round = round.round_num, %side, "No dead player left to eliminate");
                break;
            }
        };

        removed += remove_all(round, vec![steam_id], RemovalReason::EarliestDeath, diagnostics);
    }

    removed
}

/// Runs the repair steps on an oversized round.
#[tracing::instrument(skip(round, diagnostics), fields(round = round.round_num))]
pub fn normalize_round(round: &mut RoundRecord, map_name: &str, diagnostics: &mut Diagnostics) {
    if !is_oversized(round) {
        return;
    }

    tracing::debug!("Looking for coaches in (0,0,0) position");
    remove_coaches_at_origin(round, diagnostics);

    if is_oversized(round) {
        tracing::debug!("Looking for coaches not moving");
        remove_stationary_players(round, diagnostics);
    }

    tracing::debug!("Forcing teams based on player position");
    correct_sides(round, map_name, diagnostics);

    for side in Side::BOTH {
        eliminate_earliest_deaths(round, side, diagnostics);
    }
}

#[tracing::instrument(skip_all)]
pub fn remove_excess_players(record: &mut MatchRecord, frames_parsed: bool, diagnostics: &mut Diagnostics) {
    if !frames_parsed {
        diagnostics.record(Diagnostic::StageSkipped {
            stage: Stage::ExcessPlayers,
            reason: "frames were not parsed, rosters cannot be checked",
        });
        return;
    }

    let map_name = record.map_name.clone();
    retain_rounds(record, Stage::ExcessPlayers, diagnostics, |round, diagnostics| {
        if round.frames.is_empty() {
            return Some(DropReason::NoFrames);
        }

        normalize_round(round, &map_name, diagnostics);

        if has_acceptable_roster(round) {
            None
        } else {
            Some(DropReason::RosterSize {
                t: round.player_count(Side::T),
                ct: round.player_count(Side::CT),
            })
        }
    });
}
