//! Drops rounds whose score does not progress.
//!
//! The score total of a round (start and end score of both sides) has to grow
//! from one round to the next. A round that does not lead into a higher total
//! is only kept when it ends the match.

use common::{MatchRecord, RoundRecord};

use crate::{
    diagnostics::{Diagnostic, Diagnostics, DropReason},
    pipeline::Stage,
};

/// Rounds a side needs for a draw in regulation.
pub const TIE_SCORE: i64 = 15;

/// Rounds per overtime half-pair needed to force another overtime.
pub const OT_PERIOD: i64 = 3;

fn regulation_win(winner: i64, loser: i64) -> bool {
    winner == TIE_SCORE + 1 && loser < TIE_SCORE
}

/// Overtime draws end at 15 + 3n, so a winning score minus 16 is a multiple of
/// 3 and has to be two rounds clear of the other side.
fn overtime_win(winner: i64, loser: i64) -> bool {
    winner > TIE_SCORE && (winner - TIE_SCORE - 1) % OT_PERIOD == 0 && loser < winner - 1
}

/// Whether the round ends the match with a winner and a loser.
pub fn is_terminal_win(round: &RoundRecord) -> bool {
    let (t, ct) = (round.end_t_score, round.end_ct_score);

    regulation_win(t, ct) || regulation_win(ct, t) || overtime_win(t, ct) || overtime_win(ct, t)
}

/// Decides for each round whether it is dropped. Lookahead uses the unfiltered
/// neighbours.
pub fn score_verdicts(rounds: &[RoundRecord]) -> Vec<Option<DropReason>> {
    let totals: Vec<i64> = rounds.iter().map(|r| r.score_total()).collect();

    rounds
        .iter()
        .enumerate()
        .map(|(i, round)| {
            let total = totals[i];

            match totals.get(i + 1) {
                Some(&next_total) => {
                    if next_total > total || is_terminal_win(round) {
                        None
                    } else {
                        Some(DropReason::ScoreNotIncreasing { total, next_total })
                    }
                }
                None => {
                    // A lone round has no predecessor and is compared with itself.
                    let previous_total = totals[i.saturating_sub(1)];
                    if total > previous_total {
                        None
                    } else {
                        Some(DropReason::FinalScoreNotIncreasing {
                            total,
                            previous_total,
                        })
                    }
                }
            }
        })
        .collect()
}

#[tracing::instrument(skip_all)]
pub fn remove_bad_scoring(record: &mut MatchRecord, diagnostics: &mut Diagnostics) {
    let mut verdicts = score_verdicts(&record.game_rounds).into_iter();

    crate::filters::retain_rounds(record, Stage::BadScoring, diagnostics, |_, _| {
        verdicts.next().flatten()
    });
}
