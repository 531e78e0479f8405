//! Stateless round filters.
//!
//! Each `is_*`/`has_*` function judges a single round, the `remove_*`
//! functions apply it to a record and report what they dropped.

use common::{MatchRecord, RoundRecord};

use crate::{
    diagnostics::{Diagnostic, Diagnostics, DropReason},
    pipeline::Stage,
};

pub const KNIFE_WEAPON: &str = "Knife";

/// More kills than this cannot happen in a 5v5 round.
pub const MAX_KILLS: usize = 10;

pub const DEFAULT_BAD_END_REASONS: [&str; 3] = ["Draw", "Unknown", ""];

/// Replaces the rounds of `record` with the ones `verdict` does not reject.
pub(crate) fn retain_rounds<F>(
    record: &mut MatchRecord,
    stage: Stage,
    diagnostics: &mut Diagnostics,
    mut verdict: F,
) where
    F: FnMut(&mut RoundRecord, &mut Diagnostics) -> Option<DropReason>,
{
    let rounds = std::mem::take(&mut record.game_rounds);

    record.game_rounds = rounds
        .into_iter()
        .filter_map(|mut round| match verdict(&mut round, diagnostics) {
            None => Some(round),
            Some(reason) => {
                diagnostics.record(Diagnostic::RoundDropped {
                    round_num: round.round_num,
                    stage,
                    reason,
                });
                None
            }
        })
        .collect();
}

/// A round where every kill was a knife kill, e.g. the round deciding sides.
pub fn is_knife_round(round: &RoundRecord) -> bool {
    !round.kills.is_empty() && round.kills.iter().all(|k| k.weapon == KNIFE_WEAPON)
}

pub fn has_excess_kills(round: &RoundRecord) -> bool {
    round.kills.len() > MAX_KILLS
}

pub fn has_bad_timing(round: &RoundRecord) -> bool {
    round.start_tick > round.end_tick
        || round.start_tick > round.end_official_tick
        || round.start_tick > round.freeze_time_end_tick
}

pub fn has_bad_end_reason<S>(round: &RoundRecord, bad_reasons: &[S]) -> bool
where
    S: AsRef<str>,
{
    bad_reasons
        .iter()
        .any(|r| r.as_ref() == round.round_end_reason)
}

#[tracing::instrument(skip_all)]
pub fn remove_rounds_without_frames(
    record: &mut MatchRecord,
    frames_parsed: bool,
    diagnostics: &mut Diagnostics,
) {
    if !frames_parsed {
        diagnostics.record(Diagnostic::StageSkipped {
            stage: Stage::NoFrames,
            reason: "frames were not parsed, cannot tell rounds without frames apart",
        });
        return;
    }

    retain_rounds(record, Stage::NoFrames, diagnostics, |round, _| {
        round.frames.is_empty().then_some(DropReason::NoFrames)
    });
}

/// Without a warmup marker from the decoder every round is kept.
#[tracing::instrument(skip_all)]
pub fn remove_warmups(record: &mut MatchRecord, diagnostics: &mut Diagnostics) {
    if !record.has_warmup_marker() {
        tracing::debug!("No warmup marker in match phases, keeping all rounds");
        return;
    }

    retain_rounds(record, Stage::Warmup, diagnostics, |round, _| {
        round.is_warmup.then_some(DropReason::Warmup)
    });
}

#[tracing::instrument(skip_all)]
pub fn remove_knife_rounds(record: &mut MatchRecord, diagnostics: &mut Diagnostics) {
    retain_rounds(record, Stage::Knife, diagnostics, |round, _| {
        is_knife_round(round).then_some(DropReason::KnifeRound)
    });
}

/// Keeps only non-warmup rounds with a plausible number of kills.
#[tracing::instrument(skip_all)]
pub fn remove_excess_kill_rounds(record: &mut MatchRecord, diagnostics: &mut Diagnostics) {
    retain_rounds(record, Stage::ExcessKills, diagnostics, |round, _| {
        if round.is_warmup {
            Some(DropReason::Warmup)
        } else if has_excess_kills(round) {
            Some(DropReason::ExcessKills {
                kills: round.kills.len(),
            })
        } else {
            None
        }
    });
}

#[tracing::instrument(skip_all)]
pub fn remove_bad_timings(record: &mut MatchRecord, diagnostics: &mut Diagnostics) {
    retain_rounds(record, Stage::BadTiming, diagnostics, |round, _| {
        has_bad_timing(round).then_some(DropReason::BadTiming)
    });
}

#[tracing::instrument(skip_all)]
pub fn remove_bad_endings<S>(record: &mut MatchRecord, bad_reasons: &[S], diagnostics: &mut Diagnostics)
where
    S: AsRef<str>,
{
    retain_rounds(record, Stage::BadEndReason, diagnostics, |round, _| {
        has_bad_end_reason(round, bad_reasons)
            .then(|| DropReason::BadEndReason(round.round_end_reason.clone()))
    });
}
