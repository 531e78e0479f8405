//! Record of every decision the cleaning pipeline makes.
//!
//! A [`Diagnostics`] sink is owned by the caller and handed to every stage, so
//! two records can be cleaned side by side without sharing any logging state.
//! Each entry is also emitted as a `tracing` event.

use common::Side;

use crate::{decoder::ConfigWarning, pipeline::Stage, schema::SchemaWarning};

#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    NoFrames,
    Warmup,
    KnifeRound,
    ExcessKills { kills: usize },
    BadTiming,
    BadEndReason(String),
    RosterSize { t: usize, ct: usize },
    /// The next round's score total did not increase and the round is no terminal win.
    ScoreNotIncreasing { total: i64, next_total: i64 },
    /// The final round's score total did not exceed the previous round's.
    FinalScoreNotIncreasing { total: i64, previous_total: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    CoachAtOrigin,
    Stationary,
    EarliestDeath,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    RoundDropped {
        round_num: i64,
        stage: Stage,
        reason: DropReason,
    },
    PlayerRemoved {
        round_num: i64,
        steam_id: u64,
        reason: RemovalReason,
    },
    PlayerSwitched {
        round_num: i64,
        steam_id: u64,
        to: Side,
    },
    StageSkipped {
        stage: Stage,
        reason: &'static str,
    },
    ConfigCorrected(ConfigWarning),
    Schema(SchemaWarning),
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::RoundDropped {
                round_num,
                stage,
                reason,
            } => {
                tracing::info!(round = round_num, ?stage, ?reason, "Dropped round");
            }
            Diagnostic::PlayerRemoved {
                round_num,
                steam_id,
                reason,
            } => {
                tracing::info!(round = round_num, steam_id, ?reason, "Removed player");
            }
            Diagnostic::PlayerSwitched {
                round_num,
                steam_id,
                to,
            } => {
                tracing::info!(round = round_num, steam_id, %to, "Switched player side");
            }
            Diagnostic::StageSkipped { stage, reason } => {
                tracing::warn!(?stage, "Skipping stage: {}", reason);
            }
            Diagnostic::ConfigCorrected(warning) => {
                tracing::warn!(?warning, "Parser configuration");
            }
            Diagnostic::Schema(warning) => {
                tracing::warn!(path = %warning.path, problem = ?warning.problem, "Record does not match the expected schema");
            }
        };

        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn dropped_rounds(&self) -> impl Iterator<Item = (i64, Stage, &DropReason)> {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::RoundDropped {
                round_num,
                stage,
                reason,
            } => Some((*round_num, *stage, reason)),
            _ => None,
        })
    }

    pub fn removed_players(&self) -> impl Iterator<Item = (i64, u64, RemovalReason)> + '_ {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::PlayerRemoved {
                round_num,
                steam_id,
                reason,
            } => Some((*round_num, *steam_id, *reason)),
            _ => None,
        })
    }

    pub fn switched_players(&self) -> impl Iterator<Item = (i64, u64, Side)> + '_ {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::PlayerSwitched {
                round_num,
                steam_id,
                to,
            } => Some((*round_num, *steam_id, *to)),
            _ => None,
        })
    }

    /// Changes to the record itself, as opposed to warnings about the input.
    pub fn modifications(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| {
                matches!(
                    d,
                    Diagnostic::RoundDropped { .. }
                        | Diagnostic::PlayerRemoved { .. }
                        | Diagnostic::PlayerSwitched { .. }
                )
            })
            .count()
    }
}
