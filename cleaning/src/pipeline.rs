use std::{collections::BTreeSet, path::Path};

use common::{MatchRecord, RoundRecord};

use crate::{
    decoder::{demo_id_from_path, Decoder, ParserConfig},
    diagnostics::{Diagnostic, Diagnostics},
    filters, renumber, roster,
    schema::{self, SchemaProblem, SchemaWarning},
    scoring,
    tables::Tables,
    Error, Result,
};

/// The cleaning stages, in the order they run.
///
/// The roster repair has to come before the kill count and score checks, as it
/// removes players together with the events they were part of.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    NoFrames,
    Warmup,
    Knife,
    BadTiming,
    ExcessPlayers,
    ExcessKills,
    BadEndReason,
    BadScoring,
}

impl Stage {
    pub const ORDER: [Stage; 8] = [
        Stage::NoFrames,
        Stage::Warmup,
        Stage::Knife,
        Stage::BadTiming,
        Stage::ExcessPlayers,
        Stage::ExcessKills,
        Stage::BadEndReason,
        Stage::BadScoring,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::NoFrames => "no-frames",
            Self::Warmup => "warmup",
            Self::Knife => "knife",
            Self::BadTiming => "bad-timing",
            Self::ExcessPlayers => "excess-players",
            Self::ExcessKills => "excess-kills",
            Self::BadEndReason => "bad-end-reason",
            Self::BadScoring => "bad-scoring",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ORDER
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| format!("unknown stage {:?}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanConfig {
    pub enabled: BTreeSet<Stage>,
    pub bad_end_reasons: Vec<String>,
    /// Whether the decoder captured frames. Without frames the frame based
    /// stages are skipped.
    pub frames_parsed: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            enabled: Stage::ORDER.into_iter().collect(),
            bad_end_reasons: filters::DEFAULT_BAD_END_REASONS
                .iter()
                .map(|r| r.to_string())
                .collect(),
            frames_parsed: true,
        }
    }
}

impl CleanConfig {
    pub fn without(mut self, stage: Stage) -> Self {
        self.enabled.remove(&stage);
        self
    }

    pub fn only<I>(stages: I) -> Self
    where
        I: IntoIterator<Item = Stage>,
    {
        Self {
            enabled: stages.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.enabled.contains(&stage)
    }

    /// The enabled stages in execution order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ORDER
            .into_iter()
            .filter(|stage| self.is_enabled(*stage))
    }
}

pub fn run_stage(
    stage: Stage,
    record: &mut MatchRecord,
    config: &CleanConfig,
    diagnostics: &mut Diagnostics,
) {
    let before = record.game_rounds.len();

    match stage {
        Stage::NoFrames => {
            filters::remove_rounds_without_frames(record, config.frames_parsed, diagnostics)
        }
        Stage::Warmup => filters::remove_warmups(record, diagnostics),
        Stage::Knife => filters::remove_knife_rounds(record, diagnostics),
        Stage::BadTiming => filters::remove_bad_timings(record, diagnostics),
        Stage::ExcessPlayers => {
            roster::remove_excess_players(record, config.frames_parsed, diagnostics)
        }
        Stage::ExcessKills => filters::remove_excess_kill_rounds(record, diagnostics),
        Stage::BadEndReason => {
            filters::remove_bad_endings(record, config.bad_end_reasons.as_slice(), diagnostics)
        }
        Stage::BadScoring => scoring::remove_bad_scoring(record, diagnostics),
    };

    tracing::debug!(
        %stage,
        before,
        after = record.game_rounds.len(),
        "Finished stage"
    );
}

/// Runs every enabled stage and renumbers rounds and frames afterwards.
#[tracing::instrument(skip_all, fields(match_id = %record.match_id))]
pub fn clean_record(record: &mut MatchRecord, config: &CleanConfig, diagnostics: &mut Diagnostics) {
    for stage in config.stages() {
        run_stage(stage, record, config, diagnostics);
    }

    renumber::renumber(record);

    tracing::info!(rounds = record.game_rounds.len(), "Cleaned match");
}

/// Owns a match record from loading until export.
#[derive(Debug)]
pub struct DemoCleaner {
    parser: ParserConfig,
    config: CleanConfig,
    record: Option<MatchRecord>,
}

impl DemoCleaner {
    /// Invalid parser settings are corrected and reported to `diagnostics`.
    pub fn new(mut parser: ParserConfig, mut config: CleanConfig, diagnostics: &mut Diagnostics) -> Self {
        for warning in parser.validate() {
            diagnostics.record(Diagnostic::ConfigCorrected(warning));
        }
        config.frames_parsed = parser.parse_frames;

        Self {
            parser,
            config,
            record: None,
        }
    }

    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser
    }

    pub fn clean_config(&self) -> &CleanConfig {
        &self.config
    }

    pub fn record(&self) -> Option<&MatchRecord> {
        self.record.as_ref()
    }

    pub fn set_record(&mut self, record: MatchRecord) {
        self.record = Some(record);
    }

    pub fn take_record(&mut self) -> Option<MatchRecord> {
        self.record.take()
    }

    fn loaded(&self) -> Result<&MatchRecord> {
        self.record.as_ref().ok_or(Error::MissingRecord)
    }

    /// Validates the document's shape, repairs what it can, then loads it.
    /// Shape problems are reported, not fatal. A round that still cannot be
    /// read is skipped with a warning.
    pub fn load_value(
        &mut self,
        mut document: serde_json::Value,
        diagnostics: &mut Diagnostics,
    ) -> Result<&MatchRecord> {
        let warnings = schema::validate_shape(&document);
        if !warnings.is_empty() {
            tracing::error!(
                count = warnings.len(),
                "Loaded json file does not have correct fields. This may cause issues later."
            );

            for path in schema::repair(&mut document, &warnings) {
                tracing::warn!(%path, "Dropped player without a steam id");
            }
        }
        for warning in warnings {
            diagnostics.record(Diagnostic::Schema(warning));
        }

        let rounds = document.get_mut("gameRounds").map(serde_json::Value::take);
        let mut record: MatchRecord = serde_json::from_value(document)?;

        if let Some(serde_json::Value::Array(rounds)) = rounds {
            record.game_rounds.reserve(rounds.len());
            for (index, round) in rounds.into_iter().enumerate() {
                match serde_json::from_value::<RoundRecord>(round) {
                    Ok(round) => record.game_rounds.push(round),
                    Err(e) => diagnostics.record(Diagnostic::Schema(SchemaWarning {
                        path: format!("/gameRounds/{}", index),
                        problem: SchemaProblem::Unreadable { message: e.to_string() },
                    })),
                }
            }
        }
        tracing::info!(match_id = %record.match_id, rounds = record.game_rounds.len(), "Loaded match");

        Ok(self.record.insert(record))
    }

    pub fn read_json(&mut self, path: &Path, diagnostics: &mut Diagnostics) -> Result<&MatchRecord> {
        let file = std::fs::File::open(path)?;
        let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };

        let document: serde_json::Value = serde_json::from_slice(&mmap)?;
        self.load_value(document, diagnostics)
    }

    /// Runs the decoder on `demofile` and loads what it wrote to `out_dir`.
    pub fn parse(
        &mut self,
        decoder: &Decoder,
        demofile: &Path,
        demo_id: Option<&str>,
        out_dir: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<&MatchRecord> {
        let demo_id = demo_id
            .map(|id| id.to_owned())
            .unwrap_or_else(|| demo_id_from_path(demofile));

        let output = decoder.run(&self.parser, demofile, &demo_id, out_dir)?;
        self.read_json(&output, diagnostics)
    }

    pub fn clean(&mut self, diagnostics: &mut Diagnostics) -> Result<&MatchRecord> {
        let record = self.record.as_mut().ok_or(Error::MissingRecord)?;
        clean_record(record, &self.config, diagnostics);
        Ok(record)
    }

    pub fn tables(&self) -> Result<Tables> {
        Ok(Tables::from_record(self.loaded()?))
    }

    /// Writes the record as json, indented if the parser config asks for it.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let record = self.loaded()?;

        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        if self.parser.json_indentation {
            serde_json::to_writer_pretty(file, record)?;
        } else {
            serde_json::to_writer(file, record)?;
        }

        tracing::info!(?path, "Wrote cleaned match");
        Ok(())
    }
}
