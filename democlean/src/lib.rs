//! Command line front end: load or decode a match, clean it, write it back.

use std::path::{Path, PathBuf};

use cleaning::{decoder::demo_id_from_path, CleanConfig, Decoder, DemoCleaner, Diagnostics, ParserConfig, Stage};
use common::MatchRecord;

#[derive(Debug, clap::Parser)]
#[command(name = "democlean", version, about = "Cleans decoded match records")]
pub struct Cli {
    /// More log output, repeat for trace level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Clean a match json file the decoder produced earlier
    Clean {
        input: PathBuf,

        /// Defaults to `<input stem>.clean.json` next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },
    /// Run the decoder on a demo and clean its output
    Parse {
        demo: PathBuf,

        /// Decoder executable
        #[arg(long)]
        decoder: PathBuf,

        /// Passed to the decoder before its own flags, e.g. `run parse_demo.go`
        #[arg(long = "decoder-arg", value_name = "ARG", allow_hyphen_values = true)]
        decoder_args: Vec<String>,

        #[arg(long)]
        demo_id: Option<String>,

        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[arg(long, default_value_t = cleaning::decoder::DEFAULT_PARSE_RATE, allow_negative_numbers = true)]
        parse_rate: i64,

        #[arg(long, default_value_t = cleaning::decoder::DEFAULT_TRADE_TIME, allow_negative_numbers = true)]
        trade_time: i64,

        #[arg(long, default_value = "hltv")]
        buy_style: String,

        #[arg(long)]
        dmg_rolled: bool,

        #[arg(long)]
        parse_kill_frames: bool,

        #[arg(long)]
        parse_chat: bool,

        /// Do not capture frames, the frame based stages are skipped
        #[arg(long)]
        no_frames: bool,

        /// Write the decoder output back without cleaning it
        #[arg(long)]
        no_clean: bool,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct CleaningArgs {
    /// Stage to leave out, can be repeated
    #[arg(long = "skip", value_name = "STAGE")]
    pub skip: Vec<Stage>,

    /// Round end reason to drop, replaces the defaults when given
    #[arg(long = "bad-end-reason", value_name = "REASON")]
    pub bad_end_reasons: Vec<String>,

    /// Indent the written json
    #[arg(long)]
    pub pretty: bool,

    /// Also export the flat tables into this folder
    #[arg(long, value_name = "DIR")]
    pub tables: Option<PathBuf>,
}

impl CleaningArgs {
    pub fn clean_config(&self) -> CleanConfig {
        let mut config = self
            .skip
            .iter()
            .fold(CleanConfig::default(), |config, stage| config.without(*stage));

        if !self.bad_end_reasons.is_empty() {
            config.bad_end_reasons = self.bad_end_reasons.clone();
        }

        config
    }
}

/// What a run did, printed once it is done.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub rounds: usize,
    pub frames: usize,
    pub dropped_rounds: usize,
    pub removed_players: usize,
    pub switched_players: usize,
    pub warnings: usize,
    pub output: PathBuf,
    pub tables: Vec<PathBuf>,
}

impl Summary {
    fn new(record: &MatchRecord, diagnostics: &Diagnostics, output: PathBuf, tables: Vec<PathBuf>) -> Self {
        let dropped_rounds = diagnostics.dropped_rounds().count();
        let removed_players = diagnostics.removed_players().count();
        let switched_players = diagnostics.switched_players().count();

        Self {
            match_id: record.match_id.clone(),
            rounds: record.game_rounds.len(),
            frames: record.frames().count(),
            dropped_rounds,
            removed_players,
            switched_players,
            warnings: diagnostics.len() - diagnostics.modifications(),
            output,
            tables,
        }
    }
}

/// `match.json` becomes `match.clean.json`.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("clean.json")
}

pub fn write_tables(cleaner: &DemoCleaner, dir: &Path, pretty: bool) -> cleaning::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let tables = cleaner.tables()?;
    let mut written = Vec::new();
    for (name, rows) in tables.named()? {
        let path = dir.join(format!("{}.json", name));
        let file = std::io::BufWriter::new(std::fs::File::create(&path)?);
        if pretty {
            serde_json::to_writer_pretty(file, &rows)?;
        } else {
            serde_json::to_writer(file, &rows)?;
        }

        tracing::debug!(?path, "Wrote table");
        written.push(path);
    }

    Ok(written)
}

fn finish(
    cleaner: &DemoCleaner,
    output: PathBuf,
    args: &CleaningArgs,
    diagnostics: &Diagnostics,
) -> cleaning::Result<Summary> {
    cleaner.write_json(&output)?;

    let tables = match args.tables.as_deref() {
        Some(dir) => write_tables(cleaner, dir, args.pretty)?,
        None => Vec::new(),
    };

    let record = cleaner.record().ok_or(cleaning::Error::MissingRecord)?;
    let summary = Summary::new(record, diagnostics, output, tables);
    tracing::info!(
        rounds = summary.rounds,
        dropped_rounds = summary.dropped_rounds,
        removed_players = summary.removed_players,
        switched_players = summary.switched_players,
        warnings = summary.warnings,
        "Done"
    );

    Ok(summary)
}

pub fn run(command: &Command) -> cleaning::Result<Summary> {
    let mut diagnostics = Diagnostics::new();

    match command {
        Command::Clean {
            input,
            output,
            cleaning: args,
        } => {
            let parser = ParserConfig {
                json_indentation: args.pretty,
                ..Default::default()
            };
            let mut cleaner = DemoCleaner::new(parser, args.clean_config(), &mut diagnostics);

            cleaner.read_json(input, &mut diagnostics)?;
            cleaner.clean(&mut diagnostics)?;

            let output = output.clone().unwrap_or_else(|| default_output(input));
            finish(&cleaner, output, args, &diagnostics)
        }
        Command::Parse {
            demo,
            decoder,
            decoder_args,
            demo_id,
            out,
            parse_rate,
            trade_time,
            buy_style,
            dmg_rolled,
            parse_kill_frames,
            parse_chat,
            no_frames,
            no_clean,
            cleaning: args,
        } => {
            let parser = ParserConfig {
                parse_rate: *parse_rate,
                trade_time: *trade_time,
                buy_style: buy_style.clone(),
                parse_frames: !*no_frames,
                parse_kill_frames: *parse_kill_frames,
                dmg_rolled: *dmg_rolled,
                parse_chat: *parse_chat,
                json_indentation: args.pretty,
            };
            let mut cleaner = DemoCleaner::new(parser, args.clean_config(), &mut diagnostics);

            let decoder = Decoder::new(decoder).leading_args(decoder_args);
            cleaner.parse(&decoder, demo, demo_id.as_deref(), out, &mut diagnostics)?;

            if *no_clean {
                tracing::info!("Skipping cleaning");
            } else {
                cleaner.clean(&mut diagnostics)?;
            }

            let demo_id = demo_id
                .clone()
                .unwrap_or_else(|| demo_id_from_path(demo));
            let output = out.join(format!("{}.clean.json", demo_id));
            finish(&cleaner, output, args, &diagnostics)
        }
    }
}
