//! Invocation of the external demo decoder.
//!
//! The decoder is a black box: it gets a set of flags, and the only success
//! signal is the json file it is supposed to leave in the output folder.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{Error, Result};

pub const DEFAULT_PARSE_RATE: i64 = 128;
pub const DEFAULT_TRADE_TIME: i64 = 5;

const PARSE_RATE_SLOW: i64 = 64;
const PARSE_RATE_SPARSE: i64 = 256;
const TRADE_TIME_LONG: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuyStyle {
    #[default]
    Hltv,
    Csgo,
}

impl BuyStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hltv => "hltv",
            Self::Csgo => "csgo",
        }
    }
}

impl std::str::FromStr for BuyStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hltv" => Ok(Self::Hltv),
            "csgo" => Ok(Self::Csgo),
            other => Err(format!("unknown buy style {:?}", other)),
        }
    }
}

/// Problems with a [`ParserConfig`]. The `*Invalid` ones were corrected, the
/// others are advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    ParseRateInvalid { given: i64, corrected: i64 },
    ParseRateSlow { given: i64 },
    ParseRateSparse { given: i64 },
    TradeTimeInvalid { given: i64, corrected: i64 },
    TradeTimeLong { given: i64 },
    BuyStyleInvalid { given: String, corrected: BuyStyle },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Ticks between two frames.
    pub parse_rate: i64,
    /// Window in seconds in which a kill counts as a trade.
    pub trade_time: i64,
    pub buy_style: String,
    pub parse_frames: bool,
    pub parse_kill_frames: bool,
    pub dmg_rolled: bool,
    pub parse_chat: bool,
    pub json_indentation: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            parse_rate: DEFAULT_PARSE_RATE,
            trade_time: DEFAULT_TRADE_TIME,
            buy_style: BuyStyle::Hltv.as_str().to_owned(),
            parse_frames: true,
            parse_kill_frames: false,
            dmg_rolled: false,
            parse_chat: false,
            json_indentation: false,
        }
    }
}

impl ParserConfig {
    /// Replaces invalid tunables with their defaults and reports what it found.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.trade_time <= 0 {
            warnings.push(ConfigWarning::TradeTimeInvalid {
                given: self.trade_time,
                corrected: DEFAULT_TRADE_TIME,
            });
            self.trade_time = DEFAULT_TRADE_TIME;
        } else if self.trade_time > TRADE_TIME_LONG {
            warnings.push(ConfigWarning::TradeTimeLong {
                given: self.trade_time,
            });
        }

        if self.parse_rate < 1 {
            warnings.push(ConfigWarning::ParseRateInvalid {
                given: self.parse_rate,
                corrected: DEFAULT_PARSE_RATE,
            });
            self.parse_rate = DEFAULT_PARSE_RATE;
        } else if 1 < self.parse_rate && self.parse_rate < PARSE_RATE_SLOW {
            warnings.push(ConfigWarning::ParseRateSlow {
                given: self.parse_rate,
            });
        } else if self.parse_rate >= PARSE_RATE_SPARSE {
            warnings.push(ConfigWarning::ParseRateSparse {
                given: self.parse_rate,
            });
        }

        if self.buy_style.parse::<BuyStyle>().is_err() {
            warnings.push(ConfigWarning::BuyStyleInvalid {
                given: self.buy_style.clone(),
                corrected: BuyStyle::Hltv,
            });
            self.buy_style = BuyStyle::Hltv.as_str().to_owned();
        }

        warnings
    }

    pub fn buy_style(&self) -> BuyStyle {
        self.buy_style.parse().unwrap_or_default()
    }
}

/// The demo id is the file name without its last extension.
pub fn demo_id_from_path(demofile: &Path) -> String {
    let normalized = demofile.to_string_lossy().replace('\\', "/");
    let name = normalized.rsplit('/').next().unwrap_or_default();

    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
        _ => name.to_owned(),
    }
}

#[derive(Debug, Clone)]
pub struct Decoder {
    program: PathBuf,
    leading_args: Vec<OsString>,
    working_dir: Option<PathBuf>,
}

impl Decoder {
    pub fn new<P>(program: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            working_dir: None,
        }
    }

    /// Arguments placed before the decoder flags, e.g. `run parse_demo.go`.
    pub fn leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn working_dir<P>(mut self, dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn output_path(demo_id: &str, out_dir: &Path) -> PathBuf {
        out_dir.join(format!("{}.json", demo_id))
    }

    pub fn command_args(
        &self,
        config: &ParserConfig,
        demofile: &Path,
        demo_id: &str,
        out_dir: &Path,
    ) -> Vec<OsString> {
        let mut args = self.leading_args.clone();

        args.extend([
            "-demo".into(),
            demofile.as_os_str().to_owned(),
            "-parserate".into(),
            config.parse_rate.to_string().into(),
            "-tradetime".into(),
            config.trade_time.to_string().into(),
            "-buystyle".into(),
            config.buy_style().as_str().into(),
            "-demoid".into(),
            demo_id.into(),
            "-out".into(),
            out_dir.as_os_str().to_owned(),
        ]);

        let switches = [
            (config.dmg_rolled, "--dmgrolled"),
            (config.parse_frames, "--parseframes"),
            (config.parse_kill_frames, "--parsekillframes"),
            (config.json_indentation, "--jsonindentation"),
            (config.parse_chat, "--parsechat"),
        ];
        args.extend(
            switches
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, flag)| OsString::from(flag)),
        );

        args
    }

    /// Runs the decoder and returns the path of the json file it produced.
    #[tracing::instrument(skip(self, config))]
    pub fn run(
        &self,
        config: &ParserConfig,
        demofile: &Path,
        demo_id: &str,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        if !demofile.exists() {
            tracing::error!("Demofile path does not exist");
            return Err(Error::DemoNotFound(demofile.to_path_buf()));
        }

        let expected = Self::output_path(demo_id, out_dir);
        let args = self.command_args(config, demofile, demo_id, out_dir);
        tracing::debug!(program = ?self.program, ?args, "Running decoder");

        let mut command = Command::new(&self.program);
        command.args(&args).stdout(Stdio::piped());
        if let Some(dir) = self.working_dir.as_ref() {
            command.current_dir(dir);
        }
        let output = command.output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if expected.is_file() {
            tracing::info!(path = ?expected, "Wrote demo parse output");
            return Ok(expected);
        }

        tracing::error!(status = ?output.status, %stdout, "No file produced by the decoder");
        Err(Error::ExternalToolFailure {
            expected,
            config: Box::new(config.clone()),
            stdout,
        })
    }
}
