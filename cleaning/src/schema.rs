//! Best-effort shape check of a decoded document before it is deserialized.
//!
//! Mismatches are reported and then repaired in place, so that a document
//! with missing or mistyped fields still loads. Absent collections count as
//! empty and absent scalars fall back to their defaults.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaProblem {
    Missing,
    WrongType { expected: &'static str },
    /// Still could not be deserialized after the repairs, the value is skipped.
    Unreadable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    /// JSON pointer to the offending value.
    pub path: String,
    pub problem: SchemaProblem,
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    String,
    Number,
    Integer,
    Bool,
    Object,
    /// An array, or null for an empty collection.
    List,
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Object => "object",
            Self::List => "array",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::List => value.is_array() || value.is_null(),
        }
    }
}

const MATCH_KEYS: &[(&str, Kind)] = &[
    ("matchID", Kind::String),
    ("mapName", Kind::String),
    ("tickRate", Kind::Integer),
    ("gameRounds", Kind::List),
];

const ROUND_KEYS: &[(&str, Kind)] = &[
    ("roundNum", Kind::Integer),
    ("isWarmup", Kind::Bool),
    ("startTick", Kind::Integer),
    ("freezeTimeEndTick", Kind::Integer),
    ("endTick", Kind::Integer),
    ("endOfficialTick", Kind::Integer),
    ("tScore", Kind::Integer),
    ("ctScore", Kind::Integer),
    ("endTScore", Kind::Integer),
    ("endCTScore", Kind::Integer),
    ("roundEndReason", Kind::String),
    ("frames", Kind::List),
    ("kills", Kind::List),
];

const FRAME_KEYS: &[(&str, Kind)] = &[
    ("tick", Kind::Integer),
    ("t", Kind::Object),
    ("ct", Kind::Object),
];

const PLAYER_KEYS: &[(&str, Kind)] = &[
    ("steamID", Kind::Integer),
    ("side", Kind::String),
    ("x", Kind::Number),
    ("y", Kind::Number),
    ("z", Kind::Number),
    ("isAlive", Kind::Bool),
];

fn check_keys(value: &Value, path: &str, keys: &[(&str, Kind)], warnings: &mut Vec<SchemaWarning>) {
    for (key, kind) in keys {
        let problem = match value.get(key) {
            None => SchemaProblem::Missing,
            Some(v) if !kind.matches(v) => SchemaProblem::WrongType {
                expected: kind.name(),
            },
            Some(_) => continue,
        };

        warnings.push(SchemaWarning {
            path: format!("{}/{}", path, key),
            problem,
        });
    }
}

fn list<'v>(value: &'v Value, key: &str) -> &'v [Value] {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

pub fn validate_shape(document: &Value) -> Vec<SchemaWarning> {
    let mut warnings = Vec::new();

    if !document.is_object() {
        warnings.push(SchemaWarning {
            path: String::new(),
            problem: SchemaProblem::WrongType {
                expected: Kind::Object.name(),
            },
        });
        return warnings;
    }

    check_keys(document, "", MATCH_KEYS, &mut warnings);

    for (ri, round) in list(document, "gameRounds").iter().enumerate() {
        let round_path = format!("/gameRounds/{}", ri);
        check_keys(round, &round_path, ROUND_KEYS, &mut warnings);

        for (fi, frame) in list(round, "frames").iter().enumerate() {
            let frame_path = format!("{}/frames/{}", round_path, fi);
            check_keys(frame, &frame_path, FRAME_KEYS, &mut warnings);

            for side in ["t", "ct"] {
                let team = match frame.get(side) {
                    Some(t) => t,
                    None => continue,
                };

                for (pi, player) in list(team, "players").iter().enumerate() {
                    let player_path = format!("{}/{}/players/{}", frame_path, side, pi);
                    check_keys(player, &player_path, PLAYER_KEYS, &mut warnings);
                }
            }
        }
    }

    warnings
}

fn split_path(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('/')
}

/// The side a player list belongs to, from a path like
/// `/gameRounds/0/frames/3/ct/players/2`.
fn list_side(player_path: &str) -> Option<&'static str> {
    let mut segments = player_path.rsplit('/').skip(2);
    match segments.next() {
        Some("t") => Some("T"),
        Some("ct") => Some("CT"),
        _ => None,
    }
}

/// Fixes up what [`validate_shape`] reported so that the document
/// deserializes:
/// - a player without a usable `side` gets the side of the list it is in
/// - a player without a usable `steamID` is removed
/// - any other mistyped value is removed, or nulled for collections, so the
///   default applies
///
/// Returns the paths of the removed players.
pub fn repair(document: &mut Value, warnings: &[SchemaWarning]) -> Vec<String> {
    let mut removed = Vec::new();

    // Back to front, so removing a player does not shift the indices of the
    // ones still to be handled.
    for warning in warnings.iter().rev() {
        let (parent_path, key) = match split_path(&warning.path) {
            Some(split) => split,
            None => continue,
        };
        let is_player = parent_path
            .rsplit('/')
            .nth(1)
            .map(|segment| segment == "players")
            .unwrap_or(false);

        if is_player && key == "side" {
            let side = match list_side(parent_path) {
                Some(side) => side,
                None => continue,
            };
            if let Some(player) = document.pointer_mut(parent_path).and_then(Value::as_object_mut) {
                player.insert(key.to_owned(), Value::String(side.to_owned()));
            }
            continue;
        }

        if is_player && key == "steamID" {
            let (list_path, index) = match split_path(parent_path) {
                Some((list_path, index)) => (list_path, index.parse::<usize>().ok()),
                None => continue,
            };
            let players = document.pointer_mut(list_path).and_then(Value::as_array_mut);
            if let (Some(players), Some(index)) = (players, index) {
                if index < players.len() {
                    players.remove(index);
                    removed.push(parent_path.to_owned());
                }
            }
            continue;
        }

        let expected = match &warning.problem {
            SchemaProblem::WrongType { expected } => *expected,
            _ => continue,
        };
        if let Some(parent) = document.pointer_mut(parent_path).and_then(Value::as_object_mut) {
            if expected == Kind::List.name() {
                parent.insert(key.to_owned(), Value::Null);
            } else {
                parent.remove(key);
            }
        }
    }

    removed
}
