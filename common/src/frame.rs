use crate::{null_as_default, Extra, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A snapshot of the game state, sampled every few ticks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    #[serde(default)]
    pub tick: i64,
    #[serde(default)]
    pub seconds: f64,
    #[serde(rename = "globalFrameID", default)]
    pub global_frame_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub t: TeamState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ct: TeamState,
    #[serde(flatten)]
    pub extra: Extra,
}

impl FrameRecord {
    pub fn new(tick: i64, t: Vec<PlayerState>, ct: Vec<PlayerState>) -> Self {
        Self {
            tick,
            seconds: 0.0,
            global_frame_id: 0,
            t: TeamState::with_players(t),
            ct: TeamState::with_players(ct),
            extra: Extra::new(),
        }
    }

    pub fn team(&self, side: Side) -> &TeamState {
        match side {
            Side::T => &self.t,
            Side::CT => &self.ct,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut TeamState {
        match side {
            Side::T => &mut self.t,
            Side::CT => &mut self.ct,
        }
    }

    /// Every player in the frame, paired with the team list it was found in.
    pub fn players(&self) -> impl Iterator<Item = (Side, &PlayerState)> {
        self.t
            .players
            .iter()
            .map(|p| (Side::T, p))
            .chain(self.ct.players.iter().map(|p| (Side::CT, p)))
    }

    pub fn find_player(&self, steam_id: u64) -> Option<(Side, &PlayerState)> {
        self.players().find(|(_, p)| p.steam_id == steam_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_name: String,
    #[serde(default)]
    pub team_eq_val: i64,
    #[serde(default)]
    pub alive_players: i64,
    #[serde(default)]
    pub total_utility: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<PlayerState>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl TeamState {
    pub fn with_players(players: Vec<PlayerState>) -> Self {
        Self {
            players,
            ..Default::default()
        }
    }

    pub fn position_of(&self, steam_id: u64) -> Option<usize> {
        self.players.iter().position(|p| p.steam_id == steam_id)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(rename = "steamID")]
    pub steam_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: String,
    pub side: Side,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub is_alive: bool,
    /// Opaque to cleaning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PlayerState {
    pub fn new(steam_id: u64, name: impl Into<String>, side: Side, position: Position) -> Self {
        Self {
            steam_id,
            name: name.into(),
            team: String::new(),
            side,
            x: position.x,
            y: position.y,
            z: position.z,
            is_alive: true,
            inventory: None,
            extra: Extra::new(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    pub fn is_at_origin(&self) -> bool {
        self.position() == Position::ORIGIN
    }
}
