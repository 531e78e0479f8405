use crate::{
    null_as_default, BombEvent, Damage, Extra, Flash, FrameRecord, Grenade, Kill, Participants,
    Side, WeaponFire,
};

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(rename = "matchID", default, deserialize_with = "null_as_default")]
    pub match_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub map_name: String,
    #[serde(default)]
    pub tick_rate: i64,
    #[serde(default)]
    pub playback_ticks: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_phases: Extra,
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_rounds: Vec<RoundRecord>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl MatchRecord {
    /// Whether the decoder saw the warmup period end.
    pub fn has_warmup_marker(&self) -> bool {
        self.match_phases
            .get("warmupChanged")
            .map(|v| !v.is_null())
            .unwrap_or(false)
    }

    pub fn frames(&self) -> impl Iterator<Item = &FrameRecord> {
        self.game_rounds.iter().flat_map(|r| r.frames.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    #[serde(default)]
    pub round_num: i64,
    #[serde(default)]
    pub is_warmup: bool,
    #[serde(default)]
    pub start_tick: i64,
    #[serde(default)]
    pub freeze_time_end_tick: i64,
    #[serde(default)]
    pub end_tick: i64,
    #[serde(default)]
    pub end_official_tick: i64,
    #[serde(default)]
    pub t_score: i64,
    #[serde(default)]
    pub ct_score: i64,
    #[serde(default)]
    pub end_t_score: i64,
    #[serde(rename = "endCTScore", default)]
    pub end_ct_score: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub t_team: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ct_team: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub winning_side: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub round_end_reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub t_side: TeamRoster,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ct_side: TeamRoster,
    #[serde(default, deserialize_with = "null_as_default")]
    pub frames: Vec<FrameRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kills: Vec<Kill>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub damages: Vec<Damage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub grenades: Vec<Grenade>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flashes: Vec<Flash>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weapon_fires: Vec<WeaponFire>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bomb_events: Vec<BombEvent>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RoundRecord {
    pub fn first_frame(&self) -> Option<&FrameRecord> {
        self.frames.first()
    }

    /// Number of players on `side` in the first frame, 0 without frames.
    pub fn player_count(&self, side: Side) -> usize {
        self.first_frame()
            .map(|f| f.team(side).players.len())
            .unwrap_or(0)
    }

    /// Sum of the scores at the start and the end of the round.
    pub fn score_total(&self) -> i64 {
        self.t_score + self.ct_score + self.end_t_score + self.end_ct_score
    }

    pub fn roster(&self, side: Side) -> &TeamRoster {
        match side {
            Side::T => &self.t_side,
            Side::CT => &self.ct_side,
        }
    }

    pub fn roster_mut(&mut self, side: Side) -> &mut TeamRoster {
        match side {
            Side::T => &mut self.t_side,
            Side::CT => &mut self.ct_side,
        }
    }

    /// Every event of the round that carries side labels.
    pub fn events(&self) -> impl Iterator<Item = &dyn Participants> {
        self.kills
            .iter()
            .map(|e| e as &dyn Participants)
            .chain(self.damages.iter().map(|e| e as &dyn Participants))
            .chain(self.grenades.iter().map(|e| e as &dyn Participants))
            .chain(self.flashes.iter().map(|e| e as &dyn Participants))
            .chain(self.weapon_fires.iter().map(|e| e as &dyn Participants))
    }

    /// Removes the player from the roster pair, from every frame and drops every
    /// event they took part in. Returns whether anything was removed.
    pub fn remove_player(&mut self, steam_id: u64) -> bool {
        let before = self.footprint();

        for side in Side::BOTH {
            self.roster_mut(side)
                .players
                .retain(|p| p.steam_id != steam_id);
        }

        for frame in self.frames.iter_mut() {
            for side in Side::BOTH {
                frame
                    .team_mut(side)
                    .players
                    .retain(|p| p.steam_id != steam_id);
            }
        }

        self.kills.retain(|e| !e.involves(steam_id));
        self.damages.retain(|e| !e.involves(steam_id));
        self.grenades.retain(|e| !e.involves(steam_id));
        self.flashes.retain(|e| !e.involves(steam_id));
        self.weapon_fires.retain(|e| !e.involves(steam_id));

        before != self.footprint()
    }

    /// Moves the player to the other side in the roster pair and in every frame,
    /// and flips their side label on every event. Applying it twice restores the
    /// round up to the order of the player lists.
    pub fn switch_player_side(&mut self, steam_id: u64) {
        for side in Side::BOTH {
            if let Some(idx) = self.roster(side).position_of(steam_id) {
                let entry = self.roster_mut(side).players.remove(idx);
                self.roster_mut(side.opposite()).players.push(entry);
                break;
            }
        }

        for frame in self.frames.iter_mut() {
            for side in Side::BOTH {
                if let Some(idx) = frame.team(side).position_of(steam_id) {
                    let mut player = frame.team_mut(side).players.remove(idx);
                    player.side = player.side.opposite();
                    frame.team_mut(side.opposite()).players.push(player);
                    break;
                }
            }
        }

        self.kills.iter_mut().for_each(|e| e.flip_side_of(steam_id));
        self.damages.iter_mut().for_each(|e| e.flip_side_of(steam_id));
        self.grenades.iter_mut().for_each(|e| e.flip_side_of(steam_id));
        self.flashes.iter_mut().for_each(|e| e.flip_side_of(steam_id));
        self.weapon_fires
            .iter_mut()
            .for_each(|e| e.flip_side_of(steam_id));
    }

    fn footprint(&self) -> usize {
        self.t_side.players.len()
            + self.ct_side.players.len()
            + self
                .frames
                .iter()
                .map(|f| f.t.players.len() + f.ct.players.len())
                .sum::<usize>()
            + self.kills.len()
            + self.damages.len()
            + self.grenades.len()
            + self.flashes.len()
            + self.weapon_fires.len()
    }
}

/// Round level roster, kept separately from the per frame team lists.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoster {
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<RosterEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl TeamRoster {
    pub fn position_of(&self, steam_id: u64) -> Option<usize> {
        self.players.iter().position(|p| p.steam_id == steam_id)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(rename = "steamID")]
    pub steam_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RosterEntry {
    pub fn new(steam_id: u64, player_name: impl Into<String>) -> Self {
        Self {
            steam_id,
            player_name: player_name.into(),
            extra: Extra::new(),
        }
    }
}
