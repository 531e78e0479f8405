//! Flat projections of a record, one row per round, event, frame or player
//! in a frame. Every row carries the match id and map name as join keys, the
//! remaining match level values sit next to the tables.

use common::{
    BombEvent, Damage, Extra, Flash, FrameRecord, Grenade, Kill, MatchRecord, PlayerState,
    RoundRecord, Side, TeamState, WeaponFire,
};

/// Round columns that are passed through from the decoder output untouched.
const ROUND_PASSTHROUGH: [&str; 11] = [
    "winningTeam",
    "losingTeam",
    "ctFreezeTimeEndEqVal",
    "ctRoundStartEqVal",
    "ctRoundSpendMoney",
    "ctBuyType",
    "tFreezeTimeEndEqVal",
    "tRoundStartEqVal",
    "tRoundSpendMoney",
    "tBuyType",
    "bombPlantTick",
];

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRow {
    pub round_num: i64,
    pub start_tick: i64,
    pub freeze_time_end_tick: i64,
    pub end_tick: i64,
    pub end_official_tick: i64,
    pub t_score: i64,
    pub ct_score: i64,
    pub end_t_score: i64,
    #[serde(rename = "endCTScore")]
    pub end_ct_score: i64,
    pub t_team: String,
    pub ct_team: String,
    pub winning_side: String,
    pub round_end_reason: String,
    #[serde(flatten)]
    pub passthrough: Extra,
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub map_name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow<E> {
    #[serde(flatten)]
    pub event: E,
    pub round_num: i64,
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub map_name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRow {
    pub round_num: i64,
    pub tick: i64,
    pub seconds: f64,
    #[serde(rename = "globalFrameID")]
    pub global_frame_id: i64,
    pub ct_team_name: String,
    pub ct_eq_val: i64,
    pub ct_alive_players: i64,
    pub ct_utility: i64,
    pub t_team_name: String,
    pub t_eq_val: i64,
    pub t_alive_players: i64,
    pub t_utility: i64,
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub map_name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFrameRow {
    pub round_num: i64,
    pub tick: i64,
    pub seconds: f64,
    pub team_name: String,
    #[serde(rename = "steamID")]
    pub steam_id: u64,
    pub name: String,
    pub team: String,
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub is_alive: bool,
    /// Remaining scalar attributes of the player.
    #[serde(flatten)]
    pub attributes: Extra,
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub map_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tables {
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub client_name: String,
    pub map_name: String,
    pub tick_rate: i64,
    pub playback_ticks: i64,
    pub rounds: Vec<RoundRow>,
    pub kills: Vec<EventRow<Kill>>,
    pub damages: Vec<EventRow<Damage>>,
    pub grenades: Vec<EventRow<Grenade>>,
    pub flashes: Vec<EventRow<Flash>>,
    pub weapon_fires: Vec<EventRow<WeaponFire>>,
    pub bomb_events: Vec<EventRow<BombEvent>>,
    pub frames: Vec<FrameRow>,
    pub player_frames: Vec<PlayerFrameRow>,
}

struct Keys<'r> {
    match_id: &'r str,
    map_name: &'r str,
}

impl Keys<'_> {
    fn events<E: Clone>(&self, round: &RoundRecord, events: &[E]) -> Vec<EventRow<E>> {
        events
            .iter()
            .map(|event| EventRow {
                event: event.clone(),
                round_num: round.round_num,
                match_id: self.match_id.to_owned(),
                map_name: self.map_name.to_owned(),
            })
            .collect()
    }

    fn round(&self, round: &RoundRecord) -> RoundRow {
        let passthrough = ROUND_PASSTHROUGH
            .iter()
            .map(|key| {
                let value = round.extra.get(*key).cloned().unwrap_or_default();
                (key.to_string(), value)
            })
            .collect();

        RoundRow {
            round_num: round.round_num,
            start_tick: round.start_tick,
            freeze_time_end_tick: round.freeze_time_end_tick,
            end_tick: round.end_tick,
            end_official_tick: round.end_official_tick,
            t_score: round.t_score,
            ct_score: round.ct_score,
            end_t_score: round.end_t_score,
            end_ct_score: round.end_ct_score,
            t_team: round.t_team.clone(),
            ct_team: round.ct_team.clone(),
            winning_side: round.winning_side.clone(),
            round_end_reason: round.round_end_reason.clone(),
            passthrough,
            match_id: self.match_id.to_owned(),
            map_name: self.map_name.to_owned(),
        }
    }

    fn frame(&self, round: &RoundRecord, frame: &FrameRecord) -> FrameRow {
        FrameRow {
            round_num: round.round_num,
            tick: frame.tick,
            seconds: frame.seconds,
            global_frame_id: frame.global_frame_id,
            ct_team_name: frame.ct.team_name.clone(),
            ct_eq_val: frame.ct.team_eq_val,
            ct_alive_players: frame.ct.alive_players,
            ct_utility: frame.ct.total_utility,
            t_team_name: frame.t.team_name.clone(),
            t_eq_val: frame.t.team_eq_val,
            t_alive_players: frame.t.alive_players,
            t_utility: frame.t.total_utility,
            match_id: self.match_id.to_owned(),
            map_name: self.map_name.to_owned(),
        }
    }

    fn player_frame(
        &self,
        round: &RoundRecord,
        frame: &FrameRecord,
        team: &TeamState,
        player: &PlayerState,
    ) -> PlayerFrameRow {
        // Nested values (e.g. spotted-by lists) do not fit a flat row.
        let attributes = player
            .extra
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        PlayerFrameRow {
            round_num: round.round_num,
            tick: frame.tick,
            seconds: frame.seconds,
            team_name: team.team_name.clone(),
            steam_id: player.steam_id,
            name: player.name.clone(),
            team: player.team.clone(),
            side: player.side,
            x: player.x,
            y: player.y,
            z: player.z,
            is_alive: player.is_alive,
            attributes,
            match_id: self.match_id.to_owned(),
            map_name: self.map_name.to_owned(),
        }
    }
}

impl Tables {
    pub fn from_record(record: &MatchRecord) -> Self {
        let keys = Keys {
            match_id: &record.match_id,
            map_name: &record.map_name,
        };

        let mut tables = Self {
            match_id: record.match_id.clone(),
            client_name: record.client_name.clone(),
            map_name: record.map_name.clone(),
            tick_rate: record.tick_rate,
            playback_ticks: record.playback_ticks,
            ..Default::default()
        };
        for round in record.game_rounds.iter() {
            tables.rounds.push(keys.round(round));

            tables.kills.extend(keys.events(round, &round.kills));
            tables.damages.extend(keys.events(round, &round.damages));
            tables.grenades.extend(keys.events(round, &round.grenades));
            tables.flashes.extend(keys.events(round, &round.flashes));
            tables.weapon_fires.extend(keys.events(round, &round.weapon_fires));
            tables.bomb_events.extend(keys.events(round, &round.bomb_events));

            for frame in round.frames.iter() {
                tables.frames.push(keys.frame(round, frame));

                for side in [Side::CT, Side::T] {
                    let team = frame.team(side);
                    tables.player_frames.extend(
                        team.players
                            .iter()
                            .map(|player| keys.player_frame(round, frame, team, player)),
                    );
                }
            }
        }

        tables
    }

    /// The match level values as one JSON object.
    pub fn match_info(&self) -> serde_json::Value {
        serde_json::json!({
            "matchID": self.match_id,
            "clientName": self.client_name,
            "mapName": self.map_name,
            "tickRate": self.tick_rate,
            "playbackTicks": self.playback_ticks,
        })
    }

    /// Table names paired with their rows as JSON, in a stable order. The
    /// match level values come first under `match`.
    pub fn named(&self) -> serde_json::Result<Vec<(&'static str, serde_json::Value)>> {
        Ok(vec![
            ("match", self.match_info()),
            ("rounds", serde_json::to_value(&self.rounds)?),
            ("kills", serde_json::to_value(&self.kills)?),
            ("damages", serde_json::to_value(&self.damages)?),
            ("grenades", serde_json::to_value(&self.grenades)?),
            ("flashes", serde_json::to_value(&self.flashes)?),
            ("weaponFires", serde_json::to_value(&self.weapon_fires)?),
            ("bombEvents", serde_json::to_value(&self.bomb_events)?),
            ("frames", serde_json::to_value(&self.frames)?),
            ("playerFrames", serde_json::to_value(&self.player_frames)?),
        ])
    }
}
