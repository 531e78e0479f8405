use crate::{null_as_default, Extra, Side};

/// Access to the `(steamID, side)` pairs an event carries for its participants.
///
/// The side labels have to agree with the participant's side in the frames of
/// the same round, so anything that moves a player between sides goes through
/// this trait.
pub trait Participants {
    fn participants(&self) -> Vec<(Option<u64>, Option<Side>)>;

    fn participants_mut(&mut self) -> Vec<(Option<u64>, &mut Option<Side>)>;

    fn involves(&self, steam_id: u64) -> bool {
        self.participants()
            .iter()
            .any(|(id, _)| *id == Some(steam_id))
    }

    /// Flips every side label belonging to `steam_id`. Unset labels stay unset.
    fn flip_side_of(&mut self, steam_id: u64) {
        for (id, side) in self.participants_mut() {
            if id != Some(steam_id) {
                continue;
            }

            if let Some(side) = side.as_mut() {
                *side = side.opposite();
            }
        }
    }
}

macro_rules! participants {
    ($event:ty { $($id:ident => $side:ident),+ }) => {
        impl Participants for $event {
            fn participants(&self) -> Vec<(Option<u64>, Option<Side>)> {
                vec![$((self.$id, self.$side)),+]
            }

            fn participants_mut(&mut self) -> Vec<(Option<u64>, &mut Option<Side>)> {
                vec![$((self.$id, &mut self.$side)),+]
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kill {
    #[serde(rename = "attackerSteamID", default)]
    pub attacker_steam_id: Option<u64>,
    #[serde(default)]
    pub attacker_side: Option<Side>,
    #[serde(rename = "victimSteamID", default)]
    pub victim_steam_id: Option<u64>,
    #[serde(default)]
    pub victim_side: Option<Side>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weapon: String,
    #[serde(flatten)]
    pub extra: Extra,
}

participants!(Kill {
    attacker_steam_id => attacker_side,
    victim_steam_id => victim_side
});

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Damage {
    #[serde(rename = "attackerSteamID", default)]
    pub attacker_steam_id: Option<u64>,
    #[serde(default)]
    pub attacker_side: Option<Side>,
    #[serde(rename = "victimSteamID", default)]
    pub victim_steam_id: Option<u64>,
    #[serde(default)]
    pub victim_side: Option<Side>,
    #[serde(flatten)]
    pub extra: Extra,
}

participants!(Damage {
    attacker_steam_id => attacker_side,
    victim_steam_id => victim_side
});

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grenade {
    #[serde(rename = "throwerSteamID", default)]
    pub thrower_steam_id: Option<u64>,
    #[serde(default)]
    pub thrower_side: Option<Side>,
    #[serde(flatten)]
    pub extra: Extra,
}

participants!(Grenade {
    thrower_steam_id => thrower_side
});

/// `attacker` threw the flashbang, `player` is the one who got blinded.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flash {
    #[serde(rename = "attackerSteamID", default)]
    pub attacker_steam_id: Option<u64>,
    #[serde(default)]
    pub attacker_side: Option<Side>,
    #[serde(rename = "playerSteamID", default)]
    pub player_steam_id: Option<u64>,
    #[serde(default)]
    pub player_side: Option<Side>,
    #[serde(flatten)]
    pub extra: Extra,
}

participants!(Flash {
    attacker_steam_id => attacker_side,
    player_steam_id => player_side
});

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponFire {
    #[serde(rename = "playerSteamID", default)]
    pub player_steam_id: Option<u64>,
    #[serde(default)]
    pub player_side: Option<Side>,
    #[serde(flatten)]
    pub extra: Extra,
}

participants!(WeaponFire {
    player_steam_id => player_side
});

/// Bomb plants/defuses only matter for export, they carry no side label.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombEvent {
    #[serde(rename = "playerSteamID", default)]
    pub player_steam_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}
