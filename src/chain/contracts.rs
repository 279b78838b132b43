//! Contracts of the tokens that make up a citizen (identity, item, vault,
//! land), per season.

use std::{fmt, str::FromStr};

use crate::{
    chain::Address,
    foundation::{
        core::Season,
        error::{CitizenError, CitizenResult},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartKind {
    Identity,
    Item,
    Vault,
    Land,
}

impl PartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Item => "item",
            Self::Vault => "vault",
            Self::Land => "land",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `id` is an alias of `identity`.
impl FromStr for PartKind {
    type Err = CitizenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" | "id" => Ok(Self::Identity),
            "item" => Ok(Self::Item),
            "vault" => Ok(Self::Vault),
            "land" => Ok(Self::Land),
            _ => Err(CitizenError::validation("unknown part")),
        }
    }
}

fn current_address(season: Season, kind: PartKind) -> Option<&'static str> {
    use PartKind::*;
    match (season, kind) {
        (Season::ONE, Identity) => Some("0x059174c2Fef43F06178D23572FE5556F078F2F99"),
        (Season::ONE, Item) => Some("0xE7489EA1847395d7EeAd33E9c85fe327D513D249"),
        (Season::ONE, Vault) => Some("0x17B2f2b8927A8f11edfd7a27E153Be17d68E69C7"),
        (Season::ONE, Land) => Some("0xCFc6a15b2952B6014A993a0C16c9D580d862e21A"),
        (Season::TWO, Identity) => Some("0x8E9F3C6883993A7A69c37213F2eb9A17450ad6D3"),
        (Season::TWO, Item) => Some("0x0B8F04F2cA4f15d33274a27439412ab7639EFAd9"),
        (Season::TWO, Land) => Some("0xB58aE9e93b8bee7d890AD87A2a70c135a3Bf4B4e"),
        _ => None,
    }
}

fn legacy_address(season: Season, kind: PartKind) -> Option<&'static str> {
    use PartKind::*;
    match (season, kind) {
        (Season::ONE, Item) => Some("0x0938E3F7AC6D7f674FeD551c93f363109bda3AF9"),
        (Season::ONE, Vault) => Some("0xab0b0dD7e4EaB0F9e31a539074a03f1C1Be80879"),
        (Season::ONE, Land) => Some("0x3C54b798b3aAD4F6089533aF3bdbD6ce233019bB"),
        (Season::TWO, Identity) => Some("0x698FbAACA64944376e2CDC4CAD86eaa91362cF54"),
        (Season::TWO, Item) => Some("0x7AC66d40d80D2d8D1E45D6b5B10a1C9D1fd69354"),
        (Season::TWO, Land) => Some("0xf90980AE7A44E2d18B9615396FF5E9252F1DF639"),
        _ => None,
    }
}

/// `(current, legacy)` contracts for a part, or a validation error when the
/// season has no such part (season two has no vaults).
pub fn part_contracts(
    season: Season,
    kind: PartKind,
) -> CitizenResult<(Address, Option<Address>)> {
    let current = current_address(season, kind)
        .ok_or_else(|| CitizenError::validation("unknown part"))?
        .parse::<Address>()?;
    let legacy = legacy_address(season, kind).map(str::parse::<Address>).transpose()?;
    Ok((current, legacy))
}
