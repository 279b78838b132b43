//! On-chain token URI lookup.

pub mod abi;
pub mod contracts;
pub mod rpc;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::foundation::{
    core::Season,
    error::{CitizenError, CitizenResult},
};

pub use contracts::{PartKind, part_contracts};
pub use rpc::RpcTokenSource;

/// 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl FromStr for Address {
    type Err = CitizenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let raw = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let mut out = [0u8; 20];
        hex::decode_to_slice(raw, &mut out)
            .map_err(|e| CitizenError::validation(format!("invalid address '{s}': {e}")))?;
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Anything that can answer `tokenURI(id)` for a contract.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token_uri(&self, contract: Address, id: u64) -> CitizenResult<String>;
}

/// Current contract first, then the legacy one. The error of the last
/// attempt is returned when both fail.
pub async fn token_uri_with_fallback(
    source: &dyn TokenSource,
    current: Address,
    legacy: Option<Address>,
    id: u64,
) -> CitizenResult<String> {
    match source.token_uri(current, id).await {
        Ok(uri) => Ok(uri),
        Err(err) => {
            let Some(legacy) = legacy else {
                return Err(err);
            };
            debug!(%current, %legacy, id, error = %err, "current contract failed, trying legacy");
            source.token_uri(legacy, id).await.inspect_err(|e| {
                warn!(%legacy, id, error = %e, "token not found on either contract");
            })
        }
    }
}

/// The citizen contracts of one season.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeasonContracts {
    /// The first-generation (v1) contract.
    pub legacy: Address,
    /// The migrated (v2) contract, queried first.
    pub current: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitizenContracts {
    pub season_one: SeasonContracts,
    pub season_two: SeasonContracts,
}

impl CitizenContracts {
    pub fn for_season(&self, season: Season) -> CitizenResult<SeasonContracts> {
        match season {
            Season::ONE => Ok(self.season_one),
            Season::TWO => Ok(self.season_two),
            other => Err(CitizenError::validation(format!("unknown season {other}"))),
        }
    }

    /// Resolve a citizen's token URI, v2 contract first.
    pub async fn resolve(
        &self,
        source: &dyn TokenSource,
        season: Season,
        id: u64,
    ) -> CitizenResult<String> {
        let c = self.for_season(season)?;
        token_uri_with_fallback(source, c.current, Some(c.legacy), id).await
    }
}
