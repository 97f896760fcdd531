// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Decoders for the save schemas written by earlier releases.
//!
//! Each schema has its own wire structs. Decoding is two-pass: records are first staged with
//! their raw link targets, then links are resolved against the full decoded set so link order
//! in the blob never matters and links to unknown positions are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{BlockPos, ClientData, OverlayKey, PlayerUid, TeleportPoint};

use super::codec::{CodecError, SaveSchema};

/// Legacy schemas, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LegacySchema {
    /// List of records with nested neighbour stubs and per-player client data.
    ModernLegacy,
    /// Like `ModernLegacy`, but with one top-level icon and color instead of client data.
    PreIconColor,
    /// Records with nested neighbour stubs and nothing else.
    EarliestNeighbour,
    /// Neighbours stored as bare positions.
    RawPosition,
    /// Map from position to `{name, available, activated_by}`; no links.
    KeyedMap,
}

/// Order in which legacy schemas are tried after the current one.
pub const LEGACY_CHAIN: [LegacySchema; 5] = [
    LegacySchema::ModernLegacy,
    LegacySchema::PreIconColor,
    LegacySchema::EarliestNeighbour,
    LegacySchema::RawPosition,
    LegacySchema::KeyedMap,
];

impl LegacySchema {
    pub fn ordinal(self) -> usize {
        match self {
            Self::ModernLegacy => 1,
            Self::PreIconColor => 2,
            Self::EarliestNeighbour => 3,
            Self::RawPosition => 4,
            Self::KeyedMap => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ModernLegacy => "modern-legacy",
            Self::PreIconColor => "pre-icon-color",
            Self::EarliestNeighbour => "earliest-neighbour",
            Self::RawPosition => "raw-position",
            Self::KeyedMap => "keyed-map",
        }
    }

    /// Attempts to decode `bytes` in this schema and upgrade the result.
    pub fn decode(self, bytes: &[u8]) -> Result<Vec<TeleportPoint>, CodecError> {
        let staged = match self {
            Self::ModernLegacy => parse::<Vec<ModernLegacyRecord>>(self, bytes)?
                .into_iter()
                .map(ModernLegacyRecord::stage)
                .collect(),
            Self::PreIconColor => parse::<Vec<PreIconColorRecord>>(self, bytes)?
                .into_iter()
                .map(PreIconColorRecord::stage)
                .collect(),
            Self::EarliestNeighbour => parse::<Vec<EarliestNeighbourRecord>>(self, bytes)?
                .into_iter()
                .map(EarliestNeighbourRecord::stage)
                .collect(),
            Self::RawPosition => parse::<Vec<RawPositionRecord>>(self, bytes)?
                .into_iter()
                .map(RawPositionRecord::stage)
                .collect(),
            Self::KeyedMap => parse::<BTreeMap<BlockPos, KeyedMapEntry>>(self, bytes)?
                .into_iter()
                .map(|(pos, entry)| entry.stage(pos))
                .collect(),
        };
        Ok(resolve_links(staged))
    }
}

impl fmt::Display for LegacySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.ordinal(), self.name())
    }
}

fn parse<T: DeserializeOwned>(schema: LegacySchema, bytes: &[u8]) -> Result<T, CodecError> {
    rmp_serde::from_slice(bytes).map_err(|err| CodecError::SchemaMismatch {
        schema: SaveSchema::Legacy(schema),
        reason: err.to_string(),
    })
}

/// Neighbour reference as written by schemas #1 to #3: a record holding only the position.
#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct LinkedStub {
    pub(crate) pos: BlockPos,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct ModernLegacyRecord {
    pub(crate) pos: BlockPos,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) neighbours: Vec<LinkedStub>,
    pub(crate) activated_by_players: Vec<String>,
    pub(crate) client_data: BTreeMap<String, ClientData>,
}

impl ModernLegacyRecord {
    fn stage(self) -> Staged {
        let mut staged = Staged::new(self.pos, self.name, self.enabled, self.activated_by_players);
        staged.links = self.neighbours.into_iter().map(|stub| stub.pos).collect();
        for (raw_key, data) in self.client_data {
            staged.point.set_client_data(OverlayKey::from(raw_key), data);
        }
        staged
    }
}

#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct PreIconColorRecord {
    pub(crate) pos: BlockPos,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) neighbours: Vec<LinkedStub>,
    pub(crate) activated_by_players: Vec<String>,
    // Identify the schema; the upgrade discards them.
    pub(crate) icon: String,
    pub(crate) color: i32,
}

impl PreIconColorRecord {
    fn stage(self) -> Staged {
        debug!(pos = %self.pos, icon = %self.icon, color = self.color, "discarding legacy icon and color");
        let mut staged = Staged::new(self.pos, self.name, self.enabled, self.activated_by_players);
        staged.links = self.neighbours.into_iter().map(|stub| stub.pos).collect();
        staged
    }
}

#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct EarliestNeighbourRecord {
    pub(crate) pos: BlockPos,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) neighbours: Vec<LinkedStub>,
    pub(crate) activated_by_players: Vec<String>,
}

impl EarliestNeighbourRecord {
    fn stage(self) -> Staged {
        let mut staged = Staged::new(self.pos, self.name, self.enabled, self.activated_by_players);
        staged.links = self.neighbours.into_iter().map(|stub| stub.pos).collect();
        staged
    }
}

#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct RawPositionRecord {
    pub(crate) enabled: bool,
    pub(crate) name: String,
    pub(crate) pos: BlockPos,
    pub(crate) activated_by_players: Vec<String>,
    pub(crate) neighbours: Vec<BlockPos>,
}

impl RawPositionRecord {
    fn stage(self) -> Staged {
        let mut staged = Staged::new(self.pos, self.name, self.enabled, self.activated_by_players);
        staged.links = self.neighbours;
        staged
    }
}

#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(deny_unknown_fields)]
pub(crate) struct KeyedMapEntry {
    pub(crate) name: String,
    pub(crate) available: bool,
    pub(crate) activated_by: Vec<String>,
}

impl KeyedMapEntry {
    fn stage(self, pos: BlockPos) -> Staged {
        Staged::new(pos, self.name, self.available, self.activated_by)
    }
}

/// A decoded point whose links are not yet resolved.
#[derive(Debug)]
struct Staged {
    point: TeleportPoint,
    links: Vec<BlockPos>,
}

impl Staged {
    fn new(pos: BlockPos, name: String, enabled: bool, players: Vec<String>) -> Self {
        let mut point = TeleportPoint::new(pos, name, enabled);
        for raw in players {
            match PlayerUid::new(&raw) {
                Ok(player) => {
                    point.activate_for(player);
                }
                Err(err) => warn!(%pos, player = %raw, error = %err, "dropped invalid legacy player id"),
            }
        }
        Self { point, links: Vec::new() }
    }
}

fn resolve_links(staged: Vec<Staged>) -> Vec<TeleportPoint> {
    let known = staged.iter().map(|entry| entry.point.pos()).collect::<BTreeSet<_>>();
    staged
        .into_iter()
        .map(|Staged { mut point, links }| {
            let owner = point.pos();
            for target in links {
                if target != owner && known.contains(&target) {
                    point.neighbours_mut().insert(target);
                } else {
                    debug!(%owner, %target, "dropped unresolvable legacy link");
                }
            }
            point
        })
        .collect()
}
