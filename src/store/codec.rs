// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Current save schema and the decode entry point that falls back to legacy schemas.
//!
//! A save is a MessagePack map `{magic, version, points}`. Every wire struct denies unknown
//! fields and requires all of its fields, which is what lets a trial decode tell schemas apart.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::model::{BlockPos, ClientData, OverlayKey, PlayerUid, TeleportPoint};

use super::legacy::{LegacySchema, LEGACY_CHAIN};

pub const SAVE_MAGIC: &str = "tpnet";
/// Five legacy generations came before this one.
pub const SAVE_VERSION: u32 = 6;

/// Which schema a blob was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveSchema {
    Current,
    Legacy(LegacySchema),
}

impl SaveSchema {
    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

impl fmt::Display for SaveSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current (v{SAVE_VERSION})"),
            Self::Legacy(schema) => write!(f, "legacy {schema}"),
        }
    }
}

/// One failed trial decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaAttempt {
    pub schema: SaveSchema,
    pub reason: String,
}

impl fmt::Display for SchemaAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.schema, self.reason)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("save does not match the {schema} schema: {reason}")]
    SchemaMismatch { schema: SaveSchema, reason: String },
    #[error("teleport data could not be recovered: no schema matched ({})", format_attempts(.attempts))]
    MigrationExhausted { attempts: Vec<SchemaAttempt> },
    #[error("cannot encode save: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

fn format_attempts(attempts: &[SchemaAttempt]) -> String {
    attempts.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Decoded blob plus the schema that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSave {
    pub schema: SaveSchema,
    pub points: Vec<TeleportPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SaveEnvelope {
    magic: String,
    version: u32,
    points: Vec<PointRecord>,
}

/// Wire form of one teleport point in the current schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointRecord {
    pub pos: BlockPos,
    pub name: String,
    pub enabled: bool,
    pub is_global: bool,
    pub neighbours: Vec<BlockPos>,
    pub activated_by_players: Vec<PlayerUid>,
    pub client_data: BTreeMap<OverlayKey, ClientData>,
}

impl From<&TeleportPoint> for PointRecord {
    fn from(point: &TeleportPoint) -> Self {
        Self {
            pos: point.pos(),
            name: point.name().to_owned(),
            enabled: point.enabled(),
            is_global: point.is_global(),
            neighbours: point.neighbours().iter().copied().collect(),
            activated_by_players: point.activated_by().iter().cloned().collect(),
            client_data: point.client_data().clone(),
        }
    }
}

impl From<PointRecord> for TeleportPoint {
    fn from(record: PointRecord) -> Self {
        let mut point = TeleportPoint::new(record.pos, record.name, record.enabled);
        point.set_global(record.is_global);
        point.neighbours_mut().extend(record.neighbours);
        for player in record.activated_by_players {
            point.activate_for(player);
        }
        *point.client_data_mut() = record.client_data;
        point
    }
}

/// Encodes `points` in the current schema.
pub fn encode_points(points: &[TeleportPoint]) -> Result<Vec<u8>, CodecError> {
    let envelope = SaveEnvelope {
        magic: SAVE_MAGIC.to_owned(),
        version: SAVE_VERSION,
        points: points.iter().map(PointRecord::from).collect(),
    };
    Ok(rmp_serde::to_vec_named(&envelope)?)
}

/// Decodes a blob written in the current schema only.
pub fn decode_points(bytes: &[u8]) -> Result<Vec<TeleportPoint>, CodecError> {
    let mismatch = |reason: String| CodecError::SchemaMismatch { schema: SaveSchema::Current, reason };

    let envelope: SaveEnvelope =
        rmp_serde::from_slice(bytes).map_err(|err| mismatch(err.to_string()))?;
    if envelope.magic != SAVE_MAGIC {
        return Err(mismatch(format!("unexpected magic '{}'", envelope.magic)));
    }
    if envelope.version != SAVE_VERSION {
        return Err(mismatch(format!(
            "unsupported version {} (expected {SAVE_VERSION})",
            envelope.version
        )));
    }
    Ok(envelope.points.into_iter().map(TeleportPoint::from).collect())
}

/// Decodes a blob with the current schema, then each legacy schema in order.
///
/// The first schema that decodes wins. When none does, every attempt and its reason is
/// reported in `MigrationExhausted`. A zero-length blob is an empty network.
pub fn decode_save(bytes: &[u8]) -> Result<DecodedSave, CodecError> {
    if bytes.is_empty() {
        debug!("empty save blob, nothing to decode");
        return Ok(DecodedSave { schema: SaveSchema::Current, points: Vec::new() });
    }

    let mut attempts = Vec::with_capacity(LEGACY_CHAIN.len() + 1);

    match decode_points(bytes) {
        Ok(points) => return Ok(DecodedSave { schema: SaveSchema::Current, points }),
        Err(err) => {
            debug!(error = %err, "current schema did not match");
            attempts.push(attempt_from(SaveSchema::Current, err));
        }
    }

    for schema in LEGACY_CHAIN {
        match schema.decode(bytes) {
            Ok(points) => {
                debug!(%schema, count = points.len(), "decoded legacy save");
                return Ok(DecodedSave { schema: SaveSchema::Legacy(schema), points });
            }
            Err(err) => {
                debug!(%schema, error = %err, "legacy schema did not match");
                attempts.push(attempt_from(SaveSchema::Legacy(schema), err));
            }
        }
    }

    error!(attempts = attempts.len(), "teleport data could not be recovered from any known schema");
    Err(CodecError::MigrationExhausted { attempts })
}

fn attempt_from(schema: SaveSchema, err: CodecError) -> SchemaAttempt {
    let reason = match err {
        CodecError::SchemaMismatch { reason, .. } => reason,
        other => other.to_string(),
    };
    SchemaAttempt { schema, reason }
}
