// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for the teleport network.
//!
//! A batch of operations is applied to a copy of the registry and committed only if every
//! operation succeeds, so readers never observe a half-applied batch and a failed batch leaves
//! the registry untouched. Each committed batch produces a coarse delta of affected positions.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{BlockPos, ClientData, OverlayKey, PlayerUid, TeleportPoint};
use crate::registry::PointRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Insert or overwrite a whole point; its neighbour set is reconciled with the graph.
    Upsert { point: TeleportPoint },
    Remove { pos: BlockPos },
    Link { a: BlockPos, b: BlockPos },
    Unlink { a: BlockPos, b: BlockPos },
    Update { pos: BlockPos, patch: PointPatch },
    Unlock { pos: BlockPos, player: PlayerUid },
}

/// Partial edit of an existing point.
///
/// Scalar fields overwrite when set. `client_data` entries are merged per key; `link`,
/// `unlink` and `unlock` are applied as deltas through the same rules as the matching ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointPatch {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub is_global: Option<bool>,
    pub client_data: BTreeMap<OverlayKey, ClientData>,
    pub link: Vec<BlockPos>,
    pub unlink: Vec<BlockPos>,
    pub unlock: Vec<PlayerUid>,
}

impl PointPatch {
    /// Patch carrying the editable fields of an edited copy of a point.
    ///
    /// Links and unlocks are left alone: an edit dialog works on a stale copy, and replaying
    /// its sets would undo concurrent link or unlock changes.
    pub fn from_edited(point: &TeleportPoint) -> Self {
        Self {
            name: Some(point.name().to_owned()),
            enabled: Some(point.enabled()),
            is_global: Some(point.is_global()),
            client_data: point.client_data().clone(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Positions affected by a committed batch, each list sorted.
///
/// `updated` includes points whose neighbour set changed only as a side effect (reverse links).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<BlockPos>,
    pub removed: Vec<BlockPos>,
    pub updated: Vec<BlockPos>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<BlockPos>,
    removed: BTreeSet<BlockPos>,
    updated: BTreeSet<BlockPos>,
}

impl DeltaBuilder {
    fn record_added(&mut self, pos: BlockPos) {
        // Removed and re-added within one batch reads as an update to observers.
        if self.removed.remove(&pos) {
            self.updated.insert(pos);
            return;
        }
        self.updated.remove(&pos);
        self.added.insert(pos);
    }

    fn record_removed(&mut self, pos: BlockPos) {
        self.updated.remove(&pos);
        if self.added.remove(&pos) {
            return;
        }
        self.removed.insert(pos);
    }

    fn record_updated(&mut self, pos: BlockPos) {
        if self.added.contains(&pos) || self.removed.contains(&pos) {
            return;
        }
        self.updated.insert(pos);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

/// Applies `ops` atomically.
///
/// `base_rev` is the revision the caller based its edit on; `None` skips the check.
pub fn apply_ops(
    registry: &mut PointRegistry,
    base_rev: Option<u64>,
    ops: &[Op],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = registry.rev();
    if let Some(base_rev) = base_rev {
        if base_rev != current_rev {
            return Err(ApplyError::Conflict { base_rev, current_rev });
        }
    }

    if ops.is_empty() {
        return Ok(ApplyResult { new_rev: current_rev, applied: 0, delta: Delta::default() });
    }

    let mut next = registry.clone();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        apply_op(&mut next, op, &mut delta)?;
    }

    next.bump_rev();
    *registry = next;

    Ok(ApplyResult { new_rev: registry.rev(), applied: ops.len(), delta: delta.finish() })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("stale base_rev (base_rev={base_rev}, current_rev={current_rev})")]
    Conflict { base_rev: u64, current_rev: u64 },
    #[error("no teleport point at {pos}")]
    NotFound { pos: BlockPos },
    #[error("teleport point at {pos} cannot link to itself")]
    SelfLink { pos: BlockPos },
}

// Per-op application helpers.
include!("ops_impl.rs");
