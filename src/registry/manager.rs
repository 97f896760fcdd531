// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::model::{BlockPos, ClientData, OverlayDefaults, PlayerUid, TeleportPoint};
use crate::ops::{apply_ops, ApplyError, ApplyResult, Delta, Op, PointPatch};

use super::points::{LinkRepair, PointRegistry};

const DELTA_CHANNEL_CAPACITY: usize = 64;

/// Shared handle to the live teleport network.
///
/// Cloning is cheap; every clone sees the same registry. All writes go through one write lock
/// and one atomic op batch, so concurrent readers see either the state before a mutation or
/// the state after it.
#[derive(Debug, Clone)]
pub struct TeleportManager {
    registry: Arc<RwLock<PointRegistry>>,
    overlay: Arc<OverlayDefaults>,
    deltas: broadcast::Sender<Delta>,
}

impl Default for TeleportManager {
    fn default() -> Self {
        Self::new(OverlayDefaults::default())
    }
}

impl TeleportManager {
    pub fn new(overlay: OverlayDefaults) -> Self {
        let (deltas, _) = broadcast::channel(DELTA_CHANNEL_CAPACITY);
        Self {
            registry: Arc::new(RwLock::new(PointRegistry::new())),
            overlay: Arc::new(overlay),
            deltas,
        }
    }

    pub fn overlay_defaults(&self) -> &OverlayDefaults {
        &self.overlay
    }

    /// Receives the delta of every committed mutation made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Delta> {
        self.deltas.subscribe()
    }

    pub async fn get(&self, pos: BlockPos) -> Option<TeleportPoint> {
        self.registry.read().await.get(pos).cloned()
    }

    pub async fn all(&self) -> Vec<TeleportPoint> {
        self.registry.read().await.all()
    }

    pub async fn positions(&self) -> Vec<BlockPos> {
        self.registry.read().await.positions()
    }

    pub async fn len(&self) -> usize {
        self.registry.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.read().await.is_empty()
    }

    pub async fn rev(&self) -> u64 {
        self.registry.read().await.rev()
    }

    /// Replaces the whole network without link repair. Returns the duplicate count.
    pub async fn replace_all(&self, points: Vec<TeleportPoint>) -> usize {
        let mut registry = self.registry.write().await;
        let duplicates = registry.replace_all(points);
        if duplicates > 0 {
            warn!(duplicates, "dropped teleport points sharing a position");
        }
        duplicates
    }

    /// Installs decoded save data: replaces the network and repairs links under one lock.
    pub async fn install(&self, points: Vec<TeleportPoint>) -> LinkRepair {
        let mut registry = self.registry.write().await;
        let duplicates = registry.replace_all(points);
        if duplicates > 0 {
            warn!(duplicates, "dropped teleport points sharing a position");
        }
        let repair = registry.repair_links();
        if !repair.is_clean() {
            warn!(
                dropped = repair.dropped.len(),
                completed = repair.completed.len(),
                "repaired inconsistent teleport links"
            );
        }
        info!(count = registry.len(), "installed teleport network");
        repair
    }

    /// Applies a batch atomically and broadcasts its delta.
    pub async fn apply(&self, ops: &[Op]) -> Result<ApplyResult, ApplyError> {
        self.apply_checked(None, ops).await
    }

    /// Like [`Self::apply`], but fails with `Conflict` if the network moved past `base_rev`.
    pub async fn apply_at(&self, base_rev: u64, ops: &[Op]) -> Result<ApplyResult, ApplyError> {
        self.apply_checked(Some(base_rev), ops).await
    }

    async fn apply_checked(
        &self,
        base_rev: Option<u64>,
        ops: &[Op],
    ) -> Result<ApplyResult, ApplyError> {
        let result = {
            let mut registry = self.registry.write().await;
            apply_ops(&mut registry, base_rev, ops)
        };
        match &result {
            Ok(applied) => {
                debug!(rev = applied.new_rev, ops = applied.applied, "applied teleport ops");
                if !applied.delta.is_empty() {
                    // No subscribers is fine.
                    let _ = self.deltas.send(applied.delta.clone());
                }
            }
            Err(err) => debug!(error = %err, "rejected teleport ops"),
        }
        result
    }

    pub async fn upsert(&self, point: TeleportPoint) -> Result<Delta, ApplyError> {
        self.apply(&[Op::Upsert { point }]).await.map(|result| result.delta)
    }

    pub async fn remove(&self, pos: BlockPos) -> Result<Delta, ApplyError> {
        self.apply(&[Op::Remove { pos }]).await.map(|result| result.delta)
    }

    pub async fn link(&self, a: BlockPos, b: BlockPos) -> Result<Delta, ApplyError> {
        self.apply(&[Op::Link { a, b }]).await.map(|result| result.delta)
    }

    pub async fn unlink(&self, a: BlockPos, b: BlockPos) -> Result<Delta, ApplyError> {
        self.apply(&[Op::Unlink { a, b }]).await.map(|result| result.delta)
    }

    /// Copies the editable fields of an edited point onto the live one.
    pub async fn update_point(&self, edited: &TeleportPoint) -> Result<Delta, ApplyError> {
        self.patch_point(edited.pos(), PointPatch::from_edited(edited)).await
    }

    pub async fn patch_point(&self, pos: BlockPos, patch: PointPatch) -> Result<Delta, ApplyError> {
        self.apply(&[Op::Update { pos, patch }]).await.map(|result| result.delta)
    }

    pub async fn unlock_for(&self, pos: BlockPos, player: PlayerUid) -> Result<Delta, ApplyError> {
        self.apply(&[Op::Unlock { pos, player }]).await.map(|result| result.delta)
    }

    /// `false` for unknown positions.
    pub async fn is_unlocked_for(&self, pos: BlockPos, player: &PlayerUid) -> bool {
        self.registry
            .read()
            .await
            .get(pos)
            .is_some_and(|point| point.is_unlocked_for(player))
    }

    /// Points `player` may currently travel between, in position order.
    pub async fn travel_targets_for(&self, player: &PlayerUid) -> Vec<TeleportPoint> {
        self.registry
            .read()
            .await
            .iter()
            .filter(|point| point.can_travel(player))
            .cloned()
            .collect()
    }

    /// Overlay entry `viewer` sees for the point at `pos`; `None` for unknown positions.
    pub async fn client_data_for(
        &self,
        pos: BlockPos,
        viewer: Option<&PlayerUid>,
    ) -> Option<ClientData> {
        self.registry
            .read()
            .await
            .get(pos)
            .map(|point| point.overlay_for(viewer, &self.overlay))
    }
}
