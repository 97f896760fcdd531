// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Background check that every loaded teleport point still has its block in the world.
//!
//! Saves can outlive the blocks they describe (edited worlds, removed mods). After a load the
//! validator probes each position once and removes points whose block is gone. It never holds
//! the registry lock while probing, and it never retries.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::model::BlockPos;
use crate::ops::ApplyError;
use crate::registry::TeleportManager;

/// Read access to the host world.
pub trait WorldProbe: Send + Sync {
    /// Whether the teleport block at `pos` still exists.
    fn teleport_exists(&self, pos: BlockPos) -> Result<bool, ProbeError>;
}

impl<F> WorldProbe for F
where
    F: Fn(BlockPos) -> Result<bool, ProbeError> + Send + Sync,
{
    fn teleport_exists(&self, pos: BlockPos) -> Result<bool, ProbeError> {
        self(pos)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("world probe failed: {message}")]
pub struct ProbeError {
    message: String,
}

impl ProbeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub pos: BlockPos,
    pub error: ProbeError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub checked: usize,
    pub pruned: Vec<BlockPos>,
    /// Points the probe could not answer for; they are kept.
    pub failures: Vec<ValidationFailure>,
}

/// Runs [`check_existence`] as a background task.
pub fn spawn_existence_check(
    manager: TeleportManager,
    probe: Arc<dyn WorldProbe>,
) -> JoinHandle<ValidationReport> {
    tokio::spawn(async move { check_existence(&manager, probe.as_ref()).await })
}

/// Probes every point present at call time and removes those whose block is gone.
///
/// Points removed concurrently are skipped. Points added concurrently are not probed.
pub async fn check_existence(manager: &TeleportManager, probe: &dyn WorldProbe) -> ValidationReport {
    let positions = manager.positions().await;
    info!(count = positions.len(), "validating teleport points against the world");

    let mut report = ValidationReport::default();
    for pos in positions {
        report.checked += 1;
        match probe.teleport_exists(pos) {
            Ok(true) => {}
            Ok(false) => match manager.remove(pos).await {
                Ok(_) => {
                    warn!(%pos, "teleport block is gone; removed point");
                    report.pruned.push(pos);
                }
                Err(ApplyError::NotFound { .. }) => {
                    debug!(%pos, "point already removed before pruning");
                }
                Err(err) => warn!(%pos, error = %err, "failed to prune missing teleport point"),
            },
            Err(error) => {
                warn!(%pos, error = %error, "existence check failed; keeping point");
                report.failures.push(ValidationFailure { pos, error });
            }
        }
        tokio::task::yield_now().await;
    }

    info!(
        checked = report.checked,
        pruned = report.pruned.len(),
        failures = report.failures.len(),
        "teleport validation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use super::{check_existence, spawn_existence_check, ProbeError, WorldProbe};
    use crate::model::fixtures::{small_network, FARM, MINE, SPAWN, TOWER};
    use crate::model::BlockPos;
    use crate::registry::TeleportManager;

    async fn manager() -> TeleportManager {
        let manager = TeleportManager::default();
        manager.install(small_network()).await;
        manager
    }

    #[tokio::test]
    async fn prunes_missing_blocks_and_unlinks_them() {
        let manager = manager().await;
        let probe = |pos: BlockPos| -> Result<bool, ProbeError> { Ok(pos != MINE) };

        let report = check_existence(&manager, &probe).await;
        assert_eq!(report.checked, 4);
        assert_eq!(report.pruned, vec![MINE]);
        assert!(report.failures.is_empty());
        assert!(manager.get(MINE).await.is_none());
        assert!(!manager.get(SPAWN).await.unwrap().is_linked_to(MINE));
    }

    #[tokio::test]
    async fn probe_errors_keep_the_point() {
        let manager = manager().await;
        let probe = |pos: BlockPos| -> Result<bool, ProbeError> {
            if pos == FARM {
                Err(ProbeError::new("chunk not loaded"))
            } else {
                Ok(true)
            }
        };

        let report = check_existence(&manager, &probe).await;
        assert!(report.pruned.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].pos, FARM);
        assert_eq!(report.failures[0].error.message(), "chunk not loaded");
        assert_eq!(manager.len().await, 4);
    }

    struct RemovesBeforeAnswering {
        manager: TeleportManager,
        handle: tokio::runtime::Handle,
    }

    impl WorldProbe for RemovesBeforeAnswering {
        fn teleport_exists(&self, pos: BlockPos) -> Result<bool, ProbeError> {
            if pos == TOWER {
                let manager = self.manager.clone();
                // Simulates a player breaking the block between snapshot and prune.
                std::thread::scope(|scope| {
                    scope.spawn(|| self.handle.block_on(manager.remove(TOWER)));
                });
                return Ok(false);
            }
            Ok(true)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrently_removed_point_is_skipped() {
        let manager = manager().await;
        let probe = RemovesBeforeAnswering {
            manager: manager.clone(),
            handle: tokio::runtime::Handle::current(),
        };

        let report = check_existence(&manager, &probe).await;
        assert!(report.pruned.is_empty());
        assert!(manager.get(TOWER).await.is_none());
    }

    #[tokio::test]
    async fn spawned_check_reports_through_join_handle() {
        let manager = manager().await;
        let gone = BTreeSet::from([SPAWN, TOWER]);
        let probe = Arc::new(move |pos: BlockPos| -> Result<bool, ProbeError> {
            Ok(!gone.contains(&pos))
        });

        let report = spawn_existence_check(manager.clone(), probe).await.unwrap();
        assert_eq!(report.pruned, vec![TOWER, SPAWN]);
        assert_eq!(manager.len().await, 2);
    }
}
