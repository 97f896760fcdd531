// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::TpnetConfig;
use crate::registry::{LinkRepair, TeleportManager};
use crate::validator::{spawn_existence_check, ValidationReport, WorldProbe};

use super::codec::{decode_save, encode_points, SaveSchema};
use super::save_folder::{SaveFolder, StoreError};

#[derive(Debug)]
pub enum LoadOutcome {
    /// The world has never saved teleport data; the network is left empty.
    NoData,
    Loaded {
        schema: SaveSchema,
        count: usize,
        repair: LinkRepair,
        /// Background existence check, when a probe was supplied and validation is enabled.
        validation: Option<JoinHandle<ValidationReport>>,
    },
}

/// Ties the live network to its blob in a world save folder.
#[derive(Debug, Clone)]
pub struct SaveManager {
    folder: SaveFolder,
    blob_name: String,
    validate_on_load: bool,
}

impl SaveManager {
    pub fn new(folder: SaveFolder, blob_name: impl Into<String>) -> Self {
        Self { folder, blob_name: blob_name.into(), validate_on_load: true }
    }

    pub fn from_config(config: &TpnetConfig) -> Self {
        let folder = SaveFolder::new(&config.save.dir).with_durability(config.save.durability());
        Self::new(folder, config.save.blob_name.clone())
            .with_validation(config.validator.enabled)
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_on_load = enabled;
        self
    }

    pub fn folder(&self) -> &SaveFolder {
        &self.folder
    }

    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }

    /// Writes the current network in the current schema. Returns the point count.
    pub async fn save(&self, manager: &TeleportManager) -> Result<usize, StoreError> {
        let points = manager.all().await;
        let written = encode_points(&points)
            .map_err(StoreError::from)
            .and_then(|bytes| self.folder.store_data(&self.blob_name, &bytes));
        match written {
            Ok(()) => {
                info!(count = points.len(), blob = %self.blob_name, "saved teleport network");
                Ok(points.len())
            }
            Err(err) => {
                error!(blob = %self.blob_name, error = %err, "failed to save teleport network");
                Err(err)
            }
        }
    }

    /// Replaces the network with the saved one, upgrading legacy data on the fly.
    ///
    /// When nothing decodes, the network is left empty and `MigrationExhausted` is returned.
    pub async fn load(
        &self,
        manager: &TeleportManager,
        probe: Option<Arc<dyn WorldProbe>>,
    ) -> Result<LoadOutcome, StoreError> {
        let Some(bytes) = self.folder.get_data(&self.blob_name)? else {
            info!(blob = %self.blob_name, "no teleport data saved yet");
            manager.install(Vec::new()).await;
            return Ok(LoadOutcome::NoData);
        };

        let decoded = match decode_save(&bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                error!(blob = %self.blob_name, error = %err, "teleport data could not be recovered");
                manager.install(Vec::new()).await;
                return Err(err.into());
            }
        };

        for point in &decoded.points {
            debug!(pos = %point.pos(), name = point.name(), enabled = point.enabled(), "loaded teleport point");
        }
        let schema = decoded.schema;
        if schema.is_legacy() {
            info!(%schema, "upgrading legacy teleport data");
        }

        let repair = manager.install(decoded.points).await;
        let count = manager.len().await;
        info!(count, %schema, "loaded teleport network");

        let validation = match probe {
            Some(probe) if self.validate_on_load => {
                Some(spawn_existence_check(manager.clone(), probe))
            }
            _ => None,
        };

        Ok(LoadOutcome::Loaded { schema, count, repair, validation })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{LoadOutcome, SaveManager};
    use crate::model::fixtures::{small_network, MINE};
    use crate::model::BlockPos;
    use crate::registry::TeleportManager;
    use crate::store::{CodecError, SaveFolder, SaveSchema, StoreError};
    use crate::validator::{ProbeError, WorldProbe};

    fn save_manager(dir: &tempfile::TempDir) -> SaveManager {
        SaveManager::new(SaveFolder::new(dir.path()), "TPNetData")
    }

    #[tokio::test]
    async fn missing_blob_loads_as_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TeleportManager::default();
        manager.install(small_network()).await;

        let outcome = save_manager(&dir).load(&manager, None).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::NoData));
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn save_then_load_restores_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let saves = save_manager(&dir);

        let source = TeleportManager::default();
        source.install(small_network()).await;
        assert_eq!(saves.save(&source).await.unwrap(), 4);

        let target = TeleportManager::default();
        let outcome = saves.load(&target, None).await.unwrap();
        let LoadOutcome::Loaded { schema, count, repair, validation } = outcome else {
            panic!("expected loaded outcome");
        };
        assert_eq!(schema, SaveSchema::Current);
        assert_eq!(count, 4);
        assert!(repair.is_clean());
        assert!(validation.is_none());
        assert_eq!(target.all().await, source.all().await);
    }

    #[tokio::test]
    async fn load_schedules_validation_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let saves = save_manager(&dir);
        let source = TeleportManager::default();
        source.install(small_network()).await;
        saves.save(&source).await.unwrap();

        let probe: Arc<dyn WorldProbe> =
            Arc::new(|pos: BlockPos| -> Result<bool, ProbeError> { Ok(pos != MINE) });
        let target = TeleportManager::default();
        let LoadOutcome::Loaded { validation: Some(handle), .. } =
            saves.load(&target, Some(probe.clone())).await.unwrap()
        else {
            panic!("expected a validation task");
        };
        assert_eq!(handle.await.unwrap().pruned, vec![MINE]);

        let disabled = saves.clone().with_validation(false);
        let LoadOutcome::Loaded { validation, .. } =
            disabled.load(&target, Some(probe)).await.unwrap()
        else {
            panic!("expected loaded outcome");
        };
        assert!(validation.is_none());
    }

    #[tokio::test]
    async fn zero_length_blob_loads_as_an_empty_network() {
        let dir = tempfile::tempdir().unwrap();
        let saves = save_manager(&dir);
        saves.folder().store_data("TPNetData", b"").unwrap();

        let manager = TeleportManager::default();
        manager.install(small_network()).await;
        let outcome = saves.load(&manager, None).await.unwrap();
        assert!(matches!(
            outcome,
            LoadOutcome::Loaded { schema: SaveSchema::Current, count: 0, .. }
        ));
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn unrecoverable_blob_empties_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let saves = save_manager(&dir);
        saves.folder().store_data("TPNetData", b"\xc1garbage").unwrap();

        let manager = TeleportManager::default();
        manager.install(small_network()).await;
        let err = saves.load(&manager, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Codec(CodecError::MigrationExhausted { .. })));
        assert!(manager.is_empty().await);
    }
}
