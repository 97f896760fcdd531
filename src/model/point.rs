// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use super::client_data::{resolve_overlay, ClientData, OverlayDefaults, OverlayKey};
use super::ids::PlayerUid;
use super::pos::BlockPos;

/// One teleport point of the network.
///
/// Neighbours and activations are sets, so duplicates can never be represented. Link symmetry
/// across points is a registry-level invariant maintained by `ops`; a lone `TeleportPoint` may
/// hold any neighbour set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleportPoint {
    pos: BlockPos,
    name: String,
    enabled: bool,
    is_global: bool,
    neighbours: BTreeSet<BlockPos>,
    activated_by: BTreeSet<PlayerUid>,
    client_data: BTreeMap<OverlayKey, ClientData>,
}

impl TeleportPoint {
    pub fn new(pos: BlockPos, name: impl Into<String>, enabled: bool) -> Self {
        Self {
            pos,
            name: name.into(),
            enabled,
            is_global: false,
            neighbours: BTreeSet::new(),
            activated_by: BTreeSet::new(),
            client_data: BTreeMap::new(),
        }
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_global(&self) -> bool {
        self.is_global
    }

    pub fn set_global(&mut self, is_global: bool) {
        self.is_global = is_global;
    }

    pub fn neighbours(&self) -> &BTreeSet<BlockPos> {
        &self.neighbours
    }

    pub fn neighbours_mut(&mut self) -> &mut BTreeSet<BlockPos> {
        &mut self.neighbours
    }

    pub fn is_linked_to(&self, other: BlockPos) -> bool {
        self.neighbours.contains(&other)
    }

    pub fn activated_by(&self) -> &BTreeSet<PlayerUid> {
        &self.activated_by
    }

    /// Records an unlock; returns `false` when the player had already unlocked this point.
    pub fn activate_for(&mut self, player: PlayerUid) -> bool {
        self.activated_by.insert(player)
    }

    pub fn client_data(&self) -> &BTreeMap<OverlayKey, ClientData> {
        &self.client_data
    }

    pub fn client_data_mut(&mut self) -> &mut BTreeMap<OverlayKey, ClientData> {
        &mut self.client_data
    }

    pub fn set_client_data(&mut self, key: OverlayKey, data: ClientData) {
        self.client_data.insert(key, data);
    }

    /// Global points are usable by everyone; others only by players who unlocked them.
    pub fn is_unlocked_for(&self, player: &PlayerUid) -> bool {
        self.is_global || self.activated_by.contains(player)
    }

    /// Whether travel may start or end here for `player`.
    pub fn can_travel(&self, player: &PlayerUid) -> bool {
        self.enabled && self.is_unlocked_for(player)
    }

    pub fn overlay_for(&self, viewer: Option<&PlayerUid>, defaults: &OverlayDefaults) -> ClientData {
        resolve_overlay(&self.client_data, viewer, defaults)
    }
}
