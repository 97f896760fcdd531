// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::client_data::{ClientData, OverlayKey};
use super::ids::PlayerUid;
use super::point::TeleportPoint;
use super::pos::BlockPos;

pub(crate) const SPAWN: BlockPos = BlockPos::new(0, 64, 0);
pub(crate) const MINE: BlockPos = BlockPos::new(100, 40, 0);
pub(crate) const FARM: BlockPos = BlockPos::new(0, 64, 100);
pub(crate) const TOWER: BlockPos = BlockPos::new(-50, 90, -50);

pub(crate) fn uid(value: &str) -> PlayerUid {
    PlayerUid::new(value).expect("player uid")
}

/// Four points: spawn-mine-farm form a triangle, the tower is isolated.
pub(crate) fn small_network() -> Vec<TeleportPoint> {
    let mut spawn = TeleportPoint::new(SPAWN, "Spawn", true);
    let mut mine = TeleportPoint::new(MINE, "Mine", true);
    let mut farm = TeleportPoint::new(FARM, "Farm", true);
    let mut tower = TeleportPoint::new(TOWER, "Tower", false);

    link_pair(&mut spawn, &mut mine);
    link_pair(&mut spawn, &mut farm);
    link_pair(&mut mine, &mut farm);

    spawn.set_global(true);
    mine.activate_for(uid("alice"));
    farm.activate_for(uid("alice"));
    farm.activate_for(uid("bob"));

    mine.set_client_data(
        OverlayKey::Player(uid("alice")),
        ClientData {
            icon: "pick".to_owned(),
            color: 0x00FF_8800,
            note: "iron at y=40".to_owned(),
            sort_order: 2,
            pinned: true,
        },
    );
    tower.set_client_data(
        OverlayKey::Default,
        ClientData {
            icon: "ruins".to_owned(),
            color: 0x0044_4444,
            note: String::new(),
            sort_order: -1,
            pinned: false,
        },
    );

    vec![spawn, mine, farm, tower]
}

fn link_pair(a: &mut TeleportPoint, b: &mut TeleportPoint) {
    a.neighbours_mut().insert(b.pos());
    b.neighbours_mut().insert(a.pos());
}
