// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A network is a set of teleport points keyed by block position, each carrying its links,
//! unlock state and per-player presentation overlay.

pub mod client_data;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod point;
pub mod pos;

pub use client_data::{
    resolve_overlay, standard_icons, ClientData, OverlayDefaults, OverlayKey, DEFAULT_COLOR,
    DEFAULT_OVERLAY_KEY,
};
pub use ids::{Id, IdError, PlayerUid};
pub use point::TeleportPoint;
pub use pos::{BlockPos, ParseBlockPosError};
