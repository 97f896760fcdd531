// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The live teleport network: a position-keyed registry and the shared async handle over it.

mod manager;
mod points;

pub use manager::TeleportManager;
pub use points::{LinkRepair, PointRegistry, Removed, Upserted};
