// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tpnet: a server-side registry of linked teleport points.
//!
//! Points are keyed by block position and linked into an undirected travel graph. The network
//! is persisted as one versioned blob per world; saves from older releases are upgraded through
//! a chain of legacy decoders on load, then checked against the world in the background.

pub mod config;
pub mod model;
pub mod ops;
pub mod registry;
pub mod store;
pub mod validator;
