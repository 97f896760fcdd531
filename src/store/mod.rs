// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence of the teleport network inside a world save.
//!
//! The network is stored as one MessagePack blob. Loading tries the current schema first and
//! then every legacy schema, so worlds saved by older releases upgrade on first load.

pub mod codec;
pub mod legacy;
pub mod save_folder;
pub mod save_manager;

pub use codec::{
    decode_points, decode_save, encode_points, CodecError, DecodedSave, PointRecord, SaveSchema,
    SchemaAttempt, SAVE_MAGIC, SAVE_VERSION,
};
pub use legacy::{LegacySchema, LEGACY_CHAIN};
pub use save_folder::{write_file, SaveFolder, StoreError, WriteDurability};
pub use save_manager::{LoadOutcome, SaveManager};
