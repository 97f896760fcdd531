// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-player presentation metadata layered onto a teleport point.
//!
//! None of this participates in the travel graph; it only changes how a point is shown to one
//! player (map icon, color, note, manual ordering and pinning).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::PlayerUid;

/// Fallback marker color when neither the player nor the default entry set one.
pub const DEFAULT_COLOR: i32 = 0x0023_CCA2;

/// Wire key of the shared default entry. Player uids are never empty, so it cannot collide
/// with a player's own entry.
pub const DEFAULT_OVERLAY_KEY: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientData {
    pub icon: String,
    pub color: i32,
    pub note: String,
    pub sort_order: i32,
    pub pinned: bool,
}

/// Key of an overlay entry: a specific player, or the shared default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OverlayKey {
    Default,
    Player(PlayerUid),
}

impl OverlayKey {
    pub fn player(&self) -> Option<&PlayerUid> {
        match self {
            Self::Default => None,
            Self::Player(uid) => Some(uid),
        }
    }
}

impl From<PlayerUid> for OverlayKey {
    fn from(uid: PlayerUid) -> Self {
        Self::Player(uid)
    }
}

impl From<OverlayKey> for String {
    fn from(key: OverlayKey) -> Self {
        match key {
            OverlayKey::Default => DEFAULT_OVERLAY_KEY.to_owned(),
            OverlayKey::Player(uid) => uid.into_string(),
        }
    }
}

impl From<String> for OverlayKey {
    fn from(value: String) -> Self {
        match PlayerUid::new(value) {
            Ok(uid) => Self::Player(uid),
            Err(_) => Self::Default,
        }
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("(default)"),
            Self::Player(uid) => f.write_str(uid.as_str()),
        }
    }
}

/// Values used to synthesize an overlay entry when a point has none for the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDefaults {
    icons: Vec<String>,
    color: i32,
}

impl OverlayDefaults {
    pub fn new(icons: Vec<String>, color: i32) -> Self {
        Self { icons, color }
    }

    pub fn icons(&self) -> &[String] {
        &self.icons
    }

    pub fn color(&self) -> i32 {
        self.color
    }

    /// The first available icon, or an empty id when the host offers no icons at all.
    pub fn first_icon(&self) -> &str {
        self.icons.first().map(String::as_str).unwrap_or_default()
    }

    pub fn synthesize(&self) -> ClientData {
        ClientData {
            icon: self.first_icon().to_owned(),
            color: self.color,
            note: String::new(),
            sort_order: 0,
            pinned: false,
        }
    }
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self::new(standard_icons(), DEFAULT_COLOR)
    }
}

/// Waypoint icon ids offered by the host map, in picker order.
pub fn standard_icons() -> Vec<String> {
    [
        "circle", "bee", "cave", "home", "ladder", "pick", "rocks", "ruins", "spiral", "star1",
        "star2", "trader", "vessel",
    ]
    .into_iter()
    .map(ToOwned::to_owned)
    .collect()
}

/// Resolves the overlay entry a viewer sees: their own entry, else the shared default entry,
/// else a synthesized one.
pub fn resolve_overlay(
    entries: &BTreeMap<OverlayKey, ClientData>,
    viewer: Option<&PlayerUid>,
    defaults: &OverlayDefaults,
) -> ClientData {
    viewer
        .and_then(|uid| entries.get(&OverlayKey::Player(uid.clone())))
        .or_else(|| entries.get(&OverlayKey::Default))
        .cloned()
        .unwrap_or_else(|| defaults.synthesize())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{resolve_overlay, ClientData, OverlayDefaults, OverlayKey, DEFAULT_COLOR};
    use crate::model::PlayerUid;

    fn entry(icon: &str, note: &str) -> ClientData {
        ClientData {
            icon: icon.to_owned(),
            color: 7,
            note: note.to_owned(),
            sort_order: 3,
            pinned: true,
        }
    }

    #[test]
    fn viewer_entry_wins_over_default() {
        let alice = PlayerUid::new("alice").unwrap();
        let mut entries = BTreeMap::new();
        entries.insert(OverlayKey::Default, entry("home", "shared"));
        entries.insert(OverlayKey::Player(alice.clone()), entry("star1", "mine"));

        let resolved = resolve_overlay(&entries, Some(&alice), &OverlayDefaults::default());
        assert_eq!(resolved.note, "mine");
    }

    #[test]
    fn falls_back_to_default_entry() {
        let bob = PlayerUid::new("bob").unwrap();
        let mut entries = BTreeMap::new();
        entries.insert(OverlayKey::Default, entry("home", "shared"));

        let resolved = resolve_overlay(&entries, Some(&bob), &OverlayDefaults::default());
        assert_eq!(resolved.note, "shared");
        let resolved = resolve_overlay(&entries, None, &OverlayDefaults::default());
        assert_eq!(resolved.note, "shared");
    }

    #[test]
    fn synthesizes_when_nothing_is_stored() {
        let bob = PlayerUid::new("bob").unwrap();
        let resolved = resolve_overlay(&BTreeMap::new(), Some(&bob), &OverlayDefaults::default());
        assert_eq!(
            resolved,
            ClientData {
                icon: "circle".to_owned(),
                color: DEFAULT_COLOR,
                note: String::new(),
                sort_order: 0,
                pinned: false,
            }
        );
    }

    #[test]
    fn synthesized_icon_is_empty_without_icons() {
        let defaults = OverlayDefaults::new(Vec::new(), 1);
        assert_eq!(defaults.synthesize().icon, "");
        assert_eq!(defaults.synthesize().color, 1);
    }

    #[test]
    fn overlay_key_string_form() {
        assert_eq!(String::from(OverlayKey::Default), "");
        assert_eq!(OverlayKey::from(String::new()), OverlayKey::Default);
        let key = OverlayKey::from("alice".to_owned());
        assert_eq!(key.player().map(PlayerUid::as_str), Some("alice"));
    }

    #[test]
    fn player_named_default_keeps_a_private_entry() {
        let named_default = PlayerUid::new("default").unwrap();
        let mut entries = BTreeMap::new();
        entries.insert(OverlayKey::Player(named_default.clone()), entry("ruins", "mine"));

        let key = OverlayKey::from("default".to_owned());
        assert_eq!(key, OverlayKey::Player(named_default.clone()));

        let defaults = OverlayDefaults::default();
        assert_eq!(resolve_overlay(&entries, Some(&named_default), &defaults).note, "mine");
        let stranger = PlayerUid::new("zoe").unwrap();
        assert_eq!(resolve_overlay(&entries, Some(&stranger), &defaults), defaults.synthesize());

        let bytes = rmp_serde::to_vec(&entries).unwrap();
        let decoded: BTreeMap<OverlayKey, ClientData> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, entries);
    }
}
