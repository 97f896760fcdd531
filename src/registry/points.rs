// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{BlockPos, TeleportPoint};
use crate::ops::ApplyError;

/// Position-keyed store of teleport points.
///
/// Enumeration is in `BlockPos` order, so two registries holding the same points always
/// enumerate (and therefore encode) identically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointRegistry {
    points: BTreeMap<BlockPos, TeleportPoint>,
    rev: u64,
}

/// Result of [`PointRegistry::upsert`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Upserted {
    pub replaced: bool,
    /// Other points whose neighbour sets changed to keep links symmetric.
    pub touched: Vec<BlockPos>,
    /// Links in the supplied point that were discarded (self-links, absent targets).
    pub dropped_links: Vec<BlockPos>,
}

/// Result of [`PointRegistry::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    pub point: TeleportPoint,
    /// Points that lost their link to the removed one.
    pub unlinked: Vec<BlockPos>,
}

/// What [`PointRegistry::repair_links`] had to change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkRepair {
    /// `(owner, target)` links removed because the target is the owner or does not exist.
    pub dropped: Vec<(BlockPos, BlockPos)>,
    /// `(owner, target)` reverse links added to complete one-sided links.
    pub completed: Vec<(BlockPos, BlockPos)>,
}

impl LinkRepair {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.completed.is_empty()
    }
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: BlockPos) -> Option<&TeleportPoint> {
        self.points.get(&pos)
    }

    pub(crate) fn get_mut(&mut self, pos: BlockPos) -> Option<&mut TeleportPoint> {
        self.points.get_mut(&pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.points.contains_key(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeleportPoint> {
        self.points.values()
    }

    pub fn positions(&self) -> Vec<BlockPos> {
        self.points.keys().copied().collect()
    }

    /// Owned snapshot of every point, in position order.
    pub fn all(&self) -> Vec<TeleportPoint> {
        self.points.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bumped once per applied mutation batch and per `replace_all`.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub(crate) fn bump_rev(&mut self) {
        self.rev = self.rev.wrapping_add(1);
    }

    /// Discards the current contents and installs `points` as-is.
    ///
    /// Link symmetry is not checked here; callers installing decoded data follow up with
    /// [`Self::repair_links`]. Returns how many points were dropped because a later point had
    /// the same position.
    pub fn replace_all(&mut self, points: impl IntoIterator<Item = TeleportPoint>) -> usize {
        let mut next = BTreeMap::new();
        let mut duplicates = 0;
        for point in points {
            if next.insert(point.pos(), point).is_some() {
                duplicates += 1;
            }
        }
        self.points = next;
        self.bump_rev();
        duplicates
    }

    /// Inserts or overwrites the point at `point.pos()`, keeping links symmetric.
    ///
    /// Self-links and links to absent points are dropped from the supplied point. When a point
    /// is overwritten, its previous unlock set is merged into the new one.
    pub fn upsert(&mut self, mut point: TeleportPoint) -> Upserted {
        let pos = point.pos();
        let mut dropped_links = Vec::new();
        point.neighbours_mut().retain(|target| {
            let keep = *target != pos && self.points.contains_key(target);
            if !keep {
                dropped_links.push(*target);
            }
            keep
        });

        let previous = self.points.remove(&pos);
        let mut touched = BTreeSet::new();

        if let Some(previous) = &previous {
            for player in previous.activated_by() {
                point.activate_for(player.clone());
            }
            for old in previous.neighbours().difference(point.neighbours()) {
                if let Some(other) = self.points.get_mut(old) {
                    if other.neighbours_mut().remove(&pos) {
                        touched.insert(*old);
                    }
                }
            }
        }

        for target in point.neighbours() {
            if let Some(other) = self.points.get_mut(target) {
                if other.neighbours_mut().insert(pos) {
                    touched.insert(*target);
                }
            }
        }

        self.points.insert(pos, point);
        Upserted {
            replaced: previous.is_some(),
            touched: touched.into_iter().collect(),
            dropped_links,
        }
    }

    /// Removes the point at `pos` and every link pointing at it.
    pub fn remove(&mut self, pos: BlockPos) -> Result<Removed, ApplyError> {
        let Some(point) = self.points.remove(&pos) else {
            return Err(ApplyError::NotFound { pos });
        };

        // Scan every point, not only the removed point's neighbours, so one-sided links
        // cannot survive as dangling references.
        let mut unlinked = Vec::new();
        for other in self.points.values_mut() {
            if other.neighbours_mut().remove(&pos) {
                unlinked.push(other.pos());
            }
        }

        Ok(Removed { point, unlinked })
    }

    /// Restores link invariants on data that bypassed the mutation path (decoded saves).
    pub fn repair_links(&mut self) -> LinkRepair {
        let known = self.points.keys().copied().collect::<BTreeSet<_>>();
        let mut repair = LinkRepair::default();

        for point in self.points.values_mut() {
            let owner = point.pos();
            point.neighbours_mut().retain(|target| {
                let keep = *target != owner && known.contains(target);
                if !keep {
                    repair.dropped.push((owner, *target));
                }
                keep
            });
        }

        let links = self
            .points
            .values()
            .flat_map(|point| point.neighbours().iter().map(move |target| (point.pos(), *target)))
            .collect::<Vec<_>>();
        for (owner, target) in links {
            if let Some(other) = self.points.get_mut(&target) {
                if other.neighbours_mut().insert(owner) {
                    repair.completed.push((target, owner));
                }
            }
        }

        repair
    }

    /// Whether every link is mirrored, no point links itself and no link dangles.
    pub fn links_are_consistent(&self) -> bool {
        self.points.values().all(|point| {
            point.neighbours().iter().all(|target| {
                *target != point.pos()
                    && self
                        .points
                        .get(target)
                        .is_some_and(|other| other.is_linked_to(point.pos()))
            })
        })
    }
}

impl FromIterator<TeleportPoint> for PointRegistry {
    fn from_iter<I: IntoIterator<Item = TeleportPoint>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.replace_all(iter);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::PointRegistry;
    use crate::model::fixtures::{small_network, uid, FARM, MINE, SPAWN, TOWER};
    use crate::model::{BlockPos, TeleportPoint};
    use crate::ops::ApplyError;

    fn registry() -> PointRegistry {
        small_network().into_iter().collect()
    }

    #[test]
    fn fixture_network_is_consistent() {
        let registry = registry();
        assert_eq!(registry.len(), 4);
        assert!(registry.links_are_consistent());
    }

    #[test]
    fn get_misses_without_error() {
        let registry = registry();
        assert!(registry.get(BlockPos::new(9, 9, 9)).is_none());
        assert_eq!(registry.get(SPAWN).map(TeleportPoint::name), Some("Spawn"));
    }

    #[test]
    fn all_is_position_ordered() {
        let positions = registry().all().iter().map(TeleportPoint::pos).collect::<Vec<_>>();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn replace_all_discards_previous_contents_and_counts_duplicates() {
        let mut registry = registry();
        let before = registry.rev();
        let duplicates = registry.replace_all(vec![
            TeleportPoint::new(TOWER, "first", true),
            TeleportPoint::new(TOWER, "second", true),
        ]);
        assert_eq!(duplicates, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(TOWER).map(TeleportPoint::name), Some("second"));
        assert!(registry.rev() > before);
    }

    #[test]
    fn remove_clears_every_reference() {
        let mut registry = registry();
        let removed = registry.remove(SPAWN).unwrap();
        assert_eq!(removed.point.pos(), SPAWN);
        assert_eq!(removed.unlinked, vec![FARM, MINE]);
        assert!(registry.iter().all(|point| !point.is_linked_to(SPAWN)));
        assert!(registry.links_are_consistent());
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut registry = registry();
        let before = registry.clone();
        let err = registry.remove(BlockPos::new(1, 1, 1)).unwrap_err();
        assert_eq!(err, ApplyError::NotFound { pos: BlockPos::new(1, 1, 1) });
        assert_eq!(registry, before);
    }

    #[test]
    fn remove_clears_one_sided_links_too() {
        let mut a = TeleportPoint::new(BlockPos::new(0, 0, 0), "A", true);
        let b = TeleportPoint::new(BlockPos::new(1, 0, 0), "B", true);
        a.neighbours_mut().insert(b.pos());
        let mut registry: PointRegistry = vec![a, b].into_iter().collect();

        registry.remove(BlockPos::new(1, 0, 0)).unwrap();
        let a = registry.get(BlockPos::new(0, 0, 0)).unwrap();
        assert!(a.neighbours().is_empty());
    }

    #[test]
    fn upsert_links_back_and_drops_invalid_links() {
        let mut registry = registry();
        let pos = BlockPos::new(5, 5, 5);
        let mut point = TeleportPoint::new(pos, "New", true);
        point.neighbours_mut().extend([TOWER, pos, BlockPos::new(7, 7, 7)]);

        let upserted = registry.upsert(point);
        assert!(!upserted.replaced);
        assert_eq!(upserted.touched, vec![TOWER]);
        assert_eq!(upserted.dropped_links.len(), 2);
        assert!(registry.get(TOWER).unwrap().is_linked_to(pos));
        assert!(registry.links_are_consistent());
    }

    #[test]
    fn upsert_overwrite_unlinks_dropped_neighbours_and_keeps_unlocks() {
        let mut registry = registry();
        let mut replacement = TeleportPoint::new(FARM, "Farm II", true);
        replacement.neighbours_mut().insert(SPAWN);

        let upserted = registry.upsert(replacement);
        assert!(upserted.replaced);
        assert_eq!(upserted.touched, vec![MINE]);

        let farm = registry.get(FARM).unwrap();
        assert_eq!(farm.name(), "Farm II");
        assert!(farm.activated_by().contains(&uid("alice")));
        assert!(farm.activated_by().contains(&uid("bob")));
        assert!(!registry.get(MINE).unwrap().is_linked_to(FARM));
        assert!(registry.links_are_consistent());
    }

    #[test]
    fn repair_links_completes_and_drops() {
        let a_pos = BlockPos::new(0, 0, 0);
        let b_pos = BlockPos::new(1, 0, 0);
        let mut a = TeleportPoint::new(a_pos, "A", true);
        let b = TeleportPoint::new(b_pos, "B", true);
        a.neighbours_mut().extend([b_pos, a_pos, BlockPos::new(9, 9, 9)]);
        let mut registry: PointRegistry = vec![a, b].into_iter().collect();
        assert!(!registry.links_are_consistent());

        let repair = registry.repair_links();
        assert_eq!(repair.completed, vec![(b_pos, a_pos)]);
        assert_eq!(repair.dropped.len(), 2);
        assert!(registry.links_are_consistent());

        assert!(registry.repair_links().is_clean());
    }
}
