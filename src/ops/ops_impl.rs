// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Op application helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_op(
    registry: &mut PointRegistry,
    op: &Op,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        Op::Upsert { point } => {
            let pos = point.pos();
            let upserted = registry.upsert(point.clone());
            if upserted.replaced {
                delta.record_updated(pos);
            } else {
                delta.record_added(pos);
            }
            for other in upserted.touched {
                delta.record_updated(other);
            }
            Ok(())
        }
        Op::Remove { pos } => {
            let removed = registry.remove(*pos)?;
            for other in removed.unlinked {
                delta.record_updated(other);
            }
            delta.record_removed(*pos);
            Ok(())
        }
        Op::Link { a, b } => link(registry, *a, *b, delta),
        Op::Unlink { a, b } => unlink(registry, *a, *b, delta),
        Op::Update { pos, patch } => apply_patch(registry, *pos, patch, delta),
        Op::Unlock { pos, player } => {
            if point_mut(registry, *pos)?.activate_for(player.clone()) {
                delta.record_updated(*pos);
            }
            Ok(())
        }
    }
}

fn point_mut(registry: &mut PointRegistry, pos: BlockPos) -> Result<&mut TeleportPoint, ApplyError> {
    registry.get_mut(pos).ok_or(ApplyError::NotFound { pos })
}

fn ensure_exists(registry: &PointRegistry, pos: BlockPos) -> Result<(), ApplyError> {
    if registry.contains(pos) {
        Ok(())
    } else {
        Err(ApplyError::NotFound { pos })
    }
}

fn link(
    registry: &mut PointRegistry,
    a: BlockPos,
    b: BlockPos,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    if a == b {
        return Err(ApplyError::SelfLink { pos: a });
    }
    ensure_exists(registry, a)?;
    ensure_exists(registry, b)?;

    if point_mut(registry, a)?.neighbours_mut().insert(b) {
        delta.record_updated(a);
    }
    if point_mut(registry, b)?.neighbours_mut().insert(a) {
        delta.record_updated(b);
    }
    Ok(())
}

fn unlink(
    registry: &mut PointRegistry,
    a: BlockPos,
    b: BlockPos,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    ensure_exists(registry, a)?;
    ensure_exists(registry, b)?;

    if point_mut(registry, a)?.neighbours_mut().remove(&b) {
        delta.record_updated(a);
    }
    if point_mut(registry, b)?.neighbours_mut().remove(&a) {
        delta.record_updated(b);
    }
    Ok(())
}

fn apply_patch(
    registry: &mut PointRegistry,
    pos: BlockPos,
    patch: &PointPatch,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    let point = point_mut(registry, pos)?;
    let before = point.clone();

    if let Some(name) = &patch.name {
        point.set_name(name.clone());
    }
    if let Some(enabled) = patch.enabled {
        point.set_enabled(enabled);
    }
    if let Some(is_global) = patch.is_global {
        point.set_global(is_global);
    }
    for (key, data) in &patch.client_data {
        point.set_client_data(key.clone(), data.clone());
    }
    for player in &patch.unlock {
        point.activate_for(player.clone());
    }
    if *point != before {
        delta.record_updated(pos);
    }

    for other in &patch.link {
        link(registry, pos, *other, delta)?;
    }
    for other in &patch.unlink {
        unlink(registry, pos, *other, delta)?;
    }
    Ok(())
}
