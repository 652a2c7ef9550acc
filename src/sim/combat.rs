//! Spark vs ghost hit detection
//!
//! The grid is rebuilt from committed NPC positions every tick, then each
//! spark scans only the 27 cells around it. A spark lands at most one hit per
//! tick and is consumed by it.

use super::npc::{HitOutcome, Npc, NpcKind};
use super::projectile::{ProjectileSystem, RetireReason};
use super::spatial::SpatialHash;

/// One registered hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    pub projectile: u32,
    pub npc: u32,
    pub kind: NpcKind,
    pub hp_left: u32,
    pub outcome: HitOutcome,
}

/// Rebuild the grid from the live NPC hitboxes. Payload is the index into `npcs`.
pub fn rebuild_grid(grid: &mut SpatialHash<u32>, npcs: &[Npc]) {
    grid.rebuild(
        npcs.iter()
            .enumerate()
            .filter(|(_, npc)| npc.is_active())
            .map(|(i, npc)| (npc.hitbox_center(), i as u32)),
    );
}

/// Test every live spark against the grid, apply damage, consume sparks that
/// hit and drop light pursuers that died. Returns what happened, in order.
pub fn resolve_hits(
    grid: &SpatialHash<u32>,
    npcs: &mut Vec<Npc>,
    projectiles: &mut ProjectileSystem,
) -> Vec<HitReport> {
    let mut reports = Vec::new();
    if grid.is_empty() || projectiles.is_empty() {
        return reports;
    }

    for spark in &projectiles.live {
        let point = spark.pos;
        grid.scan_neighborhood(point, |center, index| {
            let Some(npc) = npcs.get_mut(index as usize) else {
                return false;
            };
            // Killed by an earlier spark this tick
            if !npc.is_active() {
                return false;
            }
            if point.distance(center) >= npc.hitbox_radius {
                return false;
            }
            let outcome = npc.on_hit();
            reports.push(HitReport {
                projectile: spark.id,
                npc: npc.id,
                kind: npc.kind,
                hp_left: npc.hp,
                outcome,
            });
            true
        });
    }

    let spent: Vec<u32> = reports.iter().map(|r| r.projectile).collect();
    projectiles.retire_ids(&spent, RetireReason::Hit);

    let removed: Vec<u32> = reports
        .iter()
        .filter(|r| r.outcome == HitOutcome::Removed)
        .map(|r| r.npc)
        .collect();
    if !removed.is_empty() {
        npcs.retain(|npc| !removed.contains(&npc.id));
    }

    reports
}
