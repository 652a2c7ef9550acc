//! World -> tactical map vertices
//!
//! Draw order is back to front: terrain bands, lines, trails, ghosts,
//! sparks, player.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::npc::{NpcKind, NpcState};
use crate::sim::projectile::TrailLayer;
use crate::sim::state::World;
use crate::{flatten, yaw_forward};

/// Depth of each terrain shading band
const BAND_DEPTH: f32 = 25.0;
/// Distance from a wall at which the border starts to glow
const BORDER_GLOW_MARGIN: f32 = 120.0;

/// Build the full frame
pub fn build(world: &World) -> Vec<Vertex> {
    let mut v = Vec::with_capacity(4096);
    terrain(world, &mut v);
    lines(world, &mut v);
    trails(world, &mut v);
    ghosts(world, &mut v);
    sparks(world, &mut v);
    player(world, &mut v);
    v
}

/// Sea plus sand bands shaded by height
fn terrain(world: &World, v: &mut Vec<Vertex>) {
    let b = &world.bounds;
    v.extend(shapes::rect(
        Vec2::new(b.min_x, 0.0),
        Vec2::new(b.max_x, b.max_z),
        colors::SEA,
    ));

    let top = world.terrain.max_height().max(1.0);
    let mut z = 0.0;
    while z > b.min_z {
        let next = (z - BAND_DEPTH).max(b.min_z);
        let h = world.terrain.height(0.0, (z + next) * 0.5);
        let color = colors::mix(colors::SAND, colors::DUNE_CREST, h / top);
        v.extend(shapes::rect(
            Vec2::new(b.min_x, next),
            Vec2::new(b.max_x, z),
            color,
        ));
        z = next;
    }
}

/// Back line and the border, which glows as the player nears a wall
fn lines(world: &World, v: &mut Vec<Vertex>) {
    let b = &world.bounds;
    v.extend(shapes::segment(
        Vec2::new(b.min_x, BACK_LINE_Z),
        Vec2::new(b.max_x, BACK_LINE_Z),
        6.0,
        colors::BACK_LINE,
    ));

    let glow = b.edge_proximity(world.player.pos, BORDER_GLOW_MARGIN);
    let width = 4.0 + 8.0 * glow;
    v.extend(shapes::outline(
        Vec2::new(b.min_x, b.min_z),
        Vec2::new(b.max_x, b.max_z),
        width,
        colors::fade(colors::BORDER, 0.3 + 0.7 * glow),
    ));
}

fn trails(world: &World, v: &mut Vec<Vertex>) {
    for spark in &world.projectiles.live {
        let Some(trail) = &spark.trail else {
            continue;
        };
        for particle in trail {
            let mesh = &particle.mesh;
            if !mesh.visible {
                continue;
            }
            let base = match particle.layer {
                TrailLayer::Outer => colors::TRAIL_OUTER,
                TrailLayer::Inner => colors::TRAIL_INNER,
            };
            v.extend(shapes::circle(
                flatten(mesh.pos),
                mesh.scale * 1.5,
                colors::fade(base, mesh.opacity),
                8,
            ));
        }
    }
}

fn ghosts(world: &World, v: &mut Vec<Vertex>) {
    for npc in &world.npcs {
        if !npc.visible {
            continue;
        }
        let center = flatten(npc.pos);
        let base = match npc.kind {
            NpcKind::LightPursuer => colors::LIGHT_GHOST,
            NpcKind::HeavyBrawler => colors::HEAVY_GHOST,
        };

        let alpha = match npc.state {
            NpcState::Dying { elapsed, duration } => 1.0 - (elapsed / duration).min(1.0),
            NpcState::Spawning { elapsed, duration } => 0.3 + 0.7 * (elapsed / duration).min(1.0),
            _ => npc.opacity,
        };
        // Airborne ghosts draw a bit larger, like a shadow seen from above
        let radius = if npc.airborne {
            npc.hitbox_radius * 1.3
        } else {
            npc.hitbox_radius
        };
        v.extend(shapes::circle(center, radius, colors::fade(base, alpha), 16));

        let facing = flatten(yaw_forward(npc.yaw));
        v.extend(shapes::wedge(
            center,
            facing,
            radius * 1.6,
            radius * 0.5,
            colors::fade(base, alpha),
        ));

        if let NpcState::Attacking(swing) = npc.state {
            let strength = if swing.in_strike_window() { 1.0 } else { 0.4 };
            v.extend(shapes::ring(
                center,
                HEAVY_STRIKE_RANGE - 2.0,
                HEAVY_STRIKE_RANGE,
                colors::fade(colors::ATTACK_RING, strength),
                32,
            ));
        }
    }
}

fn sparks(world: &World, v: &mut Vec<Vertex>) {
    for spark in &world.projectiles.live {
        v.extend(shapes::circle(flatten(spark.pos), 2.5, colors::SPARK, 8));
    }
}

fn player(world: &World, v: &mut Vec<Vertex>) {
    let p = &world.player;
    let center = flatten(p.pos);
    v.extend(shapes::circle(center, 6.0, colors::PLAYER, 20));
    v.extend(shapes::wedge(
        center,
        flatten(p.forward()),
        16.0,
        4.0,
        colors::PLAYER,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetGate, ModelSet};
    use crate::tuning::Tuning;

    #[test]
    fn test_idle_world_draws_map_and_player() {
        let world = World::new(Tuning::default());
        let v = build(&world);
        assert!(!v.is_empty());
        assert_eq!(v.len() % 3, 0);
    }

    #[test]
    fn test_running_world_draws_more() {
        let idle = build(&World::new(Tuning::default()));
        let mut world = World::new(Tuning::default());
        world.assets = AssetGate::Ready(ModelSet::default());
        world.start().unwrap();
        world
            .projectiles
            .fire(world.player.look_dir(), world.player.eye());
        let v = build(&world);
        assert!(v.len() > idle.len());
        assert_eq!(v.len() % 3, 0);
    }
}
