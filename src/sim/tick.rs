//! Fixed timestep simulation tick
//!
//! One call advances the world by `dt` in a fixed order:
//! player -> fire -> spawn timer -> ghost AI -> hit grid + hits -> sparks.
//! Nothing advances unless the match is running.

use super::combat::{rebuild_grid, resolve_hits};
use super::npc::{HitOutcome, NpcContext, NpcSignal};
use super::state::{DeathCause, GameEvent, MatchPhase, World};
use crate::assets::DEFAULT_ATTACK_CLIPS;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Jump key held (edge detection happens in the controller)
    pub jump: bool,
    /// Primary button pressed since the last tick
    pub fire: bool,
    /// Mouse look deltas in radians
    pub look_yaw: f32,
    pub look_pitch: f32,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    // Paused, idle and finished matches are frozen
    if world.phase != MatchPhase::Running {
        return;
    }

    world.time_ticks += 1;
    world.survival_time += dt;

    world.player.update(input, &world.terrain, &world.bounds);

    if input.fire {
        let id = world
            .projectiles
            .fire(world.player.look_dir(), world.player.eye());
        world.push_event(GameEvent::SparkFired { id });
    }

    if world.director.tick(dt) {
        world.spawn_next_wave();
    }

    update_npcs(world, dt);
    if world.phase != MatchPhase::Running {
        return;
    }

    // Hit testing against positions committed above
    rebuild_grid(&mut world.grid, &world.npcs);
    let reports = resolve_hits(&world.grid, &mut world.npcs, &mut world.projectiles);
    for report in reports {
        let event = match report.outcome {
            HitOutcome::Wounded => GameEvent::GhostHit {
                npc: report.npc,
                hp_left: report.hp_left,
            },
            HitOutcome::Removed | HitOutcome::Dying => GameEvent::GhostKilled {
                npc: report.npc,
                kind: report.kind,
            },
            HitOutcome::Ignored => continue,
        };
        world.push_event(event);
    }

    world.projectiles.update(dt);
}

/// Run every ghost's behaviour, then apply what they did
fn update_npcs(world: &mut World, dt: f32) {
    let objective = world.objective();
    let attack_clips = world
        .assets
        .models()
        .map(|m| m.attack_clips.as_slice())
        .unwrap_or(DEFAULT_ATTACK_CLIPS);
    let ctx = NpcContext {
        player: world.player.pos,
        objective,
        terrain: &world.terrain,
        bounds: &world.bounds,
        chase_exit_margin: world.tuning.chase_exit_margin,
        attack_clips,
    };

    let mut despawned = Vec::new();
    let mut death: Option<DeathCause> = None;
    let mut overrun: Option<u32> = None;

    for npc in world.npcs.iter_mut() {
        match npc.update(&ctx, &mut world.rng, dt) {
            Some(NpcSignal::CaughtPlayer) => {
                death.get_or_insert(DeathCause::Caught(npc.kind));
            }
            Some(NpcSignal::StruckPlayer) => {
                death.get_or_insert(DeathCause::Struck);
            }
            Some(NpcSignal::ReachedObjective) => {
                overrun.get_or_insert(npc.id);
            }
            Some(NpcSignal::Despawn) => despawned.push(npc.id),
            None => {}
        }
    }

    if !despawned.is_empty() {
        world.npcs.retain(|npc| !despawned.contains(&npc.id));
    }

    if let Some(cause) = death {
        world.kill_player(cause);
    } else if let Some(npc) = overrun {
        log::info!("Ghost {} reached the back line", npc);
        world.push_event(GameEvent::ObjectiveOverrun { npc });
        world.end(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetGate, ModelSet, fit_model};
    use crate::consts::*;
    use crate::sim::npc::{Npc, NpcKind};
    use crate::tuning::Tuning;
    use glam::Vec3;

    fn running_world(tuning: Tuning) -> World {
        let mut world = World::new(tuning);
        world.assets = AssetGate::Ready(ModelSet::default());
        world.start().unwrap();
        world.drain_events();
        world
    }

    fn ghost(id: u32, kind: NpcKind, pos: Vec3, speed: f32, hp: u32) -> Npc {
        let fit = fit_model(kind, ModelSet::default().for_kind(kind));
        Npc::new(id, kind, pos, speed, hp, fit)
    }

    fn run(world: &mut World, input: &TickInput, secs: f32) {
        let ticks = (secs / SIM_DT).ceil() as usize;
        for _ in 0..ticks {
            tick(world, input, SIM_DT);
        }
    }

    #[test]
    fn test_no_fire_means_no_sparks() {
        let mut world = running_world(Tuning::default());
        run(&mut world, &TickInput::default(), SPARK_MAX_DIST / SPARK_SPEED + 0.1);
        assert_eq!(world.phase, MatchPhase::Running);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.projectiles.sparks_in_use(), 0);
    }

    #[test]
    fn test_fired_spark_retires_at_range() {
        let mut world = running_world(Tuning::default());
        world.npcs.clear();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &fire, SIM_DT);
        assert_eq!(world.projectiles.len(), 1);
        run(&mut world, &TickInput::default(), SPARK_MAX_DIST / SPARK_SPEED + 0.1);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.projectiles.trail_particles(), 0);
    }

    #[test]
    fn test_spark_kills_light_pursuer() {
        let mut world = running_world(Tuning::default());
        let ground = world.terrain.height(0.0, 60.0);
        world.npcs = vec![ghost(99, NpcKind::LightPursuer, Vec3::new(0.0, ground, 60.0), 0.0, 1)];
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &fire, SIM_DT);
        run(&mut world, &TickInput::default(), 0.5);
        assert!(world.npcs.is_empty());
        assert!(world.projectiles.is_empty());
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::GhostKilled {
            npc: 99,
            kind: NpcKind::LightPursuer
        }));
    }

    #[test]
    fn test_paused_world_is_frozen() {
        let mut world = running_world(Tuning::default());
        world.pause();
        let before: Vec<Vec3> = world.npcs.iter().map(|n| n.pos).collect();
        let player = world.player.pos;
        let input = TickInput {
            forward: true,
            fire: true,
            ..Default::default()
        };
        run(&mut world, &input, 1.0);
        let after: Vec<Vec3> = world.npcs.iter().map(|n| n.pos).collect();
        assert_eq!(before, after);
        assert_eq!(world.player.pos, player);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.survival_time, 0.0);

        world.resume();
        tick(&mut world, &input, SIM_DT);
        assert_eq!(world.projectiles.len(), 1);
        assert_ne!(world.player.pos, player);
    }

    #[test]
    fn test_caught_player_loses() {
        let mut world = running_world(Tuning::default());
        let pos = world.player.pos + Vec3::new(0.0, 0.0, 3.0);
        world.npcs = vec![ghost(5, NpcKind::LightPursuer, pos, LIGHT_BASE_SPEED, 1)];
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.phase, MatchPhase::Lost);
        assert!(world.final_score.is_some());
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::PlayerKilled(DeathCause::Caught(
            NpcKind::LightPursuer
        ))));

        // Frozen afterwards
        let t = world.survival_time;
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.survival_time, t);
    }

    #[test]
    fn test_overrun_ends_match() {
        let mut world = running_world(Tuning::default());
        let z = BACK_LINE_Z + 0.1;
        let pos = Vec3::new(0.0, world.terrain.height(0.0, z), z);
        world.npcs = vec![ghost(8, NpcKind::LightPursuer, pos, LIGHT_BASE_SPEED, 1)];
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.phase, MatchPhase::Won);
        assert!(world
            .drain_events()
            .contains(&GameEvent::ObjectiveOverrun { npc: 8 }));
    }

    #[test]
    fn test_interval_spawns_next_wave() {
        let tuning = Tuning {
            spawn_interval_secs: 1.0,
            ..Tuning::default()
        };
        let mut world = running_world(tuning);
        assert_eq!(world.wave, 1);
        run(&mut world, &TickInput::default(), 1.05);
        assert_eq!(world.wave, 2);
        // ceil(1.3) + ceil(2.6)
        assert_eq!(world.npcs.len(), 2 + 3);
    }

    #[test]
    fn test_same_seed_same_match() {
        let input = TickInput {
            forward: true,
            look_yaw: 0.01,
            ..Default::default()
        };
        let mut a = running_world(Tuning::default());
        let mut b = running_world(Tuning::default());
        run(&mut a, &input, 2.0);
        run(&mut b, &input, 2.0);
        let pa: Vec<Vec3> = a.npcs.iter().map(|n| n.pos).collect();
        let pb: Vec<Vec3> = b.npcs.iter().map(|n| n.pos).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.player.pos, b.player.pos);
    }
}
