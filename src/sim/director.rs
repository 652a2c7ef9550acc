//! Wave spawning
//!
//! Waves grow as ceil(wave * factor). Brawlers show up from the start wave on:
//! one guaranteed every Nth wave, plus a small per-slot chance for more.
//! Everyone spawns in a narrow band out over the water and heads inland.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::npc::{Npc, NpcKind};
use super::terrain::{ArenaBounds, TerrainProfile};
use crate::assets::{ModelSet, fit_model};
use crate::consts::*;
use crate::tuning::Tuning;

/// Spawn timer and id source for ghosts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    /// Seconds between automatic waves
    pub interval: f32,
    /// Seconds since the last wave
    pub timer: f32,
    next_id: u32,
}

impl WaveDirector {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            interval: tuning.spawn_interval_secs,
            timer: 0.0,
            next_id: 1,
        }
    }

    /// Back to a fresh match
    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.next_id = 1;
    }

    /// Advance the interval timer. Returns true when a wave is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.timer += dt;
        if self.timer >= self.interval {
            self.timer -= self.interval;
            true
        } else {
            false
        }
    }

    /// Decide the kinds for a wave
    pub fn composition(wave: u32, tuning: &Tuning, rng: &mut impl Rng) -> Vec<NpcKind> {
        let count = tuning.wave_size(wave) as usize;
        let mut kinds = Vec::with_capacity(count);
        if count == 0 {
            return kinds;
        }

        if wave >= tuning.heavy_start_wave {
            if wave % tuning.heavy_every_waves == 0 {
                kinds.push(NpcKind::HeavyBrawler);
            }
            while kinds.len() < count {
                if rng.random_bool(tuning.heavy_extra_chance) {
                    kinds.push(NpcKind::HeavyBrawler);
                } else {
                    kinds.push(NpcKind::LightPursuer);
                }
            }
        } else {
            kinds.resize(count, NpcKind::LightPursuer);
        }
        kinds
    }

    /// Build every ghost of a wave
    pub fn spawn_wave(
        &mut self,
        wave: u32,
        tuning: &Tuning,
        models: &ModelSet,
        terrain: &TerrainProfile,
        bounds: &ArenaBounds,
        rng: &mut impl Rng,
    ) -> Vec<Npc> {
        let kinds = Self::composition(wave, tuning, rng);
        let brawlers = kinds.iter().filter(|k| **k == NpcKind::HeavyBrawler).count();
        log::info!(
            "Wave {}: spawning {} ghosts ({} brawlers)",
            wave,
            kinds.len(),
            brawlers
        );

        let mut npcs = Vec::with_capacity(kinds.len());
        for kind in kinds {
            npcs.push(self.spawn_one(kind, tuning, models, terrain, bounds, rng));
        }
        npcs
    }

    fn spawn_one(
        &mut self,
        kind: NpcKind,
        tuning: &Tuning,
        models: &ModelSet,
        terrain: &TerrainProfile,
        bounds: &ArenaBounds,
        rng: &mut impl Rng,
    ) -> Npc {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let x = rng.random_range(bounds.min_x..=bounds.max_x);
        let z = rng.random_range(SPAWN_Z_MIN..=SPAWN_Z_MAX);
        let mut pos = bounds.clamp(Vec3::new(x, 0.0, z));
        let ground = terrain.height_at(pos);
        pos.y = ground;

        let fit = fit_model(kind, models.for_kind(kind));
        let profile = kind.profile();

        match kind {
            NpcKind::LightPursuer => {
                let jitter = rng.random_range(-LIGHT_SPEED_JITTER..=LIGHT_SPEED_JITTER);
                let airborne = rng.random_bool(AIRBORNE_CHANCE);
                if airborne {
                    pos.y = ground + rng.random_range(AIRBORNE_MIN_HEIGHT..=AIRBORNE_MAX_HEIGHT);
                }
                Npc::new(
                    id,
                    kind,
                    pos,
                    profile.base_speed * (1.0 + jitter),
                    tuning.light_hp,
                    fit,
                )
                .with_airborne(airborne)
            }
            NpcKind::HeavyBrawler => {
                Npc::new(id, kind, pos, profile.base_speed, tuning.heavy_hp, fit)
            }
        }
    }
}
