//! Data-driven game balance
//!
//! Everything a designer might want to tweak without touching the simulation
//! lives here. Missing JSON fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning table
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning json is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value out of range: {0}")]
    Invalid(&'static str),
}

/// Balance table for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// RNG seed for spawn positions, jitter and brawler rolls
    pub seed: u64,

    // === Waves ===
    /// Seconds between automatic waves while running
    pub spawn_interval_secs: f32,
    /// Spawn count = ceil(wave * factor)
    pub wave_count_factor: f32,
    /// First wave that may contain heavy brawlers
    pub heavy_start_wave: u32,
    /// Every Nth wave gets one guaranteed brawler
    pub heavy_every_waves: u32,
    /// Per-slot chance of an extra brawler
    pub heavy_extra_chance: f64,

    // === Ghosts ===
    pub light_hp: u32,
    pub heavy_hp: u32,
    /// Extra distance beyond the chase radius before a chaser gives up.
    /// Zero keeps a single threshold for both directions.
    pub chase_exit_margin: f32,

    // === Sparks ===
    /// Trails are only recorded while fewer projectiles than this are live
    pub trail_projectile_cap: usize,
    /// Bright inner trail particles allowed per projectile at once
    pub max_inner_trail: usize,

    // === Pools ===
    pub spark_pool_warm: usize,
    pub trail_pool_warm: usize,
    /// Free list cap applied when a match is torn down
    pub pool_trim_cap: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0x5eed_d00e,

            spawn_interval_secs: 15.0,
            wave_count_factor: 1.3,
            heavy_start_wave: 5,
            heavy_every_waves: 5,
            heavy_extra_chance: 0.05,

            light_hp: 1,
            heavy_hp: 20,
            chase_exit_margin: 0.0,

            trail_projectile_cap: 30,
            max_inner_trail: 2,

            spark_pool_warm: 32,
            trail_pool_warm: 256,
            pool_trim_cap: 512,
        }
    }
}

impl Tuning {
    /// Parse a tuning table from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.spawn_interval_secs.is_finite() && self.spawn_interval_secs > 0.0) {
            return Err(TuningError::Invalid("spawn_interval_secs must be positive"));
        }
        if !(self.wave_count_factor.is_finite() && self.wave_count_factor > 0.0) {
            return Err(TuningError::Invalid("wave_count_factor must be positive"));
        }
        if self.heavy_every_waves == 0 {
            return Err(TuningError::Invalid("heavy_every_waves must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.heavy_extra_chance) {
            return Err(TuningError::Invalid("heavy_extra_chance must be within 0..=1"));
        }
        if self.light_hp == 0 || self.heavy_hp == 0 {
            return Err(TuningError::Invalid("ghost hit points must be non-zero"));
        }
        if !(self.chase_exit_margin.is_finite() && self.chase_exit_margin >= 0.0) {
            return Err(TuningError::Invalid("chase_exit_margin must be >= 0"));
        }
        Ok(())
    }

    /// Spawn count for a wave: ceil(wave * factor).
    ///
    /// Products within float noise of an integer count as that integer, so a
    /// factor such as 1.1 (stored slightly above 1.1) yields 11 at wave 10.
    pub fn wave_size(&self, wave: u32) -> u32 {
        let exact = wave as f64 * self.wave_count_factor as f64;
        let tolerance = 1e-6 * exact.max(1.0);
        (exact - tolerance).ceil().max(0.0) as u32
    }
}
