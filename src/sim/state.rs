//! Match state and the world context
//!
//! `World` owns everything a match mutates: the player, live ghosts, sparks,
//! the hit grid, the RNG and the phase. The host drives it through
//! `start/pause/resume/end/restart` and `tick`.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::director::WaveDirector;
use super::npc::{Npc, NpcKind};
use super::player::Player;
use super::projectile::ProjectileSystem;
use super::spatial::SpatialHash;
use super::terrain::{ArenaBounds, TerrainProfile};
use crate::assets::AssetGate;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Booted, waiting for the first start
    Idle,
    /// Simulation advancing
    Running,
    /// Focus lost; frozen
    Paused,
    /// Ended without the player dying (the ghosts overran the back line)
    Won,
    /// Player was caught or struck
    Lost,
}

impl MatchPhase {
    pub fn is_over(self) -> bool {
        matches!(self, MatchPhase::Won | MatchPhase::Lost)
    }
}

/// Why a match could not start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("models are still loading")]
    StillLoading,
    #[error("models failed to load: {0}")]
    AssetsFailed(String),
}

/// How the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// A chasing ghost got within reach
    Caught(NpcKind),
    /// A brawler swing connected
    Struck,
}

/// Things the host may want to show or log, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged(MatchPhase),
    WaveSpawned { wave: u32, count: usize, brawlers: usize },
    SparkFired { id: u32 },
    GhostHit { npc: u32, hp_left: u32 },
    GhostKilled { npc: u32, kind: NpcKind },
    PlayerKilled(DeathCause),
    ObjectiveOverrun { npc: u32 },
}

/// What a primary-button press on the canvas should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Grab the pointer; the match resumes once the lock is granted
    LockPointer,
    /// Resume a paused match; the click does not shoot
    Resume,
    Fire,
    /// No match in progress
    Ignore,
}

/// Everything the HUD displays
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStatus {
    pub phase: MatchPhase,
    pub survival_time: f32,
    pub wave: u32,
    pub live_npcs: usize,
    /// Best survival time this session
    pub best_time: f32,
    pub outcome_message: String,
}

/// The world context passed to every tick
#[derive(Debug)]
pub struct World {
    pub phase: MatchPhase,
    /// Last wave spawned (1 right after start)
    pub wave: u32,
    /// Seconds survived in the current match
    pub survival_time: f32,
    /// Survival time recorded when the last match ended
    pub final_score: Option<f32>,
    /// Best survival time this session (memory only)
    pub best_time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Live ghosts
    pub npcs: Vec<Npc>,
    pub projectiles: ProjectileSystem,
    pub director: WaveDirector,
    pub(crate) grid: SpatialHash<u32>,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub assets: AssetGate,
    pub terrain: TerrainProfile,
    pub bounds: ArenaBounds,
    death_cause: Option<DeathCause>,
    events: Vec<GameEvent>,
}

impl World {
    /// A fresh world in the idle phase
    pub fn new(tuning: Tuning) -> Self {
        let terrain = TerrainProfile::default();
        Self {
            phase: MatchPhase::Idle,
            wave: 0,
            survival_time: 0.0,
            final_score: None,
            best_time: 0.0,
            time_ticks: 0,
            player: Player::spawn(&terrain),
            npcs: Vec::new(),
            projectiles: ProjectileSystem::new(&tuning),
            director: WaveDirector::new(&tuning),
            grid: SpatialHash::new(HIT_CELL_SIZE),
            rng: Pcg32::seed_from_u64(tuning.seed),
            tuning,
            assets: AssetGate::default(),
            terrain,
            bounds: ArenaBounds::default(),
            death_cause: None,
            events: Vec::new(),
        }
    }

    /// Inland point ghosts head for when not chasing
    pub fn objective(&self) -> Vec3 {
        let z = self.bounds.min_z;
        Vec3::new(0.0, self.terrain.height(0.0, z), z)
    }

    /// Begin a match. Refused until the models are loaded.
    pub fn start(&mut self) -> Result<(), MatchError> {
        match &self.assets {
            AssetGate::Pending => {
                log::warn!("Start refused: models still loading");
                return Err(MatchError::StillLoading);
            }
            AssetGate::Failed(reason) => {
                log::warn!("Start refused: {}", reason);
                return Err(MatchError::AssetsFailed(reason.clone()));
            }
            AssetGate::Ready(_) => {}
        }

        self.teardown();
        self.projectiles.prewarm(&self.tuning);
        self.player = Player::spawn(&self.terrain);
        self.wave = 0;
        self.survival_time = 0.0;
        self.final_score = None;
        self.time_ticks = 0;
        self.death_cause = None;
        self.director.reset();
        self.set_phase(MatchPhase::Running);
        self.spawn_next_wave();
        Ok(())
    }

    /// Start again after a match ended
    pub fn restart(&mut self) -> Result<(), MatchError> {
        log::info!("Restarting match (was {:?})", self.phase);
        self.start()
    }

    /// Freeze on focus loss. Only a running match can pause.
    pub fn pause(&mut self) {
        if self.phase == MatchPhase::Running {
            self.set_phase(MatchPhase::Paused);
        }
    }

    /// Unfreeze on focus gain
    pub fn resume(&mut self) {
        if self.phase == MatchPhase::Paused {
            self.set_phase(MatchPhase::Running);
        }
    }

    /// Follow exclusive input focus (pointer lock, window focus): losing it
    /// pauses a running match, regaining it resumes a paused one
    pub fn set_input_focus(&mut self, focused: bool) {
        if focused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Decide what a click does given the pointer lock state
    pub fn click_action(&self, pointer_locked: bool) -> ClickAction {
        match (self.phase, pointer_locked) {
            (MatchPhase::Running | MatchPhase::Paused, false) => ClickAction::LockPointer,
            (MatchPhase::Paused, true) => ClickAction::Resume,
            (MatchPhase::Running, true) => ClickAction::Fire,
            _ => ClickAction::Ignore,
        }
    }

    /// Finish the match and record the survival time as its score
    pub fn end(&mut self, player_died: bool) {
        if !matches!(self.phase, MatchPhase::Running | MatchPhase::Paused) {
            return;
        }
        let score = self.survival_time;
        self.final_score = Some(score);
        if score > self.best_time {
            self.best_time = score;
        }
        log::info!(
            "Match over after {:.1}s on wave {} (player died: {})",
            score,
            self.wave,
            player_died
        );
        self.set_phase(if player_died {
            MatchPhase::Lost
        } else {
            MatchPhase::Won
        });
    }

    /// Player killed: remember how, then end
    pub(crate) fn kill_player(&mut self, cause: DeathCause) {
        if self.phase != MatchPhase::Running {
            return;
        }
        self.death_cause = Some(cause);
        self.events.push(GameEvent::PlayerKilled(cause));
        self.end(true);
    }

    /// Advance the wave counter and spawn that wave
    pub(crate) fn spawn_next_wave(&mut self) {
        let Some(models) = self.assets.models() else {
            return;
        };
        self.wave += 1;
        let spawned = self.director.spawn_wave(
            self.wave,
            &self.tuning,
            models,
            &self.terrain,
            &self.bounds,
            &mut self.rng,
        );
        let brawlers = spawned
            .iter()
            .filter(|n| n.kind == NpcKind::HeavyBrawler)
            .count();
        self.events.push(GameEvent::WaveSpawned {
            wave: self.wave,
            count: spawned.len(),
            brawlers,
        });
        self.npcs.extend(spawned);
    }

    /// Clear ghosts and sparks, returning pooled objects
    fn teardown(&mut self) {
        self.npcs.clear();
        self.projectiles.clear(self.tuning.pool_trim_cap);
        self.grid.clear();
    }

    fn set_phase(&mut self, phase: MatchPhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Text shown on the end screen (empty while playing)
    pub fn outcome_message(&self) -> String {
        let t = self.final_score.unwrap_or(self.survival_time);
        match self.phase {
            MatchPhase::Won => format!("The ghosts overran the dunes. You held out for {:.1}s.", t),
            MatchPhase::Lost => match self.death_cause {
                Some(DeathCause::Struck) => {
                    format!("A brawler flattened you. You survived {:.1}s.", t)
                }
                _ => format!("A ghost caught you. You survived {:.1}s.", t),
            },
            MatchPhase::Paused => "Paused. Click to resume.".to_string(),
            MatchPhase::Idle => match &self.assets {
                AssetGate::Pending => "Loading models...".to_string(),
                AssetGate::Failed(_) => "Models failed to load.".to_string(),
                AssetGate::Ready(_) => "Click start to play.".to_string(),
            },
            MatchPhase::Running => String::new(),
        }
    }

    /// HUD snapshot
    pub fn status(&self) -> MatchStatus {
        MatchStatus {
            phase: self.phase,
            survival_time: self.final_score.unwrap_or(self.survival_time),
            wave: self.wave,
            live_npcs: self.npcs.len(),
            best_time: self.best_time,
            outcome_message: self.outcome_message(),
        }
    }
}
