//! Dune Ghosts - A first-person beach arena survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, player, AI, hit detection, match flow)
//! - `renderer`: WebGPU tactical-map renderer
//! - `assets`: Model manifest gate and model scaling
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Arena bounds (world units). The sea is +Z, the dunes are -Z.
    pub const ARENA_MIN_X: f32 = -1000.0;
    pub const ARENA_MAX_X: f32 = 1000.0;
    pub const ARENA_MIN_Z: f32 = -950.0;
    pub const ARENA_MAX_Z: f32 = 400.0;
    /// Inland line the ghosts are trying to reach
    pub const BACK_LINE_Z: f32 = -900.0;

    /// Terrain profile
    pub const FLAT_WIDTH: f32 = 50.0;
    pub const DUNE_START: f32 = -600.0;
    pub const DUNE_END: f32 = -850.0;
    pub const DUNE_MAX_HEIGHT: f32 = 50.0;
    pub const SEA_LEVEL_OFFSET: f32 = 1.0;
    /// Height gained across the linear ramp
    pub const RAMP_RISE: f32 = 20.0;

    /// Player movement (per tick, not per second)
    pub const PLAYER_MOVE_PER_TICK: f32 = 1.0;
    pub const PLAYER_JUMP_STRENGTH: f32 = 0.5;
    pub const PLAYER_GRAVITY: f32 = -0.02;
    /// Character root sits this far above the sand
    pub const PLAYER_FEET_OFFSET: f32 = 1.0;
    /// Camera height above the character root
    pub const PLAYER_EYE_HEIGHT: f32 = 10.0;
    pub const PLAYER_SPAWN_X: f32 = 0.0;
    pub const PLAYER_SPAWN_Z: f32 = -20.0;
    /// Mouse look limits
    pub const PLAYER_MAX_PITCH: f32 = 1.4;
    /// Radians of look per pixel of pointer movement
    pub const MOUSE_SENSITIVITY: f32 = 0.0025;

    /// Sparks (player projectiles)
    pub const SPARK_SPEED: f32 = 400.0;
    pub const SPARK_MAX_DIST: f32 = 1200.0;
    /// Distance between trail samples
    pub const TRAIL_SPACING: f32 = 6.0;
    /// Seconds a trail particle lives
    pub const TRAIL_LIFE: f32 = 0.4;
    pub const TRAIL_OUTER_SCALE: f32 = 2.4;
    pub const TRAIL_OUTER_OPACITY: f32 = 0.35;
    pub const TRAIL_INNER_SCALE: f32 = 1.0;
    pub const TRAIL_INNER_OPACITY: f32 = 0.9;

    /// Spatial hash cell edge for hit detection
    pub const HIT_CELL_SIZE: f32 = 20.0;

    /// Ghost AI
    pub const LIGHT_CHASE_RADIUS: f32 = 150.0;
    pub const HEAVY_CHASE_RADIUS: f32 = 400.0;
    pub const LIGHT_BASE_SPEED: f32 = 45.0;
    pub const HEAVY_BASE_SPEED: f32 = 28.0;
    /// Light pursuer speed jitter (fraction of base)
    pub const LIGHT_SPEED_JITTER: f32 = 0.2;
    pub const LIGHT_DESCENT_SPEED: f32 = 18.0;
    /// Airborne ghosts land for good within this height of the ground
    pub const LANDING_THRESHOLD: f32 = 10.0;
    pub const AIRBORNE_CHANCE: f64 = 0.5;
    pub const AIRBORNE_MIN_HEIGHT: f32 = 40.0;
    pub const AIRBORNE_MAX_HEIGHT: f32 = 120.0;
    /// Chasing ghosts this close catch the player
    pub const KILL_RADIUS: f32 = 5.0;

    /// Light pursuer fade/blink
    pub const FADE_NEAR: f32 = 60.0;
    pub const FADE_FAR: f32 = 400.0;
    pub const MIN_GHOST_OPACITY: f32 = 0.15;
    pub const BLINK_HZ: f32 = 6.0;

    /// Heavy brawler
    pub const HEAVY_RISE_SECS: f32 = 2.6;
    pub const HEAVY_DEATH_SECS: f32 = 3.0;
    pub const HEAVY_ATTACK_RANGE: f32 = 30.0;
    pub const HEAVY_STRIKE_RANGE: f32 = 36.0;
    /// Strike lands only inside this slice of the attack clip
    pub const STRIKE_WINDOW_START: f32 = 0.4;
    pub const STRIKE_WINDOW_END: f32 = 0.5;
    /// Minimum dot(facing, to_player) for a strike to land
    pub const STRIKE_FACING_DOT: f32 = 0.7;
    /// Brawlers turn at a limited rate while committed to an attack (rad/s)
    pub const HEAVY_ATTACK_TURN_RATE: f32 = 2.5;

    /// Spawn band near the seaward edge
    pub const SPAWN_Z_MIN: f32 = 300.0;
    pub const SPAWN_Z_MAX: f32 = 350.0;

    /// Model sizing
    pub const LIGHT_TARGET_HEIGHT: f32 = 14.0;
    pub const HEAVY_TARGET_HEIGHT: f32 = 24.0;
    /// Hitbox sphere radius as a fraction of world height
    pub const HITBOX_RADIUS_FACTOR: f32 = 0.6;
    /// Scale used when a model reports a degenerate bounding height
    pub const MIN_MODEL_SCALE: f32 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Drop the vertical component: (x, y, z) -> (x, z)
#[inline]
pub fn flatten(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Horizontal distance between two points (ignores height)
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(a).distance(flatten(b))
}

/// Yaw of a horizontal direction. Yaw 0 faces +Z (out to sea).
#[inline]
pub fn yaw_of(dir: Vec2) -> f32 {
    dir.x.atan2(dir.y)
}

/// Unit horizontal forward vector for a yaw
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}
