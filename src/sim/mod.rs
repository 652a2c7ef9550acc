//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order for ghosts, fire order for sparks)
//! - No rendering or platform dependencies

pub mod combat;
pub mod director;
pub mod npc;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod spatial;
pub mod state;
pub mod terrain;
pub mod tick;

pub use director::WaveDirector;
pub use npc::{Npc, NpcKind, NpcState};
pub use player::Player;
pub use pool::{Pool, Recycle};
pub use projectile::{Billboard, Projectile, ProjectileSystem, TrailLayer};
pub use spatial::SpatialHash;
pub use state::{ClickAction, DeathCause, GameEvent, MatchError, MatchPhase, MatchStatus, World};
pub use terrain::{ArenaBounds, TerrainProfile};
pub use tick::{TickInput, tick};
