//! Beach and dune height field
//!
//! Ground elevation is a pure function of horizontal position. The sealine
//! sits at z = 0 and the land rises inland (toward -Z):
//! flat sand -> linear ramp -> smoothstep dune -> plateau.
//!
//! Every ground query in the game goes through [`TerrainProfile::height`].

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Shape parameters of the beach
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainProfile {
    /// Depth of the flat strip inland of the sealine
    pub flat_width: f32,
    /// Where the ramp ends and the dune begins (negative z)
    pub dune_start: f32,
    /// Where the dune crest flattens into the plateau (negative z)
    pub dune_end: f32,
    /// Extra height of the dune over the top of the ramp
    pub dune_max_height: f32,
    /// Sand sits this far above the water
    pub sea_level_offset: f32,
}

impl Default for TerrainProfile {
    fn default() -> Self {
        Self {
            flat_width: FLAT_WIDTH,
            dune_start: DUNE_START,
            dune_end: DUNE_END,
            dune_max_height: DUNE_MAX_HEIGHT,
            sea_level_offset: SEA_LEVEL_OFFSET,
        }
    }
}

impl TerrainProfile {
    /// Ground elevation at (x, z). The beach is uniform along X.
    pub fn height(&self, _x: f32, z: f32) -> f32 {
        let base = self.sea_level_offset;
        let ramp_top = base + RAMP_RISE;

        if z >= -self.flat_width {
            base
        } else if z >= self.dune_start {
            // 0 at the end of the flat strip, 1 at the dune foot
            let t = (-self.flat_width - z) / (-self.flat_width - self.dune_start);
            base + t * RAMP_RISE
        } else if z >= self.dune_end {
            let t = (self.dune_start - z) / (self.dune_start - self.dune_end);
            ramp_top + smoothstep(t) * self.dune_max_height
        } else {
            ramp_top + self.dune_max_height
        }
    }

    /// Ground elevation under a world position
    #[inline]
    pub fn height_at(&self, pos: Vec3) -> f32 {
        self.height(pos.x, pos.z)
    }

    /// Highest point of the terrain
    pub fn max_height(&self) -> f32 {
        self.sea_level_offset + RAMP_RISE + self.dune_max_height
    }
}

/// Hermite smoothstep on [0, 1]
#[inline]
fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Axis-aligned playable rectangle on the XZ plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min_x: ARENA_MIN_X,
            max_x: ARENA_MAX_X,
            min_z: ARENA_MIN_Z,
            max_z: ARENA_MAX_Z,
        }
    }
}

impl ArenaBounds {
    /// Clamp a position's horizontal components into the arena (hard wall)
    #[inline]
    pub fn clamp(&self, pos: Vec3) -> Vec3 {
        Vec3::new(
            pos.x.clamp(self.min_x, self.max_x),
            pos.y,
            pos.z.clamp(self.min_z, self.max_z),
        )
    }

    pub fn contains(&self, pos: Vec3) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_z..=self.max_z).contains(&pos.z)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    /// Border highlight strength: 0 further than `margin` from every wall,
    /// rising linearly to 1 at the wall.
    pub fn edge_proximity(&self, pos: Vec3, margin: f32) -> f32 {
        if margin <= 0.0 {
            return 0.0;
        }
        let nearest = (pos.x - self.min_x)
            .min(self.max_x - pos.x)
            .min(pos.z - self.min_z)
            .min(self.max_z - pos.z)
            .max(0.0);
        (1.0 - nearest / margin).clamp(0.0, 1.0)
    }
}
