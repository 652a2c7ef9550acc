//! First-person player controller
//!
//! Movement is in per-tick units: the controller is stepped exactly once per
//! fixed simulation tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::terrain::{ArenaBounds, TerrainProfile};
use super::tick::TickInput;
use crate::consts::*;
use crate::{normalize_angle, yaw_forward};

/// The player character (root at the feet, camera on top)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    /// Vertical velocity (units per tick)
    pub vel_y: f32,
    pub airborne: bool,
    /// Camera heading; 0 looks out to sea (+Z)
    pub yaw: f32,
    /// Camera pitch; positive looks up
    pub pitch: f32,
    /// Jump key state on the previous tick, for edge detection
    jump_held: bool,
}

impl Player {
    /// Player at the spawn point, standing on the sand and facing the sea
    pub fn spawn(terrain: &TerrainProfile) -> Self {
        let mut pos = Vec3::new(PLAYER_SPAWN_X, 0.0, PLAYER_SPAWN_Z);
        pos.y = terrain.height_at(pos) + PLAYER_FEET_OFFSET;
        Self {
            pos,
            vel_y: 0.0,
            airborne: false,
            yaw: 0.0,
            pitch: 0.0,
            jump_held: false,
        }
    }

    /// Camera position
    pub fn eye(&self) -> Vec3 {
        self.pos + Vec3::Y * PLAYER_EYE_HEIGHT
    }

    /// Flattened camera forward
    pub fn forward(&self) -> Vec3 {
        yaw_forward(self.yaw)
    }

    /// Flattened camera left (up x forward)
    pub fn left(&self) -> Vec3 {
        Vec3::Y.cross(self.forward()).normalize_or_zero()
    }

    /// Full 3D look direction including pitch
    pub fn look_dir(&self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cp * self.yaw.sin(), sp, cp * self.yaw.cos())
    }

    /// Apply one tick of input
    pub fn update(&mut self, input: &TickInput, terrain: &TerrainProfile, bounds: &ArenaBounds) {
        // Mouse look
        self.yaw = normalize_angle(self.yaw + input.look_yaw);
        self.pitch = (self.pitch + input.look_pitch).clamp(-PLAYER_MAX_PITCH, PLAYER_MAX_PITCH);

        // Horizontal movement from the camera basis
        let forward = self.forward();
        let left = self.left();
        let mut dir = Vec3::ZERO;
        if input.forward {
            dir += forward;
        }
        if input.back {
            dir -= forward;
        }
        if input.left {
            dir += left;
        }
        if input.right {
            dir -= left;
        }
        if dir.length_squared() > 0.0 {
            self.pos += dir.normalize() * PLAYER_MOVE_PER_TICK;
        }
        self.pos = bounds.clamp(self.pos);

        // Jump on the press edge only, never mid-air
        if input.jump && !self.jump_held && !self.airborne {
            self.airborne = true;
            self.vel_y = PLAYER_JUMP_STRENGTH;
        }
        self.jump_held = input.jump;

        let ground = terrain.height_at(self.pos) + PLAYER_FEET_OFFSET;
        if self.airborne {
            self.vel_y += PLAYER_GRAVITY;
            self.pos.y += self.vel_y;
            if self.pos.y <= ground {
                self.pos.y = ground;
                self.airborne = false;
                self.vel_y = 0.0;
            }
        } else {
            self.pos.y = ground;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup() -> (Player, TerrainProfile, ArenaBounds) {
        let terrain = TerrainProfile::default();
        (Player::spawn(&terrain), terrain, ArenaBounds::default())
    }

    #[test]
    fn test_forward_moves_one_unit_toward_sea() {
        let (mut player, terrain, bounds) = setup();
        let start = player.pos;
        let input = TickInput {
            forward: true,
            ..Default::default()
        };
        player.update(&input, &terrain, &bounds);
        assert!((player.pos.z - start.z - PLAYER_MOVE_PER_TICK).abs() < 1e-5);
        assert!((player.pos.x - start.x).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let (mut player, terrain, bounds) = setup();
        let start = player.pos;
        let input = TickInput {
            forward: true,
            left: true,
            ..Default::default()
        };
        player.update(&input, &terrain, &bounds);
        let moved = crate::horizontal_distance(start, player.pos);
        assert!((moved - PLAYER_MOVE_PER_TICK).abs() < 1e-4);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let (mut player, terrain, bounds) = setup();
        let start = player.pos;
        let input = TickInput {
            forward: true,
            back: true,
            ..Default::default()
        };
        player.update(&input, &terrain, &bounds);
        assert_eq!(player.pos, start);
    }

    #[test]
    fn test_jump_arc_lands_on_ground() {
        let (mut player, terrain, bounds) = setup();
        let ground = player.pos.y;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        player.update(&jump, &terrain, &bounds);
        assert!(player.airborne);
        assert!(player.pos.y > ground);

        let mut peak = player.pos.y;
        for _ in 0..200 {
            player.update(&TickInput::default(), &terrain, &bounds);
            peak = peak.max(player.pos.y);
        }
        assert!(!player.airborne);
        assert_eq!(player.pos.y, ground);
        assert_eq!(player.vel_y, 0.0);
        assert!(peak > ground + 5.0);
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let (mut player, terrain, bounds) = setup();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        // Holding jump through a full arc does not bounce again
        for _ in 0..200 {
            player.update(&jump, &terrain, &bounds);
        }
        assert!(!player.airborne);
        // Releasing and pressing again does
        player.update(&TickInput::default(), &terrain, &bounds);
        player.update(&jump, &terrain, &bounds);
        assert!(player.airborne);
    }

    #[test]
    fn test_snaps_to_dune_height() {
        let (mut player, terrain, bounds) = setup();
        player.pos.z = DUNE_START - 100.0;
        player.update(&TickInput::default(), &terrain, &bounds);
        assert_eq!(player.pos.y, terrain.height_at(player.pos) + PLAYER_FEET_OFFSET);
    }

    #[test]
    fn test_wall_stops_player() {
        let (mut player, terrain, bounds) = setup();
        player.yaw = std::f32::consts::FRAC_PI_2; // facing +X
        let input = TickInput {
            forward: true,
            ..Default::default()
        };
        for _ in 0..3000 {
            player.update(&input, &terrain, &bounds);
        }
        assert_eq!(player.pos.x, bounds.max_x);
    }

    proptest! {
        #[test]
        fn prop_always_inside_bounds(
            steps in proptest::collection::vec((any::<[bool; 5]>(), -0.5f32..0.5), 1..400)
        ) {
            let (mut player, terrain, bounds) = setup();
            for (keys, turn) in steps {
                let input = TickInput {
                    forward: keys[0],
                    back: keys[1],
                    left: keys[2],
                    right: keys[3],
                    jump: keys[4],
                    look_yaw: turn,
                    ..Default::default()
                };
                player.update(&input, &terrain, &bounds);
                prop_assert!(bounds.contains(player.pos));
                prop_assert!(player.pos.y >= terrain.height_at(player.pos) + PLAYER_FEET_OFFSET - 1e-4);
            }
        }
    }
}
