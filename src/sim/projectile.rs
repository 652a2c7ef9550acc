//! Sparks (player projectiles) and their fading trails
//!
//! Spark and trail meshes come from pools. Hit testing is not done here;
//! see `combat`.

use glam::Vec3;

use super::pool::{Pool, Recycle};
use crate::consts::*;
use crate::tuning::Tuning;

/// A pooled camera-facing quad used for sparks and trail particles
#[derive(Debug, Clone, PartialEq)]
pub struct Billboard {
    /// Render handle, unique within its pool
    pub serial: u32,
    pub pos: Vec3,
    pub opacity: f32,
    pub scale: f32,
    pub visible: bool,
}

impl Recycle for Billboard {
    fn create(serial: u32) -> Self {
        Self {
            serial,
            pos: Vec3::ZERO,
            opacity: 1.0,
            scale: 1.0,
            visible: false,
        }
    }

    fn reset(&mut self) {
        self.pos = Vec3::ZERO;
        self.opacity = 1.0;
        self.scale = 1.0;
        self.visible = false;
    }
}

/// Which trail layer a particle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailLayer {
    /// Wide and dim
    Outer,
    /// Narrow and bright
    Inner,
}

/// One fading point behind a spark
#[derive(Debug, Clone)]
pub struct TrailParticle {
    pub mesh: Billboard,
    pub layer: TrailLayer,
    /// Seconds left before release
    pub life: f32,
}

impl TrailParticle {
    fn base_opacity(&self) -> f32 {
        match self.layer {
            TrailLayer::Outer => TRAIL_OUTER_OPACITY,
            TrailLayer::Inner => TRAIL_INNER_OPACITY,
        }
    }
}

/// A live spark
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub mesh: Billboard,
    pub pos: Vec3,
    /// Unit direction of travel
    pub dir: Vec3,
    pub traveled: f32,
    /// Distance since the last trail sample
    since_sample: f32,
    /// Trail buffer, oldest first. `None` when trails were capped at fire time.
    pub trail: Option<Vec<TrailParticle>>,
}

impl Projectile {
    pub fn has_trail(&self) -> bool {
        self.trail.is_some()
    }

    fn inner_count(&self) -> usize {
        self.trail
            .as_ref()
            .map(|t| t.iter().filter(|p| p.layer == TrailLayer::Inner).count())
            .unwrap_or(0)
    }
}

/// Why a spark was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireReason {
    MaxRange,
    BelowGround,
    Hit,
    Reset,
}

/// Owns every live spark and the pools behind them
#[derive(Debug)]
pub struct ProjectileSystem {
    pub live: Vec<Projectile>,
    sparks: Pool<Billboard>,
    outer_trail: Pool<Billboard>,
    inner_trail: Pool<Billboard>,
    next_id: u32,
    trail_cap: usize,
    max_inner: usize,
}

impl ProjectileSystem {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            live: Vec::new(),
            sparks: Pool::new("spark"),
            outer_trail: Pool::new("trail-outer"),
            inner_trail: Pool::new("trail-inner"),
            next_id: 1,
            trail_cap: tuning.trail_projectile_cap,
            max_inner: tuning.max_inner_trail,
        }
    }

    /// Fill the pools ahead of a match
    pub fn prewarm(&mut self, tuning: &Tuning) {
        self.sparks.prewarm(tuning.spark_pool_warm);
        self.outer_trail.prewarm(tuning.trail_pool_warm);
        self.inner_trail.prewarm(tuning.trail_pool_warm / 2);
    }

    /// Launch a spark. Returns its id.
    pub fn fire(&mut self, dir: Vec3, origin: Vec3) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let dir = dir.normalize_or(Vec3::Z);
        let with_trail = self.live.len() < self.trail_cap;

        let mut mesh = self.sparks.acquire();
        mesh.pos = origin;
        mesh.visible = true;

        self.live.push(Projectile {
            id,
            mesh,
            pos: origin,
            dir,
            traveled: 0.0,
            since_sample: 0.0,
            trail: with_trail.then(Vec::new),
        });
        id
    }

    /// Advance every spark by `dt` seconds, grow and fade trails, and retire
    /// sparks that left the range or went under the sand.
    pub fn update(&mut self, dt: f32) {
        let step = SPARK_SPEED * dt;
        let mut retired: Vec<(usize, RetireReason)> = Vec::new();

        for i in 0..self.live.len() {
            let p = &mut self.live[i];
            p.pos += p.dir * step;
            p.traveled += step;
            p.since_sample += step;
            p.mesh.pos = p.pos;

            if let Some(trail) = p.trail.as_mut() {
                // Fade first so fresh samples start at full strength
                let mut k = 0;
                while k < trail.len() {
                    let particle = &mut trail[k];
                    particle.life -= dt;
                    if particle.life <= 0.0 {
                        let dead = trail.remove(k);
                        match dead.layer {
                            TrailLayer::Outer => self.outer_trail.release(dead.mesh),
                            TrailLayer::Inner => self.inner_trail.release(dead.mesh),
                        }
                        continue;
                    }
                    particle.mesh.opacity = particle.base_opacity() * (particle.life / TRAIL_LIFE);
                    k += 1;
                }
            }

            if p.has_trail() && p.since_sample > TRAIL_SPACING {
                p.since_sample = 0.0;
                let want_inner = p.inner_count() < self.max_inner;
                let pos = p.pos;

                let mut outer = self.outer_trail.acquire();
                outer.pos = pos;
                outer.scale = TRAIL_OUTER_SCALE;
                outer.opacity = TRAIL_OUTER_OPACITY;
                outer.visible = true;
                let mut fresh = vec![TrailParticle {
                    mesh: outer,
                    layer: TrailLayer::Outer,
                    life: TRAIL_LIFE,
                }];

                if want_inner {
                    let mut inner = self.inner_trail.acquire();
                    inner.pos = pos;
                    inner.scale = TRAIL_INNER_SCALE;
                    inner.opacity = TRAIL_INNER_OPACITY;
                    inner.visible = true;
                    fresh.push(TrailParticle {
                        mesh: inner,
                        layer: TrailLayer::Inner,
                        life: TRAIL_LIFE,
                    });
                }
                if let Some(trail) = p.trail.as_mut() {
                    trail.extend(fresh);
                }
            }

            if p.traveled > SPARK_MAX_DIST {
                retired.push((i, RetireReason::MaxRange));
            } else if p.pos.y < 0.0 {
                retired.push((i, RetireReason::BelowGround));
            }
        }

        // Highest index first so earlier indices stay valid
        for (i, reason) in retired.into_iter().rev() {
            let p = self.live.remove(i);
            self.recycle(p, reason);
        }
    }

    /// Retire specific sparks (e.g. after a hit)
    pub fn retire_ids(&mut self, ids: &[u32], reason: RetireReason) {
        if ids.is_empty() {
            return;
        }
        let mut i = 0;
        while i < self.live.len() {
            if ids.contains(&self.live[i].id) {
                let p = self.live.remove(i);
                self.recycle(p, reason);
            } else {
                i += 1;
            }
        }
    }

    /// Retire everything (match reset) and shrink the free lists
    pub fn clear(&mut self, trim_cap: usize) {
        for p in std::mem::take(&mut self.live) {
            self.recycle(p, RetireReason::Reset);
        }
        self.sparks.trim(trim_cap);
        self.outer_trail.trim(trim_cap);
        self.inner_trail.trim(trim_cap);
    }

    fn recycle(&mut self, p: Projectile, reason: RetireReason) {
        log::trace!("spark {} retired: {:?}", p.id, reason);
        self.sparks.release(p.mesh);
        for particle in p.trail.into_iter().flatten() {
            match particle.layer {
                TrailLayer::Outer => self.outer_trail.release(particle.mesh),
                TrailLayer::Inner => self.inner_trail.release(particle.mesh),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Trail particles currently on screen
    pub fn trail_particles(&self) -> usize {
        self.outer_trail.live() + self.inner_trail.live()
    }

    /// Sparks handed out by the pool (should equal `len()`)
    pub fn sparks_in_use(&self) -> usize {
        self.sparks.live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> ProjectileSystem {
        let tuning = Tuning::default();
        let mut sys = ProjectileSystem::new(&tuning);
        sys.prewarm(&tuning);
        sys
    }

    #[test]
    fn test_spark_flies_straight() {
        let mut sys = system();
        sys.fire(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 10.0, 0.0));
        sys.update(SIM_DT);
        let p = &sys.live[0];
        assert!((p.pos.z - SPARK_SPEED * SIM_DT).abs() < 1e-4);
        assert!((p.traveled - SPARK_SPEED * SIM_DT).abs() < 1e-4);
        assert_eq!(p.mesh.pos, p.pos);
    }

    #[test]
    fn test_retires_at_max_range() {
        let mut sys = system();
        sys.fire(Vec3::Z, Vec3::new(0.0, 10.0, 0.0));
        let ticks = (SPARK_MAX_DIST / (SPARK_SPEED * SIM_DT)).ceil() as usize + 2;
        for _ in 0..ticks {
            sys.update(SIM_DT);
        }
        assert!(sys.is_empty());
        assert_eq!(sys.sparks_in_use(), 0);
        assert_eq!(sys.trail_particles(), 0);
    }

    #[test]
    fn test_retires_below_ground() {
        let mut sys = system();
        sys.fire(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 10.0, 0.0));
        for _ in 0..3 {
            sys.update(SIM_DT);
        }
        assert!(sys.is_empty());
    }

    #[test]
    fn test_trail_grows_and_caps_inner() {
        let mut sys = system();
        sys.fire(Vec3::Z, Vec3::new(0.0, 10.0, 0.0));
        for _ in 0..10 {
            sys.update(SIM_DT);
        }
        let trail = sys.live[0].trail.as_ref().unwrap();
        let inner = trail.iter().filter(|p| p.layer == TrailLayer::Inner).count();
        let outer = trail.iter().filter(|p| p.layer == TrailLayer::Outer).count();
        assert!(outer >= 5);
        assert!(inner <= Tuning::default().max_inner_trail);
        assert!(inner >= 1);
    }

    #[test]
    fn test_trail_fades_and_releases() {
        let mut sys = system();
        sys.fire(Vec3::Z, Vec3::new(0.0, 10.0, 0.0));
        for _ in 0..5 {
            sys.update(SIM_DT);
        }
        let trail = sys.live[0].trail.as_ref().unwrap();
        // Oldest particle is dimmer than the newest of the same layer
        let outers: Vec<_> = trail.iter().filter(|p| p.layer == TrailLayer::Outer).collect();
        assert!(outers.first().unwrap().mesh.opacity < outers.last().unwrap().mesh.opacity);

        // Particles never outlive TRAIL_LIFE
        for _ in 0..60 {
            sys.update(SIM_DT);
        }
        let trail = sys.live[0].trail.as_ref().unwrap();
        let max_live = (TRAIL_LIFE / SIM_DT).ceil() as usize + 1;
        assert!(trail.len() <= max_live * 2);
        assert!(trail.iter().all(|p| p.life > 0.0 && p.life <= TRAIL_LIFE));
    }

    #[test]
    fn test_trail_cap_under_rapid_fire() {
        let mut sys = system();
        let cap = Tuning::default().trail_projectile_cap;
        for _ in 0..(cap + 10) {
            sys.fire(Vec3::Z, Vec3::new(0.0, 10.0, 0.0));
        }
        let with_trail = sys.live.iter().filter(|p| p.has_trail()).count();
        assert_eq!(with_trail, cap);
    }

    #[test]
    fn test_clear_returns_everything() {
        let mut sys = system();
        for _ in 0..5 {
            sys.fire(Vec3::Z, Vec3::new(0.0, 10.0, 0.0));
        }
        for _ in 0..5 {
            sys.update(SIM_DT);
        }
        assert!(sys.trail_particles() > 0);
        sys.clear(Tuning::default().pool_trim_cap);
        assert!(sys.is_empty());
        assert_eq!(sys.sparks_in_use(), 0);
        assert_eq!(sys.trail_particles(), 0);
    }

    #[test]
    fn test_retire_ids() {
        let mut sys = system();
        let a = sys.fire(Vec3::Z, Vec3::new(0.0, 10.0, 0.0));
        let b = sys.fire(Vec3::X, Vec3::new(0.0, 10.0, 0.0));
        sys.retire_ids(&[a], RetireReason::Hit);
        assert_eq!(sys.len(), 1);
        assert_eq!(sys.live[0].id, b);
    }
}
