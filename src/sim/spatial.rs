//! Uniform 3D spatial hash
//!
//! Points are bucketed by floor-divided (x, y, z). The grid is cleared and
//! refilled every tick; queries scan the 3x3x3 block of cells around a point,
//! so anything closer than one cell edge is always found.

use glam::Vec3;
use hashbrown::HashMap;

/// Integer cell coordinate
pub type CellKey = (i32, i32, i32);

/// A spatial hash over points carrying a payload `T`
#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    cell_size: f32,
    buckets: HashMap<CellKey, Vec<(Vec3, T)>>,
    len: usize,
}

impl<T: Copy> SpatialHash<T> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing a point
    #[inline]
    pub fn key(&self, p: Vec3) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    /// Empty every bucket. Cells that were occupied keep their allocation
    /// for the next rebuild; cells that stayed empty since the last clear are
    /// dropped.
    pub fn clear(&mut self) {
        self.buckets.retain(|_, bucket| {
            let occupied = !bucket.is_empty();
            bucket.clear();
            occupied
        });
        self.len = 0;
    }

    /// Cells currently held by the map, including empty ones kept for reuse
    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn insert(&mut self, point: Vec3, item: T) {
        let key = self.key(point);
        self.buckets.entry(key).or_default().push((point, item));
        self.len += 1;
    }

    /// Clear and refill from an iterator of (point, payload)
    pub fn rebuild(&mut self, items: impl IntoIterator<Item = (Vec3, T)>) {
        self.clear();
        for (point, item) in items {
            self.insert(point, item);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visit every entry in the 27 cells around `point`.
    ///
    /// The visitor returns `true` to stop the scan early.
    pub fn scan_neighborhood(&self, point: Vec3, mut visit: impl FnMut(Vec3, T) -> bool) {
        let (cx, cy, cz) = self.key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.buckets.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &(p, item) in bucket {
                        if visit(p, item) {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Number of candidates a neighborhood scan would visit
    pub fn neighborhood_count(&self, point: Vec3) -> usize {
        let mut count = 0;
        self.scan_neighborhood(point, |_, _| {
            count += 1;
            false
        });
        count
    }
}
