//! Recycling pool for transient visual objects
//!
//! Sparks and trail particles churn every frame. Instead of building a fresh
//! render object for each, released items go back on a free list and are
//! reissued. An acquired item is moved out of the pool, so it can only ever
//! have one owner at a time.

/// Objects that can be stored in a [`Pool`]
pub trait Recycle {
    /// Build a brand new object. `serial` is unique within its pool.
    fn create(serial: u32) -> Self;
    /// Hide the object and put its visible state back to defaults
    fn reset(&mut self);
}

/// Free-list pool
#[derive(Debug)]
pub struct Pool<T> {
    label: &'static str,
    free: Vec<T>,
    /// Objects currently alive (acquired + free)
    constructed: usize,
    /// Objects handed out and not yet returned
    live: usize,
    /// Capacity reserved by the last prewarm; growing past it is logged
    warm: usize,
    next_serial: u32,
}

impl<T: Recycle> Pool<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            free: Vec::new(),
            constructed: 0,
            live: 0,
            warm: 0,
            next_serial: 0,
        }
    }

    fn construct(&mut self) -> T {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        self.constructed += 1;
        let mut item = T::create(serial);
        item.reset();
        item
    }

    /// Make sure at least `count` objects exist so early frames do not allocate
    pub fn prewarm(&mut self, count: usize) {
        while self.constructed < count {
            let item = self.construct();
            self.free.push(item);
        }
        self.warm = self.warm.max(count);
    }

    /// Take an object, recycling one if available
    pub fn acquire(&mut self) -> T {
        let item = match self.free.pop() {
            Some(item) => item,
            None => {
                if self.constructed >= self.warm {
                    log::warn!(
                        "{} pool exhausted ({} live), constructing a fresh instance",
                        self.label,
                        self.live
                    );
                    // Log once per doubling rather than every frame
                    self.warm = (self.constructed + 1).max(self.warm * 2);
                }
                self.construct()
            }
        };
        self.live += 1;
        item
    }

    /// Return an object. Its visible state is reset before it can be reissued.
    pub fn release(&mut self, mut item: T) {
        item.reset();
        self.live = self.live.saturating_sub(1);
        self.free.push(item);
    }

    /// Drop free objects beyond `max_free`
    pub fn trim(&mut self, max_free: usize) {
        if self.free.len() > max_free {
            let dropped = self.free.len() - max_free;
            self.free.truncate(max_free);
            self.constructed -= dropped;
            log::debug!("{} pool trimmed {} free objects", self.label, dropped);
        }
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn free(&self) -> usize {
        self.free.len()
    }

    pub fn constructed(&self) -> usize {
        self.constructed
    }
}
