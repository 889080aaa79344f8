//! Reusable-instance manager.
//!
//! A [`Pool`] owns every instance it ever built. Instances move between an
//! active set and an inactive free list; the factory only runs when the free
//! list is empty, so steady-state reuse constructs nothing.
//!
//! # Example
//!
//! ```
//! use driftfield_core::pool::Pool;
//!
//! let mut pool = Pool::new(|| vec![0u8; 64]);
//! let a = pool.acquire().unwrap();
//! let b = pool.acquire().unwrap();
//! pool.release(a);
//! pool.release(b);
//!
//! pool.acquire().unwrap();
//! pool.acquire().unwrap();
//! assert_eq!(pool.constructed(), 2);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use tracing::warn;

/// Handle to one pooled instance.
///
/// Keys stay valid for the life of the pool; the same key is handed out again
/// when its instance is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey(usize);

impl PoolKey {
    /// Slot index inside the pool.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Active/inactive instance sets backed by a factory.
pub struct Pool<T> {
    instances: Vec<T>,
    active: BTreeSet<PoolKey>,
    inactive: Vec<PoolKey>,
    factory: Box<dyn FnMut() -> T>,
    constructed: usize,
    cleared: bool,
}

impl<T> Pool<T> {
    /// Creates an empty pool that builds instances with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        Self {
            instances: Vec::new(),
            active: BTreeSet::new(),
            inactive: Vec::new(),
            factory: Box::new(factory),
            constructed: 0,
            cleared: false,
        }
    }

    fn construct(&mut self) -> PoolKey {
        let key = PoolKey(self.instances.len());
        self.instances.push((self.factory)());
        self.constructed += 1;
        key
    }

    /// Marks an instance active, reusing an inactive one when possible.
    ///
    /// Returns `None` once the pool has been [cleared](Self::clear).
    pub fn acquire(&mut self) -> Option<PoolKey> {
        if self.cleared {
            warn!("acquire on a cleared pool");
            return None;
        }
        let key = match self.inactive.pop() {
            Some(key) => key,
            None => self.construct(),
        };
        self.active.insert(key);
        Some(key)
    }

    /// Deactivates `key`. Returns `false` if it was not active.
    pub fn release(&mut self, key: PoolKey) -> bool {
        if !self.active.remove(&key) {
            return false;
        }
        self.inactive.push(key);
        true
    }

    /// Eagerly constructs `count` inactive instances.
    pub fn pre_warm(&mut self, count: usize) {
        if self.cleared {
            warn!(count, "pre_warm on a cleared pool");
            return;
        }
        self.instances.reserve(count);
        for _ in 0..count {
            let key = self.construct();
            self.inactive.push(key);
        }
    }

    /// Drops every instance. The pool is unusable afterwards.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.active.clear();
        self.inactive.clear();
        self.cleared = true;
    }

    /// Instance behind `key`, active or not.
    #[must_use]
    pub fn get(&self, key: PoolKey) -> Option<&T> {
        self.instances.get(key.0)
    }

    /// Mutable instance behind `key`, active or not.
    pub fn get_mut(&mut self, key: PoolKey) -> Option<&mut T> {
        self.instances.get_mut(key.0)
    }

    /// Returns true if `key` is currently handed out.
    #[must_use]
    pub fn is_active(&self, key: PoolKey) -> bool {
        self.active.contains(&key)
    }

    /// Number of instances in use.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of instances waiting for reuse.
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    /// Total instances the factory has built over the pool's life.
    #[must_use]
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    /// Active keys in ascending order.
    pub fn active_keys(&self) -> impl Iterator<Item = PoolKey> + '_ {
        self.active.iter().copied()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("active", &self.active.len())
            .field("inactive", &self.inactive.len())
            .field("constructed", &self.constructed)
            .field("cleared", &self.cleared)
            .finish_non_exhaustive()
    }
}
