//! Exactly-once fill cells and keyed memo tables.
//!
//! Lazily computed values (decompositions, site sessions, fetched documents,
//! resolved relations) share one discipline: the first caller computes, any
//! concurrent caller for the same slot blocks until the value is stored, and a
//! stored value is never recomputed or invalidated. A failed fill stores
//! nothing, so a later caller may try again.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// A slot filled at most once.
///
/// `OnceLock` alone cannot run a fallible initializer, so fills are
/// serialized through `fill` and published through `value`.
#[derive(Debug)]
pub struct OnceFill<T> {
    value: OnceLock<T>,
    fill: Mutex<()>,
}

impl<T> Default for OnceFill<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OnceFill<T> {
    pub const fn new() -> Self {
        Self {
            value: OnceLock::new(),
            fill: Mutex::new(()),
        }
    }

    /// The stored value, if a fill already succeeded.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns the stored value or runs `f` to produce it.
    ///
    /// At most one `f` runs at a time; callers that lose the race wait and
    /// then observe the winner's value. If `f` fails the error is returned
    /// and the slot stays empty.
    pub fn get_or_try_fill<E, F>(&self, f: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(v) = self.value.get() {
            return Ok(v);
        }
        let _guard = self.fill.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(v) = self.value.get() {
            return Ok(v);
        }
        let v = f()?;
        Ok(self.value.get_or_init(|| v))
    }

    /// Infallible form of [`OnceFill::get_or_try_fill`].
    pub fn get_or_fill<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_fill::<Infallible, _>(|| Ok(f())) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }
}

/// Keyed table of [`OnceFill`] cells.
///
/// The map lock is only held to find or create a key's cell; the (possibly
/// slow) fill runs under that cell's own lock, so different keys fill in
/// parallel while the same key fills once.
#[derive(Debug)]
pub struct Memo<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceFill<V>>>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn cell<Q>(&self, key: &Q) -> Arc<OnceFill<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
    {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cell) = cells.get(key) {
            return Arc::clone(cell);
        }
        let cell = Arc::new(OnceFill::new());
        cells.insert(key.to_owned(), Arc::clone(&cell));
        cell
    }

    /// Returns the memoized value for `key`, computing it with `f` on first use.
    pub fn get_or_try_fill<Q, E, F>(&self, key: &Q, f: F) -> Result<V, E>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        F: FnOnce() -> Result<V, E>,
    {
        let cell = self.cell(key);
        let value = cell.get_or_try_fill(f)?;
        Ok(value.clone())
    }

    /// Infallible form of [`Memo::get_or_try_fill`].
    pub fn get_or_fill<Q, F>(&self, key: &Q, f: F) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        F: FnOnce() -> V,
    {
        let cell = self.cell(key);
        let value = cell.get_or_fill(f);
        value.clone()
    }

    /// The memoized value for `key` without computing anything.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of keys holding a stored value.
    pub fn len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
