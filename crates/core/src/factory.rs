//! Index-stable arena with typed handles.
//!
//! Handles are monotonic ids that are never reused, so a stale handle can only
//! ever miss. Removal leaves a tombstone; tombstones are compacted away once
//! they outnumber the live entries, which keeps insertion order intact.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Address of an entry in a [`Factory`].
pub struct Handle<T> {
    raw: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn raw(self) -> u64 {
        self.raw
    }
}

// Manual impls: deriving would put bounds on `T`.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.raw)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

struct Slot<T> {
    id: u64,
    value: Option<T>,
}

pub struct Factory<T> {
    slots: Vec<Slot<T>>,
    next_id: u64,
    live: usize,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Factory<T> {
    /// Tombstones tolerated before a compaction is considered.
    const COMPACT_MIN: usize = 16;

    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 1,
            live: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> Handle<T> {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            value: Some(value),
        });
        self.live += 1;
        Handle::new(id)
    }

    /// Insert `count` values built by `make(i)`.
    ///
    /// The returned vector grows with the values actually made; callers bound
    /// `count` themselves.
    pub fn produce(&mut self, count: usize, mut make: impl FnMut(usize) -> T) -> Vec<Handle<T>> {
        let mut made = Vec::new();
        for i in 0..count {
            made.push(self.insert(make(i)));
        }
        made
    }

    /// Like [`Factory::produce`], but a failure removes everything this call inserted.
    pub fn try_produce<E>(
        &mut self,
        count: usize,
        mut make: impl FnMut(usize) -> Result<T, E>,
    ) -> Result<Vec<Handle<T>>, E> {
        let mut made = Vec::new();
        for i in 0..count {
            match make(i) {
                Ok(value) => made.push(self.insert(value)),
                Err(err) => {
                    for handle in made.into_iter().rev() {
                        self.destroy(handle);
                    }
                    return Err(err);
                }
            }
        }
        Ok(made)
    }

    fn position(&self, handle: Handle<T>) -> Option<usize> {
        self.slots.binary_search_by_key(&handle.raw, |s| s.id).ok()
    }

    /// Remove an entry. Unknown and already removed handles return `None`.
    pub fn destroy(&mut self, handle: Handle<T>) -> Option<T> {
        let pos = self.position(handle)?;
        let value = self.slots[pos].value.take()?;
        self.live -= 1;
        self.maybe_compact();
        Some(value)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let pos = self.position(handle)?;
        self.slots[pos].value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let pos = self.position(handle)?;
        self.slots[pos].value.as_mut()
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live handles in insertion order.
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(h, _)| h).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots
            .iter()
            .filter_map(|s| s.value.as_ref().map(|v| (Handle::new(s.id), v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots
            .iter_mut()
            .filter_map(|s| s.value.as_mut().map(|v| (Handle::new(s.id), v)))
    }

    /// Visit every live entry in insertion order, destroying those for which
    /// `keep` returns `false`. Returns how many were destroyed.
    pub fn retain_mut(&mut self, mut keep: impl FnMut(Handle<T>, &mut T) -> bool) -> usize {
        let mut removed = 0;
        for slot in &mut self.slots {
            let Some(value) = slot.value.as_mut() else {
                continue;
            };
            if !keep(Handle::new(slot.id), value) {
                slot.value = None;
                removed += 1;
            }
        }
        self.live -= removed;
        if removed > 0 {
            self.maybe_compact();
        }
        removed
    }

    /// Drop every entry in insertion order. Returns how many were dropped.
    pub fn teardown(&mut self) -> usize {
        let dropped = self.live;
        for slot in self.slots.drain(..) {
            drop(slot.value);
        }
        self.live = 0;
        dropped
    }

    fn maybe_compact(&mut self) {
        let dead = self.slots.len() - self.live;
        if dead >= Self::COMPACT_MIN && dead > self.live {
            self.slots.retain(|s| s.value.is_some());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Noisy {
        id: usize,
        log: Rc<RefCell<Vec<usize>>>,
    }

    impl Drop for Noisy {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn handles_are_never_reused() {
        let mut f = Factory::new();
        let a = f.insert("a");
        assert_eq!(f.destroy(a), Some("a"));
        let b = f.insert("b");
        assert_ne!(a, b);
        assert_eq!(f.get(a), None);
        assert_eq!(f.destroy(a), None);
        assert_eq!(f.get(b), Some(&"b"));
    }

    #[test]
    fn teardown_drops_in_insertion_order_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut f = Factory::new();
        f.produce(4, |id| Noisy {
            id,
            log: log.clone(),
        });
        assert_eq!(f.teardown(), 4);
        assert_eq!(f.teardown(), 0);
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn compaction_keeps_order_and_handles() {
        let mut f = Factory::new();
        let handles = f.produce(100, |i| i);
        for h in handles.iter().filter(|h| h.raw() % 3 != 0) {
            f.destroy(*h);
        }
        assert_eq!(f.len(), 33);
        let values: Vec<usize> = f.iter().map(|(_, v)| *v).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        for h in handles.iter().filter(|h| h.raw() % 3 == 0) {
            assert_eq!(f.get(*h), Some(&(h.raw() as usize - 1)));
        }
    }

    #[test]
    fn retain_mut_removes_during_iteration() {
        let mut f = Factory::new();
        f.produce(5, |i| i);
        let mut seen = Vec::new();
        let removed = f.retain_mut(|_, v| {
            seen.push(*v);
            *v % 2 == 0
        });
        assert_eq!(removed, 2);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(f.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn try_produce_rolls_back_on_failure() {
        let mut f = Factory::new();
        let keep = f.insert(99);
        let result: Result<_, &str> =
            f.try_produce(3, |i| if i < 2 { Ok(i) } else { Err("boom") });
        assert_eq!(result, Err("boom"));
        assert_eq!(f.handles(), vec![keep]);
    }
}
