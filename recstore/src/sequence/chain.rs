use crate::sequence::cursor::Cursor;
use crate::sequence::hooks::{Admission, SequenceHooks};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    generation: u32,
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}@{})", self.index, self.generation)
    }
}

struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Entry<T> {
    generation: u32,
    node: Option<Node<T>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

pub struct Chain<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn front(&self) -> Option<Handle> {
        self.head.map(|i| self.handle_at(i))
    }

    pub fn back(&self) -> Option<Handle> {
        self.tail.map(|i| self.handle_at(i))
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.resolve(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.resolve(handle).and_then(|i| self.value_at(i))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            next: self.head,
            remaining: self.len,
        }
    }

    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.head)
    }

    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.tail)
    }

    pub fn push_front<H>(&mut self, value: T, hooks: &mut H) -> Result<Handle, H::Error>
    where
        H: SequenceHooks<T>,
    {
        self.insert(value, End::Front, hooks)
    }

    pub fn push_back<H>(&mut self, value: T, hooks: &mut H) -> Result<Handle, H::Error>
    where
        H: SequenceHooks<T>,
    {
        self.insert(value, End::Back, hooks)
    }

    /// Links an item that is already accounted for; no hook fires.
    pub fn restore_front(&mut self, value: T) -> Handle {
        let index = self.link(value, End::Front);
        self.handle_at(index)
    }

    /// Links an item that is already accounted for; no hook fires.
    pub fn restore_back(&mut self, value: T) -> Handle {
        let index = self.link(value, End::Back);
        self.handle_at(index)
    }

    /// Returns `Ok(None)` when the handle is stale.
    pub fn remove<H>(&mut self, handle: Handle, hooks: &mut H) -> Result<Option<T>, H::Error>
    where
        H: SequenceHooks<T>,
    {
        let Some(index) = self.resolve(handle) else {
            return Ok(None);
        };
        if let Some(value) = self.value_at_mut(index) {
            hooks.on_remove(value)?;
        }
        Ok(self.unlink(index))
    }

    pub fn remove_oldest<H>(&mut self, hooks: &mut H) -> Result<Option<T>, H::Error>
    where
        H: SequenceHooks<T>,
    {
        match self.back() {
            Some(handle) => self.remove(handle, hooks),
            None => Ok(None),
        }
    }

    /// Replaces an item's contents in place with `apply`, keeping its
    /// position. Returns `Ok(false)` when the handle is stale.
    ///
    /// The item stays linked if a hook fails after `on_update` succeeded;
    /// the hook owner decides what that state means.
    pub fn update<H, F>(
        &mut self,
        handle: Handle,
        apply: F,
        hooks: &mut H,
    ) -> Result<bool, H::Error>
    where
        H: SequenceHooks<T>,
        F: FnOnce(&mut T),
    {
        let Some(index) = self.resolve(handle) else {
            return Ok(false);
        };
        let Some(value) = self.value_at_mut(index) else {
            return Ok(false);
        };
        hooks.on_update(value)?;
        apply(value);

        self.admit(Some(index), hooks)?;
        if let Some(value) = self.value_at_mut(index) {
            hooks.on_add(value)?;
        }
        Ok(true)
    }

    fn insert<H>(&mut self, mut value: T, end: End, hooks: &mut H) -> Result<Handle, H::Error>
    where
        H: SequenceHooks<T>,
    {
        self.admit(None, hooks)?;
        hooks.on_add(&mut value)?;
        let index = self.link(value, end);
        Ok(self.handle_at(index))
    }

    // `keep` is never evicted
    fn admit<H>(&mut self, keep: Option<usize>, hooks: &mut H) -> Result<(), H::Error>
    where
        H: SequenceHooks<T>,
    {
        loop {
            let victim = self.oldest_except(keep);
            match hooks.on_admit(victim.is_some())? {
                Admission::Ready => return Ok(()),
                Admission::EvictOldest => {
                    let Some(index) = victim else {
                        return Ok(());
                    };
                    if let Some(value) = self.value_at_mut(index) {
                        hooks.on_evict_oldest(value)?;
                    }
                    self.unlink(index);
                }
            }
        }
    }

    fn oldest_except(&self, keep: Option<usize>) -> Option<usize> {
        let tail = self.tail?;
        if Some(tail) == keep {
            self.entries[tail].node.as_ref().and_then(|n| n.prev)
        } else {
            Some(tail)
        }
    }

    fn resolve(&self, handle: Handle) -> Option<usize> {
        self.entries
            .get(handle.index)
            .filter(|e| e.generation == handle.generation && e.node.is_some())
            .map(|_| handle.index)
    }

    pub(crate) fn handle_at(&self, index: usize) -> Handle {
        Handle {
            index,
            generation: self.entries[index].generation,
        }
    }

    pub(crate) fn value_at(&self, index: usize) -> Option<&T> {
        self.entries
            .get(index)
            .and_then(|e| e.node.as_ref())
            .map(|n| &n.value)
    }

    fn value_at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries
            .get_mut(index)
            .and_then(|e| e.node.as_mut())
            .map(|n| &mut n.value)
    }

    pub(crate) fn neighbours(&self, index: usize) -> (Option<usize>, Option<usize>) {
        match self.entries.get(index).and_then(|e| e.node.as_ref()) {
            Some(n) => (n.prev, n.next),
            None => (None, None),
        }
    }

    fn set_prev(&mut self, index: usize, prev: Option<usize>) {
        if let Some(n) = self.entries[index].node.as_mut() {
            n.prev = prev;
        }
    }

    fn set_next(&mut self, index: usize, next: Option<usize>) {
        if let Some(n) = self.entries[index].node.as_mut() {
            n.next = next;
        }
    }

    fn link(&mut self, value: T, end: End) -> usize {
        let (prev, next) = match end {
            End::Front => (None, self.head),
            End::Back => (self.tail, None),
        };
        let node = Node { value, prev, next };
        let index = match self.vacant.pop() {
            Some(i) => {
                self.entries[i].node = Some(node);
                i
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    node: Some(node),
                });
                self.entries.len() - 1
            }
        };

        match prev {
            Some(p) => self.set_next(p, Some(index)),
            None => self.head = Some(index),
        }
        match next {
            Some(n) => self.set_prev(n, Some(index)),
            None => self.tail = Some(index),
        }
        self.len += 1;
        index
    }

    fn unlink(&mut self, index: usize) -> Option<T> {
        let entry = self.entries.get_mut(index)?;
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push(index);

        match node.prev {
            Some(p) => self.set_next(p, node.next),
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.set_prev(n, node.prev),
            None => self.tail = node.prev,
        }
        self.len -= 1;
        Some(node.value)
    }
}

pub struct Iter<'a, T> {
    chain: &'a Chain<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let value = self.chain.value_at(index)?;
        self.next = self.chain.neighbours(index).1;
        self.remaining -= 1;
        Some((self.chain.handle_at(index), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = (Handle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::hooks::NoHooks;

    fn values(chain: &Chain<u32>) -> Vec<u32> {
        chain.iter().map(|(_, v)| *v).collect()
    }

    /// Records every hook call and admits at most `room` items.
    #[derive(Default)]
    struct Bounded {
        room: usize,
        live: usize,
        log: Vec<String>,
        fail_remove: bool,
    }

    impl SequenceHooks<u32> for Bounded {
        type Error = &'static str;

        fn on_admit(&mut self, can_evict: bool) -> Result<Admission, Self::Error> {
            if self.live < self.room {
                Ok(Admission::Ready)
            } else if can_evict {
                Ok(Admission::EvictOldest)
            } else {
                Err("full")
            }
        }

        fn on_add(&mut self, item: &mut u32) -> Result<(), Self::Error> {
            self.live += 1;
            self.log.push(format!("add {item}"));
            Ok(())
        }

        fn on_remove(&mut self, item: &mut u32) -> Result<(), Self::Error> {
            if self.fail_remove {
                return Err("remove refused");
            }
            self.live -= 1;
            self.log.push(format!("remove {item}"));
            Ok(())
        }

        fn on_update(&mut self, item: &mut u32) -> Result<(), Self::Error> {
            self.live -= 1;
            self.log.push(format!("update {item}"));
            Ok(())
        }

        fn on_evict_oldest(&mut self, item: &mut u32) -> Result<(), Self::Error> {
            self.live -= 1;
            self.log.push(format!("evict {item}"));
            Ok(())
        }
    }

    #[test]
    fn push_both_ends() {
        let mut chain = Chain::new();
        chain.push_back(2, &mut NoHooks).unwrap();
        chain.push_back(3, &mut NoHooks).unwrap();
        chain.push_front(1, &mut NoHooks).unwrap();

        assert_eq!(values(&chain), vec![1, 2, 3]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.get(chain.front().unwrap()), Some(&1));
        assert_eq!(chain.get(chain.back().unwrap()), Some(&3));
    }

    #[test]
    fn remove_oldest_takes_the_back() {
        let mut chain = Chain::new();
        for v in [1, 2, 3] {
            chain.push_front(v, &mut NoHooks).unwrap();
        }
        assert_eq!(chain.remove_oldest(&mut NoHooks).unwrap(), Some(1));
        assert_eq!(values(&chain), vec![3, 2]);
        chain.remove_oldest(&mut NoHooks).unwrap();
        chain.remove_oldest(&mut NoHooks).unwrap();
        assert_eq!(chain.remove_oldest(&mut NoHooks).unwrap(), None);
        assert!(chain.is_empty());
        assert!(chain.front().is_none());
        assert!(chain.back().is_none());
    }

    #[test]
    fn stale_handles_stop_resolving() {
        let mut chain = Chain::new();
        let a = chain.push_back(10, &mut NoHooks).unwrap();
        assert_eq!(chain.remove(a, &mut NoHooks).unwrap(), Some(10));
        assert!(!chain.contains(a));

        let b = chain.push_back(20, &mut NoHooks).unwrap();
        assert_ne!(a, b);
        assert_eq!(chain.get(a), None);
        assert_eq!(chain.get(b), Some(&20));
        assert_eq!(chain.remove(a, &mut NoHooks).unwrap(), None);
        assert!(!chain.update(a, |v| *v = 0, &mut NoHooks).unwrap());
    }

    #[test]
    fn remove_from_middle_relinks() {
        let mut chain = Chain::new();
        let handles: Vec<_> = (0..5)
            .map(|v| chain.push_back(v, &mut NoHooks).unwrap())
            .collect();
        chain.remove(handles[2], &mut NoHooks).unwrap();
        chain.remove(handles[0], &mut NoHooks).unwrap();
        chain.remove(handles[4], &mut NoHooks).unwrap();
        assert_eq!(values(&chain), vec![1, 3]);
        assert_eq!(chain.iter().len(), 2);
    }

    #[test]
    fn restore_skips_hooks() {
        let mut chain = Chain::new();
        chain.restore_back(1);
        chain.restore_back(2);
        chain.restore_front(0);
        assert_eq!(values(&chain), vec![0, 1, 2]);
    }

    #[test]
    fn admission_evicts_oldest() {
        let mut hooks = Bounded {
            room: 2,
            ..Default::default()
        };
        let mut chain = Chain::new();
        for v in [1, 2, 3] {
            chain.push_front(v, &mut hooks).unwrap();
        }
        assert_eq!(values(&chain), vec![3, 2]);
        assert_eq!(hooks.log, vec!["add 1", "add 2", "evict 1", "add 3"]);
    }

    #[test]
    fn admission_fails_when_nothing_to_evict() {
        let mut hooks = Bounded::default();
        let mut chain = Chain::new();
        assert_eq!(chain.push_back(1, &mut hooks), Err("full"));
        assert!(chain.is_empty());
    }

    #[test]
    fn update_never_evicts_itself() {
        let mut hooks = Bounded {
            room: 1,
            ..Default::default()
        };
        let mut chain = Chain::new();
        let h = chain.push_back(1, &mut hooks).unwrap();
        assert!(chain.update(h, |v| *v = 7, &mut hooks).unwrap());
        assert_eq!(values(&chain), vec![7]);
        assert_eq!(hooks.log, vec!["add 1", "update 1", "add 7"]);
    }

    #[test]
    fn failed_hook_leaves_chain_unchanged() {
        let mut hooks = Bounded {
            room: 4,
            ..Default::default()
        };
        let mut chain = Chain::new();
        let h = chain.push_back(1, &mut hooks).unwrap();
        hooks.fail_remove = true;
        assert_eq!(chain.remove(h, &mut hooks), Err("remove refused"));
        assert_eq!(chain.get(h), Some(&1));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn entries_are_reused() {
        let mut chain = Chain::new();
        for round in 0..10 {
            let h = chain.push_back(round, &mut NoHooks).unwrap();
            chain.remove(h, &mut NoHooks).unwrap();
        }
        assert_eq!(chain.entries.len(), 1);
    }
}
