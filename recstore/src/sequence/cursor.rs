use crate::sequence::chain::{Chain, Handle};

/// A movable read position over a [`Chain`]. Walking off either end leaves
/// the cursor on no item; it does not wrap.
pub struct Cursor<'a, T> {
    chain: &'a Chain<T>,
    at: Option<usize>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(chain: &'a Chain<T>, at: Option<usize>) -> Self {
        Self { chain, at }
    }

    pub fn current(&self) -> Option<&'a T> {
        self.at.and_then(|i| self.chain.value_at(i))
    }

    pub fn handle(&self) -> Option<Handle> {
        self.at.map(|i| self.chain.handle_at(i))
    }

    /// Moves towards the back (older items).
    pub fn move_next(&mut self) -> Option<&'a T> {
        self.at = self.at.and_then(|i| self.chain.neighbours(i).1);
        self.current()
    }

    /// Moves towards the front (newer items).
    pub fn move_prev(&mut self) -> Option<&'a T> {
        self.at = self.at.and_then(|i| self.chain.neighbours(i).0);
        self.current()
    }

    pub fn seek_front(&mut self) {
        self.at = self.chain.cursor_front().at;
    }

    pub fn seek_back(&mut self) {
        self.at = self.chain.cursor_back().at;
    }
}
