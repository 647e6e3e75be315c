#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Ready,
    /// Drop the oldest item first, then ask again.
    EvictOldest,
}

/// A hook that fails aborts the change in progress. Evictions that already
/// went through stay done.
pub trait SequenceHooks<T> {
    type Error;

    /// Asked before an item is added or re-added. `can_evict` is false when
    /// the chain holds no item that could be dropped to make room.
    fn on_admit(&mut self, can_evict: bool) -> Result<Admission, Self::Error>;

    fn on_add(&mut self, item: &mut T) -> Result<(), Self::Error>;

    fn on_remove(&mut self, item: &mut T) -> Result<(), Self::Error>;

    /// The item's current contents are about to be replaced. After this
    /// returns the item is admitted and passed to `on_add` again.
    fn on_update(&mut self, item: &mut T) -> Result<(), Self::Error>;

    fn on_evict_oldest(&mut self, item: &mut T) -> Result<(), Self::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl<T> SequenceHooks<T> for NoHooks {
    type Error = std::convert::Infallible;

    fn on_admit(&mut self, _can_evict: bool) -> Result<Admission, Self::Error> {
        Ok(Admission::Ready)
    }

    fn on_add(&mut self, _item: &mut T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_remove(&mut self, _item: &mut T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_update(&mut self, _item: &mut T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_evict_oldest(&mut self, _item: &mut T) -> Result<(), Self::Error> {
        Ok(())
    }
}
