//! Per-node suspensions for the persistent sequence.
//!
//! [`Thunk<T>`] is the cell type a [`Sequence`](super::Sequence) hangs its
//! heads and spine nodes on. Unlike [`Deferred`](crate::control::Deferred)
//! it supports two evaluation disciplines:
//!
//! - **volatile**: the suspended computation reruns on every demand. This
//!   is the default for derived sequences, which recompute on each
//!   traversal unless memoized.
//! - **pending**: the computation runs at most once and the result is
//!   cached, following the same state machine as `Deferred`. Produced by
//!   [`Sequence::memoize`](super::Sequence::memoize) and by adapters over
//!   one-shot sources.
//!
//! Clones share the underlying cell, so a cached result is visible
//! through every handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The state of a [`Thunk`].
enum ThunkState<T> {
    /// The value is available.
    Ready(T),
    /// Recompute on every demand.
    Volatile(Rc<dyn Fn() -> T>),
    /// Compute once, then cache.
    Pending(Box<dyn FnOnce() -> T>),
    /// A pending computation is running, or it panicked.
    Poisoned,
}

/// A shareable suspension of a sequence head or spine node.
///
/// See the [module documentation](self) for the evaluation disciplines.
///
/// # Examples
///
/// ```rust
/// use lazyseq::sequence::Thunk;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let runs = Rc::new(Cell::new(0));
/// let probe = Rc::clone(&runs);
/// let volatile = Thunk::defer(move || {
///     probe.set(probe.get() + 1);
///     42
/// });
///
/// assert_eq!(volatile.force(), 42);
/// assert_eq!(volatile.force(), 42);
/// assert_eq!(runs.get(), 2); // reran on each demand
///
/// let cached = volatile.memoized();
/// assert_eq!(cached.force(), 42);
/// assert_eq!(cached.force(), 42);
/// assert_eq!(runs.get(), 3); // ran once more, then cached
/// ```
pub struct Thunk<T> {
    state: Rc<RefCell<ThunkState<T>>>,
}

impl<T> Clone for Thunk<T> {
    /// Returns a handle sharing the same cell.
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Thunk<T> {
    fn from_state(state: ThunkState<T>) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Creates a thunk holding an already-computed value.
    #[inline]
    pub fn ready(value: T) -> Self {
        Self::from_state(ThunkState::Ready(value))
    }

    /// Creates a volatile thunk; the computation reruns on every demand.
    #[inline]
    pub fn defer<F>(function: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self::from_state(ThunkState::Volatile(Rc::new(function)))
    }

    /// Creates a memoizing thunk; the computation runs at most once.
    #[inline]
    pub fn pending<F>(computation: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        Self::from_state(ThunkState::Pending(Box::new(computation)))
    }

    /// Returns whether a value is cached.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        matches!(&*self.state.borrow(), ThunkState::Ready(_))
    }

    /// Extracts the value during spine dismantling.
    ///
    /// Only meaningful when this handle uniquely owns the cell; a shared
    /// cell is left untouched so other holders keep their view.
    pub(crate) fn unlink(self) -> Option<T> {
        if Rc::strong_count(&self.state) != 1 {
            return None;
        }
        match std::mem::replace(&mut *self.state.borrow_mut(), ThunkState::Poisoned) {
            ThunkState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Clone> Thunk<T> {
    /// Produces the value, honouring the cell's evaluation discipline.
    ///
    /// Ready values are cloned out of the cache; volatile computations
    /// rerun; pending computations run once and cache.
    ///
    /// # Panics
    ///
    /// - If a pending computation panics; the cell is poisoned and all
    ///   later forces panic as well.
    /// - If called re-entrantly while the pending computation runs.
    pub fn force(&self) -> T {
        let volatile = {
            match &*self.state.borrow() {
                ThunkState::Ready(value) => return value.clone(),
                ThunkState::Volatile(function) => Some(Rc::clone(function)),
                ThunkState::Pending(_) => None,
                ThunkState::Poisoned => panic!("thunk has been poisoned"),
            }
        };

        if let Some(function) = volatile {
            return function();
        }

        let computation = {
            let mut state = self.state.borrow_mut();
            match std::mem::replace(&mut *state, ThunkState::Poisoned) {
                ThunkState::Pending(computation) => computation,
                _ => unreachable!("state checked above"),
            }
        };

        let value = computation();
        *self.state.borrow_mut() = ThunkState::Ready(value.clone());
        value
    }

    /// Returns the cached value, never triggering evaluation.
    pub fn peek(&self) -> Option<T> {
        match &*self.state.borrow() {
            ThunkState::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl<T: Clone + 'static> Thunk<T> {
    /// Returns a memoizing view of this thunk.
    ///
    /// A volatile cell is wrapped so its computation runs at most once
    /// from here on; ready and pending cells are already cached (or about
    /// to be) and are shared as-is.
    pub fn memoized(&self) -> Self {
        let volatile = match &*self.state.borrow() {
            ThunkState::Volatile(function) => Rc::clone(function),
            _ => return self.clone(),
        };
        Self::pending(move || volatile())
    }
}

impl<T: fmt::Debug> fmt::Debug for Thunk<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            ThunkState::Ready(value) => formatter.debug_tuple("Thunk").field(value).finish(),
            ThunkState::Volatile(_) => formatter.debug_tuple("Thunk").field(&"<volatile>").finish(),
            ThunkState::Pending(_) => formatter.debug_tuple("Thunk").field(&"<pending>").finish(),
            ThunkState::Poisoned => formatter.debug_tuple("Thunk").field(&"<poisoned>").finish(),
        }
    }
}
