//! Iterator interop for [`Sequence`].
//!
//! Two directions of adaptation:
//!
//! - A [`Sequence`] is consumed through [`SequenceIterator`], a plain
//!   pull adapter; `iter`, `to_vec`, and the [`IntoIterator`] impls build
//!   on it.
//! - An external iterator becomes a sequence either eagerly
//!   ([`FromIterator`]) or lazily through
//!   [`Sequence::from_iterator`], which wraps a possibly one-shot source
//!   in *memoized* nodes so repeated traversals do not re-consume it.

use std::cell::RefCell;
use std::rc::Rc;

use super::thunk::Thunk;
use super::{Node, Sequence};

/// A pull iterator over a sequence's elements.
///
/// Advancing forces one head per step; the spine behind the cursor is
/// released as it goes.
pub struct SequenceIterator<T> {
    remaining: Sequence<T>,
}

impl<T: Clone + 'static> Iterator for SequenceIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (head, tail) = self.remaining.uncons()?;
        self.remaining = tail;
        Some(head)
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Returns an iterator over the elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let total: i32 = Sequence::from_vec(vec![1, 2, 3]).iter().sum();
    /// assert_eq!(total, 6);
    /// ```
    pub fn iter(&self) -> SequenceIterator<T> {
        SequenceIterator {
            remaining: self.clone(),
        }
    }

    /// Collects the elements into a vector, in order.
    ///
    /// Forces the whole sequence; finite inputs only.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Wraps an external iterator as a lazily pulled, memoized sequence.
    ///
    /// Elements are pulled one at a time, each node caches its element,
    /// and the shared cursor advances exactly once per node. This makes a
    /// one-shot source safe to traverse repeatedly: the second pass reads
    /// the caches instead of pulling again.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// // `into_iter` on a Vec is a consuming, one-shot source
    /// let sequence = Sequence::from_iterator(vec![1, 2, 3].into_iter());
    /// assert_eq!(sequence.to_vec(), vec![1, 2, 3]);
    /// assert_eq!(sequence.to_vec(), vec![1, 2, 3]); // second pass hits the caches
    /// ```
    pub fn from_iterator<I>(iterator: I) -> Self
    where
        I: Iterator<Item = T> + 'static,
    {
        Self::pull(Rc::new(RefCell::new(iterator)))
    }

    fn pull(source: Rc<RefCell<dyn Iterator<Item = T>>>) -> Self {
        Self::from_cell(Thunk::pending(move || {
            let element = source.borrow_mut().next();
            match element {
                None => Node::Empty,
                Some(value) => Node::Cons(Thunk::ready(value), Self::pull(source)),
            }
        }))
    }
}

impl<T: Clone + 'static> FromIterator<T> for Sequence<T> {
    /// Collects eagerly, preserving order.
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        Self::from_vec(iterable.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::from_vec(elements)
    }
}

impl<T: Clone + 'static> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = SequenceIterator<T>;

    fn into_iter(self) -> SequenceIterator<T> {
        SequenceIterator { remaining: self }
    }
}

impl<T: Clone + 'static> IntoIterator for &Sequence<T> {
    type Item = T;
    type IntoIter = SequenceIterator<T>;

    fn into_iter(self) -> SequenceIterator<T> {
        self.iter()
    }
}
