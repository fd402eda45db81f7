//! Persistent, lazily evaluated sequences.
//!
//! This module provides [`Sequence<T>`], a recursively defined cons list:
//! a sequence is either empty, or a suspended head together with a
//! suspended tail. Nothing is computed until the one-step dispatch
//! ([`Sequence::cases`]) expands a node, so infinite sequences are
//! well-formed as long as no total-traversal operation touches them.
//!
//! # Persistence
//!
//! Sequences are immutable and share structure: a derived sequence
//! references the suffix it has in common with its source instead of
//! copying it, and the source stays valid and unchanged.
//!
//! # Evaluation Discipline
//!
//! Derived sequences are *volatile* by default: traversing them twice
//! recomputes their nodes twice. [`Sequence::memoize`] wraps every node in
//! a run-at-most-once cache, which is required when the underlying source
//! is single-pass (see [`Sequence::from_iterator`], which memoizes for
//! exactly that reason).
//!
//! Operations that would recurse once per element (length, equality,
//! ordering, eager right folds, the boolean aggregations) run on the
//! [`Trampoline`](crate::control::Trampoline) substrate and stay
//! stack-safe for sequences with hundreds of thousands of elements.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::sequence::Sequence;
//!
//! let naturals = Sequence::iterate(0u64, |n| n + 1);
//! let evens: Vec<u64> = naturals.filter(|n| n % 2 == 0).take(4).to_vec();
//! assert_eq!(evens, vec![0, 2, 4, 6]);
//! ```

mod combinatorics;
mod iterator;
mod thunk;

pub use iterator::SequenceIterator;
pub use thunk::Thunk;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::adt::{Maybe, Pair};
use crate::control::{Deferred, Trampoline};

/// A single expanded node of a sequence.
///
/// Cloning is shallow: handles to the head cell and the tail spine are
/// shared, never the values behind them.
pub(crate) enum Node<T> {
    /// The sequence ends here.
    Empty,
    /// A suspended head and the rest of the sequence.
    Cons(Thunk<T>, Sequence<T>),
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Cons(head, tail) => Self::Cons(head.clone(), tail.clone()),
        }
    }
}

/// A persistent, lazily evaluated sequence.
///
/// A `Sequence<T>` is a handle onto a suspended [`Node`]: expanding the
/// handle reveals whether the sequence is empty or a head/tail pair, and
/// the head itself stays suspended until forced. Clones share structure.
///
/// Most operations require `T: Clone + 'static`: elements are handed out
/// by value from shared nodes, and suspended nodes are stored behind
/// type-erased closures.
///
/// # Examples
///
/// ```rust
/// use lazyseq::sequence::Sequence;
///
/// let sequence = Sequence::from_vec(vec![1, 2, 3]);
/// let doubled: Vec<i32> = sequence.map(|n| n * 2).to_vec();
/// assert_eq!(doubled, vec![2, 4, 6]);
///
/// // the source is persistent and unaffected
/// assert_eq!(sequence.to_vec(), vec![1, 2, 3]);
/// ```
pub struct Sequence<T> {
    /// `None` only transiently while `drop` dismantles the spine.
    cell: Option<Thunk<Node<T>>>,
}

impl<T> Clone for Sequence<T> {
    /// Returns a handle sharing the same spine.
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> Drop for Sequence<T> {
    /// Dismantles uniquely-owned spine prefixes iteratively.
    ///
    /// A fully evaluated sequence is a chain of nodes each owning the
    /// next; dropping it through the compiler-generated glue would recurse
    /// once per node and overflow the stack on long spines. The loop
    /// unlinks each node first, stopping at any cell another handle still
    /// shares.
    fn drop(&mut self) {
        let mut current = self.cell.take();
        while let Some(cell) = current {
            current = match cell.unlink() {
                Some(Node::Cons(head, mut tail)) => {
                    drop(head);
                    tail.cell.take()
                }
                _ => None,
            };
        }
    }
}

impl<T> Default for Sequence<T> {
    /// The empty sequence.
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Construction and Dispatch
// =============================================================================

impl<T> Sequence<T> {
    pub(crate) fn from_cell(cell: Thunk<Node<T>>) -> Self {
        Self { cell: Some(cell) }
    }

    pub(crate) fn cell(&self) -> &Thunk<Node<T>> {
        self.cell
            .as_ref()
            .expect("sequence cell is only absent during drop")
    }

    /// Expands one node of the spine.
    fn expand(&self) -> Node<T> {
        self.cell().force()
    }

    /// Creates the empty sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let empty: Sequence<i32> = Sequence::empty();
    /// assert!(empty.is_empty());
    /// ```
    #[inline]
    pub fn empty() -> Self {
        Self::from_cell(Thunk::ready(Node::Empty))
    }

    /// Prepends an element to a sequence.
    ///
    /// The tail is shared, not copied; this is the persistence primitive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let sequence = Sequence::cons(1, Sequence::cons(2, Sequence::empty()));
    /// assert_eq!(sequence.length(), 2);
    /// ```
    #[inline]
    pub fn cons(head: T, tail: Self) -> Self {
        Self::from_cell(Thunk::ready(Node::Cons(Thunk::ready(head), tail)))
    }

    /// Prepends a suspended head to a sequence.
    ///
    /// The head thunk keeps its own evaluation discipline; see
    /// [`Thunk`].
    #[inline]
    pub fn cons_deferred(head: Thunk<T>, tail: Self) -> Self {
        Self::from_cell(Thunk::ready(Node::Cons(head, tail)))
    }

    /// Builds a sequence eagerly from a vector, preserving order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let sequence = Sequence::from_vec(vec![1, 2, 3]);
    /// assert_eq!(sequence.to_vec(), vec![1, 2, 3]);
    /// ```
    pub fn from_vec(elements: Vec<T>) -> Self {
        let mut sequence = Self::empty();
        for element in elements.into_iter().rev() {
            sequence = Self::cons(element, sequence);
        }
        sequence
    }

    /// One-step dispatch with the head kept lazy.
    ///
    /// Expands exactly one spine node and runs exactly one handler:
    /// `on_cons` receives the still-suspended head and the tail,
    /// `on_empty` receives nothing. Every other sequence operation is
    /// expressible through this dispatch and the two constructors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let sequence = Sequence::from_vec(vec![1, 2, 3]);
    /// let described = sequence.cases(
    ///     |head, _tail| format!("starts with {}", head.force()),
    ///     || "empty".to_string(),
    /// );
    /// assert_eq!(described, "starts with 1");
    /// ```
    pub fn cases<R>(
        &self,
        on_cons: impl FnOnce(Thunk<T>, Sequence<T>) -> R,
        on_empty: impl FnOnce() -> R,
    ) -> R {
        match self.expand() {
            Node::Cons(head, tail) => on_cons(head, tail),
            Node::Empty => on_empty(),
        }
    }

    /// Decomposes into the lazy head and the tail.
    ///
    /// Expands one spine node; the head stays suspended.
    pub fn uncons_lazy(&self) -> Option<(Thunk<T>, Sequence<T>)> {
        self.cases(|head, tail| Some((head, tail)), || None)
    }

    /// Returns whether the sequence is empty.
    ///
    /// Expands one spine node to find out.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cases(|_, _| false, || true)
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Suspends a whole sequence behind a computation.
    ///
    /// The computation runs every time the first node is demanded
    /// (volatile discipline); apply [`memoize`](Sequence::memoize) for
    /// run-once caching.
    pub fn defer<F>(step: F) -> Self
    where
        F: Fn() -> Self + 'static,
    {
        Self::from_cell(Thunk::defer(move || step().expand()))
    }

    /// The infinite sequence `seed, step(seed), step(step(seed)), ...`.
    ///
    /// Each application of `step` is deferred until the element after it
    /// is demanded; taking a prefix never computes past it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let naturals = Sequence::iterate(0, |n| n + 1);
    /// assert_eq!(naturals.take(4).to_vec(), vec![0, 1, 2, 3]);
    /// ```
    pub fn iterate<F>(seed: T, step: F) -> Self
    where
        F: Fn(T) -> T + 'static,
    {
        Self::iterate_shared(seed, Rc::new(step))
    }

    fn iterate_shared(seed: T, step: Rc<dyn Fn(T) -> T>) -> Self {
        Self::from_cell(Thunk::defer(move || {
            let tail = {
                let seed = seed.clone();
                let step = Rc::clone(&step);
                Sequence::defer(move || Sequence::iterate_shared(step(seed.clone()), Rc::clone(&step)))
            };
            Node::Cons(Thunk::ready(seed.clone()), tail)
        }))
    }

    /// The infinite sequence repeating one value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// assert_eq!(Sequence::repeat(7).take(3).to_vec(), vec![7, 7, 7]);
    /// ```
    pub fn repeat(value: T) -> Self {
        Self::from_cell(Thunk::defer(move || {
            Node::Cons(Thunk::ready(value.clone()), Self::repeat(value.clone()))
        }))
    }

    /// The infinite sequence cycling through this one.
    ///
    /// Cycling an empty sequence yields the empty sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let pattern = Sequence::from_vec(vec![1, 2, 3]);
    /// assert_eq!(pattern.cycle().take(7).to_vec(), vec![1, 2, 3, 1, 2, 3, 1]);
    /// ```
    pub fn cycle(&self) -> Self {
        let source = self.clone();
        Self::defer(move || {
            if source.is_empty() {
                Sequence::empty()
            } else {
                source.append(&source.cycle())
            }
        })
    }

    /// One-step dispatch with the head forced first.
    ///
    /// The head is forced before `on_cons` runs; the tail stays
    /// suspended.
    pub fn cases_eager<R>(
        &self,
        on_cons: impl FnOnce(T, Sequence<T>) -> R,
        on_empty: impl FnOnce() -> R,
    ) -> R {
        match self.expand() {
            Node::Cons(head, tail) => on_cons(head.force(), tail),
            Node::Empty => on_empty(),
        }
    }

    /// Decomposes into the forced head and the tail.
    pub fn uncons(&self) -> Option<(T, Sequence<T>)> {
        self.cases_eager(|head, tail| Some((head, tail)), || None)
    }

    /// The first element, with its payload still suspended.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let sequence = Sequence::from_vec(vec![1, 2, 3]);
    /// assert_eq!(sequence.first().into_option(), Some(1));
    /// ```
    pub fn first(&self) -> Maybe<T> {
        self.cases(|head, _| Maybe::defer(move || head.force()), Maybe::nothing)
    }

    /// The sequence without its first element.
    ///
    /// Empty sequences yield the empty sequence.
    pub fn rest(&self) -> Self {
        let source = self.clone();
        Self::defer(move || source.cases(|_, tail| tail, || Sequence::empty()))
    }

    /// The last element of a finite sequence.
    pub fn last(&self) -> Maybe<T> {
        let mut result = Maybe::nothing();
        let mut current = self.clone();
        while let Some((head, tail)) = current.uncons_lazy() {
            result = Maybe::defer(move || head.force());
            current = tail;
        }
        result
    }

    /// The element at the given position.
    ///
    /// Expands the spine up to `index` but forces no head other than the
    /// one returned; safe on infinite sequences.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let naturals = Sequence::iterate(0, |n| n + 1);
    /// assert_eq!(naturals.get(4).into_option(), Some(4));
    /// assert_eq!(Sequence::<i32>::empty().get(0).into_option(), None);
    /// ```
    pub fn get(&self, index: usize) -> Maybe<T> {
        let mut remaining = index;
        let mut current = self.clone();
        loop {
            match current.uncons_lazy() {
                None => return Maybe::nothing(),
                Some((head, tail)) => {
                    if remaining == 0 {
                        return Maybe::defer(move || head.force());
                    }
                    remaining -= 1;
                    current = tail;
                }
            }
        }
    }

    /// The first element satisfying the predicate.
    ///
    /// Forces heads one at a time and stops at the first match, so it
    /// terminates on infinite sequences whose predicate eventually holds.
    pub fn find<P>(&self, predicate: P) -> Maybe<T>
    where
        P: Fn(&T) -> bool,
    {
        let mut current = self.clone();
        loop {
            match current.uncons() {
                None => return Maybe::nothing(),
                Some((head, tail)) => {
                    if predicate(&head) {
                        return Maybe::just(head);
                    }
                    current = tail;
                }
            }
        }
    }

    /// The number of elements.
    ///
    /// Runs on the trampoline substrate; counting hundreds of thousands
    /// of elements uses bounded native stack. Diverges on infinite
    /// sequences.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// assert_eq!(Sequence::from_vec(vec![1, 2, 3]).length(), 3);
    /// ```
    pub fn length(&self) -> usize {
        fn count<T: Clone + 'static>(sequence: Sequence<T>, so_far: usize) -> Trampoline<usize> {
            match sequence.uncons_lazy() {
                None => Trampoline::done(so_far),
                Some((_, tail)) => Trampoline::call2(count, tail, so_far + 1),
            }
        }
        count(self.clone(), 0).run()
    }

    /// Whether any element satisfies the predicate; short-circuits.
    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool + 'static,
    {
        fn step<T: Clone + 'static>(
            sequence: Sequence<T>,
            predicate: Rc<dyn Fn(&T) -> bool>,
        ) -> Trampoline<bool> {
            match sequence.uncons_lazy() {
                None => Trampoline::done(false),
                Some((head, tail)) => {
                    if predicate(&head.force()) {
                        Trampoline::done(true)
                    } else {
                        Trampoline::call2(step, tail, predicate)
                    }
                }
            }
        }
        step(self.clone(), Rc::new(predicate)).run()
    }

    /// Whether every element satisfies the predicate; short-circuits.
    pub fn all<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool + 'static,
    {
        fn step<T: Clone + 'static>(
            sequence: Sequence<T>,
            predicate: Rc<dyn Fn(&T) -> bool>,
        ) -> Trampoline<bool> {
            match sequence.uncons_lazy() {
                None => Trampoline::done(true),
                Some((head, tail)) => {
                    if predicate(&head.force()) {
                        Trampoline::call2(step, tail, predicate)
                    } else {
                        Trampoline::done(false)
                    }
                }
            }
        }
        step(self.clone(), Rc::new(predicate)).run()
    }

    /// Whether the sequence contains the value.
    pub fn contains(&self, target: &T) -> bool
    where
        T: PartialEq,
    {
        let target = target.clone();
        self.any(move |element| *element == target)
    }

    // =========================================================================
    // Transformations
    // =========================================================================

    /// Applies a function to every element, lazily.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let squares = Sequence::iterate(1u64, |n| n + 1).map(|n| n * n);
    /// assert_eq!(squares.take(4).to_vec(), vec![1, 4, 9, 16]);
    /// ```
    pub fn map<U, F>(&self, function: F) -> Sequence<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        self.map_shared(Rc::new(function))
    }

    fn map_shared<U: Clone + 'static>(&self, function: Rc<dyn Fn(T) -> U>) -> Sequence<U> {
        let source = self.clone();
        Sequence::defer(move || {
            let function = Rc::clone(&function);
            source.cases(
                move |head, tail| {
                    let mapped = {
                        let function = Rc::clone(&function);
                        Thunk::defer(move || function(head.force()))
                    };
                    Sequence::cons_deferred(mapped, tail.map_shared(function))
                },
                || Sequence::empty(),
            )
        })
    }

    /// Keeps only the elements satisfying the predicate, lazily.
    ///
    /// Expanding a node scans forward to the next match iteratively, so
    /// long rejected runs cost no stack.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        self.filter_shared(Rc::new(predicate))
    }

    fn filter_shared(&self, predicate: Rc<dyn Fn(&T) -> bool>) -> Self {
        let source = self.clone();
        Self::defer(move || {
            let predicate = Rc::clone(&predicate);
            let mut current = source.clone();
            loop {
                match current.uncons_lazy() {
                    None => return Sequence::empty(),
                    Some((head, tail)) => {
                        let value = head.force();
                        if predicate(&value) {
                            return Sequence::cons(value, tail.filter_shared(predicate));
                        }
                        current = tail;
                    }
                }
            }
        })
    }

    /// Maps every element to a sequence and concatenates the results.
    pub fn flat_map<U, F>(&self, function: F) -> Sequence<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> Sequence<U> + 'static,
    {
        self.map(function).flatten()
    }

    /// The first `count` elements.
    ///
    /// Never expands the source past `count` nodes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let naturals = Sequence::iterate(0, |n| n + 1);
    /// assert_eq!(naturals.take(3).to_vec(), vec![0, 1, 2]);
    /// ```
    pub fn take(&self, count: usize) -> Self {
        let source = self.clone();
        Self::defer(move || {
            if count == 0 {
                return Sequence::empty();
            }
            source.cases(
                |head, tail| Sequence::cons_deferred(head, tail.take(count - 1)),
                || Sequence::empty(),
            )
        })
    }

    /// The longest prefix whose elements satisfy the predicate.
    pub fn take_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        self.take_while_shared(Rc::new(predicate))
    }

    fn take_while_shared(&self, predicate: Rc<dyn Fn(&T) -> bool>) -> Self {
        let source = self.clone();
        Self::defer(move || {
            let predicate = Rc::clone(&predicate);
            source.cases_eager(
                move |head, tail| {
                    if predicate(&head) {
                        Sequence::cons(head, tail.take_while_shared(predicate))
                    } else {
                        Sequence::empty()
                    }
                },
                || Sequence::empty(),
            )
        })
    }

    /// The sequence without its first `count` elements.
    pub fn drop_first(&self, count: usize) -> Self {
        let source = self.clone();
        Self::defer(move || {
            let mut remaining = count;
            let mut current = source.clone();
            while remaining > 0 {
                match current.uncons_lazy() {
                    None => return Sequence::empty(),
                    Some((_, tail)) => {
                        current = tail;
                        remaining -= 1;
                    }
                }
            }
            current
        })
    }

    /// The sequence without its longest satisfying prefix.
    pub fn drop_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Self::defer(move || {
            let mut current = source.clone();
            loop {
                match current.uncons_lazy() {
                    None => return Sequence::empty(),
                    Some((head, tail)) => {
                        if predicate(&head.force()) {
                            current = tail;
                        } else {
                            return Sequence::cons_deferred(head, tail);
                        }
                    }
                }
            }
        })
    }

    /// This sequence followed by another, lazily.
    ///
    /// The second sequence is untouched until the first runs out, so
    /// appending to an infinite sequence is harmless.
    pub fn append(&self, other: &Self) -> Self {
        let first = self.clone();
        let second = other.clone();
        Self::defer(move || {
            first.cases(
                |head, tail| Sequence::cons_deferred(head, tail.append(&second)),
                || second.clone(),
            )
        })
    }

    /// Pairs elements by position, stopping at the shorter operand.
    ///
    /// Each [`Pair`] keeps both components independently suspended;
    /// forcing one side leaves the other untouched.
    pub fn zip<U: Clone + 'static>(&self, other: &Sequence<U>) -> Sequence<Pair<T, U>> {
        let left = self.clone();
        let right = other.clone();
        Sequence::defer(move || match (left.uncons_lazy(), right.uncons_lazy()) {
            (Some((left_head, left_tail)), Some((right_head, right_tail))) => {
                let pair = Pair::from_deferred(
                    Deferred::new(move || left_head.force()),
                    Deferred::new(move || right_head.force()),
                );
                Sequence::cons(pair, left_tail.zip(&right_tail))
            }
            _ => Sequence::empty(),
        })
    }

    /// Combines elements by position with a function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let left = Sequence::from_vec(vec![1, 2, 3]);
    /// let right = Sequence::from_vec(vec![10, 20, 30, 40]);
    /// let sums = left.zip_with(&right, |a, b| a + b);
    /// assert_eq!(sums.to_vec(), vec![11, 22, 33]);
    /// ```
    pub fn zip_with<U, V, F>(&self, other: &Sequence<U>, function: F) -> Sequence<V>
    where
        U: Clone + 'static,
        V: Clone + 'static,
        F: Fn(T, U) -> V + 'static,
    {
        self.zip_with_shared(other.clone(), Rc::new(function))
    }

    fn zip_with_shared<U, V>(
        &self,
        other: Sequence<U>,
        function: Rc<dyn Fn(T, U) -> V>,
    ) -> Sequence<V>
    where
        U: Clone + 'static,
        V: Clone + 'static,
    {
        let left = self.clone();
        Sequence::defer(move || {
            let function = Rc::clone(&function);
            match (left.uncons_lazy(), other.uncons_lazy()) {
                (Some((left_head, left_tail)), Some((right_head, right_tail))) => {
                    let combined = {
                        let function = Rc::clone(&function);
                        Thunk::defer(move || function(left_head.force(), right_head.force()))
                    };
                    Sequence::cons_deferred(combined, left_tail.zip_with_shared(right_tail, function))
                }
                _ => Sequence::empty(),
            }
        })
    }

    /// Pairs every element with its position.
    pub fn zip_with_index(&self) -> Sequence<Pair<usize, T>> {
        self.zip_with_index_from(0)
    }

    fn zip_with_index_from(&self, start: usize) -> Sequence<Pair<usize, T>> {
        let source = self.clone();
        Sequence::defer(move || match source.uncons_lazy() {
            None => Sequence::empty(),
            Some((head, tail)) => {
                let pair = Pair::from_deferred(
                    Deferred::ready(start),
                    Deferred::new(move || head.force()),
                );
                Sequence::cons(pair, tail.zip_with_index_from(start + 1))
            }
        })
    }

    /// Places a separator between adjacent elements, lazily.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let sequence = Sequence::from_vec(vec![1, 2, 3]).intersperse(0);
    /// assert_eq!(sequence.to_vec(), vec![1, 0, 2, 0, 3]);
    /// ```
    pub fn intersperse(&self, separator: T) -> Self {
        let source = self.clone();
        Self::defer(move || {
            source.cases(
                |head, tail| Sequence::cons_deferred(head, tail.separated(separator.clone())),
                || Sequence::empty(),
            )
        })
    }

    /// Prefixes every element with the separator.
    fn separated(&self, separator: T) -> Self {
        let source = self.clone();
        Self::defer(move || {
            source.cases(
                |head, tail| {
                    Sequence::cons(
                        separator.clone(),
                        Sequence::cons_deferred(head, tail.separated(separator.clone())),
                    )
                },
                || Sequence::empty(),
            )
        })
    }

    /// The elements in reverse order.
    ///
    /// Materialization is deferred until the first node is demanded.
    pub fn reverse(&self) -> Self {
        let source = self.clone();
        Self::defer(move || {
            source.fold_left(Sequence::empty(), |reversed, element| {
                Sequence::cons(element, reversed)
            })
        })
    }

    /// The elements sorted by a comparator.
    ///
    /// Materialization is deferred until the first node is demanded.
    pub fn sort_by<F>(&self, comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        let source = self.clone();
        Self::defer(move || {
            let mut elements = source.to_vec();
            elements.sort_by(|left, right| comparator(left, right));
            Sequence::from_vec(elements)
        })
    }

    /// The elements in ascending order.
    pub fn sorted(&self) -> Self
    where
        T: Ord,
    {
        self.sort_by(Ord::cmp)
    }

    /// Returns a memoizing view of this sequence.
    ///
    /// Every node's head and spine computation is wrapped so it runs at
    /// most once; re-traversal pulls from the per-node caches. Required
    /// when the sequence wraps a one-shot source, where recomputation
    /// would re-consume it or come back truncated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let runs = Rc::new(Cell::new(0));
    /// let probe = Rc::clone(&runs);
    /// let mapped = Sequence::from_vec(vec![1, 2, 3]).map(move |n| {
    ///     probe.set(probe.get() + 1);
    ///     n * 2
    /// });
    ///
    /// let memoized = mapped.memoize();
    /// memoized.to_vec();
    /// memoized.to_vec();
    /// assert_eq!(runs.get(), 3); // computed once per element, not per pass
    /// ```
    pub fn memoize(&self) -> Self {
        let source = self.clone();
        Self::from_cell(Thunk::pending(move || match source.expand() {
            Node::Empty => Node::Empty,
            Node::Cons(head, tail) => Node::Cons(head.memoized(), tail.memoize()),
        }))
    }

    /// Groups elements by a key, preserving encounter order.
    ///
    /// Keys appear in order of first occurrence; each group preserves the
    /// source order of its members. Materialization is deferred until the
    /// first group is demanded.
    pub fn group_by<K, F>(&self, key_function: F) -> Sequence<Pair<K, Sequence<T>>>
    where
        K: Clone + PartialEq + 'static,
        F: Fn(&T) -> K + 'static,
    {
        let source = self.clone();
        Sequence::defer(move || {
            let mut groups: Vec<(K, Vec<T>)> = Vec::new();
            let mut current = source.clone();
            while let Some((element, tail)) = current.uncons() {
                let key = key_function(&element);
                match groups.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, members)) => members.push(element),
                    None => groups.push((key, vec![element])),
                }
                current = tail;
            }
            Sequence::from_vec(
                groups
                    .into_iter()
                    .map(|(key, members)| Pair::of(key, Sequence::from_vec(members)))
                    .collect(),
            )
        })
    }

    /// Splits into the matching and non-matching elements.
    ///
    /// Both halves are lazy filters over the shared source.
    pub fn partition<P>(&self, predicate: P) -> Pair<Self, Self>
    where
        P: Fn(&T) -> bool + 'static,
    {
        let predicate = Rc::new(predicate);
        let matching = {
            let predicate = Rc::clone(&predicate);
            self.filter(move |element| predicate(element))
        };
        let rest = self.filter(move |element| !predicate(element));
        Pair::of(matching, rest)
    }

    /// Sliding windows of the given size, advancing one element at a time.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let windows = Sequence::from_vec(vec![1, 2, 3, 4]).windows(2);
    /// let collected: Vec<Vec<i32>> = windows.map(|w| w.to_vec()).to_vec();
    /// assert_eq!(collected, vec![vec![1, 2], vec![2, 3], vec![3, 4]]);
    /// ```
    pub fn windows(&self, size: usize) -> Sequence<Sequence<T>> {
        assert!(size > 0, "window size must be positive");
        let source = self.clone();
        Sequence::defer(move || {
            let mut window = Vec::with_capacity(size);
            let mut cursor = source.clone();
            while window.len() < size {
                match cursor.uncons() {
                    None => return Sequence::empty(),
                    Some((head, tail)) => {
                        window.push(head);
                        cursor = tail;
                    }
                }
            }
            Sequence::cons(Sequence::from_vec(window), source.rest().windows(size))
        })
    }

    /// Non-overlapping chunks of the given size; the last may be short.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn grouped(&self, size: usize) -> Sequence<Sequence<T>> {
        assert!(size > 0, "group size must be positive");
        let source = self.clone();
        Sequence::defer(move || {
            if source.is_empty() {
                Sequence::empty()
            } else {
                Sequence::cons(source.take(size), source.drop_first(size).grouped(size))
            }
        })
    }

    // =========================================================================
    // Folds
    // =========================================================================

    /// Eager left fold; iterative and stack-safe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let total = Sequence::from_vec(vec![1, 2, 3, 4]).fold_left(0, |sum, n| sum + n);
    /// assert_eq!(total, 10);
    /// ```
    pub fn fold_left<B, F>(&self, initial: B, mut function: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        let mut accumulator = initial;
        let mut current = self.clone();
        while let Some((head, tail)) = current.uncons() {
            accumulator = function(accumulator, head);
            current = tail;
        }
        accumulator
    }

    /// Eager right fold, trampolined.
    ///
    /// Traverses the whole sequence; runs on the trampoline substrate so
    /// deep spines stay stack-safe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let folded = Sequence::from_vec(vec![1, 2, 3])
    ///     .fold_right(Vec::new(), |element, mut rest| {
    ///         rest.insert(0, element);
    ///         rest
    ///     });
    /// assert_eq!(folded, vec![1, 2, 3]);
    /// ```
    pub fn fold_right<B, F>(&self, initial: B, function: F) -> B
    where
        B: 'static,
        F: Fn(T, B) -> B + 'static,
    {
        fold_right_step(self.clone(), initial, Rc::new(function)).run()
    }

    /// Short-circuiting right fold.
    ///
    /// The handler receives the head and the *suspended* rest of the
    /// fold; skipping the force stops traversal on the spot. Forcing
    /// every continuation recurses once per element, so use
    /// [`fold_right`](Sequence::fold_right) for full traversals of long
    /// sequences.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// // stops multiplying the moment a zero is seen
    /// let product = Sequence::from_vec(vec![3, 0, 7])
    ///     .fold_right_lazy(1, |element, rest| {
    ///         if element == 0 { 0 } else { element * rest.force() }
    ///     });
    /// assert_eq!(product, 0);
    /// ```
    pub fn fold_right_lazy<B, F>(&self, initial: B, function: F) -> B
    where
        B: Clone + 'static,
        F: Fn(T, Thunk<B>) -> B + Clone + 'static,
    {
        match self.uncons_lazy() {
            None => initial,
            Some((head, tail)) => {
                let continuation = {
                    let function = function.clone();
                    Thunk::pending(move || tail.fold_right_lazy(initial, function))
                };
                function(head.force(), continuation)
            }
        }
    }

    /// Left fold seeded with the first element.
    pub fn reduce_left<F>(&self, function: F) -> Maybe<T>
    where
        F: FnMut(T, T) -> T,
    {
        match self.uncons() {
            None => Maybe::nothing(),
            Some((head, tail)) => Maybe::just(tail.fold_left(head, function)),
        }
    }
}

/// Trampolined worker for [`Sequence::fold_right`].
fn fold_right_step<T, B>(
    sequence: Sequence<T>,
    initial: B,
    function: Rc<dyn Fn(T, B) -> B>,
) -> Trampoline<B>
where
    T: Clone + 'static,
    B: 'static,
{
    match sequence.uncons_lazy() {
        None => Trampoline::done(initial),
        Some((head, tail)) => {
            let recursed = Rc::clone(&function);
            Trampoline::more(move || fold_right_step(tail, initial, recursed))
                .map(move |accumulator| function(head.force(), accumulator))
        }
    }
}

// =============================================================================
// Specialised Element Types
// =============================================================================

impl Sequence<i64> {
    /// The integers from `start` to `end`, both inclusive.
    ///
    /// An empty range (`start > end`) is the empty sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// assert_eq!(Sequence::range(1, 5).to_vec(), vec![1, 2, 3, 4, 5]);
    /// assert!(Sequence::range(5, 1).is_empty());
    /// ```
    pub fn range(start: i64, end: i64) -> Self {
        Self::defer(move || {
            if start > end {
                Sequence::empty()
            } else {
                Sequence::cons(start, Sequence::range(start + 1, end))
            }
        })
    }
}

impl Sequence<bool> {
    /// Whether every element is `true`; short-circuits on the first
    /// `false`.
    pub fn and(&self) -> bool {
        self.all(|value| *value)
    }

    /// Whether any element is `true`; short-circuits on the first `true`.
    pub fn or(&self) -> bool {
        self.any(|value| *value)
    }
}

impl<T: Clone + 'static> Sequence<Sequence<T>> {
    /// Concatenates a sequence of sequences, lazily.
    ///
    /// Empty inner sequences are skipped iteratively.
    pub fn flatten(&self) -> Sequence<T> {
        let source = self.clone();
        Sequence::defer(move || {
            let mut current = source.clone();
            loop {
                match current.uncons_lazy() {
                    None => return Sequence::empty(),
                    Some((head, tail)) => {
                        let inner: Sequence<T> = head.force();
                        match inner.uncons_lazy() {
                            Some((first, rest)) => {
                                return Sequence::cons_deferred(first, rest.append(&tail.flatten()));
                            }
                            None => current = tail,
                        }
                    }
                }
            }
        })
    }
}

impl<A: Clone + 'static, B: Clone + 'static> Sequence<Pair<A, B>> {
    /// Splits a sequence of pairs into a pair of sequences.
    pub fn unzip(&self) -> Pair<Sequence<A>, Sequence<B>> {
        Pair::of(self.map(|pair| pair.first()), self.map(|pair| pair.second()))
    }
}

impl<T: Clone + 'static> Maybe<T> {
    /// The sequence holding this value, or the empty sequence.
    ///
    /// A present payload stays suspended inside the node.
    pub fn to_sequence(self) -> Sequence<T> {
        self.cases_lazy(
            |payload| {
                Sequence::cons_deferred(
                    Thunk::pending(move || payload.force_cloned()),
                    Sequence::empty(),
                )
            },
            Sequence::empty,
        )
    }
}

// =============================================================================
// Comparisons and Formatting
// =============================================================================

/// Trampolined element-wise equality walk.
fn eq_step<T>(left: Sequence<T>, right: Sequence<T>) -> Trampoline<bool>
where
    T: Clone + PartialEq + 'static,
{
    match (left.uncons_lazy(), right.uncons_lazy()) {
        (None, None) => Trampoline::done(true),
        (Some((left_head, left_tail)), Some((right_head, right_tail))) => {
            if left_head.force() == right_head.force() {
                Trampoline::call2(eq_step, left_tail, right_tail)
            } else {
                Trampoline::done(false)
            }
        }
        _ => Trampoline::done(false),
    }
}

/// Trampolined lexicographic comparison walk.
fn cmp_step<T>(left: Sequence<T>, right: Sequence<T>) -> Trampoline<Ordering>
where
    T: Clone + Ord + 'static,
{
    match (left.uncons_lazy(), right.uncons_lazy()) {
        (None, None) => Trampoline::done(Ordering::Equal),
        (None, Some(_)) => Trampoline::done(Ordering::Less),
        (Some(_), None) => Trampoline::done(Ordering::Greater),
        (Some((left_head, left_tail)), Some((right_head, right_tail))) => {
            match left_head.force().cmp(&right_head.force()) {
                Ordering::Equal => Trampoline::call2(cmp_step, left_tail, right_tail),
                decided => Trampoline::done(decided),
            }
        }
    }
}

/// Trampolined partial lexicographic comparison walk.
fn partial_cmp_step<T>(left: Sequence<T>, right: Sequence<T>) -> Trampoline<Option<Ordering>>
where
    T: Clone + PartialOrd + 'static,
{
    match (left.uncons_lazy(), right.uncons_lazy()) {
        (None, None) => Trampoline::done(Some(Ordering::Equal)),
        (None, Some(_)) => Trampoline::done(Some(Ordering::Less)),
        (Some(_), None) => Trampoline::done(Some(Ordering::Greater)),
        (Some((left_head, left_tail)), Some((right_head, right_tail))) => {
            match left_head.force().partial_cmp(&right_head.force()) {
                Some(Ordering::Equal) => Trampoline::call2(partial_cmp_step, left_tail, right_tail),
                decided => Trampoline::done(decided),
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> PartialEq for Sequence<T> {
    /// Structural, element-wise equality.
    ///
    /// Stops at the first mismatch or the first exhausted operand, so it
    /// forces no more than it must; runs on the trampoline substrate.
    fn eq(&self, other: &Self) -> bool {
        eq_step(self.clone(), other.clone()).run()
    }
}

impl<T: Clone + Eq + 'static> Eq for Sequence<T> {}

impl<T: Clone + PartialOrd + 'static> PartialOrd for Sequence<T> {
    /// Lexicographic comparison; a proper prefix orders first.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        partial_cmp_step(self.clone(), other.clone()).run()
    }
}

impl<T: Clone + Ord + 'static> Ord for Sequence<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_step(self.clone(), other.clone()).run()
    }
}

impl<T: Clone + Hash + 'static> Hash for Sequence<T> {
    /// Element-wise hash; forces the whole sequence. Finite inputs only.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut length = 0usize;
        let mut current = self.clone();
        while let Some((head, tail)) = current.uncons() {
            head.hash(state);
            length += 1;
            current = tail;
        }
        length.hash(state);
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Sequence<T> {
    /// Shows only the already-evaluated prefix; never forces anything.
    ///
    /// Unevaluated heads print as `_`, an unevaluated spine as `..`.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("sequence![")?;
        let mut current = self.clone();
        let mut written = false;
        loop {
            let Some(node) = current.cell().peek() else {
                if written {
                    formatter.write_str(", ")?;
                }
                formatter.write_str("..")?;
                break;
            };
            match node {
                Node::Empty => break,
                Node::Cons(head, tail) => {
                    if written {
                        formatter.write_str(", ")?;
                    }
                    match head.peek() {
                        Some(value) => write!(formatter, "{value:?}")?,
                        None => formatter.write_str("_")?,
                    }
                    written = true;
                    current = tail;
                }
            }
        }
        formatter.write_str("]")
    }
}

/// Builds a [`Sequence`] from its elements, eagerly.
///
/// # Examples
///
/// ```rust
/// use lazyseq::sequence;
///
/// let sequence = sequence![1, 2, 3];
/// assert_eq!(sequence.to_vec(), vec![1, 2, 3]);
/// ```
#[macro_export]
macro_rules! sequence {
    () => {
        $crate::sequence::Sequence::empty()
    };
    ($($element:expr),+ $(,)?) => {
        $crate::sequence::Sequence::from_vec(vec![$($element),+])
    };
}
