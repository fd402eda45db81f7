//! Stack-safe recursion via trampolining.
//!
//! This module provides [`Trampoline<A>`], which represents a recursive
//! computation as data: either a finished value or one more suspended
//! step. An iterative driver loop ([`Trampoline::run`]) unwinds the steps,
//! so the native stack depth stays bounded no matter how many steps the
//! recursion takes.
//!
//! # Motivation
//!
//! Rust does not guarantee tail call elimination, so deeply recursive
//! functions can overflow the stack. Encoding each recursive call as a
//! [`More`](Trampoline::More) step turns the recursion into iteration.
//! Compositions built with [`map`](Trampoline::map) and
//! [`flat_map`](Trampoline::flat_map) are kept on an explicit continuation
//! stack inside the driver, so even a hundred thousand pending
//! continuations (the shape a non-tail-recursive fold produces) never
//! touch the native stack.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::control::Trampoline;
//!
//! fn triangular(n: u64, accumulator: u64) -> Trampoline<u64> {
//!     if n == 0 {
//!         Trampoline::done(accumulator)
//!     } else {
//!         Trampoline::call2(triangular, n - 1, accumulator + n)
//!     }
//! }
//!
//! assert_eq!(triangular(100_000, 0).run(), 5_000_050_000);
//! ```

use std::any::Any;
use std::ops::ControlFlow;

/// A value with its compile-time type erased.
type Erased = Box<dyn Any>;

/// One suspended continuation: consumes the erased result of the previous
/// stage and yields the next computation.
type Continuation = Box<dyn FnOnce(Erased) -> Trampoline<Erased>>;

/// A suspended `flat_map` composition.
///
/// The source computation together with the continuations to apply to its
/// result, in application order. The driver splices the continuations
/// onto its own stack instead of recursing, so left-nested compositions
/// of any depth evaluate iteratively.
#[doc(hidden)]
pub struct BindChain {
    source: Box<Trampoline<Erased>>,
    continuations: Vec<Continuation>,
}

/// Erases the result type of a trampoline.
///
/// Cheap on every variant: a `More` step defers the erasure of its result
/// into the thunk.
fn erase<A: 'static>(trampoline: Trampoline<A>) -> Trampoline<Erased> {
    match trampoline {
        Trampoline::Done(value) => Trampoline::Done(Box::new(value)),
        Trampoline::More(step) => Trampoline::More(Box::new(move || erase(step()))),
        Trampoline::Bind(chain) => Trampoline::Bind(chain),
    }
}

/// Restores the result type of an erased trampoline.
fn reify<A: 'static>(erased: Trampoline<Erased>) -> Trampoline<A> {
    match erased {
        Trampoline::Done(value) => Trampoline::Done(
            *value
                .downcast::<A>()
                .expect("trampoline produced its declared result type"),
        ),
        Trampoline::More(step) => Trampoline::More(Box::new(move || reify(step()))),
        Trampoline::Bind(chain) => Trampoline::Bind(chain),
    }
}

/// A recursive computation represented as data.
///
/// A `Trampoline<A>` is either [`Done`](Trampoline::Done) with the final
/// value, or [`More`](Trampoline::More) with a suspended step that yields
/// the next state. [`run`](Trampoline::run) drives the states in a plain
/// loop, giving stack-safe recursion of unbounded depth.
///
/// # Laws
///
/// `Trampoline` satisfies the monad laws (verified by property tests):
///
/// - **Left identity**: `Trampoline::done(a).flat_map(f).run() == f(a).run()`
/// - **Right identity**: `m.flat_map(Trampoline::done).run() == m.run()`
/// - **Associativity**: `m.flat_map(f).flat_map(g).run()
///   == m.flat_map(|x| f(x).flat_map(g)).run()`
///
/// # Examples
///
/// ```rust
/// use lazyseq::control::Trampoline;
///
/// let result = Trampoline::more(|| Trampoline::done(21))
///     .map(|x| x * 2)
///     .run();
/// assert_eq!(result, 42);
/// ```
pub enum Trampoline<A> {
    /// The computation has finished with a value.
    Done(A),
    /// The computation is suspended; invoking the step yields the next
    /// state.
    More(Box<dyn FnOnce() -> Trampoline<A>>),
    /// Internal composition state produced by `flat_map`.
    #[doc(hidden)]
    Bind(BindChain),
}

impl<A> Trampoline<A> {
    /// Creates a finished trampoline holding the given value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// assert_eq!(Trampoline::done(42).run(), 42);
    /// ```
    #[inline]
    pub fn done(value: A) -> Self {
        Self::Done(value)
    }

    /// Creates a suspended trampoline from a zero-argument step.
    ///
    /// The step is not invoked until the trampoline is driven.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// let trampoline = Trampoline::more(|| Trampoline::done(42));
    /// assert_eq!(trampoline.run(), 42);
    /// ```
    #[inline]
    pub fn more<F>(step: F) -> Self
    where
        F: FnOnce() -> Trampoline<A> + 'static,
    {
        Self::More(Box::new(step))
    }

    /// Suspends one recursive call by partial application.
    ///
    /// Equivalent to `Trampoline::more(move || function(argument))`, but
    /// saves the caller from wrapping a closure by hand.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// fn count_down(n: u64) -> Trampoline<u64> {
    ///     if n == 0 {
    ///         Trampoline::done(0)
    ///     } else {
    ///         Trampoline::call(count_down, n - 1)
    ///     }
    /// }
    ///
    /// assert_eq!(count_down(100_000).run(), 0);
    /// ```
    #[inline]
    pub fn call<Arg, F>(function: F, argument: Arg) -> Self
    where
        Arg: 'static,
        F: FnOnce(Arg) -> Trampoline<A> + 'static,
    {
        Self::more(move || function(argument))
    }

    /// Suspends one recursive call to a two-argument function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// fn greatest_common_divisor(a: u64, b: u64) -> Trampoline<u64> {
    ///     if b == 0 {
    ///         Trampoline::done(a)
    ///     } else {
    ///         Trampoline::call2(greatest_common_divisor, b, a % b)
    ///     }
    /// }
    ///
    /// assert_eq!(greatest_common_divisor(48, 36).run(), 12);
    /// ```
    #[inline]
    pub fn call2<Arg1, Arg2, F>(function: F, first: Arg1, second: Arg2) -> Self
    where
        Arg1: 'static,
        Arg2: 'static,
        F: FnOnce(Arg1, Arg2) -> Trampoline<A> + 'static,
    {
        Self::more(move || function(first, second))
    }
}

impl<A: 'static> Trampoline<A> {
    /// Drives the trampoline to completion and returns the final value.
    ///
    /// States are unwound in a plain loop and pending continuations live
    /// on an explicit stack, so the native stack depth is independent of
    /// both the number of steps and the depth of `flat_map` nesting. A
    /// step that panics propagates the panic immediately.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// fn count_down(n: u64) -> Trampoline<u64> {
    ///     if n == 0 {
    ///         Trampoline::done(0)
    ///     } else {
    ///         Trampoline::call(count_down, n - 1)
    ///     }
    /// }
    ///
    /// // This would overflow the stack with native recursion
    /// assert_eq!(count_down(500_000).run(), 0);
    /// ```
    pub fn run(self) -> A {
        let mut current = erase(self);
        let mut pending: Vec<Continuation> = Vec::new();

        loop {
            match current {
                Trampoline::Done(value) => match pending.pop() {
                    Some(continuation) => current = continuation(value),
                    None => {
                        return *value
                            .downcast::<A>()
                            .expect("trampoline produced its declared result type");
                    }
                },
                Trampoline::More(step) => current = step(),
                Trampoline::Bind(chain) => {
                    current = *chain.source;
                    // LIFO stack: the first continuation to apply goes on top
                    pending.extend(chain.continuations.into_iter().rev());
                }
            }
        }
    }

    /// Takes a single step of the computation.
    ///
    /// Returns [`ControlFlow::Break`] with the final value when the
    /// computation is complete, or [`ControlFlow::Continue`] with the next
    /// suspended step when there is more work.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    /// use std::ops::ControlFlow;
    ///
    /// let trampoline = Trampoline::more(|| Trampoline::done(42));
    /// match trampoline.resume() {
    ///     ControlFlow::Continue(step) => assert_eq!(step().run(), 42),
    ///     ControlFlow::Break(_) => unreachable!(),
    /// }
    /// ```
    pub fn resume(self) -> ControlFlow<A, Box<dyn FnOnce() -> Trampoline<A>>> {
        let mut current = erase(self);
        let mut pending: Vec<Continuation> = Vec::new();

        loop {
            match current {
                Trampoline::Done(value) => match pending.pop() {
                    Some(continuation) => current = continuation(value),
                    None => {
                        return ControlFlow::Break(
                            *value
                                .downcast::<A>()
                                .expect("trampoline produced its declared result type"),
                        );
                    }
                },
                Trampoline::More(step) => {
                    if pending.is_empty() {
                        return ControlFlow::Continue(Box::new(move || reify(step())));
                    }
                    // repackage the rest of the chain behind the step
                    pending.reverse();
                    return ControlFlow::Continue(Box::new(move || {
                        Trampoline::Bind(BindChain {
                            source: Box::new(step()),
                            continuations: pending,
                        })
                    }));
                }
                Trampoline::Bind(chain) => {
                    current = *chain.source;
                    pending.extend(chain.continuations.into_iter().rev());
                }
            }
        }
    }

    /// Applies a function to the final value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// let doubled = Trampoline::done(21).map(|x| x * 2);
    /// assert_eq!(doubled.run(), 42);
    /// ```
    pub fn map<B, F>(self, function: F) -> Trampoline<B>
    where
        B: 'static,
        F: FnOnce(A) -> B + 'static,
    {
        self.flat_map(move |value| Trampoline::done(function(value)))
    }

    /// Applies a function returning a trampoline to the final value.
    ///
    /// The composition is recorded as data; chains of `flat_map` of any
    /// depth stay stack-safe when driven by [`run`](Trampoline::run).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// let result = Trampoline::done(21).flat_map(|x| Trampoline::done(x * 2));
    /// assert_eq!(result.run(), 42);
    /// ```
    pub fn flat_map<B, F>(self, function: F) -> Trampoline<B>
    where
        B: 'static,
        F: FnOnce(A) -> Trampoline<B> + 'static,
    {
        let continuation: Continuation = Box::new(move |value: Erased| {
            let typed = value
                .downcast::<A>()
                .expect("continuation received its declared input type");
            erase(function(*typed))
        });

        match self {
            Self::Bind(mut chain) => {
                chain.continuations.push(continuation);
                Trampoline::Bind(chain)
            }
            other => Trampoline::Bind(BindChain {
                source: Box::new(erase(other)),
                continuations: vec![continuation],
            }),
        }
    }

    /// Alias for [`flat_map`](Trampoline::flat_map).
    #[inline]
    pub fn and_then<B, F>(self, function: F) -> Trampoline<B>
    where
        B: 'static,
        F: FnOnce(A) -> Trampoline<B> + 'static,
    {
        self.flat_map(function)
    }

    /// Sequences two trampolines, discarding the result of the first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::control::Trampoline;
    ///
    /// let result = Trampoline::done("ignored").then(Trampoline::done(42));
    /// assert_eq!(result.run(), 42);
    /// ```
    #[inline]
    pub fn then<B: 'static>(self, next: Trampoline<B>) -> Trampoline<B> {
        self.flat_map(move |_| next)
    }
}

// =============================================================================
// Debug Implementation
// =============================================================================

impl<A: std::fmt::Debug> std::fmt::Debug for Trampoline<A> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Done(value) => formatter.debug_tuple("Done").field(value).finish(),
            Self::More(_) => formatter.debug_tuple("More").field(&"<step>").finish(),
            Self::Bind(chain) => formatter
                .debug_tuple("Bind")
                .field(&format_args!("<{} continuations>", chain.continuations.len()))
                .finish(),
        }
    }
}
