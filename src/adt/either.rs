//! A tagged union of two values with deferred payloads.
//!
//! [`Either<L, R>`] holds exactly one value, on either its `Left` or its
//! `Right` arm. By convention `Left` carries failures and `Right` carries
//! successes. The payload is a [`Deferred`], so the value on the active
//! arm may still be a suspended computation.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::adt::Either;
//!
//! let success: Either<String, i32> = Either::right(42);
//! let doubled = success.map_right(|n| n * 2);
//! assert_eq!(doubled.into_result(), Ok(84));
//!
//! let failure: Either<String, i32> = Either::left("boom".to_string());
//! assert_eq!(failure.into_result(), Err("boom".to_string()));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::control::Deferred;

use super::maybe::Maybe;

/// The two arms of [`Either`].
enum EitherRepr<L, R> {
    /// The left arm, conventionally a failure.
    Left(Deferred<L>),
    /// The right arm, conventionally a success.
    Right(Deferred<R>),
}

/// Exactly one value, tagged with the arm it sits on.
///
/// The arm is fixed at construction; the payload stays deferred until a
/// handler or accessor forces it. Clones share the payload cache.
///
/// # Examples
///
/// ```rust
/// use lazyseq::adt::Either;
///
/// let value: Either<String, i32> = Either::right_defer(|| 21 * 2);
/// assert!(value.is_right());
/// assert_eq!(value.into_result(), Ok(42));
/// ```
pub struct Either<L, R> {
    repr: EitherRepr<L, R>,
}

impl<L, R> Either<L, R> {
    /// Creates a left value from an already-computed payload.
    #[inline]
    pub fn left(value: L) -> Self {
        Self {
            repr: EitherRepr::Left(Deferred::ready(value)),
        }
    }

    /// Creates a right value from an already-computed payload.
    #[inline]
    pub fn right(value: R) -> Self {
        Self {
            repr: EitherRepr::Right(Deferred::ready(value)),
        }
    }

    /// Creates a left value from an existing deferred payload.
    #[inline]
    pub fn left_deferred(value: Deferred<L>) -> Self {
        Self {
            repr: EitherRepr::Left(value),
        }
    }

    /// Creates a right value from an existing deferred payload.
    #[inline]
    pub fn right_deferred(value: Deferred<R>) -> Self {
        Self {
            repr: EitherRepr::Right(value),
        }
    }

    /// Converts from a [`Result`], mapping `Ok` to `Right`.
    #[inline]
    pub fn from_result(result: Result<R, L>) -> Self {
        match result {
            Ok(value) => Self::right(value),
            Err(error) => Self::left(error),
        }
    }

    /// Returns `true` if this is a left value.
    #[inline]
    pub const fn is_left(&self) -> bool {
        matches!(self.repr, EitherRepr::Left(_))
    }

    /// Returns `true` if this is a right value.
    #[inline]
    pub const fn is_right(&self) -> bool {
        matches!(self.repr, EitherRepr::Right(_))
    }

    /// One-step dispatch with the payload kept lazy.
    ///
    /// Exactly one handler runs, receiving the still-deferred payload of
    /// the active arm.
    pub fn cases_lazy<T>(
        self,
        on_left: impl FnOnce(Deferred<L>) -> T,
        on_right: impl FnOnce(Deferred<R>) -> T,
    ) -> T {
        match self.repr {
            EitherRepr::Left(payload) => on_left(payload),
            EitherRepr::Right(payload) => on_right(payload),
        }
    }

    /// Extracts the left payload as a [`Maybe`], keeping it lazy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Either;
    ///
    /// let failure: Either<&str, i32> = Either::left("boom");
    /// assert_eq!(failure.left_maybe().into_option(), Some("boom"));
    /// ```
    pub fn left_maybe(self) -> Maybe<L> {
        match self.repr {
            EitherRepr::Left(payload) => Maybe::just_deferred(payload),
            EitherRepr::Right(_) => Maybe::nothing(),
        }
    }

    /// Extracts the right payload as a [`Maybe`], keeping it lazy.
    pub fn right_maybe(self) -> Maybe<R> {
        match self.repr {
            EitherRepr::Right(payload) => Maybe::just_deferred(payload),
            EitherRepr::Left(_) => Maybe::nothing(),
        }
    }

    /// Swaps the arms.
    #[inline]
    pub fn swap(self) -> Either<R, L> {
        match self.repr {
            EitherRepr::Left(payload) => Either::right_deferred(payload),
            EitherRepr::Right(payload) => Either::left_deferred(payload),
        }
    }
}

impl<L: 'static, R: 'static> Either<L, R> {
    /// Creates a left value whose payload is computed on first use.
    #[inline]
    pub fn left_defer<F>(computation: F) -> Self
    where
        F: FnOnce() -> L + 'static,
    {
        Self::left_deferred(Deferred::new(computation))
    }

    /// Creates a right value whose payload is computed on first use.
    #[inline]
    pub fn right_defer<F>(computation: F) -> Self
    where
        F: FnOnce() -> R + 'static,
    {
        Self::right_deferred(Deferred::new(computation))
    }
}

impl<E: 'static, R: 'static> Either<Rc<E>, R> {
    /// Runs a fallible computation, keeping the error on the left arm.
    ///
    /// The error is pinned behind an [`Rc`] so that replays of a cached
    /// failure keep their identity; the success value lands on the right
    /// arm untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Either;
    ///
    /// let parsed = Either::catching(|| "42".parse::<i32>());
    /// assert_eq!(parsed.into_result(), Ok(42));
    ///
    /// let failed = Either::catching(|| "nope".parse::<i32>());
    /// assert!(failed.is_left());
    /// ```
    pub fn catching<F>(computation: F) -> Self
    where
        F: FnOnce() -> Result<R, E>,
    {
        match computation() {
            Ok(value) => Self::right(value),
            Err(error) => Self::left(Rc::new(error)),
        }
    }
}

impl<L: Clone + 'static, R: Clone + 'static> Either<L, R> {
    /// One-step dispatch with the payload forced first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Either;
    ///
    /// let failure: Either<&str, i32> = Either::left("foo");
    /// let seen = failure.cases(|error| error.to_string(), |n| n.to_string());
    /// assert_eq!(seen, "foo");
    /// ```
    pub fn cases<T>(self, on_left: impl FnOnce(L) -> T, on_right: impl FnOnce(R) -> T) -> T {
        match self.repr {
            EitherRepr::Left(payload) => on_left(payload.force_cloned()),
            EitherRepr::Right(payload) => on_right(payload.force_cloned()),
        }
    }

    /// Applies a function to the left payload, lazily.
    pub fn map_left<T, F>(self, function: F) -> Either<T, R>
    where
        T: 'static,
        F: FnOnce(L) -> T + 'static,
    {
        match self.repr {
            EitherRepr::Left(payload) => Either::left_deferred(payload.map(function)),
            EitherRepr::Right(payload) => Either::right_deferred(payload),
        }
    }

    /// Applies a function to the right payload, lazily.
    pub fn map_right<T, F>(self, function: F) -> Either<L, T>
    where
        T: 'static,
        F: FnOnce(R) -> T + 'static,
    {
        match self.repr {
            EitherRepr::Left(payload) => Either::left_deferred(payload),
            EitherRepr::Right(payload) => Either::right_deferred(payload.map(function)),
        }
    }

    /// Applies one of two functions to the payload, lazily.
    pub fn bimap<T, U, F, G>(self, left_function: F, right_function: G) -> Either<T, U>
    where
        T: 'static,
        U: 'static,
        F: FnOnce(L) -> T + 'static,
        G: FnOnce(R) -> U + 'static,
    {
        match self.repr {
            EitherRepr::Left(payload) => Either::left_deferred(payload.map(left_function)),
            EitherRepr::Right(payload) => Either::right_deferred(payload.map(right_function)),
        }
    }

    /// Applies a function returning an `Either` to the right payload.
    ///
    /// Right-biased bind. The variant of the result depends on the
    /// function's output, so the right payload is forced here.
    pub fn flat_map<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> Either<L, T>,
    {
        match self.repr {
            EitherRepr::Left(payload) => Either::left_deferred(payload),
            EitherRepr::Right(payload) => function(payload.force_cloned()),
        }
    }

    /// Returns the left payload, consuming the value.
    ///
    /// Reaching for the wrong arm is a programmer-contract violation.
    ///
    /// # Panics
    ///
    /// Panics if this is a right value.
    #[inline]
    pub fn unwrap_left(self) -> L {
        self.cases(
            |value| value,
            |_| panic!("called `Either::unwrap_left()` on a `Right` value"),
        )
    }

    /// Returns the right payload, consuming the value.
    ///
    /// # Panics
    ///
    /// Panics if this is a left value.
    #[inline]
    pub fn unwrap_right(self) -> R {
        self.cases(
            |_| panic!("called `Either::unwrap_right()` on a `Left` value"),
            |value| value,
        )
    }

    /// Converts to a [`Result`], forcing the active payload.
    ///
    /// # Errors
    ///
    /// Returns the left payload as the error.
    #[inline]
    pub fn into_result(self) -> Result<R, L> {
        self.cases(Err, Ok)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<L, R> Clone for Either<L, R> {
    /// Clones the handle; the payload cache is shared.
    fn clone(&self) -> Self {
        match &self.repr {
            EitherRepr::Left(payload) => Self {
                repr: EitherRepr::Left(payload.clone()),
            },
            EitherRepr::Right(payload) => Self {
                repr: EitherRepr::Right(payload.clone()),
            },
        }
    }
}

impl<L, R> PartialEq for Either<L, R>
where
    L: Clone + PartialEq + 'static,
    R: Clone + PartialEq + 'static,
{
    /// Structural equality; forces payloads when the arms agree.
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (EitherRepr::Left(left), EitherRepr::Left(right)) => {
                left.force_cloned() == right.force_cloned()
            }
            (EitherRepr::Right(left), EitherRepr::Right(right)) => {
                left.force_cloned() == right.force_cloned()
            }
            _ => false,
        }
    }
}

impl<L, R> Eq for Either<L, R>
where
    L: Clone + Eq + 'static,
    R: Clone + Eq + 'static,
{
}

impl<L: fmt::Debug, R: fmt::Debug> fmt::Debug for Either<L, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            EitherRepr::Left(payload) => match payload.get() {
                Some(value) => formatter.debug_tuple("Left").field(&*value).finish(),
                None => formatter.debug_tuple("Left").field(&"<deferred>").finish(),
            },
            EitherRepr::Right(payload) => match payload.get() {
                Some(value) => formatter.debug_tuple("Right").field(&*value).finish(),
                None => formatter.debug_tuple("Right").field(&"<deferred>").finish(),
            },
        }
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        Self::from_result(result)
    }
}

impl<L: Clone + 'static, R: Clone + 'static> From<Either<L, R>> for Result<R, L> {
    fn from(either: Either<L, R>) -> Self {
        either.into_result()
    }
}
