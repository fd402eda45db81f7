//! Optional values with deferred payloads.
//!
//! [`Maybe<T>`] models presence or absence of a single value. Unlike
//! [`Option`], a present value may still be a suspended computation: the
//! payload lives in a [`Deferred`] and is only forced when a handler or
//! accessor asks for it.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::adt::Maybe;
//!
//! let answer = Maybe::defer(|| 21 * 2);
//! assert!(answer.is_just());
//! assert_eq!(answer.get_or_else(0), 42);
//!
//! let missing: Maybe<i32> = Maybe::nothing();
//! assert_eq!(missing.get_or_else(0), 0);
//! ```

use std::fmt;

use crate::control::Deferred;

/// The two variants of [`Maybe`].
enum MaybeRepr<T> {
    /// No value.
    Nothing,
    /// A (possibly suspended) value.
    Just(Deferred<T>),
}

/// An optional value whose payload stays deferred until requested.
///
/// `Maybe<T>` is semantically a sequence of at most one element; the
/// variant is fixed at construction, but a `Just` payload is only
/// computed when something forces it. Clones share the payload cache.
///
/// # Examples
///
/// ```rust
/// use lazyseq::adt::Maybe;
///
/// let present = Maybe::just(1).map(|n| n + 1);
/// assert_eq!(present.into_option(), Some(2));
/// ```
pub struct Maybe<T> {
    repr: MaybeRepr<T>,
}

impl<T> Maybe<T> {
    /// Creates an absent value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// let missing: Maybe<i32> = Maybe::nothing();
    /// assert!(missing.is_nothing());
    /// ```
    #[inline]
    pub const fn nothing() -> Self {
        Self {
            repr: MaybeRepr::Nothing,
        }
    }

    /// Creates a present value from an already-computed payload.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// assert!(Maybe::just(42).is_just());
    /// ```
    #[inline]
    pub fn just(value: T) -> Self {
        Self {
            repr: MaybeRepr::Just(Deferred::ready(value)),
        }
    }

    /// Creates a present value from an existing deferred payload.
    ///
    /// The payload's cache is shared, not copied.
    #[inline]
    pub fn just_deferred(value: Deferred<T>) -> Self {
        Self {
            repr: MaybeRepr::Just(value),
        }
    }

    /// Converts from the standard library's [`Option`].
    #[inline]
    pub fn from_option(option: Option<T>) -> Self {
        match option {
            Some(value) => Self::just(value),
            None => Self::nothing(),
        }
    }

    /// Returns `true` if a value is present.
    #[inline]
    pub const fn is_just(&self) -> bool {
        matches!(self.repr, MaybeRepr::Just(_))
    }

    /// Returns `true` if no value is present.
    #[inline]
    pub const fn is_nothing(&self) -> bool {
        matches!(self.repr, MaybeRepr::Nothing)
    }

    /// One-step dispatch with the payload kept lazy.
    ///
    /// Exactly one handler runs: `on_just` receives the still-deferred
    /// payload and decides whether to force it; `on_nothing` receives
    /// nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// let description = Maybe::defer(|| 42).cases_lazy(
    ///     |payload| format!("present: {}", payload.force_cloned()),
    ///     || "absent".to_string(),
    /// );
    /// assert_eq!(description, "present: 42");
    /// ```
    pub fn cases_lazy<R>(
        self,
        on_just: impl FnOnce(Deferred<T>) -> R,
        on_nothing: impl FnOnce() -> R,
    ) -> R {
        match self.repr {
            MaybeRepr::Just(payload) => on_just(payload),
            MaybeRepr::Nothing => on_nothing(),
        }
    }
}

impl<T: 'static> Maybe<T> {
    /// Creates a present value whose payload is computed on first use.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// let deferred = Maybe::defer(|| "expensive".len());
    /// assert_eq!(deferred.get_or_else(0), 9);
    /// ```
    #[inline]
    pub fn defer<F>(computation: F) -> Self
    where
        F: FnOnce() -> T + 'static,
    {
        Self::just_deferred(Deferred::new(computation))
    }

    /// Runs a fallible computation, discarding the error.
    ///
    /// The boundary conversion for "call and either get a value or an
    /// error" collaborators when the error carries no information worth
    /// keeping; see [`Either::catching`](crate::adt::Either::catching)
    /// for the error-retaining form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// let parsed = Maybe::from_fallible(|| "42".parse::<i32>());
    /// assert_eq!(parsed.into_option(), Some(42));
    ///
    /// let failed = Maybe::from_fallible(|| "nope".parse::<i32>());
    /// assert!(failed.is_nothing());
    /// ```
    pub fn from_fallible<F, E>(computation: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
    {
        match computation() {
            Ok(value) => Self::just(value),
            Err(_) => Self::nothing(),
        }
    }
}

impl<T: Clone + 'static> Maybe<T> {
    /// One-step dispatch with the payload forced first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// let doubled = Maybe::just(21).cases(|n| n * 2, || 0);
    /// assert_eq!(doubled, 42);
    /// ```
    pub fn cases<R>(self, on_just: impl FnOnce(T) -> R, on_nothing: impl FnOnce() -> R) -> R {
        match self.repr {
            MaybeRepr::Just(payload) => on_just(payload.force_cloned()),
            MaybeRepr::Nothing => on_nothing(),
        }
    }

    /// Applies a function to the payload, lazily.
    ///
    /// The function does not run until something forces the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// let mapped = Maybe::just(21).map(|n| n * 2);
    /// assert_eq!(mapped.into_option(), Some(42));
    /// ```
    pub fn map<U, F>(self, function: F) -> Maybe<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        match self.repr {
            MaybeRepr::Just(payload) => Maybe::just_deferred(payload.map(function)),
            MaybeRepr::Nothing => Maybe::nothing(),
        }
    }

    /// Applies a function returning a `Maybe`, then flattens.
    ///
    /// The variant of the result depends on the function's output, so
    /// the payload is forced here; only the *payload of the result* stays
    /// lazy.
    pub fn flat_map<U, F>(self, function: F) -> Maybe<U>
    where
        F: FnOnce(T) -> Maybe<U>,
    {
        match self.repr {
            MaybeRepr::Just(payload) => function(payload.force_cloned()),
            MaybeRepr::Nothing => Maybe::nothing(),
        }
    }

    /// Keeps the value only if it satisfies the predicate.
    ///
    /// Forces the payload.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        match self.repr {
            MaybeRepr::Just(payload) => {
                let value = payload.force_cloned();
                if predicate(&value) {
                    Self::just(value)
                } else {
                    Self::nothing()
                }
            }
            MaybeRepr::Nothing => Self::nothing(),
        }
    }

    /// Returns the value, or the given default when absent.
    #[inline]
    pub fn get_or_else(self, default: T) -> T {
        self.cases(|value| value, || default)
    }

    /// Returns the value, or computes a default when absent.
    ///
    /// The default is only computed on the absent path.
    #[inline]
    pub fn get_or_else_with<F>(self, default: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.cases(|value| value, default)
    }

    /// Returns this value when present, otherwise the alternative.
    ///
    /// The alternative is only built on the absent path.
    pub fn or_else<F>(self, alternative: F) -> Self
    where
        F: FnOnce() -> Self,
    {
        if self.is_just() { self } else { alternative() }
    }

    /// Returns the value, panicking when absent.
    ///
    /// Forcing an absent `Maybe` is a programmer-contract violation, not
    /// a recoverable error; prefer [`ok_or_else`](Maybe::ok_or_else) when
    /// absence is an expected outcome.
    ///
    /// # Panics
    ///
    /// Panics if the value is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// assert_eq!(Maybe::just(42).unwrap(), 42);
    /// ```
    #[inline]
    pub fn unwrap(self) -> T {
        self.expect("called `Maybe::unwrap()` on a `Nothing` value")
    }

    /// Returns the value, panicking with the message when absent.
    ///
    /// # Panics
    ///
    /// Panics with `message` if the value is absent.
    #[inline]
    pub fn expect(self, message: &str) -> T {
        self.cases(|value| value, || panic!("{message}"))
    }

    /// Converts to a [`Result`], building the error lazily.
    ///
    /// The error factory runs only on the absent path, and once per call:
    /// each invocation may construct a fresh error value.
    ///
    /// # Errors
    ///
    /// Returns the constructed error when the value is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::adt::Maybe;
    ///
    /// let missing: Maybe<i32> = Maybe::nothing();
    /// assert_eq!(missing.ok_or_else(|| "absent"), Err("absent"));
    /// ```
    #[inline]
    pub fn ok_or_else<E, F>(self, error: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        self.cases(Ok, || Err(error()))
    }

    /// Converts to the standard library's [`Option`], forcing the payload.
    #[inline]
    pub fn into_option(self) -> Option<T> {
        self.cases(Some, || None)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Clone for Maybe<T> {
    /// Clones the handle; a present payload's cache is shared.
    fn clone(&self) -> Self {
        match &self.repr {
            MaybeRepr::Just(payload) => Self {
                repr: MaybeRepr::Just(payload.clone()),
            },
            MaybeRepr::Nothing => Self::nothing(),
        }
    }
}

impl<T> Default for Maybe<T> {
    /// The absent value.
    fn default() -> Self {
        Self::nothing()
    }
}

impl<T: Clone + PartialEq + 'static> PartialEq for Maybe<T> {
    /// Structural equality; forces both payloads when both are present.
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (MaybeRepr::Nothing, MaybeRepr::Nothing) => true,
            (MaybeRepr::Just(left), MaybeRepr::Just(right)) => {
                left.force_cloned() == right.force_cloned()
            }
            _ => false,
        }
    }
}

impl<T: Clone + Eq + 'static> Eq for Maybe<T> {}

impl<T: fmt::Debug> fmt::Debug for Maybe<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            MaybeRepr::Nothing => formatter.write_str("Nothing"),
            MaybeRepr::Just(payload) => match payload.get() {
                Some(value) => formatter.debug_tuple("Just").field(&*value).finish(),
                None => formatter.debug_tuple("Just").field(&"<deferred>").finish(),
            },
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(option: Option<T>) -> Self {
        Self::from_option(option)
    }
}

impl<T: Clone + 'static> From<Maybe<T>> for Option<T> {
    fn from(maybe: Maybe<T>) -> Self {
        maybe.into_option()
    }
}
