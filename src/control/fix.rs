//! Fixed-point combinators for anonymous recursion.
//!
//! A fixed-point combinator turns a *transformer*, a function that
//! receives "the recursive function so far" and returns "the next version
//! of it", into a concrete recursive function, without that function ever
//! being bound to a name.
//!
//! The knot is tied through a set-once slot: the transformer is handed a
//! proxy that looks the finished function up in the slot *at invocation
//! time*. Calling the proxy while the transformer is still constructing
//! the function panics with a descriptive message; the self-reference is
//! only meant to be used from inside the produced closure's body.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::control::fix;
//! use std::rc::Rc;
//!
//! let factorial = fix(|this| {
//!     Rc::new(move |n: u64| if n == 0 { 1 } else { n * this(n - 1) })
//! });
//! assert_eq!(factorial(6), 720);
//! ```
//!
//! For recursion depths that would overflow the native stack, use the
//! trampolined variants and drive them with [`recurse`]:
//!
//! ```rust
//! use lazyseq::control::{recurse, Trampoline};
//! use std::rc::Rc;
//!
//! let total = recurse(
//!     |this| {
//!         Rc::new(move |n: u64| {
//!             if n == 0 {
//!                 Trampoline::done(0u64)
//!             } else {
//!                 let this = Rc::clone(&this);
//!                 Trampoline::call(move |m| this(m), n - 1).map(move |rest| rest + n)
//!             }
//!         })
//!     },
//!     100_000u64,
//! );
//! assert_eq!(total, 5_000_050_000);
//! ```

use std::cell::OnceCell;
use std::rc::Rc;

use super::trampoline::Trampoline;

/// A shareable recursive function of one argument.
pub type RecFn<A, B> = Rc<dyn Fn(A) -> B>;

/// A shareable recursive function of two arguments.
pub type RecFn2<A, B, C> = Rc<dyn Fn(A, B) -> C>;

/// A shareable trampolined recursive function of one argument.
pub type RecTramp<A, B> = Rc<dyn Fn(A) -> Trampoline<B>>;

/// A shareable trampolined recursive function of two arguments.
pub type RecTramp2<A, B, C> = Rc<dyn Fn(A, B) -> Trampoline<C>>;

/// Ties the recursive knot for a transformer over a shared slot.
///
/// Factored out so every combinator variant shares the same construction:
/// build the proxy, run the transformer once, publish the result.
fn tie<F, Function>(transformer: F, proxy_of: impl FnOnce(Rc<OnceCell<Function>>) -> Function) -> Function
where
    F: FnOnce(Function) -> Function,
    Function: Clone,
{
    let slot = Rc::new(OnceCell::new());
    let proxy = proxy_of(Rc::clone(&slot));
    let function = transformer(proxy);
    let _ = slot.set(function.clone());
    function
}

/// Produces a recursive function from its one-step transformer.
///
/// The transformer receives a handle standing in for the function being
/// defined; calls through the handle dispatch to the finished function.
///
/// # Panics
///
/// The handle panics if invoked before the transformer has returned, i.e.
/// when the transformer calls it synchronously during construction rather
/// than from inside the closure body it builds.
///
/// # Examples
///
/// ```rust
/// use lazyseq::control::fix;
/// use std::rc::Rc;
///
/// let factorial = fix(|this| {
///     Rc::new(move |n: u64| if n == 0 { 1 } else { n * this(n - 1) })
/// });
/// assert_eq!(factorial(0), 1);
/// assert_eq!(factorial(6), 720);
/// ```
pub fn fix<A, B, F>(transformer: F) -> RecFn<A, B>
where
    A: 'static,
    B: 'static,
    F: FnOnce(RecFn<A, B>) -> RecFn<A, B>,
{
    tie(transformer, |slot| {
        Rc::new(move |argument| {
            let tied = slot
                .get()
                .expect("recursive function invoked before its definition was tied");
            tied(argument)
        }) as RecFn<A, B>
    })
}

/// Two-argument form of [`fix`].
///
/// # Examples
///
/// ```rust
/// use lazyseq::control::fix2;
/// use std::rc::Rc;
///
/// let power = fix2(|this| {
///     Rc::new(move |base: u64, exponent: u32| {
///         if exponent == 0 { 1 } else { base * this(base, exponent - 1) }
///     })
/// });
/// assert_eq!(power(2, 10), 1024);
/// ```
pub fn fix2<A, B, C, F>(transformer: F) -> RecFn2<A, B, C>
where
    A: 'static,
    B: 'static,
    C: 'static,
    F: FnOnce(RecFn2<A, B, C>) -> RecFn2<A, B, C>,
{
    tie(transformer, |slot| {
        Rc::new(move |first, second| {
            let tied = slot
                .get()
                .expect("recursive function invoked before its definition was tied");
            tied(first, second)
        }) as RecFn2<A, B, C>
    })
}

/// Trampolined form of [`fix`].
///
/// The produced function returns a [`Trampoline`]; recursive calls are
/// suspended as steps, so driving the result with
/// [`Trampoline::run`] is stack-safe for unbounded depth.
pub fn fix_tramp<A, B, F>(transformer: F) -> RecTramp<A, B>
where
    A: 'static,
    B: 'static,
    F: FnOnce(RecTramp<A, B>) -> RecTramp<A, B>,
{
    tie(transformer, |slot| {
        Rc::new(move |argument| {
            let tied = slot
                .get()
                .expect("recursive function invoked before its definition was tied");
            tied(argument)
        }) as RecTramp<A, B>
    })
}

/// Trampolined form of [`fix2`].
pub fn fix2_tramp<A, B, C, F>(transformer: F) -> RecTramp2<A, B, C>
where
    A: 'static,
    B: 'static,
    C: 'static,
    F: FnOnce(RecTramp2<A, B, C>) -> RecTramp2<A, B, C>,
{
    tie(transformer, |slot| {
        Rc::new(move |first, second| {
            let tied = slot
                .get()
                .expect("recursive function invoked before its definition was tied");
            tied(first, second)
        }) as RecTramp2<A, B, C>
    })
}

/// Fixes a trampolined definition, applies it, and runs the loop.
///
/// One-call convenience for the common case: tie the knot with
/// [`fix_tramp`], apply the resulting function to `argument`, drive the
/// trampoline to completion, and return the unwrapped value.
///
/// # Examples
///
/// ```rust
/// use lazyseq::control::{recurse, Trampoline};
/// use std::rc::Rc;
///
/// let total = recurse(
///     |this| {
///         Rc::new(move |n: u64| {
///             if n == 0 {
///                 Trampoline::done(0u64)
///             } else {
///                 let this = Rc::clone(&this);
///                 Trampoline::call(move |m| this(m), n - 1).map(move |rest| rest + n)
///             }
///         })
///     },
///     10u64,
/// );
/// assert_eq!(total, 55);
/// ```
pub fn recurse<A, B, F>(transformer: F, argument: A) -> B
where
    A: 'static,
    B: 'static,
    F: FnOnce(RecTramp<A, B>) -> RecTramp<A, B>,
{
    fix_tramp(transformer)(argument).run()
}

/// Two-argument form of [`recurse`].
pub fn recurse2<A, B, C, F>(transformer: F, first: A, second: B) -> C
where
    A: 'static,
    B: 'static,
    C: 'static,
    F: FnOnce(RecTramp2<A, B, C>) -> RecTramp2<A, B, C>,
{
    fix2_tramp(transformer)(first, second).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fix_defines_factorial() {
        let factorial = fix(|this| {
            Rc::new(move |n: u64| if n == 0 { 1 } else { n * this(n - 1) })
        });
        assert_eq!(factorial(6), 720);
    }

    #[rstest]
    fn fix2_defines_greatest_common_divisor() {
        let gcd = fix2(|this| {
            Rc::new(move |a: u64, b: u64| if b == 0 { a } else { this(b, a % b) })
        });
        assert_eq!(gcd(48, 36), 12);
    }

    #[rstest]
    fn recurse_is_stack_safe_for_deep_inputs() {
        let total = recurse(
            |this: RecTramp<u64, u64>| {
                Rc::new(move |n: u64| {
                    if n == 0 {
                        Trampoline::done(0u64)
                    } else {
                        let this = Rc::clone(&this);
                        Trampoline::call(move |m| this(m), n - 1).map(move |rest| rest + n)
                    }
                })
            },
            100_000u64,
        );
        assert_eq!(total, 5_000_050_000);
    }

    #[rstest]
    fn premature_self_reference_panics() {
        let result = std::panic::catch_unwind(|| {
            fix(|this: RecFn<u64, u64>| {
                // Calling the handle during construction is a contract
                // violation; the knot is not tied yet.
                let _ = this(1);
                Rc::new(move |n: u64| n)
            })
        });
        assert!(result.is_err());
    }
}
