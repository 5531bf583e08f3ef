//! Fail-fast composition on top of `std::result::Result`.
//!
//! `Result<S, F>` already is the two-variant tagged union we need, and its
//! inherent `map` is the functor map. [`ResultExt`] adds the remaining
//! combinators under the names used throughout the domain crates:
//!
//! - `flat_map`: sequential, dependent, possibly failing steps. The first
//!   `Err` short-circuits the chain and is the only error reported.
//! - `map_error`: translate a lower-layer error at a boundary.
//! - `fold`: total collapse of both branches into one value.
//! - `get_or_else` / `recover` / `recover_with` / `or_else_get`: total recovery.
//! - `get_or_throw` / `error_or_throw`: unchecked extraction, only for code
//!   where the branch is statically known (tests, proven-safe paths).

/// Extension combinators for [`Result`].
pub trait ResultExt<S, F>: Sized {
    /// Chain a dependent step. `next` is never invoked on `Err`.
    fn flat_map<T, G>(self, next: G) -> Result<T, F>
    where
        G: FnOnce(S) -> Result<T, F>;

    /// Transform the error only; `Ok` passes through untouched.
    fn map_error<E, G>(self, transform: G) -> Result<S, E>
    where
        G: FnOnce(F) -> E;

    /// Collapse both branches into a single value.
    fn fold<T, OnOk, OnErr>(self, on_ok: OnOk, on_err: OnErr) -> T
    where
        OnOk: FnOnce(S) -> T,
        OnErr: FnOnce(F) -> T;

    /// Value on `Ok`, `default` otherwise.
    fn get_or_else(self, default: S) -> S;

    /// Turn any error into a success value.
    fn recover<G>(self, handler: G) -> Result<S, F>
    where
        G: FnOnce(F) -> S;

    /// Replace an error with the outcome of another fallible computation.
    fn recover_with<G>(self, handler: G) -> Result<S, F>
    where
        G: FnOnce(F) -> Result<S, F>;

    /// Replace an error with a fallback computed without looking at the error.
    fn or_else_get<G>(self, fallback: G) -> Result<S, F>
    where
        G: FnOnce() -> Result<S, F>;

    /// Extract the success value.
    ///
    /// # Panics
    ///
    /// Panics when called on `Err`. Use only when the branch is statically known.
    fn get_or_throw(self) -> S;

    /// Extract the error value.
    ///
    /// # Panics
    ///
    /// Panics when called on `Ok`. Use only when the branch is statically known.
    fn error_or_throw(self) -> F;
}

impl<S, F> ResultExt<S, F> for Result<S, F> {
    #[inline]
    fn flat_map<T, G>(self, next: G) -> Result<T, F>
    where
        G: FnOnce(S) -> Result<T, F>,
    {
        match self {
            Ok(value) => next(value),
            Err(error) => Err(error),
        }
    }

    #[inline]
    fn map_error<E, G>(self, transform: G) -> Result<S, E>
    where
        G: FnOnce(F) -> E,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(transform(error)),
        }
    }

    #[inline]
    fn fold<T, OnOk, OnErr>(self, on_ok: OnOk, on_err: OnErr) -> T
    where
        OnOk: FnOnce(S) -> T,
        OnErr: FnOnce(F) -> T,
    {
        match self {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        }
    }

    #[inline]
    fn get_or_else(self, default: S) -> S {
        match self {
            Ok(value) => value,
            Err(_) => default,
        }
    }

    #[inline]
    fn recover<G>(self, handler: G) -> Result<S, F>
    where
        G: FnOnce(F) -> S,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Ok(handler(error)),
        }
    }

    #[inline]
    fn recover_with<G>(self, handler: G) -> Result<S, F>
    where
        G: FnOnce(F) -> Result<S, F>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => handler(error),
        }
    }

    #[inline]
    fn or_else_get<G>(self, fallback: G) -> Result<S, F>
    where
        G: FnOnce() -> Result<S, F>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(_) => fallback(),
        }
    }

    #[track_caller]
    fn get_or_throw(self) -> S {
        match self {
            Ok(value) => value,
            Err(_) => panic!("get_or_throw called on Err"),
        }
    }

    #[track_caller]
    fn error_or_throw(self) -> F {
        match self {
            Ok(_) => panic!("error_or_throw called on Ok"),
            Err(error) => error,
        }
    }
}
