//! Fail-slow composition: run every independent check, keep every failure.
//!
//! [`Validation`] is the counterpart of `Result` for independent checks
//! (form fields, configuration entries). Combining two `Invalid` values
//! concatenates their errors in argument order instead of stopping at the
//! first one.
//!
//! There is no `flat_map`: when a later check needs the *value*
//! produced by an earlier one, convert with [`Validation::to_result`] and
//! chain with `ResultExt::flat_map`.

use crate::non_empty::NonEmpty;

/// Outcome of one or more independent checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E: Clone> {
    Valid(T),
    Invalid(NonEmpty<E>),
}

impl<T, E: Clone> Validation<T, E> {
    pub fn valid(value: T) -> Self {
        Self::Valid(value)
    }

    /// Single failure.
    pub fn invalid(error: E) -> Self {
        Self::Invalid(NonEmpty::one(error))
    }

    pub fn invalid_all(errors: NonEmpty<E>) -> Self {
        Self::Invalid(errors)
    }

    /// Lift a fail-fast outcome into a single-error validation.
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Valid(value),
            Err(error) => Self::invalid(error),
        }
    }

    /// `Valid(value)` when `check` holds, `Invalid(error())` otherwise.
    pub fn ensure<F>(value: T, check: bool, error: F) -> Self
    where
        F: FnOnce() -> E,
    {
        if check { Self::Valid(value) } else { Self::invalid(error()) }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Valid(value) => Validation::Valid(f(value)),
            Self::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// Transform every collected error.
    pub fn map_errors<G: Clone, F>(self, f: F) -> Validation<T, G>
    where
        F: FnMut(E) -> G,
    {
        match self {
            Self::Valid(value) => Validation::Valid(value),
            Self::Invalid(errors) => Validation::Invalid(errors.map(f)),
        }
    }

    pub fn fold<R, OnValid, OnInvalid>(self, on_valid: OnValid, on_invalid: OnInvalid) -> R
    where
        OnValid: FnOnce(T) -> R,
        OnInvalid: FnOnce(NonEmpty<E>) -> R,
    {
        match self {
            Self::Valid(value) => on_valid(value),
            Self::Invalid(errors) => on_invalid(errors),
        }
    }

    /// Collected errors; empty on `Valid`.
    pub fn errors(&self) -> &[E] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(errors) => errors.as_slice(),
        }
    }

    pub fn to_result(self) -> Result<T, NonEmpty<E>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }

    /// Collapse the error list into one aggregate failure value.
    pub fn to_result_with<F, G>(self, aggregate: G) -> Result<T, F>
    where
        G: FnOnce(NonEmpty<E>) -> F,
    {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(aggregate(errors)),
        }
    }

    /// Extract the valid value.
    ///
    /// # Panics
    ///
    /// Panics when called on `Invalid`. Use only when the branch is statically known.
    #[track_caller]
    pub fn get_or_throw(self) -> T {
        match self {
            Self::Valid(value) => value,
            Self::Invalid(errors) => {
                panic!("get_or_throw called on Invalid ({} errors)", errors.len())
            }
        }
    }

    /// Combine with another validation into a pair.
    pub fn zip<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        combine2(self, other, |a, b| (a, b))
    }
}

/// Combine two independent validations.
///
/// Both valid: `Valid(combiner(a, b))`. One invalid: its errors unchanged.
/// Both invalid: left errors followed by right errors.
pub fn combine2<A, B, R, E, F>(va: Validation<A, E>, vb: Validation<B, E>, combiner: F) -> Validation<R, E>
where
    E: Clone,
    F: FnOnce(A, B) -> R,
{
    match (va, vb) {
        (Validation::Valid(a), Validation::Valid(b)) => Validation::Valid(combiner(a, b)),
        (Validation::Valid(_), Validation::Invalid(errors)) => Validation::Invalid(errors),
        (Validation::Invalid(errors), Validation::Valid(_)) => Validation::Invalid(errors),
        (Validation::Invalid(left), Validation::Invalid(right)) => {
            Validation::Invalid(left.concat(right))
        }
    }
}

/// Three-way combination, reduced pairwise through `((a, b), c)`.
pub fn combine3<A, B, C, R, E, F>(
    va: Validation<A, E>,
    vb: Validation<B, E>,
    vc: Validation<C, E>,
    combiner: F,
) -> Validation<R, E>
where
    E: Clone,
    F: FnOnce(A, B, C) -> R,
{
    combine2(combine2(va, vb, |a, b| (a, b)), vc, |(a, b), c| combiner(a, b, c))
}

/// Four-way combination, reduced pairwise through `((a, b), (c, d))`.
pub fn combine4<A, B, C, D, R, E, F>(
    va: Validation<A, E>,
    vb: Validation<B, E>,
    vc: Validation<C, E>,
    vd: Validation<D, E>,
    combiner: F,
) -> Validation<R, E>
where
    E: Clone,
    F: FnOnce(A, B, C, D) -> R,
{
    combine2(
        combine2(va, vb, |a, b| (a, b)),
        combine2(vc, vd, |c, d| (c, d)),
        |(a, b), (c, d)| combiner(a, b, c, d),
    )
}

/// Run the same check over many items, keeping every valid value or every error.
pub fn traverse<I, T, U, E, F>(items: I, mut check: F) -> Validation<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    E: Clone,
    F: FnMut(T) -> Validation<U, E>,
{
    items
        .into_iter()
        .fold(Validation::Valid(Vec::new()), |acc, item| {
            combine2(acc, check(item), |mut values, value| {
                values.push(value);
                values
            })
        })
}
