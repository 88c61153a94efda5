//! # Validation Engine Seam
//!
//! The compiler in [`crate::build`] never constructs validators directly.
//! It asks a [`ValidationEngine`] for the five combinators it needs, so the
//! lowering rules are written once and can target any engine whose
//! validators compose this way. [`crate::JsonSchemaEngine`] is the engine
//! shipped with this crate.

use slice_core::NonEmpty;

/// The combinators a slice compiles down to.
///
/// Implementations must be pure: the same inputs always produce validators
/// with the same accept/reject behavior.
pub trait ValidationEngine {
    /// The engine's validator type. Data slices carry values of this type.
    type Validator: Clone;

    /// Accepts only strings.
    fn string(&self) -> Self::Validator;

    /// Accepts objects where every listed field is present and satisfies
    /// its validator. Fields not listed are left unconstrained.
    fn object(&self, fields: Vec<(String, Self::Validator)>) -> Self::Validator;

    /// Accepts sequences whose every element satisfies `element`.
    fn array(&self, element: Self::Validator) -> Self::Validator;

    /// Accepts values that satisfy every validator in `validators`.
    fn all_of(&self, validators: NonEmpty<Self::Validator>) -> Self::Validator;

    /// Accepts nothing.
    fn never(&self) -> Self::Validator;
}
