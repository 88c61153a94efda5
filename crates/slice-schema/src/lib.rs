//! # slice-schema — Slice Compilation & Validation
//!
//! Compiles [`slice_core::SliceSchema`] descriptors into validators and
//! evaluates documents against them.
//!
//! ## Compiler (`build`)
//!
//! [`build_schema`] lowers a slice through any [`ValidationEngine`] by
//! exhaustive dispatch on the slice variant. Object slices nest their merged
//! children under their own key; multi slices splice their fields into the
//! enclosing object.
//!
//! ## JSON Schema engine (`json`)
//!
//! [`JsonSchemaEngine`] lowers every combinator to a [`Schema`], a JSON
//! Schema document. `Schema` is also the leaf type for data slices.
//!
//! ## Runtime Validation (`validate`)
//!
//! [`SliceValidator`] compiles the generated document with the `jsonschema`
//! crate and validates JSON values, JSON text and YAML text, optionally
//! narrowing a valid value into a typed Rust value.
//!
//! ## Crate Policy
//!
//! - Depends only on `slice-core` internally.
//! - The compiler is infallible. Every fallible step lives in `validate`
//!   and returns a structured [`SchemaValidationError`].

pub mod build;
pub mod engine;
pub mod json;
pub mod validate;

pub use build::{build_json_schema, build_schema, merge};
pub use engine::ValidationEngine;
pub use json::{JsonSchemaEngine, Schema};
pub use validate::{
    CompileOptions, DocumentFormat, SchemaValidationError, SliceValidator, ValidationViolations,
    Violation,
};

/// Re-exported so callers can pick a draft without depending on `jsonschema`.
pub use jsonschema::Draft;

/// A slice whose data fields carry JSON Schema documents.
pub type Slice = slice_core::SliceSchema<Schema>;
