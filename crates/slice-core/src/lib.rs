//! # slice-core — Slice Descriptor Model
//!
//! A slice is a named, possibly nested unit of structured content. This
//! crate defines the data that describes a slice's shape; compiling that
//! description into an executable validator is the job of `slice-schema`.
//!
//! ## Key Design Principles
//!
//! 1. **One closed enum.** [`SliceSchema`] has exactly five variants (text,
//!    data, multi, array, object). Every consumer matches on it exhaustively,
//!    so adding a variant forces every consumer to handle it at compile time.
//!
//! 2. **Non-empty by type.** Object children and multi-slice auxiliary
//!    fields are [`NonEmpty`]: a head plus a tail. There is no runtime length
//!    check because an empty value cannot be constructed.
//!
//! 3. **Engine-agnostic.** The validator carried by data slices is a type
//!    parameter. This crate stores it and never inspects it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `slice-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod nonempty;
pub mod slice;

pub use nonempty::NonEmpty;
pub use slice::{
    array_slice, data_multi_slice, data_slice, object_slice, text_multi_slice, text_slice,
    ArraySlice, DataSlice, MultiMain, MultiSlice, ObjectSlice, SliceKind, SliceSchema, TextSlice,
};
