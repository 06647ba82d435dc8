//! Arrays skipping their bounds checks.
//!
//! Indexing out of bounds, popping an empty array or taking the scalar of an empty array
//! is undefined behavior with these types.
pub use crate::policy::Unchecked as Policy;

pub type RawBuffer<T> = crate::raw::RawBuffer<T, Policy>;
pub type DynArray<T> = crate::generic::DynamicArray<T, Policy>;
