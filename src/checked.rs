//! Arrays asserting their bounds.
pub use crate::policy::Checked as Policy;

pub type RawBuffer<T> = crate::raw::RawBuffer<T, Policy>;
pub type DynArray<T> = crate::generic::DynamicArray<T, Policy>;
