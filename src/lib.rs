//! This crate provides the
//! [`DynamicArray`](generic::DynamicArray) growable array and the
//! [`RawBuffer`](raw::RawBuffer) it is built on.
//!
//! A `RawBuffer` is a block of memory sized for a number of elements,
//! which it either allocated itself (and frees on drop), or borrowed from someone else
//! (and never frees). It never runs any constructor or destructor.
//! A `DynamicArray` owns a `RawBuffer` and counts how many of its slots hold a live element.
//! It is responsible for every construction and destruction of its elements.
//!
//! ## Basic usage
//!
//! ```rust
//! use dynarray::{dynarray, DynArray};
//!
//! let mut array: DynArray<u32> = DynArray::new(); // capacity 1, no element.
//! array.push(1);
//! array.push(2); // <- here the capacity is doubled.
//! array.push(3);
//! assert_eq!(array, [1, 2, 3]);
//!
//! array.pop_back();
//! array.append(&dynarray![4, 5]);
//! assert_eq!(array, [1, 2, 4, 5]);
//! ```
//!
//! ## Bounds checks
//!
//! Indexing, popping and [`scalar`](generic::DynamicArray::scalar) go through a size-check
//! policy chosen at the type level.
//! [`checked::DynArray`] (re-exported at the crate root) panics on violations,
//! while [`unchecked::DynArray`] performs no check at all.
//!
//! ```rust,should_panic
//! # use dynarray::DynArray;
//! let array: DynArray<u32> = DynArray::from([1, 2, 3]);
//! let _ = array[3]; // panics: index 3 out of bounds of array of length 3.
//! ```
//!
//! ## Bitwise and per-element copies
//!
//! Copies that only move bytes ([`copy_bitwise`](generic::DynamicArray::copy_bitwise),
//! [`append`](generic::DynamicArray::append), [`from_slice`](generic::DynamicArray::from_slice))
//! require `T: Copy`. `Clone`, [`extend_from_slice`](generic::DynamicArray::extend_from_slice)
//! and [`convert_from`](generic::DynamicArray::convert_from) construct each element.
pub mod error;
pub mod policy;
pub mod raw;
pub mod cursor;
pub mod generic;
pub mod checked;
pub mod unchecked;

pub use error::ReserveError;
pub use raw::Ownership;
pub use generic::{
	DynamicArray,
	RawParts,
	GROWTH_FACTOR
};
pub use checked::DynArray;

/// Creates a [`DynArray`] containing the arguments.
///
/// ```
/// # use dynarray::{dynarray, DynArray};
/// let empty: DynArray<u8> = dynarray![];
/// assert_eq!(empty.capacity(), 1);
///
/// let array = dynarray![1, 2, 3];
/// assert_eq!(array.capacity(), 3);
///
/// let zeros = dynarray![0u8; 4];
/// assert_eq!(zeros, [0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! dynarray {
	() => (
		$crate::DynArray::new()
	);
	($elem:expr; $n:expr) => (
		$crate::DynArray::from_elem($elem, $n)
	);
	($($x:expr),+ $(,)?) => (
		$crate::DynArray::from([$($x),+])
	);
}
