use std::alloc::{
	Layout,
	handle_alloc_error
};
use thiserror::Error;

/// Error returned by the fallible capacity operations of
/// [`RawBuffer`](crate::raw::RawBuffer) and [`DynamicArray`](crate::generic::DynamicArray).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReserveError {
	/// The requested capacity does not fit in a valid layout.
	#[error("capacity overflow")]
	CapacityOverflow,

	/// The global allocator could not provide the requested block.
	#[error("memory allocation of {} bytes failed", .layout.size())]
	AllocFailed {
		/// Layout of the failed request.
		layout: Layout
	}
}

// Central function for reserve error handling.
//
// Allocation failures are not recoverable through the infallible API:
// overflows panic, exhausted memory aborts.
#[inline]
pub(crate) fn handle_reserve<T>(result: Result<T, ReserveError>) -> T {
	match result {
		Err(ReserveError::CapacityOverflow) => capacity_overflow(),
		Err(ReserveError::AllocFailed { layout }) => handle_alloc_error(layout),
		Ok(t) => t
	}
}

// We need to guarantee the following:
// * We don't ever allocate `> isize::MAX` byte-size objects.
// * We don't overflow `usize::MAX` and actually allocate too little.
//
// On 64-bit we just need to check for overflow since trying to allocate
// `> isize::MAX` bytes will surely fail. On 32-bit and 16-bit we need to add
// an extra guard for this in case we're running on a platform which can use
// all 4GB in user-space, e.g., PAE or x32.
#[inline]
pub(crate) fn alloc_guard(alloc_size: usize) -> Result<(), ReserveError> {
	if usize::BITS < 64 && alloc_size > isize::MAX as usize {
		Err(ReserveError::CapacityOverflow)
	} else {
		Ok(())
	}
}

// One central function responsible for reporting capacity overflows. This'll
// ensure that the code generation related to these panics is minimal as there's
// only one location which panics rather than a bunch throughout the crate.
#[cold]
pub(crate) fn capacity_overflow() -> ! {
	panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages() {
		assert_eq!(ReserveError::CapacityOverflow.to_string(), "capacity overflow");
		let layout = Layout::array::<u64>(4).unwrap();
		assert_eq!(ReserveError::AllocFailed { layout }.to_string(), "memory allocation of 32 bytes failed");
	}

	#[test]
	fn ok_passes_through() {
		assert_eq!(handle_reserve(Ok::<_, ReserveError>(7)), 7);
	}

	#[test]
	#[should_panic(expected = "capacity overflow")]
	fn overflow_panics() {
		handle_reserve::<()>(Err(ReserveError::CapacityOverflow))
	}
}
