//! Size-check policies.
//!
//! Every bounds-sensitive operation of [`RawBuffer`](crate::raw::RawBuffer) and
//! [`DynamicArray`](crate::generic::DynamicArray) hands its precondition to the policy
//! selected by the type parameter `P: SizeCheck`.
//! With [`Checked`], the precondition is evaluated and a violation panics.
//! With [`Unchecked`], the closure is never called and the call site compiles to nothing.

/// Bounds-check strategy, selected once per array type.
pub trait SizeCheck {
	/// `true` if this policy evaluates its preconditions.
	const ENABLED: bool;

	/// Validate `precondition`, reporting `what` on failure.
	///
	/// `what` is only invoked when the check fails.
	fn check<F, M>(precondition: F, what: M) where F: FnOnce() -> bool, M: FnOnce() -> String;
}

/// Policy asserting every precondition.
///
/// This is the default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Checked;

impl SizeCheck for Checked {
	const ENABLED: bool = true;

	#[inline(always)]
	fn check<F, M>(precondition: F, what: M) where F: FnOnce() -> bool, M: FnOnce() -> String {
		if !precondition() {
			violation(what())
		}
	}
}

/// Policy skipping every precondition.
///
/// Out of bounds accesses through an array using this policy are undefined behavior:
/// no check is executed and the memory past the live elements is touched.
/// Only select it for arrays whose indices are already known to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Unchecked;

impl SizeCheck for Unchecked {
	const ENABLED: bool = false;

	#[inline(always)]
	fn check<F, M>(_precondition: F, _what: M) where F: FnOnce() -> bool, M: FnOnce() -> String {}
}

#[cold]
#[inline(never)]
fn violation(what: String) -> ! {
	panic!("size check failed: {}", what)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	#[test]
	fn checked_passes() {
		Checked::check(|| 1 < 2, || unreachable!())
	}

	#[test]
	#[should_panic(expected = "size check failed: index 3 out of bounds")]
	fn checked_fails() {
		Checked::check(|| false, || "index 3 out of bounds".to_string())
	}

	#[test]
	fn unchecked_never_evaluates() {
		let called = Cell::new(false);
		Unchecked::check(|| { called.set(true); false }, || unreachable!());
		assert!(!called.get());
		assert!(!Unchecked::ENABLED);
		assert!(Checked::ENABLED);
	}
}
