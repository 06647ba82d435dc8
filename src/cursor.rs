//! Iterator boilerplate.
//!
//! A container only has to describe a position in its storage through the five primitive
//! operations of [`Cursor`]. The [`Iter`] adapter then provides the whole iterator surface
//! (forward, backward, fused) over any pair of cursors.
use core::{
	cmp::Ordering,
	iter::FusedIterator,
	marker::PhantomData,
	mem,
	ptr::NonNull,
	fmt
};

/// A position in a container.
pub trait Cursor {
	/// What the cursor yields when dereferenced.
	type Item;

	/// Returns the item at the current position.
	///
	/// ## Safety
	///
	/// The cursor must point to a live element,
	/// and the item must not be yielded twice if it is a mutable reference.
	unsafe fn dereference(&self) -> Self::Item;

	/// Moves to the next position.
	fn increment(&mut self);

	/// Moves to the previous position.
	fn decrement(&mut self);

	/// Returns true if both cursors point to the same position.
	fn equals(&self, other: &Self) -> bool;

	/// Returns true if this cursor comes before `other`.
	fn less(&self, other: &Self) -> bool;
}

/// Iterator over the positions between two cursors.
///
/// The range is half-open: `begin` is yielded first, `end` is never yielded.
pub struct Iter<C> {
	front: C,
	back: C
}

impl<C: Cursor> Iter<C> {
	/// Creates an iterator over the range `[begin, end)`.
	///
	/// ## Safety
	///
	/// Every position in the range must hold a live element for as long as the iterator
	/// exists, and `end` must be reachable from `begin` by incrementing.
	#[inline]
	pub unsafe fn new(begin: C, end: C) -> Self {
		Iter {
			front: begin,
			back: end
		}
	}

	#[inline]
	pub fn is_exhausted(&self) -> bool {
		!self.front.less(&self.back)
	}
}

impl<C: Cursor> Iterator for Iter<C> {
	type Item = C::Item;

	#[inline]
	fn next(&mut self) -> Option<C::Item> {
		if self.front.equals(&self.back) {
			None
		} else {
			// SAFETY: `front` is in the live range.
			let item = unsafe { self.front.dereference() };
			self.front.increment();
			Some(item)
		}
	}
}

impl<C: Cursor> DoubleEndedIterator for Iter<C> {
	#[inline]
	fn next_back(&mut self) -> Option<C::Item> {
		if self.front.equals(&self.back) {
			None
		} else {
			self.back.decrement();
			// SAFETY: `back` is back in the live range.
			Some(unsafe { self.back.dereference() })
		}
	}
}

impl<C: Cursor> FusedIterator for Iter<C> {}

/// Cursor over a contiguous array of `T`, yielding shared references.
pub struct Ptr<'a, T> {
	current: *const T,
	lifetime: PhantomData<&'a T>
}

impl<'a, T> Ptr<'a, T> {
	#[inline]
	pub(crate) fn new(current: *const T) -> Self {
		Ptr {
			current,
			lifetime: PhantomData
		}
	}

	/// Cursor to the element `index` of the array starting at `base`.
	#[inline]
	pub(crate) fn at(base: *const T, index: usize) -> Self {
		Self::new(offset_by(base, index))
	}

	/// Returns the raw pointer to the current position.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.current
	}
}

impl<'a, T> Clone for Ptr<'a, T> {
	#[inline]
	fn clone(&self) -> Self {
		*self
	}
}

impl<'a, T> Copy for Ptr<'a, T> {}

impl<'a, T> Cursor for Ptr<'a, T> {
	type Item = &'a T;

	#[inline]
	unsafe fn dereference(&self) -> &'a T {
		&*element_ptr(self.current as *mut T)
	}

	#[inline]
	fn increment(&mut self) {
		self.current = offset(self.current, 1)
	}

	#[inline]
	fn decrement(&mut self) {
		self.current = offset(self.current, -1)
	}

	#[inline]
	fn equals(&self, other: &Self) -> bool {
		self.current == other.current
	}

	#[inline]
	fn less(&self, other: &Self) -> bool {
		self.current < other.current
	}
}

impl<'a, T> PartialEq for Ptr<'a, T> {
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.equals(other)
	}
}

impl<'a, T> Eq for Ptr<'a, T> {}

impl<'a, T> PartialOrd for Ptr<'a, T> {
	#[inline]
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<'a, T> Ord for Ptr<'a, T> {
	#[inline]
	fn cmp(&self, other: &Self) -> Ordering {
		if self.less(other) {
			Ordering::Less
		} else if self.equals(other) {
			Ordering::Equal
		} else {
			Ordering::Greater
		}
	}
}

impl<'a, T> fmt::Debug for Ptr<'a, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Ptr").field(&self.current).finish()
	}
}

/// Cursor over a contiguous array of `T`, yielding mutable references.
pub struct PtrMut<'a, T> {
	current: *mut T,
	lifetime: PhantomData<&'a mut T>
}

impl<'a, T> PtrMut<'a, T> {
	#[inline]
	pub(crate) fn new(current: *mut T) -> Self {
		PtrMut {
			current,
			lifetime: PhantomData
		}
	}

	#[inline]
	pub(crate) fn at(base: *mut T, index: usize) -> Self {
		Self::new(offset_by(base, index) as *mut T)
	}
}

impl<'a, T> Cursor for PtrMut<'a, T> {
	type Item = &'a mut T;

	#[inline]
	unsafe fn dereference(&self) -> &'a mut T {
		&mut *element_ptr(self.current)
	}

	#[inline]
	fn increment(&mut self) {
		self.current = offset(self.current, 1) as *mut T
	}

	#[inline]
	fn decrement(&mut self) {
		self.current = offset(self.current, -1) as *mut T
	}

	#[inline]
	fn equals(&self, other: &Self) -> bool {
		self.current == other.current
	}

	#[inline]
	fn less(&self, other: &Self) -> bool {
		self.current < other.current
	}
}

// Zero-sized elements all live at the same address:
// their cursors count in bytes instead.
#[inline]
fn offset<T>(ptr: *const T, delta: isize) -> *const T {
	if mem::size_of::<T>() == 0 {
		(ptr as *const u8).wrapping_offset(delta) as *const T
	} else {
		ptr.wrapping_offset(delta)
	}
}

#[inline]
fn offset_by<T>(ptr: *const T, count: usize) -> *const T {
	if mem::size_of::<T>() == 0 {
		(ptr as *const u8).wrapping_add(count) as *const T
	} else {
		ptr.wrapping_add(count)
	}
}

#[inline]
fn element_ptr<T>(ptr: *mut T) -> *mut T {
	if mem::size_of::<T>() == 0 {
		NonNull::dangling().as_ptr()
	} else {
		ptr
	}
}
