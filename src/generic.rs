use core::{
	marker::PhantomData,
	mem::{
		self,
		ManuallyDrop
	},
	ptr::{
		self,
		NonNull
	},
	ops::{
		Deref,
		DerefMut,
		Index,
		IndexMut
	},
	iter::FromIterator,
	fmt,
	cmp
};
use crate::{
	cursor,
	error::{
		ReserveError,
		handle_reserve
	},
	policy::{
		SizeCheck,
		Checked
	},
	raw::{
		RawBuffer,
		Ownership
	}
};

/// Factor by which the capacity of a full array is multiplied on push.
pub const GROWTH_FACTOR: usize = 2;

/// Contiguous growable array type built on a [`RawBuffer`].
///
/// The buffer only provides raw capacity. The array tracks how many slots,
/// starting at index 0, hold a live element, and is responsible for every element
/// construction and destruction.
///
/// The bounds-sensitive operations (indexing, [`pop_back`](DynamicArray::pop_back),
/// [`scalar`](DynamicArray::scalar)) validate their preconditions through the
/// size-check policy `P`. See [`policy`](crate::policy).
///
/// # Examples
///
/// ```
/// # use dynarray::DynArray;
/// let mut array: DynArray<u32> = DynArray::new();
/// array.push(1);
/// array.push(2);
/// array.push(3);
/// assert_eq!(array, [1, 2, 3]);
///
/// array.pop_back();
/// array.append(&DynArray::from([4, 5]));
/// assert_eq!(array, [1, 2, 4, 5]);
/// ```
pub struct DynamicArray<T, P: SizeCheck = Checked> {
	/// Raw storage.
	buffer: RawBuffer<T, P>,

	/// Number of live elements at the start of `buffer`.
	len: usize,

	/// The array owns its elements.
	marker: PhantomData<T>
}

// SAFETY: the array owns its elements like a `Vec` does.
// An adopted block is exclusively lent to the array by the `adopt` contract.
unsafe impl<T: Send, P: SizeCheck> Send for DynamicArray<T, P> {}
unsafe impl<T: Sync, P: SizeCheck> Sync for DynamicArray<T, P> {}

impl<T, P: SizeCheck> Drop for DynamicArray<T, P> {
	fn drop(&mut self) {
		unsafe {
			// drop every element, the buffer then releases its memory.
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buffer.as_mut_ptr(), self.len))
		}
	}
}

/// Decomposed array, as returned by [`DynamicArray::take_raw`].
#[derive(Debug)]
pub struct RawParts<T> {
	/// Pointer to the first element.
	pub ptr: NonNull<T>,

	/// Number of live elements.
	pub len: usize,

	/// Number of slots in the block.
	pub capacity: usize,

	/// Whether the block was allocated by the array.
	pub ownership: Ownership
}

impl<T, P: SizeCheck> DynamicArray<T, P> {
	/// Creates a new empty array with room for one element.
	#[inline]
	pub fn new() -> Self {
		Self::with_capacity(1)
	}

	/// Creates a new empty array with room for `capacity` elements.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Self {
		DynamicArray {
			buffer: RawBuffer::allocate(capacity),
			len: 0,
			marker: PhantomData
		}
	}

	/// Creates an array of `len` default elements.
	///
	/// ```
	/// # use dynarray::DynArray;
	/// let array: DynArray<String> = DynArray::with_len(2);
	/// assert_eq!(array.len(), 2);
	/// assert_eq!(array.capacity(), 2);
	/// assert!(array[1].is_empty());
	/// ```
	#[inline]
	pub fn with_len(len: usize) -> Self where T: Default {
		let mut array = Self::with_capacity(len);
		array.extend_with(len, ExtendDefault);
		array
	}

	/// Creates an array of `len` clones of `value`.
	#[inline]
	pub fn from_elem(value: T, len: usize) -> Self where T: Clone {
		let mut array = Self::with_capacity(len);
		array.extend_with(len, ExtendElement(value));
		array
	}

	/// Creates an array by copying the bytes of `slice`.
	#[inline]
	pub fn from_slice(slice: &[T]) -> Self where T: Copy {
		let mut array = Self::with_capacity(slice.len());
		// SAFETY: the buffer was allocated with room for `slice.len()` elements.
		unsafe {
			ptr::copy_nonoverlapping(slice.as_ptr(), array.buffer.as_mut_ptr(), slice.len());
		}
		array.len = slice.len();
		array
	}

	/// Wraps `len` live elements stored at `ptr`.
	///
	/// The array takes ownership of the elements and drops them on teardown,
	/// but never frees their memory block.
	/// If the array needs to grow, the elements are moved into a new block
	/// owned by the array, and the original block is left alone.
	///
	/// ## Safety
	///
	/// `ptr` must point to `len` initialized elements that are valid for reads and writes
	/// for as long as the array uses the block, and which nobody else drops.
	///
	/// ```
	/// # use dynarray::DynArray;
	/// # use std::ptr::NonNull;
	/// let mut storage = [1u32, 2, 3];
	/// let ptr = NonNull::new(storage.as_mut_ptr()).unwrap();
	/// let mut array: DynArray<u32> = unsafe { DynArray::adopt(ptr, 3) };
	/// array[0] = 10;
	/// assert!(array.is_borrowed());
	/// drop(array);
	/// assert_eq!(storage, [10, 2, 3]);
	/// ```
	#[inline]
	pub unsafe fn adopt(ptr: NonNull<T>, len: usize) -> Self {
		DynamicArray {
			buffer: RawBuffer::adopt(ptr, len),
			len,
			marker: PhantomData
		}
	}

	/// Same as [`adopt`](DynamicArray::adopt) with a `(pointer, length)` pair.
	///
	/// ## Safety
	///
	/// See [`adopt`](DynamicArray::adopt).
	#[inline]
	pub unsafe fn adopt_parts((ptr, len): (NonNull<T>, usize)) -> Self {
		Self::adopt(ptr, len)
	}

	/// Rebuilds an array from parts returned by [`take_raw`](DynamicArray::take_raw).
	///
	/// ## Safety
	///
	/// The parts must come from `take_raw` on an array with the same element type,
	/// and must not have been used to rebuild another array.
	#[inline]
	pub unsafe fn from_raw_parts(parts: RawParts<T>) -> Self {
		DynamicArray {
			buffer: RawBuffer::from_raw_parts(parts.ptr, parts.capacity, parts.ownership),
			len: parts.len,
			marker: PhantomData
		}
	}

	/// Builds an array by converting each element of `other`.
	///
	/// ```
	/// # use dynarray::DynArray;
	/// let small: DynArray<u8> = DynArray::from([1, 2, 255]);
	/// let wide: DynArray<u32> = DynArray::convert_from(&small);
	/// assert_eq!(wide, [1u32, 2, 255]);
	/// ```
	pub fn convert_from<U, Q>(other: &DynamicArray<U, Q>) -> Self where U: Clone, T: From<U>, Q: SizeCheck {
		let mut array = Self::with_capacity(other.len());
		for item in other.iter() {
			array.push(T::from(item.clone()))
		}
		array
	}

	/// Duplicates the array by copying the bytes of its buffer.
	///
	/// The copy has the same length and capacity.
	#[inline]
	pub fn copy_bitwise(&self) -> Self where T: Copy {
		DynamicArray {
			buffer: self.buffer.copy(),
			len: self.len,
			marker: PhantomData
		}
	}

	/// Returns the number of live elements.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of elements the array can hold without reallocating.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.buffer.capacity()
	}

	#[inline]
	pub fn ownership(&self) -> Ownership {
		self.buffer.ownership()
	}

	/// Returns true if the elements live in an adopted block.
	#[inline]
	pub fn is_borrowed(&self) -> bool {
		self.buffer.is_borrowed()
	}

	/// Returns a raw pointer to the array's storage.
	///
	/// The array keeps ownership of the storage.
	/// The pointer is invalidated by any reallocation.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.buffer.as_ptr()
	}

	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.buffer.as_mut_ptr()
	}

	/// Alias of [`as_ptr`](DynamicArray::as_ptr).
	#[inline]
	pub fn data(&self) -> *const T {
		self.as_ptr()
	}

	/// Alias of [`as_mut_ptr`](DynamicArray::as_mut_ptr).
	#[inline]
	pub fn data_mut(&mut self) -> *mut T {
		self.as_mut_ptr()
	}

	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			std::slice::from_raw_parts(self.buffer.as_ptr(), self.len)
		}
	}

	#[inline]
	pub fn as_mut_slice(&mut self) -> &mut [T] {
		unsafe {
			std::slice::from_raw_parts_mut(self.buffer.as_mut_ptr(), self.len)
		}
	}

	#[inline]
	fn check_index(&self, index: usize) {
		let len = self.len;
		P::check(|| index < len, || format!("index {} out of bounds of array of length {}", index, len))
	}

	/// Returns a reference to the element at `index`.
	///
	/// The policy `P` checks that `index < len`.
	#[inline]
	pub fn get(&self, index: usize) -> &T {
		self.check_index(index);
		unsafe { &*self.buffer.as_ptr().add(index) }
	}

	/// Returns a mutable reference to the element at `index`.
	///
	/// The policy `P` checks that `index < len`.
	#[inline]
	pub fn get_mut(&mut self, index: usize) -> &mut T {
		self.check_index(index);
		unsafe { &mut *self.buffer.as_mut_ptr().add(index) }
	}

	/// Returns a reference to the element at `index`, or `None` if out of bounds.
	///
	/// This check is performed whatever the policy.
	#[inline]
	pub fn try_get(&self, index: usize) -> Option<&T> {
		self.as_slice().get(index)
	}

	/// Views the array as its first element.
	///
	/// The policy `P` checks that the array is not empty.
	///
	/// ```
	/// # use dynarray::DynArray;
	/// let array: DynArray<f32> = DynArray::from([0.5]);
	/// assert_eq!(*array.scalar(), 0.5);
	/// ```
	#[inline]
	pub fn scalar(&self) -> &T {
		let len = self.len;
		P::check(|| len > 0, || "scalar of an empty array".to_string());
		unsafe { &*self.buffer.as_ptr() }
	}

	/// Appends an element to the back of the array.
	///
	/// If the array is full, its capacity is first multiplied by [`GROWTH_FACTOR`].
	///
	/// # Panics
	///
	/// Panics if the new capacity overflows, and aborts if the allocation fails.
	#[inline]
	pub fn push(&mut self, value: T) {
		if self.len == self.buffer.capacity() {
			handle_reserve(self.grow())
		}

		unsafe {
			self.buffer.as_mut_ptr().add(self.len).write(value);
		}
		self.len += 1;
	}

	/// Alias of [`push`](DynamicArray::push).
	#[inline]
	pub fn push_back(&mut self, value: T) {
		self.push(value)
	}

	fn grow(&mut self) -> Result<(), ReserveError> {
		if self.buffer.capacity() == 0 {
			self.buffer.try_grow_by(1)
		} else {
			self.buffer.try_grow_to_factor(GROWTH_FACTOR)
		}
	}

	/// Removes the last element and returns it.
	///
	/// The policy `P` checks that the array is not empty.
	/// With [`Unchecked`](crate::policy::Unchecked), popping an empty array is undefined behavior.
	#[inline]
	pub fn pop_back(&mut self) -> T {
		let len = self.len;
		P::check(|| len >= 1, || "pop on an empty array".to_string());
		self.len -= 1;
		unsafe {
			ptr::read(self.buffer.as_ptr().add(self.len))
		}
	}

	/// Removes the last element and returns it, or `None` if the array is empty.
	#[inline]
	pub fn pop(&mut self) -> Option<T> {
		if self.len == 0 {
			None
		} else {
			self.len -= 1;
			unsafe {
				Some(ptr::read(self.buffer.as_ptr().add(self.len)))
			}
		}
	}

	/// Grows the buffer by `other.len()` slots and copies the bytes of `other`'s elements at the end.
	///
	/// ```
	/// # use dynarray::DynArray;
	/// let mut array: DynArray<u8> = DynArray::from([1, 2]);
	/// array.append(&DynArray::from([3]));
	/// assert_eq!(array, [1, 2, 3]);
	/// assert_eq!(array.capacity(), 3);
	/// ```
	pub fn append<Q: SizeCheck>(&mut self, other: &DynamicArray<T, Q>) where T: Copy {
		self.buffer.grow_by(other.len);
		// SAFETY: `len + other.len <= capacity` after growing, and the arrays are distinct.
		unsafe {
			ptr::copy_nonoverlapping(other.as_ptr(), self.buffer.as_mut_ptr().add(self.len), other.len);
		}
		self.len += other.len;
	}

	/// Clones and appends all the elements of `other`.
	pub fn extend_from_slice(&mut self, other: &[T]) where T: Clone {
		self.reserve(other.len());
		for item in other {
			self.push(item.clone())
		}
	}

	/// Reserves capacity for at least `additional` more elements.
	///
	/// Does nothing if the capacity is already sufficient.
	///
	/// # Panics
	///
	/// Panics if the new capacity overflows, and aborts if the allocation fails.
	#[inline]
	pub fn reserve(&mut self, additional: usize) {
		handle_reserve(self.try_reserve(additional))
	}

	/// The same as `reserve`, but returns on errors instead of panicking or aborting.
	pub fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
		let capacity = self.buffer.capacity();
		if additional > capacity - self.len {
			let required = self.len.checked_add(additional).ok_or(ReserveError::CapacityOverflow)?;
			// This guarantees exponential growth.
			let new_capacity = cmp::max(capacity.saturating_mul(GROWTH_FACTOR), required);
			self.buffer.try_resize(new_capacity)
		} else {
			Ok(())
		}
	}

	/// Shrinks the capacity of an owned buffer down to the length.
	///
	/// This function has no effect if the elements live in an adopted block.
	#[inline]
	pub fn shrink_to_fit(&mut self) {
		if self.buffer.is_owned() {
			let excess = self.buffer.capacity() - self.len;
			if excess > 0 {
				self.buffer.shrink_by(excess)
			}
		}
	}

	/// Drops the elements past `len`.
	///
	/// Has no effect if `len` is greater than the current length.
	pub fn truncate(&mut self, len: usize) {
		if len < self.len {
			let remaining = self.len - len;
			// the length is set before dropping, in case a destructor panics.
			self.len = len;
			unsafe {
				ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buffer.as_mut_ptr().add(len), remaining))
			}
		}
	}

	/// Drops every element, keeping the capacity.
	#[inline]
	pub fn clear(&mut self) {
		self.truncate(0)
	}

	#[inline]
	pub fn swap(&mut self, other: &mut Self) {
		mem::swap(self, other)
	}

	/// Replaces the content of this array with the content of `other`.
	///
	/// The previous content is dropped.
	#[inline]
	pub fn assign(&mut self, mut other: Self) {
		self.swap(&mut other)
	}

	/// Moves the content out, leaving an empty array behind.
	#[inline]
	pub fn take(&mut self) -> Self {
		mem::take(self)
	}

	/// Transfers the storage out of the array, leaving it with no buffer and no element.
	///
	/// The caller becomes responsible for the elements and, if the block is owned,
	/// for its release (for instance with [`from_raw_parts`](DynamicArray::from_raw_parts)).
	///
	/// ```
	/// # use dynarray::DynArray;
	/// let mut array: DynArray<u8> = DynArray::from([1, 2, 3]);
	/// let parts = array.take_raw();
	/// assert_eq!(parts.len, 3);
	/// assert_eq!(array.len(), 0);
	/// assert_eq!(array.capacity(), 0);
	///
	/// let array: DynArray<u8> = unsafe { DynArray::from_raw_parts(parts) };
	/// assert_eq!(array, [1, 2, 3]);
	/// ```
	pub fn take_raw(&mut self) -> RawParts<T> {
		let len = mem::replace(&mut self.len, 0);
		let (ptr, capacity, ownership) = self.buffer.take().into_raw_parts();
		log::debug!("transferring {} elements ({:?} block of {} slots) out of the array", len, ownership, capacity);
		RawParts {
			ptr,
			len,
			capacity,
			ownership
		}
	}

	/// Consuming version of [`take_raw`](DynamicArray::take_raw).
	#[inline]
	pub fn into_raw_parts(mut self) -> RawParts<T> {
		self.take_raw()
	}

	/// Cursor to the first element.
	#[inline]
	pub fn begin(&self) -> cursor::Ptr<'_, T> {
		cursor::Ptr::new(self.buffer.as_ptr())
	}

	/// Cursor past the last element.
	#[inline]
	pub fn end(&self) -> cursor::Ptr<'_, T> {
		cursor::Ptr::at(self.buffer.as_ptr(), self.len)
	}

	/// Iterates over the elements.
	///
	/// ```
	/// # use dynarray::DynArray;
	/// let array: DynArray<i32> = DynArray::from([1, 2, 3]);
	/// assert_eq!(array.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
	/// ```
	#[inline]
	pub fn iter(&self) -> Iter<'_, T> {
		// SAFETY: `[begin, end)` is the live range, borrowed by the iterator.
		unsafe { cursor::Iter::new(self.begin(), self.end()) }
	}

	/// Iterates over the elements, mutably.
	#[inline]
	pub fn iter_mut(&mut self) -> IterMut<'_, T> {
		let begin = self.buffer.as_mut_ptr();
		let end = cursor::PtrMut::at(begin, self.len);
		// SAFETY: `[begin, end)` is the live range, mutably borrowed by the iterator.
		unsafe { cursor::Iter::new(cursor::PtrMut::new(begin), end) }
	}

	/// Writes `n` elements produced by `value` at the end of the array.
	fn extend_with<E: ExtendWith<T>>(&mut self, n: usize, mut value: E) {
		self.reserve(n);

		unsafe {
			let mut ptr = self.buffer.as_mut_ptr().add(self.len);
			// Use SetLenOnDrop to work around bug where compiler
			// may not realize the store through `ptr` through self.set_len()
			// don't alias.
			let mut local_len = SetLenOnDrop::new(&mut self.len);

			// Write all elements except the last one
			for _ in 1..n {
				ptr::write(ptr, value.next());
				ptr = ptr.add(1);
				// Increment the length in every step in case next() panics
				local_len.increment_len(1);
			}

			if n > 0 {
				// We can write the last element directly without cloning needlessly
				ptr::write(ptr, value.last());
				local_len.increment_len(1);
			}

			// len set by scope guard
		}
	}
}

/// Iterator over the elements of a [`DynamicArray`].
pub type Iter<'a, T> = cursor::Iter<cursor::Ptr<'a, T>>;

/// Mutable iterator over the elements of a [`DynamicArray`].
pub type IterMut<'a, T> = cursor::Iter<cursor::PtrMut<'a, T>>;

// Set the length of the vec when the `SetLenOnDrop` value goes out of scope.
//
// The idea is: The length field in SetLenOnDrop is a local variable
// that the optimizer will see does not alias with any stores through the array's data
// pointer. This is a workaround for alias analysis issue #32155
struct SetLenOnDrop<'a> {
	len: &'a mut usize,
	local_len: usize
}

impl<'a> SetLenOnDrop<'a> {
	#[inline]
	fn new(len: &'a mut usize) -> Self {
		let local_len = *len;
		SetLenOnDrop { len, local_len }
	}

	#[inline]
	fn increment_len(&mut self, increment: usize) {
		self.local_len += increment;
	}
}

impl Drop for SetLenOnDrop<'_> {
	#[inline]
	fn drop(&mut self) {
		*self.len = self.local_len;
	}
}

// This code generalizes `extend_with_{element,default}`.
trait ExtendWith<T> {
	fn next(&mut self) -> T;
	fn last(self) -> T;
}

struct ExtendElement<T>(T);
impl<T: Clone> ExtendWith<T> for ExtendElement<T> {
	fn next(&mut self) -> T {
		self.0.clone()
	}
	fn last(self) -> T {
		self.0
	}
}

struct ExtendDefault;
impl<T: Default> ExtendWith<T> for ExtendDefault {
	fn next(&mut self) -> T {
		Default::default()
	}
	fn last(self) -> T {
		Default::default()
	}
}

impl<T, P: SizeCheck> Default for DynamicArray<T, P> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Clone, P: SizeCheck> Clone for DynamicArray<T, P> {
	/// Clones every element into a new buffer of the same capacity.
	fn clone(&self) -> Self {
		let mut array = Self::with_capacity(self.capacity());
		array.extend_from_slice(self);
		array
	}
}

impl<T, P: SizeCheck, const N: usize> From<[T; N]> for DynamicArray<T, P> {
	/// Moves the elements of `array` into a new buffer of capacity `N`.
	fn from(array: [T; N]) -> Self {
		let array = ManuallyDrop::new(array);
		let mut result = Self::with_capacity(N);
		// SAFETY: the elements are moved: `array` will not drop them.
		unsafe {
			ptr::copy_nonoverlapping(array.as_ptr(), result.buffer.as_mut_ptr(), N);
		}
		result.len = N;
		result
	}
}

impl<'a, T, U, P: SizeCheck, Q: SizeCheck> From<&'a DynamicArray<U, Q>> for DynamicArray<T, P> where U: Clone, T: From<U> {
	#[inline]
	fn from(other: &'a DynamicArray<U, Q>) -> Self {
		Self::convert_from(other)
	}
}

impl<T, P: SizeCheck> Index<usize> for DynamicArray<T, P> {
	type Output = T;

	#[inline]
	fn index(&self, index: usize) -> &T {
		self.get(index)
	}
}

impl<T, P: SizeCheck> IndexMut<usize> for DynamicArray<T, P> {
	#[inline]
	fn index_mut(&mut self, index: usize) -> &mut T {
		self.get_mut(index)
	}
}

impl<T, P: SizeCheck> Deref for DynamicArray<T, P> {
	type Target = [T];

	#[inline]
	fn deref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T, P: SizeCheck> DerefMut for DynamicArray<T, P> {
	#[inline]
	fn deref_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<T, P: SizeCheck> AsRef<[T]> for DynamicArray<T, P> {
	#[inline]
	fn as_ref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T, P: SizeCheck> AsMut<[T]> for DynamicArray<T, P> {
	#[inline]
	fn as_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<'v, T, P: SizeCheck> IntoIterator for &'v DynamicArray<T, P> {
	type Item = &'v T;
	type IntoIter = Iter<'v, T>;

	#[inline]
	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<'v, T, P: SizeCheck> IntoIterator for &'v mut DynamicArray<T, P> {
	type Item = &'v mut T;
	type IntoIter = IterMut<'v, T>;

	#[inline]
	fn into_iter(self) -> Self::IntoIter {
		self.iter_mut()
	}
}

/// Owning iterator over the elements of a [`DynamicArray`].
pub struct IntoIter<T, P: SizeCheck> {
	buffer: RawBuffer<T, P>,
	front: usize,
	back: usize
}

impl<T, P: SizeCheck> Iterator for IntoIter<T, P> {
	type Item = T;

	#[inline]
	fn next(&mut self) -> Option<T> {
		if self.front < self.back {
			let item = unsafe { ptr::read(self.buffer.as_ptr().add(self.front)) };
			self.front += 1;
			Some(item)
		} else {
			None
		}
	}

	#[inline]
	fn size_hint(&self) -> (usize, Option<usize>) {
		let len = self.back - self.front;
		(len, Some(len))
	}
}

impl<T, P: SizeCheck> DoubleEndedIterator for IntoIter<T, P> {
	#[inline]
	fn next_back(&mut self) -> Option<T> {
		if self.front < self.back {
			self.back -= 1;
			unsafe { Some(ptr::read(self.buffer.as_ptr().add(self.back))) }
		} else {
			None
		}
	}
}

impl<T, P: SizeCheck> ExactSizeIterator for IntoIter<T, P> {}

impl<T, P: SizeCheck> Drop for IntoIter<T, P> {
	fn drop(&mut self) {
		unsafe {
			// drop the remaining elements, the buffer then releases its memory.
			let remaining = self.buffer.as_mut_ptr().add(self.front);
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(remaining, self.back - self.front))
		}
	}
}

impl<T, P: SizeCheck> IntoIterator for DynamicArray<T, P> {
	type Item = T;
	type IntoIter = IntoIter<T, P>;

	#[inline]
	fn into_iter(mut self) -> Self::IntoIter {
		let back = mem::replace(&mut self.len, 0);
		IntoIter {
			buffer: self.buffer.take(),
			front: 0,
			back
		}
	}
}

impl<T, P: SizeCheck> Extend<T> for DynamicArray<T, P> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iterator: I) {
		let iterator = iterator.into_iter();
		let (lower, _) = iterator.size_hint();
		self.reserve(lower);
		for item in iterator {
			self.push(item)
		}
	}
}

impl<'a, T: Copy + 'a, P: SizeCheck> Extend<&'a T> for DynamicArray<T, P> {
	fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iterator: I) {
		self.extend(iterator.into_iter().copied())
	}
}

impl<T, P: SizeCheck> FromIterator<T> for DynamicArray<T, P> {
	fn from_iter<I: IntoIterator<Item = T>>(iterator: I) -> Self {
		let mut array = Self::new();
		array.extend(iterator);
		array
	}
}

impl<T: fmt::Debug, P: SizeCheck> fmt::Debug for DynamicArray<T, P> {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self.as_slice(), f)
	}
}

impl<T: fmt::Display, P: SizeCheck> fmt::Display for DynamicArray<T, P> {
	/// Prints the live elements in order, one per line.
	///
	/// ```
	/// # use dynarray::DynArray;
	/// let array: DynArray<u8> = DynArray::from([1, 2]);
	/// assert_eq!(array.to_string(), "{ \n\t1\n\t2\n}");
	/// ```
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{{ ")?;
		for item in self {
			writeln!(f, "\t{}", item)?;
		}
		write!(f, "}}")
	}
}

macro_rules! impl_slice_eq {
	([$($vars:tt)*] $rhs:ty) => {
		impl<$($vars)*> PartialEq<$rhs> for DynamicArray<T, P> where T: PartialEq<U> {
			#[inline]
			fn eq(&self, other: &$rhs) -> bool { self.as_slice() == &other[..] }
		}
	}
}

impl_slice_eq! { [T, U, P: SizeCheck] Vec<U> }
impl_slice_eq! { [T, U, P: SizeCheck] [U] }
impl_slice_eq! { [T, U, P: SizeCheck] &[U] }
impl_slice_eq! { [T, U, P: SizeCheck, const N: usize] [U; N] }
impl_slice_eq! { [T, U, P: SizeCheck, const N: usize] &[U; N] }

impl<T, U, P: SizeCheck, Q: SizeCheck> PartialEq<DynamicArray<U, Q>> for DynamicArray<T, P> where T: PartialEq<U> {
	#[inline]
	fn eq(&self, other: &DynamicArray<U, Q>) -> bool { self.as_slice() == other.as_slice() }
}

impl<T: Eq, P: SizeCheck> Eq for DynamicArray<T, P> {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::policy::Unchecked;
	use std::{
		cell::Cell,
		rc::Rc
	};

	type Array<T> = DynamicArray<T, Checked>;

	/// Counts its drops.
	#[derive(Clone)]
	struct Tracked(Rc<Cell<usize>>);

	impl Drop for Tracked {
		fn drop(&mut self) {
			self.0.set(self.0.get() + 1)
		}
	}

	#[test]
	fn empty() {
		let array: Array<u32> = Array::new();
		assert_eq!(array.len(), 0);
		assert_eq!(array.capacity(), 1);
		assert!(array.is_empty());
		assert_eq!(array.try_get(0), None);
	}

	#[test]
	fn push_pop_append() {
		let mut array: Array<u32> = Array::new();
		array.push_back(1);
		array.push_back(2);
		array.push_back(3);
		assert_eq!(array.len(), 3);
		assert!(array.capacity() >= 3);
		assert_eq!(array, [1, 2, 3]);

		assert_eq!(array.pop_back(), 3);
		assert_eq!(array, [1, 2]);

		array.append(&Array::from([4, 5]));
		assert_eq!(array.len(), 4);
		assert_eq!(array, [1, 2, 4, 5]);
	}

	#[test]
	fn capacity_doubles() {
		let mut array: Array<usize> = Array::new();
		let mut capacities = vec![array.capacity()];
		for i in 0..100 {
			array.push(i);
			if *capacities.last().unwrap() != array.capacity() {
				capacities.push(array.capacity())
			}
			assert!(array.capacity() >= array.len());
		}
		assert_eq!(capacities, [1, 2, 4, 8, 16, 32, 64, 128]);
	}

	#[test]
	fn pre_sized() {
		let array: Array<u64> = Array::with_len(4);
		assert_eq!(array.len(), 4);
		assert_eq!(array.capacity(), 4);
		assert_eq!(array, [0, 0, 0, 0]);

		let array: Array<String> = Array::from_elem("x".to_string(), 3);
		assert_eq!(array, ["x", "x", "x"]);

		let array: Array<u8> = Array::with_capacity(8);
		assert_eq!(array.len(), 0);
		assert_eq!(array.capacity(), 8);
	}

	#[test]
	fn from_array_and_slice() {
		let array: Array<String> = Array::from(["a".to_string(), "b".to_string()]);
		assert_eq!(array.len(), 2);
		assert_eq!(array.capacity(), 2);
		assert_eq!(array, ["a", "b"]);

		let source = [3u16, 4, 5];
		let array: Array<u16> = Array::from_slice(&source);
		assert_eq!(array, source);
		assert_ne!(array.as_ptr(), source.as_ptr());
	}

	#[test]
	fn copies_are_deep() {
		let mut original: Array<i64> = Array::from([1, 2, 3]);
		original.push(4);

		let bitwise = original.copy_bitwise();
		assert_eq!(bitwise, original);
		assert_eq!(bitwise.capacity(), original.capacity());
		assert_ne!(bitwise.as_ptr(), original.as_ptr());

		let cloned = original.clone();
		assert_eq!(cloned, original);
		assert_eq!(cloned.capacity(), original.capacity());
		assert_ne!(cloned.as_ptr(), original.as_ptr());

		original[0] = 100;
		assert_eq!(bitwise[0], 1);
		assert_eq!(cloned[0], 1);
	}

	#[test]
	fn clone_runs_per_element() {
		let rc = Rc::new(());
		let array: Array<Rc<()>> = Array::from([rc.clone(), rc.clone()]);
		let copy = array.clone();
		assert_eq!(Rc::strong_count(&rc), 5);
		drop(array);
		drop(copy);
		assert_eq!(Rc::strong_count(&rc), 1);
	}

	#[test]
	fn take_leaves_empty() {
		let mut a: Array<u8> = Array::from([1, 2, 3]);
		let ptr = a.as_ptr();
		let b = a.take();

		assert_eq!(b, [1, 2, 3]);
		assert_eq!(b.as_ptr(), ptr);
		assert_eq!(a.len(), 0);
		assert_eq!(a.capacity(), 1);
		drop(a);
		assert_eq!(b, [1, 2, 3]);
	}

	#[test]
	fn swap_and_assign() {
		let mut a: Array<u8> = Array::from([1]);
		let mut b: Array<u8> = Array::from([2, 3]);
		a.swap(&mut b);
		assert_eq!(a, [2, 3]);
		assert_eq!(b, [1]);

		a.assign(Array::from([9]));
		assert_eq!(a, [9]);
	}

	#[test]
	fn drops_every_element() {
		let drops = Rc::new(Cell::new(0));
		{
			let mut array: Array<Tracked> = Array::new();
			for _ in 0..5 {
				array.push(Tracked(drops.clone()))
			}
			drop(array.pop_back());
			assert_eq!(drops.get(), 1);
			array.truncate(2);
			assert_eq!(drops.get(), 3);
		}
		assert_eq!(drops.get(), 5);
	}

	#[test]
	fn adopted_elements_are_dropped_but_not_freed() {
		let drops = Rc::new(Cell::new(0));
		let mut storage = ManuallyDrop::new(vec![Tracked(drops.clone()), Tracked(drops.clone())]);
		let ptr = NonNull::new(storage.as_mut_ptr()).unwrap();
		{
			let array: Array<Tracked> = unsafe { Array::adopt_parts((ptr, 2)) };
			assert!(array.is_borrowed());
			assert_eq!(array.len(), 2);
			assert_eq!(array.capacity(), 2);
		}
		assert_eq!(drops.get(), 2);

		// the block still belongs to `storage`: empty it and free it.
		unsafe { storage.set_len(0) };
		drop(ManuallyDrop::into_inner(storage));
		assert_eq!(drops.get(), 2);
	}

	#[test]
	fn adopted_array_grows_into_owned_block() {
		let mut storage = [1u32, 2];
		let ptr = NonNull::new(storage.as_mut_ptr()).unwrap();
		let mut array: Array<u32> = unsafe { Array::adopt(ptr, 2) };

		array.push(3);
		assert!(!array.is_borrowed());
		assert_eq!(array, [1, 2, 3]);
		array[0] = 7;
		drop(array);
		assert_eq!(storage, [1, 2]);
	}

	#[test]
	fn conversion() {
		let small: Array<u8> = Array::from([1, 2, 3]);
		let wide: DynamicArray<u64, Unchecked> = DynamicArray::from(&small);
		assert_eq!(wide.len(), small.len());
		for i in 0..small.len() {
			assert_eq!(wide[i], u64::from(small[i]));
		}

		let names: Array<&str> = Array::from(["a", "b"]);
		let owned: Array<String> = Array::convert_from(&names);
		assert_eq!(owned, ["a", "b"]);
	}

	#[test]
	fn raw_parts() {
		let mut array: Array<String> = Array::from(["x".to_string()]);
		array.push("y".to_string());
		let parts = array.take_raw();
		assert_eq!(parts.len, 2);
		assert_eq!(parts.capacity, 2);
		assert_eq!(parts.ownership, Ownership::Owned);
		assert_eq!(array.len(), 0);
		assert_eq!(array.capacity(), 0);

		// a drained array is still usable.
		array.push("z".to_string());
		assert_eq!(array, ["z"]);

		let restored: Array<String> = unsafe { Array::from_raw_parts(parts) };
		assert_eq!(restored, ["x", "y"]);
	}

	#[test]
	fn scalar() {
		let array: Array<i32> = Array::from([7, 8]);
		assert_eq!(*array.scalar(), 7);
	}

	#[test]
	fn reserve_and_shrink() {
		let mut array: Array<u32> = Array::from([1, 2]);
		array.reserve(10);
		assert!(array.capacity() >= 12);
		assert_eq!(array, [1, 2]);

		array.shrink_to_fit();
		assert_eq!(array.capacity(), 2);
		assert_eq!(array, [1, 2]);

		assert_eq!(array.try_reserve(usize::MAX), Err(ReserveError::CapacityOverflow));
	}

	#[test]
	fn iterators() {
		let mut array: Array<i32> = (1..=4).collect();
		for v in &mut array {
			*v *= 2
		}
		assert_eq!(array.iter().copied().collect::<Vec<_>>(), [2, 4, 6, 8]);
		assert_eq!(array.iter().rev().next(), Some(&8));
		assert_eq!(array.begin().cmp(&array.end()), cmp::Ordering::Less);

		let mut into = array.into_iter();
		assert_eq!(into.len(), 4);
		assert_eq!(into.next_back(), Some(8));
		assert_eq!(into.collect::<Vec<_>>(), [2, 4, 6]);
	}

	#[test]
	fn into_iter_drops_remaining() {
		let drops = Rc::new(Cell::new(0));
		let array: Array<Tracked> = Array::from_elem(Tracked(drops.clone()), 3);
		let mut iter = array.into_iter();
		drop(iter.next());
		assert_eq!(drops.get(), 1);
		drop(iter);
		assert_eq!(drops.get(), 3);
	}

	#[test]
	fn extend() {
		let mut array: Array<u8> = Array::new();
		array.extend([1u8, 2].iter());
		array.extend(vec![3, 4]);
		array.extend_from_slice(&[5]);
		assert_eq!(array, vec![1, 2, 3, 4, 5]);
	}

	#[test]
	fn display() {
		let array: Array<&str> = Array::from(["a", "b", "c"]);
		assert_eq!(array.to_string(), "{ \n\ta\n\tb\n\tc\n}");
		assert_eq!(format!("{:?}", array), "[\"a\", \"b\", \"c\"]");
	}

	#[test]
	fn zero_sized_elements() {
		let mut array: Array<()> = Array::new();
		for _ in 0..10 {
			array.push(())
		}
		assert_eq!(array.len(), 10);
		assert_eq!(array.iter().count(), 10);
		array.pop_back();
		assert_eq!(array.into_iter().count(), 9);
	}

	#[test]
	#[should_panic(expected = "index 3 out of bounds of array of length 3")]
	fn checked_index_at_len() {
		let array: Array<u8> = Array::from([1, 2, 3]);
		let _ = array[3];
	}

	#[test]
	#[should_panic(expected = "index 18446744073709551615 out of bounds")]
	#[cfg(target_pointer_width = "64")]
	fn checked_index_minus_one() {
		let array: Array<u8> = Array::from([1, 2, 3]);
		let _ = array[0usize.wrapping_sub(1)];
	}

	#[test]
	#[should_panic(expected = "pop on an empty array")]
	fn checked_pop_on_empty() {
		let mut array: Array<u8> = Array::new();
		array.pop_back();
	}

	#[test]
	#[should_panic(expected = "scalar of an empty array")]
	fn checked_scalar_on_empty() {
		let array: Array<u8> = Array::new();
		array.scalar();
	}

	#[test]
	fn unchecked_in_bounds() {
		let mut array: DynamicArray<u8, Unchecked> = DynamicArray::from([1, 2, 3]);
		array[1] = 20;
		assert_eq!(array[1], 20);
		assert_eq!(array.pop_back(), 3);
		assert_eq!(*array.scalar(), 1);
	}

	#[test]
	fn pop_returns_none_on_empty() {
		let mut array: Array<u8> = Array::from([1]);
		assert_eq!(array.pop(), Some(1));
		assert_eq!(array.pop(), None);
	}
}
