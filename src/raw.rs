use core::{
	alloc::Layout,
	marker::PhantomData,
	mem,
	ptr::{
		self,
		NonNull
	},
	cmp
};
use std::alloc;
use crate::{
	error::{
		ReserveError,
		handle_reserve,
		alloc_guard
	},
	policy::{
		SizeCheck,
		Checked
	}
};

/// Tells who is responsible for releasing the memory block of a [`RawBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
	/// The block was allocated by the buffer, which frees it on drop.
	Owned,

	/// The block belongs to someone else and is never freed by the buffer.
	Borrowed
}

/// A low-level utility for managing a contiguous block of `capacity` slots of `T`.
///
/// This type does not in anyway inspect the memory that it manages. When dropped it *will*
/// free its memory if it owns it, but it *won't* try to drop its contents. It is up to the user
/// of `RawBuffer` to handle the actual things *stored* inside of a `RawBuffer`.
///
/// # Example
/// ```
/// # use dynarray::raw::RawBuffer;
/// let mut buffer: RawBuffer<u32> = RawBuffer::allocate(2);
/// unsafe { buffer.index(1).write(42) };
/// buffer.grow_by(2);
/// assert_eq!(buffer.capacity(), 4);
/// assert_eq!(unsafe { buffer.index(1).read() }, 42);
/// ```
pub struct RawBuffer<T, P: SizeCheck = Checked> {
	/// Pointer to the first slot.
	///
	/// Dangling when no memory is attached (zero-sized blocks and moved-from buffers).
	ptr: NonNull<T>,

	/// Number of slots in the block.
	capacity: usize,

	ownership: Ownership,

	policy: PhantomData<P>
}

impl<T, P: SizeCheck> Drop for RawBuffer<T, P> {
	fn drop(&mut self) {
		self.release()
	}
}

impl<T, P: SizeCheck> Default for RawBuffer<T, P> {
	/// Allocates a buffer of one slot.
	#[inline]
	fn default() -> Self {
		Self::allocate(1)
	}
}

impl<T, P: SizeCheck> RawBuffer<T, P> {
	/// A buffer without any memory attached.
	///
	/// This is the state of a moved-from buffer.
	#[inline]
	pub const fn dangling() -> Self {
		RawBuffer {
			ptr: NonNull::dangling(),
			capacity: 0,
			ownership: Ownership::Owned,
			policy: PhantomData
		}
	}

	/// Allocates an owned block of `capacity` uninitialized slots.
	///
	/// # Panics
	///
	/// Panics if the block size overflows, and aborts if the allocation fails.
	#[inline]
	pub fn allocate(capacity: usize) -> Self {
		handle_reserve(Self::try_allocate(capacity))
	}

	/// The same as `allocate`, but returns on errors instead of panicking or aborting.
	pub fn try_allocate(capacity: usize) -> Result<Self, ReserveError> {
		let layout = layout_for::<T>(capacity)?;
		let ptr = finish_resize(layout, None)?;

		Ok(RawBuffer {
			ptr: ptr.cast(),
			capacity,
			ownership: Ownership::Owned,
			policy: PhantomData
		})
	}

	/// Wraps an externally owned block of `capacity` slots.
	///
	/// The buffer never frees this memory.
	///
	/// ## Safety
	///
	/// `ptr` must be valid for reads and writes of `capacity` slots of `T`
	/// for as long as the buffer exists and has not reallocated.
	#[inline]
	pub unsafe fn adopt(ptr: NonNull<T>, capacity: usize) -> Self {
		RawBuffer {
			ptr,
			capacity,
			ownership: Ownership::Borrowed,
			policy: PhantomData
		}
	}

	/// Rebuilds a buffer from the parts returned by [`into_raw_parts`](RawBuffer::into_raw_parts).
	///
	/// ## Safety
	///
	/// If `ownership` is `Owned`, `ptr` must have been allocated by the global allocator
	/// with the layout of `[T; capacity]` (or be dangling if this layout is zero-sized).
	/// If `ownership` is `Borrowed`, the requirements of [`adopt`](RawBuffer::adopt) apply.
	#[inline]
	pub unsafe fn from_raw_parts(ptr: NonNull<T>, capacity: usize, ownership: Ownership) -> Self {
		RawBuffer {
			ptr,
			capacity,
			ownership,
			policy: PhantomData
		}
	}

	/// Decomposes the buffer without releasing its memory.
	#[inline]
	pub fn into_raw_parts(self) -> (NonNull<T>, usize, Ownership) {
		let parts = (self.ptr, self.capacity, self.ownership);
		mem::forget(self);
		parts
	}

	/// Allocates a new owned block of the same capacity and copies every byte of this one into it.
	///
	/// This is a bitwise duplication: no `Clone` implementation is called.
	/// The copy is always owned, even if this buffer is borrowed.
	#[inline]
	pub fn copy(&self) -> Self {
		handle_reserve(self.try_copy())
	}

	/// The same as `copy`, but returns on errors instead of panicking or aborting.
	pub fn try_copy(&self) -> Result<Self, ReserveError> {
		let copy = Self::try_allocate(self.capacity)?;
		// SAFETY: both blocks hold `capacity` slots and are distinct allocations.
		// Copying possibly uninitialized bytes is fine with `copy_nonoverlapping`.
		unsafe {
			ptr::copy_nonoverlapping(self.ptr.as_ptr(), copy.ptr.as_ptr(), self.capacity);
		}
		Ok(copy)
	}

	/// Returns the number of slots in the block.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	#[inline]
	pub fn ownership(&self) -> Ownership {
		self.ownership
	}

	/// Returns true if the buffer will free its block when released.
	#[inline]
	pub fn is_owned(&self) -> bool {
		self.ownership == Ownership::Owned
	}

	/// Returns true if the block belongs to someone else.
	#[inline]
	pub fn is_borrowed(&self) -> bool {
		self.ownership == Ownership::Borrowed
	}

	/// Returns a raw pointer to the first slot.
	///
	/// The pointer is invalidated by any capacity change.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.ptr.as_ptr()
	}

	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.ptr.as_ptr()
	}

	/// Returns a raw pointer to the slot `i`.
	///
	/// The slot may be uninitialized.
	/// The policy `P` checks that `i < capacity`.
	#[inline]
	pub fn index(&self, i: usize) -> *mut T {
		let capacity = self.capacity;
		P::check(|| i < capacity, || format!("slot {} out of buffer of capacity {}", i, capacity));
		self.ptr.as_ptr().wrapping_add(i)
	}

	/// Extends the block by `additional` slots.
	#[inline]
	pub fn grow_by(&mut self, additional: usize) {
		handle_reserve(self.try_grow_by(additional))
	}

	/// The same as `grow_by`, but returns on errors instead of panicking or aborting.
	pub fn try_grow_by(&mut self, additional: usize) -> Result<(), ReserveError> {
		let capacity = self.capacity.checked_add(additional).ok_or(ReserveError::CapacityOverflow)?;
		self.try_resize(capacity)
	}

	/// Extends the block by a single slot.
	#[inline]
	pub fn grow_one(&mut self) {
		self.grow_by(1)
	}

	/// Multiplies the capacity by `factor`.
	#[inline]
	pub fn grow_to_factor(&mut self, factor: usize) {
		handle_reserve(self.try_grow_to_factor(factor))
	}

	/// The same as `grow_to_factor`, but returns on errors instead of panicking or aborting.
	pub fn try_grow_to_factor(&mut self, factor: usize) -> Result<(), ReserveError> {
		let capacity = self.capacity.checked_mul(factor).ok_or(ReserveError::CapacityOverflow)?;
		self.try_resize(capacity)
	}

	/// Removes the last `amount` slots of the block.
	///
	/// This layer knows nothing of initialized slots:
	/// the caller must not shrink below the slots it still uses.
	#[inline]
	pub fn shrink_by(&mut self, amount: usize) {
		handle_reserve(self.try_shrink_by(amount))
	}

	/// The same as `shrink_by`, but returns on errors instead of panicking or aborting.
	pub fn try_shrink_by(&mut self, amount: usize) -> Result<(), ReserveError> {
		let capacity = self.capacity;
		P::check(|| amount <= capacity, || format!("cannot shrink {} slots out of {}", amount, capacity));
		self.try_resize(capacity.saturating_sub(amount))
	}

	/// Divides the capacity by `factor`.
	#[inline]
	pub fn shrink_by_factor(&mut self, factor: usize) {
		P::check(|| factor != 0, || "shrink factor is zero".to_string());
		let capacity = self.capacity / cmp::max(factor, 1);
		handle_reserve(self.try_resize(capacity))
	}

	/// Sets the capacity to `capacity`, preserving the bytes of the first
	/// `min(old, new)` slots.
	///
	/// A borrowed block is never handed to the allocator:
	/// its bytes are copied into a fresh owned block, and the buffer becomes owned.
	/// On error, the buffer is left untouched.
	pub fn try_resize(&mut self, capacity: usize) -> Result<(), ReserveError> {
		let new_layout = layout_for::<T>(capacity)?;

		match self.ownership {
			Ownership::Owned => {
				let ptr = finish_resize(new_layout, self.current_memory())?;
				self.ptr = ptr.cast();
			},
			Ownership::Borrowed => {
				let ptr: NonNull<T> = finish_resize(new_layout, None)?.cast();
				let preserved = cmp::min(self.capacity, capacity);
				log::debug!("copying {} borrowed slots into an owned block of {} slots", preserved, capacity);
				// SAFETY: the borrowed block holds at least `preserved` slots,
				// the new block was just allocated with room for them.
				unsafe {
					ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), preserved);
				}
				self.ptr = ptr;
				self.ownership = Ownership::Owned;
			}
		}

		self.capacity = capacity;
		Ok(())
	}

	/// Frees the block if it is owned, and detaches it in any case.
	///
	/// Afterward the buffer is in the moved-from state:
	/// dangling pointer and zero capacity. Releasing it again does nothing.
	pub fn release(&mut self) {
		if let Some((ptr, layout)) = self.current_memory() {
			log::trace!("releasing {} bytes at {:p}", layout.size(), ptr);
			// SAFETY: `current_memory` only returns owned, allocated blocks.
			unsafe {
				alloc::dealloc(ptr.as_ptr(), layout)
			}
		}

		self.ptr = NonNull::dangling();
		self.capacity = 0;
	}

	/// Moves the block out, leaving this buffer in the moved-from state.
	#[inline]
	pub fn take(&mut self) -> Self {
		mem::replace(self, Self::dangling())
	}

	#[inline]
	pub fn swap(&mut self, other: &mut Self) {
		mem::swap(self, other)
	}

	/// Returns the current allocated memory and layout.
	///
	/// Returns `None` if the data is borrowed or the block is zero-sized.
	fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
		match self.ownership {
			Ownership::Borrowed => None,
			Ownership::Owned => {
				let size = mem::size_of::<T>() * self.capacity;
				if size == 0 {
					None
				} else {
					// We have an allocated chunk of memory, so we can bypass runtime
					// checks to get our current layout.
					unsafe {
						let layout = Layout::from_size_align_unchecked(size, mem::align_of::<T>());
						Some((self.ptr.cast(), layout))
					}
				}
			}
		}
	}
}

impl<T, P: SizeCheck> core::fmt::Debug for RawBuffer<T, P> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("RawBuffer")
			.field("ptr", &self.ptr)
			.field("capacity", &self.capacity)
			.field("ownership", &self.ownership)
			.finish()
	}
}

fn layout_for<T>(capacity: usize) -> Result<Layout, ReserveError> {
	let layout = Layout::array::<T>(capacity).map_err(|_| ReserveError::CapacityOverflow)?;
	alloc_guard(layout.size())?;
	Ok(layout)
}

// This function is outside `RawBuffer` to minimize compile times: it is
// non-generic over `T`.
#[inline(never)]
fn finish_resize(new_layout: Layout, current_memory: Option<(NonNull<u8>, Layout)>) -> Result<NonNull<u8>, ReserveError> {
	let memory = match current_memory {
		Some((ptr, old_layout)) => {
			debug_assert_eq!(old_layout.align(), new_layout.align());
			if new_layout.size() == 0 {
				log::trace!("releasing {} bytes at {:p}", old_layout.size(), ptr);
				unsafe { alloc::dealloc(ptr.as_ptr(), old_layout) };
				return Ok(dangling_for(new_layout))
			}

			log::trace!("reallocating {} bytes at {:p} to {} bytes", old_layout.size(), ptr, new_layout.size());
			// SAFETY: `ptr` was allocated with `old_layout` and the new size is non-zero.
			unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) }
		},
		None => {
			if new_layout.size() == 0 {
				return Ok(dangling_for(new_layout))
			}

			log::trace!("allocating {} bytes", new_layout.size());
			// SAFETY: the layout size is non-zero.
			unsafe { alloc::alloc(new_layout) }
		}
	};

	NonNull::new(memory).ok_or(ReserveError::AllocFailed { layout: new_layout })
}

#[inline]
fn dangling_for(layout: Layout) -> NonNull<u8> {
	// SAFETY: alignments are never zero.
	unsafe { NonNull::new_unchecked(layout.align() as *mut u8) }
}
